//! Grain Value - runtime values for the Grain semantic core
//!
//! - `Value`: scalars, tags, function references, structures, resources,
//!   and the iteration signals
//! - `Structure`: the immutable, ordered, copy-on-write composite
//! - `Failure`: the typed view of failure values
//! - `EvalError`: evaluator-internal errors that abort the call stack

pub mod errors;
pub mod failure;
mod heap;
mod refs;
mod structure;
mod value;

pub use errors::{BacktraceFrame, EvalBacktrace, EvalError, EvalErrorKind, EvalResult};
pub use failure::Failure;
pub use heap::Heap;
pub use refs::{FunctionRef, ResourceHandle, TagRef, CORE_FAILURE_KINDS, CORE_FAILURE_ROOT};
pub use structure::{Field, Structure};
pub use value::Value;

pub use grain_ir::{Name, StringLookup};
