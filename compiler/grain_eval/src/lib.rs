#![deny(clippy::arithmetic_side_effects)]
//! Grain Eval - dispatch, scope stack, and pipeline evaluation.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `Environment`: layered field resolution (output, input, module, application)
//! - `Resolver`: overload selection by specificity, with origin-module
//!   precedence and parent-tag masking
//! - `DispatchCache`: per-interpreter memo of dispatch decisions
//! - `Interpreter`: bodies, pipelines, iteration, failure handling, threads
//! - `register_module`: lowering parsed modules into the program registry
//!
//! Language-level errors are failure values; `EvalError` is reserved for
//! evaluator-internal defects and aborts the call stack.

pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod environment;
pub mod interpreter;
pub mod module_registration;
mod operators;
mod shared;
mod stack;
mod tracing_setup;

pub use config::{EvalConfig, IterationMode, DEFAULT_DISPATCH_CACHE_CAPACITY};
pub use diagnostics::{CallFrame, CallStack};
pub use dispatch::{DispatchCache, DispatchRequest, ParentMask, Resolved, Resolver};
pub use environment::{Environment, Frame, FrameKind, Layer};
pub use interpreter::{Interpreter, InterpreterBuilder, ScopedInterpreter, ThreadHandle};
pub use module_registration::{literal_value, register_module};
pub use operators::evaluate_binary;
pub use shared::SharedRegistry;
pub use stack::ensure_sufficient_stack;
pub use tracing_setup::init_tracing;

pub use grain_value::{EvalError, EvalErrorKind, EvalResult, Failure, Structure, Value};

#[cfg(test)]
mod tests;
