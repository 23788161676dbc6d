//! Grain Types - registries and the structural matcher
//!
//! - `tags`: per-module tag arenas, extension overlay, tag-by-value lookup
//! - `shapes`: shape and field-spec records
//! - `overload`: function overloads with user or native bodies
//! - `program`: module symbol tables, `ProgramBuilder`, sealed `Program`
//! - `matcher`: four-pass matching, morphing, and specificity scoring
//! - `signature`: structural signatures for dispatch memoization

mod error;
pub mod matcher;
pub mod overload;
pub mod program;
pub mod shapes;
pub mod signature;
pub mod tags;

pub use error::RegistryError;
pub use matcher::{
    select_best, DefaultEvaluator, FieldDetail, MatchFailure, MatchOutcome, Matcher,
    MismatchReason, Morphed, NoDefaults, Selection, Specificity,
};
pub use overload::{FunctionOverload, NativeCall, NativeFn, OverloadBody, OverloadId, SignatureKey};
pub use program::{ModuleBuilder, ModuleSymbols, Program, ProgramBuilder, SymbolTable, CORE_MODULE};
pub use shapes::{Constraint, FieldSpec, Shape};
pub use signature::StructSig;
pub use tags::{TagAmbiguity, TagNode, TagRegistry, TagValuePolicy};
