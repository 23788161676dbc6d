//! Flat AST types using arena allocation.
//!
//! No `Box<Expr>`: children are `ExprId` indices into an `ExprArena`.
//!
//! # Module Structure
//!
//! - `expr`: expressions, literals, tag paths
//! - `operators`: binary operators
//! - `pipeline`: pipeline steps, targets, statements, bodies
//! - `items`: module-level tag, shape, and function declarations

mod expr;
pub mod items;
mod operators;
mod pipeline;

pub use expr::{Expr, ExprKind, FieldInit, Literal, TagPath, WriteStrength};
pub use items::{
    ConstraintDef, FieldSpecDef, FunctionDef, Item, Module, ParamDef, ScalarType, ShapeDef,
    TagDef, TagOrigin,
};
pub use operators::BinaryOp;
pub use pipeline::{
    Body, CondArm, FailureHandler, HandlerAction, MatchMode, PipeOp, Pipeline, Step, Stmt, Target,
};

#[cfg(test)]
mod tests;
