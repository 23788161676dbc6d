//! Grain IR - syntax-level data for the Grain semantic core
//!
//! This crate holds what the parser hands to the evaluator:
//! - Spans for source locations
//! - Names for interned identifiers
//! - AST nodes (expressions, pipelines, tag/shape/function items)
//! - Arena allocation for expressions
//! - Stable ids (`ModuleId`, `TagId`, `ShapeId`, `ExprId`) used by the registries
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Flatten Everything**: No Box<Expr>, use ExprId(u32) indices
//! - **Ids, not references**: registries link records by id so cyclic
//!   module and tag relationships need no shared ownership

mod arena;
pub mod ast;
pub mod builder;
mod ids;
mod interner;
mod name;
mod span;

pub use arena::{ExprArena, SharedArena};
pub use ast::{
    BinaryOp, Body, CondArm, ConstraintDef, Expr, ExprKind, FailureHandler, FieldInit,
    FieldSpecDef, FunctionDef, HandlerAction, Item, Literal, MatchMode, Module, ParamDef, PipeOp,
    Pipeline, ScalarType, ShapeDef, Step, Stmt, TagDef, TagOrigin, TagPath, Target, WriteStrength,
};
pub use builder::ModuleAstBuilder;
pub use ids::{ExprId, ModuleId, ShapeId, TagId};
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use span::Span;
