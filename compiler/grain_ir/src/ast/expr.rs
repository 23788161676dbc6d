//! Expression nodes.
//!
//! Children are referenced by `ExprId` into the owning module's `ExprArena`.

use crate::{ExprId, Name, Span};

use super::operators::BinaryOp;
use super::pipeline::{Body, Pipeline};

/// A literal scalar in source.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(Name),
    Void,
}

/// Dotted tag path as written in source, e.g. `#color.red`.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct TagPath {
    pub segments: Vec<Name>,
}

impl TagPath {
    pub fn new(segments: Vec<Name>) -> Self {
        TagPath { segments }
    }

    pub fn single(segment: Name) -> Self {
        TagPath {
            segments: vec![segment],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Final segment of the path.
    pub fn last(&self) -> Option<Name> {
        self.segments.last().copied()
    }
}

/// How a write statement binds its name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum WriteStrength {
    /// Bind in the current local frame.
    Local,
    /// Bind at module scope, overwriting.
    Strong,
    /// Bind only if the name is not already resolvable.
    Weak,
}

/// One entry of a structure literal.
#[derive(Clone, PartialEq, Debug)]
pub enum FieldInit {
    /// `name #tag = value`, every part optional except the value.
    Field {
        name: Option<Name>,
        tag: Option<TagPath>,
        value: ExprId,
    },
    /// `..expr`, copying the fields of a structure in place.
    Spread(ExprId),
}

/// Expression node.
#[derive(Clone, PartialEq, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Expression variants.
#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    Literal(Literal),
    /// Structure literal.
    Struct(Vec<FieldInit>),
    /// Bare identifier, resolved through the field lookup chain.
    Field(Name),
    /// `receiver.field`.
    Access { receiver: ExprId, field: Name },
    /// The current input structure.
    Input,
    /// The current output bindings as a structure.
    Output,
    /// Tag reference by path.
    Tag(TagPath),
    /// Child of `parent` whose associated value equals `value`.
    TagOf { parent: TagPath, value: ExprId },
    /// Reference to a named function.
    FunctionRef(Name),
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Not(ExprId),
    Pipeline(Pipeline),
    Block(Body),
    Write {
        name: Name,
        strength: WriteStrength,
        value: ExprId,
    },
    /// Raise a failure with an optional kind tag under `#failure`.
    Fail {
        kind: Option<TagPath>,
        message: ExprId,
    },
    /// Drop the current iteration element.
    Skip,
    /// Stop iteration, optionally contributing a final element.
    Break(Option<ExprId>),
    /// Start the body on a new thread and yield a handle.
    Spawn(Body),
    /// Wait for a spawned handle and yield its result.
    Join(ExprId),
}
