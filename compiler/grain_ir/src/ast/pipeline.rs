//! Pipelines, operators, and function bodies.

use crate::{ExprId, Name, Span};

use super::expr::TagPath;

/// How strictly a structure must match a shape.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum MatchMode {
    /// Leftover input fields are dropped.
    #[default]
    Strict,
    /// Leftover input fields are carried into the output.
    Weak,
}

/// Something a pipeline step applies its value to.
#[derive(Clone, PartialEq, Debug)]
pub enum Target {
    /// Dispatch to the overload set of a named function.
    Function(Name),
    /// Morph into a named shape.
    Construct { shape: Name, mode: MatchMode },
    /// Re-dispatch with the tag on `field` masked to `ancestor`.
    Parent {
        function: Name,
        field: Name,
        ancestor: TagPath,
    },
    /// Evaluate an expression with the value as its input.
    Expr(ExprId),
}

/// One arm of a conditional operator.
#[derive(Clone, PartialEq, Debug)]
pub struct CondArm {
    pub condition: ExprId,
    pub then: Target,
}

/// What a failure handler does with a failure it catches.
#[derive(Clone, PartialEq, Debug)]
pub enum HandlerAction {
    /// Feed the failure structure to a target; its result replaces the failure.
    Recover(Target),
    /// Re-raise with the message expression appended.
    Enrich { message: ExprId },
    /// Let the failure continue unchanged.
    PassThrough,
}

/// Failure handler step. `kind: None` catches every failure.
#[derive(Clone, PartialEq, Debug)]
pub struct FailureHandler {
    pub kind: Option<TagPath>,
    pub action: HandlerAction,
}

/// Pipeline operator.
#[derive(Clone, PartialEq, Debug)]
pub enum PipeOp {
    /// `value | target`.
    Invoke(Target),
    /// `value |* target`, once per element.
    Iterate(Target),
    /// First arm whose condition holds; otherwise the fallback or pass-through.
    Conditional {
        arms: Vec<CondArm>,
        fallback: Option<Target>,
    },
    Handle(FailureHandler),
}

#[derive(Clone, PartialEq, Debug)]
pub struct Step {
    pub op: PipeOp,
    pub span: Span,
}

impl Step {
    pub fn new(op: PipeOp, span: Span) -> Self {
        Step { op, span }
    }
}

/// A chain of steps. Without a seed, the enclosing input is the seed.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Pipeline {
    pub seed: Option<ExprId>,
    pub steps: Vec<Step>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stmt {
    /// Evaluated with the function input as its seed.
    Expr(ExprId),
    /// Evaluated with the previous statement's result as its seed.
    Continue(ExprId),
}

impl Stmt {
    pub fn expr(self) -> ExprId {
        match self {
            Stmt::Expr(id) | Stmt::Continue(id) => id,
        }
    }
}

/// Ordered statements. The value of the last is the body's value.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Body {
    pub stmts: Vec<Stmt>,
}

impl Body {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Body { stmts }
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}
