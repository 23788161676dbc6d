//! Programmatic AST construction.
//!
//! Hosts embedding the evaluator without the parser, and the test suites,
//! build modules through `ModuleAstBuilder`. Names are interned on the fly.

use crate::ast::{
    BinaryOp, Body, CondArm, ConstraintDef, Expr, ExprKind, FailureHandler, FieldInit,
    FieldSpecDef, FunctionDef, HandlerAction, Item, Literal, MatchMode, Module, ParamDef, PipeOp,
    Pipeline, ScalarType, ShapeDef, Step, Stmt, TagDef, TagOrigin, TagPath, Target, WriteStrength,
};
use crate::{ExprArena, ExprId, Name, SharedArena, Span, StringInterner};

/// Builder for one module's items and expression arena.
pub struct ModuleAstBuilder<'i> {
    interner: &'i StringInterner,
    name: Name,
    deps: Vec<Name>,
    items: Vec<Item>,
    arena: ExprArena,
}

impl<'i> ModuleAstBuilder<'i> {
    pub fn new(interner: &'i StringInterner, name: &str) -> Self {
        ModuleAstBuilder {
            interner,
            name: interner.intern(name),
            deps: Vec::new(),
            items: Vec::new(),
            arena: ExprArena::new(),
        }
    }

    /// Add a module dependency.
    #[must_use]
    pub fn dep(mut self, name: &str) -> Self {
        self.deps.push(self.interner.intern(name));
        self
    }

    pub fn name(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Parse a dotted tag path. A leading `#` is optional.
    pub fn path(&self, s: &str) -> TagPath {
        let s = s.strip_prefix('#').unwrap_or(s);
        TagPath::new(
            s.split('.')
                .filter(|seg| !seg.is_empty())
                .map(|seg| self.interner.intern(seg))
                .collect(),
        )
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        self.arena.alloc(Expr::new(kind, Span::DUMMY))
    }

    pub fn int(&mut self, v: i64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int(v)))
    }

    pub fn float(&mut self, v: f64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Float(v)))
    }

    pub fn bool(&mut self, v: bool) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(v)))
    }

    pub fn str(&mut self, s: &str) -> ExprId {
        let name = self.name(s);
        self.expr(ExprKind::Literal(Literal::Str(name)))
    }

    pub fn void(&mut self) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Void))
    }

    pub fn field(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Field(name))
    }

    pub fn access(&mut self, receiver: ExprId, field: &str) -> ExprId {
        let field = self.name(field);
        self.expr(ExprKind::Access { receiver, field })
    }

    pub fn input(&mut self) -> ExprId {
        self.expr(ExprKind::Input)
    }

    pub fn output(&mut self) -> ExprId {
        self.expr(ExprKind::Output)
    }

    pub fn tag(&mut self, path: &str) -> ExprId {
        let path = self.path(path);
        self.expr(ExprKind::Tag(path))
    }

    pub fn tag_of(&mut self, parent: &str, value: ExprId) -> ExprId {
        let parent = self.path(parent);
        self.expr(ExprKind::TagOf { parent, value })
    }

    pub fn func_ref(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::FunctionRef(name))
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn not(&mut self, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Not(operand))
    }

    pub fn structure(&mut self, fields: Vec<FieldInit>) -> ExprId {
        self.expr(ExprKind::Struct(fields))
    }

    pub fn pipeline(&mut self, seed: Option<ExprId>, steps: Vec<PipeOp>) -> ExprId {
        let steps = steps
            .into_iter()
            .map(|op| Step::new(op, Span::DUMMY))
            .collect();
        self.expr(ExprKind::Pipeline(Pipeline { seed, steps }))
    }

    pub fn block(&mut self, body: Body) -> ExprId {
        self.expr(ExprKind::Block(body))
    }

    pub fn write(&mut self, name: &str, strength: WriteStrength, value: ExprId) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Write {
            name,
            strength,
            value,
        })
    }

    pub fn fail(&mut self, kind: Option<&str>, message: ExprId) -> ExprId {
        let kind = kind.map(|k| self.path(k));
        self.expr(ExprKind::Fail { kind, message })
    }

    pub fn skip(&mut self) -> ExprId {
        self.expr(ExprKind::Skip)
    }

    pub fn brk(&mut self, value: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::Break(value))
    }

    pub fn spawn(&mut self, body: Body) -> ExprId {
        self.expr(ExprKind::Spawn(body))
    }

    pub fn join(&mut self, handle: ExprId) -> ExprId {
        self.expr(ExprKind::Join(handle))
    }

    // Structure literal entries

    pub fn pos(&self, value: ExprId) -> FieldInit {
        FieldInit::Field {
            name: None,
            tag: None,
            value,
        }
    }

    pub fn named(&self, name: &str, value: ExprId) -> FieldInit {
        FieldInit::Field {
            name: Some(self.name(name)),
            tag: None,
            value,
        }
    }

    pub fn tagged(&self, name: Option<&str>, tag: &str, value: ExprId) -> FieldInit {
        FieldInit::Field {
            name: name.map(|n| self.name(n)),
            tag: Some(self.path(tag)),
            value,
        }
    }

    pub fn spread(&self, value: ExprId) -> FieldInit {
        FieldInit::Spread(value)
    }

    // Pipeline targets and operators

    pub fn call(&self, function: &str) -> Target {
        Target::Function(self.name(function))
    }

    pub fn construct(&self, shape: &str) -> Target {
        Target::Construct {
            shape: self.name(shape),
            mode: MatchMode::Strict,
        }
    }

    pub fn construct_weak(&self, shape: &str) -> Target {
        Target::Construct {
            shape: self.name(shape),
            mode: MatchMode::Weak,
        }
    }

    pub fn parent(&self, function: &str, field: &str, ancestor: &str) -> Target {
        Target::Parent {
            function: self.name(function),
            field: self.name(field),
            ancestor: self.path(ancestor),
        }
    }

    pub fn invoke(&self, target: Target) -> PipeOp {
        PipeOp::Invoke(target)
    }

    pub fn iterate(&self, target: Target) -> PipeOp {
        PipeOp::Iterate(target)
    }

    pub fn conditional(&self, arms: Vec<(ExprId, Target)>, fallback: Option<Target>) -> PipeOp {
        PipeOp::Conditional {
            arms: arms
                .into_iter()
                .map(|(condition, then)| CondArm { condition, then })
                .collect(),
            fallback,
        }
    }

    pub fn recover(&self, kind: Option<&str>, target: Target) -> PipeOp {
        PipeOp::Handle(FailureHandler {
            kind: kind.map(|k| self.path(k)),
            action: HandlerAction::Recover(target),
        })
    }

    pub fn enrich(&self, kind: Option<&str>, message: ExprId) -> PipeOp {
        PipeOp::Handle(FailureHandler {
            kind: kind.map(|k| self.path(k)),
            action: HandlerAction::Enrich { message },
        })
    }

    pub fn pass_through(&self, kind: Option<&str>) -> PipeOp {
        PipeOp::Handle(FailureHandler {
            kind: kind.map(|k| self.path(k)),
            action: HandlerAction::PassThrough,
        })
    }

    // Field specs

    pub fn spec(&self, name: &str) -> FieldSpecDef {
        FieldSpecDef::named(self.name(name))
    }

    pub fn spec_scalar(&self, name: &str, scalar: ScalarType) -> FieldSpecDef {
        FieldSpecDef::named(self.name(name)).with_constraint(ConstraintDef::Scalar(scalar))
    }

    pub fn spec_shape(&self, name: &str, shape: &str) -> FieldSpecDef {
        FieldSpecDef::named(self.name(name)).with_constraint(ConstraintDef::Shape(self.name(shape)))
    }

    pub fn spec_tagged(&self, name: &str, tag: &str) -> FieldSpecDef {
        FieldSpecDef::named(self.name(name)).with_tag(self.path(tag))
    }

    pub fn spec_union(&self, name: &str, shapes: &[&str]) -> FieldSpecDef {
        let shapes = shapes.iter().map(|s| self.name(s)).collect();
        FieldSpecDef::named(self.name(name)).with_constraint(ConstraintDef::Union(shapes))
    }

    // Items

    pub fn declare_tag(&mut self, path: &str) -> &mut Self {
        self.declare_tag_with(path, None)
    }

    pub fn declare_tag_with(&mut self, path: &str, value: Option<Literal>) -> &mut Self {
        let path = self.path(path);
        self.items.push(Item::Tag(TagDef {
            path,
            value,
            extends: None,
            span: Span::DUMMY,
        }));
        self
    }

    /// Add `child` under `origin_path` in the hierarchy owned by `module`.
    pub fn extend_tag(
        &mut self,
        module: &str,
        origin_path: &str,
        child: &str,
        value: Option<Literal>,
    ) -> &mut Self {
        let extends = TagOrigin {
            module: self.name(module),
            path: self.path(origin_path),
        };
        let path = self.path(child);
        self.items.push(Item::Tag(TagDef {
            path,
            value,
            extends: Some(extends),
            span: Span::DUMMY,
        }));
        self
    }

    pub fn declare_shape(&mut self, name: &str, fields: Vec<FieldSpecDef>) -> &mut Self {
        let name = self.name(name);
        self.items.push(Item::Shape(ShapeDef {
            name,
            fields,
            span: Span::DUMMY,
        }));
        self
    }

    pub fn declare_function(&mut self, name: &str, param: &str, body: Body) -> &mut Self {
        let param = ParamDef::Shape(self.name(param));
        self.push_function(name, param, body)
    }

    pub fn declare_function_inline(
        &mut self,
        name: &str,
        fields: Vec<FieldSpecDef>,
        body: Body,
    ) -> &mut Self {
        self.push_function(name, ParamDef::Inline(fields), body)
    }

    fn push_function(&mut self, name: &str, param: ParamDef, body: Body) -> &mut Self {
        let name = self.name(name);
        self.items.push(Item::Function(FunctionDef {
            name,
            param,
            body,
            span: Span::DUMMY,
        }));
        self
    }

    /// Body of `Stmt::Expr` statements.
    pub fn body(&self, exprs: Vec<ExprId>) -> Body {
        Body::new(exprs.into_iter().map(Stmt::Expr).collect())
    }

    /// Finish, freezing the arena.
    pub fn finish(self) -> Module {
        Module {
            name: self.name,
            deps: self.deps,
            items: self.items,
            arena: SharedArena::new(self.arena),
        }
    }
}

#[cfg(test)]
mod tests;
