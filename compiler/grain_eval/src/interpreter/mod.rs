//! Tree-walking evaluator for Grain bodies and pipelines.
//!
//! # Architecture
//!
//! Expressions are evaluated here; the pipeline operators live in
//! `pipeline.rs`, overload calls and dispatch in `call.rs`, and thread
//! spawn/join in `threads.rs`.
//!
//! Language-level errors are failure values and travel through `Ok`. `Err`
//! carries only `EvalError`, which aborts the whole call stack.
//!
//! # Arena Threading Pattern
//!
//! Every module owns an expression arena and `ExprId`s are only meaningful
//! in their own arena. The interpreter holds the arena of the code it is
//! running; calling an overload or evaluating a field default in another
//! module swaps in that module's arena through `scoped_call`, and the guard
//! swaps it back.
//!
//! # Forking
//!
//! An `Interpreter` is plain owned data behind `Arc`-shared registries.
//! `fork` clones it for parallel iteration and spawned threads; the clone's
//! environment, call stack, and dispatch memo evolve independently.

mod builder;
mod call;
mod pipeline;
mod scope_guard;
mod threads;

pub use builder::InterpreterBuilder;
pub use scope_guard::ScopedInterpreter;
pub use threads::ThreadHandle;

use grain_ir::{
    Body, ExprId, ExprKind, FieldInit, MatchMode, ModuleId, Name, SharedArena, Stmt, TagPath,
};
use grain_types::{DefaultEvaluator, Matcher, Program, Shape};
use grain_value::errors::{internal, invalid_ast, unknown_module, unknown_shape};
use grain_value::failure::{field_undefined, shape_mismatch, tag_ambiguous};
use grain_value::{
    EvalError, EvalResult, Failure, Field, FunctionRef, Structure, TagRef, Value,
};

use crate::config::EvalConfig;
use crate::diagnostics::CallStack;
use crate::dispatch::DispatchCache;
use crate::environment::{Environment, Frame};
use crate::module_registration::literal_value;
use crate::operators::evaluate_binary;
use crate::stack::ensure_sufficient_stack;
use crate::SharedRegistry;

/// Evaluator state for one thread of execution.
#[derive(Clone)]
pub struct Interpreter {
    /// Sealed program shared by every fork.
    pub(crate) program: SharedRegistry<Program>,
    pub(crate) config: EvalConfig,
    /// Scope stack plus the module and application layers.
    pub(crate) env: Environment,
    /// Live overload calls, for the depth limit and backtraces.
    pub(crate) call_stack: CallStack,
    pub(crate) cache: DispatchCache,
    /// Arena of the code being evaluated.
    pub(crate) arena: SharedArena,
}

impl Interpreter {
    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn call_stack(&self) -> &CallStack {
        &self.call_stack
    }

    pub fn dispatch_cache(&self) -> &DispatchCache {
        &self.cache
    }

    /// Module the running frame belongs to.
    pub fn module(&self) -> ModuleId {
        self.env.module()
    }

    /// Independent copy for another thread.
    #[must_use]
    pub fn fork(&self) -> Interpreter {
        self.clone()
    }

    /// Arena of `module`'s expressions.
    pub(crate) fn module_arena(&self, module: ModuleId) -> Result<SharedArena, EvalError> {
        self.program
            .module(module)
            .map(|m| m.arena().clone())
            .ok_or_else(|| unknown_module(&format!("{module:?}")))
    }

    /// Resolve a tag path from the running module.
    pub(crate) fn resolve_tag(&self, path: &TagPath) -> Result<TagRef, EvalError> {
        self.program
            .symbols(self.env.module())
            .lookup_tag(&path.segments)
            .ok_or_else(|| invalid_ast(format!("unknown tag {}", self.render_path(path))))
    }

    fn render_path(&self, path: &TagPath) -> String {
        let segments: Vec<&str> = path
            .segments
            .iter()
            .map(|s| self.program.name(*s))
            .collect();
        format!("#{}", segments.join("."))
    }

    /// Text of a message value: strings verbatim, anything else rendered.
    pub(crate) fn message_text(&self, value: &Value) -> String {
        match value.as_str() {
            Some(s) => s.to_string(),
            None => self.program.render(value),
        }
    }

    // Entry points

    /// Dispatch the function `name` against `argument` from the running module.
    ///
    /// A dispatch failure is returned as a failure value.
    pub fn call(&mut self, name: &str, argument: Value) -> EvalResult {
        let name = self.program.interner().intern(name);
        let module = self.env.module();
        self.dispatch(module, name, argument, None, None)
    }

    /// Morph `value` into the shape `name` as seen from the running module.
    pub fn construct(&mut self, name: &str, value: &Value, mode: MatchMode) -> EvalResult {
        let name = self.program.interner().intern(name);
        self.construct_shape(name, value, mode)
    }

    pub(crate) fn construct_shape(
        &mut self,
        name: Name,
        value: &Value,
        mode: MatchMode,
    ) -> EvalResult {
        let program = self.program.clone();
        let shape = program
            .symbols(self.env.module())
            .lookup_shape(name)
            .ok_or_else(|| unknown_shape(program.name(name)))?;
        let outcome =
            Matcher::new(&program, self.config.tag_values).match_value(value, shape, mode, self)?;
        Ok(outcome.into_value())
    }

    /// Run `body` with the running frame's input as its seed.
    ///
    /// `Stmt::Expr` statements see the frame input; `Stmt::Continue` sees the
    /// previous statement's result. A failure, skip, or break ends the body.
    /// An empty body yields its input.
    pub fn eval_body(&mut self, body: &Body) -> EvalResult {
        let mut result = self.env.input();
        for stmt in &body.stmts {
            result = match *stmt {
                Stmt::Expr(id) => self.eval(id)?,
                Stmt::Continue(id) => {
                    let seed = self.env.replace_input(result);
                    let next = self.eval(id);
                    self.env.replace_input(seed);
                    next?
                }
            };
            if result.is_failure() || matches!(result, Value::Skip | Value::Break(_)) {
                tracing::trace!(kind = result.kind_name(), "body ended early");
                break;
            }
        }
        Ok(result)
    }

    /// Evaluate an expression of the current arena.
    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let arena = self.arena.clone();
        let expr = arena
            .try_get(id)
            .ok_or_else(|| invalid_ast(format!("expression {id:?} is not in the current arena")))?;
        let result = match &expr.kind {
            ExprKind::Literal(lit) => Ok(literal_value(*lit, self.program.interner())),
            ExprKind::Struct(inits) => self.eval_struct(inits),
            ExprKind::Field(name) => Ok(self.env.lookup(*name).unwrap_or_else(|| {
                field_undefined(format!("field `{}` is undefined", self.program.name(*name)))
                    .into_value()
            })),
            ExprKind::Access { receiver, field } => {
                let value = self.eval(*receiver)?;
                if value.is_failure() {
                    return Ok(value);
                }
                Ok(self.access(&value, *field))
            }
            ExprKind::Input => Ok(self.env.input()),
            ExprKind::Output => Ok(Value::Structure(self.env.output())),
            ExprKind::Tag(path) => self.resolve_tag(path).map(Value::Tag),
            ExprKind::TagOf { parent, value } => self.eval_tag_of(parent, *value),
            ExprKind::FunctionRef(name) => {
                Ok(Value::Function(FunctionRef::new(self.env.module(), *name)))
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right),
            ExprKind::Not(operand) => {
                let value = self.eval(*operand)?;
                Ok(match value {
                    Value::Bool(b) => Value::Bool(!b),
                    v if v.is_failure() => v,
                    other => shape_mismatch(format!(
                        "operator `!` is not defined for {}",
                        other.kind_name()
                    ))
                    .into_value(),
                })
            }
            ExprKind::Pipeline(pipeline) => self.eval_pipeline(pipeline),
            ExprKind::Block(body) => {
                let frame = Frame::block(self.env.module(), self.env.input());
                self.scoped(frame).eval_body(body)
            }
            ExprKind::Write {
                name,
                strength,
                value,
            } => {
                let value = self.eval(*value)?;
                if !value.is_failure() && !matches!(value, Value::Skip | Value::Break(_)) {
                    self.env.write(*name, value.clone(), *strength);
                }
                Ok(value)
            }
            ExprKind::Fail { kind, message } => self.eval_fail(kind.as_ref(), *message),
            ExprKind::Skip => Ok(Value::Skip),
            ExprKind::Break(value) => match value {
                Some(id) => {
                    let value = self.eval(*id)?;
                    if value.is_failure() {
                        return Ok(value);
                    }
                    Ok(Value::break_with(Some(value)))
                }
                None => Ok(Value::break_with(None)),
            },
            ExprKind::Spawn(body) => self.spawn_body(body),
            ExprKind::Join(handle) => self.eval_join(*handle),
        };
        result.map_err(|e| if e.span.is_none() { e.with_span(expr.span) } else { e })
    }

    fn eval_struct(&mut self, inits: &[FieldInit]) -> EvalResult {
        let mut fields = Vec::with_capacity(inits.len());
        for init in inits {
            match init {
                FieldInit::Field { name, tag, value } => {
                    let value = self.eval(*value)?;
                    if value.is_failure() || matches!(value, Value::Skip | Value::Break(_)) {
                        return Ok(value);
                    }
                    let tag = tag.as_ref().map(|p| self.resolve_tag(p)).transpose()?;
                    fields.push(Field::new(*name, tag, value));
                }
                FieldInit::Spread(source) => {
                    let value = self.eval(*source)?;
                    if value.is_failure() || matches!(value, Value::Skip | Value::Break(_)) {
                        return Ok(value);
                    }
                    fields.extend(value.to_structure().fields().iter().cloned());
                }
            }
        }
        Ok(Value::Structure(Structure::new(fields)))
    }

    fn access(&self, value: &Value, field: Name) -> Value {
        match value.as_structure().and_then(|s| s.get(field)) {
            Some(v) => v.clone(),
            None => field_undefined(format!(
                "{} has no field `{}`",
                self.program.render(value),
                self.program.name(field)
            ))
            .into_value(),
        }
    }

    fn eval_tag_of(&mut self, parent: &TagPath, value: ExprId) -> EvalResult {
        let parent = self.resolve_tag(parent)?;
        let value = self.eval(value)?;
        if value.is_failure() {
            return Ok(value);
        }
        let program = &self.program;
        Ok(
            match program
                .tags()
                .child_by_value(parent, &value, self.config.tag_values)
            {
                Ok(Some(tag)) => Value::Tag(tag),
                Ok(None) => shape_mismatch(format!(
                    "no tag under {} has value {}",
                    program.render_tag(parent),
                    program.render(&value)
                ))
                .into_value(),
                Err(ambiguity) => tag_ambiguous(format!(
                    "value {} names {} tags under {}",
                    program.render(&value),
                    ambiguity.candidates.len(),
                    program.render_tag(parent)
                ))
                .with_errors(Structure::from_values(
                    ambiguity.candidates.into_iter().map(Value::Tag),
                ))
                .into_value(),
            },
        )
    }

    fn eval_binary(&mut self, op: grain_ir::BinaryOp, left: ExprId, right: ExprId) -> EvalResult {
        let left = self.eval(left)?;
        if left.is_failure() {
            return Ok(left);
        }
        if op.is_logical() {
            let Value::Bool(b) = left else {
                return Ok(shape_mismatch(format!(
                    "operator `{}` needs bool operands, got {}",
                    op.as_symbol(),
                    left.kind_name()
                ))
                .into_value());
            };
            // `false and _` and `true or _` never evaluate the right side.
            if (op == grain_ir::BinaryOp::And) != b {
                return Ok(Value::Bool(b));
            }
        }
        let right = self.eval(right)?;
        if right.is_failure() {
            return Ok(right);
        }
        Ok(evaluate_binary(&left, &right, op))
    }

    fn eval_fail(&mut self, kind: Option<&TagPath>, message: ExprId) -> EvalResult {
        let kind = match kind {
            Some(path) => {
                let tag = self.resolve_tag(path)?;
                if !self
                    .program
                    .tags()
                    .is_same_or_descendant(tag, TagRef::FAILURE)
                {
                    return Err(invalid_ast(format!(
                        "{} is not a failure kind",
                        self.program.render_tag(tag)
                    )));
                }
                tag
            }
            None => TagRef::RAISED,
        };
        let message = self.eval(message)?;
        if message.is_failure() {
            return Ok(message);
        }
        let text = self.message_text(&message);
        Ok(Failure::new(kind, text)
            .with_partial(self.env.output())
            .into_value())
    }
}

impl DefaultEvaluator for Interpreter {
    /// Evaluate a field default in the shape's module, with the fields bound
    /// so far as input.
    fn eval_default(&mut self, shape: &Shape, expr: ExprId, bound: &Structure) -> EvalResult {
        let module = shape.module();
        let arena = self.module_arena(module)?;
        let frame = Frame::call(module, Value::Structure(bound.clone()));
        self.scoped_call(frame, arena).eval(expr)
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("module", &self.env.module())
            .field("depth", &self.env.depth())
            .field("calls", &self.call_stack.depth())
            .finish_non_exhaustive()
    }
}

/// Shorthand for an internal error about a missing registry record.
#[cold]
pub(crate) fn missing(what: &str) -> EvalError {
    internal(format!("{what} vanished from a sealed program"))
}
