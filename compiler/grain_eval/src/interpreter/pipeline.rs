//! Pipeline operators.
//!
//! A pipeline threads one current value through its steps. Once the value is
//! a failure, every step except a failure handler is skipped; a skip or
//! break signal ends the pipeline and is handed to the enclosing iteration.

use rayon::prelude::*;

use grain_ir::{CondArm, FailureHandler, HandlerAction, PipeOp, Pipeline, Span, Target};
use grain_value::failure::shape_mismatch;
use grain_value::{EvalResult, Failure, Structure, Value};

use super::Interpreter;
use crate::dispatch::ParentMask;
use crate::environment::Frame;

/// What one iteration element contributes.
enum ElementFlow {
    Next,
    Stop,
    Fail(Value),
}

/// Fold one element result into the iteration output.
fn collect_element(out: &mut Vec<Value>, result: Value) -> ElementFlow {
    match result {
        Value::Skip => ElementFlow::Next,
        Value::Break(last) => {
            if let Some(last) = last {
                out.push((*last).clone());
            }
            ElementFlow::Stop
        }
        v if v.is_failure() => ElementFlow::Fail(v),
        v => {
            out.push(v);
            ElementFlow::Next
        }
    }
}

impl Interpreter {
    pub(crate) fn eval_pipeline(&mut self, pipeline: &Pipeline) -> EvalResult {
        let mut value = match pipeline.seed {
            Some(seed) => self.eval(seed)?,
            None => self.env.input(),
        };
        for step in &pipeline.steps {
            if matches!(value, Value::Skip | Value::Break(_)) {
                break;
            }
            let span = Some(step.span);
            value = match (&step.op, value.is_failure()) {
                (PipeOp::Handle(handler), true) => self.handle_failure(handler, value, span)?,
                (PipeOp::Handle(_), false) => value,
                (_, true) => {
                    tracing::trace!("skipping step: value is a failure");
                    value
                }
                (PipeOp::Invoke(target), false) => self.apply_target(target, value, span)?,
                (PipeOp::Iterate(target), false) => self.iterate(target, &value, span)?,
                (PipeOp::Conditional { arms, fallback }, false) => {
                    self.conditional(arms, fallback.as_ref(), value, span)?
                }
            };
        }
        Ok(value)
    }

    /// Apply an invoke target to `value`.
    pub(crate) fn apply_target(
        &mut self,
        target: &Target,
        value: Value,
        span: Option<Span>,
    ) -> EvalResult {
        let module = self.env.module();
        match target {
            Target::Function(name) => self.dispatch(module, *name, value, None, span),
            Target::Construct { shape, mode } => self.construct_shape(*shape, &value, *mode),
            Target::Parent {
                function,
                field,
                ancestor,
            } => {
                let ancestor = self.resolve_tag(ancestor)?;
                let mask = ParentMask {
                    field: *field,
                    ancestor,
                };
                self.dispatch(module, *function, value, Some(mask), span)
            }
            Target::Expr(id) => {
                let result = self
                    .scoped(Frame::block(module, value.clone()))
                    .eval(*id)?;
                match result {
                    Value::Function(f) => self.dispatch(f.module, f.name, value, None, span),
                    other => Ok(other),
                }
            }
        }
    }

    /// Apply `target` to every unnamed field of `value`, in source order.
    fn iterate(&mut self, target: &Target, value: &Value, span: Option<Span>) -> EvalResult {
        let elements: Vec<Value> = value
            .to_structure()
            .unnamed()
            .map(|f| f.value.clone())
            .collect();
        let mut out = Vec::with_capacity(elements.len());

        if self.config.iteration.is_parallel_for(elements.len()) {
            tracing::debug!(elements = elements.len(), "parallel iteration");
            let base = self.fork();
            let results: Vec<EvalResult> = elements
                .into_par_iter()
                .map(|element| base.fork().apply_target(target, element, span))
                .collect();
            for result in results {
                match collect_element(&mut out, result?) {
                    ElementFlow::Next => {}
                    ElementFlow::Stop => break,
                    ElementFlow::Fail(failure) => return Ok(failure),
                }
            }
        } else {
            for element in elements {
                let result = self.apply_target(target, element, span)?;
                match collect_element(&mut out, result) {
                    ElementFlow::Next => {}
                    ElementFlow::Stop => break,
                    ElementFlow::Fail(failure) => return Ok(failure),
                }
            }
        }
        Ok(Value::Structure(Structure::from_values(out)))
    }

    /// Run the first arm whose condition holds, else the fallback, else pass
    /// the value through.
    fn conditional(
        &mut self,
        arms: &[CondArm],
        fallback: Option<&Target>,
        value: Value,
        span: Option<Span>,
    ) -> EvalResult {
        let module = self.env.module();
        for arm in arms {
            let condition = self
                .scoped(Frame::block(module, value.clone()))
                .eval(arm.condition)?;
            match condition {
                Value::Bool(true) => return self.apply_target(&arm.then, value, span),
                Value::Bool(false) => {}
                v if v.is_failure() => return Ok(v),
                other => {
                    return Ok(shape_mismatch(format!(
                        "condition must be bool, got {}",
                        other.kind_name()
                    ))
                    .into_value())
                }
            }
        }
        match fallback {
            Some(target) => self.apply_target(target, value, span),
            None => Ok(value),
        }
    }

    /// Run a handler on a failure value. Handlers whose kind filter does not
    /// cover the failure pass it through.
    fn handle_failure(
        &mut self,
        handler: &FailureHandler,
        value: Value,
        span: Option<Span>,
    ) -> EvalResult {
        let Some(failure) = Failure::from_value(&value) else {
            return Ok(value);
        };
        if let Some(kind) = &handler.kind {
            let kind = self.resolve_tag(kind)?;
            if !self.program.tags().is_same_or_descendant(failure.kind, kind) {
                return Ok(value);
            }
        }
        match &handler.action {
            HandlerAction::Recover(target) => {
                tracing::trace!(kind = %self.program.render_tag(failure.kind), "recovering");
                self.apply_target(target, value, span)
            }
            HandlerAction::Enrich { message } => {
                let module = self.env.module();
                let message = self
                    .scoped(Frame::block(module, value))
                    .eval(*message)?;
                if message.is_failure() {
                    return Ok(message);
                }
                let text = self.message_text(&message);
                Ok(failure.enrich(&text).into_value())
            }
            HandlerAction::PassThrough => Ok(value),
        }
    }
}
