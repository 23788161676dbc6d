//! Overload dispatch and call evaluation.

use grain_ir::{ModuleId, Name, Span};
use grain_types::{NativeCall, OverloadBody};
use grain_value::{EvalResult, Value};

use super::{missing, Interpreter};
use crate::diagnostics::CallFrame;
use crate::dispatch::{DispatchRequest, ParentMask, Resolved, Resolver};
use crate::environment::Frame;
use crate::stack::ensure_sufficient_stack;

impl Interpreter {
    /// Resolve `name` from `caller` against `argument` and call the winner.
    ///
    /// The argument is auto-wrapped. Resolution failures come back as
    /// failure values.
    pub(crate) fn dispatch(
        &mut self,
        caller: ModuleId,
        name: Name,
        argument: Value,
        mask: Option<ParentMask>,
        span: Option<Span>,
    ) -> EvalResult {
        let argument = argument.to_structure();
        let program = self.program.clone();
        let resolver = Resolver::new(&program, self.config.tag_values);
        let request = DispatchRequest {
            caller,
            name,
            argument: &argument,
            mask,
        };
        // Defaults evaluated during resolution may dispatch themselves; they
        // run against an empty memo while this one is checked out.
        let mut cache = std::mem::take(&mut self.cache);
        let outcome = resolver.resolve(&request, &mut cache, self);
        self.cache = cache;
        match outcome? {
            Ok(resolved) => self.call_overload(resolved, span),
            Err(failure) => Ok(failure.into_value()),
        }
    }

    /// Run a resolved overload in a fresh call frame of its own module.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(function = tracing::field::Empty, depth = self.call_stack.depth())
    )]
    pub(crate) fn call_overload(&mut self, resolved: Resolved, span: Option<Span>) -> EvalResult {
        let program = self.program.clone();
        let overload = program
            .overload(resolved.overload)
            .ok_or_else(|| missing("overload"))?;
        tracing::Span::current().record("function", program.name(overload.name));

        self.call_stack
            .push(CallFrame {
                name: overload.name,
                call_span: span,
            })
            .map_err(|e| self.call_stack.attach_backtrace(e, program.interner()))?;

        let module = overload.module();
        let result = ensure_sufficient_stack(|| match &overload.body {
            OverloadBody::Native(native) => native(&NativeCall {
                input: &resolved.argument,
                program: &program,
                module,
            }),
            OverloadBody::User(body) => {
                let arena = self.module_arena(module)?;
                let frame = Frame::call(module, Value::Structure(resolved.argument.clone()));
                self.scoped_call(frame, arena).eval_body(body)
            }
        });
        let result = result.map_err(|e| self.call_stack.attach_backtrace(e, program.interner()));
        self.call_stack.pop();
        result
    }
}
