//! Call frame tracking for the evaluator.
//!
//! Every overload call pushes a `CallFrame`; the depth limit is checked on
//! push. When an internal error escapes a call, the live frames are
//! snapshotted into an `EvalBacktrace` and attached to the error.

use grain_ir::{Name, Span, StringLookup};
use grain_value::errors::recursion_limit_exceeded;
use grain_value::{BacktraceFrame, EvalBacktrace, EvalError};

/// One active overload call.
#[derive(Clone, Debug)]
pub struct CallFrame {
    /// Function name.
    pub name: Name,
    /// Call site, when the step that made the call has one.
    pub call_span: Option<Span>,
}

/// Live call stack of one interpreter.
///
/// Forked interpreters (parallel iteration, spawned threads) clone the stack
/// so backtraces from inside them still show the caller's frames.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
}

impl CallStack {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame. Fails without pushing when the limit is reached.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(recursion_limit_exceeded(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn current_frame(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Snapshot the stack, most recent call first.
    pub fn capture(&self, interner: &impl StringLookup) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: interner.lookup(f.name).to_string(),
                span: f.call_span,
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a snapshot to `err` unless the stack is empty.
    pub fn attach_backtrace(&self, err: EvalError, interner: &impl StringLookup) -> EvalError {
        if self.frames.is_empty() {
            return err;
        }
        err.with_backtrace(self.capture(interner))
    }
}
