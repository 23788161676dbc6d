//! RAII scope guards for frame management.
//!
//! [`ScopedInterpreter`] pushes a frame on creation and pops it on drop, even
//! during unwinding. A call guard also swaps in the callee's expression arena
//! and restores the caller's on drop.
//!
//! The guard holds `&mut Interpreter` and implements `Deref`/`DerefMut`, so
//! it is used exactly like the interpreter itself:
//!
//! ```text
//! {
//!     let mut scoped = interpreter.scoped(Frame::block(module, value));
//!     scoped.eval(condition)?;
//! } // frame popped here
//! ```

use std::ops::{Deref, DerefMut};

use grain_ir::SharedArena;

use super::Interpreter;
use crate::environment::Frame;

/// Pops its frame, and restores the caller's arena, when dropped.
pub struct ScopedInterpreter<'guard> {
    interpreter: &'guard mut Interpreter,
    caller_arena: Option<SharedArena>,
}

impl Drop for ScopedInterpreter<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_frame();
        if let Some(arena) = self.caller_arena.take() {
            self.interpreter.arena = arena;
        }
    }
}

impl Deref for ScopedInterpreter<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedInterpreter<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push `frame` for the lifetime of the returned guard.
    pub fn scoped(&mut self, frame: Frame) -> ScopedInterpreter<'_> {
        self.env.push_frame(frame);
        ScopedInterpreter {
            interpreter: self,
            caller_arena: None,
        }
    }

    /// Push `frame` and evaluate against `arena` until the guard drops.
    ///
    /// Expression ids are only valid in the arena of the module that owns
    /// them, so every cross-module call goes through here.
    pub fn scoped_call(&mut self, frame: Frame, arena: SharedArena) -> ScopedInterpreter<'_> {
        self.env.push_frame(frame);
        let caller_arena = std::mem::replace(&mut self.arena, arena);
        ScopedInterpreter {
            interpreter: self,
            caller_arena: Some(caller_arena),
        }
    }
}
