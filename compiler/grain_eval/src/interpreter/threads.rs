//! Explicit threads: `Spawn` and `Join`.
//!
//! A spawned body runs on its own OS thread against a fork of the spawning
//! interpreter, so neither side ever observes the other's later writes.

use std::any::Any;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use grain_ir::{Body, ExprId};
use grain_value::errors::thread_panicked;
use grain_value::failure::thread;
use grain_value::{EvalResult, ResourceHandle, Value};

use super::Interpreter;
use crate::environment::Frame;

/// Resource behind the value a `Spawn` yields.
pub struct ThreadHandle {
    handle: Mutex<Option<JoinHandle<EvalResult>>>,
}

impl ThreadHandle {
    fn new(handle: JoinHandle<EvalResult>) -> Self {
        ThreadHandle {
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Take the join handle. `None` once joined.
    fn take(&self) -> Option<JoinHandle<EvalResult>> {
        self.handle.lock().take()
    }

    pub fn is_joined(&self) -> bool {
        self.handle.lock().is_none()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Interpreter {
    /// Start `body` on a new thread with the current input as its seed.
    pub(crate) fn spawn_body(&mut self, body: &Body) -> EvalResult {
        let mut worker = self.fork();
        let frame = Frame::block(self.env.module(), self.env.input());
        let body = body.clone();
        let spawned = std::thread::Builder::new()
            .name("grain-spawn".to_string())
            .spawn(move || worker.scoped(frame).eval_body(&body));
        match spawned {
            Ok(handle) => {
                tracing::debug!("spawned thread");
                Ok(Value::resource(ResourceHandle::new(ThreadHandle::new(
                    handle,
                ))))
            }
            Err(e) => Ok(thread(format!("failed to spawn thread: {e}")).into_value()),
        }
    }

    /// Wait for a spawned thread and yield its result.
    pub(crate) fn eval_join(&mut self, handle: ExprId) -> EvalResult {
        let value = self.eval(handle)?;
        if value.is_failure() {
            return Ok(value);
        }
        let Some(handle) = (match &value {
            Value::Resource(r) => r.downcast_ref::<ThreadHandle>(),
            _ => None,
        }) else {
            return Ok(thread(format!(
                "join expects a thread handle, got {}",
                value.kind_name()
            ))
            .into_value());
        };
        let Some(join) = handle.take() else {
            return Ok(thread("thread was already joined").into_value());
        };
        match join.join() {
            Ok(result) => result,
            Err(payload) => Err(thread_panicked(panic_message(payload.as_ref()))),
        }
    }
}
