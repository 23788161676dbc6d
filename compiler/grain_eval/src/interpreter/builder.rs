//! `InterpreterBuilder` for creating Interpreter instances.

use grain_ir::ModuleId;
use grain_types::Program;
use grain_value::errors::unknown_module;
use grain_value::EvalError;

use super::Interpreter;
use crate::config::EvalConfig;
use crate::diagnostics::CallStack;
use crate::dispatch::DispatchCache;
use crate::environment::Environment;
use crate::SharedRegistry;

/// Builder for an interpreter over a sealed program.
///
/// Without an explicit module the interpreter starts in core; without an
/// environment it starts with a fresh one rooted in that module.
pub struct InterpreterBuilder {
    program: SharedRegistry<Program>,
    config: Option<EvalConfig>,
    env: Option<Environment>,
    module: ModuleId,
}

impl InterpreterBuilder {
    pub fn new(program: SharedRegistry<Program>) -> Self {
        Self {
            program,
            config: None,
            env: None,
            module: ModuleId::CORE,
        }
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Pre-populated environment, e.g. with application bindings.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Module whose code the interpreter starts in.
    #[must_use]
    pub fn module(mut self, module: ModuleId) -> Self {
        self.module = module;
        self
    }

    /// Start in the module registered under `name`.
    pub fn module_named(self, name: &str) -> Result<Self, EvalError> {
        let id = self
            .program
            .interner()
            .get(name)
            .and_then(|n| self.program.module_id(n))
            .ok_or_else(|| unknown_module(name))?;
        Ok(self.module(id))
    }

    pub fn build(self) -> Result<Interpreter, EvalError> {
        let config = self.config.unwrap_or_default();
        let arena = self
            .program
            .module(self.module)
            .map(|m| m.arena().clone())
            .ok_or_else(|| unknown_module(&format!("{:?}", self.module)))?;
        let mut env = self.env.unwrap_or_else(|| Environment::new(self.module));
        if env.module() != self.module {
            env.push_frame(crate::environment::Frame::call(self.module, env.input()));
        }
        Ok(Interpreter {
            call_stack: CallStack::new(config.max_call_depth),
            cache: DispatchCache::new(config.dispatch_cache_capacity),
            program: self.program,
            config,
            env,
            arena,
        })
    }
}
