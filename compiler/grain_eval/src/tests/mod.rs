//! Interpreter scenario tests.
//!
//! Each test builds one or more modules with `ModuleAstBuilder`, registers
//! them, and runs a body or a call through a fresh interpreter.

mod iteration_tests;
mod pipeline_tests;
mod scope_tests;

use grain_ir::{Body, Module, ModuleAstBuilder, ModuleId, Name, SharedInterner};
use grain_types::{Program, ProgramBuilder};
use grain_value::{Field, Structure, TagRef, Value};

use crate::{
    init_tracing, register_module, EvalConfig, EvalResult, Failure, Frame, Interpreter,
    InterpreterBuilder, SharedRegistry,
};

/// A loaded program and an interpreter positioned in its last module.
pub(crate) struct Harness {
    pub interp: Interpreter,
}

impl Harness {
    /// Register `modules` in order and start in the last one.
    pub fn load(config: EvalConfig, interner: &SharedInterner, modules: Vec<Module>) -> Self {
        Self::load_with(config, interner, modules, |_| {})
    }

    /// Like `load`, with a hook to register natives into core first.
    pub fn load_with(
        config: EvalConfig,
        interner: &SharedInterner,
        modules: Vec<Module>,
        core: impl FnOnce(&mut ProgramBuilder),
    ) -> Self {
        init_tracing();
        let mut builder = ProgramBuilder::new(interner.clone());
        core(&mut builder);
        let mut last = ModuleId::CORE;
        for module in &modules {
            last = register_module(&mut builder, module).unwrap();
        }
        let program = SharedRegistry::new(builder.finish());
        let interp = InterpreterBuilder::new(program)
            .config(config)
            .module(last)
            .build()
            .unwrap();
        Harness { interp }
    }

    pub fn program(&self) -> &Program {
        self.interp.program()
    }

    pub fn n(&self, s: &str) -> Name {
        self.program().interner().intern(s)
    }

    pub fn tag(&self, path: &str) -> TagRef {
        let segments: Vec<Name> = path.split('.').map(|s| self.n(s)).collect();
        self.program()
            .symbols(self.interp.module())
            .lookup_tag(&segments)
            .unwrap()
    }

    /// Structure of named fields.
    pub fn record(&self, fields: &[(&str, Value)]) -> Value {
        Value::Structure(Structure::new(
            fields
                .iter()
                .map(|(name, value)| Field::named(self.n(name), value.clone()))
                .collect(),
        ))
    }

    /// Run `body` with `input` as the frame input.
    pub fn run_with(&mut self, body: &Body, input: Value) -> EvalResult {
        let module = self.interp.module();
        self.interp
            .scoped(Frame::call(module, input))
            .eval_body(body)
    }

    pub fn run(&mut self, body: &Body) -> EvalResult {
        self.run_with(body, Value::Void)
    }
}

/// Build a single module named `main` and load it with the default config.
pub(crate) fn single(setup: impl FnOnce(&mut ModuleAstBuilder<'_>) -> Body) -> (Harness, Body) {
    single_with(EvalConfig::default(), setup)
}

pub(crate) fn single_with(
    config: EvalConfig,
    setup: impl FnOnce(&mut ModuleAstBuilder<'_>) -> Body,
) -> (Harness, Body) {
    let interner = SharedInterner::new();
    let mut b = ModuleAstBuilder::new(&interner, "main");
    let body = setup(&mut b);
    let module = b.finish();
    (Harness::load(config, &interner, vec![module]), body)
}

pub(crate) fn ints(values: &[i64]) -> Value {
    Value::Structure(Structure::from_values(values.iter().map(|n| Value::Int(*n))))
}

/// The failure carried by `value`; panics when it is not one.
pub(crate) fn failure(value: &Value) -> Failure {
    match Failure::from_value(value) {
        Some(f) => f,
        None => panic!("expected a failure, got {value:?}"),
    }
}
