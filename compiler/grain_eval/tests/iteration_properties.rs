//! Property-based tests for pipeline iteration.
//!
//! Sequential and parallel iteration must agree element for element, keep
//! source order, and honor skip and break the same way.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use grain_eval::{
    register_module, EvalConfig, Frame, Interpreter, InterpreterBuilder, IterationMode,
    SharedRegistry,
};
use grain_ir::{BinaryOp, Body, ExprId, ModuleAstBuilder, SharedInterner, Target};
use grain_types::ProgramBuilder;
use grain_value::{Structure, Value};
use proptest::prelude::*;

fn list(b: &mut ModuleAstBuilder<'_>, values: &[i64]) -> ExprId {
    let inits = values
        .iter()
        .map(|v| {
            let id = b.int(*v);
            b.pos(id)
        })
        .collect();
    b.structure(inits)
}

/// `values |* (x < 0 ? break : x % 3 == 0 ? skip : x * 3)`
fn program(values: &[i64], config: EvalConfig) -> (Interpreter, Body) {
    let interner = SharedInterner::new();
    let mut b = ModuleAstBuilder::new(&interner, "props");
    let seed = list(&mut b, values);

    let x = b.input();
    let zero = b.int(0);
    let negative = b.binary(BinaryOp::Lt, x, zero);
    let stop = b.brk(None);

    let x = b.input();
    let three = b.int(3);
    let rem = b.binary(BinaryOp::Rem, x, three);
    let zero = b.int(0);
    let divisible = b.binary(BinaryOp::Eq, rem, zero);
    let skip = b.skip();

    let x = b.input();
    let three = b.int(3);
    let tripled = b.binary(BinaryOp::Mul, x, three);

    let choose = b.conditional(
        vec![(negative, Target::Expr(stop)), (divisible, Target::Expr(skip))],
        Some(Target::Expr(tripled)),
    );
    let element = b.pipeline(None, vec![choose]);
    let step = b.iterate(Target::Expr(element));
    let p = b.pipeline(Some(seed), vec![step]);
    let body = b.body(vec![p]);
    let module = b.finish();

    let mut builder = ProgramBuilder::new(interner.clone());
    let id = register_module(&mut builder, &module).unwrap();
    let program = SharedRegistry::new(builder.finish());
    let interp = InterpreterBuilder::new(program)
        .config(config)
        .module(id)
        .build()
        .unwrap();
    (interp, body)
}

fn run(values: &[i64], config: EvalConfig) -> Value {
    let (mut interp, body) = program(values, config);
    let module = interp.module();
    let out = interp
        .scoped(Frame::call(module, Value::Void))
        .eval_body(&body);
    out.unwrap()
}

fn expected(values: &[i64]) -> Value {
    Value::Structure(Structure::from_values(
        values
            .iter()
            .take_while(|v| **v >= 0)
            .filter(|v| *v % 3 != 0)
            .map(|v| Value::Int(v * 3)),
    ))
}

proptest! {
    #[test]
    fn sequential_and_parallel_agree(values in prop::collection::vec(-50i64..1000, 0..40)) {
        let sequential = run(&values, EvalConfig::default());
        let parallel = run(
            &values,
            EvalConfig::default().with_iteration(IterationMode::Parallel { min_items: 2 }),
        );
        prop_assert_eq!(&sequential, &expected(&values));
        prop_assert_eq!(sequential, parallel);
    }

    #[test]
    fn non_negative_inputs_keep_source_order(values in prop::collection::vec(0i64..1000, 0..40)) {
        let out = run(
            &values,
            EvalConfig::default().with_iteration(IterationMode::Parallel { min_items: 1 }),
        );
        let kept: Vec<i64> = values.iter().filter(|v| *v % 3 != 0).map(|v| v * 3).collect();
        let got: Vec<i64> = out
            .to_structure()
            .values()
            .map(|v| match v {
                Value::Int(n) => *n,
                other => panic!("expected int, got {other:?}"),
            })
            .collect();
        prop_assert_eq!(got, kept);
    }
}
