//! Iteration over unnamed fields: skip, break, failures, parallel order.

use grain_ir::{BinaryOp, Body, ExprId, ModuleAstBuilder, Target};
use grain_value::{Structure, TagRef, Value};
use pretty_assertions::assert_eq;

use super::{failure, ints, single_with};
use crate::{EvalConfig, IterationMode};

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

/// `|* (x % 2 == 0 ? x * 10 : skip)` over `values`.
fn evens_times_ten(b: &mut ModuleAstBuilder<'_>, values: &[i64]) -> Body {
    let seed = list(b, values);
    let x = b.input();
    let two = b.int(2);
    let rem = b.binary(BinaryOp::Rem, x, two);
    let zero = b.int(0);
    let even = b.binary(BinaryOp::Eq, rem, zero);
    let x = b.input();
    let ten = b.int(10);
    let times = b.binary(BinaryOp::Mul, x, ten);
    let skip = b.skip();
    let choose = b.conditional(vec![(even, Target::Expr(times))], Some(Target::Expr(skip)));
    let inner = b.pipeline(None, vec![choose]);
    let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(inner))]);
    b.body(vec![p])
}

fn modes() -> [EvalConfig; 2] {
    [
        EvalConfig::default(),
        EvalConfig::default().with_iteration(IterationMode::Parallel { min_items: 1 }),
    ]
}

#[test]
fn skip_omits_elements() {
    for config in modes() {
        let (mut h, body) = single_with(config, |b| evens_times_ten(b, &[1, 2, 3, 4]));
        assert_eq!(h.run(&body).unwrap(), ints(&[20, 40]));
    }
}

#[test]
fn skip_inside_a_structure_omits_the_element() {
    for config in modes() {
        let (mut h, body) = single_with(config, |b| {
            let seed = list(b, &[1, 2, 3, 4]);
            let x = b.input();
            let two = b.int(2);
            let rem = b.binary(BinaryOp::Rem, x, two);
            let zero = b.int(0);
            let even = b.binary(BinaryOp::Eq, rem, zero);
            let x = b.input();
            let skip = b.skip();
            let choose = b.conditional(vec![(even, Target::Expr(x))], Some(Target::Expr(skip)));
            let pick = b.pipeline(None, vec![choose]);
            let wrapped = b.structure(vec![b.named("v", pick)]);
            let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(wrapped))]);
            b.body(vec![p])
        });
        let expected = Value::Structure(Structure::from_values([
            h.record(&[("v", Value::Int(2))]),
            h.record(&[("v", Value::Int(4))]),
        ]));
        assert_eq!(h.run(&body).unwrap(), expected);
    }
}

#[test]
fn break_inside_a_structure_ends_iteration() {
    for config in modes() {
        let (mut h, body) = single_with(config, |b| {
            let seed = list(b, &[1, 2, 3]);
            let x = b.input();
            let two = b.int(2);
            let is_two = b.binary(BinaryOp::Eq, x, two);
            let stop = b.brk(None);
            let x = b.input();
            let choose = b.conditional(vec![(is_two, Target::Expr(stop))], Some(Target::Expr(x)));
            let pick = b.pipeline(None, vec![choose]);
            let wrapped = b.structure(vec![b.named("v", pick)]);
            let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(wrapped))]);
            b.body(vec![p])
        });
        let expected = Value::Structure(Structure::from_values([h.record(&[("v", Value::Int(1))])]));
        assert_eq!(h.run(&body).unwrap(), expected);
    }
}

#[test]
fn order_is_source_order() {
    let values: Vec<i64> = (0..64).collect();
    let expected: Vec<i64> = values
        .iter()
        .filter(|v| *v % 2 == 0)
        .map(|v| v * 10)
        .collect();
    for config in modes() {
        let (mut h, body) = single_with(config, |b| evens_times_ten(b, &values));
        assert_eq!(h.run(&body).unwrap(), ints(&expected));
    }
}

#[test]
fn break_keeps_results_so_far() {
    for config in modes() {
        let (mut h, body) = single_with(config, |b| {
            let seed = list(b, &[1, 2, 3, 4]);
            let x = b.input();
            let two = b.int(2);
            let is_two = b.binary(BinaryOp::Eq, x, two);
            let x = b.input();
            let hundred = b.int(100);
            let last = b.binary(BinaryOp::Mul, x, hundred);
            let stop = b.brk(Some(last));
            let keep = b.input();
            let choose =
                b.conditional(vec![(is_two, Target::Expr(stop))], Some(Target::Expr(keep)));
            let inner = b.pipeline(None, vec![choose]);
            let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(inner))]);
            b.body(vec![p])
        });
        assert_eq!(h.run(&body).unwrap(), ints(&[1, 200]));
    }
}

#[test]
fn first_failing_element_ends_iteration() {
    for config in modes() {
        let (mut h, body) = single_with(config, |b| {
            let seed = list(b, &[5, 0, 2, 0]);
            let hundred = b.int(100);
            let x = b.input();
            let div = b.binary(BinaryOp::Div, hundred, x);
            let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(div))]);
            b.body(vec![p])
        });
        let out = h.run(&body).unwrap();
        assert_eq!(failure(&out).kind, TagRef::ARITHMETIC);
    }
}

#[test]
fn named_fields_are_not_elements() {
    let (mut h, body) = single_with(EvalConfig::default(), |b| {
        let one = b.int(1);
        let label = b.str("nums");
        let two = b.int(2);
        let seed = b.structure(vec![b.pos(one), b.named("label", label), b.pos(two)]);
        let x = b.input();
        let inc = b.int(1);
        let add = b.binary(BinaryOp::Add, x, inc);
        let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(add))]);
        b.body(vec![p])
    });
    assert_eq!(h.run(&body).unwrap(), ints(&[2, 3]));
}

#[test]
fn iterating_a_scalar_visits_it_once() {
    let (mut h, body) = single_with(EvalConfig::default(), |b| {
        let seed = b.int(4);
        let x = b.input();
        let sq = b.binary(BinaryOp::Mul, x, x);
        let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(sq))]);
        b.body(vec![p])
    });
    assert_eq!(h.run(&body).unwrap(), ints(&[16]));
}

#[test]
fn iteration_dispatches_per_element() {
    for config in modes() {
        let (mut h, body) = single_with(config, |b| {
            let n = b.field("n");
            let neg = b.int(-1);
            let flip = b.binary(BinaryOp::Mul, n, neg);
            let flip_body = b.body(vec![flip]);
            let fields = vec![b.spec("n")];
            b.declare_function_inline("flip", fields, flip_body);
            let seed = list(b, &[1, 2, 3]);
            let p = b.pipeline(Some(seed), vec![b.iterate(b.call("flip"))]);
            b.body(vec![p])
        });
        assert_eq!(h.run(&body).unwrap(), ints(&[-1, -2, -3]));
    }
}

#[test]
fn empty_iteration_is_empty() {
    let (mut h, body) = single_with(EvalConfig::default(), |b| {
        let seed = b.structure(vec![]);
        let x = b.input();
        let p = b.pipeline(Some(seed), vec![b.iterate(Target::Expr(x))]);
        b.body(vec![p])
    });
    assert_eq!(h.run(&body).unwrap(), ints(&[]));
}
