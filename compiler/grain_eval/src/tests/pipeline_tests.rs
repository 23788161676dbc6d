//! Statements, seeding, conditionals, construction, and expressions.

use grain_ir::{BinaryOp, Body, Literal, MatchMode, ScalarType, Stmt, Target};
use grain_types::TagValuePolicy;
use grain_value::{TagRef, Value};
use pretty_assertions::assert_eq;

use super::{failure, ints, single, single_with};
use crate::EvalConfig;

fn point(b: &mut grain_ir::ModuleAstBuilder<'_>) {
    let fields = vec![
        b.spec_scalar("x", ScalarType::Number),
        b.spec_scalar("y", ScalarType::Number),
    ];
    b.declare_shape("point", fields);
}

#[test]
fn strict_construct_drops_extra_fields() {
    let (mut h, _) = single(|b| {
        point(b);
        Body::default()
    });
    let input = h.record(&[("x", Value::Int(1)), ("y", Value::Int(2)), ("z", Value::Int(3))]);
    let out = h.interp.construct("point", &input, MatchMode::Strict).unwrap();
    assert_eq!(out, h.record(&[("x", Value::Int(1)), ("y", Value::Int(2))]));
}

#[test]
fn weak_construct_keeps_extra_fields() {
    let (mut h, _) = single(|b| {
        point(b);
        Body::default()
    });
    let input = h.record(&[("x", Value::Int(1)), ("y", Value::Int(2)), ("z", Value::Int(3))]);
    let out = h.interp.construct("point", &input, MatchMode::Weak).unwrap();
    assert_eq!(out, input);
}

#[test]
fn construct_target_in_pipeline() {
    let (mut h, body) = single(|b| {
        point(b);
        let (one, two) = (b.int(1), b.int(2));
        let seed = b.structure(vec![b.pos(one), b.pos(two)]);
        let step = b.invoke(b.construct("point"));
        let p = b.pipeline(Some(seed), vec![step]);
        b.body(vec![p])
    });
    let out = h.run(&body).unwrap();
    assert_eq!(out, h.record(&[("x", Value::Int(1)), ("y", Value::Int(2))]));
}

#[test]
fn construct_mismatch_is_failure() {
    let (mut h, _) = single(|b| {
        point(b);
        Body::default()
    });
    let input = h.record(&[("x", Value::string("one"))]);
    let out = h.interp.construct("point", &input, MatchMode::Strict).unwrap();
    assert_eq!(failure(&out).kind, TagRef::SHAPE_MISMATCH);
}

#[test]
fn defaults_see_bound_fields() {
    let (mut h, _) = single(|b| {
        let host = b.field("host");
        let suffix = b.str(":8080");
        let default = b.binary(BinaryOp::Add, host, suffix);
        let fields = vec![
            b.spec_scalar("host", ScalarType::Str),
            b.spec("addr").with_default(default),
        ];
        b.declare_shape("server", fields);
        Body::default()
    });
    let input = h.record(&[("host", Value::string("db"))]);
    let out = h.interp.construct("server", &input, MatchMode::Strict).unwrap();
    assert_eq!(
        out,
        h.record(&[("host", Value::string("db")), ("addr", Value::string("db:8080"))])
    );
}

#[test]
fn independent_statements_share_the_original_seed() {
    let (mut h, body) = single(|b| {
        let x = b.field("x");
        let hundred = b.int(100);
        let bumped = b.binary(BinaryOp::Add, x, hundred);
        let first = b.write("y", grain_ir::WriteStrength::Local, bumped);
        let input = b.input();
        let second = b.access(input, "x");
        b.body(vec![first, second])
    });
    let out = h.run_with(&body, h.record(&[("x", Value::Int(1))])).unwrap();
    assert_eq!(out, Value::Int(1));
}

#[test]
fn continuation_is_seeded_with_previous_result() {
    let (mut h, body) = single(|b| {
        let x = b.field("x");
        let one = b.int(1);
        let first = b.binary(BinaryOp::Add, x, one);
        let input = b.input();
        let two = b.int(2);
        let second = b.binary(BinaryOp::Mul, input, two);
        Body::new(vec![Stmt::Expr(first), Stmt::Continue(second)])
    });
    let out = h.run_with(&body, h.record(&[("x", Value::Int(4))])).unwrap();
    assert_eq!(out, Value::Int(10));
}

#[test]
fn empty_body_yields_its_input() {
    let (mut h, body) = single(|_| Body::default());
    let out = h.run_with(&body, Value::Int(7)).unwrap();
    assert_eq!(out, Value::Int(7));
}

#[test]
fn output_collects_local_writes() {
    let (mut h, body) = single(|b| {
        let one = b.int(1);
        let a = b.write("a", grain_ir::WriteStrength::Local, one);
        let two = b.int(2);
        let c = b.write("c", grain_ir::WriteStrength::Local, two);
        let out = b.output();
        b.body(vec![a, c, out])
    });
    let out = h.run(&body).unwrap();
    assert_eq!(out, h.record(&[("a", Value::Int(1)), ("c", Value::Int(2))]));
}

#[test]
fn conditional_takes_first_true_arm() {
    let (mut h, body) = single(|b| {
        let input = b.input();
        let three = b.int(3);
        let big = b.binary(BinaryOp::Gt, input, three);
        let yes = b.str("big");
        let no = b.str("small");
        let step = b.conditional(vec![(big, Target::Expr(yes))], Some(Target::Expr(no)));
        let p = b.pipeline(None, vec![step]);
        b.body(vec![p])
    });
    assert_eq!(h.run_with(&body, Value::Int(5)).unwrap(), Value::string("big"));
    assert_eq!(h.run_with(&body, Value::Int(1)).unwrap(), Value::string("small"));
}

#[test]
fn conditional_without_match_passes_through() {
    let (mut h, body) = single(|b| {
        let never = b.bool(false);
        let zero = b.int(0);
        let step = b.conditional(vec![(never, Target::Expr(zero))], None);
        let p = b.pipeline(None, vec![step]);
        b.body(vec![p])
    });
    assert_eq!(h.run_with(&body, Value::Int(5)).unwrap(), Value::Int(5));
}

#[test]
fn conditional_needs_bool() {
    let (mut h, body) = single(|b| {
        let not_bool = b.int(1);
        let zero = b.int(0);
        let step = b.conditional(vec![(not_bool, Target::Expr(zero))], None);
        let p = b.pipeline(None, vec![step]);
        b.body(vec![p])
    });
    let out = h.run(&body).unwrap();
    let f = failure(&out);
    assert_eq!(f.kind, TagRef::SHAPE_MISMATCH);
    assert_eq!(f.message, "condition must be bool, got int");
}

#[test]
fn spread_splices_fields() {
    let (mut h, body) = single(|b| {
        let input = b.input();
        let three = b.int(3);
        let s = b.structure(vec![b.spread(input), b.named("z", three)]);
        b.body(vec![s])
    });
    let out = h
        .run_with(&body, h.record(&[("x", Value::Int(1))]))
        .unwrap();
    assert_eq!(out, h.record(&[("x", Value::Int(1)), ("z", Value::Int(3))]));
}

#[test]
fn logical_operators_short_circuit() {
    let (mut h, body) = single(|b| {
        let f = b.bool(false);
        // The right side would be a field-undefined failure.
        let missing = b.field("missing");
        let and = b.binary(BinaryOp::And, f, missing);
        b.body(vec![and])
    });
    assert_eq!(h.run(&body).unwrap(), Value::Bool(false));
}

#[test]
fn tag_of_finds_tag_by_value() {
    let (mut h, body) = single(|b| {
        b.declare_tag("level")
            .declare_tag_with("level.low", Some(Literal::Int(1)))
            .declare_tag_with("level.high", Some(Literal::Int(2)));
        let two = b.int(2);
        let t = b.tag_of("#level", two);
        b.body(vec![t])
    });
    let high = h.tag("level.high");
    assert_eq!(h.run(&body).unwrap(), Value::Tag(high));
}

fn shared_value(config: EvalConfig) -> (super::Harness, Body) {
    single_with(config, |b| {
        b.declare_tag("dup")
            .declare_tag_with("dup.a", Some(Literal::Int(1)))
            .declare_tag_with("dup.b", Some(Literal::Int(1)));
        let one = b.int(1);
        let t = b.tag_of("#dup", one);
        b.body(vec![t])
    })
}

#[test]
fn tag_of_shared_value_is_ambiguous_by_default() {
    let (mut h, body) = shared_value(EvalConfig::default());
    let out = h.run(&body).unwrap();
    let f = failure(&out);
    assert_eq!(f.kind, TagRef::TAG_AMBIGUOUS);
    assert_eq!(f.errors.len(), 2);
}

#[test]
fn tag_of_first_match_is_opt_in() {
    let (mut h, body) =
        shared_value(EvalConfig::default().with_tag_values(TagValuePolicy::FirstMatch));
    let a = h.tag("dup.a");
    assert_eq!(h.run(&body).unwrap(), Value::Tag(a));
}

#[test]
fn scalar_coerces_into_tagged_field() {
    let (mut h, _) = single(|b| {
        b.declare_tag("level")
            .declare_tag_with("level.low", Some(Literal::Int(1)))
            .declare_tag_with("level.high", Some(Literal::Int(2)));
        let fields = vec![b.spec_tagged("level", "#level")];
        b.declare_shape("alert", fields);
        Body::default()
    });
    let low = h.tag("level.low");
    let out = h
        .interp
        .construct("alert", &Value::Int(1), MatchMode::Strict)
        .unwrap();
    assert_eq!(out, h.record(&[("level", Value::Tag(low))]));
}

#[test]
fn unknown_tag_is_internal_error() {
    let (mut h, body) = single(|b| {
        let t = b.tag("#nowhere");
        b.body(vec![t])
    });
    let err = h.run(&body).unwrap_err();
    assert!(matches!(
        err.kind,
        grain_value::EvalErrorKind::InvalidAst { .. }
    ));
}

#[test]
fn positional_fields_build_lists() {
    let (mut h, body) = single(|b| {
        let (one, two) = (b.int(1), b.int(2));
        let s = b.structure(vec![b.pos(one), b.pos(two)]);
        b.body(vec![s])
    });
    assert_eq!(h.run(&body).unwrap(), ints(&[1, 2]));
}
