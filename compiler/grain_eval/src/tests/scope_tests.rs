//! Write strengths and name resolution across frames and layers.

use grain_ir::{ModuleAstBuilder, WriteStrength};
use grain_value::{TagRef, Value};
use pretty_assertions::assert_eq;

use super::{failure, single};

/// `keep{v}` writes `v` strongly as `seen`; `scratch{v}` writes it locally.
fn writers(b: &mut ModuleAstBuilder<'_>) {
    let v = b.field("v");
    let keep = b.write("seen", WriteStrength::Strong, v);
    let body = b.body(vec![keep]);
    let fields = vec![b.spec("v")];
    b.declare_function_inline("keep", fields, body);

    let v = b.field("v");
    let local = b.write("scratch", WriteStrength::Local, v);
    let body = b.body(vec![local]);
    let fields = vec![b.spec("v")];
    b.declare_function_inline("scratch", fields, body);
}

#[test]
fn strong_write_outlives_the_call() {
    let (mut h, body) = single(|b| {
        writers(b);
        let five = b.int(5);
        let call = b.pipeline(Some(five), vec![b.invoke(b.call("keep"))]);
        let seen = b.field("seen");
        b.body(vec![call, seen])
    });
    assert_eq!(h.run(&body).unwrap(), Value::Int(5));
    assert_eq!(h.interp.env().lookup(h.n("seen")), Some(Value::Int(5)));
}

#[test]
fn local_write_stays_in_its_frame() {
    let (mut h, body) = single(|b| {
        writers(b);
        let five = b.int(5);
        let call = b.pipeline(Some(five), vec![b.invoke(b.call("scratch"))]);
        let scratch = b.field("scratch");
        b.body(vec![call, scratch])
    });
    let out = h.run(&body).unwrap();
    assert_eq!(failure(&out).kind, TagRef::FIELD_UNDEFINED);
}

#[test]
fn weak_write_never_overrides() {
    let (mut h, body) = single(|b| {
        let one = b.int(1);
        let first = b.write("a", WriteStrength::Local, one);
        let two = b.int(2);
        let second = b.write("a", WriteStrength::Weak, two);
        let a = b.field("a");
        b.body(vec![first, second, a])
    });
    assert_eq!(h.run(&body).unwrap(), Value::Int(1));
}

#[test]
fn weak_write_binds_unresolved_names() {
    let (mut h, body) = single(|b| {
        let three = b.int(3);
        let write = b.write("b", WriteStrength::Weak, three);
        let read = b.field("b");
        b.body(vec![write, read])
    });
    assert_eq!(h.run(&body).unwrap(), Value::Int(3));
}

#[test]
fn weak_write_defers_to_application_bindings() {
    let (mut h, body) = single(|b| {
        let two = b.int(2);
        let write = b.write("limit", WriteStrength::Weak, two);
        let read = b.field("limit");
        b.body(vec![write, read])
    });
    let limit = h.n("limit");
    h.interp.env_mut().define_application(limit, Value::Int(10));
    assert_eq!(h.run(&body).unwrap(), Value::Int(10));
}

#[test]
fn input_fields_shadow_module_bindings() {
    let (mut h, body) = single(|b| {
        let x = b.field("x");
        b.body(vec![x])
    });
    let module = h.interp.module();
    let x = h.n("x");
    h.interp.env_mut().define_module(module, x, Value::Int(1));
    assert_eq!(h.run(&body).unwrap(), Value::Int(1));
    let out = h.run_with(&body, h.record(&[("x", Value::Int(2))])).unwrap();
    assert_eq!(out, Value::Int(2));
}

#[test]
fn block_sees_the_enclosing_frame() {
    let (mut h, body) = single(|b| {
        let one = b.int(1);
        let outer = b.write("a", WriteStrength::Local, one);
        let a = b.field("a");
        let input = b.input();
        let inner = b.structure(vec![b.named("a", a), b.named("in", input)]);
        let inner = b.body(vec![inner]);
        let block = b.block(inner);
        b.body(vec![outer, block])
    });
    let out = h.run_with(&body, Value::Int(3)).unwrap();
    assert_eq!(out, h.record(&[("a", Value::Int(1)), ("in", Value::Int(3))]));
}

#[test]
fn block_locals_are_dropped_on_exit() {
    let (mut h, body) = single(|b| {
        let one = b.int(1);
        let inner = b.write("tmp", WriteStrength::Local, one);
        let inner = b.body(vec![inner]);
        let block = b.block(inner);
        let tmp = b.field("tmp");
        b.body(vec![block, tmp])
    });
    let out = h.run(&body).unwrap();
    assert_eq!(failure(&out).kind, TagRef::FIELD_UNDEFINED);
}

#[test]
fn callee_cannot_see_caller_locals() {
    let (mut h, body) = single(|b| {
        let secret = b.field("secret");
        let peek = b.body(vec![secret]);
        let fields = vec![b.spec("v")];
        b.declare_function_inline("peek", fields, peek);

        let one = b.int(1);
        let hide = b.write("secret", WriteStrength::Local, one);
        let zero = b.int(0);
        let call = b.pipeline(Some(zero), vec![b.invoke(b.call("peek"))]);
        b.body(vec![hide, call])
    });
    let out = h.run(&body).unwrap();
    assert_eq!(failure(&out).kind, TagRef::FIELD_UNDEFINED);
}

#[test]
fn environment_frames_unwind_after_a_run() {
    let (mut h, body) = single(|b| {
        let one = b.int(1);
        let inner = b.body(vec![one]);
        let block = b.block(inner);
        b.body(vec![block])
    });
    let depth = h.interp.env().depth();
    h.run(&body).unwrap();
    assert_eq!(h.interp.env().depth(), depth);
}
