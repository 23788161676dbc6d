use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_path_strips_hash() {
    let interner = StringInterner::new();
    let b = ModuleAstBuilder::new(&interner, "m");
    let path = b.path("#color.red");
    assert_eq!(path.segments.len(), 2);
    assert_eq!(interner.lookup(path.segments[0]), "color");
    assert_eq!(interner.lookup(path.segments[1]), "red");
    assert_eq!(b.path("color.red"), path);
}

#[test]
fn test_finish_collects_items_in_order() {
    let interner = StringInterner::new();
    let mut b = ModuleAstBuilder::new(&interner, "geo").dep("util");
    b.declare_tag("#color").declare_tag("#color.red");
    let x = b.spec("x");
    b.declare_shape("point", vec![x]);
    let body_expr = b.input();
    let body = b.body(vec![body_expr]);
    b.declare_function("id", "point", body);

    let module = b.finish();
    assert_eq!(interner.lookup(module.name), "geo");
    assert_eq!(module.deps, vec![interner.intern("util")]);
    assert_eq!(module.items.len(), 4);
    assert!(matches!(module.items[0], Item::Tag(_)));
    assert!(matches!(module.items[2], Item::Shape(_)));
    assert!(matches!(module.items[3], Item::Function(_)));
    assert_eq!(module.arena.len(), 1);
}

#[test]
fn test_pipeline_steps_get_dummy_spans() {
    let interner = StringInterner::new();
    let mut b = ModuleAstBuilder::new(&interner, "m");
    let seed = b.int(1);
    let op = b.invoke(b.call("f"));
    let id = b.pipeline(Some(seed), vec![op]);
    let module = b.finish();
    match &module.arena.get(id).kind {
        ExprKind::Pipeline(p) => {
            assert_eq!(p.seed, Some(seed));
            assert_eq!(p.steps.len(), 1);
            assert!(p.steps[0].span.is_dummy());
        }
        other => panic!("expected pipeline, got {other:?}"),
    }
}

#[test]
fn test_extend_tag_records_origin() {
    let interner = StringInterner::new();
    let mut b = ModuleAstBuilder::new(&interner, "ext");
    b.extend_tag("base", "#color", "#teal", Some(Literal::Int(7)));
    let module = b.finish();
    let Item::Tag(def) = &module.items[0] else {
        panic!("expected tag item");
    };
    let origin = def.extends.as_ref().map(|o| interner.lookup(o.module));
    assert_eq!(origin, Some("base"));
    assert_eq!(def.value, Some(Literal::Int(7)));
}
