use super::*;
use crate::ast::Literal;

#[test]
fn test_alloc_and_get() {
    let mut arena = ExprArena::new();
    let a = arena.alloc_kind(ExprKind::Literal(Literal::Int(1)));
    let b = arena.alloc(Expr::new(ExprKind::Input, Span::new(3, 8)));

    assert_eq!(a, ExprId::new(0));
    assert_eq!(b, ExprId::new(1));
    assert_eq!(arena.get(a).kind, ExprKind::Literal(Literal::Int(1)));
    assert_eq!(arena.get(b).span, Span::new(3, 8));
    assert_eq!(arena.len(), 2);
}

#[test]
fn test_try_get_invalid() {
    let arena = ExprArena::new();
    assert!(arena.is_empty());
    assert!(arena.try_get(ExprId::INVALID).is_none());
    assert!(arena.try_get(ExprId::new(0)).is_none());
}

#[test]
fn test_shared_arena_derefs() {
    let mut arena = ExprArena::new();
    let id = arena.alloc_kind(ExprKind::Skip);
    let shared = SharedArena::from(arena);
    let clone = shared.clone();
    assert_eq!(clone.get(id).kind, ExprKind::Skip);
}
