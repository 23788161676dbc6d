use super::*;
use crate::{ExprId, Name};

#[test]
fn test_binary_op_symbols() {
    assert_eq!(BinaryOp::Add.as_symbol(), "+");
    assert_eq!(BinaryOp::Rem.as_symbol(), "%");
    assert_eq!(BinaryOp::NotEq.as_symbol(), "!=");
    assert_eq!(BinaryOp::Or.as_symbol(), "||");
}

#[test]
fn test_binary_op_classes() {
    assert!(BinaryOp::LtEq.is_comparison());
    assert!(!BinaryOp::Mul.is_comparison());
    assert!(BinaryOp::And.is_logical());
    assert!(!BinaryOp::Eq.is_logical());
}

#[test]
fn test_tag_path_last() {
    let path = TagPath::new(vec![Name::from_raw(10), Name::from_raw(11)]);
    assert_eq!(path.last(), Some(Name::from_raw(11)));
    assert!(TagPath::default().last().is_none());
    assert!(TagPath::default().is_empty());
}

#[test]
fn test_field_spec_default_makes_optional() {
    let spec = FieldSpecDef::named(Name::from_raw(10)).with_default(ExprId::new(0));
    assert!(!spec.required);
    assert_eq!(spec.default, Some(ExprId::new(0)));
}

#[test]
fn test_stmt_expr() {
    assert_eq!(Stmt::Continue(ExprId::new(3)).expr(), ExprId::new(3));
    assert_eq!(Stmt::Expr(ExprId::new(1)).expr(), ExprId::new(1));
}

#[test]
fn test_scalar_names() {
    assert_eq!(ScalarType::Number.name(), "number");
    assert_eq!(ScalarType::Function.name(), "function");
}
