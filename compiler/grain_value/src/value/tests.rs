use super::*;
use crate::refs::ResourceHandle;
use crate::structure::Field;

#[test]
fn test_kind_names() {
    assert_eq!(Value::Int(1).kind_name(), "int");
    assert_eq!(Value::string("a").kind_name(), "str");
    assert_eq!(Value::Tag(TagRef::FAILURE).kind_name(), "tag");
    assert_eq!(Value::structure(Structure::empty()).kind_name(), "structure");
    assert_eq!(Value::break_with(None).kind_name(), "break");
}

#[test]
fn test_int_widens_to_float() {
    assert_eq!(Value::Int(3).as_float(), Some(3.0));
    assert_eq!(Value::Float(2.5).as_float(), Some(2.5));
    assert_eq!(Value::Float(2.5).as_int(), None);
    assert_eq!(Value::Bool(true).as_float(), None);
}

#[test]
fn test_equality_is_structural_for_structures() {
    let a = Value::structure(Structure::from_values([Value::Int(1), Value::Int(2)]));
    let b = Value::structure(Structure::from_values([Value::Int(1), Value::Int(2)]));
    let c = Value::structure(Structure::from_values([Value::Int(2), Value::Int(1)]));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_resource_equality_is_identity() {
    let handle = ResourceHandle::new(1u32);
    let a = Value::resource(handle.clone());
    let b = Value::resource(handle);
    let c = Value::resource(ResourceHandle::new(1u32));
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_to_structure_wraps_scalar() {
    let s = Value::Int(5).to_structure();
    assert_eq!(s.fields(), &[Field::positional(Value::Int(5))]);
}

#[test]
fn test_is_scalar() {
    assert!(Value::Void.is_scalar());
    assert!(Value::Tag(TagRef::FAILURE).is_scalar());
    assert!(!Value::structure(Structure::empty()).is_scalar());
    assert!(!Value::Skip.is_scalar());
}
