//! Structural signatures for dispatch memoization.
//!
//! Two arguments with equal signatures score identically against every
//! overload. Scalar values are part of the signature because tag-by-value
//! coercion depends on them.

use grain_ir::Name;
use grain_value::{FunctionRef, Structure, TagRef, Value};

/// Hashable summary of a structure.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct StructSig(Vec<FieldSig>);

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
struct FieldSig {
    name: Option<Name>,
    tag: Option<TagRef>,
    value: ValueSig,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
enum ValueSig {
    Void,
    Bool(bool),
    Int(i64),
    /// Bit pattern, so the signature stays `Eq + Hash`.
    Float(u64),
    Str(String),
    Tag(TagRef),
    Function(FunctionRef),
    Structure(StructSig),
    /// Resources and signals only contribute their kind.
    Opaque(&'static str),
}

impl StructSig {
    pub fn of(s: &Structure) -> Self {
        StructSig(
            s.fields()
                .iter()
                .map(|f| FieldSig {
                    name: f.name,
                    tag: f.tag,
                    value: ValueSig::of(&f.value),
                })
                .collect(),
        )
    }
}

impl ValueSig {
    fn of(value: &Value) -> Self {
        match value {
            Value::Void => ValueSig::Void,
            Value::Bool(b) => ValueSig::Bool(*b),
            Value::Int(n) => ValueSig::Int(*n),
            Value::Float(x) => ValueSig::Float(x.to_bits()),
            Value::Str(s) => ValueSig::Str(s.to_string()),
            Value::Tag(t) => ValueSig::Tag(*t),
            Value::Function(f) => ValueSig::Function(*f),
            Value::Structure(s) => ValueSig::Structure(StructSig::of(s)),
            other => ValueSig::Opaque(other.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grain_value::Field;

    #[test]
    fn test_equal_structures_equal_signatures() {
        let a = Structure::new(vec![Field::named(Name::from_raw(10), Value::Int(1))]);
        let b = Structure::new(vec![Field::named(Name::from_raw(10), Value::Int(1))]);
        assert_eq!(StructSig::of(&a), StructSig::of(&b));
    }

    #[test]
    fn test_values_distinguish_signatures() {
        let a = Structure::from_values([Value::string("red")]);
        let b = Structure::from_values([Value::string("blue")]);
        assert_ne!(StructSig::of(&a), StructSig::of(&b));
    }

    #[test]
    fn test_nested_structures_contribute() {
        let inner = Structure::from_values([Value::Int(1)]);
        let a = Structure::from_values([Value::Structure(inner)]);
        let b = Structure::from_values([Value::Structure(Structure::empty())]);
        assert_ne!(StructSig::of(&a), StructSig::of(&b));
    }
}
