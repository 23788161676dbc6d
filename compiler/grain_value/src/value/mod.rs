//! Runtime values.
//!
//! # Heap Enforcement
//!
//! Composite payloads live behind `Heap<T>`, whose constructor is private to
//! this crate. Outside code builds them through the factory methods here
//! and on `Structure`.
//!
//! ```text
//! let s = Value::string("hello");                 // OK
//! let v = Value::structure(Structure::empty());   // OK
//! let s = Value::Str(Heap::new(...));             // ERROR: Heap::new is pub(crate)
//! ```
//!
//! # Thread Safety
//!
//! All heap types are `Arc`-backed, so values cross spawned evaluator threads
//! by cheap clone.

use std::fmt;

use crate::heap::Heap;
use crate::refs::{FunctionRef, ResourceHandle, TagRef};
use crate::structure::Structure;

/// Runtime value.
#[derive(Clone, Default)]
pub enum Value {
    // Scalars
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Heap<String>),
    Tag(TagRef),
    Function(FunctionRef),

    // Composite
    Structure(Structure),
    Resource(ResourceHandle),

    // Iteration signals
    /// Drop this element from an iteration's output.
    Skip,
    /// Stop iteration after contributing the optional value.
    Break(Option<Heap<Value>>),
}

// Factory Methods

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn structure(s: Structure) -> Self {
        Value::Structure(s)
    }

    #[inline]
    pub fn tag(tag: TagRef) -> Self {
        Value::Tag(tag)
    }

    #[inline]
    pub fn resource(handle: ResourceHandle) -> Self {
        Value::Resource(handle)
    }

    /// Break signal, optionally carrying a final element.
    #[inline]
    pub fn break_with(value: Option<Value>) -> Self {
        Value::Break(value.map(Heap::new))
    }
}

// Value Methods

impl Value {
    /// Kind name for failure messages and structural signatures.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Tag(_) => "tag",
            Value::Function(_) => "function",
            Value::Structure(_) => "structure",
            Value::Resource(_) => "resource",
            Value::Skip => "skip",
            Value::Break(_) => "break",
        }
    }

    /// Whether this is a failure value.
    #[inline]
    pub fn is_failure(&self) -> bool {
        match self {
            Value::Structure(s) => s.is_failure(),
            _ => false,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Void
                | Value::Bool(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Str(_)
                | Value::Tag(_)
                | Value::Function(_)
        )
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float view of a number. Ints widen.
    #[allow(
        clippy::cast_precision_loss,
        reason = "int to float widening is the language's number coercion"
    )]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<TagRef> {
        match self {
            Value::Tag(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a structure, auto-wrapping scalars.
    pub fn to_structure(&self) -> Structure {
        Structure::wrap(self.clone())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) | (Value::Skip, Value::Skip) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tag(a), Value::Tag(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Structure(a), Value::Structure(b)) => a == b,
            (Value::Resource(a), Value::Resource(b)) => a.ptr_eq(b),
            (Value::Break(a), Value::Break(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Tag(t) => write!(f, "Tag({:?}:{:?})", t.module, t.id),
            Value::Function(r) => write!(f, "Function({:?}:{:?})", r.module, r.name),
            Value::Structure(s) => fmt::Debug::fmt(s, f),
            Value::Resource(r) => fmt::Debug::fmt(r, f),
            Value::Skip => write!(f, "Skip"),
            Value::Break(v) => write!(f, "Break({v:?})"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Structure> for Value {
    fn from(s: Structure) -> Self {
        Value::Structure(s)
    }
}

#[cfg(test)]
mod tests;
