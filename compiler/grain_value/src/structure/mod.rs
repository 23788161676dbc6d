//! The universal composite value.
//!
//! A `Structure` is an ordered sequence of fields, each optionally named and
//! optionally tagged. Field order is observable. Every transformation returns
//! a new `Structure`; unchanged storage is shared through `Heap`.

use std::fmt;

use grain_ir::Name;

use crate::heap::Heap;
use crate::refs::TagRef;
use crate::value::Value;

/// One field of a structure.
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    pub name: Option<Name>,
    /// Annotation tag written on the field itself (`#t = v`).
    pub tag: Option<TagRef>,
    pub value: Value,
}

impl Field {
    pub fn new(name: Option<Name>, tag: Option<TagRef>, value: Value) -> Self {
        Field { name, tag, value }
    }

    /// Unnamed, untagged field.
    pub fn positional(value: Value) -> Self {
        Field {
            name: None,
            tag: None,
            value,
        }
    }

    pub fn named(name: Name, value: Value) -> Self {
        Field {
            name: Some(name),
            tag: None,
            value,
        }
    }

    /// Tag the field carries: its value when that is a tag, else its annotation.
    pub fn carried_tag(&self) -> Option<TagRef> {
        match &self.value {
            Value::Tag(t) => Some(*t),
            _ => self.tag,
        }
    }

    #[must_use]
    pub fn with_value(&self, value: Value) -> Self {
        Field {
            name: self.name,
            tag: self.tag,
            value,
        }
    }
}

/// Immutable ordered structure.
#[derive(Clone)]
pub struct Structure(Heap<Vec<Field>>);

impl Structure {
    pub fn new(fields: Vec<Field>) -> Self {
        Structure(Heap::new(fields))
    }

    pub fn empty() -> Self {
        Structure::new(Vec::new())
    }

    /// Auto-wrap: a structure stays itself, anything else becomes a
    /// one-field unnamed structure.
    pub fn wrap(value: Value) -> Self {
        match value {
            Value::Structure(s) => s,
            other => Structure::new(vec![Field::positional(other)]),
        }
    }

    /// Structure of unnamed fields, one per value.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Structure::new(values.into_iter().map(Field::positional).collect())
    }

    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Index of the first field named `name`.
    pub fn position(&self, name: Name) -> Option<usize> {
        self.0.iter().position(|f| f.name == Some(name))
    }

    /// Value of the first field named `name`.
    pub fn get(&self, name: Name) -> Option<&Value> {
        self.0
            .iter()
            .find(|f| f.name == Some(name))
            .map(|f| &f.value)
    }

    /// Unnamed fields in order.
    pub fn unnamed(&self) -> impl Iterator<Item = &Field> + '_ {
        self.0.iter().filter(|f| f.name.is_none())
    }

    /// Index and tag of the first field carrying a tag.
    pub fn first_tagged(&self) -> Option<(usize, TagRef)> {
        self.0
            .iter()
            .enumerate()
            .find_map(|(i, f)| f.carried_tag().map(|t| (i, t)))
    }

    /// The sole field's value, if there is exactly one field.
    pub fn single(&self) -> Option<&Value> {
        match &**self.0 {
            [only] => Some(&only.value),
            _ => None,
        }
    }

    /// Whether the first field is the `#failure` marker.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.0.first(),
            Some(Field { name: None, value: Value::Tag(t), .. }) if *t == TagRef::FAILURE
        )
    }

    /// New structure with `field` appended.
    #[must_use]
    pub fn with_field(&self, field: Field) -> Self {
        let mut next = self.clone();
        next.0.make_mut().push(field);
        next
    }

    /// New structure with the first field named `name` replaced, or the
    /// binding appended when absent.
    #[must_use]
    pub fn set(&self, name: Name, value: Value) -> Self {
        let mut next = self.clone();
        let fields = next.0.make_mut();
        match fields.iter_mut().find(|f| f.name == Some(name)) {
            Some(field) => field.value = value,
            None => fields.push(Field::named(name, value)),
        }
        next
    }

    /// New structure with field `index` replaced.
    #[must_use]
    pub fn replace_at(&self, index: usize, field: Field) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.0.make_mut().get_mut(index) {
            *slot = field;
        }
        next
    }

    /// New structure without any field named `name`.
    #[must_use]
    pub fn without(&self, name: Name) -> Self {
        Structure::new(
            self.0
                .iter()
                .filter(|f| f.name != Some(name))
                .cloned()
                .collect(),
        )
    }

    /// New structure with the fields of `other` (auto-wrapped) appended.
    #[must_use]
    pub fn spread(&self, other: &Value) -> Self {
        let mut next = self.clone();
        let fields = next.0.make_mut();
        match other {
            Value::Structure(s) => fields.extend(s.fields().iter().cloned()),
            scalar => fields.push(Field::positional(scalar.clone())),
        }
        next
    }

    /// Field values in order.
    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.0.iter().map(|f| &f.value)
    }

    /// Whether both structures share storage.
    pub fn ptr_eq(&self, other: &Structure) -> bool {
        Heap::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Structure {
    fn default() -> Self {
        Structure::empty()
    }
}

impl PartialEq for Structure {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Debug for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if let Some(name) = field.name {
                write!(f, "{name:?}=")?;
            }
            if let Some(tag) = field.tag {
                write!(f, "#{:?}:{:?} ", tag.module, tag.id)?;
            }
            write!(f, "{:?}", field.value)?;
        }
        f.write_str("}")
    }
}

impl FromIterator<Field> for Structure {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Structure::new(iter.into_iter().collect())
    }
}
