//! Failure values.
//!
//! A failure is ordinary data: a structure whose first field is the
//! `#failure` marker, followed by `kind`, `message`, `partial`, and `errors`.
//! `Failure` is the typed view used to build and inspect one.

use grain_ir::Name;

use crate::refs::TagRef;
use crate::structure::{Field, Structure};
use crate::value::Value;

/// Typed view of a failure value.
#[derive(Clone, PartialEq, Debug)]
pub struct Failure {
    /// Failure kind; `#failure` itself or one of its descendants.
    pub kind: TagRef,
    pub message: String,
    /// Whatever had been built when the failure happened.
    pub partial: Structure,
    /// Per-field or per-candidate detail.
    pub errors: Structure,
}

impl Failure {
    pub fn new(kind: TagRef, message: impl Into<String>) -> Self {
        Failure {
            kind,
            message: message.into(),
            partial: Structure::empty(),
            errors: Structure::empty(),
        }
    }

    #[must_use]
    pub fn with_partial(mut self, partial: Structure) -> Self {
        self.partial = partial;
        self
    }

    #[must_use]
    pub fn with_errors(mut self, errors: Structure) -> Self {
        self.errors = errors;
        self
    }

    /// Re-raise with added context. The previous message moves into `errors`.
    #[must_use]
    pub fn enrich(self, context: &str) -> Self {
        let errors = self
            .errors
            .with_field(Field::positional(Value::string(self.message.as_str())));
        Failure {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
            partial: self.partial,
            errors,
        }
    }

    /// Encode as a structure value.
    pub fn into_value(self) -> Value {
        Value::Structure(Structure::new(vec![
            Field::positional(Value::Tag(TagRef::FAILURE)),
            Field::named(Name::KIND, Value::Tag(self.kind)),
            Field::named(Name::MESSAGE, Value::string(self.message)),
            Field::named(Name::PARTIAL, Value::Structure(self.partial)),
            Field::named(Name::ERRORS, Value::Structure(self.errors)),
        ]))
    }

    /// Decode a failure value. `None` when `value` is not a failure.
    ///
    /// Missing or malformed schema fields fall back to their empty forms, so a
    /// hand-built `{#failure}` still decodes.
    pub fn from_value(value: &Value) -> Option<Failure> {
        let s = value.as_structure().filter(|s| s.is_failure())?;
        let kind = s
            .get(Name::KIND)
            .and_then(Value::as_tag)
            .unwrap_or(TagRef::FAILURE);
        let message = s
            .get(Name::MESSAGE)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        let partial = s
            .get(Name::PARTIAL)
            .and_then(Value::as_structure)
            .cloned()
            .unwrap_or_default();
        let errors = s
            .get(Name::ERRORS)
            .and_then(Value::as_structure)
            .cloned()
            .unwrap_or_default();
        Some(Failure {
            kind,
            message,
            partial,
            errors,
        })
    }
}

impl From<Failure> for Value {
    fn from(failure: Failure) -> Self {
        failure.into_value()
    }
}

// Factory functions for the core failure kinds.

pub fn shape_mismatch(message: impl Into<String>) -> Failure {
    Failure::new(TagRef::SHAPE_MISMATCH, message)
}

pub fn dispatch_ambiguous(message: impl Into<String>) -> Failure {
    Failure::new(TagRef::DISPATCH_AMBIGUOUS, message)
}

pub fn dispatch_not_found(message: impl Into<String>) -> Failure {
    Failure::new(TagRef::DISPATCH_NOT_FOUND, message)
}

pub fn field_undefined(message: impl Into<String>) -> Failure {
    Failure::new(TagRef::FIELD_UNDEFINED, message)
}

pub fn arithmetic(message: impl Into<String>) -> Failure {
    Failure::new(TagRef::ARITHMETIC, message)
}

pub fn tag_ambiguous(message: impl Into<String>) -> Failure {
    Failure::new(TagRef::TAG_AMBIGUOUS, message)
}

pub fn thread(message: impl Into<String>) -> Failure {
    Failure::new(TagRef::THREAD, message)
}
