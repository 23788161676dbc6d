//! Shape definitions.
//!
//! A shape is a name plus ordered field specs. Shapes are stored in their
//! module's arena and addressed by `ShapeId`; constraints that name other
//! shapes hold ids, which is what lets a module forward-reference shapes it
//! declares later.

use grain_ir::{ExprId, ModuleId, Name, ScalarType, ShapeId};
use grain_value::TagRef;

/// What a field's value must be.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Constraint {
    #[default]
    Any,
    Scalar(ScalarType),
    /// Morph the value into this shape.
    Shape(ShapeId),
    /// Best-scoring member; a tie is ambiguous.
    Union(Vec<ShapeId>),
}

/// One field of a shape.
#[derive(Clone, PartialEq, Debug)]
pub struct FieldSpec {
    pub name: Option<Name>,
    pub constraint: Constraint,
    /// The bound value must carry this tag or a descendant.
    pub tag: Option<TagRef>,
    /// Expression in the owning module's arena, evaluated when unbound.
    pub default: Option<ExprId>,
    pub required: bool,
}

impl FieldSpec {
    /// Required named field.
    pub fn named(name: Name, constraint: Constraint) -> Self {
        FieldSpec {
            name: Some(name),
            constraint,
            tag: None,
            default: None,
            required: true,
        }
    }

    /// Required unnamed field.
    pub fn positional(constraint: Constraint) -> Self {
        FieldSpec {
            name: None,
            constraint,
            tag: None,
            default: None,
            required: true,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: TagRef) -> Self {
        self.tag = Some(tag);
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: ExprId) -> Self {
        self.default = Some(default);
        self.required = false;
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Whether the match fails when nothing binds this field.
    pub fn is_mandatory(&self) -> bool {
        self.required && self.default.is_none()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Shape {
    pub id: ShapeId,
    /// `Name::EMPTY` for anonymous parameter shapes.
    pub name: Name,
    pub fields: Vec<FieldSpec>,
}

impl Shape {
    pub fn module(&self) -> ModuleId {
        self.id.module
    }

    pub fn is_anonymous(&self) -> bool {
        self.name == Name::EMPTY
    }

    /// Fields that must bind from the input.
    pub fn mandatory_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_mandatory()).count()
    }

    pub fn field(&self, name: Name) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == Some(name))
    }
}
