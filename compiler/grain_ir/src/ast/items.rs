//! Module-level declarations: tags, shapes, and functions.

use crate::{ExprId, Name, SharedArena, Span};

use super::expr::{Literal, TagPath};
use super::pipeline::Body;

/// Scalar kinds a field constraint can name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScalarType {
    Int,
    Float,
    /// Int or float.
    Number,
    Bool,
    Str,
    Tag,
    Function,
}

impl ScalarType {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Tag => "tag",
            Self::Function => "function",
        }
    }
}

/// Field constraint as declared.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ConstraintDef {
    #[default]
    Any,
    Scalar(ScalarType),
    /// A shape, looked up in the declaring module and its dependencies.
    Shape(Name),
    /// Any of several shapes.
    Union(Vec<Name>),
}

/// One field of a shape declaration or inline parameter list.
#[derive(Clone, PartialEq, Debug)]
pub struct FieldSpecDef {
    pub name: Option<Name>,
    pub constraint: ConstraintDef,
    /// Tag the input field must carry (the tag or a descendant).
    pub tag: Option<TagPath>,
    pub default: Option<ExprId>,
    pub required: bool,
}

impl FieldSpecDef {
    /// Required named field with no constraint.
    pub fn named(name: Name) -> Self {
        FieldSpecDef {
            name: Some(name),
            constraint: ConstraintDef::Any,
            tag: None,
            default: None,
            required: true,
        }
    }

    /// Required unnamed field, bound by position.
    pub fn positional(constraint: ConstraintDef) -> Self {
        FieldSpecDef {
            name: None,
            constraint,
            tag: None,
            default: None,
            required: true,
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: ConstraintDef) -> Self {
        self.constraint = constraint;
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: TagPath) -> Self {
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
}

/// Module a tag extension reaches into.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TagOrigin {
    pub module: Name,
    pub path: TagPath,
}

/// Tag declaration. With `extends`, `path` names the new child relative to
/// the extended tag and the node is added to the origin's hierarchy.
#[derive(Clone, PartialEq, Debug)]
pub struct TagDef {
    pub path: TagPath,
    pub value: Option<Literal>,
    pub extends: Option<TagOrigin>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ShapeDef {
    pub name: Name,
    pub fields: Vec<FieldSpecDef>,
    pub span: Span,
}

/// Function parameter: a named shape or an inline field list.
#[derive(Clone, PartialEq, Debug)]
pub enum ParamDef {
    Shape(Name),
    Inline(Vec<FieldSpecDef>),
}

/// One overload of a named function.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionDef {
    pub name: Name,
    pub param: ParamDef,
    pub body: Body,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Item {
    Tag(TagDef),
    Shape(ShapeDef),
    Function(FunctionDef),
}

/// A parsed module. Every `ExprId` in its items indexes `arena`.
#[derive(Clone, Debug)]
pub struct Module {
    pub name: Name,
    pub deps: Vec<Name>,
    pub items: Vec<Item>,
    pub arena: SharedArena,
}
