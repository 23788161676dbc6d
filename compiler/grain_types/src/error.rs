//! Registry construction errors.

use thiserror::Error;

/// Errors raised while building a program's registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("module `{module}` is sealed")]
    Sealed { module: String },

    #[error("duplicate module `{name}`")]
    DuplicateModule { name: String },

    #[error("unknown module `{name}`")]
    UnknownModule { name: String },

    #[error("duplicate shape `{name}`")]
    DuplicateShape { name: String },

    #[error("unknown shape `{name}`")]
    UnknownShape { name: String },

    #[error("duplicate tag `{path}`")]
    DuplicateTag { path: String },

    #[error("unknown tag `{path}`")]
    UnknownTag { path: String },

    #[error("parent of tag `{path}` is not declared")]
    TagParentMissing { path: String },

    #[error("registry capacity exceeded for {what}")]
    Capacity { what: String },
}
