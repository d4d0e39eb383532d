//! Logical errors which can occur while interacting with a metamodel.
//!
//! Structural errors (unknown kind, link or type, duplicate class) are fatal
//! to the operation that raised them. Relate, unrelate and delete errors are
//! recoverable; callers may retry. The integrity checker never errors — it
//! returns structured findings (see [`check`](crate::check)).

use std::fmt;

use thiserror::Error;

use crate::ident::RelId;

/// A kind was looked up that is not registered in the metamodel.
#[derive(Debug, Clone, Error)]
#[error("no class of kind '{kind}' is defined in the metamodel")]
pub struct UnknownClassError {
    /// The kind as it was given.
    pub kind: String,
}

/// `define_class` was called for a kind that already exists.
#[derive(Debug, Clone, Error)]
#[error("a class with the name '{kind}' is already defined")]
pub struct DuplicateClassError {
    pub kind: String,
}

/// An attribute type spelling could not be resolved to a primitive.
#[derive(Debug, Clone, Error)]
#[error("unknown type named '{name}'")]
pub struct UnknownTypeError {
    pub name: String,
}

/// No link with the given (target kind, relation id, phrase) triple is
/// registered on the source class.
#[derive(Debug, Clone)]
pub struct UnknownLinkError {
    pub from_kind: String,
    pub to_kind: String,
    pub rel_id: RelId,
    pub phrase: String,
}

impl fmt::Display for UnknownLinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.phrase.is_empty() {
            write!(f, "{}->{}[{}]", self.from_kind, self.to_kind, self.rel_id)
        } else {
            write!(
                f,
                "{}->{}[{}, '{}']",
                self.from_kind, self.to_kind, self.rel_id, self.phrase
            )
        }
    }
}

impl std::error::Error for UnknownLinkError {}

/// `delete` was called with an instance that is not in the class's pool.
#[derive(Debug, Clone, Copy, Error)]
#[error("instance not found in the instance pool")]
pub struct DeleteError;

/// `relate` was rejected.
#[derive(Debug, Clone, Error)]
pub enum RelateError {
    /// The (kinds, relation id, phrase) tuple did not resolve to an
    /// association in either direction.
    #[error(transparent)]
    UnknownLink(#[from] UnknownLinkError),

    /// Cardinality would be violated: one of the instances is already
    /// related to another partner across a non-many link.
    #[error("instances already related across {rel_id}")]
    AlreadyRelated { rel_id: RelId },
}

/// `unrelate` was rejected.
#[derive(Debug, Clone, Error)]
pub enum UnrelateError {
    /// The (kinds, relation id, phrase) tuple did not resolve to an
    /// association in either direction.
    #[error(transparent)]
    UnknownLink(#[from] UnknownLinkError),

    /// The pair is not related across the association.
    #[error("instances not related across {rel_id}")]
    NotRelated { rel_id: RelId },
}

/// Any error raised by the metamodel.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    UnknownClass(#[from] UnknownClassError),

    #[error(transparent)]
    DuplicateClass(#[from] DuplicateClassError),

    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),

    #[error(transparent)]
    UnknownLink(#[from] UnknownLinkError),

    #[error(transparent)]
    Relate(#[from] RelateError),

    #[error(transparent)]
    Unrelate(#[from] UnrelateError),

    #[error(transparent)]
    Delete(#[from] DeleteError),
}
