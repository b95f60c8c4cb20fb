//! Error types for type-system operations.

use cmr_types::{ErrorKind, ObjectTypeId};
use thiserror::Error;

/// Errors that can occur while registering or resolving type definitions.
#[derive(Debug, Error)]
pub enum TypeSystemError {
    /// The requested type is not registered.
    #[error("type not found: {0}")]
    NotFound(ObjectTypeId),

    /// The parent named by a new type definition is not registered.
    #[error("parent type {parent} of {type_id} not found")]
    TypeParentNotFound {
        type_id: ObjectTypeId,
        parent: ObjectTypeId,
    },

    /// Only the built-in base types may be parentless.
    #[error("type {0} has no parent type")]
    MissingParent(ObjectTypeId),

    /// A type with this id is already registered.
    #[error("type already exists: {0}")]
    AlreadyExists(ObjectTypeId),

    /// Another type already uses this query name.
    #[error("query name {query_name} already used by type {existing}")]
    DuplicateQueryName {
        query_name: String,
        existing: ObjectTypeId,
    },

    /// A sub-type must keep its parent's base kind.
    #[error("type {type_id} declares base {declared} but its parent is a {parent}")]
    BaseKindMismatch {
        type_id: ObjectTypeId,
        declared: String,
        parent: String,
    },

    /// An own property definition collides with one inherited from an ancestor.
    #[error("property {property} of {type_id} is already defined by an ancestor type")]
    InheritedPropertyRedefined {
        type_id: ObjectTypeId,
        property: String,
    },

    /// A type flag is not meaningful for the type's base kind.
    #[error("invalid type definition {type_id}: {reason}")]
    InvalidDefinition {
        type_id: ObjectTypeId,
        reason: String,
    },

    /// A type id, query name or property id is malformed.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Descendant depth must be at least one.
    #[error("invalid depth: {0}")]
    InvalidDepth(usize),

    /// The built-in base types cannot be removed.
    #[error("base type {0} cannot be deleted")]
    BaseTypeImmutable(ObjectTypeId),

    /// A type with registered sub-types cannot be removed.
    #[error("type {0} still has sub-types")]
    HasSubtypes(ObjectTypeId),

    /// The operation is not implemented (e.g. type updates).
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The registry lock was poisoned by a panicking writer.
    #[error("type registry lock poisoned")]
    LockPoisoned,
}

impl TypeSystemError {
    /// Map onto the repository-wide taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::ObjectNotFound,
            Self::TypeParentNotFound { .. }
            | Self::MissingParent(_)
            | Self::AlreadyExists(_)
            | Self::DuplicateQueryName { .. }
            | Self::BaseKindMismatch { .. }
            | Self::InheritedPropertyRedefined { .. }
            | Self::InvalidDefinition { .. }
            | Self::InvalidName { .. }
            | Self::InvalidDepth(_) => ErrorKind::InvalidArgument,
            Self::BaseTypeImmutable(_) | Self::HasSubtypes(_) => ErrorKind::Constraint,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::LockPoisoned => ErrorKind::Runtime,
        }
    }
}

/// Convenience alias for type-system results.
pub type Result<T> = std::result::Result<T, TypeSystemError>;
