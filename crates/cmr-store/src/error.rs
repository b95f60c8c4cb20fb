use cmr_types::{ChangeToken, ErrorKind, ObjectId, ObjectTypeId};
use cmr_typesys::TypeSystemError;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object with this id exists.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// No object is reachable at this path.
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// The requested type is not registered.
    #[error("unknown type: {0}")]
    UnknownType(ObjectTypeId),

    /// A missing or malformed argument or property.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A sibling with the same name already exists under the parent.
    #[error("an object named {name:?} already exists in folder {parent}")]
    NameConflict { name: String, parent: ObjectId },

    /// The name does not satisfy the name-validity rule.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The operation does not apply to this object's kind or filing mode.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The version series is already checked out.
    #[error("version series {0} is already checked out")]
    AlreadyCheckedOut(ObjectId),

    /// The version series is not checked out.
    #[error("version series {0} is not checked out")]
    NotCheckedOut(ObjectId),

    /// The version series is checked out by a different principal.
    #[error("version series {id} is checked out by {owner}")]
    CheckedOutByOther { id: ObjectId, owner: String },

    /// The acting principal does not own the check-out.
    #[error("{user} may not modify version series {id} checked out by {owner}")]
    PermissionDenied {
        id: ObjectId,
        user: String,
        owner: String,
    },

    /// The supplied change token no longer matches the object.
    #[error("stale change token for {id}: supplied {supplied}, current {current}")]
    StaleChangeToken {
        id: ObjectId,
        supplied: ChangeToken,
        current: ChangeToken,
    },

    /// Stored objects still have this type.
    #[error("type {0} is still in use")]
    TypeInUse(ObjectTypeId),

    /// The capability is not implemented.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Type registry failure.
    #[error("type system error: {0}")]
    Type(#[from] TypeSystemError),

    /// The store lock was poisoned by a panicking writer.
    #[error("object store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Map onto the repository-wide taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::PathNotFound(_) => ErrorKind::ObjectNotFound,
            Self::UnknownType(_) | Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NameConflict { .. } | Self::InvalidName { .. } => {
                ErrorKind::NameConstraintViolation
            }
            Self::Constraint(_) | Self::NotCheckedOut(_) | Self::TypeInUse(_) => {
                ErrorKind::Constraint
            }
            Self::AlreadyCheckedOut(_)
            | Self::CheckedOutByOther { .. }
            | Self::StaleChangeToken { .. } => ErrorKind::UpdateConflict,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::Type(e) => e.kind(),
            Self::LockPoisoned => ErrorKind::Runtime,
        }
    }

    pub(crate) fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
