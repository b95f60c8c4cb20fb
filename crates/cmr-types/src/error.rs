use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by parsing or converting foundation types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid change token: {0}")]
    InvalidChangeToken(String),

    #[error("unknown base kind: {0}")]
    UnknownBaseKind(String),

    #[error("unknown versioning state: {0}")]
    UnknownVersioningState(String),

    #[error("unknown property type: {0}")]
    UnknownPropertyType(String),

    #[error("value {value} is not a valid {expected}")]
    InvalidValue { value: String, expected: String },
}

/// Canonical error taxonomy of the repository.
///
/// Every crate keeps its own error enum, but each variant maps onto exactly
/// one kind so that all bindings report failures identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Missing or invalid argument, property or type.
    InvalidArgument,
    /// Unknown id, path or type.
    ObjectNotFound,
    /// Duplicate sibling name or invalid name.
    NameConstraintViolation,
    /// Operation not applicable to the object's kind or filing mode.
    Constraint,
    /// Double check-out or stale change token.
    UpdateConflict,
    /// Wrong acting principal for a checkout-owned operation.
    PermissionDenied,
    /// Capability not implemented by this repository.
    NotSupported,
    /// Internal fault (e.g. a poisoned lock).
    Runtime,
}

impl ErrorKind {
    /// Stable code for this kind, suitable for wire bindings.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalidArgument",
            Self::ObjectNotFound => "objectNotFound",
            Self::NameConstraintViolation => "nameConstraintViolation",
            Self::Constraint => "constraint",
            Self::UpdateConflict => "updateConflict",
            Self::PermissionDenied => "permissionDenied",
            Self::NotSupported => "notSupported",
            Self::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let kinds = [
            ErrorKind::InvalidArgument,
            ErrorKind::ObjectNotFound,
            ErrorKind::NameConstraintViolation,
            ErrorKind::Constraint,
            ErrorKind::UpdateConflict,
            ErrorKind::PermissionDenied,
            ErrorKind::NotSupported,
            ErrorKind::Runtime,
        ];
        let mut codes: Vec<_> = kinds.iter().map(ErrorKind::code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn display_uses_code() {
        assert_eq!(ErrorKind::UpdateConflict.to_string(), "updateConflict");
    }
}
