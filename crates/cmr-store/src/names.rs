//! Object name validation and comparison.
//!
//! A valid object name:
//! - Is non-empty and at most 255 characters
//! - Contains no `/` (the path separator) and no control characters
//! - Is not `.` or `..`
//!
//! Whether two names collide within a folder depends on the configured
//! [`NameComparison`].

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

const MAX_NAME_LEN: usize = 255;

/// How sibling names are compared for uniqueness and path lookup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameComparison {
    #[default]
    Exact,
    CaseInsensitive,
}

impl NameComparison {
    /// Returns `true` if `a` and `b` name the same slot in a folder.
    pub fn same(&self, a: &str, b: &str) -> bool {
        match self {
            Self::Exact => a == b,
            Self::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
        }
    }
}

fn invalid(name: &str, reason: &str) -> StoreError {
    StoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate an object name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use cmr_store::names::validate_name;
///
/// assert!(validate_name("report.pdf").is_ok());
/// assert!(validate_name("a/b").is_err());
/// assert!(validate_name("..").is_err());
/// ```
pub fn validate_name(name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid(name, "name longer than 255 characters"));
    }
    if name == "." || name == ".." {
        return Err(invalid(name, "name must not be a relative path segment"));
    }
    if name.contains('/') {
        return Err(invalid(name, "name must not contain '/'"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid(name, "name must not contain control characters"));
    }
    Ok(())
}
