//! Validation of type ids, property ids and query names.
//!
//! Ids:
//! - Must be non-empty and at most 255 characters
//! - Must not contain whitespace or control characters
//!
//! Query names additionally must not contain characters that would need
//! quoting in a query: `,`, `"`, `'`, `\`, `.`, `(`, `)`.

use crate::error::{Result, TypeSystemError};

const MAX_ID_LEN: usize = 255;

/// Characters that are forbidden anywhere in a query name.
const QUERY_FORBIDDEN_CHARS: &[char] = &[',', '"', '\'', '\\', '.', '(', ')'];

fn invalid(name: &str, reason: impl Into<String>) -> TypeSystemError {
    TypeSystemError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn validate_id(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid(name, format!("{what} must not be empty")));
    }
    if name.chars().count() > MAX_ID_LEN {
        return Err(invalid(
            name,
            format!("{what} longer than {MAX_ID_LEN} characters"),
        ));
    }
    if let Some(ch) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid(
            name,
            format!("{what} contains forbidden character: {ch:?}"),
        ));
    }
    Ok(())
}

/// Validate a type id, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use cmr_typesys::names::validate_type_id;
///
/// assert!(validate_type_id("my:invoice").is_ok());
/// assert!(validate_type_id("").is_err());
/// assert!(validate_type_id("has space").is_err());
/// ```
pub fn validate_type_id(name: &str) -> Result<()> {
    validate_id(name, "type id")
}

/// Validate a property id. Same rules as type ids.
pub fn validate_property_id(name: &str) -> Result<()> {
    validate_id(name, "property id")
}

/// Validate a query name.
pub fn validate_query_name(name: &str) -> Result<()> {
    validate_id(name, "query name")?;
    for ch in QUERY_FORBIDDEN_CHARS {
        if name.contains(*ch) {
            return Err(invalid(
                name,
                format!("query name contains forbidden character: {ch:?}"),
            ));
        }
    }
    Ok(())
}
