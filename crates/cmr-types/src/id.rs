use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a stored object.
///
/// Ids are generated at creation time from a UUID v7 and are never reused,
/// even after the object is deleted. They are opaque to callers: bindings
/// round-trip them as strings.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Generate a fresh, time-ordered object id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing id string (e.g. one received from a binding).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (last 8 characters, the random part of a v7 UUID).
    pub fn short_id(&self) -> &str {
        let start = self.0.len().saturating_sub(8);
        self.0.get(start..).unwrap_or(&self.0)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_id())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a type definition (e.g. `cmis:document`, `my:invoice`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectTypeId(String);

impl ObjectTypeId {
    /// Wrap a type id such as `cmis:document`.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectTypeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectTypeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ObjectTypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = ObjectId::generate();
        let b = ObjectId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_ids_are_time_ordered() {
        let a = ObjectId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = ObjectId::generate();
        assert!(a < b);
    }

    #[test]
    fn short_id_is_suffix() {
        let id = ObjectId::new("0123456789abcdef");
        assert_eq!(id.short_id(), "89abcdef");
        assert_eq!(ObjectId::new("abc").short_id(), "abc");
    }

    #[test]
    fn serde_is_transparent() {
        let id = ObjectId::new("doc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"doc-1\"");
        let ty: ObjectTypeId = serde_json::from_str("\"cmis:folder\"").unwrap();
        assert_eq!(ty.as_str(), "cmis:folder");
    }
}
