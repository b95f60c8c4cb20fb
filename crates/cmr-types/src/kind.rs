use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::ObjectTypeId;

/// The four base object kinds every type ultimately derives from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseKind {
    Document,
    Folder,
    Relationship,
    Policy,
}

impl BaseKind {
    pub const ALL: [BaseKind; 4] = [
        BaseKind::Document,
        BaseKind::Folder,
        BaseKind::Relationship,
        BaseKind::Policy,
    ];

    /// Id of the built-in base type for this kind.
    pub fn base_type_id(&self) -> ObjectTypeId {
        ObjectTypeId::new(self.base_type_str())
    }

    /// Id of the base type for this kind, e.g. `cmis:folder`.
    pub fn base_type_str(&self) -> &'static str {
        match self {
            Self::Document => "cmis:document",
            Self::Folder => "cmis:folder",
            Self::Relationship => "cmis:relationship",
            Self::Policy => "cmis:policy",
        }
    }

    /// Whether objects of this kind may live in folders.
    pub fn is_fileable(&self) -> bool {
        matches!(self, Self::Document | Self::Folder)
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_type_str())
    }
}

impl FromStr for BaseKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "document" | "cmis:document" => Ok(Self::Document),
            "folder" | "cmis:folder" => Ok(Self::Folder),
            "relationship" | "cmis:relationship" => Ok(Self::Relationship),
            "policy" | "cmis:policy" => Ok(Self::Policy),
            other => Err(TypeError::UnknownBaseKind(other.to_string())),
        }
    }
}

/// Requested state of the first version when creating a versionable document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersioningState {
    /// No versioning requested; versionable types treat this as `Major`.
    None,
    #[default]
    Major,
    Minor,
    /// The document is created directly as a private working copy.
    CheckedOut,
}

impl FromStr for VersioningState {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "checkedout" | "checked-out" => Ok(Self::CheckedOut),
            other => Err(TypeError::UnknownVersioningState(other.to_string())),
        }
    }
}
