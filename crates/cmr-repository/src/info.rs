//! Repository description and the capability-stub value types.

use cmr_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::config::Capabilities;

/// Protocol version this repository reports.
pub const CMIS_VERSION_SUPPORTED: &str = "1.1";

/// What `getRepositoryInfo` returns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub vendor_name: String,
    pub product_name: String,
    pub product_version: String,
    pub cmis_version_supported: String,
    pub root_folder_id: ObjectId,
    pub capabilities: Capabilities,
}

/// One access control entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ace {
    pub principal: String,
    pub permissions: Vec<String>,
}

/// An access control list. This repository never stores one, so every
/// object reports an empty list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    pub aces: Vec<Ace>,
    /// `true` when the list is complete rather than a subset.
    pub is_exact: bool,
}

impl Acl {
    /// The empty list reported for every object.
    pub fn empty() -> Self {
        Self {
            aces: Vec::new(),
            is_exact: true,
        }
    }

    /// Returns `true` if the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.aces.is_empty()
    }
}
