//! Object storage, filing and versioning for the CMR repository.
//!
//! This crate holds every stored object of one repository: folders,
//! documents, version series with their versions, and policies. It enforces
//! the folder hierarchy, sibling-name uniqueness, multi-filing rules and the
//! check-out / check-in state machine, and derives allowable actions.
//!
//! # Object Model
//!
//! - Folders form a single-filed tree below one root folder.
//! - A non-versionable document is one entity with optional content.
//! - A versionable document is a *series* entity (what folders list) plus
//!   an ordered list of *version* entities, the private working copy last.
//! - Policies are unfiled.
//!
//! Objects live in a flat id-keyed table; filing and versioning are indices
//! over ids, never references between objects.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`], [`Filing`] and [`Versioning`]
//! traits:
//!
//! - [`InMemoryObjectStore`] -- one `RwLock` over the whole state
//!
//! # Design Rules
//!
//! 1. Every mutation issues a fresh, strictly increasing change token.
//! 2. Structural mutations are atomic with respect to path resolution.
//! 3. A series has at most one PWC, and is checked out exactly when it has one.
//! 4. Version labels are derived on read, never stored.
//! 5. Reads return owned [`ObjectData`] snapshots; no lock outlives a call.

pub mod actions;
pub mod config;
pub mod content;
pub mod error;
pub mod filing;
pub mod memory;
pub mod names;
pub mod object;
pub mod snapshot;
mod state;
pub mod traits;
mod validation;
pub mod versioning;

#[cfg(test)]
mod test_support;

// Re-export primary types at crate root for ergonomic imports.
pub use actions::{compute as compute_allowable_actions, ActionSubject, SubjectShape};
pub use config::StoreConfig;
pub use content::{Content, ContentInfo, DEFAULT_MIME_TYPE};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryObjectStore;
pub use names::{validate_name, NameComparison};
pub use snapshot::{ObjectData, ObjectInFolder, ObjectParent, VersionInfo};
pub use state::ROOT_FOLDER_NAME;
pub use traits::{Filing, ObjectStore, Versioning};
pub use versioning::{version_labels, VersionLabel};
