//! Repository services for CMR.
//!
//! This crate is the entry point for callers: a [`Repository`] bundles the
//! type registry and object store of one repository behind the full set of
//! repository, type, object, navigation, versioning and capability
//! operations, and a [`RepositoryManager`] serves several repositories by id.
//!
//! # Quick Start
//!
//! ```
//! use cmr_repository::{Repository, RepositoryConfig};
//! use cmr_types::{property_ids, CallContext, Properties};
//!
//! let repo = Repository::new(RepositoryConfig::default()).unwrap();
//! let ctx = CallContext::user("A1", "alice");
//! let props = Properties::new()
//!     .with_string(property_ids::NAME, "Projects")
//!     .with_id(property_ids::OBJECT_TYPE_ID, "cmis:folder");
//! let id = repo.create_folder(&ctx, &props, &repo.root_folder_id()).unwrap();
//! assert_eq!(repo.get_object(&ctx, &id, false).unwrap().name, "Projects");
//! ```

pub mod config;
pub mod error;
pub mod info;
pub mod manager;
pub mod paging;
pub mod repository;

pub use config::{Capabilities, PagingConfig, PropertyConfig, RepositoryConfig, TypeConfig};
pub use error::{RepositoryError, RepositoryResult};
pub use info::{Ace, Acl, RepositoryInfo};
pub use manager::RepositoryManager;
pub use paging::{Page, Paging};
pub use repository::Repository;
