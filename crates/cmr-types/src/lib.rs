//! Foundation types for the CMR content repository.
//!
//! This crate provides the identity, property and call-context types shared
//! by every other CMR crate. It has no knowledge of storage or type
//! registration; it only defines the vocabulary those layers speak.
//!
//! # Key Types
//!
//! - [`ObjectId`]: Opaque, never-reused identifier of a stored object
//! - [`ObjectTypeId`]: Identifier of a registered type definition
//! - [`ChangeToken`]: Optimistic-concurrency stamp bumped on every mutation
//! - [`CallContext`]: Per-call value carrying the repository id and principal
//! - [`PropertyValue`] / [`Properties`]: Typed property bags
//! - [`BaseKind`]: The four CMIS base object kinds
//! - [`Action`] / [`AllowableActions`]: Derived capability sets
//! - [`ErrorKind`]: The error taxonomy every layer maps onto

pub mod action;
pub mod context;
pub mod error;
pub mod id;
pub mod kind;
pub mod property;
pub mod token;

pub use action::{Action, AllowableActions};
pub use context::{CallContext, Principal};
pub use error::{ErrorKind, TypeError};
pub use id::{ObjectId, ObjectTypeId};
pub use kind::{BaseKind, VersioningState};
pub use property::{
    property_ids, Cardinality, Properties, PropertyData, PropertyType, PropertyValue,
    Updatability,
};
pub use token::ChangeToken;
