//! Type system for the CMR repository.
//!
//! Every stored object has a type. Types form a forest rooted at the four
//! built-in base types (`cmis:document`, `cmis:folder`, `cmis:relationship`,
//! `cmis:policy`); a sub-type inherits every property definition of its
//! ancestors.
//!
//! # Architecture
//!
//! - Types are **immutable** once registered; there is no update operation.
//! - Inheritance is resolved **eagerly** at registration: a registered
//!   definition always carries its full effective property map, inherited
//!   entries flagged `inherited = true`.
//! - A type can only be registered below an already-registered parent, so
//!   ancestor chains always terminate at a base type.
//!
//! # Modules
//!
//! - [`error`]: Error types for type operations
//! - [`definition`]: [`TypeDefinition`], [`PropertyDefinition`] and flags
//! - [`builtin`]: The base type definitions
//! - [`traits`]: The [`TypeManager`] trait
//! - [`names`]: Id and query-name validation
//! - [`memory`]: In-memory [`InMemoryTypeManager`]

pub mod builtin;
pub mod definition;
pub mod error;
pub mod memory;
pub mod names;
pub mod traits;

pub use definition::{
    ContentStreamAllowed, PropertyDefinition, TypeDefinition, TypeFlags, TypeTreeNode,
};
pub use error::{Result, TypeSystemError};
pub use memory::InMemoryTypeManager;
pub use traits::TypeManager;
