//! Error types for the repository facade.

use cmr_store::StoreError;
use cmr_types::ErrorKind;
use cmr_typesys::TypeSystemError;
use thiserror::Error;

/// Errors surfaced by [`Repository`](crate::Repository) operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No repository is registered under this id.
    #[error("repository not found: {0}")]
    UnknownRepository(String),

    /// The call context names a different repository.
    #[error("call context targets repository {context}, not {repository}")]
    ContextMismatch { context: String, repository: String },

    /// A required input is missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The capability is not offered by this repository.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// The configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The configuration file is not valid TOML.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("type system error: {0}")]
    Types(#[from] TypeSystemError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The repository registry lock was poisoned.
    #[error("repository registry lock poisoned")]
    LockPoisoned,
}

impl RepositoryError {
    /// Map onto the repository-wide taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownRepository(_) => ErrorKind::ObjectNotFound,
            Self::ContextMismatch { .. }
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::ConfigParse(_) => ErrorKind::InvalidArgument,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::Io(_) | Self::LockPoisoned => ErrorKind::Runtime,
            Self::Types(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }

    pub(crate) fn not_supported(what: &str) -> Self {
        Self::NotSupported(what.to_string())
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;
