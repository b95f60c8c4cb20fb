use std::fmt;

use serde::{Deserialize, Serialize};

/// The authenticated principal a call is made on behalf of.
///
/// Authentication happens upstream in the binding; by the time a principal
/// reaches the repository it is trusted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    pub is_admin: bool,
}

impl Principal {
    /// The unauthenticated principal.
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".into(),
            is_admin: false,
        }
    }

    /// An ordinary user.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_admin: false,
        }
    }

    /// An administrator.
    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_admin: true,
        }
    }

    /// Returns `true` if this principal's name equals `name`.
    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Per-call context threaded explicitly through every repository operation.
///
/// Carries the target repository id and the acting principal. There is no
/// ambient (thread-local or global) equivalent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub repository_id: String,
    pub principal: Principal,
}

impl CallContext {
    /// Context for `principal` acting on `repository_id`.
    pub fn new(repository_id: impl Into<String>, principal: Principal) -> Self {
        Self {
            repository_id: repository_id.into(),
            principal,
        }
    }

    /// Shorthand for a context acting as a plain named user.
    pub fn user(repository_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(repository_id, Principal::user(name))
    }

    /// Name of the acting principal.
    pub fn username(&self) -> &str {
        &self.principal.name
    }

    /// Same repository, different principal.
    pub fn with_principal(&self, principal: Principal) -> Self {
        Self {
            repository_id: self.repository_id.clone(),
            principal,
        }
    }
}
