//! Registry of the repositories served by one process.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use cmr_types::CallContext;
use tracing::info;

use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::Repository;

/// Maps repository ids to repositories.
#[derive(Debug, Default)]
pub struct RepositoryManager {
    repositories: RwLock<BTreeMap<String, Arc<Repository>>>,
}

impl RepositoryManager {
    /// Create a manager with no repositories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one repository per configuration.
    pub fn from_configs(
        configs: impl IntoIterator<Item = RepositoryConfig>,
    ) -> RepositoryResult<Self> {
        let manager = Self::new();
        for config in configs {
            manager.create(config)?;
        }
        Ok(manager)
    }

    /// Create and register a repository. Its id must be unused.
    pub fn create(&self, config: RepositoryConfig) -> RepositoryResult<Arc<Repository>> {
        let mut repositories = self
            .repositories
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if repositories.contains_key(&config.id) {
            return Err(RepositoryError::InvalidArgument(format!(
                "repository {} already exists",
                config.id
            )));
        }
        let repository = Arc::new(Repository::new(config)?);
        repositories.insert(repository.id().to_string(), Arc::clone(&repository));
        info!(repository = %repository.id(), "repository registered");
        Ok(repository)
    }

    /// Look up a repository by id.
    pub fn get(&self, id: &str) -> RepositoryResult<Arc<Repository>> {
        self.repositories
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownRepository(id.to_string()))
    }

    /// The repository a call context targets.
    pub fn for_context(&self, ctx: &CallContext) -> RepositoryResult<Arc<Repository>> {
        self.get(&ctx.repository_id)
    }

    /// Unregister a repository, returning it.
    pub fn remove(&self, id: &str) -> RepositoryResult<Arc<Repository>> {
        let removed = self
            .repositories
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .remove(id)
            .ok_or_else(|| RepositoryError::UnknownRepository(id.to_string()))?;
        info!(repository = %id, "repository removed");
        Ok(removed)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> RepositoryResult<Vec<String>> {
        Ok(self
            .repositories
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?
            .keys()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmr_types::ErrorKind;

    #[test]
    fn lookup_by_id() {
        let manager = RepositoryManager::from_configs([
            RepositoryConfig::default(),
            RepositoryConfig::named("B2"),
        ])
        .unwrap();
        assert_eq!(manager.ids().unwrap(), vec!["A1", "B2"]);
        assert_eq!(manager.get("B2").unwrap().id(), "B2");

        let ctx = CallContext::user("A1", "alice");
        let repo = manager.for_context(&ctx).unwrap();
        assert!(repo.repository_info(&ctx).is_ok());
    }

    #[test]
    fn unknown_repository_not_found() {
        let manager = RepositoryManager::new();
        let err = manager.get("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ObjectNotFound);
        assert!(manager.remove("nope").is_err());
    }

    #[test]
    fn duplicate_id_rejected() {
        let manager = RepositoryManager::new();
        manager.create(RepositoryConfig::default()).unwrap();
        let err = manager.create(RepositoryConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn repositories_are_independent() {
        let manager = RepositoryManager::from_configs([
            RepositoryConfig::default(),
            RepositoryConfig::named("B2"),
        ])
        .unwrap();
        let a = manager.get("A1").unwrap();
        let b = manager.get("B2").unwrap();
        assert_ne!(a.root_folder_id(), b.root_folder_id());

        let in_a = CallContext::user("A1", "alice");
        let err = b.get_object(&in_a, &b.root_folder_id(), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        manager.remove("B2").unwrap();
        assert_eq!(manager.ids().unwrap(), vec!["A1"]);
    }
}
