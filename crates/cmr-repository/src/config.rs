//! Repository configuration.
//!
//! A repository is described by a TOML document:
//!
//! ```toml
//! id = "A1"
//! name = "Archive"
//! name_comparison = "case-insensitive"
//!
//! [capabilities]
//! multifiling = false
//!
//! [[types]]
//! id = "my:invoice"
//! parent = "cmis:document"
//! versionable = true
//!
//! [[types.properties]]
//! id = "my:amount"
//! type = "integer"
//! required = true
//! ```
//!
//! Every field has a default; an empty document yields
//! [`RepositoryConfig::default`].

use std::path::Path;

use cmr_store::{NameComparison, StoreConfig};
use cmr_types::{BaseKind, Cardinality, PropertyType, Updatability};
use cmr_typesys::{ContentStreamAllowed, PropertyDefinition, TypeDefinition};
use serde::{Deserialize, Serialize};

use crate::error::{RepositoryError, RepositoryResult};

/// Configuration of one repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub id: String,
    pub name: String,
    pub description: String,
    pub capabilities: Capabilities,
    /// How sibling names are compared for uniqueness and path lookup.
    pub name_comparison: NameComparison,
    pub paging: PagingConfig,
    /// Types registered at start-up, parents before children.
    pub types: Vec<TypeConfig>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            id: "A1".into(),
            name: "A1".into(),
            description: "In-memory content repository".into(),
            capabilities: Capabilities::default(),
            name_comparison: NameComparison::Exact,
            paging: PagingConfig::default(),
            types: Vec::new(),
        }
    }
}

impl RepositoryConfig {
    /// A default configuration under a different repository id.
    pub fn named(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(source: &str) -> RepositoryResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> RepositoryResult<()> {
        if self.id.trim().is_empty() {
            return Err(RepositoryError::Config("repository id is empty".into()));
        }
        if self.capabilities.version_specific_filing {
            return Err(RepositoryError::Config(
                "version-specific filing is not supported".into(),
            ));
        }
        if self.paging.default_max_items == 0 {
            return Err(RepositoryError::Config(
                "default_max_items must be positive".into(),
            ));
        }
        if self.paging.default_max_items > self.paging.max_items_limit {
            return Err(RepositoryError::Config(format!(
                "default_max_items {} exceeds max_items_limit {}",
                self.paging.default_max_items, self.paging.max_items_limit
            )));
        }
        Ok(())
    }

    /// Settings handed to the object store.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            multifiling: self.capabilities.multifiling,
            unfiling: self.capabilities.unfiling,
            name_comparison: self.name_comparison,
        }
    }
}

/// Optional behaviors advertised in the repository info.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub multifiling: bool,
    pub unfiling: bool,
    /// Filing specific versions instead of whole series. Never supported.
    pub version_specific_filing: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            multifiling: true,
            unfiling: true,
            version_specific_filing: false,
        }
    }
}

/// Page sizes for listing operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    /// Page size when a caller gives no `max_items`.
    pub default_max_items: usize,
    /// Upper bound applied to any requested `max_items`.
    pub max_items_limit: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_max_items: 100,
            max_items_limit: 1000,
        }
    }
}

/// A type registered from configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConfig {
    pub id: String,
    pub parent: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub query_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub versionable: bool,
    #[serde(default)]
    pub content_stream: ContentStreamAllowed,
    #[serde(default)]
    pub properties: Vec<PropertyConfig>,
}

impl TypeConfig {
    /// Build the definition; `base_kind` is the parent's.
    pub fn to_definition(&self, base_kind: BaseKind) -> TypeDefinition {
        let mut def = TypeDefinition::new(self.id.as_str(), self.parent.as_str(), base_kind)
            .versionable(self.versionable)
            .with_content_stream(self.content_stream);
        if let Some(name) = &self.display_name {
            def = def.with_display_name(name.as_str());
        }
        if let Some(name) = &self.query_name {
            def = def.with_query_name(name.as_str());
        }
        if let Some(text) = &self.description {
            def = def.with_description(text.as_str());
        }
        self.properties
            .iter()
            .fold(def, |def, prop| def.with_property(prop.to_definition()))
    }
}

/// A property definition declared in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub id: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub updatability: Updatability,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl PropertyConfig {
    /// Build the registry definition for this property.
    pub fn to_definition(&self) -> PropertyDefinition {
        let mut def = PropertyDefinition::new(self.id.as_str(), self.property_type)
            .with_updatability(self.updatability);
        if self.cardinality == Cardinality::Multi {
            def = def.multi();
        }
        if self.required {
            def = def.required();
        }
        if let Some(name) = &self.display_name {
            def = def.with_display_name(name.as_str());
        }
        def
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmr_types::ErrorKind;

    #[test]
    fn default_config() {
        let c = RepositoryConfig::default();
        assert_eq!(c.id, "A1");
        assert!(c.capabilities.multifiling);
        assert!(c.capabilities.unfiling);
        assert!(!c.capabilities.version_specific_filing);
        assert_eq!(c.name_comparison, NameComparison::Exact);
        assert_eq!(c.paging.default_max_items, 100);
        assert!(c.types.is_empty());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_document_is_default() {
        let c = RepositoryConfig::from_toml_str("").unwrap();
        assert_eq!(c, RepositoryConfig::default());
    }

    #[test]
    fn parse_full_document() {
        let c = RepositoryConfig::from_toml_str(
            r#"
            id = "archive"
            name = "Archive"
            name_comparison = "case-insensitive"

            [capabilities]
            multifiling = false
            unfiling = false

            [paging]
            default_max_items = 10
            max_items_limit = 50

            [[types]]
            id = "my:invoice"
            parent = "cmis:document"
            versionable = true
            content_stream = "required"

            [[types.properties]]
            id = "my:amount"
            type = "integer"
            required = true

            [[types.properties]]
            id = "my:tags"
            type = "string"
            cardinality = "multi"
            updatability = "when-checked-out"
            "#,
        )
        .unwrap();

        assert_eq!(c.id, "archive");
        assert_eq!(c.name_comparison, NameComparison::CaseInsensitive);
        assert_eq!(
            c.store_config(),
            StoreConfig::single_filing().with_name_comparison(NameComparison::CaseInsensitive)
        );
        assert_eq!(c.paging.max_items_limit, 50);

        let def = c.types[0].to_definition(BaseKind::Document);
        assert!(def.flags.versionable);
        assert_eq!(def.content_stream_allowed, ContentStreamAllowed::Required);
        assert!(def.property_definition("my:amount").unwrap().required);
        let tags = def.property_definition("my:tags").unwrap();
        assert!(tags.is_multi());
        assert_eq!(tags.updatability, Updatability::WhenCheckedOut);
    }

    #[test]
    fn version_specific_filing_rejected() {
        let err = RepositoryConfig::from_toml_str(
            "[capabilities]\nversion_specific_filing = true\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn inconsistent_paging_rejected() {
        let err = RepositoryConfig::from_toml_str(
            "[paging]\ndefault_max_items = 500\nmax_items_limit = 20\n",
        )
        .unwrap_err();
        assert!(matches!(err, RepositoryError::Config(_)));
    }

    #[test]
    fn malformed_toml_rejected() {
        let err = RepositoryConfig::from_toml_str("id = ").unwrap_err();
        assert!(matches!(err, RepositoryError::ConfigParse(_)));
    }

    #[test]
    fn named_config() {
        let c = RepositoryConfig::named("B2");
        assert_eq!(c.id, "B2");
        assert_eq!(c.name, "B2");
    }
}
