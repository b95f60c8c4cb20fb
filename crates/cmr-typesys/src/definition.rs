//! Type and property definitions.
//!
//! A [`TypeDefinition`] holds its *effective* property map: every definition
//! inherited from an ancestor (flagged `inherited = true`) plus its own. The
//! registry fills in the inherited part at registration time; callers build
//! definitions with only their own properties.

use std::collections::BTreeMap;

use cmr_types::{BaseKind, Cardinality, ObjectTypeId, PropertyType, Updatability};
use serde::{Deserialize, Serialize};

/// Schema of one property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub id: String,
    pub query_name: String,
    pub display_name: String,
    pub property_type: PropertyType,
    pub cardinality: Cardinality,
    pub updatability: Updatability,
    pub required: bool,
    /// `true` if copied down from an ancestor type.
    pub inherited: bool,
}

impl PropertyDefinition {
    /// A single-valued, optional, read-write property.
    pub fn new(id: impl Into<String>, property_type: PropertyType) -> Self {
        let id = id.into();
        Self {
            query_name: id.clone(),
            display_name: id.clone(),
            id,
            property_type,
            cardinality: Cardinality::Single,
            updatability: Updatability::ReadWrite,
            required: false,
            inherited: false,
        }
    }

    /// Override the query name, which defaults to the id.
    pub fn with_query_name(mut self, query_name: impl Into<String>) -> Self {
        self.query_name = query_name.into();
        self
    }

    /// Override the display name, which defaults to the id.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Allow several values.
    pub fn multi(mut self) -> Self {
        self.cardinality = Cardinality::Multi;
        self
    }

    /// Require a value on create.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the property as maintained by the repository.
    pub fn read_only(mut self) -> Self {
        self.updatability = Updatability::ReadOnly;
        self
    }

    /// Set when the property may be updated.
    pub fn with_updatability(mut self, updatability: Updatability) -> Self {
        self.updatability = updatability;
        self
    }

    /// Copy of this definition as seen by a descendant type.
    pub fn as_inherited(&self) -> Self {
        Self {
            inherited: true,
            ..self.clone()
        }
    }

    /// Returns `true` for multi-valued properties.
    pub fn is_multi(&self) -> bool {
        self.cardinality == Cardinality::Multi
    }
}

/// Behavioral flags of a type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFlags {
    pub creatable: bool,
    pub fileable: bool,
    pub queryable: bool,
    pub versionable: bool,
    pub controllable_acl: bool,
    pub controllable_policy: bool,
}

impl TypeFlags {
    /// Defaults for a new type of the given base kind.
    pub fn for_kind(kind: BaseKind) -> Self {
        Self {
            creatable: true,
            fileable: kind.is_fileable(),
            queryable: true,
            versionable: false,
            controllable_acl: false,
            controllable_policy: false,
        }
    }
}

/// Whether documents of a type may, must or must not carry content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentStreamAllowed {
    NotAllowed,
    #[default]
    Allowed,
    Required,
}

/// A registered object type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub id: ObjectTypeId,
    pub local_name: String,
    pub query_name: String,
    pub display_name: String,
    pub description: String,
    pub parent_type_id: Option<ObjectTypeId>,
    pub base_kind: BaseKind,
    pub flags: TypeFlags,
    /// Only meaningful for document types.
    pub content_stream_allowed: ContentStreamAllowed,
    pub property_definitions: BTreeMap<String, PropertyDefinition>,
}

impl TypeDefinition {
    /// Start a sub-type definition of `parent`.
    pub fn new(
        id: impl Into<ObjectTypeId>,
        parent: impl Into<ObjectTypeId>,
        base_kind: BaseKind,
    ) -> Self {
        let mut def = Self::base_like(id.into(), base_kind);
        def.parent_type_id = Some(parent.into());
        def
    }

    /// A parentless definition; only the built-in base types use this.
    pub(crate) fn base_like(id: ObjectTypeId, base_kind: BaseKind) -> Self {
        let name = id.as_str().to_string();
        Self {
            id,
            local_name: name.clone(),
            query_name: name.clone(),
            display_name: name,
            description: String::new(),
            parent_type_id: None,
            base_kind,
            flags: TypeFlags::for_kind(base_kind),
            content_stream_allowed: ContentStreamAllowed::default(),
            property_definitions: BTreeMap::new(),
        }
    }

    /// Override the query name, which defaults to the id.
    pub fn with_query_name(mut self, query_name: impl Into<String>) -> Self {
        self.query_name = query_name.into();
        self
    }

    /// Override the display name, which defaults to the id.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace all capability flags.
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Allow or forbid versioning.
    pub fn versionable(mut self, versionable: bool) -> Self {
        self.flags.versionable = versionable;
        self
    }

    /// Set whether documents must, may or must not carry content.
    pub fn with_content_stream(mut self, allowed: ContentStreamAllowed) -> Self {
        self.content_stream_allowed = allowed;
        self
    }

    /// Add an own property definition.
    pub fn with_property(mut self, definition: PropertyDefinition) -> Self {
        self.property_definitions
            .insert(definition.id.clone(), definition);
        self
    }

    /// Returns `true` for the four parentless base types.
    pub fn is_base_type(&self) -> bool {
        self.parent_type_id.is_none()
    }

    /// Effective definition of property `id`, inherited ones included.
    pub fn property_definition(&self, id: &str) -> Option<&PropertyDefinition> {
        self.property_definitions.get(id)
    }

    /// Definitions declared by this type itself.
    pub fn own_property_definitions(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.property_definitions.values().filter(|d| !d.inherited)
    }

    /// Copy without property definitions (for listings that omit them).
    pub fn without_property_definitions(&self) -> Self {
        Self {
            property_definitions: BTreeMap::new(),
            ..self.clone()
        }
    }
}

/// A node in a type hierarchy listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTreeNode {
    pub definition: TypeDefinition,
    pub children: Vec<TypeTreeNode>,
}
