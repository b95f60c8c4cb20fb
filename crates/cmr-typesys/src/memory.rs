//! In-memory type registry.
//!
//! [`InMemoryTypeManager`] stores all definitions in a `HashMap` protected by
//! a `RwLock`. It is seeded with the four base types on construction.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use cmr_types::ObjectTypeId;
use tracing::{debug, info};

use crate::builtin;
use crate::definition::{TypeDefinition, TypeTreeNode};
use crate::error::{Result, TypeSystemError};
use crate::names::{validate_property_id, validate_query_name, validate_type_id};
use crate::traits::TypeManager;

/// An in-memory implementation of [`TypeManager`].
#[derive(Debug)]
pub struct InMemoryTypeManager {
    types: RwLock<HashMap<ObjectTypeId, TypeDefinition>>,
}

impl InMemoryTypeManager {
    /// Create a registry holding only the built-in base types.
    pub fn new() -> Self {
        let types = builtin::base_types()
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect();
        Self {
            types: RwLock::new(types),
        }
    }

    /// Number of registered types, base types included.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<ObjectTypeId, TypeDefinition>>> {
        self.types.read().map_err(|_| TypeSystemError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<ObjectTypeId, TypeDefinition>>> {
        self.types.write().map_err(|_| TypeSystemError::LockPoisoned)
    }

    /// Ancestor chain of `parent`, root first.
    fn ancestor_chain<'a>(
        types: &'a HashMap<ObjectTypeId, TypeDefinition>,
        parent: &ObjectTypeId,
    ) -> Vec<&'a TypeDefinition> {
        let mut chain = Vec::new();
        let mut current = types.get(parent);
        // Registration order makes cycles impossible; the bound only guards
        // against a corrupted map.
        while let Some(def) = current {
            chain.push(def);
            if chain.len() > types.len() {
                break;
            }
            current = def.parent_type_id.as_ref().and_then(|p| types.get(p));
        }
        chain.reverse();
        chain
    }

    fn validate_names(definition: &TypeDefinition) -> Result<()> {
        validate_type_id(definition.id.as_str())?;
        validate_query_name(&definition.query_name)?;
        for prop in definition.property_definitions.values() {
            validate_property_id(&prop.id)?;
            validate_query_name(&prop.query_name)?;
        }
        Ok(())
    }

    fn sorted_children(
        types: &HashMap<ObjectTypeId, TypeDefinition>,
        parent: Option<&ObjectTypeId>,
    ) -> Vec<TypeDefinition> {
        let mut children: Vec<TypeDefinition> = types
            .values()
            .filter(|def| def.parent_type_id.as_ref() == parent)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.id.cmp(&b.id));
        children
    }

    fn build_tree(
        types: &HashMap<ObjectTypeId, TypeDefinition>,
        parent: Option<&ObjectTypeId>,
        depth: Option<usize>,
        include_property_definitions: bool,
    ) -> Vec<TypeTreeNode> {
        if depth == Some(0) {
            return Vec::new();
        }
        let next_depth = depth.map(|d| d - 1);
        Self::sorted_children(types, parent)
            .into_iter()
            .map(|def| {
                let children =
                    Self::build_tree(types, Some(&def.id), next_depth, include_property_definitions);
                let definition = if include_property_definitions {
                    def
                } else {
                    def.without_property_definitions()
                };
                TypeTreeNode {
                    definition,
                    children,
                }
            })
            .collect()
    }
}

impl Default for InMemoryTypeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeManager for InMemoryTypeManager {
    fn add_type(&self, definition: TypeDefinition) -> Result<TypeDefinition> {
        Self::validate_names(&definition)?;

        let mut types = self.write()?;

        if types.contains_key(&definition.id) {
            return Err(TypeSystemError::AlreadyExists(definition.id));
        }

        let parent_id = definition
            .parent_type_id
            .clone()
            .ok_or_else(|| TypeSystemError::MissingParent(definition.id.clone()))?;
        let parent = types
            .get(&parent_id)
            .ok_or_else(|| TypeSystemError::TypeParentNotFound {
                type_id: definition.id.clone(),
                parent: parent_id.clone(),
            })?;

        if parent.base_kind != definition.base_kind {
            return Err(TypeSystemError::BaseKindMismatch {
                type_id: definition.id.clone(),
                declared: definition.base_kind.to_string(),
                parent: parent.base_kind.to_string(),
            });
        }

        if definition.flags.versionable && definition.base_kind != cmr_types::BaseKind::Document {
            return Err(TypeSystemError::InvalidDefinition {
                type_id: definition.id.clone(),
                reason: "only document types can be versionable".into(),
            });
        }

        if let Some(existing) = types
            .values()
            .find(|def| def.query_name == definition.query_name)
        {
            return Err(TypeSystemError::DuplicateQueryName {
                query_name: definition.query_name.clone(),
                existing: existing.id.clone(),
            });
        }

        // Copy every ancestor's own definitions, root first, then overlay the
        // new type's own definitions.
        let mut effective = std::collections::BTreeMap::new();
        for ancestor in Self::ancestor_chain(&types, &parent_id) {
            for prop in ancestor.own_property_definitions() {
                effective.insert(prop.id.clone(), prop.as_inherited());
            }
        }
        for prop in definition.property_definitions.values() {
            if effective.contains_key(&prop.id) {
                return Err(TypeSystemError::InheritedPropertyRedefined {
                    type_id: definition.id.clone(),
                    property: prop.id.clone(),
                });
            }
            let mut own = prop.clone();
            own.inherited = false;
            effective.insert(own.id.clone(), own);
        }

        let registered = TypeDefinition {
            property_definitions: effective,
            ..definition
        };
        info!(
            type_id = %registered.id,
            parent = %parent_id,
            properties = registered.property_definitions.len(),
            "registered type definition"
        );
        types.insert(registered.id.clone(), registered.clone());
        Ok(registered)
    }

    fn update_type(&self, definition: TypeDefinition) -> Result<TypeDefinition> {
        Err(TypeSystemError::NotSupported(format!(
            "type definitions are immutable; cannot update {}",
            definition.id
        )))
    }

    fn delete_type(&self, id: &ObjectTypeId) -> Result<()> {
        let mut types = self.write()?;
        let def = types
            .get(id)
            .ok_or_else(|| TypeSystemError::NotFound(id.clone()))?;
        if def.is_base_type() {
            return Err(TypeSystemError::BaseTypeImmutable(id.clone()));
        }
        if types
            .values()
            .any(|other| other.parent_type_id.as_ref() == Some(id))
        {
            return Err(TypeSystemError::HasSubtypes(id.clone()));
        }
        types.remove(id);
        debug!(type_id = %id, "deleted type definition");
        Ok(())
    }

    fn get_type(&self, id: &ObjectTypeId) -> Result<Option<TypeDefinition>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn get_type_by_query_name(&self, query_name: &str) -> Result<Option<TypeDefinition>> {
        Ok(self
            .read()?
            .values()
            .find(|def| def.query_name == query_name)
            .cloned())
    }

    fn get_type_children(
        &self,
        parent: Option<&ObjectTypeId>,
        include_property_definitions: bool,
    ) -> Result<Vec<TypeDefinition>> {
        let types = self.read()?;
        if let Some(parent) = parent {
            if !types.contains_key(parent) {
                return Err(TypeSystemError::NotFound(parent.clone()));
            }
        }
        let children = Self::sorted_children(&types, parent);
        Ok(if include_property_definitions {
            children
        } else {
            children
                .iter()
                .map(TypeDefinition::without_property_definitions)
                .collect()
        })
    }

    fn get_type_descendants(
        &self,
        root: Option<&ObjectTypeId>,
        depth: Option<usize>,
        include_property_definitions: bool,
    ) -> Result<Vec<TypeTreeNode>> {
        if depth == Some(0) {
            return Err(TypeSystemError::InvalidDepth(0));
        }
        let types = self.read()?;
        if let Some(root) = root {
            if !types.contains_key(root) {
                return Err(TypeSystemError::NotFound(root.clone()));
            }
        }
        Ok(Self::build_tree(
            &types,
            root,
            depth,
            include_property_definitions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::PropertyDefinition;
    use cmr_types::{property_ids, BaseKind, ErrorKind, PropertyType};
    use proptest::prelude::*;

    fn invoice() -> TypeDefinition {
        TypeDefinition::new("my:invoice", "cmis:document", BaseKind::Document)
            .with_property(PropertyDefinition::new("my:amount", PropertyType::Decimal).required())
            .versionable(true)
    }

    fn tid(s: &str) -> ObjectTypeId {
        ObjectTypeId::new(s)
    }

    #[test]
    fn seeded_with_base_types() {
        let mgr = InMemoryTypeManager::new();
        assert_eq!(mgr.len().unwrap(), 4);
        assert!(!mgr.is_empty().unwrap());
        let roots = mgr.root_types().unwrap();
        let ids: Vec<_> = roots.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["cmis:document", "cmis:folder", "cmis:policy", "cmis:relationship"]
        );
    }

    #[test]
    fn poisoned_registry_reports_errors() {
        let mgr = std::sync::Arc::new(InMemoryTypeManager::new());
        let poisoner = std::sync::Arc::clone(&mgr);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.types.write().unwrap();
            panic!("poison the registry lock");
        })
        .join();

        assert!(matches!(mgr.len(), Err(TypeSystemError::LockPoisoned)));
        assert!(mgr.is_empty().is_err());
        assert_eq!(
            mgr.get_type(&tid("cmis:folder")).unwrap_err().kind(),
            ErrorKind::Runtime
        );
    }

    #[test]
    fn add_type_inherits_parent_properties() {
        let mgr = InMemoryTypeManager::new();
        let def = mgr.add_type(invoice()).unwrap();

        let name = def.property_definition(property_ids::NAME).unwrap();
        assert!(name.inherited);
        let amount = def.property_definition("my:amount").unwrap();
        assert!(!amount.inherited);

        let parent = mgr.get_type(&tid("cmis:document")).unwrap().unwrap();
        assert_eq!(
            def.property_definitions.len(),
            parent.property_definitions.len() + 1
        );
    }

    #[test]
    fn grandchild_inherits_whole_chain() {
        let mgr = InMemoryTypeManager::new();
        mgr.add_type(invoice()).unwrap();
        let child = TypeDefinition::new("my:vat-invoice", "my:invoice", BaseKind::Document)
            .with_property(PropertyDefinition::new("my:vat", PropertyType::Decimal));
        let def = mgr.add_type(child).unwrap();

        assert!(def.property_definition("my:amount").unwrap().inherited);
        assert!(def.property_definition(property_ids::OBJECT_ID).unwrap().inherited);
        assert!(!def.property_definition("my:vat").unwrap().inherited);
        assert!(mgr
            .is_subtype_of(&tid("my:vat-invoice"), &tid("cmis:document"))
            .unwrap());
        assert!(!mgr
            .is_subtype_of(&tid("my:invoice"), &tid("my:vat-invoice"))
            .unwrap());
    }

    #[test]
    fn add_before_parent_fails() {
        let mgr = InMemoryTypeManager::new();
        let orphan = TypeDefinition::new("my:child", "my:missing", BaseKind::Document);
        let err = mgr.add_type(orphan).unwrap_err();
        assert!(matches!(err, TypeSystemError::TypeParentNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(mgr.get_type(&tid("my:child")).unwrap().is_none());
    }

    #[test]
    fn parentless_type_is_rejected() {
        let mgr = InMemoryTypeManager::new();
        let mut def = invoice();
        def.parent_type_id = None;
        assert!(matches!(
            mgr.add_type(def),
            Err(TypeSystemError::MissingParent(_))
        ));
    }

    #[test]
    fn duplicate_id_and_query_name_rejected() {
        let mgr = InMemoryTypeManager::new();
        mgr.add_type(invoice()).unwrap();
        assert!(matches!(
            mgr.add_type(invoice()),
            Err(TypeSystemError::AlreadyExists(_))
        ));
        let clash = TypeDefinition::new("my:other", "cmis:document", BaseKind::Document)
            .with_query_name("my:invoice");
        assert!(matches!(
            mgr.add_type(clash),
            Err(TypeSystemError::DuplicateQueryName { .. })
        ));
    }

    #[test]
    fn base_kind_must_match_parent() {
        let mgr = InMemoryTypeManager::new();
        let def = TypeDefinition::new("my:odd", "cmis:folder", BaseKind::Document);
        assert!(matches!(
            mgr.add_type(def),
            Err(TypeSystemError::BaseKindMismatch { .. })
        ));
    }

    #[test]
    fn only_documents_are_versionable() {
        let mgr = InMemoryTypeManager::new();
        let def = TypeDefinition::new("my:vfolder", "cmis:folder", BaseKind::Folder).versionable(true);
        assert!(matches!(
            mgr.add_type(def),
            Err(TypeSystemError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn redefining_inherited_property_rejected() {
        let mgr = InMemoryTypeManager::new();
        let def = TypeDefinition::new("my:bad", "cmis:document", BaseKind::Document)
            .with_property(PropertyDefinition::new(property_ids::NAME, PropertyType::Integer));
        assert!(matches!(
            mgr.add_type(def),
            Err(TypeSystemError::InheritedPropertyRedefined { .. })
        ));
    }

    #[test]
    fn invalid_names_rejected() {
        let mgr = InMemoryTypeManager::new();
        let def = TypeDefinition::new("my bad", "cmis:document", BaseKind::Document);
        assert!(matches!(
            mgr.add_type(def),
            Err(TypeSystemError::InvalidName { .. })
        ));
    }

    #[test]
    fn update_is_not_supported() {
        let mgr = InMemoryTypeManager::new();
        let def = mgr.add_type(invoice()).unwrap();
        let err = mgr.update_type(def).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }

    #[test]
    fn lookup_by_query_name() {
        let mgr = InMemoryTypeManager::new();
        mgr.add_type(invoice().with_query_name("invoice")).unwrap();
        let found = mgr.get_type_by_query_name("invoice").unwrap().unwrap();
        assert_eq!(found.id.as_str(), "my:invoice");
        assert!(mgr.get_type_by_query_name("nope").unwrap().is_none());
    }

    #[test]
    fn children_listing_and_property_stripping() {
        let mgr = InMemoryTypeManager::new();
        mgr.add_type(invoice()).unwrap();
        mgr.add_type(TypeDefinition::new("my:contract", "cmis:document", BaseKind::Document))
            .unwrap();

        let with = mgr
            .get_type_children(Some(&tid("cmis:document")), true)
            .unwrap();
        assert_eq!(with.len(), 2);
        assert_eq!(with[0].id.as_str(), "my:contract");
        assert!(!with[0].property_definitions.is_empty());

        let without = mgr
            .get_type_children(Some(&tid("cmis:document")), false)
            .unwrap();
        assert!(without.iter().all(|d| d.property_definitions.is_empty()));

        assert!(matches!(
            mgr.get_type_children(Some(&tid("nope")), true),
            Err(TypeSystemError::NotFound(_))
        ));
    }

    #[test]
    fn descendants_respect_depth() {
        let mgr = InMemoryTypeManager::new();
        mgr.add_type(invoice()).unwrap();
        mgr.add_type(TypeDefinition::new("my:vat-invoice", "my:invoice", BaseKind::Document))
            .unwrap();

        let all = mgr
            .get_type_descendants(Some(&tid("cmis:document")), None, false)
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].children.len(), 1);

        let shallow = mgr
            .get_type_descendants(Some(&tid("cmis:document")), Some(1), false)
            .unwrap();
        assert_eq!(shallow.len(), 1);
        assert!(shallow[0].children.is_empty());

        assert!(matches!(
            mgr.get_type_descendants(None, Some(0), false),
            Err(TypeSystemError::InvalidDepth(0))
        ));

        let forest = mgr.get_type_descendants(None, None, false).unwrap();
        assert_eq!(forest.len(), 4);
    }

    #[test]
    fn delete_rules() {
        let mgr = InMemoryTypeManager::new();
        mgr.add_type(invoice()).unwrap();
        mgr.add_type(TypeDefinition::new("my:vat-invoice", "my:invoice", BaseKind::Document))
            .unwrap();

        let err = mgr.delete_type(&tid("my:invoice")).unwrap_err();
        assert!(matches!(err, TypeSystemError::HasSubtypes(_)));
        assert_eq!(err.kind(), ErrorKind::Constraint);

        assert!(matches!(
            mgr.delete_type(&tid("cmis:folder")),
            Err(TypeSystemError::BaseTypeImmutable(_))
        ));
        assert!(matches!(
            mgr.delete_type(&tid("nope")),
            Err(TypeSystemError::NotFound(_))
        ));

        mgr.delete_type(&tid("my:vat-invoice")).unwrap();
        mgr.delete_type(&tid("my:invoice")).unwrap();
        assert_eq!(mgr.len().unwrap(), 4);
        assert!(!mgr.is_empty().unwrap());
    }

    proptest! {
        /// A chain of sub-types, each adding a few properties: every type's
        /// effective set is a superset of its parent's, with the parent's
        /// entries flagged as inherited.
        #[test]
        fn effective_properties_are_superset_of_parent(
            own_counts in proptest::collection::vec(0usize..4, 1..6)
        ) {
            let mgr = InMemoryTypeManager::new();
            let mut parent = tid("cmis:folder");
            for (level, count) in own_counts.iter().enumerate() {
                let id = format!("t:level{level}");
                let mut def = TypeDefinition::new(id.as_str(), parent.clone(), BaseKind::Folder);
                for n in 0..*count {
                    def = def.with_property(PropertyDefinition::new(
                        format!("p:l{level}n{n}"),
                        PropertyType::String,
                    ));
                }
                let child = mgr.add_type(def).unwrap();
                let parent_def = mgr.get_type(&parent).unwrap().unwrap();
                for (pid, pdef) in &parent_def.property_definitions {
                    let inherited = child.property_definitions.get(pid);
                    prop_assert!(inherited.is_some());
                    let inherited = inherited.unwrap();
                    prop_assert!(inherited.inherited);
                    prop_assert_eq!(inherited.property_type, pdef.property_type);
                }
                prop_assert_eq!(
                    child.property_definitions.len(),
                    parent_def.property_definitions.len() + count
                );
                parent = child.id.clone();
            }
        }
    }
}
