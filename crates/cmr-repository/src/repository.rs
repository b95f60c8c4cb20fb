//! The `Repository` facade.
//!
//! [`Repository`] owns the type registry and the object store of one
//! repository and exposes every service operation over them. Each call names
//! its target repository through the [`CallContext`]; a context aimed at a
//! different repository is rejected before anything else happens.

use std::sync::Arc;

use cmr_store::{
    Content, Filing, InMemoryObjectStore, ObjectData, ObjectInFolder, ObjectParent, ObjectStore,
    Versioning,
};
use cmr_types::{
    property_ids as p, AllowableActions, CallContext, ChangeToken, ObjectId, ObjectTypeId,
    Properties, VersioningState,
};
use cmr_typesys::{
    InMemoryTypeManager, TypeDefinition, TypeManager, TypeSystemError, TypeTreeNode,
};
use tracing::info;

use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, RepositoryResult};
use crate::info::{Acl, RepositoryInfo, CMIS_VERSION_SUPPORTED};
use crate::paging::{Page, Paging};

const VENDOR_NAME: &str = "MapleAI";
const PRODUCT_NAME: &str = "cmr";

/// One in-memory content repository.
pub struct Repository {
    config: RepositoryConfig,
    types: Arc<dyn TypeManager>,
    store: InMemoryObjectStore,
}

impl Repository {
    /// Create a repository and register its configured types.
    pub fn new(config: RepositoryConfig) -> RepositoryResult<Self> {
        config.validate()?;
        let types: Arc<dyn TypeManager> = Arc::new(InMemoryTypeManager::new());
        for type_config in &config.types {
            let parent_id = ObjectTypeId::new(type_config.parent.as_str());
            let parent = types.get_type(&parent_id)?.ok_or_else(|| {
                TypeSystemError::TypeParentNotFound {
                    type_id: ObjectTypeId::new(type_config.id.as_str()),
                    parent: parent_id.clone(),
                }
            })?;
            let registered = types.add_type(type_config.to_definition(parent.base_kind))?;
            info!(
                repository = %config.id,
                type_id = %registered.id,
                parent = %parent_id,
                "registered configured type"
            );
        }
        let store = InMemoryObjectStore::new(Arc::clone(&types), config.store_config());
        info!(
            repository = %config.id,
            root = %store.root_folder_id(),
            types = config.types.len(),
            "repository created"
        );
        Ok(Self {
            config,
            types,
            store,
        })
    }

    /// The repository id.
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// The configuration this repository was built from.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Id of the root folder.
    pub fn root_folder_id(&self) -> ObjectId {
        self.store.root_folder_id()
    }

    fn check(&self, ctx: &CallContext) -> RepositoryResult<()> {
        if ctx.repository_id != self.config.id {
            return Err(RepositoryError::ContextMismatch {
                context: ctx.repository_id.clone(),
                repository: self.config.id.clone(),
            });
        }
        Ok(())
    }

    // ---- Repository ----

    /// Describe this repository and its capabilities.
    pub fn repository_info(&self, ctx: &CallContext) -> RepositoryResult<RepositoryInfo> {
        self.check(ctx)?;
        Ok(RepositoryInfo {
            id: self.config.id.clone(),
            name: self.config.name.clone(),
            description: self.config.description.clone(),
            vendor_name: VENDOR_NAME.into(),
            product_name: PRODUCT_NAME.into(),
            product_version: env!("CARGO_PKG_VERSION").into(),
            cmis_version_supported: CMIS_VERSION_SUPPORTED.into(),
            root_folder_id: self.store.root_folder_id(),
            capabilities: self.config.capabilities,
        })
    }

    // ---- Types ----

    /// Fetch one type definition with its effective properties.
    pub fn get_type_definition(
        &self,
        ctx: &CallContext,
        type_id: &ObjectTypeId,
    ) -> RepositoryResult<TypeDefinition> {
        self.check(ctx)?;
        self.types
            .get_type(type_id)?
            .ok_or_else(|| TypeSystemError::NotFound(type_id.clone()).into())
    }

    /// Direct sub-types of `parent`, or the base types when `None`.
    pub fn get_type_children(
        &self,
        ctx: &CallContext,
        parent: Option<&ObjectTypeId>,
        include_property_definitions: bool,
        paging: Paging,
    ) -> RepositoryResult<Page<TypeDefinition>> {
        self.check(ctx)?;
        let children = self
            .types
            .get_type_children(parent, include_property_definitions)?;
        Ok(paging.apply(children, &self.config.paging))
    }

    /// Type trees below `root`, or below every base type when `None`.
    pub fn get_type_descendants(
        &self,
        ctx: &CallContext,
        root: Option<&ObjectTypeId>,
        depth: Option<usize>,
        include_property_definitions: bool,
    ) -> RepositoryResult<Vec<TypeTreeNode>> {
        self.check(ctx)?;
        Ok(self
            .types
            .get_type_descendants(root, depth, include_property_definitions)?)
    }

    /// Register a new sub-type. Returns the stored definition.
    pub fn add_type_definition(
        &self,
        ctx: &CallContext,
        definition: TypeDefinition,
    ) -> RepositoryResult<TypeDefinition> {
        self.check(ctx)?;
        let registered = self.types.add_type(definition)?;
        info!(repository = %self.config.id, type_id = %registered.id, "type added");
        Ok(registered)
    }

    /// Types are immutable; this always fails with `NotSupported`.
    pub fn update_type_definition(
        &self,
        ctx: &CallContext,
        definition: TypeDefinition,
    ) -> RepositoryResult<TypeDefinition> {
        self.check(ctx)?;
        Ok(self.types.update_type(definition)?)
    }

    /// Remove a type that has neither sub-types nor objects.
    pub fn delete_type_definition(
        &self,
        ctx: &CallContext,
        type_id: &ObjectTypeId,
    ) -> RepositoryResult<()> {
        self.check(ctx)?;
        self.store.delete_type(type_id)?;
        info!(repository = %self.config.id, type_id = %type_id, "type deleted");
        Ok(())
    }

    // ---- Objects ----

    /// Create a document named by `cmis:name` with type `cmis:objectTypeId`,
    /// filed in `folder_id` or unfiled. Returns the version series id for
    /// versionable types.
    pub fn create_document(
        &self,
        ctx: &CallContext,
        properties: &Properties,
        folder_id: Option<&ObjectId>,
        content: Option<Content>,
        versioning_state: Option<VersioningState>,
    ) -> RepositoryResult<ObjectId> {
        self.check(ctx)?;
        let (name, type_id) = name_and_type(properties)?;
        Ok(self.store.create_document(
            ctx,
            folder_id,
            name,
            &type_id,
            properties,
            content,
            versioning_state.unwrap_or_default(),
        )?)
    }

    /// Create a folder inside `folder_id`.
    pub fn create_folder(
        &self,
        ctx: &CallContext,
        properties: &Properties,
        folder_id: &ObjectId,
    ) -> RepositoryResult<ObjectId> {
        self.check(ctx)?;
        let (name, type_id) = name_and_type(properties)?;
        Ok(self
            .store
            .create_folder(ctx, folder_id, name, &type_id, properties)?)
    }

    /// Policies are never filed.
    pub fn create_policy(
        &self,
        ctx: &CallContext,
        properties: &Properties,
    ) -> RepositoryResult<ObjectId> {
        self.check(ctx)?;
        let (name, type_id) = name_and_type(properties)?;
        Ok(self.store.create_policy(ctx, name, &type_id, properties)?)
    }

    /// Relationships cannot be created here.
    pub fn create_relationship(
        &self,
        ctx: &CallContext,
        _properties: &Properties,
    ) -> RepositoryResult<ObjectId> {
        self.check(ctx)?;
        Err(RepositoryError::not_supported("relationships"))
    }

    /// Items cannot be created here.
    pub fn create_item(
        &self,
        ctx: &CallContext,
        _properties: &Properties,
        _folder_id: Option<&ObjectId>,
    ) -> RepositoryResult<ObjectId> {
        self.check(ctx)?;
        Err(RepositoryError::not_supported("items"))
    }

    /// Snapshot one object, optionally with its allowable actions.
    pub fn get_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        include_allowable_actions: bool,
    ) -> RepositoryResult<ObjectData> {
        self.check(ctx)?;
        Ok(self.store.get_object(ctx, id, include_allowable_actions)?)
    }

    /// Snapshot the object at an absolute path such as `/A/doc.txt`.
    pub fn get_object_by_path(
        &self,
        ctx: &CallContext,
        path: &str,
        include_allowable_actions: bool,
    ) -> RepositoryResult<ObjectData> {
        self.check(ctx)?;
        Ok(self
            .store
            .get_object_by_path(ctx, path, include_allowable_actions)?)
    }

    /// All properties of an object, system properties included.
    pub fn get_properties(&self, ctx: &CallContext, id: &ObjectId) -> RepositoryResult<Properties> {
        Ok(self.get_object(ctx, id, false)?.properties)
    }

    /// Apply `properties`; a `cmis:name` entry renames the object.
    pub fn update_properties(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        change_token: Option<ChangeToken>,
        properties: &Properties,
    ) -> RepositoryResult<ObjectData> {
        self.check(ctx)?;
        Ok(self
            .store
            .update_properties(ctx, id, change_token, properties)?)
    }

    /// The whole stream, or the window starting at `offset`.
    pub fn get_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        offset: Option<u64>,
        length: Option<u64>,
    ) -> RepositoryResult<Content> {
        self.check(ctx)?;
        Ok(self
            .store
            .get_content_stream(ctx, id, offset.unwrap_or(0), length)?)
    }

    /// Replace or add a document's content. Returns the new change token.
    pub fn set_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        content: Content,
        overwrite: bool,
        change_token: Option<ChangeToken>,
    ) -> RepositoryResult<ChangeToken> {
        self.check(ctx)?;
        Ok(self
            .store
            .set_content_stream(ctx, id, content, overwrite, change_token)?)
    }

    /// Remove a document's content. Returns the new change token.
    pub fn delete_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        change_token: Option<ChangeToken>,
    ) -> RepositoryResult<ChangeToken> {
        self.check(ctx)?;
        Ok(self.store.delete_content_stream(ctx, id, change_token)?)
    }

    /// Move an object from `source_folder_id` into `target_folder_id`.
    pub fn move_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        target_folder_id: &ObjectId,
        source_folder_id: &ObjectId,
    ) -> RepositoryResult<()> {
        self.check(ctx)?;
        Ok(self
            .store
            .move_object(ctx, id, source_folder_id, target_folder_id)?)
    }

    /// File an object in one more folder.
    pub fn add_object_to_folder(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        folder_id: &ObjectId,
        all_versions: bool,
    ) -> RepositoryResult<()> {
        self.check(ctx)?;
        Ok(self
            .store
            .add_object_to_folder(ctx, id, folder_id, all_versions)?)
    }

    /// Remove an object from one of its folders.
    pub fn remove_object_from_folder(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        folder_id: &ObjectId,
    ) -> RepositoryResult<()> {
        self.check(ctx)?;
        Ok(self.store.remove_object_from_folder(ctx, id, folder_id)?)
    }

    /// Delete one object, or every version of a series.
    pub fn delete_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        all_versions: bool,
    ) -> RepositoryResult<()> {
        self.check(ctx)?;
        Ok(self.store.delete_object(ctx, id, all_versions)?)
    }

    /// Delete a folder subtree. Returns the ids that could not be deleted.
    pub fn delete_tree(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        continue_on_failure: bool,
    ) -> RepositoryResult<Vec<ObjectId>> {
        self.check(ctx)?;
        let failed = self
            .store
            .delete_tree(ctx, folder_id, continue_on_failure)?;
        info!(
            repository = %self.config.id,
            folder = %folder_id,
            failed = failed.len(),
            "tree deleted"
        );
        Ok(failed)
    }

    // ---- Navigation ----

    /// Direct children of a folder, in filing order.
    pub fn get_children(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        paging: Paging,
    ) -> RepositoryResult<Page<ObjectData>> {
        self.check(ctx)?;
        let children = self.store.get_children(ctx, folder_id)?;
        Ok(paging.apply(children, &self.config.paging))
    }

    /// Everything below a folder, up to `depth` levels.
    pub fn get_descendants(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        depth: Option<usize>,
    ) -> RepositoryResult<Vec<ObjectInFolder>> {
        self.check(ctx)?;
        Ok(self.store.get_descendants(ctx, folder_id, depth)?)
    }

    /// Sub-folders below a folder, up to `depth` levels.
    pub fn get_folder_tree(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        depth: Option<usize>,
    ) -> RepositoryResult<Vec<ObjectInFolder>> {
        self.check(ctx)?;
        Ok(self.store.get_folder_tree(ctx, folder_id, depth)?)
    }

    /// The parent of a folder.
    pub fn get_folder_parent(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
    ) -> RepositoryResult<ObjectData> {
        self.check(ctx)?;
        Ok(self.store.get_folder_parent(ctx, folder_id)?)
    }

    /// Every folder an object is filed in.
    pub fn get_object_parents(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
    ) -> RepositoryResult<Vec<ObjectParent>> {
        self.check(ctx)?;
        Ok(self.store.get_object_parents(ctx, id)?)
    }

    /// Working copies of every checked-out document, sorted by name.
    pub fn get_checked_out_docs(
        &self,
        ctx: &CallContext,
        paging: Paging,
    ) -> RepositoryResult<Page<ObjectData>> {
        self.check(ctx)?;
        let docs = self.store.get_checked_out_documents(ctx)?;
        Ok(paging.apply(docs, &self.config.paging))
    }

    // ---- Versioning ----

    /// Returns the id of the new private working copy.
    pub fn check_out(&self, ctx: &CallContext, id: &ObjectId) -> RepositoryResult<ObjectId> {
        self.check(ctx)?;
        Ok(self.store.check_out(ctx, id)?)
    }

    /// Discard the working copy and release the check-out.
    pub fn cancel_check_out(&self, ctx: &CallContext, id: &ObjectId) -> RepositoryResult<()> {
        self.check(ctx)?;
        Ok(self.store.cancel_check_out(ctx, id)?)
    }

    /// Returns the id of the new version.
    pub fn check_in(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        major: bool,
        properties: &Properties,
        content: Option<Content>,
        comment: Option<&str>,
    ) -> RepositoryResult<ObjectId> {
        self.check(ctx)?;
        Ok(self
            .store
            .check_in(ctx, id, major, properties, content, comment)?)
    }

    /// Every version of a series, oldest first.
    pub fn get_all_versions(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
    ) -> RepositoryResult<Vec<ObjectData>> {
        self.check(ctx)?;
        Ok(self.store.get_all_versions(ctx, id)?)
    }

    /// The latest major version, or the last version overall.
    pub fn get_object_of_latest_version(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        major: bool,
    ) -> RepositoryResult<ObjectData> {
        self.check(ctx)?;
        Ok(self.store.get_latest_version(ctx, id, major)?)
    }

    /// Properties of the version `get_object_of_latest_version` returns.
    pub fn get_properties_of_latest_version(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        major: bool,
    ) -> RepositoryResult<Properties> {
        Ok(self.get_object_of_latest_version(ctx, id, major)?.properties)
    }

    // ---- Capabilities ----

    /// What the calling principal may do with an object.
    pub fn get_allowable_actions(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
    ) -> RepositoryResult<AllowableActions> {
        self.check(ctx)?;
        Ok(self.store.get_allowable_actions(ctx, id)?)
    }

    // ---- ACL, policy, relationship and query stubs ----

    /// Always empty; permissions are not modelled.
    pub fn get_acl(&self, ctx: &CallContext, id: &ObjectId) -> RepositoryResult<Acl> {
        self.get_object(ctx, id, false)?;
        Ok(Acl::empty())
    }

    /// ACL changes are not supported.
    pub fn apply_acl(
        &self,
        ctx: &CallContext,
        _id: &ObjectId,
        _add: &Acl,
        _remove: &Acl,
    ) -> RepositoryResult<Acl> {
        self.check(ctx)?;
        Err(RepositoryError::not_supported("ACL management"))
    }

    /// Always empty; policies are never applied.
    pub fn get_applied_policies(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
    ) -> RepositoryResult<Vec<ObjectData>> {
        self.get_object(ctx, id, false)?;
        Ok(Vec::new())
    }

    /// Applying policies is not supported.
    pub fn apply_policy(
        &self,
        ctx: &CallContext,
        _policy_id: &ObjectId,
        _id: &ObjectId,
    ) -> RepositoryResult<()> {
        self.check(ctx)?;
        Err(RepositoryError::not_supported("applying policies"))
    }

    /// Removing policies is not supported.
    pub fn remove_policy(
        &self,
        ctx: &CallContext,
        _policy_id: &ObjectId,
        _id: &ObjectId,
    ) -> RepositoryResult<()> {
        self.check(ctx)?;
        Err(RepositoryError::not_supported("removing policies"))
    }

    /// Always empty; relationships cannot be created.
    pub fn get_object_relationships(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
    ) -> RepositoryResult<Vec<ObjectData>> {
        self.get_object(ctx, id, false)?;
        Ok(Vec::new())
    }

    /// Queries are not supported.
    pub fn query(&self, ctx: &CallContext, _statement: &str) -> RepositoryResult<Vec<ObjectData>> {
        self.check(ctx)?;
        Err(RepositoryError::not_supported("query"))
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.config.id)
            .field("root", &self.store.root_folder_id())
            .finish_non_exhaustive()
    }
}

/// The `cmis:name` and `cmis:objectTypeId` every create call must carry.
fn name_and_type(properties: &Properties) -> RepositoryResult<(&str, ObjectTypeId)> {
    let name = properties
        .string(p::NAME)
        .ok_or_else(|| RepositoryError::InvalidArgument(format!("{} is required", p::NAME)))?;
    let type_id = properties.string(p::OBJECT_TYPE_ID).ok_or_else(|| {
        RepositoryError::InvalidArgument(format!("{} is required", p::OBJECT_TYPE_ID))
    })?;
    Ok((name, ObjectTypeId::new(type_id)))
}
