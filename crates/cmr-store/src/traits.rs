//! The storage traits every backend implements.
//!
//! Every operation takes the [`CallContext`] of the call explicitly; the
//! acting principal determines creator/modifier stamps, check-out ownership
//! and allowable actions.

use cmr_types::{
    AllowableActions, CallContext, ChangeToken, ObjectId, ObjectTypeId, Properties,
    VersioningState,
};

use crate::content::Content;
use crate::error::StoreResult;
use crate::snapshot::{ObjectData, ObjectInFolder, ObjectParent};

/// Creation, retrieval, update and deletion of objects.
pub trait ObjectStore: Send + Sync {
    /// Id of the single root folder.
    fn root_folder_id(&self) -> ObjectId;

    fn create_folder(
        &self,
        ctx: &CallContext,
        parent_id: &ObjectId,
        name: &str,
        type_id: &ObjectTypeId,
        properties: &Properties,
    ) -> StoreResult<ObjectId>;

    /// Create a document, filed in `parent_id` or unfiled when `None`. For a
    /// versionable type the returned id is the version series id.
    #[allow(clippy::too_many_arguments)]
    fn create_document(
        &self,
        ctx: &CallContext,
        parent_id: Option<&ObjectId>,
        name: &str,
        type_id: &ObjectTypeId,
        properties: &Properties,
        content: Option<Content>,
        versioning_state: VersioningState,
    ) -> StoreResult<ObjectId>;

    /// Create an unfiled policy object.
    fn create_policy(
        &self,
        ctx: &CallContext,
        name: &str,
        type_id: &ObjectTypeId,
        properties: &Properties,
    ) -> StoreResult<ObjectId>;

    fn get_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        include_allowable_actions: bool,
    ) -> StoreResult<ObjectData>;

    fn get_object_by_path(
        &self,
        ctx: &CallContext,
        path: &str,
        include_allowable_actions: bool,
    ) -> StoreResult<ObjectData>;

    /// Update properties; a `cmis:name` entry renames the object.
    fn update_properties(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        change_token: Option<ChangeToken>,
        properties: &Properties,
    ) -> StoreResult<ObjectData>;

    fn get_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        offset: u64,
        length: Option<u64>,
    ) -> StoreResult<Content>;

    fn set_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        content: Content,
        overwrite: bool,
        change_token: Option<ChangeToken>,
    ) -> StoreResult<ChangeToken>;

    fn delete_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        change_token: Option<ChangeToken>,
    ) -> StoreResult<ChangeToken>;

    /// Delete one object, or a whole version series when `all_versions`.
    fn delete_object(&self, ctx: &CallContext, id: &ObjectId, all_versions: bool)
        -> StoreResult<()>;

    fn get_allowable_actions(&self, ctx: &CallContext, id: &ObjectId)
        -> StoreResult<AllowableActions>;

    /// Unregister `type_id` from the type registry, refusing while any
    /// stored object still has that type. The check and the removal happen
    /// under the store lock, so no object of the type can appear in between.
    fn delete_type(&self, type_id: &ObjectTypeId) -> StoreResult<()>;
}

/// Folder hierarchy maintenance and navigation.
pub trait Filing: Send + Sync {
    fn rename(&self, ctx: &CallContext, id: &ObjectId, new_name: &str) -> StoreResult<()>;

    fn move_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        source_folder_id: &ObjectId,
        target_folder_id: &ObjectId,
    ) -> StoreResult<()>;

    fn add_object_to_folder(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        folder_id: &ObjectId,
        all_versions: bool,
    ) -> StoreResult<()>;

    fn remove_object_from_folder(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        folder_id: &ObjectId,
    ) -> StoreResult<()>;

    /// Delete a folder and everything below it. Returns the ids that could
    /// not be deleted; empty on full success.
    fn delete_tree(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        continue_on_failure: bool,
    ) -> StoreResult<Vec<ObjectId>>;

    fn get_children(&self, ctx: &CallContext, folder_id: &ObjectId)
        -> StoreResult<Vec<ObjectData>>;

    /// `depth = None` means unlimited; `Some(0)` is invalid.
    fn get_descendants(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        depth: Option<usize>,
    ) -> StoreResult<Vec<ObjectInFolder>>;

    /// Like [`Filing::get_descendants`] but folders only.
    fn get_folder_tree(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        depth: Option<usize>,
    ) -> StoreResult<Vec<ObjectInFolder>>;

    fn get_folder_parent(&self, ctx: &CallContext, folder_id: &ObjectId)
        -> StoreResult<ObjectData>;

    fn get_object_parents(&self, ctx: &CallContext, id: &ObjectId)
        -> StoreResult<Vec<ObjectParent>>;

    /// Absolute path of a folder.
    fn get_path(&self, ctx: &CallContext, folder_id: &ObjectId) -> StoreResult<String>;
}

/// Check-out / check-in over version series.
///
/// Every operation accepts either a series id or the id of any version in
/// the series.
pub trait Versioning: Send + Sync {
    /// Create the private working copy. Returns its id.
    fn check_out(&self, ctx: &CallContext, id: &ObjectId) -> StoreResult<ObjectId>;

    fn cancel_check_out(&self, ctx: &CallContext, id: &ObjectId) -> StoreResult<()>;

    /// Turn the working copy into a new version. Returns the version id.
    fn check_in(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        major: bool,
        properties: &Properties,
        content: Option<Content>,
        comment: Option<&str>,
    ) -> StoreResult<ObjectId>;

    /// All versions, oldest first, the working copy last if present.
    fn get_all_versions(&self, ctx: &CallContext, id: &ObjectId) -> StoreResult<Vec<ObjectData>>;

    fn get_latest_version(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        major_only: bool,
    ) -> StoreResult<ObjectData>;

    /// Working copies of every checked-out series.
    fn get_checked_out_documents(&self, ctx: &CallContext) -> StoreResult<Vec<ObjectData>>;
}
