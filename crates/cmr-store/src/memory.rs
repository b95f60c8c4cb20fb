use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use cmr_types::{
    property_ids, AllowableActions, BaseKind, CallContext, ChangeToken, ObjectId, ObjectTypeId,
    Properties, VersioningState,
};
use cmr_typesys::{ContentStreamAllowed, TypeDefinition, TypeManager};
use tracing::debug;

use crate::actions;
use crate::config::StoreConfig;
use crate::content::Content;
use crate::error::{StoreError, StoreResult};
use crate::filing::rename_in;
use crate::names::validate_name;
use crate::object::{ObjectBody, StoredObject};
use crate::snapshot::{snapshot, subject, ObjectData};
use crate::state::{check_token, StoreState};
use crate::traits::ObjectStore;
use crate::validation::{validate_properties, Purpose};

/// In-memory object store.
///
/// All objects and the filing and version indices live in one
/// [`StoreState`] behind a single `RwLock`. Every mutation holds the write
/// lock for its whole duration, so readers never observe a half-applied
/// move, check-out or content replacement.
pub struct InMemoryObjectStore {
    types: Arc<dyn TypeManager>,
    config: StoreConfig,
    root_id: ObjectId,
    state: RwLock<StoreState>,
}

impl InMemoryObjectStore {
    /// Create a store holding only the root folder.
    pub fn new(types: Arc<dyn TypeManager>, config: StoreConfig) -> Self {
        let state = StoreState::new(BaseKind::Folder.base_type_id(), config.name_comparison);
        Self {
            types,
            config,
            root_id: state.root_id.clone(),
            state: RwLock::new(state),
        }
    }

    /// The capabilities this store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The type registry objects are validated against.
    pub fn types(&self) -> &Arc<dyn TypeManager> {
        &self.types
    }

    /// Number of stored entities, including the root, series and versions.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read_state()?.objects.len())
    }

    /// Returns `true` if nothing is stored, not even the root.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    pub(crate) fn read_state(&self) -> StoreResult<RwLockReadGuard<'_, StoreState>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    pub(crate) fn write_state(&self) -> StoreResult<RwLockWriteGuard<'_, StoreState>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }

    /// Resolve a registered type or fail with `UnknownType`.
    pub(crate) fn type_definition(&self, id: &ObjectTypeId) -> StoreResult<TypeDefinition> {
        self.types
            .get_type(id)?
            .ok_or_else(|| StoreError::UnknownType(id.clone()))
    }

    /// Resolve a type that objects of `kind` may be created with.
    fn creatable_type(&self, id: &ObjectTypeId, kind: BaseKind) -> StoreResult<TypeDefinition> {
        let def = self.type_definition(id)?;
        if def.base_kind != kind {
            return Err(StoreError::invalid(format!(
                "type {id} is a {} type, expected {kind}",
                def.base_kind
            )));
        }
        if !def.flags.creatable {
            return Err(StoreError::constraint(format!("type {id} is not creatable")));
        }
        Ok(def)
    }

    /// The object whose content slot `id` addresses on behalf of `user`.
    ///
    /// Versioned documents only accept content changes on the working copy,
    /// and only from the principal who checked it out.
    fn content_target(state: &StoreState, id: &ObjectId, user: &str) -> StoreResult<ObjectId> {
        let obj = state.get(id)?;
        let series_id = match &obj.body {
            ObjectBody::Document { .. } => return Ok(id.clone()),
            ObjectBody::Folder | ObjectBody::Policy => {
                return Err(StoreError::constraint(format!(
                    "{} objects have no content stream",
                    obj.base_kind()
                )));
            }
            ObjectBody::VersionSeries { .. } => id.clone(),
            ObjectBody::Version {
                series_id, is_pwc, ..
            } => {
                if !is_pwc {
                    return Err(StoreError::constraint(format!(
                        "version {id} is checked in and cannot change"
                    )));
                }
                series_id.clone()
            }
        };
        let series = state.get(&series_id)?;
        match series.checked_out_by() {
            None => Err(StoreError::constraint(format!(
                "version series {series_id} must be checked out to change its content"
            ))),
            Some(owner) if owner != user => Err(StoreError::PermissionDenied {
                id: series_id.clone(),
                user: user.to_string(),
                owner: owner.to_string(),
            }),
            Some(_) => state
                .pwc_of(&series_id)
                .cloned()
                .ok_or_else(|| StoreError::NotCheckedOut(series_id.clone())),
        }
    }
}

fn check_content_rule(def: &TypeDefinition, content: Option<&Content>) -> StoreResult<()> {
    match (def.content_stream_allowed, content) {
        (ContentStreamAllowed::NotAllowed, Some(_)) => Err(StoreError::constraint(format!(
            "documents of type {} cannot have content",
            def.id
        ))),
        (ContentStreamAllowed::Required, None) => Err(StoreError::constraint(format!(
            "documents of type {} require content",
            def.id
        ))),
        _ => Ok(()),
    }
}

/// What a validated delete request will remove.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Deletion {
    /// A folder, plain document or policy.
    Object(ObjectId),
    /// A version series with all its versions.
    Series(ObjectId),
    /// One version of a series.
    Version { series: ObjectId, version: ObjectId },
}

/// Validate a delete of `id` by `user` without changing anything.
pub(crate) fn plan_deletion(
    state: &StoreState,
    id: &ObjectId,
    all_versions: bool,
    user: &str,
) -> StoreResult<Deletion> {
    if state.is_root(id) {
        return Err(StoreError::constraint("the root folder cannot be deleted"));
    }
    let obj = state.get(id)?;
    let (series_id, version_id) = match &obj.body {
        ObjectBody::Folder => {
            if !state.children_of(id).is_empty() {
                return Err(StoreError::constraint(format!("folder {id} is not empty")));
            }
            return Ok(Deletion::Object(id.clone()));
        }
        ObjectBody::Document { .. } | ObjectBody::Policy => {
            return Ok(Deletion::Object(id.clone()));
        }
        ObjectBody::VersionSeries { .. } => {
            let current = state.current_version(id).cloned();
            (id.clone(), current)
        }
        ObjectBody::Version { series_id, .. } => (series_id.clone(), Some(id.clone())),
    };
    let owner = state.get(&series_id)?.checked_out_by();

    let version = match version_id {
        Some(v) if !all_versions => v,
        _ => {
            if let Some(owner) = owner.filter(|o| *o != user) {
                return Err(StoreError::CheckedOutByOther {
                    id: series_id,
                    owner: owner.to_string(),
                });
            }
            return Ok(Deletion::Series(series_id));
        }
    };
    let is_pwc = state.get(&version)?.is_pwc();
    match owner {
        Some(owner) if is_pwc && owner != user => Err(StoreError::PermissionDenied {
            id: series_id,
            user: user.to_string(),
            owner: owner.to_string(),
        }),
        Some(owner) if !is_pwc && owner != user => Err(StoreError::CheckedOutByOther {
            id: series_id,
            owner: owner.to_string(),
        }),
        _ => Ok(Deletion::Version {
            series: series_id,
            version,
        }),
    }
}

/// Carry out a planned deletion.
pub(crate) fn apply_deletion(
    state: &mut StoreState,
    deletion: &Deletion,
    user: &str,
) -> StoreResult<()> {
    match deletion {
        Deletion::Object(id) => {
            state.remove_object(id);
            debug!(id = %id, "deleted object");
        }
        Deletion::Series(series) => {
            for version in state.versions_of(series).to_vec() {
                state.objects.remove(&version);
            }
            state.remove_object(series);
            debug!(series = %series, "deleted version series");
        }
        Deletion::Version { series, version } => {
            let was_pwc = state
                .objects
                .remove(version)
                .is_some_and(|v| v.is_pwc());
            if let Some(versions) = state.versions.get_mut(series) {
                versions.retain(|v| v != version);
            }
            if state.versions_of(series).is_empty() {
                state.remove_object(series);
                debug!(series = %series, "deleted last version, series removed");
                return Ok(());
            }
            if was_pwc {
                if let ObjectBody::VersionSeries { checked_out_by } = &mut state.get_mut(series)?.body
                {
                    *checked_out_by = None;
                }
            }
            state.touch(series, user)?;
            debug!(series = %series, version = %version, "deleted version");
        }
    }
    Ok(())
}

impl ObjectStore for InMemoryObjectStore {
    fn root_folder_id(&self) -> ObjectId {
        self.root_id.clone()
    }

    fn create_folder(
        &self,
        ctx: &CallContext,
        parent_id: &ObjectId,
        name: &str,
        type_id: &ObjectTypeId,
        properties: &Properties,
    ) -> StoreResult<ObjectId> {
        validate_name(name)?;
        let mut state = self.write_state()?;
        let def = self.creatable_type(type_id, BaseKind::Folder)?;
        let accepted = validate_properties(&def, properties, Purpose::Create)?;
        state.folder(parent_id)?;
        state.ensure_name_free(parent_id, name, None)?;

        let id = ObjectId::generate();
        let token = state.next_token();
        let folder = StoredObject::new(
            id.clone(),
            name,
            def.id.clone(),
            ctx.username(),
            token,
            ObjectBody::Folder,
        )
        .with_properties(accepted);
        state.objects.insert(id.clone(), folder);
        state.children.insert(id.clone(), Vec::new());
        state.file(&id, parent_id);
        debug!(id = %id, parent = %parent_id, name, "created folder");
        Ok(id)
    }

    fn create_document(
        &self,
        ctx: &CallContext,
        parent_id: Option<&ObjectId>,
        name: &str,
        type_id: &ObjectTypeId,
        properties: &Properties,
        content: Option<Content>,
        versioning_state: VersioningState,
    ) -> StoreResult<ObjectId> {
        validate_name(name)?;
        let mut state = self.write_state()?;
        let def = self.creatable_type(type_id, BaseKind::Document)?;
        let accepted = validate_properties(&def, properties, Purpose::Create)?;
        check_content_rule(&def, content.as_ref())?;
        match parent_id {
            None if !self.config.unfiling => {
                return Err(StoreError::constraint(
                    "unfiled documents are not supported by this repository",
                ));
            }
            Some(_) if !def.flags.fileable => {
                return Err(StoreError::constraint(format!("type {} is not fileable", def.id)));
            }
            _ => {}
        }
        if !def.flags.versionable && versioning_state == VersioningState::CheckedOut {
            return Err(StoreError::constraint(format!(
                "type {} is not versionable and cannot be created checked out",
                def.id
            )));
        }

        let user = ctx.username();
        if let Some(parent) = parent_id {
            state.folder(parent)?;
            state.ensure_name_free(parent, name, None)?;
        }

        let id = ObjectId::generate();
        let token = state.next_token();
        if def.flags.versionable {
            let (is_major, checked_out) = match versioning_state {
                VersioningState::None | VersioningState::Major => (true, false),
                VersioningState::Minor => (false, false),
                VersioningState::CheckedOut => (false, true),
            };
            let series = StoredObject::new(
                id.clone(),
                name,
                def.id.clone(),
                user,
                token,
                ObjectBody::VersionSeries {
                    checked_out_by: checked_out.then(|| user.to_string()),
                },
            );
            let version_id = ObjectId::generate();
            let version_token = state.next_token();
            let version = StoredObject::new(
                version_id.clone(),
                name,
                def.id.clone(),
                user,
                version_token,
                ObjectBody::Version {
                    series_id: id.clone(),
                    is_major,
                    is_pwc: checked_out,
                    checkin_comment: None,
                    content,
                },
            )
            .with_properties(accepted);
            state.objects.insert(id.clone(), series);
            state.objects.insert(version_id.clone(), version);
            state.versions.insert(id.clone(), vec![version_id.clone()]);
            debug!(series = %id, version = %version_id, ?versioning_state, "created versioned document");
        } else {
            let doc = StoredObject::new(
                id.clone(),
                name,
                def.id.clone(),
                user,
                token,
                ObjectBody::Document { content },
            )
            .with_properties(accepted);
            state.objects.insert(id.clone(), doc);
            debug!(id = %id, "created document");
        }
        if let Some(parent) = parent_id {
            state.file(&id, parent);
        }
        Ok(id)
    }

    fn create_policy(
        &self,
        ctx: &CallContext,
        name: &str,
        type_id: &ObjectTypeId,
        properties: &Properties,
    ) -> StoreResult<ObjectId> {
        validate_name(name)?;
        let mut state = self.write_state()?;
        let def = self.creatable_type(type_id, BaseKind::Policy)?;
        let accepted = validate_properties(&def, properties, Purpose::Create)?;
        let id = ObjectId::generate();
        let token = state.next_token();
        let policy = StoredObject::new(
            id.clone(),
            name,
            def.id.clone(),
            ctx.username(),
            token,
            ObjectBody::Policy,
        )
        .with_properties(accepted);
        state.objects.insert(id.clone(), policy);
        debug!(id = %id, "created policy");
        Ok(id)
    }

    fn get_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        include_allowable_actions: bool,
    ) -> StoreResult<ObjectData> {
        let state = self.read_state()?;
        snapshot(&state, id, ctx.username(), include_allowable_actions)
    }

    fn get_object_by_path(
        &self,
        ctx: &CallContext,
        path: &str,
        include_allowable_actions: bool,
    ) -> StoreResult<ObjectData> {
        if !path.starts_with('/') {
            return Err(StoreError::invalid(format!("path {path:?} is not absolute")));
        }
        let state = self.read_state()?;
        let mut current = state.root_id.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if !state.get(&current)?.is_folder() {
                return Err(StoreError::PathNotFound(path.to_string()));
            }
            current = state
                .find_child(&current, segment)
                .cloned()
                .ok_or_else(|| StoreError::PathNotFound(path.to_string()))?;
        }
        snapshot(&state, &current, ctx.username(), include_allowable_actions)
    }

    fn update_properties(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        change_token: Option<ChangeToken>,
        properties: &Properties,
    ) -> StoreResult<ObjectData> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        let obj = state.get(id)?;
        check_token(obj, change_token)?;

        let target_id = match obj.body {
            ObjectBody::VersionSeries { .. } => state
                .current_version(id)
                .cloned()
                .ok_or_else(|| StoreError::invalid(format!("version series {id} is empty")))?,
            _ => id.clone(),
        };
        let target = state.get(&target_id)?;
        let def = self.type_definition(&target.type_id)?;
        let accepted = validate_properties(
            &def,
            properties,
            Purpose::Update {
                checked_out: target.is_pwc(),
            },
        )?;

        if let Some(name) = properties.get(property_ids::NAME) {
            let new_name = name
                .first()
                .and_then(|v| v.as_str())
                .ok_or_else(|| StoreError::invalid("cmis:name cannot be cleared"))?;
            rename_in(&mut state, id, new_name)?;
        }
        state.get_mut(&target_id)?.properties.overlay(&accepted);
        state.touch(&target_id, user)?;
        debug!(id = %id, count = properties.len(), "updated properties");
        snapshot(&state, id, user, false)
    }

    fn get_content_stream(
        &self,
        _ctx: &CallContext,
        id: &ObjectId,
        offset: u64,
        length: Option<u64>,
    ) -> StoreResult<Content> {
        let state = self.read_state()?;
        let obj = state.get(id)?;
        let holder = match obj.body {
            ObjectBody::VersionSeries { .. } => match state.current_version(id) {
                Some(current) => state.get(current)?,
                None => obj,
            },
            _ => obj,
        };
        let content = holder.content().ok_or_else(|| {
            StoreError::constraint(format!("{id} has no content stream"))
        })?;
        content.window(offset, length)
    }

    fn set_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        content: Content,
        overwrite: bool,
        change_token: Option<ChangeToken>,
    ) -> StoreResult<ChangeToken> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        check_token(state.get(id)?, change_token)?;
        let target_id = Self::content_target(&state, id, user)?;
        let target = state.get(&target_id)?;
        let def = self.type_definition(&target.type_id)?;
        check_content_rule(&def, Some(&content))?;
        if target.content().is_some() && !overwrite {
            return Err(StoreError::constraint(format!(
                "{id} already has content and overwrite was not requested"
            )));
        }

        let length = content.len();
        if let Some(slot) = state.get_mut(&target_id)?.content_slot() {
            *slot = Some(content);
        }
        state.touch(&target_id, user)?;
        debug!(id = %id, target = %target_id, length, "set content stream");
        Ok(state.get(id)?.change_token)
    }

    fn delete_content_stream(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        change_token: Option<ChangeToken>,
    ) -> StoreResult<ChangeToken> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        check_token(state.get(id)?, change_token)?;
        let target_id = Self::content_target(&state, id, user)?;
        let target = state.get(&target_id)?;
        let def = self.type_definition(&target.type_id)?;
        check_content_rule(&def, None)?;
        if target.content().is_none() {
            return Err(StoreError::constraint(format!("{id} has no content stream")));
        }

        if let Some(slot) = state.get_mut(&target_id)?.content_slot() {
            *slot = None;
        }
        state.touch(&target_id, user)?;
        debug!(id = %id, target = %target_id, "deleted content stream");
        Ok(state.get(id)?.change_token)
    }

    fn delete_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        all_versions: bool,
    ) -> StoreResult<()> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        let deletion = plan_deletion(&state, id, all_versions, user)?;
        apply_deletion(&mut state, &deletion, user)
    }

    fn get_allowable_actions(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
    ) -> StoreResult<AllowableActions> {
        let state = self.read_state()?;
        let obj = state.get(id)?;
        Ok(actions::compute(&subject(&state, obj), ctx.username()))
    }

    fn delete_type(&self, type_id: &ObjectTypeId) -> StoreResult<()> {
        // Creations resolve their type under this same lock.
        let state = self.write_state()?;
        if state.objects.values().any(|obj| &obj.type_id == type_id) {
            return Err(StoreError::TypeInUse(type_id.clone()));
        }
        self.types.delete_type(type_id)?;
        debug!(type_id = %type_id, "deleted unused type");
        Ok(())
    }
}
