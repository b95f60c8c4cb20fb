//! The shared mutable state behind one store lock.
//!
//! Objects live in a flat table keyed by id. Filing and versioning are
//! expressed through id-keyed index maps rather than object references, so
//! a folder never owns its children and a document can appear under many
//! folders.

use std::collections::HashMap;

use cmr_types::{ChangeToken, ObjectId};

use crate::error::{StoreError, StoreResult};
use crate::names::NameComparison;
use crate::object::{ObjectBody, StoredObject};

/// Name reported for the root folder. Its path is always `/`.
pub const ROOT_FOLDER_NAME: &str = "RootFolder";

/// Principal recorded as creator of the root folder.
pub const SYSTEM_USER: &str = "system";

/// Upper bound on folder nesting walked when resolving paths.
const MAX_DEPTH: usize = 4096;

pub(crate) struct StoreState {
    pub objects: HashMap<ObjectId, StoredObject>,
    /// Folder id to filed child ids, in filing order.
    pub children: HashMap<ObjectId, Vec<ObjectId>>,
    /// Fileable id to parent folder ids.
    pub parents: HashMap<ObjectId, Vec<ObjectId>>,
    /// Series id to version ids, oldest first. A PWC is always last.
    pub versions: HashMap<ObjectId, Vec<ObjectId>>,
    pub root_id: ObjectId,
    pub name_comparison: NameComparison,
    last_token: u64,
}

impl StoreState {
    /// State holding only the root folder.
    pub fn new(root_type: cmr_types::ObjectTypeId, name_comparison: NameComparison) -> Self {
        let root_id = ObjectId::generate();
        let root = StoredObject::new(
            root_id.clone(),
            ROOT_FOLDER_NAME,
            root_type,
            SYSTEM_USER,
            ChangeToken::from_raw(1),
            ObjectBody::Folder,
        );
        let mut objects = HashMap::new();
        objects.insert(root_id.clone(), root);
        let mut children = HashMap::new();
        children.insert(root_id.clone(), Vec::new());
        Self {
            objects,
            children,
            parents: HashMap::new(),
            versions: HashMap::new(),
            root_id,
            name_comparison,
            last_token: 1,
        }
    }

    /// Issue a token strictly greater than every token issued before.
    pub fn next_token(&mut self) -> ChangeToken {
        self.last_token += 1;
        ChangeToken::from_raw(self.last_token)
    }

    /// Look up an object or fail with `NotFound`.
    pub fn get(&self, id: &ObjectId) -> StoreResult<&StoredObject> {
        self.objects
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Mutable lookup, failing with `NotFound`.
    pub fn get_mut(&mut self, id: &ObjectId) -> StoreResult<&mut StoredObject> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Resolve `id` to a folder.
    pub fn folder(&self, id: &ObjectId) -> StoreResult<&StoredObject> {
        let obj = self.get(id)?;
        if !obj.is_folder() {
            return Err(StoreError::invalid(format!("{id} is not a folder")));
        }
        Ok(obj)
    }

    /// Returns `true` if `id` is the root folder.
    pub fn is_root(&self, id: &ObjectId) -> bool {
        id == &self.root_id
    }

    /// The entity that folders file for `id`: the series for a version,
    /// the object itself otherwise.
    pub fn filing_id(&self, id: &ObjectId) -> StoreResult<ObjectId> {
        let obj = self.get(id)?;
        Ok(obj.series_id().cloned().unwrap_or_else(|| id.clone()))
    }

    /// Children of a folder, in filing order.
    pub fn children_of(&self, folder: &ObjectId) -> &[ObjectId] {
        self.children.get(folder).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Folders an object is filed in.
    pub fn parents_of(&self, id: &ObjectId) -> &[ObjectId] {
        self.parents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Version ids of a series, oldest first.
    pub fn versions_of(&self, series: &ObjectId) -> &[ObjectId] {
        self.versions.get(series).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The child of `folder` named `name`, under the configured comparison.
    pub fn find_child(&self, folder: &ObjectId, name: &str) -> Option<&ObjectId> {
        self.children_of(folder).iter().find(|child| {
            self.objects
                .get(*child)
                .is_some_and(|obj| self.name_comparison.same(&obj.name, name))
        })
    }

    /// Fail if `folder` already holds a child called `name` other than `except`.
    pub fn ensure_name_free(
        &self,
        folder: &ObjectId,
        name: &str,
        except: Option<&ObjectId>,
    ) -> StoreResult<()> {
        match self.find_child(folder, name) {
            Some(existing) if Some(existing) != except => Err(StoreError::NameConflict {
                name: name.to_string(),
                parent: folder.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Returns `true` if `id` is filed directly in `folder`.
    pub fn is_filed_in(&self, id: &ObjectId, folder: &ObjectId) -> bool {
        self.parents_of(id).contains(folder)
    }

    /// Record `id` as a child of `folder`.
    pub fn file(&mut self, id: &ObjectId, folder: &ObjectId) {
        self.children
            .entry(folder.clone())
            .or_default()
            .push(id.clone());
        self.parents
            .entry(id.clone())
            .or_default()
            .push(folder.clone());
    }

    /// Remove `id` from `folder`.
    pub fn unfile(&mut self, id: &ObjectId, folder: &ObjectId) {
        if let Some(kids) = self.children.get_mut(folder) {
            kids.retain(|c| c != id);
        }
        if let Some(parents) = self.parents.get_mut(id) {
            parents.retain(|p| p != folder);
            if parents.is_empty() {
                self.parents.remove(id);
            }
        }
    }

    /// Remove an object and every index entry keyed by it. Versions of a
    /// series are not touched; callers remove them first.
    pub fn remove_object(&mut self, id: &ObjectId) -> Option<StoredObject> {
        let parents = self.parents.remove(id).unwrap_or_default();
        for parent in &parents {
            if let Some(kids) = self.children.get_mut(parent) {
                kids.retain(|c| c != id);
            }
        }
        self.children.remove(id);
        self.versions.remove(id);
        self.objects.remove(id)
    }

    /// Absolute path of a folder.
    pub fn path_of(&self, folder: &ObjectId) -> StoreResult<String> {
        let mut segments = Vec::new();
        let mut current = folder.clone();
        for _ in 0..MAX_DEPTH {
            if self.is_root(&current) {
                segments.reverse();
                return Ok(format!("/{}", segments.join("/")));
            }
            let obj = self.get(&current)?;
            segments.push(obj.name.clone());
            current = match self.parents_of(&current).first() {
                Some(parent) => parent.clone(),
                None => {
                    return Err(StoreError::invalid(format!("{folder} has no path")));
                }
            };
        }
        Err(StoreError::invalid(format!("{folder} is nested too deeply")))
    }

    /// Returns `true` if `ancestor` is `folder` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: &ObjectId, folder: &ObjectId) -> bool {
        let mut current = folder.clone();
        for _ in 0..MAX_DEPTH {
            if &current == ancestor {
                return true;
            }
            match self.parents_of(&current).first() {
                Some(parent) => current = parent.clone(),
                None => return false,
            }
        }
        false
    }

    /// The private working copy of a series, if checked out.
    pub fn pwc_of(&self, series: &ObjectId) -> Option<&ObjectId> {
        self.versions_of(series)
            .last()
            .filter(|v| self.objects.get(*v).is_some_and(StoredObject::is_pwc))
    }

    /// Latest checked-in version, optionally restricted to major versions.
    pub fn latest_version(&self, series: &ObjectId, major_only: bool) -> Option<&ObjectId> {
        self.versions_of(series).iter().rev().find(|v| {
            self.objects.get(*v).is_some_and(|obj| match obj.body {
                ObjectBody::Version {
                    is_pwc, is_major, ..
                } => !is_pwc && (is_major || !major_only),
                _ => false,
            })
        })
    }

    /// The version a series id stands for: the latest checked-in version, or
    /// the PWC of a series that was created checked out.
    pub fn current_version(&self, series: &ObjectId) -> Option<&ObjectId> {
        self.latest_version(series, false)
            .or_else(|| self.versions_of(series).last())
    }

    /// Issue a fresh token for `id` on behalf of `user`. Touching a version
    /// also touches its series.
    pub fn touch(&mut self, id: &ObjectId, user: &str) -> StoreResult<ChangeToken> {
        let token = self.next_token();
        let obj = self.get_mut(id)?;
        obj.touch(user, token);
        if let Some(series) = obj.series_id().cloned() {
            let series_token = self.next_token();
            self.get_mut(&series)?.touch(user, series_token);
        }
        Ok(token)
    }
}

/// Fail with `UpdateConflict` if a supplied token is stale.
pub(crate) fn check_token(obj: &StoredObject, supplied: Option<ChangeToken>) -> StoreResult<()> {
    match supplied {
        Some(token) if token != obj.change_token => Err(StoreError::StaleChangeToken {
            id: obj.id.clone(),
            supplied: token,
            current: obj.change_token,
        }),
        _ => Ok(()),
    }
}
