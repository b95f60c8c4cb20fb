//! Folder hierarchy maintenance and navigation.
//!
//! Folders are single-filed and form a tree under the root. Documents may
//! be filed in several folders (multi-filing) or in none (unfiling) when the
//! store's [`StoreConfig`](crate::StoreConfig) allows it. Policies are never
//! filed.

use std::collections::HashSet;

use cmr_types::{BaseKind, CallContext, ObjectId};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::memory::{apply_deletion, plan_deletion, Deletion, InMemoryObjectStore};
use crate::names::validate_name;
use crate::snapshot::{snapshot, ObjectData, ObjectInFolder, ObjectParent};
use crate::state::StoreState;
use crate::traits::Filing;

/// Rename the filed entity behind `id` after checking every parent for a
/// clash. Returns the renamed entity's id. Does not touch the change token.
pub(crate) fn rename_in(
    state: &mut StoreState,
    id: &ObjectId,
    new_name: &str,
) -> StoreResult<ObjectId> {
    let entity = state.filing_id(id)?;
    if state.is_root(&entity) {
        return Err(StoreError::constraint("the root folder cannot be renamed"));
    }
    validate_name(new_name)?;
    for parent in state.parents_of(&entity) {
        state.ensure_name_free(parent, new_name, Some(&entity))?;
    }
    let versions = state.versions_of(&entity).to_vec();
    state.get_mut(&entity)?.name = new_name.to_string();
    for version in versions {
        if let Some(obj) = state.objects.get_mut(&version) {
            obj.name = new_name.to_string();
        }
    }
    Ok(entity)
}

/// Resolve a folder argument of a move, where absence is an argument error.
fn existing_folder(state: &StoreState, id: &ObjectId) -> StoreResult<()> {
    match state.objects.get(id) {
        Some(obj) if obj.is_folder() => Ok(()),
        Some(_) => Err(StoreError::invalid(format!("{id} is not a folder"))),
        None => Err(StoreError::invalid(format!("folder {id} does not exist"))),
    }
}

/// Fail unless `id` is a document that may be multi-filed here.
fn multifiling_subject(
    store: &InMemoryObjectStore,
    state: &StoreState,
    id: &ObjectId,
) -> StoreResult<ObjectId> {
    match state.get(id)?.base_kind() {
        BaseKind::Folder => {
            return Err(StoreError::constraint(format!(
                "folder {id} cannot be multi-filed"
            )));
        }
        BaseKind::Policy | BaseKind::Relationship => {
            return Err(StoreError::constraint(format!("{id} is not fileable")));
        }
        BaseKind::Document => {}
    }
    if !store.config().multifiling {
        return Err(StoreError::constraint(
            "multi-filing is not supported by this repository",
        ));
    }
    state.filing_id(id)
}

/// Folders of the subtree rooted at `folder`, parents before children.
fn subtree_folders(state: &StoreState, folder: &ObjectId) -> Vec<ObjectId> {
    let mut out = vec![folder.clone()];
    let mut i = 0;
    while i < out.len() {
        let current = out[i].clone();
        out.extend(
            state
                .children_of(&current)
                .iter()
                .filter(|c| state.objects.get(*c).is_some_and(|o| o.is_folder()))
                .cloned(),
        );
        i += 1;
    }
    out
}

fn descend(
    state: &StoreState,
    folder: &ObjectId,
    depth: Option<usize>,
    folders_only: bool,
    user: &str,
) -> StoreResult<Vec<ObjectInFolder>> {
    let mut out = Vec::new();
    for child in state.children_of(folder) {
        let obj = state.get(child)?;
        if folders_only && !obj.is_folder() {
            continue;
        }
        let children = match depth {
            _ if !obj.is_folder() => Vec::new(),
            Some(d) if d <= 1 => Vec::new(),
            _ => descend(state, child, depth.map(|d| d - 1), folders_only, user)?,
        };
        out.push(ObjectInFolder {
            object: snapshot(state, child, user, false)?,
            children,
        });
    }
    Ok(out)
}

fn check_depth(depth: Option<usize>) -> StoreResult<()> {
    if depth == Some(0) {
        return Err(StoreError::invalid("depth must be at least 1"));
    }
    Ok(())
}

impl Filing for InMemoryObjectStore {
    fn rename(&self, ctx: &CallContext, id: &ObjectId, new_name: &str) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let entity = rename_in(&mut state, id, new_name)?;
        state.touch(&entity, ctx.username())?;
        debug!(id = %entity, name = new_name, "renamed object");
        Ok(())
    }

    fn move_object(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        source_folder_id: &ObjectId,
        target_folder_id: &ObjectId,
    ) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let entity = state.filing_id(id)?;
        if state.is_root(&entity) {
            return Err(StoreError::invalid("the root folder cannot be moved"));
        }
        existing_folder(&state, source_folder_id)?;
        existing_folder(&state, target_folder_id)?;
        let obj = state.get(&entity)?;
        if obj.base_kind() == BaseKind::Policy {
            return Err(StoreError::constraint(format!("policy {id} is not fileable")));
        }
        if !state.is_filed_in(&entity, source_folder_id) {
            return Err(StoreError::invalid(format!(
                "{id} is not filed in {source_folder_id}"
            )));
        }
        if source_folder_id == target_folder_id {
            return Ok(());
        }
        if obj.is_folder() && state.is_ancestor_or_self(&entity, target_folder_id) {
            return Err(StoreError::constraint(format!(
                "cannot move folder {id} into its own subtree"
            )));
        }
        if state.is_filed_in(&entity, target_folder_id) {
            return Err(StoreError::constraint(format!(
                "{id} is already filed in {target_folder_id}"
            )));
        }
        let name = obj.name.clone();
        state.ensure_name_free(target_folder_id, &name, Some(&entity))?;

        state.unfile(&entity, source_folder_id);
        state.file(&entity, target_folder_id);
        state.touch(&entity, ctx.username())?;
        debug!(
            id = %entity,
            from = %source_folder_id,
            to = %target_folder_id,
            "moved object"
        );
        Ok(())
    }

    fn add_object_to_folder(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        folder_id: &ObjectId,
        all_versions: bool,
    ) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let entity = multifiling_subject(self, &state, id)?;
        if !all_versions {
            return Err(StoreError::NotSupported(
                "version-specific filing".to_string(),
            ));
        }
        state.folder(folder_id)?;
        if state.is_filed_in(&entity, folder_id) {
            return Err(StoreError::constraint(format!(
                "{id} is already filed in {folder_id}"
            )));
        }
        let name = state.get(&entity)?.name.clone();
        state.ensure_name_free(folder_id, &name, None)?;

        state.file(&entity, folder_id);
        state.touch(&entity, ctx.username())?;
        debug!(id = %entity, folder = %folder_id, "added object to folder");
        Ok(())
    }

    fn remove_object_from_folder(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        folder_id: &ObjectId,
    ) -> StoreResult<()> {
        let mut state = self.write_state()?;
        let entity = multifiling_subject(self, &state, id)?;
        state.folder(folder_id)?;
        if !state.is_filed_in(&entity, folder_id) {
            return Err(StoreError::invalid(format!(
                "{id} is not filed in {folder_id}"
            )));
        }
        if state.parents_of(&entity).len() == 1 && !self.config().unfiling {
            return Err(StoreError::constraint(format!(
                "removing {id} from its last folder would leave it unfiled"
            )));
        }

        state.unfile(&entity, folder_id);
        state.touch(&entity, ctx.username())?;
        debug!(id = %entity, folder = %folder_id, "removed object from folder");
        Ok(())
    }

    fn delete_tree(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        continue_on_failure: bool,
    ) -> StoreResult<Vec<ObjectId>> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        state.folder(folder_id)?;
        if state.is_root(folder_id) {
            return Err(StoreError::constraint("the root folder cannot be deleted"));
        }

        let folders = subtree_folders(&state, folder_id);
        let in_tree: HashSet<&ObjectId> = folders.iter().collect();

        // Plan everything before touching anything.
        let mut seen = HashSet::new();
        let mut unfile = Vec::new();
        let mut deletions: Vec<Deletion> = Vec::new();
        let mut failed = Vec::new();
        for folder in folders.iter().rev() {
            for child in state.children_of(folder) {
                if state.objects.get(child).is_some_and(|o| o.is_folder()) {
                    continue;
                }
                if !seen.insert(child.clone()) {
                    continue;
                }
                let parents = state.parents_of(child);
                if parents.iter().any(|p| !in_tree.contains(p)) {
                    for p in parents.iter().filter(|p| in_tree.contains(p)) {
                        unfile.push((child.clone(), p.clone()));
                    }
                    continue;
                }
                match plan_deletion(&state, child, true, user) {
                    Ok(deletion) => deletions.push(deletion),
                    Err(e) if continue_on_failure => {
                        warn!(id = %child, error = %e, "delete tree: skipping object");
                        failed.push(child.clone());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        for (child, parent) in &unfile {
            state.unfile(child, parent);
        }
        for deletion in &deletions {
            apply_deletion(&mut state, deletion, user)?;
        }
        // Folders left non-empty by a failure stay in place.
        let mut removed_folders = 0usize;
        for folder in folders.iter().rev() {
            if state.children_of(folder).is_empty() {
                state.remove_object(folder);
                removed_folders += 1;
            }
        }
        debug!(
            folder = %folder_id,
            documents = deletions.len(),
            unfiled = unfile.len(),
            folders = removed_folders,
            failed = failed.len(),
            "deleted tree"
        );
        Ok(failed)
    }

    fn get_children(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
    ) -> StoreResult<Vec<ObjectData>> {
        let state = self.read_state()?;
        state.folder(folder_id)?;
        state
            .children_of(folder_id)
            .iter()
            .map(|child| snapshot(&state, child, ctx.username(), false))
            .collect()
    }

    fn get_descendants(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        depth: Option<usize>,
    ) -> StoreResult<Vec<ObjectInFolder>> {
        check_depth(depth)?;
        let state = self.read_state()?;
        state.folder(folder_id)?;
        descend(&state, folder_id, depth, false, ctx.username())
    }

    fn get_folder_tree(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
        depth: Option<usize>,
    ) -> StoreResult<Vec<ObjectInFolder>> {
        check_depth(depth)?;
        let state = self.read_state()?;
        state.folder(folder_id)?;
        descend(&state, folder_id, depth, true, ctx.username())
    }

    fn get_folder_parent(
        &self,
        ctx: &CallContext,
        folder_id: &ObjectId,
    ) -> StoreResult<ObjectData> {
        let state = self.read_state()?;
        state.folder(folder_id)?;
        let parent = state
            .parents_of(folder_id)
            .first()
            .ok_or_else(|| StoreError::invalid("the root folder has no parent"))?;
        snapshot(&state, parent, ctx.username(), false)
    }

    fn get_object_parents(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
    ) -> StoreResult<Vec<ObjectParent>> {
        let state = self.read_state()?;
        if state.is_root(id) {
            return Err(StoreError::invalid("the root folder has no parents"));
        }
        let obj = state.get(id)?;
        if obj.base_kind() == BaseKind::Policy {
            return Err(StoreError::constraint(format!("policy {id} is not fileable")));
        }
        let entity = state.filing_id(id)?;
        let name = state.get(&entity)?.name.clone();
        state
            .parents_of(&entity)
            .iter()
            .map(|parent| -> StoreResult<ObjectParent> {
                Ok(ObjectParent {
                    parent: snapshot(&state, parent, ctx.username(), false)?,
                    relative_path_segment: name.clone(),
                })
            })
            .collect()
    }

    fn get_path(&self, _ctx: &CallContext, folder_id: &ObjectId) -> StoreResult<String> {
        let state = self.read_state()?;
        state.folder(folder_id)?;
        state.path_of(folder_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::test_support::*;
    use crate::traits::{ObjectStore, Versioning};
    use cmr_types::{ErrorKind, VersioningState};

    #[test]
    fn rename_keeps_siblings_unique() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        folder(&store, &ctx, &root, "B");
        store.rename(&ctx, &a, "C").unwrap();
        assert_eq!(store.get_path(&ctx, &a).unwrap(), "/C");
        assert_eq!(
            store.rename(&ctx, &a, "B").unwrap_err().kind(),
            ErrorKind::NameConstraintViolation
        );
        assert_eq!(
            store.rename(&ctx, &root, "X").unwrap_err().kind(),
            ErrorKind::Constraint
        );
        // Renaming to its own name is not a clash.
        store.rename(&ctx, &a, "C").unwrap();
    }

    #[test]
    fn rename_versioned_document_renames_versions() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "v.txt", VersioningState::Major);
        let v1 = store.get_all_versions(&ctx, &d).unwrap()[0].id.clone();
        store.rename(&ctx, &v1, "w.txt").unwrap();
        assert_eq!(store.get_object(&ctx, &d, false).unwrap().name, "w.txt");
        assert_eq!(store.get_object(&ctx, &v1, false).unwrap().name, "w.txt");
    }

    #[test]
    fn move_updates_paths() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let b = folder(&store, &ctx, &root, "B");
        let sub = folder(&store, &ctx, &a, "sub");
        store.move_object(&ctx, &sub, &a, &b).unwrap();
        assert_eq!(store.get_path(&ctx, &sub).unwrap(), "/B/sub");
        assert!(store.get_children(&ctx, &a).unwrap().is_empty());
        assert_eq!(store.get_children(&ctx, &b).unwrap().len(), 1);
    }

    #[test]
    fn move_name_clash() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let b = folder(&store, &ctx, &root, "B");
        let d = plain_doc(&store, &ctx, &a, "x", None);
        plain_doc(&store, &ctx, &b, "x", None);
        assert_eq!(
            store.move_object(&ctx, &d, &a, &b).unwrap_err().kind(),
            ErrorKind::NameConstraintViolation
        );
        // Nothing moved.
        assert_eq!(store.get_object(&ctx, &d, false).unwrap().parent_ids, vec![a]);
    }

    #[test]
    fn move_argument_errors() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let sub = folder(&store, &ctx, &a, "sub");
        let missing = ObjectId::new("missing");
        assert_eq!(
            store.move_object(&ctx, &a, &root, &missing).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            store.move_object(&ctx, &root, &root, &a).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            store.move_object(&ctx, &sub, &root, &a).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            store.move_object(&ctx, &a, &root, &sub).unwrap_err().kind(),
            ErrorKind::Constraint
        );
    }

    #[test]
    fn multi_filing() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let b = folder(&store, &ctx, &root, "B");
        let d = plain_doc(&store, &ctx, &a, "x", None);
        store.add_object_to_folder(&ctx, &d, &b, true).unwrap();
        let parents = store.get_object_parents(&ctx, &d).unwrap();
        assert_eq!(parents.len(), 2);
        assert!(parents.iter().all(|p| p.relative_path_segment == "x"));
        assert_eq!(store.get_object_by_path(&ctx, "/B/x", false).unwrap().id, d);

        store.remove_object_from_folder(&ctx, &d, &a).unwrap();
        assert_eq!(store.get_object(&ctx, &d, false).unwrap().parent_ids, vec![b.clone()]);
        // Unfiling is enabled by default, so the last parent can go too.
        store.remove_object_from_folder(&ctx, &d, &b).unwrap();
        assert!(store.get_object(&ctx, &d, false).unwrap().parent_ids.is_empty());
    }

    #[test]
    fn multi_filing_constraints() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let b = folder(&store, &ctx, &root, "B");
        assert_eq!(
            store.add_object_to_folder(&ctx, &a, &b, true).unwrap_err().kind(),
            ErrorKind::Constraint
        );
        let d = plain_doc(&store, &ctx, &a, "x", None);
        assert_eq!(
            store.add_object_to_folder(&ctx, &d, &b, false).unwrap_err().kind(),
            ErrorKind::NotSupported
        );
        assert_eq!(
            store.add_object_to_folder(&ctx, &d, &a, true).unwrap_err().kind(),
            ErrorKind::Constraint
        );
        assert_eq!(
            store.remove_object_from_folder(&ctx, &d, &b).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn single_filing_store_rejects_multi_filing() {
        let (store, ctx) = setup_with(StoreConfig::single_filing());
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let b = folder(&store, &ctx, &root, "B");
        let d = plain_doc(&store, &ctx, &a, "x", None);
        assert_eq!(
            store.add_object_to_folder(&ctx, &d, &b, true).unwrap_err().kind(),
            ErrorKind::Constraint
        );
        assert_eq!(
            store.remove_object_from_folder(&ctx, &d, &a).unwrap_err().kind(),
            ErrorKind::Constraint
        );
        store.move_object(&ctx, &d, &a, &b).unwrap();
    }

    #[test]
    fn delete_tree_removes_everything() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let sub = folder(&store, &ctx, &a, "sub");
        plain_doc(&store, &ctx, &a, "x", None);
        versioned_doc(&store, &ctx, &sub, "y", VersioningState::Major);
        let before = store.len().unwrap();
        let failed = store.delete_tree(&ctx, &a, false).unwrap();
        assert!(failed.is_empty());
        assert_eq!(store.len().unwrap(), before - 5);
        assert!(store.get_children(&ctx, &root).unwrap().is_empty());
    }

    #[test]
    fn delete_tree_unfiles_multi_filed_documents() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let keep = folder(&store, &ctx, &root, "keep");
        let d = plain_doc(&store, &ctx, &a, "x", None);
        store.add_object_to_folder(&ctx, &d, &keep, true).unwrap();
        store.delete_tree(&ctx, &a, false).unwrap();
        let data = store.get_object(&ctx, &d, false).unwrap();
        assert_eq!(data.parent_ids, vec![keep]);
    }

    #[test]
    fn delete_tree_continue_on_failure() {
        let (store, alice) = setup();
        let bob = alice.with_principal(cmr_types::Principal::user("bob"));
        let root = store.root_folder_id();
        let a = folder(&store, &alice, &root, "A");
        let sub = folder(&store, &alice, &a, "sub");
        let locked = versioned_doc(&store, &alice, &sub, "locked", VersioningState::Major);
        let other = plain_doc(&store, &alice, &a, "other", None);
        let sibling = folder(&store, &alice, &a, "sibling");
        store.check_out(&alice, &locked).unwrap();

        let failed = store.delete_tree(&bob, &a, true).unwrap();
        assert_eq!(failed, vec![locked.clone()]);
        assert!(store.get_object(&bob, &locked, false).is_ok());
        assert!(store.get_object(&bob, &other, false).is_err());
        assert!(store.get_object(&bob, &sibling, false).is_err());
        // Ancestors of the failing object are retained.
        assert!(store.get_object(&bob, &sub, false).is_ok());
        assert!(store.get_object(&bob, &a, false).is_ok());
    }

    #[test]
    fn delete_tree_abort_leaves_everything() {
        let (store, alice) = setup();
        let bob = alice.with_principal(cmr_types::Principal::user("bob"));
        let root = store.root_folder_id();
        let a = folder(&store, &alice, &root, "A");
        let locked = versioned_doc(&store, &alice, &a, "locked", VersioningState::Major);
        let other = plain_doc(&store, &alice, &a, "other", None);
        store.check_out(&alice, &locked).unwrap();

        let err = store.delete_tree(&bob, &a, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpdateConflict);
        assert!(store.get_object(&bob, &other, false).is_ok());
        assert_eq!(store.get_children(&bob, &a).unwrap().len(), 2);
    }

    #[test]
    fn delete_tree_rejects_root_and_documents() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = plain_doc(&store, &ctx, &root, "x", None);
        assert_eq!(
            store.delete_tree(&ctx, &root, true).unwrap_err().kind(),
            ErrorKind::Constraint
        );
        assert_eq!(
            store.delete_tree(&ctx, &d, true).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn descendants_and_folder_tree() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        let b = folder(&store, &ctx, &a, "B");
        folder(&store, &ctx, &b, "C");
        plain_doc(&store, &ctx, &a, "x", None);

        let all = store.get_descendants(&ctx, &root, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].children.len(), 2);

        let shallow = store.get_descendants(&ctx, &root, Some(1)).unwrap();
        assert!(shallow[0].children.is_empty());

        let tree = store.get_folder_tree(&ctx, &root, Some(2)).unwrap();
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].object.name, "B");
        assert!(tree[0].children[0].children.is_empty());

        assert_eq!(
            store.get_descendants(&ctx, &root, Some(0)).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn folder_parent() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "A");
        assert_eq!(store.get_folder_parent(&ctx, &a).unwrap().id, root);
        assert_eq!(
            store.get_folder_parent(&ctx, &root).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            store.get_object_parents(&ctx, &root).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn case_insensitive_names() {
        use crate::names::NameComparison;
        let (store, ctx) =
            setup_with(StoreConfig::default().with_name_comparison(NameComparison::CaseInsensitive));
        let root = store.root_folder_id();
        let a = folder(&store, &ctx, &root, "Docs");
        assert_eq!(
            store
                .create_folder(&ctx, &root, "docs", &folder_type(), &Default::default())
                .unwrap_err()
                .kind(),
            ErrorKind::NameConstraintViolation
        );
        assert_eq!(store.get_object_by_path(&ctx, "/DOCS", false).unwrap().id, a);
    }
}
