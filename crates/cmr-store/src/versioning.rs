//! Check-out / check-in state machine over version series.
//!
//! A series is either checked in or checked out. Checking out appends a
//! private working copy (PWC) as the last version; checking in turns that
//! PWC into a regular version, and cancelling discards it.
//!
//! Version labels are never stored. They are recomputed from the ordered
//! version list on every read, so removing a version keeps every label
//! consistent.

use std::fmt;

use cmr_types::{property_ids, CallContext, ObjectId, Properties};
use cmr_typesys::ContentStreamAllowed;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::content::Content;
use crate::error::{StoreError, StoreResult};
use crate::filing::rename_in;
use crate::memory::InMemoryObjectStore;
use crate::object::{ObjectBody, StoredObject};
use crate::snapshot::{snapshot, ObjectData};
use crate::state::StoreState;
use crate::traits::Versioning;
use crate::validation::{validate_properties, Purpose};

/// A `(major, minor)` version label, displayed as `V {major}.{minor}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VersionLabel {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V {}.{}", self.major, self.minor)
    }
}

/// Labels for a series given each version's major flag, oldest first.
///
/// A major version increments the major counter and resets the minor
/// counter; any other version increments the minor counter.
///
/// # Examples
///
/// ```
/// use cmr_store::versioning::version_labels;
///
/// let labels: Vec<String> = version_labels([true, false, false, true])
///     .iter()
///     .map(ToString::to_string)
///     .collect();
/// assert_eq!(labels, ["V 1.0", "V 1.1", "V 1.2", "V 2.0"]);
/// ```
pub fn version_labels(majors: impl IntoIterator<Item = bool>) -> Vec<VersionLabel> {
    let mut major = 0;
    let mut minor = 0;
    majors
        .into_iter()
        .map(|is_major| {
            if is_major {
                major += 1;
                minor = 0;
            } else {
                minor += 1;
            }
            VersionLabel { major, minor }
        })
        .collect()
}

/// The series `id` belongs to, or `id` itself if it is a series.
fn resolve_series(state: &StoreState, id: &ObjectId) -> StoreResult<ObjectId> {
    let obj = state.get(id)?;
    match &obj.body {
        ObjectBody::VersionSeries { .. } => Ok(id.clone()),
        ObjectBody::Version { series_id, .. } => Ok(series_id.clone()),
        _ => Err(StoreError::constraint(format!(
            "{id} is not a versionable document"
        ))),
    }
}

/// Fail unless `series` is checked out by `user`; returns the PWC id.
fn owned_pwc(state: &StoreState, series: &ObjectId, user: &str) -> StoreResult<ObjectId> {
    match state.get(series)?.checked_out_by() {
        None => Err(StoreError::NotCheckedOut(series.clone())),
        Some(owner) if owner != user => Err(StoreError::PermissionDenied {
            id: series.clone(),
            user: user.to_string(),
            owner: owner.to_string(),
        }),
        Some(_) => state
            .pwc_of(series)
            .cloned()
            .ok_or_else(|| StoreError::NotCheckedOut(series.clone())),
    }
}

fn set_checked_out_by(state: &mut StoreState, series: &ObjectId, owner: Option<&str>) -> StoreResult<()> {
    if let ObjectBody::VersionSeries { checked_out_by } = &mut state.get_mut(series)?.body {
        *checked_out_by = owner.map(str::to_string);
    }
    Ok(())
}

impl Versioning for InMemoryObjectStore {
    fn check_out(&self, ctx: &CallContext, id: &ObjectId) -> StoreResult<ObjectId> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        let series_id = resolve_series(&state, id)?;
        if state.get(&series_id)?.checked_out_by().is_some() {
            return Err(StoreError::AlreadyCheckedOut(series_id));
        }
        let latest_id = state
            .latest_version(&series_id, false)
            .cloned()
            .ok_or_else(|| StoreError::constraint(format!("{series_id} has no versions")))?;
        let latest = state.get(&latest_id)?;
        let name = latest.name.clone();
        let type_id = latest.type_id.clone();
        let properties = latest.properties.clone();
        let content = latest.content().cloned();

        let pwc_id = ObjectId::generate();
        let token = state.next_token();
        let pwc = StoredObject::new(
            pwc_id.clone(),
            name,
            type_id,
            user,
            token,
            ObjectBody::Version {
                series_id: series_id.clone(),
                is_major: false,
                is_pwc: true,
                checkin_comment: None,
                content,
            },
        )
        .with_properties(properties);

        state.objects.insert(pwc_id.clone(), pwc);
        state
            .versions
            .entry(series_id.clone())
            .or_default()
            .push(pwc_id.clone());
        set_checked_out_by(&mut state, &series_id, Some(user))?;
        state.touch(&series_id, user)?;
        debug!(series = %series_id, pwc = %pwc_id, user, "checked out");
        Ok(pwc_id)
    }

    fn cancel_check_out(&self, ctx: &CallContext, id: &ObjectId) -> StoreResult<()> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        let series_id = resolve_series(&state, id)?;
        let pwc_id = owned_pwc(&state, &series_id, user)?;

        state.objects.remove(&pwc_id);
        if let Some(versions) = state.versions.get_mut(&series_id) {
            versions.retain(|v| v != &pwc_id);
        }
        if state.versions_of(&series_id).is_empty() {
            // The series was created checked out; nothing remains of it.
            state.remove_object(&series_id);
            debug!(series = %series_id, "cancelled check-out, series removed");
            return Ok(());
        }
        set_checked_out_by(&mut state, &series_id, None)?;
        state.touch(&series_id, user)?;
        debug!(series = %series_id, user, "cancelled check-out");
        Ok(())
    }

    fn check_in(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        major: bool,
        properties: &Properties,
        content: Option<Content>,
        comment: Option<&str>,
    ) -> StoreResult<ObjectId> {
        let user = ctx.username();
        let mut state = self.write_state()?;
        let series_id = resolve_series(&state, id)?;
        let pwc_id = owned_pwc(&state, &series_id, user)?;

        // Validate everything up front so the check-in applies atomically.
        let pwc = state.get(&pwc_id)?;
        let def = self.type_definition(&pwc.type_id)?;
        let accepted = validate_properties(&def, properties, Purpose::Update { checked_out: true })?;
        let has_content = content.is_some() || pwc.content().is_some();
        match def.content_stream_allowed {
            ContentStreamAllowed::NotAllowed if content.is_some() => {
                return Err(StoreError::constraint(format!(
                    "documents of type {} cannot have content",
                    def.id
                )));
            }
            ContentStreamAllowed::Required if !has_content => {
                return Err(StoreError::constraint(format!(
                    "documents of type {} require content",
                    def.id
                )));
            }
            _ => {}
        }
        let new_name = match properties.get(property_ids::NAME) {
            Some(data) => Some(
                data.first()
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| StoreError::invalid("cmis:name cannot be cleared"))?
                    .to_string(),
            ),
            None => None,
        };
        if let Some(name) = &new_name {
            rename_in(&mut state, &series_id, name)?;
        }

        let pwc = state.get_mut(&pwc_id)?;
        pwc.properties.overlay(&accepted);
        if let ObjectBody::Version {
            is_major,
            is_pwc,
            checkin_comment,
            content: slot,
            ..
        } = &mut pwc.body
        {
            *is_major = major;
            *is_pwc = false;
            *checkin_comment = comment.map(str::to_string);
            if let Some(content) = content {
                *slot = Some(content);
            }
        }
        set_checked_out_by(&mut state, &series_id, None)?;
        state.touch(&pwc_id, user)?;
        debug!(series = %series_id, version = %pwc_id, major, user, "checked in");
        Ok(pwc_id)
    }

    fn get_all_versions(&self, ctx: &CallContext, id: &ObjectId) -> StoreResult<Vec<ObjectData>> {
        let state = self.read_state()?;
        let series_id = resolve_series(&state, id)?;
        state
            .versions_of(&series_id)
            .iter()
            .map(|v| snapshot(&state, v, ctx.username(), false))
            .collect()
    }

    fn get_latest_version(
        &self,
        ctx: &CallContext,
        id: &ObjectId,
        major_only: bool,
    ) -> StoreResult<ObjectData> {
        let state = self.read_state()?;
        let series_id = resolve_series(&state, id)?;
        let latest = if major_only {
            state.latest_version(&series_id, true)
        } else {
            state.versions_of(&series_id).last()
        };
        let latest = latest.ok_or_else(|| StoreError::NotFound(series_id.clone()))?;
        snapshot(&state, latest, ctx.username(), false)
    }

    fn get_checked_out_documents(&self, ctx: &CallContext) -> StoreResult<Vec<ObjectData>> {
        let state = self.read_state()?;
        let mut out = state
            .objects
            .values()
            .filter(|obj| obj.checked_out_by().is_some())
            .filter_map(|series| state.pwc_of(&series.id))
            .map(|pwc| snapshot(&state, pwc, ctx.username(), false))
            .collect::<StoreResult<Vec<_>>>()?;
        out.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::test_support::*;
    use crate::traits::{Filing, ObjectStore};
    use cmr_types::{Action, ErrorKind, Principal, PropertyValue, VersioningState};
    use proptest::prelude::*;

    fn labels_of(store: &InMemoryObjectStore, ctx: &CallContext, id: &ObjectId) -> Vec<String> {
        store
            .get_all_versions(ctx, id)
            .unwrap()
            .into_iter()
            .map(|v| v.version.unwrap().label)
            .collect()
    }

    #[test]
    fn checkout_checkin_cycle() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let f1 = folder(&store, &ctx, &root, "A");
        let d1 = store
            .create_document(
                &ctx,
                Some(&f1),
                "doc.txt",
                &versioned_type(),
                &Properties::new(),
                Some(text("hello")),
                VersioningState::Major,
            )
            .unwrap();
        let v1 = store.get_all_versions(&ctx, &d1).unwrap()[0].id.clone();
        assert_eq!(labels_of(&store, &ctx, &d1), ["V 1.0"]);

        let v2 = store.check_out(&ctx, &d1).unwrap();
        let pwc = store.get_object(&ctx, &v2, false).unwrap();
        let info = pwc.version.unwrap();
        assert!(info.is_pwc);
        assert_eq!(info.checked_out_by.as_deref(), Some("alice"));
        assert_eq!(pwc.content.unwrap().length, 5);

        let checked_in = store
            .check_in(&ctx, &d1, false, &Properties::new(), None, Some("edit"))
            .unwrap();
        assert_eq!(checked_in, v2);

        let versions = store.get_all_versions(&ctx, &d1).unwrap();
        let ids: Vec<_> = versions.iter().map(|v| v.id.clone()).collect();
        assert_eq!(ids, vec![v1, v2.clone()]);
        let v2_info = versions[1].version.clone().unwrap();
        assert!(!v2_info.is_pwc);
        assert!(!v2_info.is_major);
        assert_eq!(v2_info.label, "V 1.1");
        assert_eq!(v2_info.checkin_comment.as_deref(), Some("edit"));
        assert!(v2_info.checked_out_by.is_none());
        assert_eq!(
            versions[1].properties.string(property_ids::CHECKIN_COMMENT),
            Some("edit")
        );
    }

    #[test]
    fn checkout_twice_conflicts() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        store.check_out(&ctx, &d).unwrap();
        let err = store.check_out(&ctx, &d).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpdateConflict);
    }

    #[test]
    fn checkin_by_other_user_denied() {
        let (store, alice) = setup();
        let bob = alice.with_principal(Principal::user("bob"));
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &alice, &root, "d", VersioningState::Major);
        store.check_out(&alice, &d).unwrap();

        let err = store
            .check_in(&bob, &d, true, &Properties::new(), None, None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        let err = store.cancel_check_out(&bob, &d).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        // The series is still checked out by alice.
        let data = store.get_object(&bob, &d, true).unwrap();
        assert_eq!(
            data.version.unwrap().checked_out_by.as_deref(),
            Some("alice")
        );
        let actions = data.allowable_actions.unwrap();
        assert!(!actions.contains(Action::CheckIn));
        assert!(!actions.contains(Action::CheckOut));
    }

    #[test]
    fn checkin_when_not_checked_out() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        assert_eq!(
            store
                .check_in(&ctx, &d, true, &Properties::new(), None, None)
                .unwrap_err()
                .kind(),
            ErrorKind::Constraint
        );
        assert_eq!(
            store.cancel_check_out(&ctx, &d).unwrap_err().kind(),
            ErrorKind::Constraint
        );
    }

    #[test]
    fn checkout_of_plain_document_fails() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = plain_doc(&store, &ctx, &root, "p", None);
        assert_eq!(
            store.check_out(&ctx, &d).unwrap_err().kind(),
            ErrorKind::Constraint
        );
    }

    #[test]
    fn cancel_discards_pwc() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        let pwc = store.check_out(&ctx, &d).unwrap();
        store.cancel_check_out(&ctx, &pwc).unwrap();
        assert!(store.get_object(&ctx, &pwc, false).is_err());
        assert_eq!(store.get_all_versions(&ctx, &d).unwrap().len(), 1);
        assert!(store.get_checked_out_documents(&ctx).unwrap().is_empty());
    }

    #[test]
    fn cancel_of_series_created_checked_out_deletes_it() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::CheckedOut);
        let versions = store.get_all_versions(&ctx, &d).unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions[0].version.as_ref().unwrap().is_pwc);
        store.cancel_check_out(&ctx, &d).unwrap();
        assert_eq!(
            store.get_object(&ctx, &d, false).unwrap_err().kind(),
            ErrorKind::ObjectNotFound
        );
        assert!(store.get_children(&ctx, &root).unwrap().is_empty());
    }

    #[test]
    fn checkin_applies_properties_content_and_name() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        store.check_out(&ctx, &d).unwrap();
        let props = Properties::new()
            .with_string(property_ids::NAME, "renamed")
            .with_string(property_ids::DESCRIPTION, "v2");
        let v2 = store
            .check_in(&ctx, &d, true, &props, Some(text("second")), None)
            .unwrap();
        let data = store.get_object(&ctx, &d, false).unwrap();
        assert_eq!(data.name, "renamed");
        assert_eq!(data.version.as_ref().unwrap().version_id, v2);
        assert_eq!(data.version.unwrap().label, "V 2.0");
        assert_eq!(data.properties.string(property_ids::DESCRIPTION), Some("v2"));
        let c = store.get_content_stream(&ctx, &d, 0, None).unwrap();
        assert_eq!(&c.data[..], b"second");
    }

    #[test]
    fn failed_checkin_changes_nothing() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        store.check_out(&ctx, &d).unwrap();
        let bad = Properties::new()
            .with_string(property_ids::DESCRIPTION, "x")
            .with_value("test:nope", PropertyValue::Boolean(true));
        assert_eq!(
            store
                .check_in(&ctx, &d, true, &bad, None, None)
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidArgument
        );
        let pwc = store.get_checked_out_documents(&ctx).unwrap();
        assert_eq!(pwc.len(), 1);
        assert!(pwc[0].properties.string(property_ids::DESCRIPTION).is_none());
    }

    #[test]
    fn latest_versions() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        let v1 = store.get_latest_version(&ctx, &d, true).unwrap().id;
        store.check_out(&ctx, &d).unwrap();
        let v2 = store
            .check_in(&ctx, &d, false, &Properties::new(), None, None)
            .unwrap();
        assert_eq!(store.get_latest_version(&ctx, &d, false).unwrap().id, v2);
        assert_eq!(store.get_latest_version(&ctx, &d, true).unwrap().id, v1);

        // While checked out the working copy is the last version overall.
        let pwc = store.check_out(&ctx, &d).unwrap();
        let all = store.get_all_versions(&ctx, &d).unwrap();
        assert_eq!(all.last().unwrap().id, pwc);
        assert_eq!(store.get_latest_version(&ctx, &d, false).unwrap().id, pwc);
        assert_eq!(store.get_latest_version(&ctx, &d, true).unwrap().id, v1);
    }

    #[test]
    fn minor_only_series_has_no_latest_major() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Minor);
        assert_eq!(labels_of(&store, &ctx, &d), ["V 0.1"]);
        assert_eq!(
            store.get_latest_version(&ctx, &d, true).unwrap_err().kind(),
            ErrorKind::ObjectNotFound
        );
    }

    #[test]
    fn content_actions_match_what_the_store_allows() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        let v1 = store.get_all_versions(&ctx, &d).unwrap()[0].id.clone();
        let pwc = store.check_out(&ctx, &d).unwrap();

        let on_v1 = store.get_allowable_actions(&ctx, &v1).unwrap();
        assert!(on_v1.contains(Action::CheckIn));
        assert!(!on_v1.contains(Action::SetContentStream));
        assert!(!on_v1.contains(Action::DeleteContentStream));
        assert_eq!(
            store
                .set_content_stream(&ctx, &v1, text("x"), true, None)
                .unwrap_err()
                .kind(),
            ErrorKind::Constraint
        );

        let on_pwc = store.get_allowable_actions(&ctx, &pwc).unwrap();
        assert!(on_pwc.contains(Action::SetContentStream));
        assert!(on_pwc.contains(Action::DeleteContentStream));
        store
            .set_content_stream(&ctx, &pwc, text("x"), true, None)
            .unwrap();
    }

    #[test]
    fn content_changes_only_on_owned_pwc() {
        let (store, alice) = setup();
        let bob = alice.with_principal(Principal::user("bob"));
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &alice, &root, "d", VersioningState::Major);
        let v1 = store.get_all_versions(&alice, &d).unwrap()[0].id.clone();
        assert_eq!(
            store
                .set_content_stream(&alice, &d, text("x"), true, None)
                .unwrap_err()
                .kind(),
            ErrorKind::Constraint
        );
        let pwc = store.check_out(&alice, &d).unwrap();
        assert_eq!(
            store
                .set_content_stream(&bob, &d, text("x"), true, None)
                .unwrap_err()
                .kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            store
                .set_content_stream(&alice, &v1, text("x"), true, None)
                .unwrap_err()
                .kind(),
            ErrorKind::Constraint
        );
        store
            .set_content_stream(&alice, &pwc, text("new"), true, None)
            .unwrap();
        let c = store.get_content_stream(&alice, &pwc, 0, None).unwrap();
        assert_eq!(&c.data[..], b"new");
        // The checked-in version is untouched.
        let c = store.get_content_stream(&alice, &v1, 0, None).unwrap();
        assert_eq!(&c.data[..], b"content");
    }

    #[test]
    fn deleting_versions() {
        let (store, alice) = setup();
        let bob = alice.with_principal(Principal::user("bob"));
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &alice, &root, "d", VersioningState::Major);
        store.check_out(&alice, &d).unwrap();
        let v2 = store
            .check_in(&alice, &d, false, &Properties::new(), None, None)
            .unwrap();

        // Deleting one version relabels the rest.
        let v1 = store.get_all_versions(&alice, &d).unwrap()[0].id.clone();
        store.delete_object(&alice, &v1, false).unwrap();
        assert_eq!(labels_of(&store, &alice, &d), ["V 0.1"]);

        // A series checked out by someone else cannot be deleted.
        store.check_out(&alice, &d).unwrap();
        assert_eq!(
            store.delete_object(&bob, &d, true).unwrap_err().kind(),
            ErrorKind::UpdateConflict
        );

        // Deleting the PWC acts as a cancel.
        let pwc = store.get_checked_out_documents(&alice).unwrap()[0].id.clone();
        store.delete_object(&alice, &pwc, false).unwrap();
        assert!(store.get_checked_out_documents(&alice).unwrap().is_empty());

        // Deleting the last version removes the series.
        store.delete_object(&alice, &v2, false).unwrap();
        assert!(store.get_object(&alice, &d, false).is_err());
    }

    #[test]
    fn delete_series_with_all_versions() {
        let (store, ctx) = setup();
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
        store.check_out(&ctx, &d).unwrap();
        let before = store.len().unwrap();
        store.delete_object(&ctx, &d, true).unwrap();
        assert_eq!(store.len().unwrap(), before - 3);
        assert!(store.get_children(&ctx, &root).unwrap().is_empty());
    }

    #[test]
    fn concurrent_checkouts_only_one_wins() {
        let (store, ctx) = setup();
        let store = Arc::new(store);
        let root = store.root_folder_id();
        let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                let ctx = ctx.with_principal(Principal::user(format!("user{i}")));
                let d = d.clone();
                thread::spawn(move || store.check_out(&ctx, &d))
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.kind(), ErrorKind::UpdateConflict);
        }
        let versions = store.get_all_versions(&ctx, &d).unwrap();
        assert_eq!(versions.iter().filter(|v| v.version.as_ref().unwrap().is_pwc).count(), 1);
    }

    #[test]
    fn labels_reset_minor_on_major() {
        let labels = version_labels([false, false, true, false, true]);
        let rendered: Vec<_> = labels.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["V 0.1", "V 0.2", "V 1.0", "V 1.1", "V 2.0"]);
    }

    proptest! {
        #[test]
        fn labels_strictly_increase(majors in proptest::collection::vec(any::<bool>(), 1..40)) {
            let labels = version_labels(majors);
            for pair in labels.windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
        }

        #[test]
        fn checkins_advance_the_label(majors in proptest::collection::vec(any::<bool>(), 1..12)) {
            let (store, ctx) = setup();
            let root = store.root_folder_id();
            let d = versioned_doc(&store, &ctx, &root, "d", VersioningState::Major);
            for major in majors {
                let before = store.get_latest_version(&ctx, &d, false).unwrap();
                store.check_out(&ctx, &d).unwrap();
                store.check_in(&ctx, &d, major, &Properties::new(), None, None).unwrap();
                let after = store.get_latest_version(&ctx, &d, false).unwrap();
                let parse = |data: &ObjectData| -> (u32, u32) {
                    let label = data.version.as_ref().unwrap().label.trim_start_matches("V ").to_string();
                    let (a, b) = label.split_once('.').unwrap();
                    (a.parse().unwrap(), b.parse().unwrap())
                };
                prop_assert!(parse(&after) > parse(&before));
                // At most one PWC, and only while checked out.
                let pwcs = store
                    .get_all_versions(&ctx, &d)
                    .unwrap()
                    .iter()
                    .filter(|v| v.version.as_ref().unwrap().is_pwc)
                    .count();
                prop_assert_eq!(pwcs, 0);
            }
        }
    }
}
