//! Read-only snapshots of stored objects.
//!
//! Snapshots are what every read operation returns. They are assembled under
//! the store read lock and own all their data, so callers never observe a
//! half-applied mutation and never hold a lock.

use chrono::{DateTime, Utc};
use cmr_types::{
    property_ids as p, AllowableActions, BaseKind, ChangeToken, ObjectId, ObjectTypeId,
    Properties, PropertyValue,
};
use serde::{Deserialize, Serialize};

use crate::actions::{self, ActionSubject};
use crate::content::ContentInfo;
use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectBody, StoredObject};
use crate::state::StoreState;
use crate::versioning::version_labels;

/// Version-series facts of a document snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub series_id: ObjectId,
    /// The version this snapshot shows.
    pub version_id: ObjectId,
    pub label: String,
    pub is_major: bool,
    pub is_pwc: bool,
    pub is_latest: bool,
    pub is_latest_major: bool,
    pub checked_out_by: Option<String>,
    pub pwc_id: Option<ObjectId>,
    pub checkin_comment: Option<String>,
}

/// An immutable view of one object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectData {
    pub id: ObjectId,
    pub base_kind: BaseKind,
    pub type_id: ObjectTypeId,
    pub name: String,
    pub created_by: String,
    pub creation_date: DateTime<Utc>,
    pub last_modified_by: String,
    pub last_modification_date: DateTime<Utc>,
    pub change_token: ChangeToken,
    /// Stored properties merged with the derived system properties.
    pub properties: Properties,
    pub parent_ids: Vec<ObjectId>,
    /// Set for folders only.
    pub path: Option<String>,
    pub content: Option<ContentInfo>,
    pub version: Option<VersionInfo>,
    pub allowable_actions: Option<AllowableActions>,
}

/// A node in a descendants or folder-tree listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectInFolder {
    pub object: ObjectData,
    pub children: Vec<ObjectInFolder>,
}

/// One parent of a fileable object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectParent {
    pub parent: ObjectData,
    /// The object's name within that parent.
    pub relative_path_segment: String,
}

/// Build the snapshot of `id` as seen by `user`.
pub(crate) fn snapshot(
    state: &StoreState,
    id: &ObjectId,
    user: &str,
    include_actions: bool,
) -> StoreResult<ObjectData> {
    let obj = state.get(id)?;
    let mut data = match &obj.body {
        ObjectBody::Folder => folder(state, obj)?,
        ObjectBody::Document { content } => {
            let mut data = header(obj, state.parents_of(id).to_vec());
            data.content = content.as_ref().map(|c| c.info());
            data
        }
        ObjectBody::VersionSeries { .. } => {
            let current = state.current_version(id).ok_or_else(|| {
                StoreError::invalid(format!("version series {id} has no versions"))
            })?;
            let version = state.get(current)?;
            let mut data = header(obj, state.parents_of(id).to_vec());
            data.properties = version.properties.clone();
            data.last_modified_by = version.last_modified_by.clone();
            data.last_modification_date = version.last_modification_date;
            data.content = version.content().map(|c| c.info());
            data.version = Some(version_info(state, version)?);
            data
        }
        ObjectBody::Version {
            series_id, content, ..
        } => {
            let mut data = header(obj, state.parents_of(series_id).to_vec());
            data.content = content.as_ref().map(|c| c.info());
            data.version = Some(version_info(state, obj)?);
            data
        }
        ObjectBody::Policy => header(obj, Vec::new()),
    };
    add_system_properties(&mut data);
    if include_actions {
        data.allowable_actions = Some(actions::compute(&subject(state, obj), user));
    }
    Ok(data)
}

/// Describe `obj` for the allowable-actions computation.
pub(crate) fn subject<'a>(state: &'a StoreState, obj: &'a StoredObject) -> ActionSubject<'a> {
    match &obj.body {
        ObjectBody::Folder => ActionSubject::folder(state.is_root(&obj.id)),
        ObjectBody::Document { content } => ActionSubject::document(content.is_some()),
        ObjectBody::Policy => ActionSubject::policy(),
        ObjectBody::VersionSeries { checked_out_by } => {
            let has_content = state
                .current_version(&obj.id)
                .and_then(|v| state.objects.get(v))
                .is_some_and(|v| v.content().is_some());
            ActionSubject::versioned(has_content, checked_out_by.as_deref())
        }
        ObjectBody::Version {
            series_id,
            content,
            is_pwc,
            ..
        } => {
            let owner = state.objects.get(series_id).and_then(StoredObject::checked_out_by);
            if *is_pwc {
                ActionSubject::versioned(content.is_some(), owner)
            } else {
                ActionSubject::checked_in_version(content.is_some(), owner)
            }
        }
    }
}

fn header(obj: &StoredObject, parent_ids: Vec<ObjectId>) -> ObjectData {
    ObjectData {
        id: obj.id.clone(),
        base_kind: obj.base_kind(),
        type_id: obj.type_id.clone(),
        name: obj.name.clone(),
        created_by: obj.created_by.clone(),
        creation_date: obj.creation_date,
        last_modified_by: obj.last_modified_by.clone(),
        last_modification_date: obj.last_modification_date,
        change_token: obj.change_token,
        properties: obj.properties.clone(),
        parent_ids,
        path: None,
        content: None,
        version: None,
        allowable_actions: None,
    }
}

fn folder(state: &StoreState, obj: &StoredObject) -> StoreResult<ObjectData> {
    let mut data = header(obj, state.parents_of(&obj.id).to_vec());
    data.path = Some(state.path_of(&obj.id)?);
    Ok(data)
}

fn version_info(state: &StoreState, version: &StoredObject) -> StoreResult<VersionInfo> {
    let ObjectBody::Version {
        series_id,
        is_major,
        is_pwc,
        checkin_comment,
        ..
    } = &version.body
    else {
        return Err(StoreError::invalid(format!("{} is not a version", version.id)));
    };
    let versions = state.versions_of(series_id);
    let majors = versions.iter().map(|v| {
        matches!(
            state.objects.get(v).map(|o| &o.body),
            Some(ObjectBody::Version { is_major: true, .. })
        )
    });
    let labels = version_labels(majors);
    let label = versions
        .iter()
        .position(|v| v == &version.id)
        .and_then(|i| labels.get(i))
        .map(ToString::to_string)
        .unwrap_or_default();
    let series = state.get(series_id)?;
    Ok(VersionInfo {
        series_id: series_id.clone(),
        version_id: version.id.clone(),
        label,
        is_major: *is_major,
        is_pwc: *is_pwc,
        is_latest: state.latest_version(series_id, false) == Some(&version.id),
        is_latest_major: state.latest_version(series_id, true) == Some(&version.id),
        checked_out_by: series.checked_out_by().map(str::to_string),
        pwc_id: state.pwc_of(series_id).cloned(),
        checkin_comment: checkin_comment.clone(),
    })
}

fn id_value(id: &ObjectId) -> PropertyValue {
    PropertyValue::Id(id.to_string())
}

fn string_value(s: impl Into<String>) -> PropertyValue {
    PropertyValue::String(s.into())
}

fn add_system_properties(data: &mut ObjectData) {
    let props = &mut data.properties;
    props.set(p::NAME, string_value(data.name.clone()));
    props.set(p::OBJECT_ID, id_value(&data.id));
    props.set(p::OBJECT_TYPE_ID, PropertyValue::Id(data.type_id.to_string()));
    props.set(
        p::BASE_TYPE_ID,
        PropertyValue::Id(data.base_kind.base_type_str().to_string()),
    );
    props.set(p::CREATED_BY, string_value(data.created_by.clone()));
    props.set(p::CREATION_DATE, PropertyValue::DateTime(data.creation_date));
    props.set(p::LAST_MODIFIED_BY, string_value(data.last_modified_by.clone()));
    props.set(
        p::LAST_MODIFICATION_DATE,
        PropertyValue::DateTime(data.last_modification_date),
    );
    props.set(p::CHANGE_TOKEN, string_value(data.change_token.to_string()));

    match data.base_kind {
        BaseKind::Folder => {
            if let Some(path) = &data.path {
                props.set(p::PATH, string_value(path.clone()));
            }
            if let Some(parent) = data.parent_ids.first() {
                props.set(p::PARENT_ID, id_value(parent));
            }
        }
        BaseKind::Document => {
            if let Some(content) = &data.content {
                props.set(
                    p::CONTENT_STREAM_LENGTH,
                    PropertyValue::Integer(content.length as i64),
                );
                props.set(
                    p::CONTENT_STREAM_MIME_TYPE,
                    string_value(content.mime_type.clone()),
                );
                if let Some(file_name) = &content.file_name {
                    props.set(p::CONTENT_STREAM_FILE_NAME, string_value(file_name.clone()));
                }
            }
            props.set(p::IS_IMMUTABLE, PropertyValue::Boolean(false));
            match &data.version {
                Some(v) => {
                    props.set(p::VERSION_SERIES_ID, id_value(&v.series_id));
                    props.set(p::VERSION_LABEL, string_value(v.label.clone()));
                    props.set(p::IS_MAJOR_VERSION, PropertyValue::Boolean(v.is_major));
                    props.set(p::IS_LATEST_VERSION, PropertyValue::Boolean(v.is_latest));
                    props.set(
                        p::IS_LATEST_MAJOR_VERSION,
                        PropertyValue::Boolean(v.is_latest_major),
                    );
                    props.set(p::IS_PRIVATE_WORKING_COPY, PropertyValue::Boolean(v.is_pwc));
                    props.set(
                        p::IS_VERSION_SERIES_CHECKED_OUT,
                        PropertyValue::Boolean(v.checked_out_by.is_some()),
                    );
                    if let Some(owner) = &v.checked_out_by {
                        props.set(p::VERSION_SERIES_CHECKED_OUT_BY, string_value(owner.clone()));
                    }
                    if let Some(pwc) = &v.pwc_id {
                        props.set(p::VERSION_SERIES_CHECKED_OUT_ID, id_value(pwc));
                    }
                    if let Some(comment) = &v.checkin_comment {
                        props.set(p::CHECKIN_COMMENT, string_value(comment.clone()));
                    }
                }
                None => {
                    props.set(p::VERSION_SERIES_ID, id_value(&data.id));
                    props.set(p::IS_MAJOR_VERSION, PropertyValue::Boolean(true));
                    props.set(p::IS_LATEST_VERSION, PropertyValue::Boolean(true));
                    props.set(p::IS_LATEST_MAJOR_VERSION, PropertyValue::Boolean(true));
                    props.set(p::IS_PRIVATE_WORKING_COPY, PropertyValue::Boolean(false));
                    props.set(p::IS_VERSION_SERIES_CHECKED_OUT, PropertyValue::Boolean(false));
                }
            }
        }
        BaseKind::Policy | BaseKind::Relationship => {}
    }
}
