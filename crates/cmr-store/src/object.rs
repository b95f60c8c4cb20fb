//! The stored object model.
//!
//! Every stored entity shares one [`StoredObject`] header and carries a
//! kind-specific [`ObjectBody`]. A versionable document is represented by a
//! [`ObjectBody::VersionSeries`] entity (which is what folders list as a
//! child) plus one [`ObjectBody::Version`] entity per version.

use chrono::{DateTime, Utc};
use cmr_types::{BaseKind, ChangeToken, ObjectId, ObjectTypeId, Properties};

use crate::content::Content;

/// Kind-specific state of a stored object.
#[derive(Clone, Debug)]
pub enum ObjectBody {
    Folder,
    /// A non-versionable document.
    Document { content: Option<Content> },
    /// The identity shared by all versions of a versionable document.
    VersionSeries {
        /// Set while a private working copy exists.
        checked_out_by: Option<String>,
    },
    /// One version of a version series.
    Version {
        series_id: ObjectId,
        is_major: bool,
        /// `true` for the private working copy.
        is_pwc: bool,
        checkin_comment: Option<String>,
        content: Option<Content>,
    },
    Policy,
}

/// One entity in the object table.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub id: ObjectId,
    /// For versions this mirrors the series name.
    pub name: String,
    pub type_id: ObjectTypeId,
    pub created_by: String,
    pub creation_date: DateTime<Utc>,
    pub last_modified_by: String,
    pub last_modification_date: DateTime<Utc>,
    pub change_token: ChangeToken,
    /// Caller-settable properties. System properties are derived on read.
    pub properties: Properties,
    pub body: ObjectBody,
}

impl StoredObject {
    /// A fresh object created by `user`.
    pub fn new(
        id: ObjectId,
        name: impl Into<String>,
        type_id: ObjectTypeId,
        user: &str,
        change_token: ChangeToken,
        body: ObjectBody,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            type_id,
            created_by: user.to_string(),
            creation_date: now,
            last_modified_by: user.to_string(),
            last_modification_date: now,
            change_token,
            properties: Properties::new(),
            body,
        }
    }

    /// Attach the validated caller-supplied properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// The base kind implied by the body.
    pub fn base_kind(&self) -> BaseKind {
        match self.body {
            ObjectBody::Folder => BaseKind::Folder,
            ObjectBody::Policy => BaseKind::Policy,
            ObjectBody::Document { .. }
            | ObjectBody::VersionSeries { .. }
            | ObjectBody::Version { .. } => BaseKind::Document,
        }
    }

    /// Returns `true` for folders.
    pub fn is_folder(&self) -> bool {
        matches!(self.body, ObjectBody::Folder)
    }

    /// The series this object is a version of, if any.
    pub fn series_id(&self) -> Option<&ObjectId> {
        match &self.body {
            ObjectBody::Version { series_id, .. } => Some(series_id),
            _ => None,
        }
    }

    /// Returns `true` for a private working copy.
    pub fn is_pwc(&self) -> bool {
        matches!(self.body, ObjectBody::Version { is_pwc: true, .. })
    }

    /// The series owner of the check-out, if this is a checked-out series.
    pub fn checked_out_by(&self) -> Option<&str> {
        match &self.body {
            ObjectBody::VersionSeries { checked_out_by } => checked_out_by.as_deref(),
            _ => None,
        }
    }

    /// Content held directly by this object.
    pub fn content(&self) -> Option<&Content> {
        match &self.body {
            ObjectBody::Document { content } | ObjectBody::Version { content, .. } => {
                content.as_ref()
            }
            _ => None,
        }
    }

    /// Mutable content slot, for objects that can carry content.
    pub fn content_slot(&mut self) -> Option<&mut Option<Content>> {
        match &mut self.body {
            ObjectBody::Document { content } | ObjectBody::Version { content, .. } => {
                Some(content)
            }
            _ => None,
        }
    }

    /// Record a modification by `user` under a freshly issued token.
    pub fn touch(&mut self, user: &str, token: ChangeToken) {
        self.last_modified_by = user.to_string();
        self.last_modification_date = Utc::now();
        self.change_token = token;
    }
}
