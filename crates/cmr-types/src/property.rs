//! Typed property values and property bags.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Well-known CMIS property ids.
pub mod property_ids {
    pub const NAME: &str = "cmis:name";
    pub const DESCRIPTION: &str = "cmis:description";
    pub const OBJECT_ID: &str = "cmis:objectId";
    pub const OBJECT_TYPE_ID: &str = "cmis:objectTypeId";
    pub const BASE_TYPE_ID: &str = "cmis:baseTypeId";
    pub const CREATED_BY: &str = "cmis:createdBy";
    pub const CREATION_DATE: &str = "cmis:creationDate";
    pub const LAST_MODIFIED_BY: &str = "cmis:lastModifiedBy";
    pub const LAST_MODIFICATION_DATE: &str = "cmis:lastModificationDate";
    pub const CHANGE_TOKEN: &str = "cmis:changeToken";

    pub const PARENT_ID: &str = "cmis:parentId";
    pub const PATH: &str = "cmis:path";
    pub const ALLOWED_CHILD_OBJECT_TYPE_IDS: &str = "cmis:allowedChildObjectTypeIds";

    pub const IS_IMMUTABLE: &str = "cmis:isImmutable";
    pub const IS_LATEST_VERSION: &str = "cmis:isLatestVersion";
    pub const IS_MAJOR_VERSION: &str = "cmis:isMajorVersion";
    pub const IS_LATEST_MAJOR_VERSION: &str = "cmis:isLatestMajorVersion";
    pub const IS_PRIVATE_WORKING_COPY: &str = "cmis:isPrivateWorkingCopy";
    pub const VERSION_LABEL: &str = "cmis:versionLabel";
    pub const VERSION_SERIES_ID: &str = "cmis:versionSeriesId";
    pub const IS_VERSION_SERIES_CHECKED_OUT: &str = "cmis:isVersionSeriesCheckedOut";
    pub const VERSION_SERIES_CHECKED_OUT_BY: &str = "cmis:versionSeriesCheckedOutBy";
    pub const VERSION_SERIES_CHECKED_OUT_ID: &str = "cmis:versionSeriesCheckedOutId";
    pub const CHECKIN_COMMENT: &str = "cmis:checkinComment";
    pub const CONTENT_STREAM_LENGTH: &str = "cmis:contentStreamLength";
    pub const CONTENT_STREAM_MIME_TYPE: &str = "cmis:contentStreamMimeType";
    pub const CONTENT_STREAM_FILE_NAME: &str = "cmis:contentStreamFileName";
    pub const CONTENT_STREAM_ID: &str = "cmis:contentStreamId";

    pub const SOURCE_ID: &str = "cmis:sourceId";
    pub const TARGET_ID: &str = "cmis:targetId";

    pub const POLICY_TEXT: &str = "cmis:policyText";
}

/// Value type of a property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Boolean,
    Integer,
    Decimal,
    DateTime,
    Id,
    Uri,
    Html,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::DateTime => "datetime",
            Self::Id => "id",
            Self::Uri => "uri",
            Self::Html => "html",
        };
        f.write_str(s)
    }
}

impl FromStr for PropertyType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "decimal" => Ok(Self::Decimal),
            "datetime" => Ok(Self::DateTime),
            "id" => Ok(Self::Id),
            "uri" => Ok(Self::Uri),
            "html" => Ok(Self::Html),
            other => Err(TypeError::UnknownPropertyType(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    Multi,
}

/// When a property may be written by a client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Updatability {
    /// Maintained by the repository only.
    ReadOnly,
    #[default]
    ReadWrite,
    /// Writable only on a private working copy.
    WhenCheckedOut,
}

/// A single typed property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PropertyValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    DateTime(DateTime<Utc>),
    Id(String),
    Uri(String),
    Html(String),
}

impl PropertyValue {
    /// The property type this value belongs to.
    pub fn property_type(&self) -> PropertyType {
        match self {
            Self::String(_) => PropertyType::String,
            Self::Boolean(_) => PropertyType::Boolean,
            Self::Integer(_) => PropertyType::Integer,
            Self::Decimal(_) => PropertyType::Decimal,
            Self::DateTime(_) => PropertyType::DateTime,
            Self::Id(_) => PropertyType::Id,
            Self::Uri(_) => PropertyType::Uri,
            Self::Html(_) => PropertyType::Html,
        }
    }

    /// The textual payload of string-like values (string, id, uri, html).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Id(s) | Self::Uri(s) | Self::Html(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Parse `raw` as a value of the given type.
    pub fn parse(property_type: PropertyType, raw: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidValue {
            value: raw.to_string(),
            expected: property_type.to_string(),
        };
        Ok(match property_type {
            PropertyType::String => Self::String(raw.to_string()),
            PropertyType::Id => Self::Id(raw.to_string()),
            PropertyType::Uri => Self::Uri(raw.to_string()),
            PropertyType::Html => Self::Html(raw.to_string()),
            PropertyType::Boolean => Self::Boolean(raw.parse().map_err(|_| invalid())?),
            PropertyType::Integer => Self::Integer(raw.parse().map_err(|_| invalid())?),
            PropertyType::Decimal => Self::Decimal(raw.parse().map_err(|_| invalid())?),
            PropertyType::DateTime => Self::DateTime(
                DateTime::parse_from_rfc3339(raw)
                    .map_err(|_| invalid())?
                    .with_timezone(&Utc),
            ),
        })
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) | Self::Id(s) | Self::Uri(s) | Self::Html(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::DateTime(t) => write!(f, "{}", t.to_rfc3339()),
        }
    }
}

/// The values of one property. Single-valued properties hold at most one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyData {
    pub id: String,
    pub values: Vec<PropertyValue>,
}

impl PropertyData {
    /// A single-valued entry.
    pub fn single(id: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            id: id.into(),
            values: vec![value],
        }
    }

    /// A multi-valued entry.
    pub fn multi(id: impl Into<String>, values: Vec<PropertyValue>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    /// A property explicitly set to "no value".
    pub fn unset(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: Vec::new(),
        }
    }

    /// The first value, if any.
    pub fn first(&self) -> Option<&PropertyValue> {
        self.values.first()
    }

    /// Returns `true` if the entry has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A bag of properties keyed by property id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, PropertyData>,
}

impl Properties {
    /// An empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single value, replacing any previous entry.
    pub fn with_value(mut self, id: impl Into<String>, value: PropertyValue) -> Self {
        self.insert(PropertyData::single(id, value));
        self
    }

    /// Set a string value.
    pub fn with_string(self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_value(id, PropertyValue::String(value.into()))
    }

    /// Set an id value.
    pub fn with_id(self, id: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_value(id, PropertyValue::Id(value.into()))
    }

    /// Set a multi-valued entry.
    pub fn with_values(mut self, id: impl Into<String>, values: Vec<PropertyValue>) -> Self {
        self.insert(PropertyData::multi(id, values));
        self
    }

    /// Insert or replace a property.
    pub fn insert(&mut self, data: PropertyData) {
        self.entries.insert(data.id.clone(), data);
    }

    /// Set a single value in place.
    pub fn set(&mut self, id: impl Into<String>, value: PropertyValue) {
        self.insert(PropertyData::single(id, value));
    }

    /// The entry for `id`, if present.
    pub fn get(&self, id: &str) -> Option<&PropertyData> {
        self.entries.get(id)
    }

    /// Remove and return the entry for `id`.
    pub fn remove(&mut self, id: &str) -> Option<PropertyData> {
        self.entries.remove(id)
    }

    /// Returns `true` if an entry for `id` exists.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// First value of a string-like property.
    pub fn string(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(PropertyData::first).and_then(PropertyValue::as_str)
    }

    /// First value of `id` as a boolean.
    pub fn boolean(&self, id: &str) -> Option<bool> {
        self.get(id).and_then(PropertyData::first).and_then(PropertyValue::as_bool)
    }

    /// First value of `id` as an integer.
    pub fn integer(&self, id: &str) -> Option<i64> {
        self.get(id).and_then(PropertyData::first).and_then(PropertyValue::as_i64)
    }

    /// Overlay `other` onto `self`. Properties with no values are removed.
    pub fn overlay(&mut self, other: &Properties) {
        for data in other.iter() {
            if data.is_empty() {
                self.entries.remove(&data.id);
            } else {
                self.entries.insert(data.id.clone(), data.clone());
            }
        }
    }

    /// Iterate over entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = &PropertyData> {
        self.entries.values()
    }

    /// Iterate over property ids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the bag is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<PropertyData> for Properties {
    fn from_iter<I: IntoIterator<Item = PropertyData>>(iter: I) -> Self {
        let mut props = Properties::new();
        for data in iter {
            props.insert(data);
        }
        props
    }
}
