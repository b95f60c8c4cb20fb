//! Content streams.
//!
//! Bytes are held in a [`Bytes`] buffer, so cloning a document version or
//! serving a range window never copies the payload.

use std::io::Read;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// MIME type assumed when a caller supplies none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A document's binary payload plus its descriptive metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub data: Bytes,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl Content {
    /// Content holding `data` with the given MIME type.
    pub fn new(data: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        Self {
            data: data.into(),
            mime_type: if mime_type.is_empty() {
                DEFAULT_MIME_TYPE.to_string()
            } else {
                mime_type
            },
            file_name: None,
        }
    }

    /// Attach a file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Drain a reader into a new content stream.
    pub fn from_reader<R: Read>(mut reader: R, mime_type: impl Into<String>) -> std::io::Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Self::new(buf, mime_type))
    }

    /// Length of the stream in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns `true` if the stream has no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// A window of `length` bytes starting at `offset`.
    ///
    /// `length = None` reads to the end; a length running past the end is
    /// clamped. An offset past the end is rejected.
    pub fn window(&self, offset: u64, length: Option<u64>) -> StoreResult<Content> {
        let total = self.len();
        if offset > total {
            return Err(StoreError::invalid(format!(
                "offset {offset} beyond content length {total}"
            )));
        }
        let end = match length {
            Some(len) => offset.saturating_add(len).min(total),
            None => total,
        };
        Ok(Content {
            data: self.data.slice(offset as usize..end as usize),
            mime_type: self.mime_type.clone(),
            file_name: self.file_name.clone(),
        })
    }

    /// Descriptive metadata without the payload.
    pub fn info(&self) -> ContentInfo {
        ContentInfo {
            length: self.len(),
            mime_type: self.mime_type.clone(),
            file_name: self.file_name.clone(),
        }
    }
}

/// Content metadata as reported in object snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentInfo {
    pub length: u64,
    pub mime_type: String,
    pub file_name: Option<String>,
}
