use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_core::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::{classify, BlobResult};

/// Stream of bytes for blob content
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Lazy listing of a store; each entry succeeds or fails on its own
pub type EntryStream = Pin<Box<dyn Stream<Item = BlobResult<StoredFile>> + Send>>;

/// Metadata for one stored file, derived from stat + name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub modified_at: DateTime<Utc>,
    pub previewable: bool,
}

impl StoredFile {
    /// Build from filesystem metadata; classification comes from `name`
    pub fn from_metadata(name: String, meta: &std::fs::Metadata) -> std::io::Result<Self> {
        let modified_at = DateTime::<Utc>::from(meta.modified()?);
        let class = classify(&name);

        Ok(Self {
            name,
            size_bytes: meta.len(),
            mime_type: class.mime_type,
            modified_at,
            previewable: class.previewable,
        })
    }
}

/// Inclusive `[start, end]` window into a file of `total` bytes.
///
/// Always satisfies `start <= end < total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
    pub total: u64,
}

impl ByteRange {
    /// Returns `None` unless `start <= end < total`
    pub fn new(start: u64, end: u64, total: u64) -> Option<Self> {
        (start <= end && end < total).then_some(Self { start, end, total })
    }

    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value, e.g. `bytes 0-0/10`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Request to store a blob
#[derive(Debug, Clone)]
pub struct BlobPut {
    /// Name as supplied by the client, before sanitizing
    pub filename: String,
    /// Client-declared content type, if any
    pub content_type: Option<String>,
}

impl BlobPut {
    pub fn new<S: Into<String>>(filename: S) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
        }
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
