use serde::{Deserialize, Serialize};

use crate::{ByteRange, ScopedReadHandle, StoredFile};

/// Receipt returned after successfully storing a blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobReceipt {
    /// Metadata of the stored (sanitized) entry
    pub file: StoredFile,
    /// Name as the client sent it
    pub original_name: String,
    /// Client-declared type, or the classified one when none was sent
    pub content_type: String,
}

/// Result of opening a blob for reading
#[derive(Debug)]
pub struct OpenedBlob {
    pub file: StoredFile,
    pub body: ScopedReadHandle,
    /// Window being served, `None` for the full body
    pub range: Option<ByteRange>,
}

impl OpenedBlob {
    pub fn full(file: StoredFile, body: ScopedReadHandle) -> Self {
        Self {
            file,
            body,
            range: None,
        }
    }

    pub fn partial(file: StoredFile, body: ScopedReadHandle, range: ByteRange) -> Self {
        Self {
            file,
            body,
            range: Some(range),
        }
    }

    /// Check if this is a partial content response
    pub fn is_partial(&self) -> bool {
        self.range.is_some()
    }

    /// Bytes the body will yield
    pub fn content_length(&self) -> u64 {
        self.range
            .as_ref()
            .map_or(self.body.len(), |r| r.length())
    }
}
