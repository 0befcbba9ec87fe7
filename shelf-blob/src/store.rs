use async_trait::async_trait;

use crate::{BlobResult, ByteStream, EntryStream, ScopedReadHandle, StoredFile};

/// Core storage operations over a flat namespace of named files
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Enumerate every entry. Failing to open the namespace fails the call;
    /// a failing entry is yielded as an error and the listing continues.
    async fn list(&self) -> BlobResult<EntryStream>;

    /// Metadata for a single entry
    async fn stat(&self, name: &str) -> BlobResult<StoredFile>;

    /// Store `body` under `sanitize_name(name)`, replacing any existing entry
    async fn write(&self, name: &str, body: ByteStream) -> BlobResult<StoredFile>;

    /// Remove an entry
    async fn delete(&self, name: &str) -> BlobResult<()>;

    /// Open a read over the inclusive window `[start, end]`
    async fn open_read(&self, name: &str, start: u64, end: u64) -> BlobResult<ScopedReadHandle>;

    /// Open a read over the whole entry
    async fn open_full(&self, name: &str) -> BlobResult<ScopedReadHandle>;
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// Applied per character, so multi-byte characters become a single `_`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}

/// True when `name` is a single plain path component
pub(crate) fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
