use std::sync::Arc;

use futures_util::StreamExt;

use crate::classify::is_streamable;
use crate::{
    range, BlobConfig, BlobError, BlobPut, BlobReceipt, BlobResult, BlobStore, ByteStream,
    EntryStream, OpenedBlob, StoredFile,
};

/// Marker carried inside the `io::Error` that aborts an oversized upload
#[derive(Debug, thiserror::Error)]
#[error("upload exceeded {limit} bytes")]
struct LimitExceeded {
    limit: u64,
}

/// Media coordination over a [`BlobStore`]: upload limits, range
/// decisions and full/partial reads. Holds no per-request state.
#[derive(Clone)]
pub struct BlobAdapter {
    store: Arc<dyn BlobStore>,
    config: BlobConfig,
}

impl BlobAdapter {
    /// Create a new blob adapter
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Store a blob from a stream. Existing content under the same
    /// sanitized name is replaced; concurrent writers race and the last
    /// one to finish wins.
    pub async fn put(&self, put: BlobPut, body: ByteStream) -> BlobResult<BlobReceipt> {
        let body = match self.config.max_blob_bytes {
            Some(limit) => limit_body(body, limit),
            None => body,
        };

        let file = self
            .store
            .write(&put.filename, body)
            .await
            .map_err(|err| self.map_limit(err))?;

        let content_type = put
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| file.mime_type.clone());

        Ok(BlobReceipt {
            file,
            original_name: put.filename,
            content_type,
        })
    }

    /// Lazily enumerate stored files
    pub async fn list(&self) -> BlobResult<EntryStream> {
        self.store.list().await
    }

    pub async fn stat(&self, name: &str) -> BlobResult<StoredFile> {
        self.store.stat(name).await
    }

    /// Delete a blob
    pub async fn delete(&self, name: &str) -> BlobResult<()> {
        self.store.delete(name).await
    }

    /// Open a blob for streaming.
    ///
    /// Range handling applies only to video and audio; anything else, or a
    /// request without a range, gets the full body.
    pub async fn open(&self, name: &str, range_header: Option<&str>) -> BlobResult<OpenedBlob> {
        let file = self.store.stat(name).await?;

        let header = range_header.filter(|_| is_streamable(&file.mime_type));
        let Some(header) = header else {
            return self.open_full(file).await;
        };

        let window = range::resolve(Some(header), file.size_bytes, self.config.chunk_size)
            .map_err(|source| BlobError::range(file.size_bytes, source))?;

        match window {
            Some(window) => {
                tracing::debug!(
                    name,
                    start = window.start,
                    end = window.end,
                    total = window.total,
                    "serving partial content"
                );
                let body = self
                    .store
                    .open_read(&file.name, window.start, window.end)
                    .await?;
                Ok(OpenedBlob::partial(file, body, window))
            }
            None => self.open_full(file).await,
        }
    }

    /// Open the whole blob, ignoring any range
    pub async fn download(&self, name: &str) -> BlobResult<OpenedBlob> {
        let file = self.store.stat(name).await?;
        self.open_full(file).await
    }

    async fn open_full(&self, file: StoredFile) -> BlobResult<OpenedBlob> {
        let body = self.store.open_full(&file.name).await?;
        Ok(OpenedBlob::full(file, body))
    }

    fn map_limit(&self, err: BlobError) -> BlobError {
        match err {
            BlobError::Io { source }
                if source
                    .get_ref()
                    .is_some_and(|inner| inner.is::<LimitExceeded>()) =>
            {
                BlobError::too_large(self.config.max_blob_bytes.unwrap_or_default())
            }
            other => other,
        }
    }
}

/// Fail the body once more than `limit` bytes have passed through
fn limit_body(mut body: ByteStream, limit: u64) -> ByteStream {
    Box::pin(async_stream::stream! {
        let mut seen = 0u64;
        while let Some(chunk) = body.next().await {
            if let Ok(bytes) = &chunk {
                seen += bytes.len() as u64;
                if seen > limit {
                    yield Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        LimitExceeded { limit },
                    ));
                    return;
                }
            }
            yield chunk;
        }
    })
}
