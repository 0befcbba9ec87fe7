use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::read_handle::HandleCounter;
use crate::store::is_plain_name;
use crate::{
    sanitize_name, BlobError, BlobResult, BlobStore, ByteStream, EntryStream, ScopedReadHandle,
    StoredFile,
};

/// Blob store backed by one flat directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    handles: HandleCounter,
}

impl FsStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            handles: HandleCounter::default(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the storage root if it does not exist yet
    pub async fn ensure_root(&self) -> BlobResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Read handles currently holding a descriptor
    pub fn open_handles(&self) -> usize {
        self.handles.live()
    }

    fn entry_path(&self, name: &str) -> BlobResult<PathBuf> {
        if !is_plain_name(name) {
            return Err(BlobError::not_found(name));
        }
        Ok(self.root.join(name))
    }

    async fn open_file(&self, name: &str) -> BlobResult<(fs::File, u64)> {
        let path = self.entry_path(name)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| BlobError::from_io(name, e))?;
        let meta = file.metadata().await?;
        if !meta.is_file() {
            return Err(BlobError::not_found(name));
        }
        Ok((file, meta.len()))
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn list(&self) -> BlobResult<EntryStream> {
        let mut dir = fs::read_dir(&self.root).await?;

        let stream = async_stream::stream! {
            loop {
                let entry = match dir.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(BlobError::from(err));
                        break;
                    }
                };

                let name = entry.file_name().to_string_lossy().into_owned();
                let stat = match fs::metadata(entry.path()).await {
                    Ok(meta) if !meta.is_file() => continue,
                    Ok(meta) => StoredFile::from_metadata(name.clone(), &meta),
                    Err(err) => Err(err),
                };

                match stat {
                    Ok(file) => yield Ok(file),
                    Err(source) => yield Err(BlobError::Entry { name, source }),
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn stat(&self, name: &str) -> BlobResult<StoredFile> {
        let path = self.entry_path(name)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| BlobError::from_io(name, e))?;
        if !meta.is_file() {
            return Err(BlobError::not_found(name));
        }
        Ok(StoredFile::from_metadata(name.to_string(), &meta)?)
    }

    async fn write(&self, name: &str, mut body: ByteStream) -> BlobResult<StoredFile> {
        let stored = sanitize_name(name);
        if !is_plain_name(&stored) {
            return Err(BlobError::invalid(format!("Invalid file name: {name:?}")));
        }
        let path = self.root.join(&stored);

        let mut file = fs::File::create(&path).await?;
        let copied: std::io::Result<u64> = async {
            let mut written = 0u64;
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok(written)
        }
        .await;
        drop(file);

        match copied {
            Ok(written) => {
                tracing::info!(name = %stored, bytes = written, "stored file");
                self.stat(&stored).await
            }
            Err(err) => {
                // Partial content must not be listed as a real file
                if let Err(cleanup) = fs::remove_file(&path).await {
                    tracing::warn!(name = %stored, error = %cleanup, "failed to remove partial file");
                }
                Err(err.into())
            }
        }
    }

    async fn delete(&self, name: &str) -> BlobResult<()> {
        let path = self.entry_path(name)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| BlobError::from_io(name, e))?;
        tracing::info!(name, "deleted file");
        Ok(())
    }

    async fn open_read(&self, name: &str, start: u64, end: u64) -> BlobResult<ScopedReadHandle> {
        if end < start {
            return Err(BlobError::invalid(format!(
                "Read window {start}-{end} is empty"
            )));
        }

        let (mut file, _) = self.open_file(name).await?;
        file.seek(SeekFrom::Start(start)).await?;
        Ok(ScopedReadHandle::new(file, end - start + 1, name, &self.handles))
    }

    async fn open_full(&self, name: &str) -> BlobResult<ScopedReadHandle> {
        let (file, len) = self.open_file(name).await?;
        Ok(ScopedReadHandle::new(file, len, name, &self.handles))
    }
}
