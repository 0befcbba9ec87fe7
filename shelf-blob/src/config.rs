/// Configuration for blob operations
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Window served for an open-ended range (`bytes=N-`), past `start`
    pub chunk_size: u64,

    /// Absolute max size allowed for a single upload (None = unlimited)
    pub max_blob_bytes: Option<u64>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024 * 1024,                   // 1MB
            max_blob_bytes: Some(500 * 1024 * 1024), // 500MB
        }
    }
}

impl BlobConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the open-ended range window
    pub fn with_chunk_size(mut self, bytes: u64) -> Self {
        self.chunk_size = bytes;
        self
    }

    /// Set max upload size
    pub fn with_max_blob_bytes(mut self, bytes: u64) -> Self {
        self.max_blob_bytes = Some(bytes);
        self
    }

    /// Accept uploads of any size
    pub fn unlimited(mut self) -> Self {
        self.max_blob_bytes = None;
        self
    }
}
