use thiserror::Error;

use crate::RangeError;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during blob operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("File not found: {name}")]
    NotFound { name: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Blob exceeds maximum size of {limit} bytes")]
    TooLarge { limit: u64 },

    #[error("Range not satisfiable for {total} byte(s): {source}")]
    Range {
        total: u64,
        #[source]
        source: RangeError,
    },

    #[error("Failed to read entry {name}: {source}")]
    Entry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BlobError {
    /// Create an invalid request error
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(name: S) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a size limit error
    pub fn too_large(limit: u64) -> Self {
        Self::TooLarge { limit }
    }

    /// Attach the file size a range was resolved against
    pub fn range(total: u64, source: RangeError) -> Self {
        Self::Range { total, source }
    }

    /// Map an I/O error for `name`, turning `ErrorKind::NotFound` into [`BlobError::NotFound`]
    pub fn from_io(name: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(name)
        } else {
            Self::Io { source: err }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
