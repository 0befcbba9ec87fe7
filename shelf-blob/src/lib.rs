//! # shelf-blob: flat-directory blob storage with range-friendly reads
//!
//! `shelf-blob` owns everything about stored files that is not HTTP:
//!
//! - **Classification**: MIME type and "previewable" flag derived from the name
//! - **Storage**: a flat directory of files addressed by sanitized name
//! - **Range resolution**: `bytes=<start>-[end]` turned into a concrete window
//! - **Scoped reads**: bounded file streams that release their descriptor on
//!   every exit path, including a dropped consumer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shelf_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = FsStore::new("uploads");
//! store.ensure_root().await?;
//! let blobs = BlobAdapter::new(store, BlobConfig::default());
//!
//! let body = futures_util::stream::once(async { Ok(bytes::Bytes::from_static(b"hello")) });
//! let receipt = blobs
//!     .put(BlobPut::new("hello world.txt"), Box::pin(body))
//!     .await?;
//! assert_eq!(receipt.file.name, "hello_world.txt");
//!
//! // Serve the first byte of a media file
//! let opened = blobs.open("clip.mp4", Some("bytes=0-0")).await?;
//! assert!(opened.is_partial());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP routes   │  ← shelf-axum
//! ├─────────────────┤
//! │   BlobAdapter   │  ← range decisions, upload limits
//! ├─────────────────┤
//! │   BlobStore     │  ← filesystem primitives
//! └─────────────────┘
//! ```

pub mod adapter;
pub mod classify;
mod config;
mod error;
mod fs_store;
pub mod range;
mod read_handle;
mod receipt;
pub mod store;
mod types;

pub use adapter::BlobAdapter;
pub use classify::{classify, Classification};
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use fs_store::FsStore;
pub use range::{resolve, RangeError};
pub use read_handle::ScopedReadHandle;
pub use receipt::{BlobReceipt, OpenedBlob};
pub use store::{sanitize_name, BlobStore};
pub use types::{BlobPut, ByteRange, ByteStream, EntryStream, StoredFile};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobConfig, BlobError, BlobPut, BlobReceipt, BlobResult, BlobStore,
        ByteRange, ByteStream, FsStore, OpenedBlob, StoredFile,
    };
}
