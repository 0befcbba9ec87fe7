mod config;

use anyhow::Result;
use shelf_blob::{BlobAdapter, FsStore};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

const DEFAULT_FILTER: &str = "shelf_server=info,shelf_axum=info,shelf_blob=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let config = ServerConfig::from_env();

    let store = FsStore::new(&config.upload_dir);
    store.ensure_root().await?;
    tracing::info!(root = %store.root().display(), "storage ready");

    let blobs = BlobAdapter::new(store, config.blob_config());
    tracing::info!(
        chunk_bytes = config.stream_chunk_bytes,
        max_upload_bytes = config.max_upload_bytes,
        "serving files"
    );

    shelf_axum::shelf(blobs).listen(config.addr()).await?;

    Ok(())
}
