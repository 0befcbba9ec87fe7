//! Streaming `multipart/form-data` upload handling.
//!
//! The request body is handed to `multer` as a stream and the `file` field
//! is piped straight into the store, so uploads never sit in memory whole.

use axum::{body::Body, http::HeaderMap};
use futures::TryStreamExt;
use shelf_blob::{BlobAdapter, BlobPut, BlobReceipt};

use crate::ApiError;

/// Form field carrying the upload
pub const FILE_FIELD: &str = "file";

const NO_FILE: &str = "No file uploaded";

/// Store the first `file` field of a multipart body.
///
/// Fields with other names, and a `file` field sent without a filename,
/// are skipped. A request with no usable file is a 400.
pub async fn store_upload(
    blobs: &BlobAdapter,
    headers: &HeaderMap,
    body: Body,
) -> Result<BlobReceipt, ApiError> {
    let boundary = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| ApiError::bad_request(NO_FILE))?;

    let mut multipart = multer::Multipart::new(body.into_data_stream(), boundary);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart data: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let mut put = BlobPut::new(filename);
        if let Some(ct) = field.content_type() {
            put = put.with_content_type(ct.to_string());
        }

        let data = field.map_err(std::io::Error::other);
        let receipt = blobs.put(put, Box::pin(data)).await?;

        tracing::info!(
            filename = %receipt.file.name,
            original = %receipt.original_name,
            size = receipt.file.size_bytes,
            "upload stored"
        );
        return Ok(receipt);
    }

    Err(ApiError::bad_request(NO_FILE))
}
