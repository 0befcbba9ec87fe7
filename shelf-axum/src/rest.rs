use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use shelf_blob::{OpenedBlob, StoredFile};

use crate::{error::GENERIC_FAILURE, multipart, ApiError, ShelfState};

/// One row of `GET /files`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub modified: DateTime<Utc>,
    pub can_preview: bool,
}

impl From<StoredFile> for FileView {
    fn from(file: StoredFile) -> Self {
        Self {
            name: file.name,
            size: file.size_bytes,
            mime_type: file.mime_type,
            modified: file.modified_at,
            can_preview: file.previewable,
        }
    }
}

pub fn router(state: ShelfState) -> Router<()> {
    Router::new()
        .route("/upload", post(upload))
        .route("/files", get(list_files))
        .route("/stream/{filename}", get(stream_file))
        .route("/download/{filename}", get(download_file))
        .route("/delete/{filename}", delete(delete_file))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn upload(
    State(state): State<ShelfState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Value>, ApiError> {
    let receipt = multipart::store_upload(&state.blobs, &headers, body).await?;

    Ok(Json(json!({
        "success": true,
        "filename": receipt.file.name,
        "originalname": receipt.original_name,
        "type": receipt.content_type,
        "size": receipt.file.size_bytes,
    })))
}

async fn list_files(State(state): State<ShelfState>) -> Result<Json<Vec<FileView>>, ApiError> {
    let entries = state
        .blobs
        .list()
        .await
        .map_err(|e| ApiError::from(e).or_internal("Unable to scan files"))?;

    let files = entries
        .filter_map(|entry| async move {
            match entry {
                Ok(file) => Some(FileView::from(file)),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    None
                }
            }
        })
        .collect::<Vec<_>>()
        .await;

    Ok(Json(files))
}

async fn stream_file(
    State(state): State<ShelfState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    // Non-ASCII bytes still reach the resolver so media answers 416
    let range = headers
        .get(header::RANGE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()));
    let opened = state.blobs.open(&filename, range.as_deref()).await?;
    blob_response(opened, None)
}

async fn download_file(
    State(state): State<ShelfState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let opened = state.blobs.download(&filename).await?;
    let disposition = attachment_disposition(&opened.file.name);
    blob_response(opened, Some(disposition))
}

async fn delete_file(
    State(state): State<ShelfState>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state
        .blobs
        .delete(&filename)
        .await
        .map_err(|e| ApiError::from(e).or_internal("Failed to delete file"))?;

    Ok(Json(json!({ "success": true })))
}

/// Frame an opened blob as 200 or 206. The read handle moves into the
/// body; hyper drops the body when the client goes away, which closes the
/// file.
fn blob_response(opened: OpenedBlob, disposition: Option<String>) -> Result<Response, ApiError> {
    let content_length = opened.content_length();
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header_value(&opened.file.mime_type)?);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(content_length));

    let status = match opened.range {
        Some(range) => {
            headers.insert(header::CONTENT_RANGE, header_value(&range.content_range())?);
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            StatusCode::PARTIAL_CONTENT
        }
        None => StatusCode::OK,
    };
    if let Some(disposition) = disposition {
        headers.insert(header::CONTENT_DISPOSITION, header_value(&disposition)?);
    }

    Ok((status, headers, Body::from_stream(opened.body)).into_response())
}

fn header_value(value: &str) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(value).map_err(|e| ApiError::internal(GENERIC_FAILURE, e))
}

/// `attachment; filename="..."` with anything outside printable ASCII,
/// quotes and backslashes replaced
pub fn attachment_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}
