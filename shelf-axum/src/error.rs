use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shelf_blob::BlobError;

pub(crate) const GENERIC_FAILURE: &str = "Something went wrong!";

/// Error returned by every route. Rendered as `{ "error": message }`,
/// except 416 which carries no body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    PayloadTooLarge(String),
    RangeNotSatisfiable { total: u64 },
    Internal {
        message: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: &'static str, detail: impl ToString) -> Self {
        Self::Internal {
            message,
            detail: detail.to_string(),
        }
    }

    /// Replace the client-facing message of a 500, leaving other kinds alone
    pub fn or_internal(self, message: &'static str) -> Self {
        match self {
            Self::Internal { detail, .. } => Self::Internal { message, detail },
            other => other,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BlobError> for ApiError {
    fn from(err: BlobError) -> Self {
        match err {
            BlobError::NotFound { .. } => Self::NotFound("File not found".to_string()),
            BlobError::Invalid { message } => Self::BadRequest(message),
            BlobError::TooLarge { limit } => {
                Self::PayloadTooLarge(format!("File exceeds the {limit} byte upload limit"))
            }
            BlobError::Range { total, .. } => Self::RangeNotSatisfiable { total },
            other => Self::internal(GENERIC_FAILURE, other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::RangeNotSatisfiable { total } => {
                let mut res = status.into_response();
                if let Ok(value) = HeaderValue::from_str(&format!("bytes */{total}")) {
                    res.headers_mut().insert(header::CONTENT_RANGE, value);
                }
                res
            }
            Self::Internal { message, detail } => {
                tracing::error!(%detail, "{message}");
                (status, Json(json!({ "error": message }))).into_response()
            }
            Self::BadRequest(message) | Self::NotFound(message) | Self::PayloadTooLarge(message) => {
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}
