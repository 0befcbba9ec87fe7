//! Content-type classification from file names.

pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type and preview capability for a file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub mime_type: String,
    pub previewable: bool,
}

/// Classify a file by its extension. Unknown extensions map to
/// `application/octet-stream`.
pub fn classify(name: &str) -> Classification {
    let mime_type = mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| OCTET_STREAM.to_string());
    let previewable = is_previewable(&mime_type);

    Classification {
        mime_type,
        previewable,
    }
}

/// Video, audio and images can be previewed in place
pub fn is_previewable(mime_type: &str) -> bool {
    mime_type.starts_with("video/")
        || mime_type.starts_with("audio/")
        || mime_type.starts_with("image/")
}

/// Only time-based media gets range handling on the stream path
pub fn is_streamable(mime_type: &str) -> bool {
    mime_type.starts_with("video/") || mime_type.starts_with("audio/")
}
