//! `Range` header resolution.
//!
//! Only the single-window form `bytes=<start>-[end]` is understood. An
//! open-ended request is capped at one chunk past `start` so that seeking in
//! large media never commits the server to streaming the rest of the file.

use thiserror::Error;

use crate::ByteRange;

/// Why a range expression could not be served
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("malformed range: {0}")]
    BadRange(String),

    #[error("range starts beyond {total} byte(s)")]
    NotSatisfiable { total: u64 },
}

impl RangeError {
    fn bad(message: impl Into<String>) -> Self {
        Self::BadRange(message.into())
    }
}

/// Resolve a raw `Range` header against a file of `total` bytes.
///
/// `Ok(None)` means no header was sent and the full body should be served.
pub fn resolve(
    header: Option<&str>,
    total: u64,
    chunk_size: u64,
) -> Result<Option<ByteRange>, RangeError> {
    let Some(header) = header else {
        return Ok(None);
    };
    if total == 0 {
        return Err(RangeError::NotSatisfiable { total });
    }

    let (start, end) = parse(header)?;
    if start >= total {
        return Err(RangeError::NotSatisfiable { total });
    }

    let last = total - 1;
    let end = match end {
        Some(end) => end.min(last),
        None => start.saturating_add(chunk_size).min(last),
    };

    ByteRange::new(start, end, total)
        .map(Some)
        .ok_or_else(|| RangeError::bad(header))
}

fn parse(header: &str) -> Result<(u64, Option<u64>), RangeError> {
    let set = header
        .trim()
        .strip_prefix("bytes=")
        .ok_or_else(|| RangeError::bad("missing `bytes=` unit"))?;
    if set.contains(',') {
        return Err(RangeError::bad("multiple ranges are not supported"));
    }

    let (start, end) = set
        .split_once('-')
        .ok_or_else(|| RangeError::bad("missing `-` separator"))?;
    let start: u64 = start
        .trim()
        .parse()
        .map_err(|_| RangeError::bad(format!("invalid start `{start}`")))?;

    let end = match end.trim() {
        "" => None,
        end => {
            let end: u64 = end
                .parse()
                .map_err(|_| RangeError::bad(format!("invalid end `{end}`")))?;
            if end < start {
                return Err(RangeError::bad("end precedes start"));
            }
            Some(end)
        }
    };

    Ok((start, end))
}
