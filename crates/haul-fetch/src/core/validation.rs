use url::Url;

use crate::error::{DownloadError, Result};

/// Only a plain `200 OK` counts as success. Redirects are left to the
/// transport.
///
/// # Examples
///
/// ```
/// use haul_fetch::core::is_success;
///
/// assert!(is_success(200));
/// assert!(!is_success(204));
/// assert!(!is_success(503));
/// ```
pub fn is_success(status: u16) -> bool {
    status == 200
}

/// Parse a raw `content-length` header value. Anything unparseable is
/// treated as unknown.
pub fn parse_content_length(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

/// Collapse an optional length to the declared-length convention where 0
/// means unknown.
pub fn declared_length(content_length: Option<u64>) -> u64 {
    content_length.unwrap_or(0)
}

/// Whether accepting `incoming` more bytes would overrun a known length.
pub fn exceeds_declared(received: u64, incoming: u64, declared: u64) -> bool {
    declared > 0 && received.saturating_add(incoming) > declared
}

/// Compare the final size against the declared length, if one was given.
pub fn check_size(actual: u64, declared: u64) -> Result<()> {
    if declared == 0 || actual == declared {
        Ok(())
    } else {
        Err(DownloadError::SizeMismatch {
            actual,
            expected: declared,
        })
    }
}

/// Classify a body stream that failed after `received` bytes.
///
/// A connection that drops short of a known length is a size mismatch;
/// anything else stays a transport error.
pub fn interrupted_body(received: u64, declared: u64, reason: impl ToString) -> DownloadError {
    if declared > 0 && received < declared {
        DownloadError::SizeMismatch {
            actual: received,
            expected: declared,
        }
    } else {
        DownloadError::Transport(reason.to_string())
    }
}

/// Parse `uri` and require an `http` or `https` scheme.
pub fn parse_uri(uri: &str) -> Result<Url> {
    let url = Url::parse(uri).map_err(|e| DownloadError::InvalidUri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DownloadError::InvalidUri {
            uri: uri.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
