//! Error types for haul-fetch.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("Error status code: {0}")]
    Status(u16),

    #[error("no data received for {} ms", .idle.as_millis())]
    Stalled { idle: Duration },

    #[error("downloaded size {actual} does not match expected size {expected}")]
    SizeMismatch { actual: u64, expected: u64 },

    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("cannot create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("temporary file error: {0}")]
    TempFile(#[source] haul_fs::Error),

    #[error("cannot write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot move download into place: {0}")]
    Commit(#[source] haul_fs::Error),

    #[error("download task ended without reporting a result")]
    Aborted,
}

impl DownloadError {
    /// Transport, protocol, stall and integrity failures are worth another
    /// attempt. Local resource failures are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DownloadError::Transport(_)
                | DownloadError::Status(_)
                | DownloadError::Stalled { .. }
                | DownloadError::SizeMismatch { .. }
        )
    }

    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
