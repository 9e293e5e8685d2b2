//! Reliable single-artifact HTTP(S) downloads.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration, progress snapshots and results
//! - [`core`] - Pure transformations
//! - [`effects`] - I/O operations with trait abstraction
//!
//! # Key Features
//!
//! - **Bounded Retry**: transport, status, stall and length failures are
//!   retried with a fixed delay; local filesystem failures end the session
//! - **Stall Detection**: a rearmable inactivity deadline, not a total timeout
//! - **Atomic Placement**: bodies are written to a registered temp file and
//!   renamed onto the destination only after length verification
//! - **Single Result**: every session resolves its handle exactly once

pub mod core;
pub mod data;
pub mod effects;
mod error;

#[cfg(feature = "reqwest")]
use std::path::PathBuf;

pub use crate::data::{DownloadRequest, DownloadResult, Payload, Progress, RetryOptions};
pub use crate::effects::{
    AttemptOutcome, BoxStream, DownloadHandle, Downloader, HttpClient, HttpResponse, NoopSink,
    ProgressSink, ShutdownHook, TracingSink, Watchdog, WatchdogState,
};
pub use crate::error::{DownloadError, Result};

#[cfg(feature = "reqwest")]
pub use crate::effects::{ClientError, ClientSettings, ReqwestClient};

/// Download `uri` with the default reqwest transport.
///
/// With a destination the body is committed to that path; without one it is
/// returned as text. Must be called from within a tokio runtime.
#[cfg(feature = "reqwest")]
pub fn download(uri: &str, destination: Option<PathBuf>, options: RetryOptions) -> DownloadHandle {
    let client = match ReqwestClient::new() {
        Ok(client) => client,
        Err(e) => {
            return DownloadHandle::resolved(DownloadResult {
                attempts: 0,
                outcome: Err(DownloadError::Client(e.to_string())),
            });
        }
    };

    let mut request = DownloadRequest::new(uri).options(options);
    request.destination = destination;
    Downloader::new(client).start(request)
}
