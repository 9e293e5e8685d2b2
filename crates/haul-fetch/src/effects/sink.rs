use std::time::Duration;

use crate::data::{DownloadResult, Payload, Progress};
use crate::error::DownloadError;

/// Observer for user-facing download notifications.
///
/// Every method defaults to a no-op. Notifications are only delivered when
/// the request is not silent, and nothing a sink does can influence the
/// session.
pub trait ProgressSink: Send + Sync {
    /// An attempt is about to send its request.
    fn attempt_started(&self, _uri: &str, _attempt: u32, _max_attempts: u32) {}

    /// A chunk was accepted. Only sent while the declared length is known.
    fn progress(&self, _progress: &Progress) {}

    /// An attempt failed and the session will try again after `delay`.
    fn retrying(&self, _attempt: u32, _error: &DownloadError, _delay: Duration) {}

    /// The session reached its single terminal result.
    fn finished(&self, _result: &DownloadResult) {}
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl ProgressSink for NoopSink {}

/// Turns notifications into `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn attempt_started(&self, uri: &str, attempt: u32, max_attempts: u32) {
        tracing::info!(uri, attempt, max_attempts, "Downloading...");
    }

    fn progress(&self, progress: &Progress) {
        tracing::trace!(
            attempt = progress.attempt,
            received = progress.bytes_received,
            total = progress.declared_length,
            "download progress"
        );
    }

    fn retrying(&self, attempt: u32, error: &DownloadError, delay: Duration) {
        tracing::info!(attempt, %error, ?delay, "attempt failed, retrying");
    }

    fn finished(&self, result: &DownloadResult) {
        match &result.outcome {
            Ok(Payload::File(path)) => {
                tracing::info!(attempts = result.attempts, "Saved: {}", path.display())
            }
            Ok(Payload::Text(text)) => {
                tracing::info!(attempts = result.attempts, bytes = text.len(), "download finished")
            }
            Err(error) => tracing::info!(attempts = result.attempts, %error, "download failed"),
        }
    }
}
