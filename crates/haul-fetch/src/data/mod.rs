//! Immutable data types describing a download and what it produced.

pub mod options;
pub mod progress;
pub mod result;

pub use options::{DownloadRequest, RetryOptions};
pub use progress::Progress;
pub use result::{DownloadResult, Payload};
