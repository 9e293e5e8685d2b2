//! I/O: transport, timers, files and the session state machine.

pub mod attempt;
pub mod http;
pub mod reporter;
pub mod session;
pub mod shutdown;
pub mod sink;
pub mod watchdog;

pub use attempt::AttemptOutcome;
pub use http::{BoxStream, HttpClient, HttpResponse};
pub use session::{DownloadHandle, Downloader};
pub use shutdown::ShutdownHook;
pub use sink::{NoopSink, ProgressSink, TracingSink};
pub use watchdog::{Watchdog, WatchdogState};

#[cfg(feature = "reqwest")]
pub use http::{ClientError, ClientSettings, ReqwestClient};
