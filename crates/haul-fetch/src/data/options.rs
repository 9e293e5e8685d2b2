use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Retry and presentation policy for one download.
///
/// # Examples
///
/// ```
/// use haul_fetch::RetryOptions;
/// use std::time::Duration;
///
/// let options = RetryOptions::default()
///     .max_attempts(5)
///     .inactivity_timeout_ms(500)
///     .retry_delay(Duration::from_millis(250))
///     .silent(true);
/// assert_eq!(options.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOptions {
    /// Total number of attempts, including the first one. Never below 1.
    pub max_attempts: u32,

    /// Longest tolerated gap without received data. `None` disables the
    /// watchdog.
    pub inactivity_timeout: Option<Duration>,

    /// Fixed delay between a retryable failure and the next attempt.
    pub retry_delay: Duration,

    /// Suppress console/progress notifications. Control flow is unaffected.
    pub silent: bool,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            inactivity_timeout: None,
            retry_delay: DEFAULT_RETRY_DELAY,
            silent: false,
        }
    }
}

impl RetryOptions {
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn inactivity_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    #[must_use]
    pub fn inactivity_timeout_ms(self, millis: u64) -> Self {
        self.inactivity_timeout(Some(Duration::from_millis(millis)))
    }

    #[must_use]
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    #[must_use]
    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// What to fetch and where to put it.
///
/// Without a destination the body is buffered and returned as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub uri: String,
    pub destination: Option<PathBuf>,
    pub options: RetryOptions,
    /// Directory that holds the partial file while attempts run.
    pub temp_dir: PathBuf,
}

impl DownloadRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            destination: None,
            options: RetryOptions::default(),
            temp_dir: PathBuf::from("."),
        }
    }

    #[must_use]
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    #[must_use]
    pub fn options(mut self, options: RetryOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }
}
