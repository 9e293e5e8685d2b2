use haul_fs::registry;
use tokio::task::JoinHandle;

/// Exit status used after a termination signal.
pub const SIGNAL_EXIT_CODE: i32 = 130;

/// Process-wide cleanup guard.
///
/// Hold it for the lifetime of `main`. On Ctrl+C, SIGTERM or SIGHUP the
/// registry is swept and the process exits with [`SIGNAL_EXIT_CODE`];
/// dropping the guard on a normal exit runs the same sweep.
#[derive(Debug)]
pub struct ShutdownHook {
    watcher: Option<JoinHandle<()>>,
}

impl ShutdownHook {
    /// Install the signal watcher on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn install() -> Self {
        let watcher = tokio::spawn(async {
            match termination_signal().await {
                Ok(signal) => {
                    let removed = registry().sweep();
                    tracing::warn!(signal, removed, "interrupted, partial downloads removed");
                    std::process::exit(SIGNAL_EXIT_CODE);
                }
                Err(e) => tracing::warn!(error = %e, "cannot listen for termination signals"),
            }
        });
        Self {
            watcher: Some(watcher),
        }
    }

    /// A guard that only sweeps on drop, without listening for signals.
    pub fn detached() -> Self {
        Self { watcher: None }
    }

    /// Sweep now. Returns the number of files removed.
    pub fn sweep(&self) -> usize {
        registry().sweep()
    }
}

impl Drop for ShutdownHook {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        let removed = registry().sweep();
        tracing::debug!(removed, "exit sweep finished");
    }
}

async fn termination_signal() -> std::io::Result<&'static str> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate())?;
        let mut hup = signal(SignalKind::hangup())?;
        return tokio::select! {
            res = &mut ctrl_c => res.map(|()| "SIGINT"),
            _ = term.recv() => Ok("SIGTERM"),
            _ = hup.recv() => Ok("SIGHUP"),
        };
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.map(|()| "ctrl-c")
    }
}
