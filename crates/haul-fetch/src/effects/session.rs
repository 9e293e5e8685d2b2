use std::path::Path;
use std::sync::Arc;

use haul_fs::TempArtifact;
use tokio::sync::oneshot;

use crate::core::parse_uri;
use crate::data::{DownloadRequest, DownloadResult, Payload};
use crate::effects::attempt::{self, AttemptOutcome, Target};
use crate::effects::http::HttpClient;
use crate::effects::sink::{ProgressSink, TracingSink};
use crate::error::DownloadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Pending,
    Attempting(u32),
    Retrying(u32),
    Succeeded,
    Failed,
}

/// Starts download sessions against one transport and one progress sink.
///
/// # Examples
///
/// ```no_run
/// use haul_fetch::{DownloadRequest, Downloader, ReqwestClient, RetryOptions};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let downloader = Downloader::new(ReqwestClient::new()?);
/// let request = DownloadRequest::new("https://example.test/f.zip")
///     .destination("/tmp/out/f.zip")
///     .options(RetryOptions::default().inactivity_timeout_ms(30_000));
///
/// let result = downloader.start(request).end().await;
/// println!("{} attempt(s): {:?}", result.attempts, result.payload());
/// # Ok(())
/// # }
/// ```
pub struct Downloader<C> {
    client: Arc<C>,
    sink: Arc<dyn ProgressSink>,
}

impl<C> Clone for Downloader<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<C: HttpClient + 'static> Downloader<C> {
    /// Downloader reporting through [`TracingSink`].
    pub fn new(client: C) -> Self {
        Self {
            client: Arc::new(client),
            sink: Arc::new(TracingSink),
        }
    }

    #[must_use]
    pub fn with_sink<S: ProgressSink + 'static>(mut self, sink: Arc<S>) -> Self {
        self.sink = sink;
        self
    }

    /// Spawn a session on the current tokio runtime and return immediately.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(&self, request: DownloadRequest) -> DownloadHandle {
        let (tx, rx) = oneshot::channel();
        let session = Session::new(Arc::clone(&self.client), Arc::clone(&self.sink), request);
        tokio::spawn(async move {
            let result = session.run().await;
            // the caller may have stopped waiting
            let _ = tx.send(result);
        });
        DownloadHandle { rx }
    }

    /// Drive a session to completion on the calling task.
    pub async fn run(&self, request: DownloadRequest) -> DownloadResult {
        Session::new(Arc::clone(&self.client), Arc::clone(&self.sink), request)
            .run()
            .await
    }
}

/// Receiving end of a started session. Yields the result exactly once.
#[derive(Debug)]
pub struct DownloadHandle {
    rx: oneshot::Receiver<DownloadResult>,
}

impl DownloadHandle {
    /// A handle that is already resolved, for failures before any session
    /// could start.
    pub fn resolved(result: DownloadResult) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// Wait for the terminal result.
    pub async fn end(self) -> DownloadResult {
        self.rx.await.unwrap_or_else(|_| DownloadResult {
            attempts: 0,
            outcome: Err(DownloadError::Aborted),
        })
    }
}

struct Session<C> {
    client: Arc<C>,
    sink: Arc<dyn ProgressSink>,
    request: DownloadRequest,
    state: SessionState,
    artifact: Option<TempArtifact>,
    buffer: Vec<u8>,
}

impl<C: HttpClient> Session<C> {
    fn new(client: Arc<C>, sink: Arc<dyn ProgressSink>, request: DownloadRequest) -> Self {
        Self {
            client,
            sink,
            request,
            state: SessionState::Pending,
            artifact: None,
            buffer: Vec::new(),
        }
    }

    async fn run(mut self) -> DownloadResult {
        let result = self.drive().await;
        tracing::info!(
            uri = %self.request.uri,
            attempts = result.attempts,
            state = ?self.state,
            "download session ended"
        );
        if !self.request.options.silent {
            self.sink.finished(&result);
        }
        result
    }

    async fn drive(&mut self) -> DownloadResult {
        let url = match parse_uri(&self.request.uri) {
            Ok(url) => url,
            Err(e) => return self.fail(0, e),
        };
        if let Some(destination) = &self.request.destination {
            if let Err(e) = ensure_parent(destination).await {
                return self.fail(0, e);
            }
        }

        let max_attempts = self.request.options.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.transition(SessionState::Attempting(attempt));
            if !self.request.options.silent {
                self.sink.attempt_started(&self.request.uri, attempt, max_attempts);
            }

            let target = match target(&mut self.artifact, &mut self.buffer, &self.request) {
                Ok(target) => target,
                Err(e) => return self.fail(attempt, e),
            };
            let outcome = attempt::run(
                &*self.client,
                url.as_str(),
                attempt,
                target,
                &self.request.options,
                &*self.sink,
            )
            .await;

            match outcome {
                AttemptOutcome::Success { bytes } => {
                    tracing::debug!(attempt, bytes, "attempt succeeded");
                    return self.succeed(attempt);
                }
                AttemptOutcome::Retryable(e) if attempt < max_attempts => {
                    self.transition(SessionState::Retrying(attempt));
                    let delay = self.request.options.retry_delay;
                    tracing::info!(attempt, max_attempts, error = %e, ?delay, "retrying download");
                    if !self.request.options.silent {
                        self.sink.retrying(attempt, &e, delay);
                    }
                    tokio::time::sleep(delay).await;
                }
                AttemptOutcome::Retryable(e) | AttemptOutcome::Fatal(e) => {
                    return self.fail(attempt, e);
                }
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }

    fn succeed(&mut self, attempts: u32) -> DownloadResult {
        let outcome = match (self.artifact.take(), &self.request.destination) {
            (Some(artifact), Some(destination)) => artifact
                .commit(destination)
                .map(Payload::File)
                .map_err(DownloadError::Commit),
            _ => Ok(Payload::Text(
                String::from_utf8_lossy(&std::mem::take(&mut self.buffer)).into_owned(),
            )),
        };

        let state = if outcome.is_ok() {
            SessionState::Succeeded
        } else {
            SessionState::Failed
        };
        self.transition(state);
        DownloadResult { attempts, outcome }
    }

    fn fail(&mut self, attempts: u32, error: DownloadError) -> DownloadResult {
        if let Some(artifact) = self.artifact.take() {
            artifact.remove();
        }
        self.buffer.clear();
        self.transition(SessionState::Failed);
        DownloadResult {
            attempts,
            outcome: Err(error),
        }
    }
}

/// Hand out the body target for the next attempt, creating the temp
/// artifact on first use and reusing it afterwards.
fn target<'a>(
    slot: &'a mut Option<TempArtifact>,
    buffer: &'a mut Vec<u8>,
    request: &DownloadRequest,
) -> Result<Target<'a>, DownloadError> {
    if request.destination.is_none() {
        return Ok(Target::Memory(buffer));
    }
    let artifact = match slot.take() {
        Some(artifact) => artifact,
        None => TempArtifact::create(&request.temp_dir).map_err(DownloadError::TempFile)?,
    };
    Ok(Target::File(slot.insert(artifact)))
}

async fn ensure_parent(destination: &Path) -> Result<(), DownloadError> {
    let Some(parent) = destination.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| DownloadError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })
}
