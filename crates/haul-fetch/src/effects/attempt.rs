use std::path::Path;

use bytes::Bytes;
use futures_util::StreamExt;
use haul_fs::TempArtifact;
use tokio::io::AsyncWriteExt;

use crate::core::{check_size, declared_length, exceeds_declared, interrupted_body, is_success};
use crate::data::RetryOptions;
use crate::effects::http::{BoxStream, HttpClient};
use crate::effects::reporter::ProgressReporter;
use crate::effects::sink::ProgressSink;
use crate::effects::watchdog::Watchdog;
use crate::error::DownloadError;

/// How a single attempt ended.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The whole body was received and, on disk, matches the declared length.
    Success { bytes: u64 },
    Retryable(DownloadError),
    Fatal(DownloadError),
}

impl AttemptOutcome {
    fn classify(error: DownloadError) -> Self {
        if error.is_retryable() {
            AttemptOutcome::Retryable(error)
        } else {
            AttemptOutcome::Fatal(error)
        }
    }
}

/// Where an attempt puts the body.
pub(crate) enum Target<'a> {
    File(&'a mut TempArtifact),
    Memory(&'a mut Vec<u8>),
}

enum BodyWriter<'a> {
    File {
        file: tokio::fs::File,
        artifact: &'a mut TempArtifact,
    },
    Memory(&'a mut Vec<u8>),
}

impl<'a> BodyWriter<'a> {
    /// Start the attempt from an empty body.
    fn open(target: Target<'a>) -> Result<Self, DownloadError> {
        match target {
            Target::File(artifact) => {
                let file = artifact.reopen().map_err(DownloadError::TempFile)?;
                Ok(BodyWriter::File {
                    file: tokio::fs::File::from_std(file),
                    artifact,
                })
            }
            Target::Memory(buffer) => {
                buffer.clear();
                Ok(BodyWriter::Memory(buffer))
            }
        }
    }

    async fn write(&mut self, chunk: &[u8]) -> Result<(), DownloadError> {
        match self {
            BodyWriter::File { file, artifact } => {
                file.write_all(chunk).await.map_err(|source| write_error(artifact.path(), source))
            }
            BodyWriter::Memory(buffer) => {
                buffer.extend_from_slice(chunk);
                Ok(())
            }
        }
    }

    /// Close the body and verify what landed on disk.
    async fn finish(self, received: u64, declared: u64) -> AttemptOutcome {
        match self {
            BodyWriter::File { mut file, artifact } => {
                let synced = match file.flush().await {
                    Ok(()) => file.sync_all().await,
                    Err(e) => Err(e),
                };
                drop(file);
                artifact.close();
                if let Err(source) = synced {
                    return AttemptOutcome::Fatal(write_error(artifact.path(), source));
                }

                let on_disk = match artifact.len() {
                    Ok(len) => len,
                    Err(e) => return AttemptOutcome::Fatal(DownloadError::TempFile(e)),
                };
                match check_size(on_disk, declared) {
                    Ok(()) => AttemptOutcome::Success { bytes: on_disk },
                    Err(e) => AttemptOutcome::Retryable(e),
                }
            }
            BodyWriter::Memory(_) => AttemptOutcome::Success { bytes: received },
        }
    }

    /// Drain pending writes and release the file after a failed attempt.
    async fn abandon(self) {
        if let BodyWriter::File { mut file, artifact } = self {
            if let Err(e) = file.flush().await {
                tracing::debug!(path = %artifact.path().display(), error = %e, "flush after failed attempt");
            }
            drop(file);
            artifact.close();
        }
    }
}

fn write_error(path: &Path, source: std::io::Error) -> DownloadError {
    DownloadError::Write {
        path: path.to_path_buf(),
        source,
    }
}

/// One connect-stream-consume cycle.
///
/// Reports exactly one outcome. The response body is dropped, which closes
/// the connection, before the outcome is returned, so no data from this
/// attempt is observed afterwards.
pub(crate) async fn run<C: HttpClient>(
    client: &C,
    url: &str,
    attempt: u32,
    target: Target<'_>,
    options: &RetryOptions,
    sink: &dyn ProgressSink,
) -> AttemptOutcome {
    let mut watchdog = Watchdog::new(options.inactivity_timeout);
    watchdog.start();
    tracing::debug!(url, attempt, "attempt started");

    let response = tokio::select! {
        biased;
        response = client.get(url) => response,
        _ = watchdog.expired() => {
            let idle = watchdog.fire();
            return AttemptOutcome::Retryable(DownloadError::Stalled { idle });
        }
    };
    let response = match response {
        Ok(response) => response,
        Err(e) => {
            watchdog.stop();
            return AttemptOutcome::Retryable(DownloadError::Transport(e.to_string()));
        }
    };

    if !is_success(response.status) {
        let status = response.status;
        drop(response);
        watchdog.stop();
        return AttemptOutcome::Retryable(DownloadError::Status(status));
    }

    let declared = declared_length(response.content_length);
    let mut body = response.body;

    let mut writer = match BodyWriter::open(target) {
        Ok(writer) => writer,
        Err(e) => {
            drop(body);
            watchdog.stop();
            return AttemptOutcome::classify(e);
        }
    };
    let mut reporter = ProgressReporter::new(sink, attempt, declared, options.silent);

    let streamed = stream_body(&mut body, &mut writer, &mut watchdog, &mut reporter, declared).await;
    drop(body);
    watchdog.stop();

    match streamed {
        Ok(received) => {
            tracing::debug!(url, attempt, received, declared, "body complete");
            writer.finish(received, declared).await
        }
        Err(e) => {
            writer.abandon().await;
            AttemptOutcome::classify(e)
        }
    }
}

async fn stream_body<E: std::error::Error>(
    body: &mut BoxStream<'static, Result<Bytes, E>>,
    writer: &mut BodyWriter<'_>,
    watchdog: &mut Watchdog,
    reporter: &mut ProgressReporter<'_>,
    declared: u64,
) -> Result<u64, DownloadError> {
    loop {
        let next = tokio::select! {
            biased;
            next = body.next() => next,
            _ = watchdog.expired() => {
                return Err(DownloadError::Stalled { idle: watchdog.fire() });
            }
        };

        let Some(chunk) = next else {
            return Ok(reporter.bytes_received());
        };
        let received = reporter.bytes_received();
        let chunk = chunk.map_err(|e| interrupted_body(received, declared, e))?;
        let len = chunk.len() as u64;

        if exceeds_declared(received, len, declared) {
            return Err(DownloadError::SizeMismatch {
                actual: received + len,
                expected: declared,
            });
        }

        writer.write(&chunk).await?;
        watchdog.reset();
        reporter.advance(len);
    }
}
