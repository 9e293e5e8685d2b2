use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::registry::{CleanupRegistry, registry};
use crate::{Error, Result, TEMP_PREFIX};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    /// A writer currently holds the backing file.
    Open,
    /// The backing file exists and no writer holds it.
    Closed,
    /// Renamed onto its destination.
    Committed,
    /// Deleted after a failure.
    Removed,
}

/// A partial-download file owned by exactly one session.
///
/// The file is registered with a [`CleanupRegistry`] for as long as it is
/// live. Dropping an artifact that was neither committed nor removed deletes
/// the backing file.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    state: ArtifactState,
    registry: &'static CleanupRegistry,
}

impl TempArtifact {
    /// Create an empty artifact in `dir`, tracked by the process-wide registry.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        Self::create_in(dir, registry())
    }

    pub fn create_in(dir: impl AsRef<Path>, registry: &'static CleanupRegistry) -> Result<Self> {
        let dir = dir.as_ref();
        let path = dir.join(unique_name());

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| Error::Create {
                path: path.clone(),
                source,
            })?;

        registry.track_dir(dir);
        registry.register(&path);
        tracing::debug!(path = %path.display(), "temp artifact created");

        Ok(Self {
            path,
            state: ArtifactState::Closed,
            registry,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> ArtifactState {
        self.state
    }

    /// Truncate the backing file and hand out a fresh writer for it.
    pub fn reopen(&mut self) -> Result<File> {
        self.ensure_live()?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|source| Error::Open {
                path: self.path.clone(),
                source,
            })?;
        self.state = ArtifactState::Open;
        Ok(file)
    }

    /// Record that the writer returned by [`reopen`](Self::reopen) was dropped.
    pub fn close(&mut self) {
        if self.state == ArtifactState::Open {
            self.state = ArtifactState::Closed;
        }
    }

    /// Size of the backing file in bytes.
    pub fn len(&self) -> Result<u64> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|source| Error::Metadata {
                path: self.path.clone(),
                source,
            })
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|len| len == 0)
    }

    /// Atomically rename the artifact onto `destination`, replacing any
    /// existing file there.
    ///
    /// On failure the artifact is dropped, which removes the backing file.
    pub fn commit(mut self, destination: impl AsRef<Path>) -> Result<PathBuf> {
        self.ensure_live()?;
        let destination = destination.as_ref();

        fs::rename(&self.path, destination).map_err(|source| Error::Rename {
            from: self.path.clone(),
            to: destination.to_path_buf(),
            source,
        })?;

        self.state = ArtifactState::Committed;
        self.registry.deregister(&self.path);
        tracing::debug!(
            from = %self.path.display(),
            to = %destination.display(),
            "temp artifact committed"
        );
        Ok(destination.to_path_buf())
    }

    /// Delete the backing file. A file that is already gone is not an error.
    pub fn remove(mut self) {
        self.discard();
    }

    fn ensure_live(&self) -> Result<()> {
        match self.state {
            ArtifactState::Committed | ArtifactState::Removed => {
                Err(Error::NotLive(self.path.clone()))
            }
            ArtifactState::Open | ArtifactState::Closed => Ok(()),
        }
    }

    fn discard(&mut self) {
        if self.ensure_live().is_err() {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "temp artifact removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove temp artifact"
            ),
        }
        self.registry.deregister(&self.path);
        self.state = ArtifactState::Removed;
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        self.discard();
    }
}

fn unique_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{TEMP_PREFIX}{}-{millis}-{seq}", std::process::id())
}
