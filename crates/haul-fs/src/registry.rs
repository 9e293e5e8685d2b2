use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::{Error, Result, TEMP_PREFIX};

static REGISTRY: Lazy<CleanupRegistry> = Lazy::new(CleanupRegistry::new);

/// The process-wide registry every [`TempArtifact::create`](crate::TempArtifact::create) reports to.
pub fn registry() -> &'static CleanupRegistry {
    &REGISTRY
}

#[derive(Debug, Default)]
struct Tracked {
    live: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
}

/// Live temporary artifacts and the directories they were created in.
///
/// [`sweep`](Self::sweep) removes every prefixed file in the tracked
/// directories, not only the live paths, so orphans left by other processes
/// are collected as well.
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    tracked: Mutex<Tracked>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tracked> {
        self.tracked.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn track_dir(&self, dir: &Path) {
        self.lock().dirs.insert(dir.to_path_buf());
    }

    pub fn register(&self, path: &Path) {
        self.lock().live.insert(path.to_path_buf());
    }

    pub fn deregister(&self, path: &Path) -> bool {
        self.lock().live.remove(path)
    }

    pub fn is_live(&self, path: &Path) -> bool {
        self.lock().live.contains(path)
    }

    pub fn live(&self) -> Vec<PathBuf> {
        self.lock().live.iter().cloned().collect()
    }

    pub fn tracked_dirs(&self) -> Vec<PathBuf> {
        self.lock().dirs.iter().cloned().collect()
    }

    /// Remove all prefixed files from the tracked directories and forget the
    /// live set. Returns the number of files removed.
    pub fn sweep(&self) -> usize {
        let (live, dirs) = {
            let mut tracked = self.lock();
            (std::mem::take(&mut tracked.live), tracked.dirs.clone())
        };

        let mut removed = 0;
        for dir in &dirs {
            match sweep_dir(dir) {
                Ok(count) => removed += count,
                Err(e) => tracing::warn!(error = %e, "cleanup sweep skipped a directory"),
            }
        }
        // live paths whose directory could not be listed
        for path in live {
            if remove_quietly(&path) {
                removed += 1;
            }
        }

        tracing::debug!(removed, "cleanup sweep finished");
        removed
    }
}

/// Remove every regular file in `dir` whose name starts with [`TEMP_PREFIX`].
pub fn sweep_dir(dir: impl AsRef<Path>) -> Result<usize> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(TEMP_PREFIX) {
            continue;
        }
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && remove_quietly(&entry.path()) {
            removed += 1;
        }
    }
    Ok(removed)
}

fn remove_quietly(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove temp file");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sweep_dir_only_touches_prefixed_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(format!("{TEMP_PREFIX}1-2-3")), "partial").unwrap();
        fs::write(dir.path().join(format!("{TEMP_PREFIX}other-run")), "orphan").unwrap();
        fs::write(dir.path().join("keep.zip"), "done").unwrap();
        fs::create_dir(dir.path().join(format!("{TEMP_PREFIX}dir"))).unwrap();

        assert_eq!(sweep_dir(dir.path()).unwrap(), 2);
        assert!(dir.path().join("keep.zip").exists());
        assert!(dir.path().join(format!("{TEMP_PREFIX}dir")).is_dir());
    }

    #[test]
    fn test_sweep_dir_missing_directory() {
        let dir = tempdir().unwrap();
        let err = sweep_dir(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::ReadDir { .. }));
    }

    #[test]
    fn test_register_and_deregister() {
        let reg = CleanupRegistry::new();
        let path = Path::new("/tmp/.haul-partial-x");
        reg.register(path);
        assert!(reg.is_live(path));
        assert!(reg.deregister(path));
        assert!(!reg.deregister(path));
        assert!(reg.live().is_empty());
    }

    #[test]
    fn test_sweep_clears_live_set_and_tracked_dirs() {
        let dir = tempdir().unwrap();
        let reg = CleanupRegistry::new();
        let live = dir.path().join(format!("{TEMP_PREFIX}live"));
        fs::write(&live, "x").unwrap();
        fs::write(dir.path().join(format!("{TEMP_PREFIX}stale")), "y").unwrap();
        reg.track_dir(dir.path());
        reg.register(&live);

        assert_eq!(reg.sweep(), 2);
        assert!(reg.live().is_empty());
        assert!(!live.exists());
        assert_eq!(reg.tracked_dirs(), vec![dir.path().to_path_buf()]);
    }
}
