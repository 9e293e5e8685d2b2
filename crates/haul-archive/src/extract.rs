use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::report::{ArchiveReport, EntryReport, EntryStatus};
use crate::{Error, Result};

type EntryCallback = Box<dyn FnMut(&EntryReport) + Send>;

/// Extract `zip_path` into `output_dir` without a callback.
pub fn unzip(zip_path: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<ArchiveReport> {
    Unzipper::new().extract(zip_path, output_dir)
}

/// Flattening zip extractor.
///
/// # Examples
///
/// ```no_run
/// use haul_archive::Unzipper;
///
/// let report = Unzipper::new()
///     .on_entry(|entry| println!("Unzipping: {}", entry.name))
///     .extract("downloads/tool.zip", "tools/bin")?;
/// assert!(report.is_complete());
/// # Ok::<(), haul_archive::Error>(())
/// ```
#[derive(Default)]
pub struct Unzipper {
    on_entry: Option<EntryCallback>,
}

impl std::fmt::Debug for Unzipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unzipper")
            .field("on_entry", &self.on_entry.is_some())
            .finish()
    }
}

impl Unzipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per file entry, after it was extracted or failed.
    #[must_use]
    pub fn on_entry(mut self, callback: impl FnMut(&EntryReport) + Send + 'static) -> Self {
        self.on_entry = Some(Box::new(callback));
        self
    }

    pub fn extract(
        &mut self,
        zip_path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<ArchiveReport> {
        let zip_path = zip_path.as_ref();
        let output_dir = output_dir.as_ref();

        if !zip_path.is_file() {
            return Err(Error::MissingArchive(zip_path.to_path_buf()));
        }
        fs::create_dir_all(output_dir).map_err(|source| Error::DirectoryCreationFailed {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let file = File::open(zip_path).map_err(|source| Error::Open {
            path: zip_path.to_path_buf(),
            source,
        })?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::Corrupted {
            path: zip_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let Some(report) = extract_entry(&mut archive, index, output_dir) else {
                continue;
            };
            match &report.status {
                EntryStatus::Extracted { bytes } => {
                    tracing::debug!(entry = %report.name, bytes, "entry extracted")
                }
                EntryStatus::Failed { reason } => {
                    tracing::warn!(entry = %report.name, %reason, "entry failed")
                }
            }
            if let Some(callback) = self.on_entry.as_mut() {
                callback(&report);
            }
            entries.push(report);
        }

        Ok(ArchiveReport {
            output_dir: output_dir.to_path_buf(),
            entries,
        })
    }
}

/// `None` for directory entries.
fn extract_entry(
    archive: &mut zip::ZipArchive<File>,
    index: usize,
    output_dir: &Path,
) -> Option<EntryReport> {
    let mut entry = match archive.by_index(index) {
        Ok(entry) => entry,
        Err(e) => {
            return Some(EntryReport {
                name: format!("#{index}"),
                target: None,
                status: EntryStatus::Failed {
                    reason: e.to_string(),
                },
            });
        }
    };
    if entry.is_dir() {
        return None;
    }

    let name = entry.name().to_string();
    let Some(target) = flattened_target(entry.enclosed_name(), output_dir) else {
        return Some(EntryReport {
            name,
            target: None,
            status: EntryStatus::Failed {
                reason: "unsafe entry path".to_string(),
            },
        });
    };

    let status = match write_entry(&mut entry, &target) {
        Ok(bytes) => EntryStatus::Extracted { bytes },
        Err(e) => EntryStatus::Failed {
            reason: e.to_string(),
        },
    };
    Some(EntryReport {
        name,
        target: Some(target),
        status,
    })
}

fn flattened_target(enclosed: Option<PathBuf>, output_dir: &Path) -> Option<PathBuf> {
    let file_name = enclosed?.file_name()?.to_os_string();
    Some(output_dir.join(file_name))
}

fn write_entry(reader: &mut impl io::Read, target: &Path) -> io::Result<u64> {
    let mut out = File::create(target)?;
    io::copy(reader, &mut out)
}
