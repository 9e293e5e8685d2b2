use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryStatus {
    Extracted { bytes: u64 },
    Failed { reason: String },
}

/// Outcome of a single archive entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryReport {
    /// Entry name as stored in the archive.
    pub name: String,
    /// Where the entry was (or would have been) written.
    pub target: Option<PathBuf>,
    pub status: EntryStatus,
}

impl EntryReport {
    pub fn is_extracted(&self) -> bool {
        matches!(self.status, EntryStatus::Extracted { .. })
    }
}

#[derive(Clone, Debug)]
pub struct ArchiveReport {
    pub output_dir: PathBuf,
    pub entries: Vec<EntryReport>,
}

impl ArchiveReport {
    pub fn extracted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_extracted()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| !e.is_extracted())
    }

    pub fn total_bytes(&self) -> u64 {
        self.entries
            .iter()
            .map(|e| match e.status {
                EntryStatus::Extracted { bytes } => bytes,
                EntryStatus::Failed { .. } => 0,
            })
            .sum()
    }

    /// Every entry was extracted.
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}
