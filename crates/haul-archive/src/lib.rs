//! Zip extraction for downloaded release packages.
//!
//! Entries are written flattened into the output directory: only the file
//! name of each entry is kept, directories are skipped, and existing files
//! are overwritten. Each entry succeeds or fails on its own; the returned
//! [`ArchiveReport`] is the completion signal.

mod error;
mod extract;
mod report;

pub use error::{Error, Result};
pub use extract::{Unzipper, unzip};
pub use report::{ArchiveReport, EntryReport, EntryStatus};
