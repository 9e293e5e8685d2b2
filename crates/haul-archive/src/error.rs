use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot unzip. File does not exist: {}", .0.display())]
    MissingArchive(PathBuf),

    #[error("failed to open archive '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("archive '{path}' is corrupted: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("failed to create directory: {path}: {source}")]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_archive_message() {
        let err = Error::MissingArchive(PathBuf::from("/tmp/none.zip"));
        assert_eq!(err.to_string(), "Cannot unzip. File does not exist: /tmp/none.zip");
    }
}
