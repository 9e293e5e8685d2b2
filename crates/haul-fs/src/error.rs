use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create '{path}': {source}")]
    Create { path: PathBuf, source: io::Error },

    #[error("failed to open '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("failed to read metadata of '{path}': {source}")]
    Metadata { path: PathBuf, source: io::Error },

    #[error("failed to rename '{from}' to '{to}': {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("failed to read directory '{path}': {source}")]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("artifact '{0}' was already committed or removed")]
    NotLive(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
