use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::DownloadError;

/// What a successful download produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// The destination path the body was committed to.
    File(PathBuf),
    /// The buffered body, decoded as UTF-8 with lossy replacement.
    Text(String),
}

impl Payload {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Payload::File(path) => Some(path),
            Payload::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::File(_) => None,
            Payload::Text(text) => Some(text),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::File(path) => write!(f, "{}", path.display()),
            Payload::Text(text) => f.write_str(text),
        }
    }
}

/// The single terminal notification of a download session.
#[derive(Debug)]
pub struct DownloadResult {
    /// Number of attempts actually made.
    pub attempts: u32,
    pub outcome: Result<Payload, DownloadError>,
}

impl DownloadResult {
    pub fn error(&self) -> Option<&DownloadError> {
        self.outcome.as_ref().err()
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.outcome.as_ref().ok()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_outcome(self) -> Result<Payload, DownloadError> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_one_side_is_set() {
        let ok = DownloadResult {
            attempts: 3,
            outcome: Ok(Payload::File(PathBuf::from("/tmp/out/f.zip"))),
        };
        assert!(ok.error().is_none());
        assert_eq!(
            ok.payload().and_then(Payload::as_path),
            Some(Path::new("/tmp/out/f.zip"))
        );

        let failed = DownloadResult {
            attempts: 3,
            outcome: Err(DownloadError::Status(404)),
        };
        assert!(failed.payload().is_none());
        assert_eq!(
            failed.error().map(ToString::to_string).as_deref(),
            Some("Error status code: 404")
        );
    }

    #[test]
    fn test_payload_display() {
        assert_eq!(Payload::Text("v1.2.3".into()).to_string(), "v1.2.3");
        assert_eq!(Payload::File(PathBuf::from("a/b.zip")).to_string(), "a/b.zip");
        assert_eq!(Payload::Text("x".into()).as_path(), None);
    }
}
