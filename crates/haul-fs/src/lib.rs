//! Crash-safe temporary artifacts for partial downloads.
//!
//! A [`TempArtifact`] is the only on-disk trace of an in-flight download. It
//! lives under a recognizable [`TEMP_PREFIX`] so that a [`CleanupRegistry`]
//! sweep (or [`sweep_dir`] on a later run) can find and remove it, and it
//! becomes visible at its destination only through an atomic rename.

mod artifact;
mod error;
mod registry;

pub use artifact::{ArtifactState, TempArtifact};
pub use error::{Error, Result};
pub use registry::{CleanupRegistry, registry, sweep_dir};

/// File name prefix shared by every temporary artifact.
pub const TEMP_PREFIX: &str = ".haul-partial-";
