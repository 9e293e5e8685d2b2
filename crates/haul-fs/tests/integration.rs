use std::io::Write;

use haul_fs::{ArtifactState, TEMP_PREFIX, TempArtifact, registry, sweep_dir};
use tempfile::tempdir;

#[test]
fn test_retry_cycle_then_commit() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("release").join("tool.zip");
    std::fs::create_dir_all(dest.parent().unwrap()).unwrap();

    let mut artifact = TempArtifact::create(dir.path()).unwrap();
    assert!(registry().is_live(artifact.path()));

    // a failed attempt leaves a short file behind
    artifact.reopen().unwrap().write_all(b"trunc").unwrap();
    artifact.close();

    // the retry starts over on the same path
    let mut file = artifact.reopen().unwrap();
    file.write_all(b"complete body").unwrap();
    drop(file);
    artifact.close();
    assert_eq!(artifact.state(), ArtifactState::Closed);

    let temp_path = artifact.path().to_path_buf();
    artifact.commit(&dest).unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"complete body");
    assert!(!temp_path.exists());
    assert!(!registry().is_live(&temp_path));
}

#[test]
fn test_orphan_from_crashed_run_is_swept() {
    let dir = tempdir().unwrap();

    let artifact = TempArtifact::create(dir.path()).unwrap();
    let orphan = artifact.path().to_path_buf();
    // simulate abnormal termination: no destructor runs
    std::mem::forget(artifact);
    assert!(orphan.exists());

    assert_eq!(sweep_dir(dir.path()).unwrap(), 1);
    assert!(!orphan.exists());

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().starts_with(TEMP_PREFIX))
        .collect();
    assert!(leftovers.is_empty());
}
