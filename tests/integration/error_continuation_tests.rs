use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::scanner::{FileRecord, HashError, ScanError};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_find_duplicates_from_files_continues_on_error() {
    let finder = DuplicateFinder::with_defaults();
    let file1 = FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100);

    let (groups, summary) = finder
        .find_duplicates_from_files(vec![file1, file2])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);

    for err in &summary.scan_errors {
        match err {
            ScanError::HashError(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {:?}", err),
        }
    }
}

#[test]
fn test_unreadable_file_joins_no_group() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let gone = dir.path().join("gone");
    fs::write(&a, "same").unwrap();
    fs::write(&b, "same").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder
        .find_duplicates_from_files(vec![
            FileRecord::new(gone.clone(), 4),
            FileRecord::new(a.clone(), 4),
            FileRecord::new(b.clone(), 4),
        ])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![a, b]);
    assert_eq!(summary.scan_errors[0].path(), gone.as_path());
    assert_eq!(summary.hashed_files, 2);
}

#[cfg(unix)]
#[test]
fn test_permission_denied_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let locked = dir.path().join("locked");
    fs::write(&a, "same").unwrap();
    fs::write(&b, "same").unwrap();
    fs::write(&locked, "same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // root can read anything; nothing to check then
    if fs::read(&locked).is_ok() {
        return;
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 2);
    assert!(summary.has_errors());
    assert!(matches!(
        summary.scan_errors[0],
        ScanError::HashError(HashError::PermissionDenied(_))
    ));
}

#[test]
fn test_interrupted_scan_returns_no_partial_result() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::write(dir.path().join("b"), "same").unwrap();

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    assert!(matches!(
        finder.find_duplicates(dir.path()),
        Err(FinderError::Interrupted)
    ));
}
