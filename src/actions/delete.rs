//! Permanent file deletion with verification.
//!
//! # Overview
//!
//! This module removes duplicate files from disk:
//! - Size verification before deletion (TOCTOU protection)
//! - Dry-run mode that validates and reports without removing anything
//! - Batch operations where one failure never stops the rest
//!
//! # Safety
//!
//! Deletion is irreversible. Only regular files are removed; a path that
//! turned into a directory or symlink since the scan is refused.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::delete::{delete_file, DeleteConfig};
//! use std::path::Path;
//!
//! match delete_file(Path::new("/path/to/duplicate.txt"), Some(42), &DeleteConfig::default()) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File size changed since the scan.
    #[error("file modified since scan: {path} (expected {expected} bytes, found {actual})")]
    Modified {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Path no longer refers to a regular file.
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether the removal was only simulated.
    pub dry_run: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, dry_run: bool) -> Self {
        Self {
            path,
            size,
            dry_run,
        }
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their errors.
    pub failures: Vec<(PathBuf, DeleteError)>,
    /// Total bytes freed (or that would be freed in dry-run mode).
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    /// Report what would be deleted without touching the filesystem.
    pub dry_run: bool,
}

impl DeleteConfig {
    /// Create config for a dry run.
    #[must_use]
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Enable/disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Delete a single regular file.
///
/// When `expected_size` is given, a file whose current size differs is left
/// in place and reported as [`DeleteError::Modified`].
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `NotAFile` if the path is no longer a regular file
/// - `Modified` if the size changed since the scan
pub fn delete_file(
    path: &Path,
    expected_size: Option<u64>,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
    if !metadata.file_type().is_file() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }

    let size = metadata.len();
    if let Some(expected) = expected_size.filter(|&e| e != size) {
        log::warn!(
            "File modified since scan: {} (size changed from {} to {})",
            path.display(),
            expected,
            size
        );
        return Err(DeleteError::Modified {
            path: path.to_path_buf(),
            expected,
            actual: size,
        });
    }

    if config.dry_run {
        log::info!("Dry run, would delete: {} ({} bytes)", path.display(), size);
        return Ok(DeleteResult::new(path.to_path_buf(), size, true));
    }

    fs::remove_file(path).map_err(|e| {
        log::error!("Delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })?;

    log::info!("Deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Delete multiple files in batch.
///
/// Every path is attempted; a failure is recorded and the batch moves on.
/// All paths are expected to share `expected_size` (members of one
/// duplicate group).
pub fn delete_batch(
    paths: &[PathBuf],
    expected_size: Option<u64>,
    config: &DeleteConfig,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        match delete_file(path, expected_size, config) {
            Ok(del) => {
                result.bytes_freed += del.size;
                result.successes.push(del);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", path.display(), e);
                result.failures.push((path.clone(), e));
            }
        }
    }

    log::debug!("{}", result.summary());

    result
}
