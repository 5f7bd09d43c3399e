//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! [`Walker`] traverses a directory tree and yields a [`FileRecord`] for
//! every regular file it can stat. Directories are descended into but never
//! yielded. Symbolic links are not followed and not reported.
//!
//! Entries that fail to stat are yielded as [`ScanError`] values; iteration
//! continues past them.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{FileRecord, ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// Directory walker for parallel file discovery.
///
/// Children are sorted by name inside each directory, so discovery order is
/// stable between runs over an unchanged tree.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback, notified once per yielded file.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn passes_size_filter(&self, size: u64) -> bool {
        if size == 0 && self.config.skip_empty {
            return false;
        }
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupesweep::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(self.config.skip_hidden)
            .process_read_dir(|_depth, _path, _read_dir_state, children| {
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        let mut seen = 0usize;

        walk_dir
            .into_iter()
            .take_while(move |_| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    false
                } else {
                    true
                }
            })
            .filter_map(move |entry_result| {
                let item = match entry_result {
                    Ok(entry) => {
                        let path = entry.path();
                        if path == self.root {
                            return None;
                        }

                        let file_type = entry.file_type();
                        if file_type.is_dir() {
                            return None;
                        }
                        if file_type.is_symlink() {
                            log::trace!("Skipping symlink: {}", path.display());
                            return None;
                        }

                        self.stat_file(path)?
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), Path::to_path_buf);
                        Err(self.handle_jwalk_error(path, e))
                    }
                };

                if let (Ok(file), Some(callback)) = (&item, &self.progress_callback) {
                    seen += 1;
                    callback.on_progress(seen, file.path.to_string_lossy().as_ref());
                }

                Some(item)
            })
    }

    /// Stat a listed file. `None` means the entry is filtered out.
    fn stat_file(&self, path: PathBuf) -> Option<Result<FileRecord, ScanError>> {
        let metadata = match std::fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                let err = ScanError::from_io(&path, e);
                match err {
                    ScanError::NotFound(_) => {
                        log::debug!("File not found (may have been deleted): {}", path.display())
                    }
                    _ => log::warn!("Cannot stat {}: {}", path.display(), err),
                }
                return Some(Err(err));
            }
        };

        if !metadata.is_file() {
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        Some(Ok(FileRecord::new(path, size)))
    }

    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        let kind = error.io_error().map(std::io::Error::kind);
        ScanError::from_io(
            &path,
            std::io::Error::new(
                kind.unwrap_or(std::io::ErrorKind::Other),
                error.to_string(),
            ),
        )
    }
}
