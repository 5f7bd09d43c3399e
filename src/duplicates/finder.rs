//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: collect every regular file under the root
//! 2. **Size grouping**: bucket files by size and drop unique sizes
//!    (see [`crate::duplicates::groups`])
//! 3. **Hashing**: stream-hash the remaining candidates on a bounded
//!    thread pool and bucket them by digest
//!
//! Hash workers only return `(candidate, result)` pairs; the calling thread
//! folds them into the digest map afterwards, so no mutable map is shared
//! between threads.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
//!
//! println!("Found {} duplicate groups", summary.duplicate_groups);
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::groups::{
    bucket_by_size, collect_duplicate_groups, group_by_size, Candidate, DuplicateGroup,
    HashGroups, SizeGroups,
};
use crate::progress::{ProgressCallback, PHASE_HASHING, PHASE_WALKING};
use crate::scanner::{
    hash_to_hex, FileRecord, HashError, Hasher, ScanError, Walker, WalkerConfig,
    DEFAULT_BLOCK_SIZE,
};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to bound open file descriptors and disk thrashing.
    pub io_threads: usize,
    /// Read block size used for every file in the run.
    pub block_size: usize,
    /// Skip hashing files whose size is unique. Disabling it hashes every
    /// file and must produce the same groups.
    pub size_prefilter: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("block_size", &self.block_size)
            .field("size_prefilter", &self.size_prefilter)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            block_size: DEFAULT_BLOCK_SIZE,
            size_prefilter: true,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the hashing block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Enable or disable the size pre-filter.
    #[must_use]
    pub fn with_size_prefilter(mut self, enabled: bool) -> Self {
        self.size_prefilter = enabled;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
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
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Files never hashed because their size was unique
    pub eliminated_by_size: usize,
    /// Files successfully hashed
    pub hashed_files: usize,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files (excluding the first copy of each group)
    pub duplicate_files: usize,
    /// Space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Non-fatal errors encountered during the scan
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Percentage of scanned bytes held by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }

    /// Whether any file was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that abort a scan.
///
/// Per-file problems never show up here; they land in
/// [`ScanSummary::scan_errors`].
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The root directory cannot be listed.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while opening the root.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Duplicate finder that orchestrates the detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new().with_block_size(config.block_size);
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The hasher shared by every file of this finder's runs.
    #[must_use]
    pub fn hasher(&self) -> &Hasher {
        &self.hasher
    }

    /// Find all duplicate files under the given directory.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist, is not a directory, or cannot be listed
    /// - The scan is interrupted by shutdown signal
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupesweep::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let finder = DuplicateFinder::with_defaults();
    /// match finder.find_duplicates(Path::new(".")) {
    ///     Ok((groups, summary)) => {
    ///         println!("Found {} duplicate groups", groups.len());
    ///         println!("Can reclaim {} bytes", summary.reclaimable_space);
    ///     }
    ///     Err(e) => eprintln!("Scan failed: {}", e),
    /// }
    /// ```
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let root = validate_root(path)?;

        log::info!("Starting duplicate scan of {}", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(&root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut files = Vec::new();
        let mut scan_errors = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) => scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (groups, mut summary) = self.find_duplicates_from_files(files)?;
        scan_errors.append(&mut summary.scan_errors);
        summary.scan_errors = scan_errors;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable, {} error(s)",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.scan_errors.len()
        );

        Ok((groups, summary))
    }

    /// Find duplicates among a pre-collected list of files.
    ///
    /// Records are treated as discovered in the order given.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Interrupted` if shutdown is requested.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let (groups, mut summary) = self.group_records(files)?;
        summary.scan_duration = start_time.elapsed();
        Ok((groups, summary))
    }

    /// Size grouping followed by hashing.
    fn group_records(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let (size_groups, size_stats) = if self.config.size_prefilter {
            group_by_size(files)
        } else {
            bucket_by_size(files)
        };

        let mut summary = ScanSummary {
            total_files: size_stats.total_files,
            total_size: size_stats.total_size,
            eliminated_by_size: size_stats.eliminated_unique,
            ..Default::default()
        };

        log::info!(
            "Found {} files ({}); {} share a size with another file ({:.1}% eliminated by size)",
            summary.total_files,
            summary.total_size_display(),
            size_stats.potential_duplicates,
            size_stats.elimination_rate()
        );

        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            return Ok((Vec::new(), summary));
        }

        let (hash_groups, hashed, errors) = self.hash_candidates(size_groups)?;
        summary.hashed_files = hashed;
        summary.scan_errors = errors.into_iter().map(ScanError::from).collect();

        let groups = collect_duplicate_groups(hash_groups);
        for group in &groups {
            log::debug!(
                "Duplicate group {}: {} files, {} bytes each",
                hash_to_hex(&group.hash),
                group.len(),
                group.size
            );
        }

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();

        Ok((groups, summary))
    }

    /// Hash every candidate on a bounded pool and bucket by digest.
    ///
    /// Returns the digest buckets, the number of files hashed, and the
    /// per-file errors.
    fn hash_candidates(
        &self,
        size_groups: SizeGroups,
    ) -> Result<(HashGroups, usize, Vec<HashError>), FinderError> {
        let candidates: Vec<Candidate> = size_groups.into_values().flatten().collect();
        let total = candidates.len();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_HASHING, total);
        }

        log::info!("Hashing {} candidate files", total);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads.max(1))
            .build();

        let done = AtomicUsize::new(0);
        let hash_one = |candidate: Candidate| {
            let result = self.hasher.full_hash(&candidate.path);
            if let Some(ref callback) = self.config.progress_callback {
                let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(current, candidate.path.to_string_lossy().as_ref());
            }
            (candidate, result)
        };

        let results: Vec<(Candidate, Result<_, HashError>)> = match pool {
            Ok(pool) => pool.install(|| candidates.into_par_iter().map(hash_one).collect()),
            Err(e) => {
                log::warn!(
                    "Failed to create I/O thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                candidates.into_par_iter().map(hash_one).collect()
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }

        if self.config.is_shutdown_requested() {
            log::info!("Hashing interrupted by shutdown signal");
            return Err(FinderError::Interrupted);
        }

        let mut hash_groups: HashGroups = HashMap::new();
        let mut errors = Vec::new();
        let mut hashed = 0usize;

        for (candidate, result) in results {
            match result {
                Ok(digest) => {
                    hashed += 1;
                    log::trace!("Hashed {}", candidate.path.display());
                    hash_groups.entry(digest).or_default().push(candidate);
                }
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", candidate.path.display(), e);
                    errors.push(e);
                }
            }
        }

        Ok((hash_groups, hashed, errors))
    }
}

/// Check the root and turn it into an absolute path.
fn validate_root(path: &Path) -> Result<PathBuf, FinderError> {
    let metadata = std::fs::metadata(path).map_err(|e| root_error(path, e))?;
    if !metadata.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }

    // Listing the root up front makes an untraversable root fatal instead
    // of a single walker warning.
    std::fs::read_dir(path).map_err(|e| root_error(path, e))?;

    std::path::absolute(path).map_err(|e| root_error(path, e))
}

fn root_error(path: &Path, error: std::io::Error) -> FinderError {
    match error.kind() {
        std::io::ErrorKind::NotFound => FinderError::PathNotFound(path.to_path_buf()),
        std::io::ErrorKind::PermissionDenied => FinderError::PermissionDenied(path.to_path_buf()),
        _ => FinderError::IoWithPath {
            path: path.to_path_buf(),
            source: error,
        },
    }
}
