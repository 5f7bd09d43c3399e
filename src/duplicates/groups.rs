//! Size bucketing, digest bucketing and the resulting duplicate groups.
//!
//! # Overview
//!
//! Size grouping is the first phase of duplicate detection. Files with
//! different sizes cannot be duplicates, so only buckets holding two or more
//! files go on to be hashed. Digest grouping is the second phase: hashed
//! candidates are bucketed by digest and buckets with two or more members
//! become [`DuplicateGroup`]s.
//!
//! Every candidate carries its discovery sequence number, so member order
//! inside a group is traversal order no matter which worker finished first.
//!
//! # Example
//!
//! ```
//! use dupesweep::scanner::FileRecord;
//! use dupesweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);
//! assert_eq!(groups.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{hash_to_hex, Digest, FileRecord};

/// A file that survived size filtering, tagged with its discovery position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Position in traversal order (0-based)
    pub seq: usize,
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

/// Size → candidates, each bucket in discovery order.
pub type SizeGroups = HashMap<u64, Vec<Candidate>>;

/// Digest → candidates, each bucket in discovery order.
pub type HashGroups = HashMap<Digest, Vec<Candidate>>;

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique-sized
    pub eliminated_unique: usize,
    /// Number of size buckets with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size (first phase of duplicate detection).
///
/// Records are numbered in the order the iterator yields them.
///
/// # Returns
///
/// A tuple of:
/// - [`SizeGroups`] - Files grouped by size (only buckets with 2+ files)
/// - [`GroupingStats`] - Statistics about the grouping operation
///
/// # Example
///
/// ```
/// use dupesweep::scanner::FileRecord;
/// use dupesweep::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100),
///     FileRecord::new(PathBuf::from("/b.txt"), 100),
///     FileRecord::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (groups, stats) = group_by_size(files);
///
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[&100].len(), 2);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (SizeGroups, GroupingStats) {
    let (all_groups, mut stats) = bucket_by_size(files);
    stats.unique_sizes = all_groups.len();

    let filtered: SizeGroups = all_groups
        .into_iter()
        .filter(|(size, files)| {
            if files.len() == 1 {
                stats.eliminated_unique += 1;
                log::trace!(
                    "Eliminated unique size {}: {}",
                    size,
                    files[0].path.display()
                );
                false
            } else {
                stats.potential_duplicates += files.len();
                stats.duplicate_groups += 1;
                log::debug!(
                    "Size group {} bytes: {} potential duplicates",
                    size,
                    files.len()
                );
                true
            }
        })
        .collect();

    (filtered, stats)
}

/// Number and bucket records without discarding singletons.
///
/// Used when the size pre-filter is disabled and every file is hashed.
#[must_use]
pub fn bucket_by_size(files: impl IntoIterator<Item = FileRecord>) -> (SizeGroups, GroupingStats) {
    let mut groups: SizeGroups = HashMap::new();
    let mut stats = GroupingStats::default();

    for (seq, file) in files.into_iter().enumerate() {
        stats.total_files += 1;
        stats.total_size += file.size;
        groups.entry(file.size).or_default().push(Candidate {
            seq,
            path: file.path,
            size: file.size,
        });
    }

    stats.unique_sizes = groups.len();
    (groups, stats)
}

/// Turn digest buckets into duplicate groups.
///
/// Buckets with fewer than two members are dropped. Members keep discovery
/// order and groups are ordered by the discovery position of their first
/// member.
#[must_use]
pub fn collect_duplicate_groups(hash_groups: HashGroups) -> Vec<DuplicateGroup> {
    let mut groups: Vec<(usize, DuplicateGroup)> = hash_groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(digest, mut members)| {
            members.sort_by_key(|c| c.seq);
            let first_seq = members[0].seq;
            let size = members[0].size;
            let paths = members.into_iter().map(|c| c.path).collect();
            (first_seq, DuplicateGroup::new(digest, size, paths))
        })
        .collect();

    groups.sort_by_key(|(seq, _)| *seq);
    groups.into_iter().map(|(_, g)| g).collect()
}

/// Confirmed duplicate group of files.
///
/// All paths hashed to the same digest with the same block size. Paths are
/// in discovery order; index 0 is "the first copy".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 digest of the shared content
    pub hash: Digest,
    /// File size in bytes (shared by every member)
    pub size: u64,
    /// Member paths, at least two
    pub paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: Digest, size: u64, paths: Vec<PathBuf>) -> Self {
        Self { hash, size, paths }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Path at a 1-based display index.
    #[must_use]
    pub fn path_at(&self, index: usize) -> Option<&Path> {
        index
            .checked_sub(1)
            .and_then(|i| self.paths.get(i))
            .map(PathBuf::as_path)
    }
}
