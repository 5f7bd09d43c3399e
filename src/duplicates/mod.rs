//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (unique sizes are never hashed)
//! - Streaming content hashing of the remaining candidates
//! - Duplicate group management

pub mod finder;
pub mod groups;

use std::path::Path;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{
    bucket_by_size, collect_duplicate_groups, group_by_size, Candidate, DuplicateGroup,
    GroupingStats, HashGroups, SizeGroups,
};

/// Scan `root` with default settings and return its duplicate groups.
///
/// # Errors
///
/// Returns [`FinderError`] if the root is missing, not a directory, or
/// cannot be listed.
pub fn scan(root: &Path) -> Result<Vec<DuplicateGroup>, FinderError> {
    DuplicateFinder::with_defaults()
        .find_duplicates(root)
        .map(|(groups, _)| groups)
}
