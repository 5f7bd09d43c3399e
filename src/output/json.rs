//! JSON output for `--json`.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "hash": "af13...", "size": 5, "files": ["/tmp/a.txt", "/tmp/b.txt"] }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "total_size": 15,
//!     "eliminated_by_size": 0,
//!     "hashed_files": 3,
//!     "duplicate_groups": 1,
//!     "duplicate_files": 1,
//!     "reclaimable_space": 5,
//!     "scan_duration_ms": 2,
//!     "scan_errors": [],
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Member paths in discovery order
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            files: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    pub total_files: usize,
    pub total_size: u64,
    pub eliminated_by_size: usize,
    pub hashed_files: usize,
    pub duplicate_groups: usize,
    pub duplicate_files: usize,
    pub reclaimable_space: u64,
    pub scan_duration_ms: u64,
    /// One message per file that could not be read
    pub scan_errors: Vec<String>,
    pub exit_code: i32,
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            eliminated_by_size: summary.eliminated_by_size,
            hashed_files: summary.hashed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            scan_errors: summary.scan_errors.iter().map(ToString::to_string).collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document for a finished scan.
    ///
    /// ```
    /// use dupesweep::duplicates::{DuplicateGroup, ScanSummary};
    /// use dupesweep::error::ExitCode;
    /// use dupesweep::output::json::JsonOutput;
    /// use std::path::PathBuf;
    ///
    /// let groups = vec![DuplicateGroup::new(
    ///     [0u8; 32],
    ///     1024,
    ///     vec![PathBuf::from("/file1.txt"), PathBuf::from("/file2.txt")],
    /// )];
    ///
    /// let output = JsonOutput::new(&groups, &ScanSummary::default(), ExitCode::Success);
    /// assert_eq!(output.duplicates.len(), 1);
    /// ```
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups.iter().map(JsonDuplicateGroup::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error while writing JSON: {0}")]
    Io(#[from] std::io::Error),
}
