//! File actions module.
//!
//! Removal of duplicate files chosen during resolution:
//! - Size verification to detect files modified since the scan
//! - Dry-run mode
//! - Batch operations that report failures per path
//!
//! ```no_run
//! use dupesweep::actions::{delete_batch, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let paths = vec![PathBuf::from("/dup1.txt"), PathBuf::from("/dup2.txt")];
//! let result = delete_batch(&paths, Some(1024), &DeleteConfig::default());
//! println!("{}", result.summary());
//! ```

pub mod delete;

pub use delete::{
    delete_batch, delete_file, BatchDeleteResult, DeleteConfig, DeleteError, DeleteResult,
};
