//! Output formatters for scan results.
//!
//! - [`text`]: human-readable summary and group listing
//! - [`json`]: machine-readable document for `--json`

pub mod json;
pub mod text;

pub use json::JsonOutput;
