//! Command-line interface definitions for dupesweep.
//!
//! # Example
//!
//! ```bash
//! # Scan and resolve interactively
//! dupesweep ~/Downloads
//!
//! # Only list the groups
//! dupesweep ~/Downloads --list
//!
//! # Rehearse a session without deleting anything
//! dupesweep ~/Downloads --dry-run --min-size 1MB
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find duplicate files and decide, group by group, which copies to delete.
///
/// Files are grouped by size first; only files sharing a size are hashed
/// (BLAKE3). Each group is then presented with numbered members:
/// q = quit, s = skip, k = keep first, d 2,3 = delete members 2 and 3.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Configuration file (default: platform config dir/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of I/O threads for hashing (default: 4)
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Read block size for hashing (e.g., 64KiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub block_size: Option<u64>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Ignore empty files
    #[arg(long)]
    pub skip_empty: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Hash every file, not only files that share a size
    #[arg(long)]
    pub no_size_prefilter: bool,

    /// Report what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Refuse delete commands that select every copy of a group
    #[arg(long)]
    pub protect_last_copy: bool,

    /// Print the duplicate groups and exit without resolving them
    #[arg(long)]
    pub list: bool,

    /// Print the duplicate groups and summary as JSON (implies --list)
    #[arg(long)]
    pub json: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupesweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
