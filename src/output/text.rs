//! Plain-text rendering of scan results.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Print the scan summary block.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_summary<W: Write>(w: &mut W, summary: &ScanSummary, colors: bool) -> io::Result<()> {
    let c = condition(colors);
    writeln!(
        w,
        "{} {} files ({}) in {:.2?}",
        "Scanned".bold().whenever(c),
        summary.total_files,
        summary.total_size_display(),
        summary.scan_duration
    )?;
    writeln!(
        w,
        "  {} eliminated by size, {} hashed",
        summary.eliminated_by_size, summary.hashed_files
    )?;
    writeln!(
        w,
        "  {} duplicate group(s), {} redundant file(s), {} reclaimable ({:.1}%)",
        summary.duplicate_groups,
        summary.duplicate_files,
        summary.reclaimable_display().green().whenever(c),
        summary.wasted_percentage()
    )?;
    if summary.has_errors() {
        writeln!(
            w,
            "  {}",
            format!("{} file(s) could not be read", summary.scan_errors.len())
                .yellow()
                .whenever(c)
        )?;
    }
    Ok(())
}

/// Print every group with numbered members.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_groups<W: Write>(w: &mut W, groups: &[DuplicateGroup], colors: bool) -> io::Result<()> {
    let c = condition(colors);
    for (i, group) in groups.iter().enumerate() {
        writeln!(
            w,
            "{} ({} files, {} each) {}",
            format!("Group {}", i + 1).bold().whenever(c),
            group.len(),
            ByteSize::b(group.size),
            group.hash_hex().dim().whenever(c)
        )?;
        for (j, path) in group.paths.iter().enumerate() {
            writeln!(w, "  [{}] {}", j + 1, path.display())?;
        }
    }
    Ok(())
}

fn condition(colors: bool) -> Condition {
    if colors {
        Condition::ALWAYS
    } else {
        Condition::NEVER
    }
}
