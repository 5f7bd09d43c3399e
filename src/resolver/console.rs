//! Operator console.
//!
//! The [`Console`] trait is the only place the resolver touches the
//! operator. [`TerminalConsole`] renders to any writer and reads from any
//! buffered reader, so tests can script a whole session with
//! `std::io::Cursor`.

use std::io::{self, BufRead, Write};

use bytesize::ByteSize;
use yansi::{Condition, Paint};

use super::command::CommandError;
use super::session::{GroupOutcome, GroupView, Resolution, ResolutionReport};

/// Operator-facing input and output for a resolution session.
pub trait Console {
    /// Present a group and its numbered members.
    fn show_group(&mut self, view: &GroupView<'_>) -> io::Result<()>;

    /// Read one command line. `Ok(None)` means end of input.
    fn read_command(&mut self) -> io::Result<Option<String>>;

    /// Report a rejected command before the group is shown again.
    fn show_error(&mut self, error: &CommandError) -> io::Result<()>;

    /// Report what happened to a resolved group.
    fn show_outcome(&mut self, outcome: &GroupOutcome) -> io::Result<()>;

    /// Report the end of the session.
    fn show_summary(&mut self, report: &ResolutionReport) -> io::Result<()>;
}

/// Line-oriented console over a reader/writer pair.
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
    colors: Condition,
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    /// Create a console without colors.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            colors: Condition::NEVER,
        }
    }

    /// Enable/disable ANSI colors.
    #[must_use]
    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.colors = if enabled {
            Condition::ALWAYS
        } else {
            Condition::NEVER
        };
        self
    }

    /// Give back the underlying writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl TerminalConsole<io::StdinLock<'static>, io::Stdout> {
    /// Console bound to the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn show_group(&mut self, view: &GroupView<'_>) -> io::Result<()> {
        let c = self.colors;
        writeln!(self.output)?;
        writeln!(
            self.output,
            "{} ({} files, {} each) {}",
            format!("Group {}/{}", view.number, view.total).bold().whenever(c),
            view.group.len(),
            ByteSize::b(view.group.size),
            view.group.hash_hex().dim().whenever(c)
        )?;
        for (index, path) in view.members() {
            writeln!(
                self.output,
                "  {} {}",
                format!("[{}]", index).cyan().whenever(c),
                path.display()
            )?;
        }
        write!(
            self.output,
            "{} ",
            "[q]uit [s]kip [k]eep-first [d]elete <n,...>:".yellow().whenever(c)
        )?;
        self.output.flush()
    }

    fn read_command(&mut self) -> io::Result<Option<String>> {
        // bytes, not read_line: a non-UTF-8 line is a bad command, not a dead console
        let mut line = Vec::new();
        match self.input.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ => Ok(Some(String::from_utf8_lossy(&line).into_owned())),
        }
    }

    fn show_error(&mut self, error: &CommandError) -> io::Result<()> {
        writeln!(self.output, "{}", error.to_string().red().whenever(self.colors))
    }

    fn show_outcome(&mut self, outcome: &GroupOutcome) -> io::Result<()> {
        let c = self.colors;
        if outcome.resolution == Resolution::Skipped {
            return writeln!(self.output, "{}", "Skipped".dim().whenever(c));
        }

        for result in &outcome.deletions.successes {
            let verb = if result.dry_run { "Would delete" } else { "Deleted" };
            writeln!(
                self.output,
                "  {} {}",
                verb.green().whenever(c),
                result.path.display()
            )?;
        }
        for (path, error) in &outcome.deletions.failures {
            writeln!(
                self.output,
                "  {} {}: {}",
                "Failed".red().whenever(c),
                path.display(),
                error
            )?;
        }
        Ok(())
    }

    fn show_summary(&mut self, report: &ResolutionReport) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", report.summary().bold().whenever(self.colors))
    }
}
