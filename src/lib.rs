//! dupesweep - duplicate file finder with an interactive resolver.
//!
//! A scan walks a directory tree, buckets files by size, hashes only the
//! files that share a size, and reports groups of byte-identical files. The
//! resolver then presents each group and applies one operator command per
//! group: quit, skip, keep the first copy, or delete chosen members.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod resolver;
pub mod scanner;
pub mod signal;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::Cli;
use crate::config::Settings;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{text, JsonOutput};
use crate::progress::Progress;
use crate::resolver::{resolve, TerminalConsole};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the root cannot be
/// scanned, the scan is interrupted, or the console fails.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let settings = Settings::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_cli_overrides(&cli)
        .normalized()?;
    log::debug!("Effective settings: {:?}", settings);

    let shutdown = signal::install_handler()?;
    let show_progress = !cli.quiet && !cli.json && io::stderr().is_terminal();
    let colors = !cli.no_color && io::stdout().is_terminal();

    let finder_config = settings
        .finder_config()
        .with_shutdown_flag(shutdown.get_flag())
        .with_progress_callback(Arc::new(Progress::new(!show_progress)));
    let finder = DuplicateFinder::new(finder_config);

    let (groups, summary) = finder
        .find_duplicates(&cli.path)
        .with_context(|| format!("Failed to scan {}", cli.path.display()))?;
    shutdown.end_scan();

    let exit_code = if groups.is_empty() {
        ExitCode::NoDuplicates
    } else if summary.has_errors() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    let mut stdout = io::stdout();
    if cli.json {
        JsonOutput::new(&groups, &summary, exit_code).write_to(&mut stdout)?;
        return Ok(exit_code);
    }

    if !cli.quiet {
        text::write_summary(&mut stdout, &summary, colors)?;
    }

    if groups.is_empty() {
        if !cli.quiet {
            writeln!(stdout, "No duplicates found.")?;
        }
        return Ok(exit_code);
    }

    if cli.list {
        text::write_groups(&mut stdout, &groups, colors)?;
        return Ok(exit_code);
    }

    let mut console = TerminalConsole::stdio().with_colors(colors);
    let resolver_config = settings
        .resolver_config()
        .with_shutdown_flag(shutdown.get_flag());
    resolve(groups, &mut console, resolver_config)?;

    Ok(exit_code)
}
