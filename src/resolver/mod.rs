//! Interactive resolution of duplicate groups.
//!
//! This module provides:
//! - Command decoding ([`command`])
//! - The per-group state machine ([`session`])
//! - The operator console seam ([`console`])
//!
//! [`resolve`] ties them together: present a group, read a line, decode it,
//! apply it, repeat until the operator quits, input ends, Ctrl+C is
//! pressed, or no group is left.

pub mod command;
pub mod console;
pub mod session;

pub use command::{Command, CommandError};
pub use console::{Console, TerminalConsole};
pub use session::{
    GroupOutcome, GroupView, Resolution, ResolutionReport, Resolver, ResolverConfig, Step,
};

use crate::duplicates::DuplicateGroup;

/// Errors that abort a resolution session.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    /// Reading from or writing to the operator console failed.
    #[error("console I/O error: {0}")]
    Console(#[from] std::io::Error),
}

/// Run an interactive session over `groups`.
///
/// End of input is treated like `quit`, and so is a raised
/// [`ResolverConfig::shutdown_flag`] once the pending line has been read.
///
/// # Errors
///
/// Returns [`ResolveError::Console`] if the console fails. Deletion failures
/// are not errors; they are part of the returned report.
pub fn resolve<C: Console + ?Sized>(
    groups: Vec<DuplicateGroup>,
    console: &mut C,
    config: ResolverConfig,
) -> Result<ResolutionReport, ResolveError> {
    let mut resolver = Resolver::new(groups, config);
    log::info!("Resolving {} duplicate group(s)", resolver.group_count());

    while let Some(view) = resolver.current() {
        console.show_group(&view)?;

        let Some(line) = console.read_command()? else {
            log::debug!("Operator input closed, ending session");
            resolver.apply(Command::Quit).ok();
            break;
        };

        if resolver.is_interrupted() {
            log::info!("Interrupted, ending session");
            resolver.apply(Command::Quit).ok();
            break;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                log::debug!("Rejected input {:?}: {}", line.trim(), e);
                console.show_error(&e)?;
                continue;
            }
        };

        match resolver.apply(command) {
            Ok(Step::Resolved(outcome)) => console.show_outcome(outcome)?,
            Ok(Step::Quit) => break,
            Err(e) => console.show_error(&e)?,
        }
    }

    log::info!("{}", resolver.report().summary());
    let report = resolver.into_report();
    console.show_summary(&report)?;

    Ok(report)
}
