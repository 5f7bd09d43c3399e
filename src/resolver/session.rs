//! Resolution state machine.
//!
//! # Overview
//!
//! [`Resolver`] walks the duplicate groups in scan order. For the current
//! group it accepts one decoded [`Command`]:
//!
//! - an invalid command leaves the state unchanged (same group is presented
//!   again)
//! - `Skip`, `KeepFirst` and `Delete` record a [`GroupOutcome`] and advance
//! - `Quit` ends the session; later groups are never touched
//!
//! Indices always refer to the member list as presented, so deleting
//! member 2 never shifts what "3" means within the same command.
//!
//! # Example
//!
//! ```
//! use dupesweep::actions::DeleteConfig;
//! use dupesweep::duplicates::DuplicateGroup;
//! use dupesweep::resolver::{Command, Resolver, ResolverConfig};
//! use std::path::PathBuf;
//!
//! let groups = vec![DuplicateGroup::new(
//!     [0u8; 32],
//!     5,
//!     vec![PathBuf::from("/a.txt"), PathBuf::from("/b.txt")],
//! )];
//!
//! let config = ResolverConfig::default().with_delete_config(DeleteConfig::dry_run());
//! let mut resolver = Resolver::new(groups, config);
//! assert_eq!(resolver.current().unwrap().number, 1);
//!
//! resolver.apply(Command::Skip).unwrap();
//! assert!(resolver.is_finished());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;

use super::command::{Command, CommandError};
use crate::actions::{delete_batch, BatchDeleteResult, DeleteConfig};
use crate::duplicates::DuplicateGroup;

/// Resolver configuration.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// How deletions are carried out.
    pub delete: DeleteConfig,
    /// Reject a delete that selects every member of a group.
    pub protect_last_copy: bool,
    /// Raised by Ctrl+C; a raised flag ends the session like `quit`.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl ResolverConfig {
    /// Set the deletion configuration.
    #[must_use]
    pub fn with_delete_config(mut self, delete: DeleteConfig) -> Self {
        self.delete = delete;
        self
    }

    /// Enable/disable last-copy protection.
    #[must_use]
    pub fn with_protect_last_copy(mut self, protect: bool) -> Self {
        self.protect_last_copy = protect;
        self
    }

    /// Set the shutdown flag checked after every operator line.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Read-only view of the group awaiting a command.
#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a> {
    /// 1-based group number
    pub number: usize,
    /// Number of groups in the session
    pub total: usize,
    /// The group itself
    pub group: &'a DuplicateGroup,
}

impl<'a> GroupView<'a> {
    /// Members paired with their 1-based indices.
    pub fn members(&self) -> impl Iterator<Item = (usize, &'a Path)> + 'a {
        self.group
            .paths
            .iter()
            .enumerate()
            .map(|(i, p)| (i + 1, p.as_path()))
    }
}

/// What was decided for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Left untouched
    Skipped,
    /// Every member but the first was selected for deletion
    KeptFirst,
    /// Members chosen by index were selected for deletion
    DeletedSelected,
}

/// Outcome of one resolved group.
#[derive(Debug)]
pub struct GroupOutcome {
    /// 1-based group number
    pub number: usize,
    /// Decision taken
    pub resolution: Resolution,
    /// Per-path deletion results (empty for skipped groups)
    pub deletions: BatchDeleteResult,
}

/// Everything that happened during a session.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// Outcomes of the groups that received a command, in order
    pub outcomes: Vec<GroupOutcome>,
    /// Whether the operator quit before the last group
    pub quit: bool,
    /// Groups never presented or left when quitting
    pub untouched_groups: usize,
    /// Whether deletions were simulated
    pub dry_run: bool,
}

impl ResolutionReport {
    /// Files removed (or that would be removed in dry-run mode).
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| o.deletions.success_count())
            .sum()
    }

    /// Files whose deletion failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| o.deletions.failure_count())
            .sum()
    }

    /// Bytes freed (or that would be freed in dry-run mode).
    #[must_use]
    pub fn bytes_freed(&self) -> u64 {
        self.outcomes.iter().map(|o| o.deletions.bytes_freed).sum()
    }

    /// Number of groups skipped by the operator.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.resolution == Resolution::Skipped)
            .count()
    }

    /// One-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "Would delete" } else { "Deleted" };
        let mut line = format!(
            "{} {} file(s), freeing {}; {} failed; {} group(s) skipped",
            verb,
            self.deleted_count(),
            ByteSize::b(self.bytes_freed()),
            self.failed_count(),
            self.skipped_count()
        );
        if self.untouched_groups > 0 {
            line.push_str(&format!("; {} group(s) untouched", self.untouched_groups));
        }
        line
    }
}

/// Result of applying a valid command.
#[derive(Debug)]
pub enum Step<'a> {
    /// The group was resolved; the session moved on
    Resolved(&'a GroupOutcome),
    /// The operator ended the session
    Quit,
}

/// Interactive resolution state machine.
#[derive(Debug)]
pub struct Resolver {
    groups: Vec<DuplicateGroup>,
    position: usize,
    config: ResolverConfig,
    report: ResolutionReport,
}

impl Resolver {
    /// Start a session over `groups`, presented in the given order.
    #[must_use]
    pub fn new(groups: Vec<DuplicateGroup>, config: ResolverConfig) -> Self {
        let report = ResolutionReport {
            dry_run: config.delete.dry_run,
            ..Default::default()
        };
        Self {
            groups,
            position: 0,
            config,
            report,
        }
    }

    /// Number of groups in the session.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Whether the session reached a terminal state.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.report.quit || self.position >= self.groups.len()
    }

    /// The group awaiting a command, if any.
    #[must_use]
    pub fn current(&self) -> Option<GroupView<'_>> {
        if self.is_finished() {
            return None;
        }
        self.groups.get(self.position).map(|group| GroupView {
            number: self.position + 1,
            total: self.groups.len(),
            group,
        })
    }

    /// Apply a command to the current group.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the command does not fit the current
    /// group; nothing is deleted and the same group stays current.
    pub fn apply(&mut self, command: Command) -> Result<Step<'_>, CommandError> {
        let Some(group) = self.groups.get(self.position) else {
            return Ok(Step::Quit);
        };
        if self.report.quit {
            return Ok(Step::Quit);
        }

        command.validate(group.len(), self.config.protect_last_copy)?;

        let number = self.position + 1;
        let (resolution, selected): (Resolution, Vec<PathBuf>) = match command {
            Command::Quit => {
                log::info!("Session ended at group {} of {}", number, self.groups.len());
                self.report.quit = true;
                self.report.untouched_groups = self.groups.len() - self.position;
                return Ok(Step::Quit);
            }
            Command::Skip => (Resolution::Skipped, Vec::new()),
            Command::KeepFirst => (
                Resolution::KeptFirst,
                group.paths.iter().skip(1).cloned().collect(),
            ),
            Command::Delete(indices) => (
                Resolution::DeletedSelected,
                indices
                    .iter()
                    .filter_map(|&i| group.path_at(i))
                    .map(Path::to_path_buf)
                    .collect(),
            ),
        };

        log::debug!(
            "Group {}: {:?}, {} path(s) selected",
            number,
            resolution,
            selected.len()
        );

        let deletions = delete_batch(&selected, Some(group.size), &self.config.delete);
        self.report.outcomes.push(GroupOutcome {
            number,
            resolution,
            deletions,
        });
        self.position += 1;

        match self.report.outcomes.last() {
            Some(outcome) => Ok(Step::Resolved(outcome)),
            None => Ok(Step::Quit),
        }
    }

    /// Whether Ctrl+C was pressed since the session started.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.config.is_shutdown_requested()
    }

    /// Report of the session so far.
    #[must_use]
    pub fn report(&self) -> &ResolutionReport {
        &self.report
    }

    /// Finish the session and take its report.
    #[must_use]
    pub fn into_report(self) -> ResolutionReport {
        self.report
    }
}
