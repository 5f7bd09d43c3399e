//! Operator command parsing.
//!
//! Input is trimmed and matched case-insensitively. Accepted forms:
//!
//! | Command       | Forms                        |
//! |---------------|------------------------------|
//! | Quit          | `q`, `quit`                  |
//! | Skip          | `s`, `skip`                  |
//! | Keep first    | `k`, `keep-first`            |
//! | Delete        | `d 2,3`, `d2 3`, `delete 2`  |
//!
//! Delete indices are 1-based and separated by commas and/or whitespace.
//! Range checks need the group size, so they happen in
//! [`Command::validate`], not during parsing.

use std::collections::BTreeSet;
use std::str::FromStr;

/// A decoded operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session; remaining groups stay untouched
    Quit,
    /// Leave the current group untouched
    Skip,
    /// Delete every member but the first
    KeepFirst,
    /// Delete the members at these 1-based indices (sorted, deduplicated)
    Delete(Vec<usize>),
}

/// Why an operator line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Blank line.
    #[error("no command entered")]
    Empty,

    /// Not one of the known commands.
    #[error("unrecognized command: '{0}'")]
    Unrecognized(String),

    /// `delete` without any index.
    #[error("delete needs at least one index, e.g. 'd 2,3'")]
    MissingIndices,

    /// An index token that is not a positive integer.
    #[error("invalid index: '{0}'")]
    InvalidIndex(String),

    /// An index outside `1..=max`.
    #[error("index {index} is out of range (1-{max})")]
    IndexOutOfRange { index: usize, max: usize },

    /// Every member was selected while the last copy is protected.
    #[error("refusing to delete every copy; keep at least one")]
    AllCopiesSelected,
}

impl Command {
    /// Parse one line of operator input.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the line is blank, unknown, or carries
    /// malformed indices.
    ///
    /// # Example
    ///
    /// ```
    /// use dupesweep::resolver::Command;
    ///
    /// assert_eq!(Command::parse(" K ").unwrap(), Command::KeepFirst);
    /// assert_eq!(Command::parse("d 3, 2 3").unwrap(), Command::Delete(vec![2, 3]));
    /// assert!(Command::parse("x").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let line = input.trim().to_lowercase();

        match line.as_str() {
            "" => Err(CommandError::Empty),
            "q" | "quit" => Ok(Self::Quit),
            "s" | "skip" => Ok(Self::Skip),
            "k" | "keep-first" => Ok(Self::KeepFirst),
            _ => parse_delete(&line)
                .ok_or_else(|| CommandError::Unrecognized(input.trim().to_string()))?,
        }
    }

    /// Check a parsed command against a group of `member_count` paths.
    ///
    /// With `protect_last_copy`, a delete that selects every member is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::IndexOutOfRange`] for the first index outside
    /// the group, or [`CommandError::AllCopiesSelected`].
    pub fn validate(
        &self,
        member_count: usize,
        protect_last_copy: bool,
    ) -> Result<(), CommandError> {
        let Self::Delete(indices) = self else {
            return Ok(());
        };

        if let Some(&index) = indices.iter().find(|&&i| i == 0 || i > member_count) {
            return Err(CommandError::IndexOutOfRange {
                index,
                max: member_count,
            });
        }

        if protect_last_copy && indices.len() >= member_count {
            return Err(CommandError::AllCopiesSelected);
        }

        Ok(())
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// `None` when the line is not a delete command at all.
fn parse_delete(line: &str) -> Option<Result<Command, CommandError>> {
    let rest = line
        .strip_prefix("delete")
        .or_else(|| line.strip_prefix('d'))?;

    // "dance" is not "d ance"
    if rest
        .chars()
        .next()
        .is_some_and(|c| !(c.is_whitespace() || c.is_ascii_digit() || c == ','))
    {
        return None;
    }

    let mut indices = BTreeSet::new();
    for token in rest
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.parse::<usize>() {
            Ok(index) => {
                indices.insert(index);
            }
            Err(_) => return Some(Err(CommandError::InvalidIndex(token.to_string()))),
        }
    }

    if indices.is_empty() {
        return Some(Err(CommandError::MissingIndices));
    }

    Some(Ok(Command::Delete(indices.into_iter().collect())))
}
