//! Per-command execution results.

use std::time::Duration;

use crate::parser::ParsedRecord;

/// How one command in a batch ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Executed, and parsed if a kind was requested.
    Ok,

    /// The command ran but failed (non-zero exit or transport fault).
    ExecFailed(String),

    /// The per-command timeout expired.
    TimedOut,

    /// Output came back but the parser could not make sense of it.
    ParseFailed(String),
}

/// Result of one command. Immutable once returned.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// The command that was sent.
    pub command: String,

    /// Raw collected output (stdout).
    pub output: String,

    /// Exit status, when the device reported one.
    pub exit_status: Option<u32>,

    /// Wall-clock time spent on this command.
    pub elapsed: Duration,

    /// Success/failure tag.
    pub outcome: CommandOutcome,

    /// Structured records, when a parse kind was requested and parsing
    /// succeeded. Empty otherwise.
    pub records: Vec<ParsedRecord>,
}

impl CommandResult {
    pub fn is_ok(&self) -> bool {
        self.outcome == CommandOutcome::Ok
    }

    /// Iterate the raw output lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }
}
