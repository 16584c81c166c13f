//! Command log error types.

use linetrace_history::HistoryError;

/// Errors produced when submitting to or reading from the command log.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command is empty")]
    Empty,

    #[error("invalid command: {word}")]
    Unknown { word: String },

    #[error("history error: {0}")]
    History(#[from] HistoryError),
}

impl CommandError {
    /// Whether the error was caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, CommandError::Empty | CommandError::Unknown { .. })
    }
}
