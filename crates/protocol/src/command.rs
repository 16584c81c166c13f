use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A directive the vehicle understands.
///
/// The vocabulary is closed: anything that does not upper-case to one of
/// these tokens is rejected before it reaches the command log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommandWord {
    Left,
    Right,
    Forward,
    Stop,
    Back,
}

impl CommandWord {
    /// Every accepted word, in the order they are listed to users.
    pub const ALL: [CommandWord; 5] = [
        CommandWord::Left,
        CommandWord::Right,
        CommandWord::Forward,
        CommandWord::Stop,
        CommandWord::Back,
    ];

    /// Upper-case wire token.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandWord::Left => "LEFT",
            CommandWord::Right => "RIGHT",
            CommandWord::Forward => "FORWARD",
            CommandWord::Stop => "STOP",
            CommandWord::Back => "BACK",
        }
    }

    /// Comma-separated list of the vocabulary, for error details.
    pub fn vocabulary() -> String {
        Self::ALL
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CommandWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when free text does not name a known command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for CommandWord {
    type Err = UnknownCommand;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|w| w.as_str() == upper)
            .ok_or_else(|| UnknownCommand(s.trim().to_owned()))
    }
}

/// One accepted command submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub word: CommandWord,
    pub timestamp: DateTime<Local>,
}

/// Summary of the resident command window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommandStats {
    pub total_commands: usize,
    pub last_command: Option<CommandWord>,
    pub command_counts: BTreeMap<CommandWord, usize>,
    pub last_update: Option<DateTime<Local>>,
}
