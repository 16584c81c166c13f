use chrono::Local;

use linetrace_history::History;
use linetrace_protocol::constants::COMMAND_CAPACITY;
use linetrace_protocol::{CommandStats, CommandWord, LogEntry, UnknownCommand};

use crate::error::CommandError;
use crate::limit::LimitPolicy;

/// Bounded log of accepted commands.
///
/// Construct one per process and share it (behind an `Arc`) with every
/// request handler. Ids come from the history's lifetime sequence, so they
/// keep increasing after old entries are evicted or the log is cleared.
pub struct CommandLog {
    history: History<LogEntry>,
    limits: LimitPolicy,
}

impl CommandLog {
    /// Create a log with the default capacity (50 entries).
    pub fn new() -> Self {
        Self::with_capacity(COMMAND_CAPACITY)
    }

    /// Create a log holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: History::new("commands", capacity),
            limits: LimitPolicy::default(),
        }
    }

    /// Replace the listing limit policy.
    pub fn with_limits(mut self, limits: LimitPolicy) -> Self {
        self.limits = limits;
        self
    }

    /// Validate and record a command.
    ///
    /// Input is trimmed and matched case-insensitively; the stored word is
    /// the upper-case token. Rejected input never touches the history.
    pub fn submit(&self, input: &str) -> Result<LogEntry, CommandError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            tracing::warn!("rejected empty command");
            return Err(CommandError::Empty);
        }

        let word: CommandWord = trimmed.parse().map_err(|UnknownCommand(word)| {
            tracing::warn!(%word, "rejected unknown command");
            CommandError::Unknown { word }
        })?;

        let entry = self.history.append_with(|id| LogEntry {
            id,
            word,
            timestamp: Local::now(),
        })?;
        tracing::debug!(id = entry.id, word = %entry.word, "command accepted");
        Ok(entry)
    }

    /// The most recently accepted command, or `None` if the log is empty.
    pub fn latest_command(&self) -> Result<Option<CommandWord>, CommandError> {
        Ok(self.history.latest()?.map(|entry| entry.word))
    }

    /// Recent entries, newest first. See [`LimitPolicy::resolve`].
    pub fn recent(&self, limit: Option<i64>) -> Result<Vec<LogEntry>, CommandError> {
        let limit = self.limits.resolve(limit);
        Ok(self.history.newest_first(limit)?)
    }

    /// Aggregate the resident window.
    ///
    /// Counts cover resident entries only, so they decay as old entries are
    /// evicted.
    pub fn stats(&self) -> Result<CommandStats, CommandError> {
        let stats = self.history.inspect(|entries| {
            let mut stats = CommandStats {
                total_commands: entries.len(),
                last_command: entries.last().map(|e| e.word),
                last_update: entries.last().map(|e| e.timestamp),
                ..CommandStats::default()
            };
            for entry in entries.iter() {
                *stats.command_counts.entry(entry.word).or_insert(0) += 1;
            }
            stats
        })?;
        Ok(stats)
    }

    /// Empty the log, returning how many entries were discarded.
    pub fn clear(&self) -> Result<usize, CommandError> {
        let cleared = self.history.clear()?;
        tracing::info!(cleared, "command log cleared");
        Ok(cleared)
    }

    /// Whether any command is resident.
    pub fn is_active(&self) -> Result<bool, CommandError> {
        Ok(!self.history.is_empty()?)
    }

    pub fn len(&self) -> Result<usize, CommandError> {
        Ok(self.history.len()?)
    }

    pub fn is_empty(&self) -> Result<bool, CommandError> {
        Ok(self.history.is_empty()?)
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn accepts_and_normalizes_words() {
        let log = CommandLog::new();
        let entry = log.submit("  left ").unwrap();

        assert_eq!(entry.id, 1);
        assert_eq!(entry.word, CommandWord::Left);
        assert_eq!(log.latest_command().unwrap(), Some(CommandWord::Left));
    }

    #[test]
    fn rejects_empty_input_without_mutation() {
        let log = CommandLog::new();
        assert!(matches!(log.submit(""), Err(CommandError::Empty)));
        assert!(matches!(log.submit("   \t"), Err(CommandError::Empty)));
        assert_eq!(log.len().unwrap(), 0);
    }

    #[test]
    fn rejects_unknown_words_without_mutation() {
        let log = CommandLog::new();
        log.submit("stop").unwrap();

        let err = log.submit(" jump ").unwrap_err();
        assert!(err.is_validation());
        match err {
            CommandError::Unknown { word } => assert_eq!(word, "jump"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(log.len().unwrap(), 1);
        assert_eq!(log.latest_command().unwrap(), Some(CommandWord::Stop));
        // A rejected submission does not consume an id.
        assert_eq!(log.submit("back").unwrap().id, 2);
    }

    #[test]
    fn ids_keep_increasing_across_eviction() {
        let log = CommandLog::with_capacity(3);
        let ids: Vec<u64> = (0..10).map(|_| log.submit("forward").unwrap().id).collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let resident: Vec<u64> = log.recent(Some(10)).unwrap().iter().map(|e| e.id).collect();
        assert_eq!(resident, vec![10, 9, 8]);
    }

    #[test]
    fn capacity_bounds_resident_entries() {
        let log = CommandLog::new();
        for _ in 0..120 {
            log.submit("right").unwrap();
        }
        assert_eq!(log.len().unwrap(), 50);
        assert_eq!(log.capacity(), 50);
    }

    #[test]
    fn recent_is_newest_first_with_default_limit() {
        let log = CommandLog::new();
        for i in 0..30 {
            let word = if i % 2 == 0 { "left" } else { "right" };
            log.submit(word).unwrap();
        }

        let default = log.recent(None).unwrap();
        assert_eq!(default.len(), 20);
        assert_eq!(default[0].id, 30);
        assert_eq!(default[19].id, 11);

        assert_eq!(log.recent(Some(0)).unwrap(), default);
        assert_eq!(log.recent(Some(-5)).unwrap(), default);
        assert_eq!(log.recent(Some(5)).unwrap().len(), 5);
    }

    #[test]
    fn recent_clamps_to_max_limit() {
        let log = CommandLog::with_capacity(200);
        for _ in 0..150 {
            log.submit("stop").unwrap();
        }
        assert_eq!(log.recent(Some(500)).unwrap().len(), 100);
    }

    #[test]
    fn stats_on_empty_log() {
        let log = CommandLog::new();
        let stats = log.stats().unwrap();

        assert_eq!(stats.total_commands, 0);
        assert_eq!(stats.last_command, None);
        assert!(stats.command_counts.is_empty());
        assert_eq!(stats.last_update, None);
        assert!(!log.is_active().unwrap());
    }

    #[test]
    fn stats_counts_sum_to_total() {
        let log = CommandLog::new();
        for word in ["left", "LEFT", "stop", "forward", "left"] {
            log.submit(word).unwrap();
        }

        let stats = log.stats().unwrap();
        assert_eq!(stats.total_commands, 5);
        assert_eq!(stats.last_command, Some(CommandWord::Left));
        assert_eq!(stats.command_counts[&CommandWord::Left], 3);
        assert_eq!(stats.command_counts[&CommandWord::Stop], 1);
        assert_eq!(stats.command_counts.values().sum::<usize>(), stats.total_commands);

        let newest = log.recent(Some(1)).unwrap().remove(0);
        assert_eq!(stats.last_update, Some(newest.timestamp));
        assert!(log.is_active().unwrap());
    }

    #[test]
    fn stats_decay_with_eviction() {
        let log = CommandLog::with_capacity(3);
        log.submit("back").unwrap();
        for _ in 0..3 {
            log.submit("stop").unwrap();
        }

        let stats = log.stats().unwrap();
        assert_eq!(stats.total_commands, 3);
        assert!(!stats.command_counts.contains_key(&CommandWord::Back));
        assert_eq!(stats.command_counts[&CommandWord::Stop], 3);
    }

    #[test]
    fn clear_empties_but_keeps_id_sequence() {
        let log = CommandLog::new();
        for _ in 0..4 {
            log.submit("left").unwrap();
        }

        assert_eq!(log.clear().unwrap(), 4);
        assert!(log.is_empty().unwrap());
        assert_eq!(log.latest_command().unwrap(), None);
        assert_eq!(log.submit("right").unwrap().id, 5);
    }

    #[test]
    fn concurrent_submissions() {
        let log = Arc::new(CommandLog::new());
        let handles: Vec<_> = ["left", "right", "forward", "stop", "back"]
            .into_iter()
            .map(|word| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for _ in 0..40 {
                        log.submit(word).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = log.stats().unwrap();
        assert_eq!(stats.total_commands, 50);
        assert_eq!(stats.command_counts.values().sum::<usize>(), 50);
        let newest = log.recent(Some(1)).unwrap();
        assert_eq!(newest[0].id, 200);
    }
}
