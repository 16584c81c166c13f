use std::sync::{Mutex, MutexGuard};

use crate::HistoryError;
use crate::buffer::RingBuffer;

struct State<T> {
    records: RingBuffer<T>,
    /// Lifetime number of appends. Never reset, so sequence numbers handed
    /// to `append_with` are never reused.
    appended: u64,
}

/// A bounded, insertion-ordered history shared between request handlers.
///
/// Every operation runs under one mutex: an append and the eviction it
/// causes are observed atomically by readers. The guard is held only for
/// in-memory work and must never be held across an `.await`.
pub struct History<T> {
    name: &'static str,
    capacity: usize,
    state: Mutex<State<T>>,
}

impl<T: Clone> History<T> {
    /// Create an empty history. `name` tags log output.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            state: Mutex::new(State {
                records: RingBuffer::new(capacity),
                appended: 0,
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State<T>>, HistoryError> {
        self.state.lock().map_err(|_| {
            tracing::error!(history = self.name, "history lock poisoned");
            HistoryError::Poisoned
        })
    }

    /// Append a record built from the next sequence number (starting at 1).
    ///
    /// `build` runs under the guard, so sequence numbers are assigned in the
    /// same order records land in the buffer. Returns the stored record.
    pub fn append_with<F>(&self, build: F) -> Result<T, HistoryError>
    where
        F: FnOnce(u64) -> T,
    {
        let mut state = self.lock()?;
        state.appended += 1;
        let record = build(state.appended);
        let evicted = state.records.push(record.clone());
        if evicted > 0 {
            tracing::trace!(history = self.name, evicted, "evicted oldest records");
        }
        Ok(record)
    }

    /// Append a record that needs no sequence number.
    pub fn append(&self, record: T) -> Result<T, HistoryError> {
        self.append_with(|_| record)
    }

    /// The most recently appended record, or `None` when empty.
    ///
    /// Eviction only drops from the head, so the newest resident record is
    /// always the last one appended.
    pub fn latest(&self) -> Result<Option<T>, HistoryError> {
        Ok(self.lock()?.records.last().cloned())
    }

    /// Up to `limit` records, newest first.
    pub fn newest_first(&self, limit: usize) -> Result<Vec<T>, HistoryError> {
        let state = self.lock()?;
        Ok(state.records.iter().rev().take(limit).cloned().collect())
    }

    /// The newest `n` records in insertion order.
    pub fn tail(&self, n: usize) -> Result<Vec<T>, HistoryError> {
        let state = self.lock()?;
        Ok(state.records.tail(n).cloned().collect())
    }

    /// Every resident record, oldest first.
    pub fn snapshot(&self) -> Result<Vec<T>, HistoryError> {
        let state = self.lock()?;
        Ok(state.records.iter().cloned().collect())
    }

    /// Run a read-only view over the resident records under the guard.
    pub fn inspect<R, F>(&self, f: F) -> Result<R, HistoryError>
    where
        F: FnOnce(&RingBuffer<T>) -> R,
    {
        let state = self.lock()?;
        Ok(f(&state.records))
    }

    /// Drop every resident record and return how many were discarded.
    ///
    /// The sequence counter is left untouched.
    pub fn clear(&self) -> Result<usize, HistoryError> {
        let cleared = self.lock()?.records.clear();
        tracing::debug!(history = self.name, cleared, "history cleared");
        Ok(cleared)
    }

    /// Number of resident records.
    pub fn len(&self) -> Result<usize, HistoryError> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, HistoryError> {
        Ok(self.lock()?.records.is_empty())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of records ever appended.
    pub fn appended(&self) -> Result<u64, HistoryError> {
        Ok(self.lock()?.appended)
    }
}
