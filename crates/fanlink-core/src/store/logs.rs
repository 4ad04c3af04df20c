// ── Rolling log buffer ──

use std::collections::VecDeque;

use serde::Serialize;

use crate::model::LogEntry;

/// Most log lines kept after a live append.
pub const LOG_CAPACITY: usize = 200;

/// Newest-first sequence of log entries.
///
/// Live appends go to the front and evict from the back beyond
/// [`LOG_CAPACITY`]. A pulled page replaces the whole buffer and is kept
/// at whatever length the controller returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    /// Live appends over the buffer's lifetime.
    #[serde(skip)]
    pushed: u64,
    /// How many entries at the front came from live appends.
    #[serde(skip)]
    live: usize,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_front(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(LOG_CAPACITY);
        self.pushed += 1;
        self.live = (self.live + 1).min(self.entries.len());
    }

    pub(crate) fn replace(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries.into();
        self.live = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, where 0 is the newest.
    pub fn get(&self, index: usize) -> Option<&LogEntry> {
        self.entries.get(index)
    }

    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Number of live appends so far. Pulled pages do not count.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// Entries appended after the buffer had seen `since` live appends,
    /// oldest first.
    ///
    /// Entries already evicted or wiped by a pulled page are not returned.
    pub fn pushed_since(&self, since: u64) -> impl Iterator<Item = &LogEntry> {
        let fresh = usize::try_from(self.pushed.saturating_sub(since)).unwrap_or(usize::MAX);
        self.entries.iter().take(fresh.min(self.live)).rev()
    }
}

impl From<Vec<LogEntry>> for LogBuffer {
    fn from(entries: Vec<LogEntry>) -> Self {
        Self {
            entries: entries.into(),
            ..Self::default()
        }
    }
}
