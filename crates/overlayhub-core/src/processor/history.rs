//! Bounded command history.

use parking_lot::Mutex;

use overlayhub_protocols::command::HistoryEntry;

/// Default high-water mark.
pub const DEFAULT_HIGH_WATER: usize = 1000;
/// Entries kept after truncation.
pub const DEFAULT_RETAIN: usize = 500;

/// In-memory command log.
///
/// When a push takes the log past `high_water` entries it is cut back to the
/// most recent `retain`, so truncation happens once per `high_water - retain`
/// pushes instead of on every insert.
pub struct CommandHistory {
    entries: Mutex<Vec<HistoryEntry>>,
    high_water: usize,
    retain: usize,
}

impl CommandHistory {
    pub fn new(high_water: usize, retain: usize) -> Self {
        let retain = retain.min(high_water);
        Self {
            entries: Mutex::new(Vec::with_capacity(high_water + 1)),
            high_water,
            retain,
        }
    }

    pub fn push(&self, entry: HistoryEntry) {
        let mut entries = self.entries.lock();
        entries.push(entry);
        if entries.len() > self.high_water {
            let excess = entries.len() - self.retain;
            entries.drain(..excess);
        }
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.lock();
        let start = entries.len().saturating_sub(limit);
        entries[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn high_water(&self) -> usize {
        self.high_water
    }

    pub fn retain(&self) -> usize {
        self.retain
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_WATER, DEFAULT_RETAIN)
    }
}
