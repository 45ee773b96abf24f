//! # Search History
//!
//! Bounded, deduplicated queue of submitted search terms, most recent
//! first. Terms are recorded on explicit submission only, never per
//! keystroke.

use std::collections::VecDeque;

/// Maximum number of remembered terms.
pub const HISTORY_CAPACITY: usize = 5;

/// Most-recent-first list of unique, non-empty search terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    entries: VecDeque<String>,
}

impl SearchHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted term.
    ///
    /// The term is trimmed. Empty terms are ignored. A term already present
    /// moves to the front; otherwise it is prepended and the oldest entry
    /// beyond [`HISTORY_CAPACITY`] is evicted. Returns `true` if the
    /// history changed.
    pub fn record(&mut self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        if let Some(pos) = self.entries.iter().position(|e| e == term) {
            if pos == 0 {
                return false;
            }
            if let Some(existing) = self.entries.remove(pos) {
                self.entries.push_front(existing);
            }
            return true;
        }
        self.entries.push_front(term.to_string());
        self.entries.truncate(HISTORY_CAPACITY);
        true
    }

    /// Term at `index` (0 is the most recent).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate most-recent-first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Snapshot of the entries, most-recent-first.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
