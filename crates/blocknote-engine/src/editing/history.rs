//! Bounded undo/redo over whole-store snapshots.
//!
//! Each entry is a full deep copy of the [`BlockStore`] with rendered HTML
//! stripped; restoring is a clone, never a replay.

use std::collections::VecDeque;

use crate::editing::BlockStore;

/// Entry cap; the oldest entry is dropped silently once exceeded
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<BlockStore>,
    /// Entry the live store currently corresponds to
    cursor: usize,
    limit: usize,
}

impl History {
    /// History holding at most `limit` entries (at least one)
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record `store` as the newest state.
    ///
    /// Any redo branch beyond the cursor is discarded first.
    pub fn snapshot(&mut self, store: &BlockStore) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(store.detached());
        if self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        log::debug!(
            "history snapshot: {} entries, cursor {}",
            self.entries.len(),
            self.cursor
        );
    }

    /// Step back one entry and return a copy of it to restore
    pub fn undo(&mut self) -> Option<BlockStore> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        log::debug!("history undo to {}", self.cursor);
        self.entries.get(self.cursor).cloned()
    }

    /// Step forward one entry and return a copy of it to restore
    pub fn redo(&mut self) -> Option<BlockStore> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        log::debug!("history redo to {}", self.cursor);
        self.entries.get(self.cursor).cloned()
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.entries.is_empty() && self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, `None` while empty
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
