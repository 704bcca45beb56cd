//! Read-only browsing position within the history.

use crate::history::HistoryStore;

/// Index of the history entry on display.
///
/// Browsing is not stored anywhere: the user is browsing exactly when the
/// cursor is not on the last history entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewCursor {
    index: usize,
}

/// What the navigation controls should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStatus {
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub browsing: bool,
    /// e.g. `Start/0`, `3.W/5`
    pub label: String,
}

impl ViewCursor {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_browsing(&self, history: &HistoryStore) -> bool {
        self.index != history.tail_index()
    }

    pub fn at_tail(&self, history: &HistoryStore) -> bool {
        self.index == history.tail_index()
    }

    /// Step one entry back. Returns false when already at the start.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step one entry forward. Returns false when already at the tail.
    pub fn forward(&mut self, history: &HistoryStore) -> bool {
        if self.index >= history.tail_index() {
            self.index = history.tail_index();
            return false;
        }
        self.index += 1;
        true
    }

    pub fn snap_to_tail(&mut self, history: &HistoryStore) {
        self.index = history.tail_index();
    }

    pub fn status(&self, history: &HistoryStore) -> NavigationStatus {
        let current = if self.index == 0 {
            "Start".to_string()
        } else {
            let move_number = self.index.div_ceil(2);
            let mover = if self.index % 2 == 1 { 'W' } else { 'B' };
            format!("{move_number}.{mover}")
        };
        let total_moves = history.tail_index().div_ceil(2);

        NavigationStatus {
            can_go_back: self.index > 0,
            can_go_forward: self.index < history.tail_index(),
            browsing: self.is_browsing(history),
            label: format!("{current}/{total_moves}"),
        }
    }
}
