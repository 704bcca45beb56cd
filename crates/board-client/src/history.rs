//! Ordered record of the positions the server has confirmed.

use chess_core::Position;

use crate::error::HistoryError;

/// Confirmed positions for the current game, index 0 being the start.
///
/// Never empty, and never holds the same position twice in a row. The last
/// element is the live, authoritative position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    /// The position the game began from; always `positions[0]`.
    start: Position,
    positions: Vec<Position>,
}

impl HistoryStore {
    pub fn new(start: Position) -> Self {
        Self {
            positions: vec![start.clone()],
            start,
        }
    }

    pub fn reset(&mut self, start: Position) {
        self.positions.clear();
        self.positions.push(start.clone());
        self.start = start;
    }

    /// Append `position` unless it equals the current last one.
    /// Returns whether the history grew.
    pub fn append(&mut self, position: Position) -> bool {
        if *self.last() == position {
            return false;
        }
        self.positions.push(position);
        true
    }

    /// Remove and return the live position, exposing the previous one.
    pub fn pop_last(&mut self) -> Result<Position, HistoryError> {
        let len = self.positions.len();
        if len < 2 {
            return Err(HistoryError::TooShort { len });
        }
        self.positions.pop().ok_or(HistoryError::TooShort { len })
    }

    pub fn last(&self) -> &Position {
        self.positions.last().unwrap_or(&self.start)
    }

    pub fn at(&self, index: usize) -> Option<&Position> {
        self.positions.get(index)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Index of the live position.
    pub fn tail_index(&self) -> usize {
        self.positions.len() - 1
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(Position::start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn after_e4() -> Position {
        pos("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
    }

    #[test]
    fn test_append_skips_consecutive_duplicates() {
        let mut history = HistoryStore::default();
        assert!(!history.append(Position::start()));
        assert_eq!(history.len(), 1);

        assert!(history.append(after_e4()));
        assert!(!history.append(after_e4()));
        assert_eq!(history.len(), 2);
        assert_eq!(history.last(), &after_e4());

        // Not consecutive, so allowed
        assert!(history.append(Position::start()));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_pop_last_needs_two_entries() {
        let mut history = HistoryStore::default();
        assert!(matches!(
            history.pop_last(),
            Err(HistoryError::TooShort { len: 1 })
        ));

        history.append(after_e4());
        assert_eq!(history.pop_last().unwrap(), after_e4());
        assert_eq!(history.len(), 1);
        assert_eq!(history.last(), &Position::start());
    }

    #[test]
    fn test_reset_leaves_single_start() {
        let mut history = HistoryStore::default();
        history.append(after_e4());
        history.reset(Position::start());
        assert_eq!(history.positions(), &[Position::start()]);
        assert_eq!(history.tail_index(), 0);
        assert_eq!(history.at(1), None);
    }

    #[test]
    fn test_last_follows_reset_start() {
        let mut history = HistoryStore::default();
        history.reset(after_e4());
        assert_eq!(history.last(), &after_e4());
        assert!(matches!(history.pop_last(), Err(HistoryError::TooShort { len: 1 })));
        assert_eq!(history.last(), &after_e4());

        history.append(Position::start());
        assert_eq!(history.pop_last().unwrap(), Position::start());
        assert_eq!(history.last(), &after_e4());
        assert_eq!(history.positions(), &[after_e4()]);
    }
}
