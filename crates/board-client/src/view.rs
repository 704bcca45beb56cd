//! Seam between the session and whatever draws the board.

use chess_core::{Color, Piece, Position, RulesOracle, Square, Termination};

use crate::cursor::NavigationStatus;
use crate::overlay::OverlayFrame;

/// A board ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub position: Position,
    pub pieces: Vec<(Square, Piece)>,
    /// King square to highlight, if the side to move is in check.
    pub check_square: Option<Square>,
    /// True while browsing history; the board must not accept drags.
    pub read_only: bool,
    /// Color at the bottom of the board.
    pub orientation: Color,
}

impl BoardSnapshot {
    /// Evaluate `position` with `oracle` for display only. Nothing outside
    /// the returned value is touched.
    pub fn of<O: RulesOracle>(
        oracle: &O,
        position: &Position,
        read_only: bool,
        orientation: Color,
    ) -> Self {
        Self {
            position: position.clone(),
            pieces: oracle.placement(position),
            check_square: oracle.check_square(position),
            read_only,
            orientation,
        }
    }
}

/// Rendering surface driven by the session.
pub trait BoardView {
    fn show_board(&mut self, board: &BoardSnapshot);

    fn show_overlay(&mut self, frame: &OverlayFrame);

    fn clear_overlay(&mut self);

    fn show_navigation(&mut self, status: &NavigationStatus);

    fn notify_game_over(&mut self, termination: &Termination);

    fn notify_error(&mut self, message: &str);
}

/// Headless view that keeps the latest frame of each kind, plus every
/// notification. Used by tests and by callers that poll instead of draw.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    pub board: Option<BoardSnapshot>,
    pub overlay: Option<OverlayFrame>,
    pub navigation: Option<NavigationStatus>,
    pub game_over: Vec<Termination>,
    pub errors: Vec<String>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position currently drawn, if any.
    pub fn shown_position(&self) -> Option<&Position> {
        self.board.as_ref().map(|b| &b.position)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.errors.last().map(String::as_str)
    }
}

impl BoardView for FrameBuffer {
    fn show_board(&mut self, board: &BoardSnapshot) {
        self.board = Some(board.clone());
    }

    fn show_overlay(&mut self, frame: &OverlayFrame) {
        self.overlay = Some(frame.clone());
    }

    fn clear_overlay(&mut self) {
        self.overlay = None;
    }

    fn show_navigation(&mut self, status: &NavigationStatus) {
        self.navigation = Some(status.clone());
    }

    fn notify_game_over(&mut self, termination: &Termination) {
        self.game_over.push(*termination);
    }

    fn notify_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::StandardRules;

    #[test]
    fn test_snapshot_marks_king_in_check() {
        let checked =
            Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
                .unwrap();
        let snapshot = BoardSnapshot::of(&StandardRules, &checked, true, Color::White);
        assert_eq!(snapshot.check_square, Some(Square::E1));
        assert!(snapshot.read_only);
        assert_eq!(snapshot.pieces.len(), 32);
    }

    #[test]
    fn test_frame_buffer_records_latest() {
        let mut view = FrameBuffer::new();
        let start = BoardSnapshot::of(&StandardRules, &Position::start(), false, Color::White);
        view.show_board(&start);
        view.notify_error("first");
        view.notify_error("second");
        assert_eq!(view.shown_position(), Some(&Position::start()));
        assert_eq!(view.last_error(), Some("second"));
        assert_eq!(view.errors.len(), 2);
    }
}
