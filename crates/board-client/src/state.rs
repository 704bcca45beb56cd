//! The single state object a game session owns.

use chess_core::{Color, Position, RulesOracle};

use crate::coordinator::AiTurnCoordinator;
use crate::cursor::ViewCursor;
use crate::history::HistoryStore;
use crate::overlay::{self, AnalysisSnapshot, ArrowGate};
use crate::side::AiSide;
use crate::view::{BoardSnapshot, BoardView};

/// All mutable session data in one place.
///
/// The live position is never stored on its own: it is always the last
/// history entry.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub history: HistoryStore,
    pub cursor: ViewCursor,
    pub coordinator: AiTurnCoordinator,
    /// Analysis for the live position only.
    pub snapshot: Option<AnalysisSnapshot>,
    pub overlay_expanded: bool,
    pub orientation: Color,
    /// Bumped on every new game; replies tagged with an older value are
    /// ignored.
    pub generation: u64,
    /// Set when the server failed to follow an undo.
    pub desynced: bool,
}

impl SessionState {
    pub fn new(ai_side: AiSide, overlay_expanded: bool) -> Self {
        Self {
            history: HistoryStore::default(),
            cursor: ViewCursor::default(),
            coordinator: AiTurnCoordinator::new(ai_side),
            snapshot: None,
            overlay_expanded,
            orientation: Color::White,
            generation: 0,
            desynced: false,
        }
    }

    pub fn live(&self) -> &Position {
        self.history.last()
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_browsing(&self.history)
    }

    /// Position under the cursor.
    pub fn displayed(&self) -> &Position {
        self.history
            .at(self.cursor.index())
            .unwrap_or_else(|| self.history.last())
    }

    pub fn arrow_gate(&self) -> ArrowGate {
        ArrowGate {
            browsing: self.is_browsing(),
            at_tail: self.cursor.at_tail(&self.history),
            panel_expanded: self.overlay_expanded,
        }
    }

    /// Draw the board at the cursor and the navigation controls.
    pub fn render_board<O: RulesOracle, V: BoardView>(&self, oracle: &O, view: &mut V) {
        let board = BoardSnapshot::of(oracle, self.displayed(), self.is_browsing(), self.orientation);
        view.show_board(&board);
        view.show_navigation(&self.cursor.status(&self.history));
    }

    /// Draw the retained analysis through the arrow gate, or clear the
    /// overlay when there is none.
    pub fn render_overlay<V: BoardView>(&self, view: &mut V) {
        match &self.snapshot {
            Some(snapshot) => view.show_overlay(&overlay::render(snapshot, self.arrow_gate())),
            None => view.clear_overlay(),
        }
    }

    pub fn render<O: RulesOracle, V: BoardView>(&self, oracle: &O, view: &mut V) {
        self.render_board(oracle, view);
        self.render_overlay(view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Analysis, BestMove};
    use crate::view::FrameBuffer;
    use chess_core::{CandidateMove, StandardRules};

    fn with_moves(moves: &[&str]) -> SessionState {
        let mut state = SessionState::new(AiSide::None, true);
        for mv in moves {
            let mv = CandidateMove::from_uci(mv).unwrap();
            let next = StandardRules.apply(state.live(), &mv).unwrap().position;
            state.history.append(next);
        }
        state.cursor.snap_to_tail(&state.history);
        state
    }

    fn snapshot() -> AnalysisSnapshot {
        AnalysisSnapshot {
            analysis: Some(Analysis {
                evaluation: None,
                best_moves: vec![BestMove {
                    uci: "g1f3".into(),
                    centipawn: Some(20),
                    mate: None,
                }],
            }),
            insights: None,
        }
    }

    #[test]
    fn test_browsing_renders_read_only_history() {
        let mut state = with_moves(&["e2e4", "e7e5"]);
        state.snapshot = Some(snapshot());
        state.cursor.back();

        let mut view = FrameBuffer::new();
        state.render(&StandardRules, &mut view);

        let board = view.board.unwrap();
        assert!(board.read_only);
        assert_eq!(&board.position, state.history.at(1).unwrap());
        assert!(view.navigation.unwrap().browsing);
        assert!(view.overlay.unwrap().arrows.is_empty());
    }

    #[test]
    fn test_live_view_draws_arrows() {
        let mut state = with_moves(&["e2e4", "e7e5"]);
        state.snapshot = Some(snapshot());

        let mut view = FrameBuffer::new();
        state.render(&StandardRules, &mut view);
        assert!(!view.board.unwrap().read_only);
        assert_eq!(view.overlay.unwrap().arrows.len(), 1);
    }

    #[test]
    fn test_no_snapshot_clears_overlay() {
        let state = with_moves(&[]);
        let mut view = FrameBuffer::new();
        view.overlay = Some(overlay::render(&snapshot(), state.arrow_gate()));
        state.render_overlay(&mut view);
        assert!(view.overlay.is_none());
    }
}
