//! Engine turn ownership.

use chess_core::Position;
use tracing::info;

use crate::side::AiSide;

/// Who started a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    /// A move the user made on the board.
    Human,
    /// A request for the engine to move (or just to analyse) with no move
    /// of our own attached.
    Engine,
}

/// Tracks the engine's side and decides when the engine should move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AiTurnCoordinator {
    side: AiSide,
}

impl AiTurnCoordinator {
    pub fn new(side: AiSide) -> Self {
        Self { side }
    }

    pub fn side(&self) -> AiSide {
        self.side
    }

    /// Change the engine's side. Returns true when the engine now owns the
    /// side to move in `live` and an automatic move should be requested.
    pub fn set_side(&mut self, side: AiSide, live: &Position) -> bool {
        if side != self.side {
            info!(from = %self.side, to = %side, "AI side changed");
        }
        self.side = side;
        self.engine_to_move(live)
    }

    pub fn engine_to_move(&self, position: &Position) -> bool {
        self.side.controls(position.turn())
    }

    /// Turn gate: human moves are refused while the engine owns the side to
    /// move. Engine requests always pass.
    pub fn admits(&self, position: &Position, initiator: Initiator) -> bool {
        match initiator {
            Initiator::Human => !self.engine_to_move(position),
            Initiator::Engine => true,
        }
    }
}
