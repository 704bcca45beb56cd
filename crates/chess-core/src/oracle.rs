//! The rules oracle: legality, termination and piece placement.

use shakmaty::{uci::UciMove, CastlingMode, Chess, Move, Piece, Position as _, Role, Square};
use tracing::{debug, warn};

use crate::error::RulesError;
use crate::moves::CandidateMove;
use crate::position::Position;
use crate::termination::Termination;

/// Halfmove clock value at which the fifty-move rule ends the game.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// A candidate move that was found legal, with its canonical UCI text and
/// the position it leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub uci: String,
    pub position: Position,
}

/// Everything the client needs to know about the rules of chess.
///
/// Implementations are stateless with respect to positions: every call is
/// bound to the position it is given, so evaluating a historical position
/// never disturbs the live game.
pub trait RulesOracle {
    /// Check `mv` against `position` and return the resulting position.
    fn apply(&self, position: &Position, mv: &CandidateMove) -> Result<AppliedMove, RulesError>;

    /// Game-ending condition holding in `position`, if any. `history` is the
    /// full game so far, `position` included, and is used for repetition.
    fn termination(&self, position: &Position, history: &[Position]) -> Option<Termination>;

    /// Every occupied square with its piece.
    fn placement(&self, position: &Position) -> Vec<(Square, Piece)>;

    /// Square of the side-to-move's king when it is in check.
    fn check_square(&self, position: &Position) -> Option<Square>;

    fn piece_at(&self, position: &Position, square: Square) -> Option<Piece> {
        self.placement(position)
            .into_iter()
            .find(|(sq, _)| *sq == square)
            .map(|(_, piece)| piece)
    }
}

/// Standard chess rules backed by shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    pub fn new() -> Self {
        Self
    }

    fn load(&self, position: &Position) -> Option<Chess> {
        match position.to_chess() {
            Ok(pos) => Some(pos),
            Err(e) => {
                warn!("Rules oracle could not load position: {e}");
                None
            }
        }
    }
}

/// Find the legal move matching `mv`. A promotion-less move that only
/// becomes legal as a promotion is promoted to a queen.
fn resolve(pos: &Chess, mv: &CandidateMove) -> Option<Move> {
    let as_uci = |candidate: &CandidateMove| UciMove::Normal {
        from: candidate.from(),
        to: candidate.to(),
        promotion: candidate.promotion(),
    };

    match as_uci(mv).to_move(pos) {
        Ok(legal) => Some(legal),
        Err(_) if mv.promotion().is_none() => {
            let queened = mv.with_promotion(Role::Queen);
            as_uci(&queened).to_move(pos).ok()
        }
        Err(_) => None,
    }
}

impl RulesOracle for StandardRules {
    fn apply(&self, position: &Position, mv: &CandidateMove) -> Result<AppliedMove, RulesError> {
        let illegal = || RulesError::IllegalMove {
            uci: mv.to_string(),
            fen: position.to_string(),
        };

        let pos = position.to_chess()?;
        let legal = resolve(&pos, mv).ok_or_else(illegal)?;
        let uci = legal.to_uci(CastlingMode::Standard).to_string();
        let after = pos.play(legal).map_err(|_| illegal())?;

        debug!(uci = %uci, "Move accepted by rules oracle");
        Ok(AppliedMove {
            uci,
            position: Position::from_chess(&after),
        })
    }

    fn termination(&self, position: &Position, history: &[Position]) -> Option<Termination> {
        let pos = self.load(position)?;

        if pos.is_checkmate() {
            return Some(Termination::Checkmate { winner: !pos.turn() });
        }
        if pos.is_stalemate() {
            return Some(Termination::Stalemate);
        }

        let key = position.repetition_key();
        let occurrences = history
            .iter()
            .filter(|p| p.repetition_key() == key)
            .count();
        if occurrences >= 3 {
            return Some(Termination::ThreefoldRepetition);
        }

        if pos.is_insufficient_material() {
            return Some(Termination::InsufficientMaterial);
        }
        if pos.halfmoves() >= FIFTY_MOVE_HALFMOVES {
            return Some(Termination::FiftyMoveRule);
        }
        None
    }

    fn placement(&self, position: &Position) -> Vec<(Square, Piece)> {
        let Some(pos) = self.load(position) else {
            return Vec::new();
        };
        let board = pos.board();
        board
            .occupied()
            .into_iter()
            .filter_map(|sq| board.piece_at(sq).map(|piece| (sq, piece)))
            .collect()
    }

    fn check_square(&self, position: &Position) -> Option<Square> {
        let pos = self.load(position)?;
        if pos.is_check() {
            pos.board().king_of(pos.turn())
        } else {
            None
        }
    }
}
