//! Game-ending conditions.

use std::fmt;

use shakmaty::Color;

use crate::color_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate { winner: Color },
    Stalemate,
    ThreefoldRepetition,
    InsufficientMaterial,
    /// Any other draw; in practice the fifty-move rule.
    FiftyMoveRule,
}

impl Termination {
    pub fn is_draw(&self) -> bool {
        !matches!(self, Termination::Checkmate { .. })
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate { winner } => {
                write!(f, "Checkmate! {} wins.", color_name(*winner))
            }
            Termination::Stalemate => f.write_str("Stalemate! It's a draw."),
            Termination::ThreefoldRepetition => f.write_str("Draw by Threefold Repetition."),
            Termination::InsufficientMaterial => f.write_str("Draw by Insufficient Material."),
            Termination::FiftyMoveRule => f.write_str("The game is a draw."),
        }
    }
}
