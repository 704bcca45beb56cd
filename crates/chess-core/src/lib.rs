//! Chess domain types shared by the board client.
//!
//! Positions are carried around as validated FEN text. Everything that needs
//! to know the rules of chess goes through [`RulesOracle`]; the default
//! implementation, [`StandardRules`], is backed by shakmaty.

pub mod error;
pub mod moves;
pub mod oracle;
pub mod position;
pub mod termination;

pub use shakmaty::{Color, Piece, Role, Square};

pub use error::RulesError;
pub use moves::CandidateMove;
pub use oracle::{AppliedMove, RulesOracle, StandardRules};
pub use position::{Position, STARTING_FEN};
pub use termination::Termination;

/// Display name of a side ("White" / "Black").
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}
