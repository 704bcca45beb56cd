//! Rules oracle error types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Malformed move: {0}")]
    MalformedMove(String),

    #[error("Illegal move {uci} in position {fen}")]
    IllegalMove { uci: String, fen: String },
}
