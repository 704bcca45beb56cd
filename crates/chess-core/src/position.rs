//! Serialized board state.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::{fen::Fen, CastlingMode, Chess, Color, EnPassantMode};

use crate::error::RulesError;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A complete board state (placement, side to move, castling rights,
/// en passant square and move clocks) stored as FEN.
///
/// A `Position` can only be built from text that shakmaty accepts, and the
/// text is normalized on the way in, so two positions compare equal exactly
/// when their FEN strings do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Position(String);

impl Position {
    /// The standard starting position.
    pub fn start() -> Self {
        Self(STARTING_FEN.to_string())
    }

    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let chess = parse_chess(fen.trim())?;
        Ok(Self::from_chess(&chess))
    }

    pub(crate) fn from_chess(pos: &Chess) -> Self {
        Self(Fen::from_position(pos, EnPassantMode::Legal).to_string())
    }

    pub(crate) fn to_chess(&self) -> Result<Chess, RulesError> {
        parse_chess(&self.0)
    }

    pub fn as_fen(&self) -> &str {
        &self.0
    }

    /// Side to move, read straight from the FEN active-color field.
    pub fn turn(&self) -> Color {
        match self.0.split_whitespace().nth(1) {
            Some("b") => Color::Black,
            _ => Color::White,
        }
    }

    /// Placement, side to move, castling and en passant fields only.
    /// Two positions with the same key are the same position for the
    /// purpose of repetition counting.
    pub fn repetition_key(&self) -> &str {
        let end = self
            .0
            .match_indices(' ')
            .nth(3)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

fn parse_chess(fen: &str) -> Result<Chess, RulesError> {
    let invalid = |reason: String| RulesError::InvalidFen {
        fen: fen.to_string(),
        reason,
    };
    let parsed: Fen = fen.parse().map_err(|e| invalid(format!("{e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| invalid(format!("{e}")))
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Position {
    type Error = RulesError;

    fn try_from(fen: String) -> Result<Self, Self::Error> {
        Self::from_fen(&fen)
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}
