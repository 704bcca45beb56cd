//! JSON shapes exchanged with the engine server.

use chess_core::Position;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::side::AiSide;

// ---- Requests ----

/// `POST /api/move`. A `null` move asks the server only for an automatic
/// move (and fresh analysis) in `fen`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRequest {
    pub fen: Position,
    #[serde(rename = "move")]
    pub mv: Option<String>,
}

/// `POST /api/undo`: resynchronize the server on the reverted position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndoRequest {
    pub fen: Position,
}

/// `GET|POST /api/engine/settings`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EngineSettings {
    #[validate(range(min = 1, max = 30))]
    pub depth: u32,
    #[validate(range(min = 0, max = 20))]
    pub skill_level: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            depth: 5,
            skill_level: 10,
        }
    }
}

/// `POST /api/engine/side`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SideRequest {
    pub side: AiSide,
}

// ---- Replies ----

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SideReply {
    #[serde(default)]
    pub ai_side: AiSide,
}

/// Engine evaluation from White's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Evaluation {
    /// Hundredths of a pawn.
    Cp(i32),
    /// Forced mate in N; positive means White mates.
    Mate(i32),
}

/// One candidate line from the engine, best first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestMove {
    #[serde(rename = "Move")]
    pub uci: String,
    #[serde(rename = "Centipawn", default)]
    pub centipawn: Option<i32>,
    #[serde(rename = "Mate", default)]
    pub mate: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub evaluation: Option<Evaluation>,
    #[serde(default)]
    pub best_moves: Vec<BestMove>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CenterControl {
    pub white: i32,
    pub black: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceActivity {
    pub white_developed: i32,
    pub black_developed: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PawnStructure {
    pub white_pawns: i32,
    pub black_pawns: i32,
    pub isolated_pawns: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KingSafety {
    pub white_king_safety: i32,
    pub black_king_safety: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalFeatures {
    pub center_control: CenterControl,
    pub piece_activity: PieceActivity,
    pub pawn_structure: PawnStructure,
    pub king_safety: KingSafety,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Insights {
    pub material_balance: i32,
    pub positional_features: Option<PositionalFeatures>,
    pub suggested_improvements: Vec<String>,
    pub learning_points: Vec<String>,
}

/// Reply to `POST /api/move`, also the payload of push analysis updates
/// (where `fen` may be missing).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MoveReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub fen: Option<Position>,
    #[serde(default)]
    pub ai_move: Option<String>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
    #[serde(default)]
    pub insights: Option<Insights>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A successful move reply with its required fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub final_position: Position,
    pub auto_move: Option<String>,
    pub analysis: Option<Analysis>,
    pub insights: Option<Insights>,
}

impl MoveReply {
    /// Split into the confirmed outcome or the server's error message.
    pub fn into_outcome(self) -> Result<MoveOutcome, String> {
        if !self.success {
            return Err(self.error.unwrap_or_else(|| "Invalid move".to_string()));
        }
        let final_position = self
            .fen
            .ok_or_else(|| "Reply is missing the resulting position".to_string())?;
        Ok(MoveOutcome {
            final_position,
            auto_move: self.ai_move.filter(|m| !m.is_empty()),
            analysis: self.analysis,
            insights: self.insights,
        })
    }
}

/// Reply to `POST /api/undo`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UndoReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub fen: Option<Position>,
    #[serde(default)]
    pub analysis: Option<Analysis>,
    #[serde(default)]
    pub insights: Option<Insights>,
    #[serde(default)]
    pub error: Option<String>,
}
