#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use board_client::api::{EngineSettings, MoveReply, MoveRequest, UndoReply, UndoRequest};
use board_client::{AiSide, ClientConfig, GameServer, TransportError};
use chess_core::{CandidateMove, Position, RulesOracle, StandardRules};
use serde_json::{json, Value};

/// In-memory engine server. Replies are queued up front and handed out in
/// order; every request is recorded.
#[derive(Default)]
pub struct ScriptedServer {
    move_replies: Mutex<VecDeque<Value>>,
    undo_replies: Mutex<VecDeque<Value>>,
    pub moves: Mutex<Vec<MoveRequest>>,
    pub undos: Mutex<Vec<UndoRequest>>,
    pub settings_updates: Mutex<Vec<EngineSettings>>,
    pub side: Mutex<AiSide>,
    pub settings: Mutex<EngineSettings>,
}

impl ScriptedServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_side(side: AiSide) -> Self {
        let server = Self::new();
        *server.side.lock().unwrap() = side;
        server
    }

    pub fn queue_move(&self, reply: Value) {
        self.move_replies.lock().unwrap().push_back(reply);
    }

    pub fn queue_undo(&self, reply: Value) {
        self.undo_replies.lock().unwrap().push_back(reply);
    }

    pub fn sent_moves(&self) -> Vec<MoveRequest> {
        self.moves.lock().unwrap().clone()
    }

    pub fn sent_undos(&self) -> Vec<UndoRequest> {
        self.undos.lock().unwrap().clone()
    }
}

fn unscripted() -> TransportError {
    TransportError::Status {
        status: 503,
        body: "no scripted reply".to_string(),
    }
}

impl GameServer for ScriptedServer {
    async fn submit_move(&self, request: &MoveRequest) -> Result<MoveReply, TransportError> {
        self.moves.lock().unwrap().push(request.clone());
        let reply = self.move_replies.lock().unwrap().pop_front().ok_or_else(unscripted)?;
        Ok(serde_json::from_value(reply)?)
    }

    async fn undo(&self, request: &UndoRequest) -> Result<UndoReply, TransportError> {
        self.undos.lock().unwrap().push(request.clone());
        let reply = self.undo_replies.lock().unwrap().pop_front().ok_or_else(unscripted)?;
        Ok(serde_json::from_value(reply)?)
    }

    async fn engine_settings(&self) -> Result<EngineSettings, TransportError> {
        Ok(*self.settings.lock().unwrap())
    }

    async fn update_engine_settings(&self, settings: &EngineSettings) -> Result<(), TransportError> {
        self.settings_updates.lock().unwrap().push(*settings);
        *self.settings.lock().unwrap() = *settings;
        Ok(())
    }

    async fn ai_side(&self) -> Result<AiSide, TransportError> {
        Ok(*self.side.lock().unwrap())
    }

    async fn set_ai_side(&self, side: AiSide) -> Result<AiSide, TransportError> {
        *self.side.lock().unwrap() = side;
        Ok(side)
    }
}

pub fn config() -> ClientConfig {
    ClientConfig::default()
}

/// Play `moves` from the start and return every position along the way,
/// the start included.
pub fn line(moves: &[&str]) -> Vec<Position> {
    let mut positions = vec![Position::start()];
    for mv in moves {
        let mv: CandidateMove = mv.parse().unwrap();
        let next = StandardRules
            .apply(positions.last().unwrap(), &mv)
            .unwrap()
            .position;
        positions.push(next);
    }
    positions
}

/// Successful move reply landing on `fen`.
pub fn move_reply(fen: &Position, ai_move: Option<&str>) -> Value {
    json!({
        "success": true,
        "fen": fen.as_fen(),
        "ai_move": ai_move,
        "analysis": {
            "evaluation": { "type": "cp", "value": 25 },
            "best_moves": [
                { "Move": "g1f3", "Centipawn": 25, "Mate": null },
                { "Move": "b1c3", "Centipawn": 18, "Mate": null }
            ]
        },
        "insights": {
            "material_balance": 0,
            "suggested_improvements": [],
            "learning_points": ["Best move: g1f3 (0.25)"]
        }
    })
}

pub fn undo_reply(fen: &Position) -> Value {
    json!({
        "success": true,
        "fen": fen.as_fen(),
        "analysis": {
            "evaluation": { "type": "cp", "value": 30 },
            "best_moves": [{ "Move": "e2e4", "Centipawn": 30, "Mate": null }]
        },
        "insights": { "material_balance": 0 }
    })
}
