//! Client error types

use chess_core::RulesError;
use thiserror::Error;

/// Failures talking to the engine server.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode server reply: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Why a move submission did not change the game.
///
/// Every variant leaves the history untouched, and the displayed board is
/// put back to the position the attempt started from.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Viewing history; returned to the live position, try the move again")]
    Browsing,

    #[error("Another move is still being processed")]
    Busy,

    #[error("Session is out of sync with the server; start a new game")]
    Desynchronized,

    #[error("Illegal move: {0}")]
    LocallyIllegalMove(RulesError),

    #[error("It is the engine's turn to move")]
    WrongTurn,

    #[error("Failed to communicate with server: {0}")]
    NetworkFailure(TransportError),

    #[error("Server Error: {0}")]
    ServerRejectedMove(String),

    #[error("Reply for an abandoned submission was discarded")]
    Stale,
}

#[derive(Error, Debug)]
pub enum UndoError {
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("A move is still being processed")]
    Busy,

    #[error("Session is out of sync with the server; start a new game")]
    Desynchronized,

    #[error("Undo failed on server, engine is out of sync: {0}")]
    UndoDesync(String),

    #[error("Reply for an abandoned undo was discarded")]
    Stale,
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid engine settings: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History holds {len} position(s); at least 2 are needed to undo")]
    TooShort { len: usize },
}

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("Preferences I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preferences file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
