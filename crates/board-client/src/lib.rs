//! Browser-style chess client state machine.
//!
//! The client plays against a server-hosted engine. Moves are checked
//! locally with the rules oracle, sent to the server, and the positions the
//! server confirms are recorded in an ordered history that can be browsed
//! without touching the live game. [`Session`] is the synchronous core;
//! [`Client`] drives it against a [`GameServer`].

pub mod api;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod cursor;
pub mod debounce;
pub mod error;
pub mod history;
pub mod overlay;
pub mod pipeline;
pub mod prefs;
pub mod session;
pub mod side;
pub mod state;
pub mod transport;
pub mod view;

pub use client::Client;
pub use config::ClientConfig;
pub use error::{SettingsError, SubmitError, TransportError, UndoError};
pub use session::Session;
pub use side::AiSide;
pub use transport::{GameServer, HttpGameServer};
pub use view::{BoardView, FrameBuffer};
