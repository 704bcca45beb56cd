//! A game session: history, browsing, engine turns and analysis, driven
//! without any I/O of its own.
//!
//! Network-bound operations come in `begin_*` / `complete_*` pairs. The
//! `begin` half returns the request to send together with a [`Ticket`];
//! the caller performs the round trip and hands the result to the matching
//! `complete` half. [`crate::Client`] does this against a [`crate::GameServer`].

use chess_core::{CandidateMove, Color, Position, RulesOracle, Square, Termination};
use tracing::{debug, error, info, warn};

use crate::api::{MoveReply, UndoReply, UndoRequest};
use crate::coordinator::Initiator;
use crate::cursor::ViewCursor;
use crate::error::{SubmitError, TransportError, UndoError};
use crate::history::HistoryStore;
use crate::overlay::AnalysisSnapshot;
use crate::pipeline::{MovePipeline, PendingRequest, Reconciled, Ticket};
use crate::side::AiSide;
use crate::state::SessionState;
use crate::view::BoardView;

/// An undo waiting for the server to resynchronize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoTicket {
    pub ticket: Ticket,
    pub request: UndoRequest,
}

pub struct Session<O: RulesOracle, V: BoardView> {
    oracle: O,
    view: V,
    state: SessionState,
    pipeline: MovePipeline,
}

impl<O: RulesOracle, V: BoardView> Session<O, V> {
    /// A fresh game from the standard start, drawn immediately.
    pub fn new(oracle: O, view: V, ai_side: AiSide, overlay_expanded: bool) -> Self {
        let mut session = Self {
            oracle,
            view,
            state: SessionState::new(ai_side, overlay_expanded),
            pipeline: MovePipeline::new(),
        };
        session.redraw();
        session
    }

    // ---- Accessors ----

    pub fn history(&self) -> &HistoryStore {
        &self.state.history
    }

    pub fn cursor(&self) -> ViewCursor {
        self.state.cursor
    }

    /// The authoritative position.
    pub fn live(&self) -> &Position {
        self.state.live()
    }

    pub fn displayed(&self) -> &Position {
        self.state.displayed()
    }

    pub fn ai_side(&self) -> AiSide {
        self.state.coordinator.side()
    }

    pub fn snapshot(&self) -> Option<&AnalysisSnapshot> {
        self.state.snapshot.as_ref()
    }

    pub fn is_browsing(&self) -> bool {
        self.state.is_browsing()
    }

    /// A move or undo is waiting for the server.
    pub fn is_busy(&self) -> bool {
        !self.pipeline.is_idle()
    }

    pub fn is_desynced(&self) -> bool {
        self.state.desynced
    }

    pub fn overlay_expanded(&self) -> bool {
        self.state.overlay_expanded
    }

    pub fn orientation(&self) -> Color {
        self.state.orientation
    }

    pub fn engine_to_move(&self) -> bool {
        self.state.coordinator.engine_to_move(self.live())
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Redraw everything from the current state.
    pub fn redraw(&mut self) {
        self.state.render(&self.oracle, &mut self.view);
    }

    // ---- Game setup ----

    /// Discard the game and start over from the standard position. Anything
    /// still in flight is abandoned and its reply will be ignored. Returns
    /// true when the engine owns the first move.
    pub fn new_game(&mut self) -> bool {
        self.pipeline.abandon();
        self.state.generation += 1;
        self.state.history.reset(Position::start());
        self.state.cursor.snap_to_tail(&self.state.history);
        self.state.snapshot = None;
        self.state.desynced = false;
        info!(generation = self.state.generation, ai_side = %self.ai_side(), "New game");
        self.redraw();
        self.engine_to_move()
    }

    // ---- Moves ----

    /// Submit a move the user made on the board.
    pub fn begin_move(&mut self, mv: CandidateMove) -> Result<PendingRequest, SubmitError> {
        self.pipeline.begin(
            &mut self.state,
            &self.oracle,
            &mut self.view,
            Some(mv),
            Initiator::Human,
        )
    }

    /// Ask the server for an automatic move (or just fresh analysis) in the
    /// live position.
    pub fn begin_engine_move(&mut self) -> Result<PendingRequest, SubmitError> {
        self.pipeline
            .begin(&mut self.state, &self.oracle, &mut self.view, None, Initiator::Engine)
    }

    pub fn complete_move(
        &mut self,
        ticket: Ticket,
        result: Result<MoveReply, TransportError>,
    ) -> Result<Reconciled, SubmitError> {
        self.pipeline
            .complete(&mut self.state, &self.oracle, &mut self.view, ticket, result)
    }

    // ---- Undo ----

    /// Take back the last confirmed position. The local history is reverted
    /// at once; the returned request tells the server where the game now
    /// stands.
    pub fn begin_undo(&mut self) -> Result<UndoTicket, UndoError> {
        if !self.pipeline.is_idle() {
            warn!("Undo refused: another request is in flight");
            return Err(UndoError::Busy);
        }
        if self.state.desynced {
            return Err(UndoError::Desynchronized);
        }
        let removed = self.state.history.pop_last().map_err(|e| {
            debug!("Undo refused: {e}");
            UndoError::NothingToUndo
        })?;
        debug!(removed = %removed, "Popped last position");

        self.state.cursor.snap_to_tail(&self.state.history);
        self.state.snapshot = None;
        self.redraw();

        let ticket = self.pipeline.begin_undo(self.state.generation);
        let reverted = self.live().clone();
        info!(fen = %reverted, "Undo; resynchronizing server");
        Ok(UndoTicket {
            ticket,
            request: UndoRequest { fen: reverted },
        })
    }

    /// Handle the server's answer to an undo. A failure leaves client and
    /// server on different positions; the session then refuses further
    /// moves until a new game.
    pub fn complete_undo(
        &mut self,
        ticket: Ticket,
        result: Result<UndoReply, TransportError>,
    ) -> Result<(), UndoError> {
        if ticket.generation() != self.state.generation || !self.pipeline.finish_undo(ticket) {
            warn!(ticket = ticket.id(), "Discarding stale undo reply");
            return Err(UndoError::Stale);
        }

        let message = match result {
            Ok(reply) if reply.success => {
                self.state.snapshot = Some(AnalysisSnapshot::from(reply));
                self.state.cursor.snap_to_tail(&self.state.history);
                self.redraw();
                return Ok(());
            }
            Ok(reply) => reply
                .error
                .unwrap_or_else(|| "server did not acknowledge the undo".to_string()),
            Err(e) => e.to_string(),
        };

        error!(fen = %self.live(), "Undo failed on server, session is desynchronized: {message}");
        self.state.desynced = true;
        let err = UndoError::UndoDesync(message);
        self.view.notify_error(&err.to_string());
        Err(err)
    }

    // ---- Navigation ----

    /// Step back through history. Returns false at the start.
    pub fn view_previous(&mut self) -> bool {
        if !self.state.cursor.back() {
            return false;
        }
        debug!(index = self.state.cursor.index(), "Viewing history");
        self.redraw();
        true
    }

    /// Step forward; reaching the tail leaves browsing mode and brings the
    /// analysis arrows back. Returns false when already live.
    pub fn view_next(&mut self) -> bool {
        if !self.state.cursor.forward(&self.state.history) {
            return false;
        }
        if !self.is_browsing() {
            debug!("Back at the live position");
        }
        self.redraw();
        true
    }

    // ---- Settings and display ----

    /// Hand a side to the engine (or take it back). Returns true when the
    /// engine now has the move and [`Self::begin_engine_move`] should follow.
    pub fn set_ai_side(&mut self, side: AiSide) -> bool {
        let live = self.state.live().clone();
        self.state.coordinator.set_side(side, &live)
    }

    pub fn set_overlay_expanded(&mut self, expanded: bool) {
        self.state.overlay_expanded = expanded;
        self.state.render_overlay(&mut self.view);
    }

    pub fn flip_board(&mut self) {
        self.state.orientation = !self.state.orientation;
        self.state.render_board(&self.oracle, &mut self.view);
    }

    /// Out-of-band analysis. Applied only when it belongs to the live
    /// position; returns whether it was.
    pub fn apply_push(&mut self, update: MoveReply) -> bool {
        if let Some(fen) = &update.fen {
            if fen != self.live() {
                debug!(fen = %fen, "Ignoring analysis push for another position");
                return false;
            }
        }
        self.state.snapshot = Some(AnalysisSnapshot::from(update));
        self.state.render_overlay(&mut self.view);
        true
    }

    /// Game-ending condition on the live position, if any.
    pub fn termination(&self) -> Option<Termination> {
        self.oracle
            .termination(self.live(), self.state.history.positions())
    }

    /// Whether the user may start dragging the piece on `square`: live
    /// view, game still running, and the piece belongs to the side to move.
    pub fn may_pick_up(&self, square: Square) -> bool {
        if self.is_browsing() || self.termination().is_some() {
            return false;
        }
        let turn = self.live().turn();
        if self.state.coordinator.side().controls(turn) {
            return false;
        }
        self.oracle
            .piece_at(self.live(), square)
            .is_some_and(|piece| piece.color == turn)
    }
}
