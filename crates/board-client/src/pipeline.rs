//! Move submission state machine.
//!
//! A submission is split in two synchronous halves around the server round
//! trip: [`MovePipeline::begin`] runs the entry checks, local validation and
//! the turn gate and hands back the request to send; [`MovePipeline::complete`]
//! reconciles whatever came back. Only one submission (or undo) may be in
//! flight at a time.

use chess_core::{AppliedMove, CandidateMove, Position, RulesOracle, Termination};
use tracing::{debug, error, info, warn};

use crate::api::{MoveReply, MoveRequest};
use crate::coordinator::Initiator;
use crate::error::{SubmitError, TransportError};
use crate::overlay::AnalysisSnapshot;
use crate::state::SessionState;
use crate::view::BoardView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    LocallyValidating,
    TurnGate,
    AwaitingServer,
    Reconciling,
}

/// Identifies one request sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    id: u64,
    generation: u64,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The submission currently awaiting the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub ticket: Ticket,
    pub pre_position: Position,
    /// The human move as the oracle accepted it; `None` for an engine
    /// request.
    pub applied: Option<AppliedMove>,
}

/// A request ready to go out, and the ticket its reply must carry back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub ticket: Ticket,
    pub request: MoveRequest,
}

/// What a successful reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Number of positions added to the history (0 to 2).
    pub appended: usize,
    pub auto_move: Option<String>,
    pub termination: Option<Termination>,
}

#[derive(Debug)]
pub struct MovePipeline {
    state: SubmissionState,
    pending: Option<PendingSubmission>,
    undo: Option<Ticket>,
    next_id: u64,
}

impl Default for MovePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MovePipeline {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            pending: None,
            undo: None,
            next_id: 1,
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn pending(&self) -> Option<&PendingSubmission> {
        self.pending.as_ref()
    }

    /// No move or undo in flight.
    pub fn is_idle(&self) -> bool {
        self.state == SubmissionState::Idle && self.undo.is_none()
    }

    fn transition(&mut self, to: SubmissionState) {
        debug!(from = ?self.state, to = ?to, "Submission state");
        self.state = to;
    }

    fn issue(&mut self, generation: u64) -> Ticket {
        let ticket = Ticket {
            id: self.next_id,
            generation,
        };
        self.next_id += 1;
        ticket
    }

    /// Start a submission from the live position. `candidate` is `None`
    /// when only an engine move is wanted.
    pub fn begin<O: RulesOracle, V: BoardView>(
        &mut self,
        session: &mut SessionState,
        oracle: &O,
        view: &mut V,
        candidate: Option<CandidateMove>,
        initiator: Initiator,
    ) -> Result<PendingRequest, SubmitError> {
        // Engine requests may start while the user browses; the reply then
        // leaves the cursor where it is.
        if initiator == Initiator::Human && session.is_browsing() {
            info!(index = session.cursor.index(), "Submission while browsing; returning to live position");
            session.cursor.snap_to_tail(&session.history);
            session.render_overlay(view);
            return Err(self.reject(session, oracle, view, SubmitError::Browsing));
        }
        if !self.is_idle() {
            warn!("Submission refused: another request is in flight");
            return Err(self.reject(session, oracle, view, SubmitError::Busy));
        }
        if session.desynced {
            return Err(self.reject(session, oracle, view, SubmitError::Desynchronized));
        }

        let pre_position = session.live().clone();

        self.transition(SubmissionState::LocallyValidating);
        let applied = match candidate {
            Some(mv) => match oracle.apply(&pre_position, &mv) {
                Ok(applied) => Some(applied),
                Err(e) => {
                    warn!("Move rejected locally: {e}");
                    return Err(self.reject(session, oracle, view, SubmitError::LocallyIllegalMove(e)));
                }
            },
            None => None,
        };

        self.transition(SubmissionState::TurnGate);
        if !session.coordinator.admits(&pre_position, initiator) {
            warn!(side = %session.coordinator.side(), "Move refused: engine owns the side to move");
            return Err(self.reject(session, oracle, view, SubmitError::WrongTurn));
        }

        self.transition(SubmissionState::AwaitingServer);
        let ticket = self.issue(session.generation);
        let request = MoveRequest {
            fen: pre_position.clone(),
            mv: applied.as_ref().map(|a| a.uci.clone()),
        };
        debug!(ticket = ticket.id, mv = ?request.mv, "Sending move to server");

        self.pending = Some(PendingSubmission {
            ticket,
            pre_position,
            applied,
        });
        Ok(PendingRequest { ticket, request })
    }

    /// Reconcile the server's answer to the submission `ticket` refers to.
    pub fn complete<O: RulesOracle, V: BoardView>(
        &mut self,
        session: &mut SessionState,
        oracle: &O,
        view: &mut V,
        ticket: Ticket,
        result: Result<MoveReply, TransportError>,
    ) -> Result<Reconciled, SubmitError> {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.ticket == ticket && ticket.generation == session.generation);
        if !current {
            warn!(ticket = ticket.id, generation = ticket.generation, "Discarding stale move reply");
            return Err(SubmitError::Stale);
        }
        let Some(pending) = self.pending.take() else {
            return Err(SubmitError::Stale);
        };

        self.transition(SubmissionState::Reconciling);
        let outcome = match result {
            Err(e) => {
                error!("Failed to communicate with server: {e}");
                return Err(self.fail(session, oracle, view, SubmitError::NetworkFailure(e)));
            }
            Ok(reply) => match reply.into_outcome() {
                Ok(outcome) => outcome,
                Err(message) => {
                    warn!("Server rejected move: {message}");
                    return Err(self.fail(session, oracle, view, SubmitError::ServerRejectedMove(message)));
                }
            },
        };

        let was_live = session.cursor.at_tail(&session.history);
        let mut appended = 0;

        if let (Some(_), Some(applied)) = (&outcome.auto_move, &pending.applied) {
            if session.history.append(applied.position.clone()) {
                appended += 1;
            }
        }
        if session.history.append(outcome.final_position.clone()) {
            appended += 1;
        }
        if was_live {
            session.cursor.snap_to_tail(&session.history);
        } else {
            debug!(index = session.cursor.index(), "Reply landed while browsing; cursor kept");
        }

        let auto_move = outcome.auto_move.clone();
        session.snapshot = Some(AnalysisSnapshot::from(outcome));
        session.render(oracle, view);

        let termination = oracle.termination(session.live(), session.history.positions());
        if let Some(termination) = termination {
            info!(%termination, "Game over");
            view.notify_game_over(&termination);
        }

        debug!(ticket = ticket.id, appended, auto_move = ?auto_move, "Move reconciled");
        self.transition(SubmissionState::Idle);
        Ok(Reconciled {
            appended,
            auto_move,
            termination,
        })
    }

    /// Refusal before anything was sent: put the board back and go idle.
    fn reject<O: RulesOracle, V: BoardView>(
        &mut self,
        session: &SessionState,
        oracle: &O,
        view: &mut V,
        err: SubmitError,
    ) -> SubmitError {
        // A submission already in flight keeps its state.
        if self.pending.is_none() {
            self.transition(SubmissionState::Idle);
        }
        session.render_board(oracle, view);
        view.notify_error(&err.to_string());
        err
    }

    /// Failed round trip: drop the analysis and restore the pre-move board.
    fn fail<O: RulesOracle, V: BoardView>(
        &mut self,
        session: &mut SessionState,
        oracle: &O,
        view: &mut V,
        err: SubmitError,
    ) -> SubmitError {
        session.snapshot = None;
        session.render(oracle, view);
        view.notify_error(&err.to_string());
        self.transition(SubmissionState::Idle);
        err
    }

    // ---- Undo bookkeeping ----

    pub(crate) fn begin_undo(&mut self, generation: u64) -> Ticket {
        let ticket = self.issue(generation);
        self.undo = Some(ticket);
        ticket
    }

    /// Clear the in-flight undo if `ticket` is it. Returns false for a stale
    /// ticket.
    pub(crate) fn finish_undo(&mut self, ticket: Ticket) -> bool {
        if self.undo == Some(ticket) {
            self.undo = None;
            true
        } else {
            false
        }
    }

    /// Forget everything in flight; used when a new game starts.
    pub(crate) fn abandon(&mut self) {
        if let Some(pending) = self.pending.take() {
            info!(ticket = pending.ticket.id, "Abandoning in-flight submission");
        }
        self.undo = None;
        self.transition(SubmissionState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::side::AiSide;
    use crate::view::FrameBuffer;
    use chess_core::StandardRules;

    fn setup(side: AiSide) -> (MovePipeline, SessionState, FrameBuffer) {
        (MovePipeline::new(), SessionState::new(side, true), FrameBuffer::new())
    }

    fn e2e4() -> CandidateMove {
        CandidateMove::from_uci("e2e4").unwrap()
    }

    fn reply(fen: &str, ai_move: Option<&str>) -> MoveReply {
        MoveReply {
            success: true,
            fen: Some(Position::from_fen(fen).unwrap()),
            ai_move: ai_move.map(str::to_string),
            ..MoveReply::default()
        }
    }

    #[test]
    fn test_begin_builds_request_and_waits() {
        let (mut pipeline, mut session, mut view) = setup(AiSide::None);
        let pending = pipeline
            .begin(&mut session, &StandardRules, &mut view, Some(e2e4()), Initiator::Human)
            .unwrap();

        assert_eq!(pending.request.fen, Position::start());
        assert_eq!(pending.request.mv.as_deref(), Some("e2e4"));
        assert_eq!(pipeline.state(), SubmissionState::AwaitingServer);
        assert!(!pipeline.is_idle());
    }

    #[test]
    fn test_second_submission_is_busy() {
        let (mut pipeline, mut session, mut view) = setup(AiSide::None);
        pipeline
            .begin(&mut session, &StandardRules, &mut view, Some(e2e4()), Initiator::Human)
            .unwrap();
        let err = pipeline
            .begin(&mut session, &StandardRules, &mut view, None, Initiator::Engine)
            .unwrap_err();
        assert!(matches!(err, SubmitError::Busy));
        // The first one is still waiting
        assert_eq!(pipeline.state(), SubmissionState::AwaitingServer);
    }

    #[test]
    fn test_illegal_move_never_leaves_idle() {
        let (mut pipeline, mut session, mut view) = setup(AiSide::None);
        let err = pipeline
            .begin(
                &mut session,
                &StandardRules,
                &mut view,
                Some(CandidateMove::from_uci("e2e5").unwrap()),
                Initiator::Human,
            )
            .unwrap_err();
        assert!(matches!(err, SubmitError::LocallyIllegalMove(_)));
        assert!(pipeline.is_idle());
        assert_eq!(view.shown_position(), Some(&Position::start()));
    }

    #[test]
    fn test_turn_gate_blocks_human_on_engine_turn() {
        let (mut pipeline, mut session, mut view) = setup(AiSide::White);
        let err = pipeline
            .begin(&mut session, &StandardRules, &mut view, Some(e2e4()), Initiator::Human)
            .unwrap_err();
        assert!(matches!(err, SubmitError::WrongTurn));

        // The engine itself may still be asked to move
        assert!(pipeline
            .begin(&mut session, &StandardRules, &mut view, None, Initiator::Engine)
            .is_ok());
    }

    #[test]
    fn test_plain_reply_appends_once() {
        let (mut pipeline, mut session, mut view) = setup(AiSide::None);
        let pending = pipeline
            .begin(&mut session, &StandardRules, &mut view, Some(e2e4()), Initiator::Human)
            .unwrap();
        let done = pipeline
            .complete(
                &mut session,
                &StandardRules,
                &mut view,
                pending.ticket,
                Ok(reply("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1", None)),
            )
            .unwrap();
        assert_eq!(done.appended, 1);
        assert_eq!(session.history.len(), 2);
        assert!(pipeline.is_idle());
    }

    #[test]
    fn test_failed_reply_restores_pre_position() {
        let (mut pipeline, mut session, mut view) = setup(AiSide::None);
        session.snapshot = Some(AnalysisSnapshot::default());
        let pending = pipeline
            .begin(&mut session, &StandardRules, &mut view, Some(e2e4()), Initiator::Human)
            .unwrap();
        let failure = MoveReply {
            success: false,
            error: Some("Engine unavailable".into()),
            ..MoveReply::default()
        };
        let err = pipeline
            .complete(&mut session, &StandardRules, &mut view, pending.ticket, Ok(failure))
            .unwrap_err();

        assert_eq!(err.to_string(), "Server Error: Engine unavailable");
        assert_eq!(session.history.len(), 1);
        assert!(session.snapshot.is_none());
        assert_eq!(view.shown_position(), Some(&Position::start()));
        assert!(pipeline.is_idle());
    }

    #[test]
    fn test_reply_for_abandoned_ticket_is_stale() {
        let (mut pipeline, mut session, mut view) = setup(AiSide::None);
        let pending = pipeline
            .begin(&mut session, &StandardRules, &mut view, Some(e2e4()), Initiator::Human)
            .unwrap();
        pipeline.abandon();
        session.generation += 1;

        let err = pipeline
            .complete(
                &mut session,
                &StandardRules,
                &mut view,
                pending.ticket,
                Ok(reply("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1", None)),
            )
            .unwrap_err();
        assert!(matches!(err, SubmitError::Stale));
        assert_eq!(session.history.len(), 1);
    }
}
