//! Async driver: runs a [`Session`] against a [`GameServer`].

use std::path::PathBuf;

use chess_core::{CandidateMove, RulesOracle};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::api::{EngineSettings, MoveReply};
use crate::config::ClientConfig;
use crate::debounce::Debouncer;
use crate::error::{PrefsError, SettingsError, SubmitError, UndoError};
use crate::pipeline::Reconciled;
use crate::prefs::{Preferences, Theme};
use crate::session::Session;
use crate::side::AiSide;
use crate::transport::GameServer;
use crate::view::BoardView;

pub struct Client<S: GameServer, O: RulesOracle, V: BoardView> {
    server: S,
    session: Session<O, V>,
    settings: EngineSettings,
    debouncer: Debouncer<EngineSettings>,
    prefs: Preferences,
    prefs_path: Option<PathBuf>,
}

impl<S: GameServer, O: RulesOracle, V: BoardView> Client<S, O, V> {
    /// Build a client around a fresh session. Preferences are written back
    /// to `config.prefs_path` whenever they change.
    pub fn new(server: S, oracle: O, view: V, config: &ClientConfig, prefs: Preferences) -> Self {
        Self {
            server,
            session: Session::new(oracle, view, AiSide::None, prefs.overlay_expanded()),
            settings: EngineSettings::default(),
            debouncer: Debouncer::new(config.settings_debounce),
            prefs,
            prefs_path: Some(config.prefs_path.clone()),
        }
    }

    /// Same as [`Client::new`] but never touches the filesystem.
    pub fn in_memory(server: S, oracle: O, view: V, config: &ClientConfig) -> Self {
        let mut client = Self::new(server, oracle, view, config, Preferences::default());
        client.prefs_path = None;
        client
    }

    pub fn session(&self) -> &Session<O, V> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<O, V> {
        &mut self.session
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn engine_settings(&self) -> EngineSettings {
        self.settings
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    /// Read the server's engine settings and AI side. If the engine owns
    /// the side to move it is asked to play straight away.
    pub async fn sync_with_server(&mut self) -> Result<Option<Reconciled>, SettingsError> {
        self.settings = self.server.engine_settings().await?;
        let side = self.server.ai_side().await?;
        info!(
            depth = self.settings.depth,
            skill_level = self.settings.skill_level,
            ai_side = %side,
            "Synchronized with engine server"
        );

        if self.session.set_ai_side(side) {
            return Ok(Some(self.request_engine_move().await?));
        }
        Ok(None)
    }

    // ---- Moves ----

    pub async fn play_move(&mut self, mv: CandidateMove) -> Result<Reconciled, SubmitError> {
        let pending = self.session.begin_move(mv)?;
        let result = self.server.submit_move(&pending.request).await;
        self.session.complete_move(pending.ticket, result)
    }

    /// Null-move request: the server plays for the engine if it owns the
    /// side to move, and returns fresh analysis either way.
    pub async fn request_engine_move(&mut self) -> Result<Reconciled, SubmitError> {
        let pending = self.session.begin_engine_move()?;
        let result = self.server.submit_move(&pending.request).await;
        self.session.complete_move(pending.ticket, result)
    }

    /// Start over. The AI side is re-read from the server first; if that
    /// fails the current one is kept.
    pub async fn new_game(&mut self) -> Result<Option<Reconciled>, SubmitError> {
        match self.server.ai_side().await {
            Ok(side) => {
                self.session.set_ai_side(side);
            }
            Err(e) => warn!("Failed to get AI side for new game: {e}"),
        }

        if self.session.new_game() {
            return self.request_engine_move().await.map(Some);
        }
        Ok(None)
    }

    pub async fn undo(&mut self) -> Result<(), UndoError> {
        let pending = self.session.begin_undo()?;
        let result = self.server.undo(&pending.request).await;
        self.session.complete_undo(pending.ticket, result)
    }

    /// Feed an unsolicited analysis update from the push channel.
    pub fn apply_push(&mut self, update: MoveReply) -> bool {
        self.session.apply_push(update)
    }

    // ---- Engine settings ----

    /// Change the engine's side on the server, then let it move if it now
    /// owns the side to move. A user browsing history stays where they are.
    pub async fn set_ai_side(&mut self, side: AiSide) -> Result<Option<Reconciled>, SettingsError> {
        let confirmed = self.server.set_ai_side(side).await?;
        if self.session.set_ai_side(confirmed) {
            return Ok(Some(self.request_engine_move().await?));
        }
        Ok(None)
    }

    /// Validate `settings` and queue them; they are sent once no further
    /// change arrives within the quiet period.
    pub fn schedule_settings(&mut self, settings: EngineSettings, now: Instant) -> Result<(), SettingsError> {
        settings.validate()?;
        debug!(depth = settings.depth, skill_level = settings.skill_level, "Engine settings scheduled");
        self.debouncer.schedule(settings, now);
        Ok(())
    }

    pub fn settings_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Send queued settings if their quiet period is over, then refresh the
    /// analysis for the live position unless the user is browsing.
    pub async fn flush_settings(&mut self, now: Instant) -> Result<Option<Reconciled>, SettingsError> {
        let Some(settings) = self.debouncer.take_due(now) else {
            return Ok(None);
        };
        self.server.update_engine_settings(&settings).await?;
        self.settings = settings;
        info!(depth = settings.depth, skill_level = settings.skill_level, "Engine settings updated");

        if self.session.is_browsing() {
            debug!("Browsing; analysis refresh skipped");
            return Ok(None);
        }
        Ok(Some(self.request_engine_move().await?))
    }

    // ---- Preferences ----

    pub fn set_analysis_panel_expanded(&mut self, expanded: bool) -> Result<(), PrefsError> {
        self.prefs.analysis_details_collapsed = !expanded;
        self.session.set_overlay_expanded(expanded);
        self.save_prefs()
    }

    pub fn set_engine_panel_expanded(&mut self, expanded: bool) -> Result<(), PrefsError> {
        self.prefs.engine_settings_collapsed = !expanded;
        self.save_prefs()
    }

    pub fn toggle_theme(&mut self) -> Result<Theme, PrefsError> {
        self.prefs.theme = self.prefs.theme.toggled();
        self.save_prefs()?;
        Ok(self.prefs.theme)
    }

    fn save_prefs(&self) -> Result<(), PrefsError> {
        match &self.prefs_path {
            Some(path) => self.prefs.save(path),
            None => Ok(()),
        }
    }
}
