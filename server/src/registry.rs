use crate::config::{MatchConfig, ServerConfig};
use crate::error::SessionError;
use crate::runner::run_session;
use crate::session::{Environment, Inbound, MatchSession, SessionSettings, TokioEnv};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

const INBOX_CAPACITY: usize = 256;

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub match_id: String,
    inbox: mpsc::Sender<Inbound>,
    close: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    /// Queue a message for the session's next tick
    pub async fn send(&self, inbound: Inbound) -> Result<(), SessionError> {
        self.inbox
            .send(inbound)
            .await
            .map_err(|_| SessionError::InboxClosed)
    }

    /// Stop the session loop; queued messages are dropped
    pub fn close(&self) {
        let _ = self.close.send(true);
    }

    pub fn is_closed(&self) -> bool {
        self.inbox.is_closed()
    }
}

/// Registry of all active sessions, keyed by match id
pub struct SessionRegistry {
    sessions: Arc<DashMap<String, SessionHandle>>,
    tick: Duration,
    defaults: SessionSettings,
    auto_create: bool,
}

impl SessionRegistry {
    pub fn new(tick: Duration, defaults: SessionSettings, auto_create: bool) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            tick,
            defaults,
            auto_create,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        let defaults = SessionSettings {
            snapshot_every: config.snapshot_every,
            idle_timeout_ms: config.idle_timeout().as_millis() as u64,
            codec: config.codec,
            ai_players: 0,
        };
        Self::new(config.tick_interval(), defaults, config.auto_create_sessions)
    }

    /// Create a session and spawn its loop. The entry is removed again when
    /// the loop ends.
    pub fn create(
        &self,
        match_config: &MatchConfig,
    ) -> Result<(SessionHandle, JoinHandle<()>), SessionError> {
        self.create_with_env(match_config, Box::new(TokioEnv::new()))
    }

    pub fn create_with_env(
        &self,
        match_config: &MatchConfig,
        env: Box<dyn Environment>,
    ) -> Result<(SessionHandle, JoinHandle<()>), SessionError> {
        let config = match_config
            .game_config()
            .map_err(|_| SessionError::UnsupportedPlayerCount(match_config.players))?;

        let entry = match self.sessions.entry(match_config.id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                return Err(SessionError::DuplicateMatch(match_config.id.clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => entry,
        };

        let settings = SessionSettings {
            ai_players: match_config.ai_players,
            ..self.defaults
        };
        let session = MatchSession::new(match_config.id.clone(), config, settings, env);
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (close_tx, close_rx) = watch::channel(false);
        let handle = SessionHandle {
            match_id: match_config.id.clone(),
            inbox: inbox_tx,
            close: Arc::new(close_tx),
        };
        entry.insert(handle.clone());
        info!(
            match_id = %match_config.id,
            players = match_config.players,
            ai = match_config.ai_players,
            "Session created"
        );

        let sessions = self.sessions.clone();
        let match_id = match_config.id.clone();
        let tick = self.tick;
        let task = tokio::spawn(async move {
            run_session(session, inbox_rx, close_rx, tick).await;
            sessions.remove(&match_id);
        });
        Ok((handle, task))
    }

    pub fn get(&self, match_id: &str) -> Option<SessionHandle> {
        self.sessions.get(match_id).map(|s| s.value().clone())
    }

    /// Look up a session, creating a 2-player one if the registry allows it
    pub fn resolve(&self, match_id: &str) -> Result<SessionHandle, SessionError> {
        if let Some(handle) = self.get(match_id) {
            return Ok(handle);
        }
        if !self.auto_create {
            return Err(SessionError::MatchSessionNotFound(match_id.to_string()));
        }
        match self.create(&MatchConfig::new(match_id, 2)) {
            Ok((handle, _task)) => Ok(handle),
            // Lost a race with another connection creating the same id
            Err(SessionError::DuplicateMatch(_)) => self
                .get(match_id)
                .ok_or_else(|| SessionError::MatchSessionNotFound(match_id.to_string())),
            Err(e) => Err(e),
        }
    }

    /// Close a session's loop. The entry disappears once the loop exits.
    pub fn close(&self, match_id: &str) -> bool {
        match self.get(match_id) {
            Some(handle) => {
                handle.close();
                true
            }
            None => false,
        }
    }

    pub fn close_all(&self) {
        for entry in self.sessions.iter() {
            entry.value().close();
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
