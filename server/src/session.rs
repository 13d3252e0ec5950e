use crate::error::SessionError;
use game_core::{Config, Direction, InputSource, Match, MatchEvent, MatchPhase, Side};
use proto::{Codec, Command, GameSnapshot, PlayerRole, S2C};
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// Identifies one client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl std::fmt::Display for ConnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Abstract connection so sessions can be tested without sockets
pub trait GameClient: Send {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), SessionError>;

    /// Ask the transport to hang up
    fn close(&self) {}
}

// Abstract environment (clock)
pub trait Environment: Send {
    fn now(&self) -> u64; // ms, monotonic
}

/// Clock driven by tokio time, so paused-time tests advance it too
pub struct TokioEnv {
    start: tokio::time::Instant,
}

impl TokioEnv {
    pub fn new() -> Self {
        Self {
            start: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for TokioEnv {
    fn now(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Something the transport hands to a session
pub enum Inbound {
    Register {
        conn: ConnId,
        role: PlayerRole,
        user: String,
        client: Box<dyn GameClient>,
    },
    Command {
        conn: ConnId,
        command: Command,
    },
    Disconnect {
        conn: ConnId,
    },
}

/// Per-session knobs taken from the server config
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub snapshot_every: u32,
    /// 0 disables the idle check
    pub idle_timeout_ms: u64,
    pub codec: Codec,
    pub ai_players: u8,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            snapshot_every: 1,
            idle_timeout_ms: 0,
            codec: Codec::Json,
            ai_players: 0,
        }
    }
}

// Track client activity
pub struct ClientInfo {
    pub client: Box<dyn GameClient>,
    pub role: PlayerRole,
    pub user: String,
    pub side: Side,
    pub last_activity: u64, // ms
}

/// One authoritative match plus the connections attached to it.
///
/// Only the session's own loop touches it: inbound messages are applied in
/// between ticks via [`MatchSession::handle`].
pub struct MatchSession {
    pub match_id: String,
    pub env: Box<dyn Environment>,
    pub game: Match,
    pub settings: SessionSettings,
    pub clients: HashMap<ConnId, ClientInfo>,
    pub last_input: HashMap<Side, Direction>, // Track last input per side to reduce logging
    had_players: bool,
    finished: bool,
}

impl MatchSession {
    pub fn new(
        match_id: impl Into<String>,
        config: Config,
        settings: SessionSettings,
        env: Box<dyn Environment>,
    ) -> Self {
        let seed = rand::random();
        let mut session = Self {
            match_id: match_id.into(),
            env,
            game: Match::new(config, seed),
            settings,
            clients: HashMap::new(),
            last_input: HashMap::new(),
            had_players: false,
            finished: false,
        };
        session.fill_ai_seats();
        session
    }

    pub fn phase(&self) -> MatchPhase {
        self.game.phase()
    }

    /// The session loop should stop
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn handle(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::Register {
                conn,
                role,
                user,
                client,
            } => {
                if let Err(e) = self.register(conn, role, user, client) {
                    debug!(match_id = %self.match_id, %conn, error = %e, "Registration refused");
                }
            }
            Inbound::Command { conn, command } => self.handle_command(conn, command),
            Inbound::Disconnect { conn } => self.remove_client(conn),
        }
    }

    /// Seat a connection. On refusal the client gets an `error` message
    /// and is closed.
    pub fn register(
        &mut self,
        conn: ConnId,
        role: PlayerRole,
        user: String,
        client: Box<dyn GameClient>,
    ) -> Result<Side, SessionError> {
        let seated = if self.clients.values().any(|c| c.role == role) {
            Err(SessionError::RoleTaken(role))
        } else {
            self.game
                .join(InputSource::Remote)
                .ok_or(SessionError::MatchFull)
        };

        let side = match seated {
            Ok(side) => side,
            Err(e) => {
                self.send_to(client.as_ref(), &S2C::error(e.code(), e.to_string()));
                client.close();
                return Err(e);
            }
        };

        info!(match_id = %self.match_id, %conn, %role, %side, user = %user, "Player registered");
        self.send_to(
            client.as_ref(),
            &S2C::MyPaddle {
                side,
                receiver: role.as_str().to_string(),
            },
        );
        self.clients.insert(
            conn,
            ClientInfo {
                client,
                role,
                user,
                side,
                last_activity: self.env.now(),
            },
        );
        self.had_players = true;
        self.fill_ai_seats();
        self.broadcast_active_connections();
        Ok(side)
    }

    /// Hand the remaining seats to the AI once only AI seats are left
    fn fill_ai_seats(&mut self) {
        let total = self.game.config().sides().len();
        let free = total - self.game.seated().count();
        if free > 0 && free <= self.settings.ai_players as usize {
            while let Some(side) = self.game.join(InputSource::LocalAi) {
                debug!(match_id = %self.match_id, %side, "AI seated");
            }
        }
    }

    pub fn handle_command(&mut self, conn: ConnId, command: Command) {
        let now = self.env.now();
        let Some(info) = self.clients.get_mut(&conn) else {
            debug!(match_id = %self.match_id, %conn, "Command from unregistered connection");
            return;
        };
        info.last_activity = now;
        let (role, side) = (info.role, info.side);

        match command {
            Command::Ready { role: claimed } => {
                if claimed != role {
                    debug!(
                        match_id = %self.match_id,
                        %conn,
                        %claimed,
                        "Ready for foreign role ignored"
                    );
                    return;
                }
                if self.game.set_ready(side) {
                    info!(match_id = %self.match_id, %side, "Player ready");
                }
            }
            Command::Direction { side: claimed, dir } => {
                self.handle_direction(conn, side, claimed, dir);
            }
            Command::Ping { t_ms } => {
                if let Some(info) = self.clients.get(&conn) {
                    self.send_to(info.client.as_ref(), &S2C::Pong { t_ms });
                }
            }
            Command::Close => self.remove_client(conn),
            Command::Register { .. } => {
                debug!(match_id = %self.match_id, %conn, "Duplicate register ignored");
            }
        }
    }

    /// Apply a direction from `conn`, which owns `owned`. Claims on any
    /// other side are dropped without touching state.
    pub fn handle_direction(
        &mut self,
        conn: ConnId,
        owned: Side,
        claimed: Side,
        dir: Direction,
    ) -> bool {
        if claimed != owned {
            debug!(
                match_id = %self.match_id,
                %conn,
                %owned,
                %claimed,
                "Direction for foreign paddle rejected"
            );
            return false;
        }

        // Only log when input changes (reduces log spam)
        let last_dir = self.last_input.insert(owned, dir);
        if last_dir != Some(dir) {
            debug!(
                match_id = %self.match_id,
                side = %owned,
                from = ?last_dir,
                to = ?dir,
                "Input changed"
            );
        }
        self.game.push_input(owned, dir)
    }

    /// A connection went away, for whatever reason
    pub fn remove_client(&mut self, conn: ConnId) {
        let Some(info) = self.clients.remove(&conn) else {
            return;
        };
        info.client.close();
        info!(match_id = %self.match_id, %conn, side = %info.side, "Player left");

        let before = self.game.phase();
        let after = self.game.leave(info.side);
        self.last_input.remove(&info.side);

        if after == MatchPhase::Aborted && before != MatchPhase::Aborted {
            warn!(
                match_id = %self.match_id,
                side = %info.side,
                "Player disconnected mid-match, aborting"
            );
            self.broadcast(&S2C::PlayerDisconnection {});
            self.broadcast_snapshot();
            self.finish();
            return;
        }

        self.broadcast_active_connections();
        if self.clients.is_empty() && self.had_players {
            info!(match_id = %self.match_id, "All players left");
            self.finished = true;
        }
    }

    fn drop_idle_clients(&mut self) {
        let now = self.env.now();
        let timeout = self.settings.idle_timeout_ms;
        if timeout == 0 {
            return;
        }
        let idle: Vec<ConnId> = self
            .clients
            .iter()
            .filter(|(_, info)| now.saturating_sub(info.last_activity) > timeout)
            .map(|(conn, _)| *conn)
            .collect();

        for conn in idle {
            info!(match_id = %self.match_id, %conn, "Client idle, disconnecting");
            self.remove_client(conn);
        }
    }

    /// Run one tick. Returns false once the loop should stop.
    pub fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.drop_idle_clients();
        if self.finished {
            return false;
        }

        let now = self.env.now();
        let events = self.game.tick(now);
        let tick = self.game.tick_count();

        if tick % 60 == 0 {
            info!(
                match_id = %self.match_id,
                tick,
                phase = %self.game.phase(),
                clients = self.clients.len(),
                "Heartbeat"
            );
        }

        for event in events {
            self.relay_event(event);
        }

        if self.game.phase().is_terminal() {
            self.broadcast_snapshot();
            self.finish();
            return false;
        }
        if tick % self.settings.snapshot_every.max(1) == 0 {
            self.broadcast_snapshot();
        }
        true
    }

    fn relay_event(&mut self, event: MatchEvent) {
        match event {
            MatchEvent::Launched => {
                info!(match_id = %self.match_id, "Match launched");
                self.broadcast(&S2C::LaunchGame {});
            }
            MatchEvent::PhaseChanged(phase) => {
                debug!(match_id = %self.match_id, %phase, "Phase changed");
            }
            MatchEvent::Goal { conceded, .. } => {
                info!(match_id = %self.match_id, ?conceded, "Goal");
            }
            MatchEvent::GoalSettled { credited, goals } => {
                info!(match_id = %self.match_id, ?credited, ?goals, "Score updated");
            }
            MatchEvent::MatchOver { winner, goals } => {
                info!(match_id = %self.match_id, ?winner, ?goals, "Match over");
                self.broadcast(&S2C::GameOver { winner, goals });
            }
            MatchEvent::TimingAnomaly => {
                trace!(match_id = %self.match_id, "Frame delta out of band, ball step skipped");
            }
            MatchEvent::PaddleHit(side) => {
                trace!(match_id = %self.match_id, %side, "Paddle hit");
            }
            MatchEvent::WallHit => {}
        }
    }

    /// Close every connection and stop the loop
    pub fn finish(&mut self) {
        self.finished = true;
        for info in self.clients.values() {
            info.client.close();
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.game)
    }

    pub fn broadcast_snapshot(&self) {
        if self.clients.is_empty() {
            return;
        }
        self.broadcast(&S2C::UpdateGameData(self.snapshot()));
    }

    fn broadcast_active_connections(&self) {
        let count = self.clients.len() as u32;
        self.broadcast(&S2C::ActiveConnections { count });
    }

    /// Broadcast a message to all connected clients
    pub fn broadcast(&self, msg: &S2C) {
        match self.settings.codec.encode(msg) {
            Ok(bytes) => {
                for info in self.clients.values() {
                    let _ = info.client.send_bytes(&bytes);
                }
            }
            Err(e) => warn!(match_id = %self.match_id, error = %e, "Failed to encode message"),
        }
    }

    fn send_to(&self, client: &dyn GameClient, msg: &S2C) {
        match self.settings.codec.encode(msg) {
            Ok(bytes) => {
                let _ = client.send_bytes(&bytes);
            }
            Err(e) => warn!(match_id = %self.match_id, error = %e, "Failed to encode message"),
        }
    }
}
