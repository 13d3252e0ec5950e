//! Client side of the Pong sync protocol: mirrors server snapshots,
//! predicts the player's own paddle and maps everything to a viewport.

pub mod animation;
pub mod fsm;
pub mod input;
pub mod network;
pub mod prediction;
pub mod state;

pub use animation::GoalAnimation;
pub use fsm::{ClientAction, ClientFsm, FsmState};
pub use input::KeyTracker;
pub use prediction::PaddlePredictor;
pub use state::{ApplyOutcome, GameState};

use game_core::{AnimationStage, Config, Goals, MatchPhase, Side, Viewport};
use glam::DVec2;
use proto::{Codec, PlayerRole, ProtocolError, C2S, S2C};
use tracing::{debug, info, warn};

/// Owns everything a client needs between connect and disconnect
pub struct ClientRuntime {
    role: PlayerRole,
    user: String,
    match_id: String,
    config: Config,
    codec: Codec,
    fsm: ClientFsm,
    state: GameState,
    animation: GoalAnimation,
    keys: KeyTracker,
    predictor: Option<PaddlePredictor>,
    side: Option<Side>,
    active_connections: u32,
    final_result: Option<(Option<Side>, Goals)>,
    last_rtt_ms: Option<u64>,
}

impl ClientRuntime {
    pub fn new(
        role: PlayerRole,
        user: impl Into<String>,
        match_id: impl Into<String>,
        config: Config,
        codec: Codec,
    ) -> Self {
        let goal_animation_ms = config.goal_animation_ms;
        Self {
            role,
            user: user.into(),
            match_id: match_id.into(),
            config,
            codec,
            fsm: ClientFsm::new(),
            state: GameState::new(),
            animation: GoalAnimation::new(goal_animation_ms),
            keys: KeyTracker::new(),
            predictor: None,
            side: None,
            active_connections: 0,
            final_result: None,
            last_rtt_ms: None,
        }
    }

    /// Begin connecting; returns the register message to send
    pub fn start(&mut self) -> Option<C2S> {
        if !self.fsm.transition(ClientAction::Connect).success {
            warn!(state = ?self.fsm.state(), "start called while already running");
            return None;
        }
        info!(match_id = %self.match_id, role = %self.role, "Connecting");
        Some(network::register_message(self.role, &self.user, &self.match_id))
    }

    /// Leave the match and forget its state. Returns the close message when
    /// there is a live connection to close.
    pub fn stop(&mut self) -> Option<C2S> {
        let was_connected = self.fsm.state() != FsmState::Idle;
        self.fsm.reset();
        self.state.clear();
        self.animation = GoalAnimation::new(self.config.goal_animation_ms);
        self.keys = KeyTracker::new();
        self.predictor = None;
        self.side = None;
        self.final_result = None;
        was_connected.then(network::close_message)
    }

    pub fn lifecycle(&self) -> FsmState {
        self.fsm.state()
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn active_connections(&self) -> u32 {
        self.active_connections
    }

    pub fn final_result(&self) -> Option<(Option<Side>, Goals)> {
        self.final_result
    }

    pub fn last_rtt_ms(&self) -> Option<u64> {
        self.last_rtt_ms
    }

    pub fn mirror(&self) -> &GameState {
        &self.state
    }

    pub fn ready(&self) -> C2S {
        network::ready_message(self.role)
    }

    pub fn ping(&self, now_ms: u64) -> C2S {
        network::ping_message(now_ms)
    }

    /// Decode and apply one frame from the server
    pub fn handle_bytes(&mut self, bytes: &[u8], now_ms: u64) -> Result<(), ProtocolError> {
        let msg: S2C = self.codec.decode(bytes)?;
        self.handle_message(msg, now_ms);
        Ok(())
    }

    /// Handle incoming server message
    pub fn handle_message(&mut self, msg: S2C, now_ms: u64) {
        match msg {
            S2C::MyPaddle { side, receiver } => {
                if receiver != self.role.as_str() {
                    debug!(%receiver, "myPaddle for another role ignored");
                    return;
                }
                info!(%side, "Seat assigned");
                self.side = Some(side);
                self.predictor = Some(PaddlePredictor::new(side, &self.config));
                self.fsm.transition(ClientAction::Registered);
            }
            S2C::UpdateGameData(snapshot) => {
                let tick = snapshot.tick;
                let own = self.side.and_then(|side| {
                    snapshot
                        .paddle(side)
                        .map(|p| if side.moves_vertically() { p.y } else { p.x })
                });
                let phase_changed = self.state.phase() != Some(snapshot.phase);
                if self.state.apply(snapshot) == ApplyOutcome::Stale {
                    debug!(tick, "Stale snapshot dropped");
                    return;
                }
                if let Some(current) = self.state.current() {
                    self.animation.observe(current, now_ms);
                }
                if let (Some(predictor), Some(position)) = (self.predictor.as_mut(), own) {
                    if phase_changed {
                        predictor.snap_to(position);
                    }
                    predictor.reconcile(position, tick);
                }
            }
            S2C::LaunchGame {} => {
                info!(match_id = %self.match_id, "Match launched");
                self.fsm.transition(ClientAction::Launched);
            }
            S2C::ActiveConnections { count } => {
                self.active_connections = count;
            }
            S2C::PlayerDisconnection {} => {
                warn!(match_id = %self.match_id, "A player left, match aborted");
                self.fsm.transition(ClientAction::OpponentLeft);
            }
            S2C::GameOver { winner, goals } => {
                info!(?winner, ?goals, "Game over");
                self.final_result = Some((winner, goals));
                self.fsm.transition(ClientAction::GameOver);
            }
            S2C::Error { code, message } => {
                warn!(?code, %message, "Server refused request");
                if self.fsm.state() == FsmState::Connecting {
                    self.fsm.transition(ClientAction::Rejected);
                }
            }
            S2C::Pong { t_ms } => {
                self.last_rtt_ms = Some(now_ms.saturating_sub(t_ms));
            }
        }
    }

    /// The transport reported the connection closed
    pub fn connection_lost(&mut self) {
        self.fsm.transition(ClientAction::ConnectionLost);
    }

    /// Returns a direction update to send when the key changed it
    pub fn key_down(&mut self, key: &str) -> Option<C2S> {
        let dir = self.keys.key_down(key)?;
        self.direction_update(dir)
    }

    pub fn key_up(&mut self, key: &str) -> Option<C2S> {
        let dir = self.keys.key_up(key)?;
        self.direction_update(dir)
    }

    fn direction_update(&self, dir: game_core::Direction) -> Option<C2S> {
        let side = self.side?;
        self.fsm
            .is_playing()
            .then(|| network::direction_message(side, dir))
    }

    /// Advance interpolation and the own-paddle prediction by one frame
    pub fn frame(&mut self, dt_ms: f64) {
        self.state.update_interpolation(dt_ms);
        let live = self.fsm.is_playing() && self.state.phase() == Some(MatchPhase::Rally);
        if let Some(predictor) = self.predictor.as_mut() {
            if live {
                predictor.update(self.keys.direction(), dt_ms);
            }
        }
    }

    /// Paddle center in percent, predicted for the own side
    pub fn paddle_position(&self, side: Side) -> Option<DVec2> {
        match &self.predictor {
            Some(predictor) if predictor.side() == side && self.state.current().is_some() => {
                Some(predictor.center())
            }
            _ => self.state.paddle_position(side),
        }
    }

    pub fn ball_pixels(&self, viewport: &Viewport) -> Option<DVec2> {
        self.state.ball_position().map(|p| viewport.to_pixels(p))
    }

    pub fn paddle_pixels(&self, side: Side, viewport: &Viewport) -> Option<DVec2> {
        self.paddle_position(side).map(|p| viewport.to_pixels(p))
    }

    /// Ball speed in pixels per ms for the given viewport
    pub fn ball_speed_pixels(&self, viewport: &Viewport) -> Option<DVec2> {
        let ball = self.state.current()?.ball;
        Some(viewport.speed_to_pixels(DVec2::new(ball.speedx, ball.speedy)))
    }

    pub fn animation_stage(&self, now_ms: u64) -> AnimationStage {
        self.animation.stage(now_ms)
    }

    /// Tally to draw right now
    pub fn displayed_goals(&self, now_ms: u64) -> Goals {
        match self.state.current() {
            Some(snapshot) => self.animation.displayed_goals(snapshot, now_ms),
            None => Goals::default(),
        }
    }
}
