//! Snapshot mirror with interpolation

use game_core::{MatchPhase, Side};
use glam::DVec2;
use proto::GameSnapshot;

/// Interpolate over slightly more than one snapshot interval to hide jitter
const INTERPOLATION_MS: f64 = 60.0;

/// What happened to an incoming snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// Tick not newer than the last applied one; dropped
    Stale,
}

/// Read-only mirror of the authoritative match
#[derive(Debug, Clone, Default)]
pub struct GameState {
    // Current authoritative state from server
    current: Option<GameSnapshot>,
    // Previous state for interpolation
    previous: Option<GameSnapshot>,
    // Interpolation time (0.0 = previous, 1.0 = current)
    interpolation_alpha: f64,
    time_since_update: f64,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a snapshot unless it is older than what is already shown.
    /// Applying the same snapshot twice is a no-op.
    pub fn apply(&mut self, snapshot: GameSnapshot) -> ApplyOutcome {
        if let Some(current) = &self.current {
            if snapshot.tick <= current.tick {
                return ApplyOutcome::Stale;
            }
        }
        self.previous = self.current.take();
        self.current = Some(snapshot);
        self.time_since_update = 0.0;
        self.interpolation_alpha = 0.0;
        ApplyOutcome::Applied
    }

    /// Update interpolation based on elapsed time
    pub fn update_interpolation(&mut self, dt_ms: f64) {
        self.time_since_update += dt_ms;
        self.interpolation_alpha = (self.time_since_update / INTERPOLATION_MS).min(1.0);
    }

    pub fn current(&self) -> Option<&GameSnapshot> {
        self.current.as_ref()
    }

    pub fn last_tick(&self) -> Option<u32> {
        self.current.as_ref().map(|s| s.tick)
    }

    pub fn phase(&self) -> Option<MatchPhase> {
        self.current.as_ref().map(|s| s.phase)
    }

    // Resets and phase changes jump instead of sliding across the field
    fn blend_source(&self) -> Option<&GameSnapshot> {
        match (&self.previous, &self.current) {
            (Some(prev), Some(curr)) if prev.phase == curr.phase => Some(prev),
            _ => None,
        }
    }

    fn interpolate(&self, prev: DVec2, curr: DVec2) -> DVec2 {
        prev.lerp(curr, self.interpolation_alpha)
    }

    /// Interpolated ball center, percent of the arena
    pub fn ball_position(&self) -> Option<DVec2> {
        let curr = self.current.as_ref()?;
        let target = DVec2::new(curr.ball.x, curr.ball.y);
        Some(match self.blend_source() {
            Some(prev) => self.interpolate(DVec2::new(prev.ball.x, prev.ball.y), target),
            None => target,
        })
    }

    /// Interpolated paddle center, percent of the arena
    pub fn paddle_position(&self, side: Side) -> Option<DVec2> {
        let curr = self.current.as_ref()?.paddle(side)?;
        let target = DVec2::new(curr.x, curr.y);
        let prev = self.blend_source().and_then(|prev| prev.paddle(side));
        Some(match prev {
            Some(prev) => self.interpolate(DVec2::new(prev.x, prev.y), target),
            None => target,
        })
    }

    pub fn time_since_update(&self) -> f64 {
        self.time_since_update
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
