//! Local prediction for the player's own paddle.
//!
//! Only the own paddle is predicted; the ball and every other paddle come
//! straight from the snapshot mirror.

use game_core::{denormalize, normalize, Arena, Config, Direction, Paddle, Params, Side};
use glam::DVec2;

/// Beyond this distance (percent of the arena) the prediction snaps to the
/// server instead of easing toward it
const SNAP_THRESHOLD: f64 = 5.0;
/// Share of the remaining error removed per reconcile
const CORRECTION_RATE: f64 = 0.2;

pub struct PaddlePredictor {
    paddle: Paddle,
    arena: Arena,
    bounds: (f64, f64),
    pub last_reconciled_tick: u32,
}

impl PaddlePredictor {
    pub fn new(side: Side, config: &Config) -> Self {
        let arena = Arena::new(config);
        let paddle = Paddle::new(side, arena.paddle_spawn(side), config);
        Self {
            bounds: arena.paddle_bounds(side, paddle.length),
            paddle,
            arena,
            last_reconciled_tick: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.paddle.side
    }

    fn axis_extent(&self) -> f64 {
        self.arena.axis_extent(self.paddle.side)
    }

    /// Position along the movement axis, percent of the arena
    pub fn position(&self) -> f64 {
        normalize(self.paddle.position, self.axis_extent())
    }

    /// Paddle center, percent of the arena
    pub fn center(&self) -> DVec2 {
        let center = self.arena.paddle_center(&self.paddle);
        DVec2::new(
            normalize(center.x, self.arena.width),
            normalize(center.y, self.arena.height),
        )
    }

    /// Run the same movement rule the server applies
    pub fn update(&mut self, dir: Direction, dt_ms: f64) {
        let dt_ms = dt_ms.clamp(0.0, Params::MAX_DT_MS);
        self.paddle.move_by(dir.as_i8(), dt_ms, self.bounds);
    }

    /// Fold in the authoritative position (percent along the axis)
    pub fn reconcile(&mut self, server_position: f64, server_tick: u32) {
        if server_tick <= self.last_reconciled_tick && self.last_reconciled_tick != 0 {
            return;
        }
        self.last_reconciled_tick = server_tick;

        let error = server_position - self.position();
        let corrected = if error.abs() > SNAP_THRESHOLD {
            server_position
        } else {
            self.position() + error * CORRECTION_RATE
        };
        self.paddle.position = denormalize(corrected, self.axis_extent());
    }

    /// Jump straight to the server position, e.g. after a goal reset
    pub fn snap_to(&mut self, server_position: f64) {
        self.paddle.position = denormalize(server_position, self.axis_extent());
    }
}
