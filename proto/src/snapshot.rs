//! Normalized match state as broadcast to clients.
//!
//! Positions and speeds are percentages of the arena extent so a client can
//! scale them to any viewport.

use game_core::{normalize, normalize_point, AnimationTimes, Goals, Match, MatchPhase, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub x: f64,
    pub y: f64,
    pub vx: f64, // direction, [-1, 1]
    pub vy: f64,
    pub speedx: f64, // percent per ms
    pub speedy: f64,
}

/// Paddle center
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PaddleState {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub tick: u32,
    pub phase: MatchPhase,
    pub goal: bool,
    pub last_touch: Option<Side>,
    pub conceded: Vec<Side>,
    pub ball: BallState,
    pub left: Option<PaddleState>,
    pub right: Option<PaddleState>,
    pub top: Option<PaddleState>,
    pub bottom: Option<PaddleState>,
    pub goals: Goals,
    pub old_goals: Goals,
    pub animation_time: AnimationTimes,
}

impl GameSnapshot {
    /// Capture the current state of `game`
    pub fn capture(game: &Match) -> Self {
        let arena = game.arena();
        let extent = arena.extent();
        let ball = game.ball();
        let ball_pos = normalize_point(ball.pos, extent);
        let paddle = |side: Side| {
            game.paddle(side).map(|p| {
                let center = normalize_point(arena.paddle_center(&p), extent);
                PaddleState {
                    x: center.x,
                    y: center.y,
                }
            })
        };
        let (goals, old_goals) = game.display_goals();
        let score = game.score();

        Self {
            tick: game.tick_count(),
            phase: game.phase(),
            goal: game.goal_pending(),
            last_touch: score.last_touch,
            conceded: score.conceded.clone(),
            ball: BallState {
                x: ball_pos.x,
                y: ball_pos.y,
                vx: ball.dir.x,
                vy: ball.dir.y,
                speedx: normalize(ball.speed.x, arena.width),
                speedy: normalize(ball.speed.y, arena.height),
            },
            left: paddle(Side::Left),
            right: paddle(Side::Right),
            top: paddle(Side::Top),
            bottom: paddle(Side::Bottom),
            goals,
            old_goals,
            animation_time: game.animation().unwrap_or_default(),
        }
    }

    pub fn paddle(&self, side: Side) -> Option<PaddleState> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    pub fn paddle_mut(&mut self, side: Side) -> &mut Option<PaddleState> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
        }
    }
}
