use crate::{Params, Side};
use glam::DVec2;

/// Who gets credited when the ball leaves the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalAttribution {
    /// Whoever touched the ball last scores, own goals included.
    /// Nobody scores if the ball was untouched since kickoff.
    LastTouch,
    /// The side opposite the conceding wall scores
    Opponent,
}

/// Game configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub player_count: u8,
    pub arena_size: f64,
    pub goal_line_inset: f64,
    pub paddle_length: f64,
    pub paddle_thickness: f64,
    pub paddle_speed: f64,
    pub ball_radius: f64,
    pub ball_speed_base: DVec2,
    pub ball_speed_increment: f64,
    pub wall_bounce: f64,
    pub wall_max_vy: f64,
    pub score_limit: u32,
    pub attribution: GoalAttribution,
    /// Players confirm again after every goal (classic 2-player flow)
    pub ready_after_goal: bool,
    pub goal_animation_ms: [u64; 3],
    pub ai_refresh_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::two_player()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classic duel: left/right goals, top/bottom walls
    pub fn two_player() -> Self {
        Self {
            player_count: 2,
            arena_size: Params::ARENA_SIZE,
            goal_line_inset: Params::GOAL_LINE_INSET,
            paddle_length: Params::PADDLE_LENGTH,
            paddle_thickness: Params::PADDLE_THICKNESS,
            paddle_speed: Params::PADDLE_SPEED,
            ball_radius: Params::BALL_RADIUS,
            ball_speed_base: DVec2::new(Params::BALL_SPEED_X, Params::BALL_SPEED_Y),
            ball_speed_increment: Params::BALL_SPEED_INCREMENT,
            wall_bounce: Params::WALL_BOUNCE,
            wall_max_vy: Params::WALL_MAX_VY,
            score_limit: Params::SCORE_LIMIT_TWO_PLAYER,
            attribution: GoalAttribution::Opponent,
            ready_after_goal: true,
            goal_animation_ms: Params::GOAL_ANIMATION_MS,
            ai_refresh_ms: Params::AI_REFRESH_MS,
        }
    }

    /// Four walls, four goals, credit to the last touch
    pub fn four_player() -> Self {
        Self {
            player_count: 4,
            score_limit: Params::SCORE_LIMIT_FOUR_PLAYER,
            attribution: GoalAttribution::LastTouch,
            ready_after_goal: false,
            ..Self::two_player()
        }
    }

    /// Preset for a player count; only 2 and 4 are supported
    pub fn for_players(player_count: u8) -> Option<Self> {
        match player_count {
            2 => Some(Self::two_player()),
            4 => Some(Self::four_player()),
            _ => None,
        }
    }

    pub fn with_score_limit(mut self, score_limit: u32) -> Self {
        self.score_limit = score_limit;
        self
    }

    /// Sides in play, in join order
    pub fn sides(&self) -> &'static [Side] {
        static TWO: [Side; 2] = [Side::Left, Side::Right];
        if self.player_count >= 4 {
            &Side::ALL
        } else {
            &TWO
        }
    }

    /// Whether top/bottom are bouncing walls rather than goals
    pub fn has_walls(&self) -> bool {
        self.player_count < 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let two = Config::two_player();
        assert_eq!(two.sides(), &[Side::Left, Side::Right]);
        assert!(two.has_walls());
        assert_eq!(two.attribution, GoalAttribution::Opponent);

        let four = Config::four_player();
        assert_eq!(four.sides().len(), 4);
        assert!(!four.has_walls());
        assert_eq!(four.attribution, GoalAttribution::LastTouch);
        assert_eq!(four.score_limit, 10);
    }

    #[test]
    fn test_for_players_rejects_other_counts() {
        assert!(Config::for_players(2).is_some());
        assert!(Config::for_players(4).is_some());
        assert!(Config::for_players(3).is_none());
        assert!(Config::for_players(0).is_none());
    }
}
