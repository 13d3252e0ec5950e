use crate::{Config, GoalAttribution, Side};
use serde::{Deserialize, Serialize};

/// Time resource for tracking simulation time
#[derive(Debug, Clone, Copy)]
pub struct Time {
    pub dt_ms: f64,  // Delta time for this step
    pub now_ms: u64, // Server clock
}

impl Time {
    pub fn new(dt_ms: f64, now_ms: u64) -> Self {
        Self { dt_ms, now_ms }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self {
            dt_ms: 16.0,
            now_ms: 0,
        }
    }
}

/// Goal tally per side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Goals {
    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
            Side::Top => &mut self.top,
            Side::Bottom => &mut self.bottom,
        }
    }

    pub fn increment(&mut self, side: Side) {
        *self.get_mut(side) += 1;
    }

    /// Side with the most goals among `sides`; ties go to the earlier side
    pub fn leader(&self, sides: &[Side]) -> Option<Side> {
        sides
            .iter()
            .copied()
            .fold(None, |best: Option<Side>, side| match best {
                Some(b) if self.get(b) >= self.get(side) => Some(b),
                _ => Some(side),
            })
    }
}

/// Game score tracking
#[derive(Debug, Clone)]
pub struct Score {
    pub goals: Goals,
    pub old_goals: Goals, // tally before the last settlement
    pub last_touch: Option<Side>,
    pub conceded: Vec<Side>,
    pub score_limit: u32,
    pub attribution: GoalAttribution,
}

impl Score {
    pub fn new(config: &Config) -> Self {
        Self {
            goals: Goals::default(),
            old_goals: Goals::default(),
            last_touch: None,
            conceded: Vec::new(),
            score_limit: config.score_limit,
            attribution: config.attribution,
        }
    }

    /// Side that the pending goal will credit, if any
    pub fn credited_side(&self) -> Option<Side> {
        match self.attribution {
            GoalAttribution::LastTouch => self.last_touch,
            GoalAttribution::Opponent => self.conceded.first().map(|side| side.opposite()),
        }
    }

    /// Tally that [`Score::update_score`] will produce, without applying it
    pub fn projected(&self) -> Goals {
        let mut goals = self.goals;
        if let Some(side) = self.credited_side() {
            goals.increment(side);
        }
        goals
    }

    /// Settle the pending goal. Conceding sides lose nothing visible; only
    /// the credited side moves. Returns the credited side.
    pub fn update_score(&mut self) -> Option<Side> {
        self.old_goals = self.goals;
        let credited = self.credited_side();
        if let Some(side) = credited {
            self.goals.increment(side);
        }
        credited
    }

    pub fn reset_goal_tracker(&mut self) {
        self.last_touch = None;
        self.conceded.clear();
    }

    pub fn has_winner(&self, sides: &[Side]) -> Option<Side> {
        sides
            .iter()
            .copied()
            .find(|side| self.goals.get(*side) >= self.score_limit)
    }
}

/// Random number generator
pub struct GameRng(pub rand::rngs::StdRng);

impl GameRng {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(12345)
    }
}

/// Events that occurred during this tick
#[derive(Debug, Clone, Default)]
pub struct Events {
    pub paddle_hits: Vec<Side>,
    pub wall_hit: bool,
    pub goal: bool,
    pub timing_anomaly: bool,
}

impl Events {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.paddle_hits.clear();
        self.wall_hit = false;
        self.goal = false;
        self.timing_anomaly = false;
    }
}

/// Queued direction changes, applied at the start of the next tick
#[derive(Debug, Clone, Default)]
pub struct NetQueue {
    pub inputs: Vec<(Side, i8)>, // (side, direction)
}

impl NetQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn push_input(&mut self, side: Side, dir: i8) {
        self.inputs.push((side, dir));
    }

    pub fn pop_inputs(&mut self) -> Vec<(Side, i8)> {
        std::mem::take(&mut self.inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_player_score() -> Score {
        Score::new(&Config::four_player())
    }

    #[test]
    fn test_last_touch_is_credited() {
        let mut score = four_player_score();
        score.last_touch = Some(Side::Left);
        score.conceded = vec![Side::Right];

        let credited = score.update_score();

        assert_eq!(credited, Some(Side::Left));
        assert_eq!(score.goals.left, 1);
        assert_eq!(score.goals.right, 0);
        assert_eq!(score.goals.top, 0);
        assert_eq!(score.goals.bottom, 0);
        assert_eq!(score.old_goals, Goals::default());
    }

    #[test]
    fn test_untouched_ball_scores_for_nobody() {
        let mut score = four_player_score();
        score.last_touch = None;
        score.conceded = vec![Side::Top];

        assert_eq!(score.update_score(), None);
        assert_eq!(score.goals, Goals::default());
    }

    #[test]
    fn test_own_goal() {
        let mut score = four_player_score();
        score.last_touch = Some(Side::Bottom);
        score.conceded = vec![Side::Bottom];
        score.update_score();
        assert_eq!(score.goals.bottom, 1);
    }

    #[test]
    fn test_opponent_attribution() {
        let mut score = Score::new(&Config::two_player());
        score.last_touch = Some(Side::Right);
        score.conceded = vec![Side::Right];
        assert_eq!(score.update_score(), Some(Side::Left));
        assert_eq!(score.goals.left, 1);
        assert_eq!(score.goals.right, 0);
    }

    #[test]
    fn test_projected_does_not_mutate() {
        let mut score = four_player_score();
        score.last_touch = Some(Side::Top);
        score.conceded = vec![Side::Right, Side::Bottom];
        let projected = score.projected();
        assert_eq!(projected.top, 1);
        assert_eq!(score.goals.top, 0);
        score.update_score();
        assert_eq!(score.goals, projected);
    }

    #[test]
    fn test_has_winner() {
        let mut score = Score::new(&Config::two_player().with_score_limit(3));
        let sides = [Side::Left, Side::Right];
        for _ in 0..2 {
            score.goals.increment(Side::Right);
        }
        assert_eq!(score.has_winner(&sides), None);
        score.goals.increment(Side::Right);
        assert_eq!(score.has_winner(&sides), Some(Side::Right));
    }

    #[test]
    fn test_goals_leader() {
        let goals = Goals {
            left: 2,
            right: 5,
            top: 5,
            bottom: 1,
        };
        assert_eq!(goals.leader(&Side::ALL), Some(Side::Right));
        assert_eq!(goals.leader(&[]), None);
    }

    #[test]
    fn test_events_clear() {
        let mut events = Events::new();
        events.paddle_hits.push(Side::Left);
        events.wall_hit = true;
        events.goal = true;
        events.timing_anomaly = true;

        events.clear();

        assert!(events.paddle_hits.is_empty());
        assert!(!events.wall_hit);
        assert!(!events.goal);
        assert!(!events.timing_anomaly);
    }

    #[test]
    fn test_net_queue_push_and_pop() {
        let mut queue = NetQueue::new();
        queue.push_input(Side::Left, -1);
        queue.push_input(Side::Top, 1);

        let inputs = queue.pop_inputs();
        assert_eq!(inputs, vec![(Side::Left, -1), (Side::Top, 1)]);
        assert!(queue.inputs.is_empty());
    }
}
