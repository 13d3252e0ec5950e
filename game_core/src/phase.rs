use serde::{Deserialize, Serialize};

/// Lifecycle of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchPhase {
    #[default]
    WaitingForPlayers,
    Ready,
    Kickoff,
    Rally,
    GoalAnimation,
    MatchOver,
    Aborted,
}

impl MatchPhase {
    /// No further transitions happen from a terminal phase
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchPhase::MatchOver | MatchPhase::Aborted)
    }

    /// Whether the ball is in play or a goal is being shown
    pub fn is_live(self) -> bool {
        matches!(
            self,
            MatchPhase::Kickoff | MatchPhase::Rally | MatchPhase::GoalAnimation
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchPhase::WaitingForPlayers => "waitingForPlayers",
            MatchPhase::Ready => "ready",
            MatchPhase::Kickoff => "kickoff",
            MatchPhase::Rally => "rally",
            MatchPhase::GoalAnimation => "goalAnimation",
            MatchPhase::MatchOver => "matchOver",
            MatchPhase::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Server-clock stamps (ms) closing each window of the goal animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationTimes {
    pub first: u64,
    pub second: u64,
    pub third: u64,
}

impl AnimationTimes {
    pub fn stamp(goal_ms: u64, offsets: [u64; 3]) -> Self {
        Self {
            first: goal_ms + offsets[0],
            second: goal_ms + offsets[1],
            third: goal_ms + offsets[2],
        }
    }

    /// Window the animation is in at `now_ms`
    pub fn stage(&self, now_ms: u64) -> AnimationStage {
        if now_ms < self.first {
            AnimationStage::Goal
        } else if now_ms < self.second {
            AnimationStage::OldScore
        } else if now_ms < self.third {
            AnimationStage::NewScore
        } else {
            AnimationStage::Done
        }
    }

    pub fn finished(&self, now_ms: u64) -> bool {
        now_ms >= self.third
    }
}

/// Display windows of the goal animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStage {
    /// Goal banner
    Goal,
    /// Tally before the goal
    OldScore,
    /// Tally after the goal
    NewScore,
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_stages() {
        let times = AnimationTimes::stamp(10_000, [500, 1000, 1500]);
        assert_eq!(times.stage(10_000), AnimationStage::Goal);
        assert_eq!(times.stage(10_499), AnimationStage::Goal);
        assert_eq!(times.stage(10_500), AnimationStage::OldScore);
        assert_eq!(times.stage(11_000), AnimationStage::NewScore);
        assert_eq!(times.stage(11_500), AnimationStage::Done);
        assert!(!times.finished(11_499));
        assert!(times.finished(11_500));
    }

    #[test]
    fn test_terminal_phases() {
        assert!(MatchPhase::MatchOver.is_terminal());
        assert!(MatchPhase::Aborted.is_terminal());
        assert!(!MatchPhase::GoalAnimation.is_terminal());
        assert!(MatchPhase::Rally.is_live());
        assert!(!MatchPhase::Ready.is_live());
    }
}
