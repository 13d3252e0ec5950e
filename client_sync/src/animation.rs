//! Goal animation as seen by the client.
//!
//! Stamps in the snapshot are server-clock milliseconds. The client has no
//! shared clock, so it anchors the server clock to the local one when it
//! first sees a goal: that snapshot is taken as arriving at the goal instant.

use game_core::{AnimationStage, AnimationTimes, Goals};
use proto::GameSnapshot;

#[derive(Debug)]
pub struct GoalAnimation {
    /// Stage offsets from the goal instant, as the server configures them
    offsets: [u64; 3],
    times: Option<AnimationTimes>,
    // server ms minus local ms
    offset: i64,
}

impl GoalAnimation {
    pub fn new(offsets: [u64; 3]) -> Self {
        Self {
            offsets,
            times: None,
            offset: 0,
        }
    }

    /// Track the animation carried by `snapshot`, received at `local_ms`
    pub fn observe(&mut self, snapshot: &GameSnapshot, local_ms: u64) {
        if !snapshot.goal {
            self.times = None;
            return;
        }
        let times = snapshot.animation_time;
        if self.times != Some(times) {
            let goal_ms = times.first.saturating_sub(self.offsets[0]);
            self.offset = goal_ms as i64 - local_ms as i64;
            self.times = Some(times);
        }
    }

    pub fn is_active(&self) -> bool {
        self.times.is_some()
    }

    fn server_now(&self, local_ms: u64) -> u64 {
        (local_ms as i64 + self.offset).max(0) as u64
    }

    pub fn stage(&self, local_ms: u64) -> AnimationStage {
        match self.times {
            Some(times) => times.stage(self.server_now(local_ms)),
            None => AnimationStage::Done,
        }
    }

    /// Tally to draw: the old one until the new-score window opens
    pub fn displayed_goals(&self, snapshot: &GameSnapshot, local_ms: u64) -> Goals {
        match self.stage(local_ms) {
            AnimationStage::Goal | AnimationStage::OldScore => snapshot.old_goals,
            AnimationStage::NewScore | AnimationStage::Done => snapshot.goals,
        }
    }
}
