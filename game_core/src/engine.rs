use crate::systems::*;
use crate::*;
use hecs::{Entity, World};

/// Something that happened during a tick, for the host to relay
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvent {
    PhaseChanged(MatchPhase),
    /// First kickoff of the match
    Launched,
    PaddleHit(Side),
    WallHit,
    Goal {
        conceded: Vec<Side>,
        animation: AnimationTimes,
    },
    GoalSettled {
        credited: Option<Side>,
        goals: Goals,
    },
    MatchOver {
        winner: Option<Side>,
        goals: Goals,
    },
    TimingAnomaly,
}

/// An occupied side
#[derive(Debug, Clone, Copy)]
struct Seat {
    side: Side,
    source: InputSource,
    ready: bool,
    entity: Entity,
}

/// One authoritative match: entities, score and phase.
///
/// The host feeds joins, readiness and directions in between ticks and calls
/// [`Match::tick`] on its own cadence. Nothing here does I/O.
pub struct Match {
    config: Config,
    arena: Arena,
    world: World,
    time: Time,
    score: Score,
    events: Events,
    net_queue: NetQueue,
    rng: GameRng,
    ball: Entity,
    seats: Vec<Seat>,
    phase: MatchPhase,
    animation: Option<AnimationTimes>,
    winner: Option<Side>,
    launched: bool,
    tick: u32,
    last_tick_ms: Option<u64>,
}

impl Match {
    pub fn new(config: Config, seed: u64) -> Self {
        let arena = Arena::new(&config);
        let mut world = World::new();
        let ball = create_ball(
            &mut world,
            arena.ball_spawn(),
            glam::DVec2::ZERO,
            config.ball_speed_base,
            &config,
        );
        let score = Score::new(&config);

        Self {
            config,
            arena,
            world,
            time: Time::default(),
            score,
            events: Events::new(),
            net_queue: NetQueue::new(),
            rng: GameRng::new(seed),
            ball,
            seats: Vec::new(),
            phase: MatchPhase::WaitingForPlayers,
            animation: None,
            winner: None,
            launched: false,
            tick: 0,
            last_tick_ms: None,
        }
    }

    /// Take the next free side in join order. AI seats count as ready.
    pub fn join(&mut self, source: InputSource) -> Option<Side> {
        if self.phase != MatchPhase::WaitingForPlayers {
            return None;
        }
        let side = self
            .config
            .sides()
            .iter()
            .copied()
            .find(|side| !self.seats.iter().any(|seat| seat.side == *side))?;

        let entity = create_paddle(
            &mut self.world,
            side,
            self.arena.paddle_spawn(side),
            source,
            &self.config,
        );
        self.seats.push(Seat {
            side,
            source,
            ready: source == InputSource::LocalAi,
            entity,
        });

        if self.seats.len() == self.config.sides().len() {
            self.phase = MatchPhase::Ready;
        }
        Some(side)
    }

    /// A player left. Before the first kickoff the seat is simply freed;
    /// afterwards the match is aborted. Returns the resulting phase.
    pub fn leave(&mut self, side: Side) -> MatchPhase {
        let Some(index) = self.seats.iter().position(|seat| seat.side == side) else {
            return self.phase;
        };
        if self.phase.is_terminal() {
            return self.phase;
        }

        if self.launched {
            self.phase = MatchPhase::Aborted;
        } else {
            let seat = self.seats.remove(index);
            let _ = self.world.despawn(seat.entity);
            self.phase = MatchPhase::WaitingForPlayers;
        }
        self.phase
    }

    /// Mark a side ready. Only meaningful in the `Ready` phase.
    pub fn set_ready(&mut self, side: Side) -> bool {
        if self.phase != MatchPhase::Ready {
            return false;
        }
        match self.seats.iter_mut().find(|seat| seat.side == side) {
            Some(seat) => {
                seat.ready = true;
                true
            }
            None => false,
        }
    }

    /// Queue a direction for the next tick. Ignored for free or AI sides.
    pub fn push_input(&mut self, side: Side, dir: Direction) -> bool {
        let accepted = self
            .seats
            .iter()
            .any(|seat| seat.side == side && seat.source != InputSource::LocalAi);
        if accepted && !self.phase.is_terminal() {
            self.net_queue.push_input(side, dir.as_i8());
        }
        accepted
    }

    /// Advance the match to `now_ms` (server clock)
    pub fn tick(&mut self, now_ms: u64) -> Vec<MatchEvent> {
        let mut out = Vec::new();
        if self.phase.is_terminal() {
            return out;
        }

        self.tick = self.tick.saturating_add(1);
        let dt = self
            .last_tick_ms
            .map(|last| now_ms.saturating_sub(last) as f64)
            .unwrap_or(0.0);
        self.last_tick_ms = Some(now_ms);
        self.time = Time::new(dt, now_ms);
        self.events.clear();

        ingest_inputs(&mut self.world, &mut self.net_queue);

        if self.phase == MatchPhase::Ready && self.seats.iter().all(|seat| seat.ready) {
            if !self.launched {
                self.launched = true;
                out.push(MatchEvent::Launched);
            }
            self.set_phase(MatchPhase::Kickoff, &mut out);
        }

        if self.phase == MatchPhase::Kickoff {
            self.score.reset_goal_tracker();
            if let Ok(mut ball) = self.world.get::<&mut Ball>(self.ball) {
                ball.kickoff(self.arena.ball_spawn(), self.config.ball_speed_base, &mut self.rng);
            }
            self.set_phase(MatchPhase::Rally, &mut out);
        }

        match self.phase {
            MatchPhase::Rally => self.rally(&mut out),
            MatchPhase::GoalAnimation => self.animate_goal(now_ms, &mut out),
            _ => {}
        }
        out
    }

    fn rally(&mut self, out: &mut Vec<MatchEvent>) {
        drive_ai(
            &mut self.world,
            &self.arena,
            &self.config,
            &self.time,
            &mut self.rng,
        );
        step(
            &mut self.world,
            &self.time,
            &self.arena,
            &self.config,
            &mut self.score,
            &mut self.events,
            &mut self.net_queue,
        );

        out.extend(self.events.paddle_hits.iter().map(|side| MatchEvent::PaddleHit(*side)));
        if self.events.wall_hit {
            out.push(MatchEvent::WallHit);
        }
        if self.events.timing_anomaly {
            out.push(MatchEvent::TimingAnomaly);
        }
        if self.events.goal {
            let animation = AnimationTimes::stamp(self.time.now_ms, self.config.goal_animation_ms);
            self.animation = Some(animation);
            out.push(MatchEvent::Goal {
                conceded: self.score.conceded.clone(),
                animation,
            });
            self.set_phase(MatchPhase::GoalAnimation, out);
        }
    }

    fn animate_goal(&mut self, now_ms: u64, out: &mut Vec<MatchEvent>) {
        let Some(animation) = self.animation else {
            return;
        };
        if !animation.finished(now_ms) {
            return;
        }

        let credited = settle_goal(
            &mut self.world,
            &self.arena,
            &self.config,
            &mut self.score,
            &mut self.rng,
        );
        self.animation = None;
        out.push(MatchEvent::GoalSettled {
            credited,
            goals: self.score.goals,
        });

        if let Some(winner) = self.score.has_winner(self.config.sides()) {
            self.winner = Some(winner);
            out.push(MatchEvent::MatchOver {
                winner: Some(winner),
                goals: self.score.goals,
            });
            self.set_phase(MatchPhase::MatchOver, out);
        } else if self.config.ready_after_goal {
            for seat in &mut self.seats {
                seat.ready = seat.source == InputSource::LocalAi;
            }
            self.set_phase(MatchPhase::Ready, out);
        } else {
            self.set_phase(MatchPhase::Kickoff, out);
        }
    }

    fn set_phase(&mut self, phase: MatchPhase, out: &mut Vec<MatchEvent>) {
        if self.phase != phase {
            self.phase = phase;
            out.push(MatchEvent::PhaseChanged(phase));
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn tick_count(&self) -> u32 {
        self.tick
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn launched(&self) -> bool {
        self.launched
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn animation(&self) -> Option<AnimationTimes> {
        self.animation
    }

    /// A goal is pending settlement
    pub fn goal_pending(&self) -> bool {
        self.phase == MatchPhase::GoalAnimation
    }

    /// `(goals, old_goals)` as clients should display them. While a goal is
    /// animating the pending result is shown against the current tally.
    pub fn display_goals(&self) -> (Goals, Goals) {
        if self.goal_pending() {
            (self.score.projected(), self.score.goals)
        } else {
            (self.score.goals, self.score.old_goals)
        }
    }

    pub fn ball(&self) -> Ball {
        self.world
            .get::<&Ball>(self.ball)
            .map(|ball| *ball)
            .unwrap_or_else(|_| {
                Ball::new(
                    self.arena.ball_spawn(),
                    glam::DVec2::ZERO,
                    self.config.ball_speed_base,
                    &self.config,
                )
            })
    }

    pub fn ball_mut(&mut self) -> Option<hecs::RefMut<'_, Ball>> {
        self.world.get::<&mut Ball>(self.ball).ok()
    }

    pub fn paddle(&self, side: Side) -> Option<Paddle> {
        let seat = self.seats.iter().find(|seat| seat.side == side)?;
        self.world.get::<&Paddle>(seat.entity).ok().map(|p| *p)
    }

    pub fn paddle_mut(&mut self, side: Side) -> Option<hecs::RefMut<'_, Paddle>> {
        let seat = self.seats.iter().find(|seat| seat.side == side)?;
        self.world.get::<&mut Paddle>(seat.entity).ok()
    }

    /// Occupied sides in join order
    pub fn seated(&self) -> impl Iterator<Item = Side> + '_ {
        self.seats.iter().map(|seat| seat.side)
    }

    pub fn input_source(&self, side: Side) -> Option<InputSource> {
        self.seats
            .iter()
            .find(|seat| seat.side == side)
            .map(|seat| seat.source)
    }

    pub fn is_ready(&self, side: Side) -> bool {
        self.seats.iter().any(|seat| seat.side == side && seat.ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seated_match(config: Config) -> Match {
        let mut game = Match::new(config, 42);
        let count = game.config().sides().len();
        for _ in 0..count {
            game.join(InputSource::Remote);
        }
        game
    }

    #[test]
    fn test_sides_assigned_in_join_order() {
        let mut game = Match::new(Config::four_player(), 1);
        let sides: Vec<_> = (0..4).filter_map(|_| game.join(InputSource::Remote)).collect();
        assert_eq!(sides, Side::ALL.to_vec());
        assert_eq!(game.phase(), MatchPhase::Ready);
        assert_eq!(game.join(InputSource::Remote), None, "Match is full");
    }

    #[test]
    fn test_all_must_be_ready() {
        let mut game = seated_match(Config::two_player());
        assert!(game.set_ready(Side::Left));
        assert!(game.tick(0).is_empty());
        assert_eq!(game.phase(), MatchPhase::Ready);

        assert!(game.set_ready(Side::Right));
        let events = game.tick(16);
        assert!(events.contains(&MatchEvent::Launched));
        assert_eq!(game.phase(), MatchPhase::Rally);
        assert!(game.launched());
    }

    #[test]
    fn test_ai_seats_are_ready() {
        let mut game = Match::new(Config::two_player(), 1);
        game.join(InputSource::Human);
        game.join(InputSource::LocalAi);
        assert!(game.is_ready(Side::Right));
        assert!(!game.push_input(Side::Right, Direction::Increase));
        game.set_ready(Side::Left);
        game.tick(0);
        assert_eq!(game.phase(), MatchPhase::Rally);
    }

    #[test]
    fn test_leave_before_launch_frees_seat() {
        let mut game = seated_match(Config::two_player());
        assert_eq!(game.leave(Side::Right), MatchPhase::WaitingForPlayers);
        assert!(game.paddle(Side::Right).is_none());
        assert_eq!(game.join(InputSource::Remote), Some(Side::Right));
    }

    #[test]
    fn test_leave_after_launch_aborts() {
        let mut game = seated_match(Config::two_player());
        game.set_ready(Side::Left);
        game.set_ready(Side::Right);
        game.tick(0);
        let ball_before = game.ball().pos;

        assert_eq!(game.leave(Side::Left), MatchPhase::Aborted);
        assert!(game.tick(16).is_empty());
        assert_eq!(game.ball().pos, ball_before);
    }

    #[test]
    fn test_display_goals_during_animation() {
        let mut game = seated_match(Config::four_player());
        for side in Side::ALL {
            game.set_ready(side);
        }
        game.tick(0);
        game.tick(16);
        {
            let mut ball = game.ball_mut().unwrap();
            ball.pos = glam::DVec2::new(99.5, 50.0);
            ball.dir = glam::DVec2::X;
        }
        game.score.last_touch = Some(Side::Top);
        game.tick(32);
        assert_eq!(game.phase(), MatchPhase::GoalAnimation);

        let (goals, old) = game.display_goals();
        assert_eq!(goals.top, 1);
        assert_eq!(old.top, 0);
        assert_eq!(game.score().goals.top, 0);
    }
}
