use crate::{Arena, Ball, Config, Events, GameRng, Paddle, PaddleIntent, Score, Side};
use hecs::World;

/// Check if the ball left the arena through a goal.
///
/// With walls in play only left/right count. Every crossed side lands in
/// `score.conceded`; the tally itself is untouched until [`settle_goal`].
pub fn check_scoring(
    world: &mut World,
    arena: &Arena,
    config: &Config,
    score: &mut Score,
    events: &mut Events,
) -> bool {
    let Some(pos) = world.query_mut::<&Ball>().into_iter().map(|(_e, b)| b.pos).next() else {
        return false;
    };

    let crossed: Vec<Side> = arena
        .crossed_sides(pos)
        .into_iter()
        .filter(|side| !config.has_walls() || side.moves_vertically())
        .collect();
    if crossed.is_empty() {
        return false;
    }

    score.conceded = crossed;
    events.goal = true;
    true
}

/// Apply the pending goal, then put paddles and ball back in their
/// kickoff positions. Returns the credited side.
pub fn settle_goal(
    world: &mut World,
    arena: &Arena,
    config: &Config,
    score: &mut Score,
    rng: &mut GameRng,
) -> Option<Side> {
    let credited = score.update_score();
    score.reset_goal_tracker();
    reset_positions(world, arena, config, rng);
    credited
}

/// Center every paddle, stop it, and kick the ball off again
pub fn reset_positions(world: &mut World, arena: &Arena, config: &Config, rng: &mut GameRng) {
    for (_entity, (paddle, intent)) in world.query_mut::<(&mut Paddle, &mut PaddleIntent)>() {
        paddle.position = arena.paddle_spawn(paddle.side);
        intent.dir = 0;
    }
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        ball.kickoff(arena.ball_spawn(), config.ball_speed_base, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_ball, create_paddle, InputSource};
    use glam::DVec2;

    fn setup_world(config: Config) -> (World, Config, Arena, Score, Events, GameRng) {
        let world = World::new();
        let arena = Arena::new(&config);
        let score = Score::new(&config);
        let events = Events::new();
        let rng = GameRng::new(12345); // Fixed seed for deterministic tests
        (world, config, arena, score, events, rng)
    }

    #[test]
    fn test_exit_right_is_conceded_by_right() {
        let (mut world, config, arena, mut score, mut events, _rng) =
            setup_world(Config::two_player());
        create_ball(&mut world, DVec2::new(100.1, 40.0), DVec2::X, DVec2::splat(0.1), &config);

        assert!(check_scoring(&mut world, &arena, &config, &mut score, &mut events));

        assert_eq!(score.conceded, vec![Side::Right]);
        assert!(events.goal, "Should trigger goal event");
        assert_eq!(score.goals.left, 0, "Tally waits for settlement");
    }

    #[test]
    fn test_walls_are_not_goals_with_two_players() {
        let (mut world, config, arena, mut score, mut events, _rng) =
            setup_world(Config::two_player());
        create_ball(&mut world, DVec2::new(50.0, -0.5), DVec2::NEG_Y, DVec2::splat(0.1), &config);

        assert!(!check_scoring(&mut world, &arena, &config, &mut score, &mut events));
        assert!(score.conceded.is_empty());
        assert!(!events.goal);
    }

    #[test]
    fn test_corner_exit_records_both_sides() {
        let (mut world, config, arena, mut score, mut events, _rng) =
            setup_world(Config::four_player());
        create_ball(&mut world, DVec2::new(100.2, 100.3), DVec2::ONE, DVec2::splat(0.1), &config);

        assert!(check_scoring(&mut world, &arena, &config, &mut score, &mut events));
        assert_eq!(score.conceded, vec![Side::Right, Side::Bottom]);
    }

    #[test]
    fn test_no_scoring_when_ball_in_bounds() {
        let (mut world, config, arena, mut score, mut events, _rng) =
            setup_world(Config::four_player());
        create_ball(&mut world, DVec2::splat(50.0), DVec2::ONE, DVec2::splat(0.1), &config);

        assert!(!check_scoring(&mut world, &arena, &config, &mut score, &mut events));
        assert!(!events.goal, "No scoring events");
    }

    #[test]
    fn test_settle_resets_ball_and_paddles() {
        let (mut world, config, arena, mut score, _events, mut rng) =
            setup_world(Config::two_player());
        let left = create_paddle(&mut world, Side::Left, 20.0, InputSource::Remote, &config);
        world.get::<&mut PaddleIntent>(left).unwrap().dir = 1;
        let ball = create_ball(
            &mut world,
            DVec2::new(101.0, 50.0),
            DVec2::X,
            DVec2::splat(0.9),
            &config,
        );
        score.conceded = vec![Side::Right];

        let credited = settle_goal(&mut world, &arena, &config, &mut score, &mut rng);

        assert_eq!(credited, Some(Side::Left));
        assert_eq!(score.goals.left, 1);
        assert!(score.conceded.is_empty());
        assert_eq!(score.last_touch, None);

        let b = world.get::<&Ball>(ball).unwrap();
        assert_eq!(b.pos, arena.ball_spawn(), "Ball should reset to center");
        assert_eq!(b.speed, config.ball_speed_base, "Speed back to base");
        let p = world.get::<&Paddle>(left).unwrap();
        assert_eq!(p.position, 50.0);
        assert_eq!(world.get::<&PaddleIntent>(left).unwrap().dir, 0);
    }
}
