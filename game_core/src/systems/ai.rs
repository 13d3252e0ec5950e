use crate::{
    AiBrain, Arena, Ball, Config, GameRng, InputSource, Paddle, PaddleIntent, Params, Side, Time,
};
use hecs::World;
use rand::Rng;

/// Steer computer-controlled paddles.
///
/// Each AI paddle re-plans its objective at most once per `ai_refresh_ms`
/// and then walks toward it, stopping inside a small dead zone.
pub fn drive_ai(
    world: &mut World,
    arena: &Arena,
    config: &Config,
    time: &Time,
    rng: &mut GameRng,
) {
    let ball = {
        let mut query = world.query::<&Ball>();
        query.iter().next().map(|(_e, b)| *b)
    };
    let Some(ball) = ball else {
        return;
    };

    for (_entity, (paddle, source, brain, intent)) in
        world.query_mut::<(&Paddle, &InputSource, &mut AiBrain, &mut PaddleIntent)>()
    {
        if *source != InputSource::LocalAi {
            continue;
        }

        if brain.objective.is_none() || time.now_ms >= brain.next_plan_ms {
            let anchor = arena.paddle_anchor(paddle.side, paddle.thickness);
            let target = predict_intercept(&ball, paddle.side, anchor, arena, config.has_walls())
                .unwrap_or_else(|| arena.paddle_spawn(paddle.side));
            let margin_span = paddle.length / 4.0;
            let margin = rng.0.gen_range(-margin_span..=margin_span);
            let (min, max) = arena.paddle_bounds(paddle.side, paddle.length);
            brain.objective = Some((target + margin).clamp(min, max));
            brain.next_plan_ms = time.now_ms + config.ai_refresh_ms;
        }

        intent.dir = match brain.objective {
            Some(goal) if (goal - paddle.position).abs() > Params::AI_DEAD_ZONE => {
                if goal > paddle.position {
                    1
                } else {
                    -1
                }
            }
            _ => 0,
        };
    }
}

/// Where the ball will cross the plane at `anchor` in front of `side`,
/// measured along the paddle axis. `None` when the ball is heading away.
pub fn predict_intercept(
    ball: &Ball,
    side: Side,
    anchor: f64,
    arena: &Arena,
    has_walls: bool,
) -> Option<f64> {
    let velocity = ball.dir * ball.speed;
    let (normal_pos, normal_vel, along_pos, along_vel, along_extent) = if side.moves_vertically() {
        (ball.pos.x, velocity.x, ball.pos.y, velocity.y, arena.height)
    } else {
        (ball.pos.y, velocity.y, ball.pos.x, velocity.x, arena.width)
    };

    // Approaching means moving against the inward normal
    let inward = side.inward();
    let inward_component = if side.moves_vertically() { inward.x } else { inward.y };
    if normal_vel * inward_component >= 0.0 {
        return None;
    }

    let t = (anchor - normal_pos) / normal_vel;
    if t < 0.0 {
        return None;
    }
    let raw = along_pos + along_vel * t;

    let hit = if has_walls && side.moves_vertically() {
        fold_into(raw, ball.radius, along_extent - ball.radius)
    } else {
        raw.clamp(0.0, along_extent)
    };
    Some(hit)
}

/// Reflect `value` back and forth between `min` and `max`, as a ball
/// bouncing between two walls would
fn fold_into(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span <= 0.0 {
        return min;
    }
    let m = (value - min).rem_euclid(2.0 * span);
    min + if m > span { 2.0 * span - m } else { m }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_ball, create_paddle};
    use glam::DVec2;

    #[test]
    fn test_fold_into() {
        assert_eq!(fold_into(50.0, 1.0, 99.0), 50.0);
        assert_eq!(fold_into(109.0, 1.0, 99.0), 89.0);
        assert_eq!(fold_into(-9.0, 1.0, 99.0), 11.0);
    }

    #[test]
    fn test_intercept_straight_line() {
        let config = Config::two_player();
        let arena = Arena::new(&config);
        let ball = Ball::new(
            DVec2::new(50.0, 50.0),
            DVec2::new(1.0, 0.5),
            DVec2::splat(0.1),
            &config,
        );

        let hit = predict_intercept(&ball, Side::Right, 94.0, &arena, true).unwrap();
        assert!((hit - 72.0).abs() < 1e-9);
        assert!(predict_intercept(&ball, Side::Left, 6.0, &arena, true).is_none());
    }

    #[test]
    fn test_intercept_reflects_off_walls() {
        let config = Config::two_player();
        let arena = Arena::new(&config);
        let ball = Ball::new(
            DVec2::new(10.0, 90.0),
            DVec2::new(1.0, 1.0),
            DVec2::splat(0.1),
            &config,
        );

        let hit = predict_intercept(&ball, Side::Right, 94.0, &arena, true).unwrap();
        assert!(hit >= ball.radius && hit <= arena.height - ball.radius);
    }

    #[test]
    fn test_ai_paddle_moves_toward_ball() {
        let config = Config::two_player();
        let arena = Arena::new(&config);
        let mut world = World::new();
        let mut rng = GameRng::new(3);
        let ai = create_paddle(&mut world, Side::Right, 50.0, InputSource::LocalAi, &config);
        create_ball(
            &mut world,
            DVec2::new(50.0, 50.0),
            DVec2::new(1.0, 1.0),
            DVec2::splat(0.1),
            &config,
        );

        drive_ai(&mut world, &arena, &config, &Time::new(16.0, 0), &mut rng);

        // Crossing at y = 94, above the paddle's reach: head down
        assert_eq!(world.get::<&PaddleIntent>(ai).unwrap().dir, 1);
        let brain = *world.get::<&AiBrain>(ai).unwrap();
        assert_eq!(brain.next_plan_ms, config.ai_refresh_ms);
    }

    #[test]
    fn test_ai_keeps_plan_until_refresh() {
        let config = Config::two_player();
        let arena = Arena::new(&config);
        let mut world = World::new();
        let mut rng = GameRng::new(3);
        let ai = create_paddle(&mut world, Side::Left, 50.0, InputSource::LocalAi, &config);
        let ball = create_ball(
            &mut world,
            DVec2::new(50.0, 80.0),
            DVec2::new(-1.0, 0.0),
            DVec2::splat(0.1),
            &config,
        );

        drive_ai(&mut world, &arena, &config, &Time::new(16.0, 0), &mut rng);
        let first = world.get::<&AiBrain>(ai).unwrap().objective;

        world.get::<&mut Ball>(ball).unwrap().pos.y = 20.0;
        drive_ai(&mut world, &arena, &config, &Time::new(16.0, 500), &mut rng);
        assert_eq!(world.get::<&AiBrain>(ai).unwrap().objective, first);

        drive_ai(&mut world, &arena, &config, &Time::new(16.0, 1000), &mut rng);
        assert_ne!(world.get::<&AiBrain>(ai).unwrap().objective, first);
    }

    #[test]
    fn test_human_paddles_untouched() {
        let config = Config::two_player();
        let arena = Arena::new(&config);
        let mut world = World::new();
        let mut rng = GameRng::new(3);
        let human = create_paddle(&mut world, Side::Left, 50.0, InputSource::Human, &config);
        create_ball(&mut world, DVec2::new(50.0, 90.0), DVec2::NEG_X, DVec2::splat(0.1), &config);

        drive_ai(&mut world, &arena, &config, &Time::new(16.0, 0), &mut rng);

        assert_eq!(world.get::<&PaddleIntent>(human).unwrap().dir, 0);
    }
}
