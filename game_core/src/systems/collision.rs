use crate::{Arena, Ball, Config, Events, Paddle, Params, Score, Side};
use glam::DVec2;
use hecs::World;
use std::f64::consts::FRAC_PI_4;

/// Check ball collisions with walls and paddles
pub fn check_collisions(
    world: &mut World,
    arena: &Arena,
    config: &Config,
    score: &mut Score,
    events: &mut Events,
) {
    // Collect paddle data first so the ball can be borrowed mutably
    let paddles: Vec<(Paddle, DVec2)> = world
        .query::<&Paddle>()
        .iter()
        .map(|(_e, p)| (*p, arena.paddle_center(p)))
        .collect();

    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        if config.has_walls() && bounce_off_walls(ball, arena, config) {
            events.wall_hit = true;
        }

        // Sides are evaluated independently; a corner can touch two paddles
        for (paddle, center) in &paddles {
            if resolve_paddle_contact(ball, paddle, *center, score.last_touch) {
                score.last_touch = Some(paddle.side);
                events.paddle_hits.push(paddle.side);
            }
        }
    }
}

/// Deflection angle for a hit `offset` units from the paddle center.
/// Zero at the center, exactly ±π/4 at either end (and beyond, for hits on
/// the rounded edge of the ball).
pub fn reflection_angle(offset: f64, length: f64) -> f64 {
    (offset / (length / 2.0)).clamp(-1.0, 1.0) * FRAC_PI_4
}

/// Test one paddle against the ball and deflect on contact.
///
/// `center` is the paddle center in arena coordinates. Returns whether the
/// contact was confirmed; the caller records `last_touch`.
pub fn resolve_paddle_contact(
    ball: &mut Ball,
    paddle: &Paddle,
    center: DVec2,
    last_touch: Option<Side>,
) -> bool {
    let side = paddle.side;
    let normal = side.inward();
    let rel = ball.pos - center;

    // Signed distance from the paddle center into the arena, and offset
    // along the paddle
    let depth = rel.dot(normal);
    let offset = if side.moves_vertically() { rel.y } else { rel.x };

    // Leading edge has reached the paddle's inner plane
    if depth - ball.radius > paddle.thickness / 2.0 {
        return false;
    }
    // Already deflected, or the ball slipped behind the paddle
    if last_touch == Some(side) || depth - ball.radius < -paddle.thickness {
        return false;
    }
    if offset.abs() > paddle.length / 2.0 + ball.radius {
        return false;
    }

    let angle = reflection_angle(offset, paddle.length);
    let along = if side.moves_vertically() { DVec2::Y } else { DVec2::X };
    ball.dir = normal * angle.cos() + along * angle.sin();
    ball.speed_up();
    true
}

/// Bounce off the top/bottom walls and push the ball back inside.
/// Returns whether a wall was hit.
pub fn bounce_off_walls(ball: &mut Ball, arena: &Arena, config: &Config) -> bool {
    let r = ball.radius;
    let hit_top = ball.pos.y - r <= 0.0;
    let hit_bottom = ball.pos.y + r >= arena.height;
    if !hit_top && !hit_bottom {
        return false;
    }

    // Only flip when heading into the wall, otherwise a ball still inside
    // the wall after a bounce would flip straight back
    let heading_in = (hit_top && ball.dir.y < 0.0) || (hit_bottom && ball.dir.y > 0.0);
    if heading_in {
        ball.dir.y =
            (ball.dir.y * -config.wall_bounce).clamp(-config.wall_max_vy, config.wall_max_vy);
    }

    let penetrating = |b: &Ball| b.pos.y - r <= 0.0 || b.pos.y + r >= arena.height;
    let mut steps = 0;
    while penetrating(ball) && steps < Params::WALL_PUSH_MAX_STEPS {
        ball.pos.y += ball.dir.y * ball.speed.y;
        steps += 1;
    }
    if penetrating(ball) {
        let clearance = r + Params::WALL_CLEARANCE;
        ball.pos.y = ball.pos.y.clamp(clearance, arena.height - clearance);
    }
    true
}
