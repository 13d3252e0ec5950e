use crate::{Arena, Ball, Events, Paddle, PaddleIntent, Params, Time};
use hecs::World;

/// Apply paddle movement based on intents
pub fn move_paddles(world: &mut World, time: &Time, arena: &Arena) {
    let dt = time.dt_ms.min(Params::MAX_DT_MS);
    for (_entity, (paddle, intent)) in world.query_mut::<(&mut Paddle, &PaddleIntent)>() {
        let bounds = arena.paddle_bounds(paddle.side, paddle.length);
        paddle.move_by(intent.dir, dt, bounds);
    }
}

/// Move the ball by the wall-clock time since its previous move.
///
/// A freshly kicked-off ball only records the clock. A delta outside the
/// accepted band skips the step and raises `timing_anomaly`.
pub fn move_ball(world: &mut World, time: &Time, events: &mut Events) {
    for (_entity, ball) in world.query_mut::<&mut Ball>() {
        let last = ball.last_move_ms.replace(time.now_ms);
        if let Some(last) = last {
            let dt = time.now_ms.saturating_sub(last) as f64;
            if !ball.advance(dt) {
                events.timing_anomaly = true;
            }
        }
    }
}
