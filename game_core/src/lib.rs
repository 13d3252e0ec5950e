pub mod arena;
pub mod components;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod params;
pub mod phase;
pub mod resources;
pub mod systems;

pub use arena::*;
pub use components::*;
pub use config::*;
pub use engine::*;
pub use geometry::*;
pub use params::*;
pub use phase::*;
pub use resources::*;

use glam::DVec2;
use hecs::World;
use systems::*;

/// Run one rally tick of the deterministic simulation.
///
/// Order is fixed: inputs, paddles, ball, walls and paddle contacts, goal
/// check. `events` is cleared first and describes only this tick.
#[allow(clippy::too_many_arguments)]
pub fn step(
    world: &mut World,
    time: &Time,
    arena: &Arena,
    config: &Config,
    score: &mut Score,
    events: &mut Events,
    net_queue: &mut NetQueue,
) {
    events.clear();

    // 1. Ingest inputs (apply to paddle intents)
    ingest_inputs(world, net_queue);

    // 2. Move paddles based on intents
    move_paddles(world, time, arena);

    // 3. Move ball
    move_ball(world, time, events);

    // 4. Check collisions (walls, then every paddle)
    check_collisions(world, arena, config, score, events);

    // 5. Check scoring (ball exited arena)
    check_scoring(world, arena, config, score, events);
}

/// Helper to create a paddle entity
pub fn create_paddle(
    world: &mut World,
    side: Side,
    position: f64,
    source: InputSource,
    config: &Config,
) -> hecs::Entity {
    let paddle = Paddle::new(side, position, config);
    match source {
        InputSource::LocalAi => {
            world.spawn((paddle, PaddleIntent::new(), source, AiBrain::default()))
        }
        _ => world.spawn((paddle, PaddleIntent::new(), source)),
    }
}

/// Helper to create the ball entity
pub fn create_ball(
    world: &mut World,
    pos: DVec2,
    dir: DVec2,
    speed: DVec2,
    config: &Config,
) -> hecs::Entity {
    world.spawn((Ball::new(pos, dir, speed, config),))
}
