use hecs::World;

use crate::components::*;
use crate::resources::*;

/// Ingest queued direction changes into paddle intents.
///
/// Only paddles fed through the queue (`Human`, `Remote`) take queued input;
/// an entry naming an AI-driven or absent side is dropped.
pub fn ingest_inputs(world: &mut World, net_queue: &mut NetQueue) {
    for (side, dir) in net_queue.pop_inputs() {
        for (_entity, (paddle, source, intent)) in
            world.query_mut::<(&Paddle, &InputSource, &mut PaddleIntent)>()
        {
            if paddle.side == side && *source != InputSource::LocalAi {
                intent.dir = dir.clamp(-1, 1);
            }
        }
    }
}
