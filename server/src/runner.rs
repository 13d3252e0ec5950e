use crate::session::{Inbound, MatchSession};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

/// Why a session loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Terminal phase reached or every player left
    Finished,
    /// Closed from outside
    Cancelled,
}

/// Run the authoritative tick loop until the match ends or `close` fires.
///
/// Inbound messages are drained with `try_recv` at the start of each tick,
/// never mid-tick. On cancellation anything still queued is dropped.
pub async fn run_session(
    mut session: MatchSession,
    mut inbox: mpsc::Receiver<Inbound>,
    mut close: watch::Receiver<bool>,
    tick: Duration,
) -> LoopExit {
    info!(match_id = %session.match_id, tick_ms = tick.as_millis() as u64, "Session started");

    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let exit = loop {
        if *close.borrow() {
            break LoopExit::Cancelled;
        }

        tokio::select! {
            _ = ticker.tick() => {
                // Drain input queue
                while let Ok(inbound) = inbox.try_recv() {
                    session.handle(inbound);
                }
                if !session.step() {
                    break LoopExit::Finished;
                }
            }
            changed = close.changed() => {
                if changed.is_err() || *close.borrow() {
                    break LoopExit::Cancelled;
                }
            }
        }
    };

    if exit == LoopExit::Cancelled {
        session.finish();
    }
    info!(
        match_id = %session.match_id,
        phase = %session.phase(),
        ?exit,
        "Session stopped"
    );
    exit
}
