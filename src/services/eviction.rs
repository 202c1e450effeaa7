use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::{
    clock,
    state::{SharedState, state_machine::RoomPhase},
};

/// How often the registry is swept for expired rooms.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically evict rooms that finished playing or never attracted a
/// player, once they have been quiet for the configured grace period.
pub async fn run(state: SharedState) {
    let mut ticker = interval(SWEEP_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let evicted = sweep_at(&state, clock::now_epoch_ms()).await;
        if evicted > 0 {
            debug!(evicted, live = state.rooms().len(), "eviction sweep done");
        }
    }
}

/// Evict expired rooms as of `now_ms`, returning how many were removed.
///
/// A room expires when it is Finished, or still has zero players, and its
/// last activity is older than the grace period. Each room is inspected
/// under its own lock; pending round timers are aborted before removal so
/// no stale close fires against a dead room.
pub async fn sweep_at(state: &SharedState, now_ms: u64) -> usize {
    let grace_ms = state.config().room_grace.as_millis() as u64;
    let mut evicted = 0;

    for room in state.rooms().handles() {
        let mut session = room.session.lock().await;
        let idle_ms = now_ms.saturating_sub(session.last_activity_ms());
        let expired = match session.phase() {
            RoomPhase::Finished => idle_ms >= grace_ms,
            _ => session.player_count() == 0 && idle_ms >= grace_ms,
        };
        if !expired {
            continue;
        }

        session.abort_deadline_task();
        drop(session);
        state.rooms().remove(&room.code);
        info!(room = %room.code, idle_ms, "evicted room");
        evicted += 1;
    }

    evicted
}
