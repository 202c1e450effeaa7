use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::sleep};
use tracing::debug;

use crate::{clock, services::sse_events, state::RoomHandle};

/// Spawn the deadline task for a freshly opened round.
///
/// The engine never waits for a client request to close a round: when the
/// window ends the task locks the room, performs the close, and broadcasts
/// the reveal and leaderboard. The close is keyed by round index, so a
/// firing that lost the race against a lazy close (or that outlives the
/// round) is a no-op. The returned handle is stored on the session and
/// aborted when the room is evicted.
pub fn schedule_round_deadline(
    room: Arc<RoomHandle>,
    round_index: usize,
    closes_at_ms: u64,
) -> JoinHandle<()> {
    let delay_ms = closes_at_ms.saturating_sub(clock::now_epoch_ms());
    tokio::spawn(async move {
        sleep(Duration::from_millis(delay_ms)).await;

        let mut session = room.session.lock().await;
        let Some(closed) = session.force_close_round(round_index) else {
            // Someone else already closed this round.
            return;
        };

        debug!(
            room = %room.code,
            round = round_index,
            "round deadline elapsed; closing"
        );
        sse_events::broadcast_round_closed(&room, &closed);
        sse_events::broadcast_leaderboard(&room, session.leaderboard(), clock::now_epoch_ms());
    })
}
