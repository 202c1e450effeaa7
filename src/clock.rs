//! Server time source. All round deadlines and window comparisons use the
//! server's epoch-millisecond clock; client-reported timestamps are never
//! consulted.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current server time as epoch milliseconds.
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
