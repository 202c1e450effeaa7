//! Wire-facing request, response, and push payloads.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod answer;
pub mod health;
pub mod leaderboard;
pub mod phase;
pub mod room;
pub mod round;
pub mod sse;
pub mod validation;

fn format_epoch_ms(epoch_ms: u64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_ms_formats_as_rfc3339() {
        assert_eq!(format_epoch_ms(0), "1970-01-01T00:00:00Z");
        assert!(format_epoch_ms(1_700_000_000_000).starts_with("2023-11-14T"));
    }
}
