//! Human-readable duration rendering
//!
//! Used when a node run settles: the elapsed time between start and done is
//! shown next to the final status.

use chrono::{DateTime, Duration, Utc};

/// Render the elapsed time between two instants.
pub fn between(start: DateTime<Utc>, done: DateTime<Utc>) -> String {
    format_delta(done - start)
}

/// Render a duration as `1d 2h 3m 4s`, dropping leading zero units.
/// Sub-second durations render in milliseconds; negative input clamps to 0s.
pub fn format_delta(delta: Duration) -> String {
    if delta < Duration::zero() {
        return "0s".to_string();
    }

    let total_seconds = delta.num_seconds();
    if total_seconds == 0 {
        return format!("{}ms", delta.num_milliseconds());
    }

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 || !parts.is_empty() {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_is_done_minus_start() {
        let start: DateTime<Utc> = "2024-05-01T10:00:00Z".parse().unwrap();
        let done: DateTime<Utc> = "2024-05-01T10:02:05Z".parse().unwrap();
        assert_eq!(between(start, done), "2m 5s");
    }

    #[test]
    fn test_format_delta_units() {
        assert_eq!(format_delta(Duration::milliseconds(420)), "420ms");
        assert_eq!(format_delta(Duration::seconds(42)), "42s");
        assert_eq!(format_delta(Duration::seconds(3_605)), "1h 0m 5s");
        assert_eq!(format_delta(Duration::seconds(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn test_negative_clamps_to_zero() {
        assert_eq!(format_delta(Duration::seconds(-5)), "0s");
    }
}
