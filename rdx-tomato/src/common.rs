//! Small shared helpers for durations.
//!
//! Durations are persisted as integer nanoseconds and shown to the user in a
//! compact `1h2m3s` form.

use std::time::Duration;

/// Converts a minute count from the command surface into a duration.
///
/// Zero and negative values mean "not given" and yield `None`.
pub fn minutes(count: i64) -> Option<Duration> {
    u64::try_from(count)
        .ok()
        .filter(|&m| m > 0)
        .map(|m| Duration::from_secs(m.saturating_mul(60)))
}

/// Formats a duration as hours, minutes and whole seconds, e.g. `24m59s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Serde adapter storing a `Duration` as a signed nanosecond count.
///
/// Negative values found on disk are clamped to zero.
pub mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        serializer.serialize_i64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = i64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos.max(0) as u64))
    }
}
