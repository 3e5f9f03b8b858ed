use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Time-dependent components (alert throttle) take `now_ms` as an argument
/// instead of reading the clock themselves, so callers pass this in at the
/// edge and tests stay deterministic.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
