// A simple module to define the time types used in the project
//
// The fairness engine never reads the clock: every operation that depends on
// time receives `now` explicitly so a distribution can be replayed.
// Only the scheduler and the CLI call get_current_time_in_seconds.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

// Seconds timestamps used to determine it using its type
pub type TimestampSeconds = u64;

#[inline]
pub fn get_current_time() -> Duration {
    // A clock set before 1970 is reported as the epoch itself
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

// Return timestamp in seconds
pub fn get_current_time_in_seconds() -> TimestampSeconds {
    get_current_time().as_secs()
}

// Index of the bucket `timestamp` falls in
// A zero width is treated as one second
#[inline]
pub fn time_bucket(timestamp: TimestampSeconds, width: u64) -> u64 {
    timestamp / width.max(1)
}
