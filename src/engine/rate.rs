//! Rate control.
//!
//! Converts the configured requests-per-minute into the pause taken after
//! each request. Called once per iteration so rate changes apply to the very
//! next request.

use std::time::Duration;

const MICROS_PER_MINUTE: u64 = 60_000_000;

/// Delay between two requests at `rate_per_minute`.
///
/// A rate of zero is treated as one; the control surface never stores zero.
pub fn inter_request_delay(rate_per_minute: u32) -> Duration {
    let rate = u64::from(rate_per_minute.max(1));
    Duration::from_micros(MICROS_PER_MINUTE / rate)
}
