//! Pairing Timing Constants

/// Interval between pairing broadcasts (milliseconds).
///
/// Receivers poll their pairing pipe continuously, one request a second
/// keeps the channel quiet for other nodes pairing at the same time.
pub const PAIRING_RETRY_INTERVAL_MS: u64 = 1000;

/// Ceiling for the retry interval when backoff is enabled (milliseconds).
///
/// Backoff only stretches the interval. Discovery never stops.
pub const PAIRING_MAX_RETRY_INTERVAL_MS: u64 = 16_000;
