//! Time management for the link
//!
//! The link never sleeps. Callers pass the current time into `poll`, which
//! keeps pairing testable without real delays. Sources:
//! - Uptime counter (firmware, via the RTC peripheral)
//! - Host monotonic clock (std)
//! - Fixed clock (tests)

/// Timestamp in milliseconds since boot
pub type Timestamp = u64;

/// Source of time for the link
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Monotonic clock backed by `std::time::Instant`
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Start counting from zero now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Fixed time source for testing
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute time
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms`
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }
}

/// Whether `interval_ms` has elapsed since `since`
///
/// Saturates when the clock appears to run backwards, so a reset uptime
/// counter delays the next deadline instead of firing it early.
pub fn elapsed(since: Timestamp, now: Timestamp, interval_ms: u64) -> bool {
    now.saturating_sub(since) >= interval_ms
}
