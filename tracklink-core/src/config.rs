//! Link configuration
//!
//! Only a handful of knobs are tunable; everything that is part of the air
//! protocol (packet lengths, discovery addresses, checksum seed) lives in
//! [`crate::constants`] and is fixed.
//!
//! ```rust
//! use tracklink_core::config::LinkConfig;
//!
//! // Crowded venue: be stricter about phantom trackers, buffer less
//! let config = LinkConfig::default()
//!     .with_detection_threshold(50)
//!     .with_report_capacity(64);
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DETECTION_THRESHOLD, DEFAULT_REPORT_CAPACITY, REPORT_BUFFER_SLOTS,
    PAIRING_RETRY_INTERVAL_MS, PAIRING_MAX_RETRY_INTERVAL_MS,
};
use crate::errors::{LinkError, LinkResult};

/// Pairing cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PairingConfig {
    /// Delay between pairing broadcasts in milliseconds
    pub retry_interval_ms: u64,

    /// Double the delay after every unanswered broadcast
    pub backoff: bool,

    /// Ceiling for the delay when `backoff` is on
    pub max_retry_interval_ms: u64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: PAIRING_RETRY_INTERVAL_MS,
            backoff: false,
            max_retry_interval_ms: PAIRING_MAX_RETRY_INTERVAL_MS,
        }
    }
}

impl PairingConfig {
    /// Exponential backoff from the default interval up to `max_ms`
    pub fn with_backoff(max_ms: u64) -> Self {
        Self {
            backoff: true,
            max_retry_interval_ms: max_ms,
            ..Self::default()
        }
    }

    /// Delay before broadcast number `attempt` (0-based)
    pub fn interval_for(&self, attempt: u32) -> u64 {
        if !self.backoff {
            return self.retry_interval_ms;
        }
        let shift = attempt.min(16);
        self.retry_interval_ms
            .saturating_mul(1u64 << shift)
            .min(self.max_retry_interval_ms.max(self.retry_interval_ms))
    }
}

/// Tunables for the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Sightings required before a source's reports are buffered
    pub detection_threshold: u8,

    /// Pending report cap; newest reports beyond it are dropped
    pub report_capacity: usize,

    /// Pairing cadence
    pub pairing: PairingConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            report_capacity: DEFAULT_REPORT_CAPACITY,
            pairing: PairingConfig::default(),
        }
    }
}

impl LinkConfig {
    /// Bench setup: every source is trusted from its first packet
    pub fn bench() -> Self {
        Self {
            detection_threshold: 0,
            ..Self::default()
        }
    }

    /// Override the noise gate threshold
    pub fn with_detection_threshold(mut self, threshold: u8) -> Self {
        self.detection_threshold = threshold;
        self
    }

    /// Override the pending report cap
    pub fn with_report_capacity(mut self, capacity: usize) -> Self {
        self.report_capacity = capacity;
        self
    }

    /// Override the pairing cadence
    pub fn with_pairing(mut self, pairing: PairingConfig) -> Self {
        self.pairing = pairing;
        self
    }

    /// Reject values the link cannot honor
    pub fn validate(&self) -> LinkResult<()> {
        if self.report_capacity == 0 {
            return Err(LinkError::InvalidConfig {
                reason: "report capacity must be non-zero",
            });
        }
        if self.report_capacity > REPORT_BUFFER_SLOTS {
            return Err(LinkError::InvalidConfig {
                reason: "report capacity exceeds buffer slots",
            });
        }
        if self.pairing.retry_interval_ms == 0 {
            return Err(LinkError::InvalidConfig {
                reason: "pairing retry interval must be non-zero",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol() {
        let config = LinkConfig::default();
        assert_eq!(config.report_capacity, 100);
        assert_eq!(config.pairing.retry_interval_ms, 1000);
        assert!(!config.pairing.backoff);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_capacity() {
        assert!(LinkConfig::default().with_report_capacity(0).validate().is_err());
        assert!(LinkConfig::default()
            .with_report_capacity(REPORT_BUFFER_SLOTS + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn fixed_interval_without_backoff() {
        let pairing = PairingConfig::default();
        assert_eq!(pairing.interval_for(0), 1000);
        assert_eq!(pairing.interval_for(30), 1000);
    }

    #[test]
    fn backoff_doubles_up_to_ceiling() {
        let pairing = PairingConfig::with_backoff(5000);
        assert_eq!(pairing.interval_for(0), 1000);
        assert_eq!(pairing.interval_for(1), 2000);
        assert_eq!(pairing.interval_for(2), 4000);
        assert_eq!(pairing.interval_for(3), 5000);
        assert_eq!(pairing.interval_for(40), 5000);
    }
}
