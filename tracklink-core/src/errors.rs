//! Error Types for the Radio Link Core
//!
//! ## Design Philosophy
//!
//! Errors follow the same rules as every other hot-path type on the node:
//!
//! 1. **No Heap Allocation**: messages are `&'static str`, payloads are plain
//!    integers.
//! 2. **Copy Semantics**: errors are returned from radio callbacks and stored
//!    in status fields, so they must be cheap to copy.
//! 3. **Severity is in the variant**: the caller can tell from the variant
//!    alone whether to retry or to stop.
//!
//! ## Error Categories
//!
//! ### Transient
//! - `Radio`: a transmit could not be queued or started. Pairing retries on
//!   the next cycle; `submit` simply drops the value.
//!
//! ### Fatal
//! - `Persistence`: the durable tier rejected a write. The retained copy may
//!   now disagree with flash after a power loss, so the operation that asked
//!   for the write must not report success.
//! - `Configuration`: the transceiver could not be brought up. The link stays
//!   in a visible error state instead of running unconfigured.
//!
//! ### Caller mistakes
//! - `RecordLength`, `PayloadTooLong`, `InvalidConfig`, `NotDiscovering`
//!
//! Packets that fail classification (wrong length, reserved kind, untrusted
//! source) are not errors at all. The dispatcher drops and counts them.
//!
//! ```rust
//! use tracklink_core::LinkError;
//!
//! fn on_pairing_failure(err: LinkError) {
//!     if err.is_fatal() {
//!         // show the error pattern, wait for the operator
//!     } else {
//!         // try again on the next tick
//!     }
//! }
//! # on_pairing_failure(LinkError::Radio { reason: "tx queue full" });
//! ```

use thiserror_no_std::Error;

/// Result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;

/// Link errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// Durable storage rejected a write or could not be mounted
    #[error("Persistence fault on key {key}")]
    Persistence {
        /// Store key that failed
        key: u16,
    },

    /// Record handed to the store does not match the key's fixed size
    #[error("Record for key {key} must be {expected} bytes, got {actual}")]
    RecordLength {
        /// Store key being written
        key: u16,
        /// Size the key is registered with
        expected: usize,
        /// Size that was supplied
        actual: usize,
    },

    /// Radio could not be configured for the requested address set
    #[error("Radio configuration failed: {reason}")]
    Configuration {
        /// Driver supplied cause
        reason: &'static str,
    },

    /// Transient transmit-side fault
    #[error("Radio fault: {reason}")]
    Radio {
        /// Driver supplied cause
        reason: &'static str,
    },

    /// Outbound payload larger than the radio frame
    #[error("Payload of {len} bytes exceeds {max}")]
    PayloadTooLong {
        /// Supplied length
        len: usize,
        /// Largest payload the radio accepts
        max: usize,
    },

    /// Tunable outside its allowed range
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated
        reason: &'static str,
    },

    /// Pairing was polled before discovery started
    #[error("Pairing has not been started")]
    NotDiscovering,
}

impl LinkError {
    /// Whether the error must stop the calling operation rather than be retried
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::Configuration { .. })
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LinkError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Persistence { key } =>
                defmt::write!(fmt, "Persistence fault on key {}", key),
            Self::RecordLength { key, expected, actual } =>
                defmt::write!(fmt, "Key {} needs {} bytes, got {}", key, expected, actual),
            Self::Configuration { reason } =>
                defmt::write!(fmt, "Radio configuration: {}", reason),
            Self::Radio { reason } =>
                defmt::write!(fmt, "Radio fault: {}", reason),
            Self::PayloadTooLong { len, max } =>
                defmt::write!(fmt, "Payload {} > {}", len, max),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid configuration: {}", reason),
            Self::NotDiscovering =>
                defmt::write!(fmt, "Pairing not started"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(LinkError::Persistence { key: 1 }.is_fatal());
        assert!(LinkError::Configuration { reason: "init" }.is_fatal());
        assert!(!LinkError::Radio { reason: "tx full" }.is_fatal());
        assert!(!LinkError::PayloadTooLong { len: 40, max: 32 }.is_fatal());
    }

    #[test]
    fn errors_stay_small() {
        // Half a cache line on 64-bit hosts
        assert!(core::mem::size_of::<LinkError>() <= 32);
    }
}
