//! Constants for the Tracklink Radio Core
//!
//! Every numeric value the link relies on is defined here, next to the
//! reason it has the value it has.
//!
//! ## Organization
//!
//! - **Radio**: packet shapes, address material, reserved byte values
//! - **Buffers**: report buffer sizing and the noise gate threshold
//! - **Time**: pairing cadence

/// Packet lengths, kinds and addressing constants.
pub mod radio;

/// Report buffer and discovery filter sizing.
pub mod buffers;

/// Pairing retry cadence and backoff limits.
pub mod time;

pub use radio::{
    PAIRING_PACKET_LEN, REPORT_PACKET_LEN, MAX_PAYLOAD_LEN,
    FULL_PRECISION_KIND, MAX_TRACKER_KIND, RESERVED_ADDRESS_BYTES,
    ADDRESS_BYTE_OFFSET, CHECKSUM_REMAP,
};

pub use buffers::{
    DEFAULT_REPORT_CAPACITY, REPORT_BUFFER_SLOTS, DEFAULT_DETECTION_THRESHOLD,
    SOURCE_ID_SPACE, EVENT_QUEUE_DEPTH,
};

pub use time::{
    PAIRING_RETRY_INTERVAL_MS, PAIRING_MAX_RETRY_INTERVAL_MS,
};
