//! Buffer Sizes and Filter Thresholds
//!
//! Sized for an nRF52 class node with 64KB of RAM shared with the sensor
//! fusion stack.

/// Default cap on pending sensor reports.
///
/// 100 reports × 16 bytes = 1.6KB. Enough for every tracker a receiver
/// can serve with room to spare for a slow drain.
pub const DEFAULT_REPORT_CAPACITY: usize = 100;

/// Compile-time slot count of the report buffer.
///
/// The runtime cap (`LinkConfig::report_capacity`) may be lowered but
/// never raised above this.
pub const REPORT_BUFFER_SLOTS: usize = 128;

/// Sightings a source must accumulate before its reports are buffered.
///
/// Random noise on the channel occasionally decodes as a valid 16-byte
/// packet with a plausible source id. Requiring a run of sightings first
/// keeps phantom trackers out of the buffer.
pub const DEFAULT_DETECTION_THRESHOLD: u8 = 25;

/// Number of distinct source ids (byte 1 of a report).
pub const SOURCE_ID_SPACE: usize = 256;

/// Depth of the radio event queue between the radio callback and the link.
///
/// heapless SPSC queues hold N - 1 items, so this buffers 15 events.
pub const EVENT_QUEUE_DEPTH: usize = 16;
