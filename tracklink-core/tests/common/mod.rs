//! Shared fixtures for link integration tests
//!
//! Provides:
//! - A recording radio double with fault injection
//! - A recording status indicator
//! - Builders for links, reports and pairing replies
//!
//! The link borrows its event queue, so each test owns the queue and
//! builds the link from the consumer half.

#![allow(dead_code)]

pub mod radio;

use tracklink_core::{
    FixedIdentity, IdentityStore, LinkConfig, MemoryDurable, MemoryRetained, PairingIndicator,
    RadioEventConsumer, TrackerLink,
};

pub use radio::{MockRadio, RadioCall};

/// Unique id whose low 48 bits are `01 02 03 04 05 06`
pub const DEVICE: FixedIdentity = FixedIdentity(0xDEAD_0605_0403_0201);

/// Pairing checksum of [`DEVICE`]
pub const DEVICE_CHECKSUM: u8 = 0xf0;

/// Receiver address used in replies
pub const RECEIVER: [u8; 6] = [0x10, 0x20, 0x30, 0x40, 0x01, 0x02];

pub type TestStore = IdentityStore<MemoryRetained, MemoryDurable>;

pub type TestLink<'q> = TrackerLink<'q, MockRadio, MemoryRetained, MemoryDurable, RecordingIndicator>;

/// Counts every indicator call
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordingIndicator {
    pub started: usize,
    pub completed: usize,
    pub errors: usize,
}

impl PairingIndicator for RecordingIndicator {
    fn pairing_started(&mut self) {
        self.started += 1;
    }

    fn pairing_complete(&mut self) {
        self.completed += 1;
    }

    fn connection_error(&mut self) {
        self.errors += 1;
    }
}

pub fn store() -> TestStore {
    IdentityStore::new(MemoryRetained::new(), MemoryDurable::new())
}

/// Link over a fresh store
pub fn link(consumer: RadioEventConsumer<'_>, config: LinkConfig) -> TestLink<'_> {
    link_with(consumer, MockRadio::new(), store(), config)
}

pub fn link_with(
    consumer: RadioEventConsumer<'_>,
    radio: MockRadio,
    store: TestStore,
    config: LinkConfig,
) -> TestLink<'_> {
    TrackerLink::new(radio, store, consumer, RecordingIndicator::default(), config)
        .expect("valid config")
}

/// 16-byte report; byte 15 preset to `0xEE` so RSSI stamping is visible
pub fn report(kind: u8, source: u8) -> [u8; 16] {
    let mut data = [0u8; 16];
    data[0] = kind;
    data[1] = source;
    data[2..15].iter_mut().enumerate().for_each(|(i, b)| *b = i as u8);
    data[15] = 0xEE;
    data
}

/// Receiver answer to [`DEVICE`]'s request
pub fn reply(checksum: u8, tracker_id: u8) -> [u8; 8] {
    let mut raw = [0u8; 8];
    raw[0] = checksum;
    raw[1] = tracker_id;
    raw[2..].copy_from_slice(&RECEIVER);
    raw
}
