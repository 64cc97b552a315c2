//! Inbound packet classification
//!
//! Packets are told apart by length alone; the radio does not carry a
//! type field.
//!
//! | Length | Meaning |
//! |--------|---------|
//! | 8      | pairing reply from a receiver |
//! | 16     | sensor report |
//! | other  | ignored |

use crate::constants::radio::{
    FULL_PRECISION_KIND, MAX_TRACKER_KIND, PAIRING_PACKET_LEN, REPORT_PACKET_LEN,
};

/// A received frame, classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InboundPacket {
    /// Candidate answer to our pairing request
    PairingReply([u8; PAIRING_PACKET_LEN]),
    /// Sensor report with the signal strength it arrived at
    SensorReport {
        /// Raw report
        data: [u8; REPORT_PACKET_LEN],
        /// Received signal strength (-dBm)
        rssi: u8,
    },
    /// Unknown shape
    Ignored {
        /// Length that did not match
        len: usize,
    },
}

impl InboundPacket {
    /// Classify `bytes` received at `rssi`
    pub fn classify(bytes: &[u8], rssi: u8) -> Self {
        if let Ok(reply) = <[u8; PAIRING_PACKET_LEN]>::try_from(bytes) {
            return Self::PairingReply(reply);
        }
        if let Ok(data) = <[u8; REPORT_PACKET_LEN]>::try_from(bytes) {
            return Self::SensorReport { data, rssi };
        }
        Self::Ignored { len: bytes.len() }
    }
}

/// Whether a report kind is reserved for receiver-internal traffic
pub const fn is_reserved_kind(kind: u8) -> bool {
    kind > MAX_TRACKER_KIND
}

/// Whether a report kind leaves its last byte free for RSSI
pub const fn carries_rssi(kind: u8) -> bool {
    kind != FULL_PRECISION_KIND
}
