//! Radio Packet and Addressing Constants
//!
//! Packet shapes on the air and the byte values the transceiver refuses
//! to use as address bytes.

// ===== PACKET SHAPES =====

/// Length of a pairing request and of the receiver's pairing reply.
///
/// Layout: `[checksum, tracker_id, address/fingerprint x 6]`
pub const PAIRING_PACKET_LEN: usize = 8;

/// Length of a sensor report.
///
/// Byte 0 is the packet kind, byte 1 the source (tracker) id, bytes
/// 2..16 the kind specific body.
pub const REPORT_PACKET_LEN: usize = 16;

/// Largest payload the transceiver frame carries.
///
/// Enhanced ShockBurst with dynamic payload length tops out at 32 bytes.
pub const MAX_PAYLOAD_LEN: usize = 32;

// ===== REPORT KINDS =====

/// Report kind carrying full precision rotation and acceleration.
///
/// This kind uses all 16 bytes, so the last byte cannot be replaced with
/// the received signal strength.
pub const FULL_PRECISION_KIND: u8 = 1;

/// Highest report kind a tracker may send.
///
/// Kinds above this value are reserved for receiver-internal packets and
/// are dropped by the dispatcher.
pub const MAX_TRACKER_KIND: u8 = 223;

/// Index of the byte that carries RSSI in every kind except full precision.
pub const RSSI_BYTE_INDEX: usize = REPORT_PACKET_LEN - 1;

// ===== ADDRESS MATERIAL =====

/// Byte values the radio rejects as address bytes.
///
/// A run of alternating bits (0x55, 0xAA) looks like the preamble and an
/// all-zero byte gives the correlator nothing to lock on.
///
/// Source: nRF52 RADIO peripheral datasheet, address selection notes
pub const RESERVED_ADDRESS_BYTES: [u8; 3] = [0x00, 0x55, 0xAA];

/// Offset added to a reserved address byte to move it out of the set.
///
/// Applied once per byte: 0x00 -> 0x08, 0x55 -> 0x5D, 0xAA -> 0xB2, none
/// of which is reserved again.
pub const ADDRESS_BYTE_OFFSET: u8 = 8;

/// Checksum used in place of a computed zero.
///
/// Zero in the checksum slot means "unpaired", so it can never be sent.
pub const CHECKSUM_REMAP: u8 = 8;

/// Public discovery base address 0.
pub const DISCOVERY_BASE_ADDR_0: [u8; 4] = [0x62, 0x39, 0x8A, 0xF2];

/// Public discovery base address 1.
pub const DISCOVERY_BASE_ADDR_1: [u8; 4] = [0x28, 0xFF, 0x50, 0xB8];

/// Public discovery prefix table, one prefix per pipe.
pub const DISCOVERY_ADDR_PREFIX: [u8; 8] = [0xFE, 0xFF, 0x29, 0x27, 0x09, 0x02, 0xB2, 0xD6];

// ===== FINGERPRINT CHECKSUM =====

/// Generator polynomial of the fingerprint checksum (CRC-8/CCITT).
pub const FINGERPRINT_CRC_POLY: u8 = 0x07;

/// Seed of the fingerprint checksum.
///
/// Receivers compute the same CRC with this seed, so it is part of the
/// pairing protocol and cannot change.
pub const FINGERPRINT_CRC_SEED: u8 = 0x07;
