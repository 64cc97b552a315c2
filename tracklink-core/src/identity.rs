//! Device fingerprint and paired identity
//!
//! ## Pairing record layout
//!
//! The same eight bytes travel over the air during pairing and are stored
//! in flash afterwards:
//!
//! ```text
//! ┌──────────┬────────────┬─────────────────────────────┐
//! │ checksum │ tracker id │ address (6 bytes)           │
//! └──────────┴────────────┴─────────────────────────────┘
//!      0           1                2 .. 8
//! ```
//!
//! - In a pairing request the address slot carries the node's fingerprint
//!   and the tracker id is 0 (unassigned).
//! - In the receiver's reply the checksum is echoed, the tracker id is
//!   assigned and the address slot carries the receiver's address, which
//!   seeds the private channel (see [`crate::address`]).
//! - A checksum of 0 marks an empty record: the node is unpaired.

use crc::{Algorithm, Crc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants::radio::{
    CHECKSUM_REMAP, FINGERPRINT_CRC_POLY, FINGERPRINT_CRC_SEED, PAIRING_PACKET_LEN,
};

/// CRC-8/CCITT seeded with 0x07, as computed by the receiver
const FINGERPRINT_CRC_ALGO: Algorithm<u8> = Algorithm {
    width: 8,
    poly: FINGERPRINT_CRC_POLY,
    init: FINGERPRINT_CRC_SEED,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0x9c,
    residue: 0x00,
};

const FINGERPRINT_CRC: Crc<u8> = Crc::<u8>::new(&FINGERPRINT_CRC_ALGO);

/// Source of the hardware-unique identifier
///
/// On nRF52 this is the FICR `DEVICEADDR` register pair. Read once per
/// pairing attempt.
pub trait IdentitySource {
    /// 64-bit unique id; the low 48 bits become the fingerprint
    fn unique_id(&self) -> u64;
}

/// Identity source returning a constant, for hosts and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedIdentity(pub u64);

impl IdentitySource for FixedIdentity {
    fn unique_id(&self) -> u64 {
        self.0
    }
}

/// Six bytes identifying this node during pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceFingerprint([u8; 6]);

impl DeviceFingerprint {
    /// Wrap raw fingerprint bytes
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Low 48 bits of the unique id, little-endian
    pub fn from_source<S: IdentitySource + ?Sized>(source: &S) -> Self {
        let id = source.unique_id().to_le_bytes();
        let mut bytes = [0u8; 6];
        bytes.copy_from_slice(&id[..6]);
        Self(bytes)
    }

    /// Fingerprint bytes
    pub const fn bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Fingerprint as a 48-bit integer, for logs
    pub fn as_u64(&self) -> u64 {
        let mut wide = [0u8; 8];
        wide[..6].copy_from_slice(&self.0);
        u64::from_le_bytes(wide)
    }

    /// Pairing checksum for this fingerprint, never zero
    pub fn checksum(&self) -> u8 {
        pairing_checksum(&self.0)
    }
}

/// CRC-8 of `fingerprint` with zero remapped
///
/// Zero is the "unpaired" sentinel, so a fingerprint hashing to zero
/// uses [`CHECKSUM_REMAP`] instead.
pub fn pairing_checksum(fingerprint: &[u8; 6]) -> u8 {
    match FINGERPRINT_CRC.checksum(fingerprint) {
        0 => CHECKSUM_REMAP,
        c => c,
    }
}

/// The 8-byte pairing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PairedIdentity {
    checksum: u8,
    tracker_id: u8,
    address: [u8; 6],
}

impl PairedIdentity {
    /// Empty record, the node is unpaired
    pub const UNPAIRED: Self = Self {
        checksum: 0,
        tracker_id: 0,
        address: [0; 6],
    };

    /// Record from its individual fields
    pub const fn new(checksum: u8, tracker_id: u8, address: [u8; 6]) -> Self {
        Self { checksum, tracker_id, address }
    }

    /// Pairing request for `fingerprint`, tracker id unassigned
    pub fn request(fingerprint: &DeviceFingerprint) -> Self {
        Self {
            checksum: fingerprint.checksum(),
            tracker_id: 0,
            address: *fingerprint.bytes(),
        }
    }

    /// Parse the raw record
    pub fn from_bytes(raw: &[u8; PAIRING_PACKET_LEN]) -> Self {
        let mut address = [0u8; 6];
        address.copy_from_slice(&raw[2..]);
        Self {
            checksum: raw[0],
            tracker_id: raw[1],
            address,
        }
    }

    /// Parse a record of unchecked length; `None` unless exactly 8 bytes
    pub fn from_slice(raw: &[u8]) -> Option<Self> {
        let raw: &[u8; PAIRING_PACKET_LEN] = raw.try_into().ok()?;
        Some(Self::from_bytes(raw))
    }

    /// Raw record as sent and stored
    pub fn to_bytes(&self) -> [u8; PAIRING_PACKET_LEN] {
        let mut raw = [0u8; PAIRING_PACKET_LEN];
        raw[0] = self.checksum;
        raw[1] = self.tracker_id;
        raw[2..].copy_from_slice(&self.address);
        raw
    }

    /// Whether this record holds a pairing
    pub const fn is_paired(&self) -> bool {
        self.checksum != 0
    }

    /// Checksum byte
    pub const fn checksum(&self) -> u8 {
        self.checksum
    }

    /// Tracker id assigned by the receiver
    pub const fn tracker_id(&self) -> u8 {
        self.tracker_id
    }

    /// Address bytes (fingerprint in a request, receiver address once paired)
    pub const fn address(&self) -> &[u8; 6] {
        &self.address
    }

    /// Receiver address as a 48-bit integer, for logs
    pub fn receiver_address(&self) -> u64 {
        let mut wide = [0u8; 8];
        wide[..6].copy_from_slice(&self.address);
        u64::from_le_bytes(wide)
    }
}
