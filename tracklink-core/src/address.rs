//! Radio Address Derivation
//!
//! ## Overview
//!
//! The transceiver filters packets by address: two 4-byte base addresses
//! and one prefix byte per pipe (pipe 0 uses base 0, pipes 1-7 use base 1).
//! A node uses exactly one of two address sets at any time:
//!
//! - **Discovery**: public constants shared by every unpaired node and
//!   every receiver listening for pairing requests.
//! - **Paired**: private set computed from the receiver address stored in
//!   the [`PairedIdentity`]. Both ends derive it independently.
//!
//! ## Derivation
//!
//! ```text
//! raw = [checksum, tracker_id, a0, a1, a2, a3, a4, a5]
//!
//! base0[i]  = a[i]               i in 0..4
//! base1[i]  = a[i] + a4          (wrapping)
//! prefix[i] = a5 + i             i in 0..8 (wrapping)
//! ```
//!
//! Afterwards every byte equal to 0x00, 0x55 or 0xAA is bumped by 8.
//! The bump happens once: the results (0x08, 0x5D, 0xB2) are never
//! reserved themselves, so no second pass is needed.

use crate::constants::radio::{
    ADDRESS_BYTE_OFFSET, DISCOVERY_ADDR_PREFIX, DISCOVERY_BASE_ADDR_0,
    DISCOVERY_BASE_ADDR_1, RESERVED_ADDRESS_BYTES,
};
use crate::identity::PairedIdentity;

/// Addressing fields for the transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioAddressSet {
    /// Base address of pipe 0
    pub base0: [u8; 4],
    /// Base address of pipes 1-7
    pub base1: [u8; 4],
    /// One prefix byte per pipe
    pub prefixes: [u8; 8],
}

impl RadioAddressSet {
    /// Public set used while pairing
    pub const DISCOVERY: Self = Self {
        base0: DISCOVERY_BASE_ADDR_0,
        base1: DISCOVERY_BASE_ADDR_1,
        prefixes: DISCOVERY_ADDR_PREFIX,
    };

    /// Private set for a paired identity
    pub fn paired(identity: &PairedIdentity) -> Self {
        derive_addresses(identity)
    }

    /// Whether this is the public discovery set
    pub fn is_discovery(&self) -> bool {
        *self == Self::DISCOVERY
    }

    /// All sixteen address bytes in `base0 || base1 || prefixes` order
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&self.base0);
        bytes[4..8].copy_from_slice(&self.base1);
        bytes[8..].copy_from_slice(&self.prefixes);
        bytes
    }

    fn from_bytes(bytes: &[u8; 16]) -> Self {
        let mut set = Self {
            base0: [0; 4],
            base1: [0; 4],
            prefixes: [0; 8],
        };
        set.base0.copy_from_slice(&bytes[..4]);
        set.base1.copy_from_slice(&bytes[4..8]);
        set.prefixes.copy_from_slice(&bytes[8..]);
        set
    }
}

/// Whether the transceiver rejects `byte` as an address byte
pub fn is_reserved_address_byte(byte: u8) -> bool {
    RESERVED_ADDRESS_BYTES.contains(&byte)
}

/// Derive the private address set for `identity`
///
/// Pure and deterministic; the receiver runs the same computation.
pub fn derive_addresses(identity: &PairedIdentity) -> RadioAddressSet {
    let raw = identity.to_bytes();
    let mut scratch = [0u8; 16];

    for i in 0..4 {
        scratch[i] = raw[i + 2];
        scratch[i + 4] = raw[i + 2].wrapping_add(raw[6]);
    }
    for i in 0..8 {
        scratch[i + 8] = raw[7].wrapping_add(i as u8);
    }

    // Single pass: the bumped values are never reserved
    for byte in scratch.iter_mut() {
        if is_reserved_address_byte(*byte) {
            *byte = byte.wrapping_add(ADDRESS_BYTE_OFFSET);
        }
    }

    RadioAddressSet::from_bytes(&scratch)
}
