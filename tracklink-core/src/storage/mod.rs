//! Two-Tier Persistent Identity Store
//!
//! ## Overview
//!
//! Pairing data and calibration records live in two places:
//!
//! ```text
//!   read ──→ Retained RAM ──(invalid?)──→ Flash (NVS)
//!              ↑    fast, survives         ↑  slow, survives
//!              │    warm resets            │  power loss
//!   write ─────┴───────────────────────────┘  (flash first)
//! ```
//!
//! - **Retained tier**: a RAM region the retention layer keeps across warm
//!   resets and seals with a magic/CRC. Valid only within a power cycle.
//! - **Durable tier**: flash key/value store, the source of truth after a
//!   full power loss. Mounted lazily, since mounting scans every sector.
//!
//! ## Read path
//!
//! If the retained image fails validation (first boot after power loss),
//! the durable tier is mounted, every known key is copied into the image,
//! and the image is resealed. Later reads are served from RAM.
//!
//! ## Write path
//!
//! Writes go to flash first and only then to the retained image. A flash
//! failure returns [`LinkError::Persistence`] and leaves the retained image
//! untouched, so RAM never holds a value that would vanish on power loss.

use crate::errors::{LinkError, LinkResult};
use crate::identity::PairedIdentity;

pub mod memory;

#[cfg(feature = "store-file")]
pub mod file;

pub use memory::{MemoryDurable, MemoryRetained, MemoryStoreError};

#[cfg(feature = "store-file")]
pub use file::FileStore;

/// Records kept in both tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreKey {
    /// Pairing record, 8 bytes
    PairedId,
    /// Accelerometer bias, 3 × f32
    AccelBias,
    /// Gyroscope bias, 3 × f32
    GyroBias,
    /// Magnetometer hard/soft iron matrix, 4 × 3 × f32
    MagCalibration,
}

impl StoreKey {
    /// Every key loaded on a cold retained tier
    pub const ALL: [StoreKey; 4] = [
        StoreKey::PairedId,
        StoreKey::AccelBias,
        StoreKey::GyroBias,
        StoreKey::MagCalibration,
    ];

    /// Flash record id
    pub const fn id(self) -> u16 {
        match self {
            StoreKey::PairedId => 1,
            StoreKey::AccelBias => 2,
            StoreKey::GyroBias => 3,
            StoreKey::MagCalibration => 4,
        }
    }

    /// Fixed record length in bytes
    pub const fn len(self) -> usize {
        match self {
            StoreKey::PairedId => 8,
            StoreKey::AccelBias => 12,
            StoreKey::GyroBias => 12,
            StoreKey::MagCalibration => 48,
        }
    }

    /// Offset of the record inside the retained image
    const fn offset(self) -> usize {
        match self {
            StoreKey::PairedId => 0,
            StoreKey::AccelBias => 8,
            StoreKey::GyroBias => 20,
            StoreKey::MagCalibration => 32,
        }
    }

    /// Key for a flash record id
    pub fn from_id(id: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.id() == id)
    }
}

/// Combined length of every record in the retained image
pub const RETAINED_RECORDS_LEN: usize = 80;

/// Longest single record
pub const MAX_RECORD_LEN: usize = 48;

/// Contents of the retained RAM region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedImage {
    records: [u8; RETAINED_RECORDS_LEN],
    reboot_counter: u8,
}

impl RetainedImage {
    /// All-zero image
    pub const fn new() -> Self {
        Self {
            records: [0; RETAINED_RECORDS_LEN],
            reboot_counter: 0,
        }
    }

    /// Bytes of one record
    pub fn record(&self, key: StoreKey) -> &[u8] {
        &self.records[key.offset()..key.offset() + key.len()]
    }

    /// Mutable bytes of one record
    pub fn record_mut(&mut self, key: StoreKey) -> &mut [u8] {
        &mut self.records[key.offset()..key.offset() + key.len()]
    }

    /// Warm reboot counter (retained only, never flashed)
    pub const fn reboot_counter(&self) -> u8 {
        self.reboot_counter
    }

    /// Set the warm reboot counter
    pub fn set_reboot_counter(&mut self, value: u8) {
        self.reboot_counter = value;
    }
}

impl Default for RetainedImage {
    fn default() -> Self {
        Self::new()
    }
}

/// RAM region preserved across warm resets
///
/// The retention layer owns the magic/version seal. Any change to the
/// image must be followed by `reseal`.
pub trait RetainedRegion {
    /// Whether the seal is intact for this power cycle
    fn is_valid(&self) -> bool;

    /// Current image
    fn image(&self) -> &RetainedImage;

    /// Image for modification; call `reseal` afterwards
    fn image_mut(&mut self) -> &mut RetainedImage;

    /// Recompute the seal, marking the image valid
    fn reseal(&mut self);
}

/// Flash-backed key/value store
///
/// A completed `write` must be visible to every later `read`, including
/// after a full power cycle.
pub trait DurableStore {
    /// Backend error; the store maps every failure to a persistence fault
    type Error: core::fmt::Debug;

    /// Prepare the store for access; called once before the first access
    fn mount(&mut self) -> Result<(), Self::Error>;

    /// Read record `id` into `buf`; returns bytes read, 0 when absent
    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Replace record `id` with `data`
    fn write(&mut self, id: u16, data: &[u8]) -> Result<(), Self::Error>;
}

/// Retained + durable store with write-through semantics
pub struct IdentityStore<R, D> {
    retained: R,
    durable: D,
    mounted: bool,
}

impl<R: RetainedRegion, D: DurableStore> IdentityStore<R, D> {
    /// Wrap both tiers; nothing is touched until the first access
    pub fn new(retained: R, durable: D) -> Self {
        Self {
            retained,
            durable,
            mounted: false,
        }
    }

    /// Record `key`, loading from flash if the retained image is stale
    pub fn read(&mut self, key: StoreKey) -> LinkResult<&[u8]> {
        self.ensure_retained()?;
        Ok(self.retained.image().record(key))
    }

    /// Write `data` to flash, then to retained RAM
    pub fn write(&mut self, key: StoreKey, data: &[u8]) -> LinkResult<()> {
        if data.len() != key.len() {
            return Err(LinkError::RecordLength {
                key: key.id(),
                expected: key.len(),
                actual: data.len(),
            });
        }

        // Load the other records first so resealing never blesses stale RAM
        self.ensure_retained()?;

        if self.durable.write(key.id(), data).is_err() {
            link_error!("Flash write failed for key {}", key.id());
            return Err(LinkError::Persistence { key: key.id() });
        }

        self.retained.image_mut().record_mut(key).copy_from_slice(data);
        self.retained.reseal();
        Ok(())
    }

    /// Stored pairing record
    pub fn paired_identity(&mut self) -> LinkResult<PairedIdentity> {
        let raw = self.read(StoreKey::PairedId)?;
        Ok(PairedIdentity::from_slice(raw).unwrap_or(PairedIdentity::UNPAIRED))
    }

    /// Persist a pairing record
    pub fn write_identity(&mut self, identity: &PairedIdentity) -> LinkResult<()> {
        self.write(StoreKey::PairedId, &identity.to_bytes())
    }

    /// Overwrite the pairing record with the unpaired sentinel
    pub fn clear_identity(&mut self) -> LinkResult<()> {
        self.write_identity(&PairedIdentity::UNPAIRED)
    }

    /// Warm reboot counter
    pub fn reboot_counter(&mut self) -> LinkResult<u8> {
        self.ensure_retained()?;
        Ok(self.retained.image().reboot_counter())
    }

    /// Update the warm reboot counter (retained only)
    pub fn set_reboot_counter(&mut self, value: u8) -> LinkResult<()> {
        self.ensure_retained()?;
        self.retained.image_mut().set_reboot_counter(value);
        self.retained.reseal();
        Ok(())
    }

    /// Retained tier, for inspection
    pub fn retained(&self) -> &R {
        &self.retained
    }

    /// Retained tier, for simulation hooks
    pub fn retained_mut(&mut self) -> &mut R {
        &mut self.retained
    }

    /// Durable tier, for inspection
    pub fn durable(&self) -> &D {
        &self.durable
    }

    /// Durable tier, for simulation hooks
    pub fn durable_mut(&mut self) -> &mut D {
        &mut self.durable
    }

    /// Split back into both tiers
    pub fn into_parts(self) -> (R, D) {
        (self.retained, self.durable)
    }

    fn mount(&mut self) -> LinkResult<()> {
        if self.mounted {
            return Ok(());
        }
        if self.durable.mount().is_err() {
            link_error!("Flash mount failed");
            return Err(LinkError::Persistence { key: 0 });
        }
        self.mounted = true;
        Ok(())
    }

    fn ensure_retained(&mut self) -> LinkResult<()> {
        if self.retained.is_valid() {
            return Ok(());
        }

        link_info!("Retained RAM invalid, loading records from flash");
        self.mount()?;

        let image = self.retained.image_mut();
        *image = RetainedImage::new();
        for key in StoreKey::ALL {
            let record = image.record_mut(key);
            if self.durable.read(key.id(), record).is_err() {
                link_error!("Flash read failed for key {}", key.id());
                return Err(LinkError::Persistence { key: key.id() });
            }
        }
        self.retained.reseal();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> IdentityStore<MemoryRetained, MemoryDurable> {
        IdentityStore::new(MemoryRetained::new(), MemoryDurable::new())
    }

    #[test]
    fn key_layout_is_contiguous() {
        let mut end = 0;
        for key in StoreKey::ALL {
            assert_eq!(key.offset(), end);
            end += key.len();
            assert!(key.len() <= MAX_RECORD_LEN);
        }
        assert_eq!(end, RETAINED_RECORDS_LEN);
        assert_eq!(StoreKey::from_id(3), Some(StoreKey::GyroBias));
        assert_eq!(StoreKey::from_id(9), None);
    }

    #[test]
    fn fresh_store_reads_unpaired() {
        let mut store = store();
        assert_eq!(store.paired_identity().unwrap(), PairedIdentity::UNPAIRED);
        assert!(store.retained().is_valid());
    }

    #[test]
    fn write_then_read() {
        let mut store = store();
        let bias = [7u8; 12];
        store.write(StoreKey::GyroBias, &bias).unwrap();
        assert_eq!(store.read(StoreKey::GyroBias).unwrap(), &bias);
    }

    #[test]
    fn wrong_length_rejected() {
        let mut store = store();
        let err = store.write(StoreKey::PairedId, &[1, 2, 3]).unwrap_err();
        assert_eq!(err, LinkError::RecordLength { key: 1, expected: 8, actual: 3 });
    }

    #[test]
    fn survives_power_cycle() {
        let mut store = store();
        let identity = PairedIdentity::from_bytes(&[0x42, 3, 1, 2, 3, 4, 5, 6]);
        store.write_identity(&identity).unwrap();

        store.retained_mut().power_cycle();
        assert!(!store.retained().is_valid());

        assert_eq!(store.paired_identity().unwrap(), identity);
    }

    #[test]
    fn failed_flash_write_leaves_ram_untouched() {
        let mut store = store();
        store.durable_mut().fail_writes(true);

        let identity = PairedIdentity::from_bytes(&[0x42, 3, 1, 2, 3, 4, 5, 6]);
        let err = store.write_identity(&identity).unwrap_err();
        assert_eq!(err, LinkError::Persistence { key: 1 });
        assert!(err.is_fatal());
        assert_eq!(store.paired_identity().unwrap(), PairedIdentity::UNPAIRED);
    }

    #[test]
    fn mount_failure_is_persistence_fault() {
        let mut durable = MemoryDurable::new();
        durable.fail_mount(true);
        let mut store = IdentityStore::new(MemoryRetained::new(), durable);
        assert_eq!(store.read(StoreKey::PairedId), Err(LinkError::Persistence { key: 0 }));
    }

    #[test]
    fn reboot_counter_is_not_flashed() {
        let mut store = store();
        store.set_reboot_counter(3).unwrap();
        assert_eq!(store.reboot_counter().unwrap(), 3);
        assert_eq!(store.durable().write_count(), 0);

        store.retained_mut().power_cycle();
        assert_eq!(store.reboot_counter().unwrap(), 0);
    }
}
