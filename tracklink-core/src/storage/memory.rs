//! In-memory storage tiers
//!
//! Used on hosts and in tests. Both types carry simulation hooks: the
//! retained region can lose its seal as on a power cycle, and the durable
//! store can be told to fail mounts or writes.

use heapless::{FnvIndexMap, Vec};

use super::{DurableStore, RetainedImage, RetainedRegion, MAX_RECORD_LEN};

/// Retained region held in a plain struct
#[derive(Debug, Clone, Default)]
pub struct MemoryRetained {
    image: RetainedImage,
    sealed: bool,
}

impl MemoryRetained {
    /// Unsealed, zeroed region (first boot)
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the seal and scramble the contents, as after a power loss
    pub fn power_cycle(&mut self) {
        let mut garbage = RetainedImage::new();
        for key in super::StoreKey::ALL {
            garbage.record_mut(key).fill(0xA5);
        }
        garbage.set_reboot_counter(0xA5);
        self.image = garbage;
        self.sealed = false;
    }
}

impl RetainedRegion for MemoryRetained {
    fn is_valid(&self) -> bool {
        self.sealed
    }

    fn image(&self) -> &RetainedImage {
        &self.image
    }

    fn image_mut(&mut self) -> &mut RetainedImage {
        &mut self.image
    }

    fn reseal(&mut self) {
        self.sealed = true;
    }
}

/// Failure injected into or raised by [`MemoryDurable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStoreError {
    /// Simulated flash fault
    Injected,
    /// No room for another record id
    Full,
    /// Record longer than any known key
    TooLong,
}

/// Durable store backed by a fixed-capacity map
#[derive(Debug, Default)]
pub struct MemoryDurable {
    records: FnvIndexMap<u16, Vec<u8, MAX_RECORD_LEN>, 8>,
    fail_mount: bool,
    fail_writes: bool,
    mounts: u32,
    reads: u32,
    writes: u32,
}

impl MemoryDurable {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following mount fail
    pub fn fail_mount(&mut self, fail: bool) {
        self.fail_mount = fail;
    }

    /// Make every following write fail
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Successful writes so far
    pub fn write_count(&self) -> u32 {
        self.writes
    }

    /// Reads served so far
    pub fn read_count(&self) -> u32 {
        self.reads
    }

    /// Successful mounts so far
    pub fn mount_count(&self) -> u32 {
        self.mounts
    }

    /// Raw record, bypassing the retained tier
    pub fn record(&self, id: u16) -> Option<&[u8]> {
        self.records.get(&id).map(|record| record.as_slice())
    }
}

impl DurableStore for MemoryDurable {
    type Error = MemoryStoreError;

    fn mount(&mut self) -> Result<(), Self::Error> {
        if self.fail_mount {
            return Err(MemoryStoreError::Injected);
        }
        self.mounts += 1;
        Ok(())
    }

    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.reads += 1;
        match self.records.get(&id) {
            Some(record) => {
                let len = record.len().min(buf.len());
                buf[..len].copy_from_slice(&record[..len]);
                Ok(len)
            }
            None => Ok(0),
        }
    }

    fn write(&mut self, id: u16, data: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MemoryStoreError::Injected);
        }
        let record = Vec::from_slice(data).map_err(|_| MemoryStoreError::TooLong)?;
        self.records
            .insert(id, record)
            .map_err(|_| MemoryStoreError::Full)?;
        self.writes += 1;
        Ok(())
    }
}
