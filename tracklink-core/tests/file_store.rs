//! File-backed durable store under the identity store

#![cfg(feature = "store-file")]

use tracklink_core::storage::FileStore;
use tracklink_core::{IdentityStore, MemoryRetained, PairedIdentity, StoreKey};

#[test]
fn pairing_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let identity = PairedIdentity::from_bytes(&[0x42, 5, 1, 2, 3, 4, 5, 6]);

    {
        let mut store = IdentityStore::new(MemoryRetained::new(), FileStore::new(dir.path()));
        store.write_identity(&identity).unwrap();
        store.write(StoreKey::GyroBias, &[9; 12]).unwrap();
    }

    let mut store = IdentityStore::new(MemoryRetained::new(), FileStore::new(dir.path()));
    assert_eq!(store.paired_identity().unwrap(), identity);
    assert_eq!(store.read(StoreKey::GyroBias).unwrap(), &[9; 12]);

    store.clear_identity().unwrap();
    let mut store = IdentityStore::new(MemoryRetained::new(), FileStore::new(dir.path()));
    assert!(!store.paired_identity().unwrap().is_paired());
}
