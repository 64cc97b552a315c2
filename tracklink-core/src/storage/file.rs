//! File-backed durable store
//!
//! Lets the link run on a development host with pairing that survives a
//! process restart. Each record is one file named after its id:
//!
//! ```text
//! <dir>/0001.rec   pairing record
//! <dir>/0002.rec   accelerometer bias
//! ...
//! ```
//!
//! Writes go to `<id>.tmp`, are synced, then renamed over the record, so a
//! crash mid-write leaves either the old or the new record, never a torn one.
//! The directory is synced after the rename so the new entry itself
//! survives a power loss.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use super::DurableStore;

/// Directory of record files
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`; the directory is created on mount
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: u16) -> PathBuf {
        self.dir.join(format!("{:04x}.rec", id))
    }

    fn temp_path(&self, id: u16) -> PathBuf {
        self.dir.join(format!("{:04x}.tmp", id))
    }
}

impl DurableStore for FileStore {
    type Error = io::Error;

    fn mount(&mut self) -> Result<(), Self::Error> {
        fs::create_dir_all(&self.dir)
    }

    fn read(&mut self, id: u16, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut file = match File::open(self.record_path(id)) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(err) => return Err(err),
        };

        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }

    fn write(&mut self, id: u16, data: &[u8]) -> Result<(), Self::Error> {
        let temp = self.temp_path(id);
        {
            let mut file = File::create(&temp)?;
            file.write_all(data)?;
            file.sync_all()?;
        }
        fs::rename(&temp, self.record_path(id))?;
        self.sync_dir()
    }
}

impl FileStore {
    /// Flush directory entries to disk
    #[cfg(unix)]
    fn sync_dir(&self) -> io::Result<()> {
        File::open(&self.dir)?.sync_all()
    }

    // Directories cannot be opened as files here
    #[cfg(not(unix))]
    fn sync_dir(&self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nvs"));
        store.mount().unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(store.read(1, &mut buf).unwrap(), 0);
    }

    #[test]
    fn write_replaces_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.mount().unwrap();

        store.write(1, &[1; 8]).unwrap();
        store.write(1, &[2; 8]).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(store.read(1, &mut buf).unwrap(), 8);
        assert_eq!(buf, [2; 8]);
        assert!(!dir.path().join("0001.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn write_syncs_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nvs"));
        store.mount().unwrap();
        store.write(2, &[7; 12]).unwrap();
        assert!(store.sync_dir().is_ok());

        // A vanished directory surfaces as an error instead of a silent success
        fs::remove_dir_all(store.dir()).unwrap();
        assert_eq!(store.sync_dir().unwrap_err().kind(), io::ErrorKind::NotFound);
        assert!(store.write(2, &[7; 12]).is_err());
    }
}
