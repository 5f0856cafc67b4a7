use std::io;
use std::path::{Path, PathBuf};

use crate::config::default::CERT_FILE_EXTENSION;
use crate::serial::SerialNumber;
use crate::store::PendingEntry;

/// Sharded on-disk cache of downloaded certificates:
/// `<root>/<4-digit shard>/<8-digit serial>.crt`.
#[derive(Clone, Debug)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        CacheStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, serial: SerialNumber) -> PathBuf {
        self.root
            .join(serial.shard())
            .join(format!("{}.{}", serial.padded(), CERT_FILE_EXTENSION))
    }

    pub fn exists(&self, serial: SerialNumber) -> bool {
        self.path(serial).is_file()
    }

    pub fn ensure_root(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Start a new entry, creating the shard folder on first use.
    pub fn begin(&self, serial: SerialNumber) -> io::Result<PendingEntry> {
        let path = self.path(serial);
        if let Some(shard) = path.parent() {
            std::fs::create_dir_all(shard)?;
        }
        PendingEntry::create(&path)
    }
}
