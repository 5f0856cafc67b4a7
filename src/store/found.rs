use std::io;
use std::path::{Path, PathBuf};

use crate::config::default::CERT_FILE_EXTENSION;
use crate::serial::SerialNumber;

/// Folder of certificates judged vulnerable: `<root>/<8-digit serial>.crt`.
/// An entry's existence memoizes the positive verdict.
#[derive(Clone, Debug)]
pub struct FoundStore {
    root: PathBuf,
}

impl FoundStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        FoundStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, serial: SerialNumber) -> PathBuf {
        self.root
            .join(format!("{}.{}", serial.padded(), CERT_FILE_EXTENSION))
    }

    pub fn exists(&self, serial: SerialNumber) -> bool {
        self.path(serial).is_file()
    }

    pub fn ensure_root(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Copy certificate bytes into the found folder. Returns `false` when
    /// the serial was already recorded.
    pub fn record(&self, serial: SerialNumber, bytes: &[u8]) -> io::Result<bool> {
        self.ensure_root()?;
        super::write_once(&self.path(serial), bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_write_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = FoundStore::new(dir.path().join("found"));
        let sn = SerialNumber::new(77).unwrap();

        assert!(!store.exists(sn));
        assert!(store.record(sn, b"vulnerable").unwrap());
        assert!(store.exists(sn));
        assert_eq!(store.path(sn), dir.path().join("found").join("00000077.crt"));

        assert!(!store.record(sn, b"other").unwrap());
        assert_eq!(std::fs::read(store.path(sn)).unwrap(), b"vulnerable");
    }
}
