//! Write-once certificate stores keyed by serial number.
//!
//! Both stores publish files through a temporary file created next to the
//! destination and a no-clobber rename, so an entry is either absent or
//! complete, and an existing entry is never replaced.

pub mod cache;
pub mod found;

pub use cache::CacheStore;
pub use found::FoundStore;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// A not yet published entry. Dropping it discards the temporary file.
pub struct PendingEntry {
    tmp: NamedTempFile,
    dest: PathBuf,
}

impl PendingEntry {
    /// Create a temporary file in the destination's folder.
    pub fn create(dest: &Path) -> io::Result<PendingEntry> {
        let dir = dest
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "entry path has no parent"))?;
        let tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(dir)?;
        Ok(PendingEntry {
            tmp,
            dest: dest.to_path_buf(),
        })
    }

    /// Async handle on the temporary file for streaming writes.
    pub fn async_file(&self) -> io::Result<tokio::fs::File> {
        Ok(tokio::fs::File::from_std(self.tmp.reopen()?))
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.tmp.as_file_mut().write_all(bytes)?;
        self.tmp.as_file_mut().flush()
    }

    /// Publish the entry. Returns `false` if the destination already exists,
    /// in which case the temporary file is discarded.
    pub fn commit(self) -> io::Result<bool> {
        self.tmp.as_file().sync_all()?;
        match self.tmp.persist_noclobber(&self.dest) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error),
        }
    }
}

/// Write `bytes` to `dest` unless it already exists.
pub fn write_once(dest: &Path, bytes: &[u8]) -> io::Result<bool> {
    if dest.exists() {
        return Ok(false);
    }
    let mut entry = PendingEntry::create(dest)?;
    entry.write_all(bytes)?;
    entry.commit()
}
