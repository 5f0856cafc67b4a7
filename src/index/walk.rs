use std::collections::VecDeque;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::default::RECOGNIZED_EXTENSIONS;

/// Whether the file extension marks a certificate file (case-insensitive).
pub fn is_certificate_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| RECOGNIZED_EXTENSIONS.iter().any(|r| r.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Lazy depth-first walk over certificate files.
///
/// At each level the matching files are yielded first, then each subfolder
/// is walked in turn. Entries are ordered by file name within a folder.
/// Symbolic links to folders are not followed.
pub struct CertFileWalk {
    pending_dirs: Vec<PathBuf>,
    files: VecDeque<PathBuf>,
}

impl CertFileWalk {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        CertFileWalk {
            pending_dirs: vec![root.into()],
            files: VecDeque::new(),
        }
    }
}

fn read_level(dir: &Path) -> io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut entries = std::fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            subdirs.push(path);
        } else if path.is_file() && is_certificate_file(&path) {
            files.push(path);
        }
    }
    Ok((files, subdirs))
}

impl Iterator for CertFileWalk {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(file) = self.files.pop_front() {
                return Some(Ok(file));
            }
            let dir = self.pending_dirs.pop()?;
            match read_level(&dir) {
                Ok((files, subdirs)) => {
                    self.files.extend(files);
                    self.pending_dirs.extend(subdirs.into_iter().rev());
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
