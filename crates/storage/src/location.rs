//! Logical storage locations.
//!
//! A location is a directory holding the shard files of one output. Binding
//! only probes capabilities; nothing is created until a target writes.

use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use strand_core::Result;

/// A directory of shard files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: PathBuf,
}

impl Location {
    /// Location at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Location { path: path.into() }
    }

    /// Filesystem path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of `file_name` inside this location.
    pub fn join(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Returns true if the location exists and can be listed (directory) or
    /// opened (file).
    pub fn is_readable(&self) -> bool {
        match fs::metadata(&self.path) {
            Ok(meta) if meta.is_dir() => fs::read_dir(&self.path).is_ok(),
            Ok(_) => File::open(&self.path).is_ok(),
            Err(_) => false,
        }
    }

    /// Returns true if shard files can be created here.
    ///
    /// An existing location must be a directory this process can create a
    /// file in. A missing location is writable when its nearest existing
    /// ancestor is. The check creates and removes a temporary file.
    pub fn is_writable(&self) -> bool {
        let mut current = Some(self.path.as_path());
        while let Some(candidate) = current {
            let probe = if candidate.as_os_str().is_empty() {
                Path::new(".")
            } else {
                candidate
            };
            match fs::metadata(probe) {
                Ok(meta) => return meta.is_dir() && can_create_file_in(probe),
                Err(e) if e.kind() == io::ErrorKind::NotFound => current = candidate.parent(),
                Err(_) => return false,
            }
        }
        false
    }

    /// Create the directory (and parents) if missing.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.path)?;
        Ok(())
    }
}

fn can_create_file_in(dir: &Path) -> bool {
    tempfile::Builder::new()
        .prefix(".strand-probe-")
        .tempfile_in(dir)
        .is_ok()
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::new(path)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::new(path)
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Location::new(path)
    }
}
