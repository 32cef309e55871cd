//! Writable locations.

use crate::format;
use crate::location::Location;
use crate::naming::{NamingScheme, SequentialNamingScheme, DEFAULT_SHARD_BASE};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use strand_core::{Error, Result, TypeDescriptor};
use tracing::{debug, info};

/// Write capability over a location.
pub trait Target: fmt::Display + Send + Sync {
    /// Location written to
    fn location(&self) -> &Location;

    /// Scheme naming each shard file
    fn naming_scheme(&self) -> &Arc<dyn NamingScheme>;

    /// Base name handed to the naming scheme
    fn shard_base(&self) -> &str;

    /// Path shard `shard` is written to
    fn shard_path(&self, shard: u32) -> PathBuf {
        self.location()
            .join(&self.naming_scheme().name(self.shard_base(), shard))
    }
}

/// Target writing one record file per shard.
#[derive(Debug, Clone)]
pub struct RecordFileTarget {
    location: Location,
    naming: Arc<dyn NamingScheme>,
    base: String,
}

impl RecordFileTarget {
    /// Target writing `part-NNNNN` shards at `location`.
    pub fn new(location: impl Into<Location>) -> Self {
        Self::with_naming(
            location,
            Arc::new(SequentialNamingScheme::default()),
            DEFAULT_SHARD_BASE,
        )
    }

    /// Target writing shards named by `naming` under `base`.
    pub fn with_naming(
        location: impl Into<Location>,
        naming: Arc<dyn NamingScheme>,
        base: impl Into<String>,
    ) -> Self {
        RecordFileTarget {
            location: location.into(),
            naming,
            base: base.into(),
        }
    }

    /// Write one shard; replaces any previous file of the same shard.
    pub fn write_shard<T: 'static>(
        &self,
        ptype: &TypeDescriptor<T>,
        shard: u32,
        records: &[T],
    ) -> Result<PathBuf> {
        self.location.ensure_dir()?;
        let path = self.shard_path(shard);
        format::write_record_file(&path, ptype, records)?;
        Ok(path)
    }

    /// Write `shards[i]` as shard `i`.
    ///
    /// Shards of this base left by an earlier write with more shards are
    /// removed, so the location holds exactly the new output.
    pub fn write_shards<T: 'static>(
        &self,
        ptype: &TypeDescriptor<T>,
        shards: &[Vec<T>],
    ) -> Result<Vec<PathBuf>> {
        let count = u32::try_from(shards.len())
            .map_err(|_| Error::InvalidOperation(format!("too many shards: {}", shards.len())))?;
        let mut paths = Vec::with_capacity(shards.len());
        let mut records = 0;
        for (index, shard) in (0..count).zip(shards) {
            paths.push(self.write_shard(ptype, index, shard)?);
            records += shard.len();
        }
        self.remove_shards_from(count)?;
        info!(
            target: "strand::storage",
            location = %self.location,
            shards = paths.len(),
            records,
            scheme = self.naming.scheme_id(),
            "Target written"
        );
        Ok(paths)
    }

    /// Delete shard files of this base whose index is `first` or above.
    ///
    /// Files the naming scheme does not recognise are left alone. Returns the
    /// number of files removed.
    pub fn remove_shards_from(&self, first: u32) -> Result<usize> {
        if !self.location.path().is_dir() {
            return Ok(0);
        }
        let mut removed = 0;
        for entry in fs::read_dir(self.location.path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            match self.naming.shard_index(&self.base, name) {
                Some(index) if index >= first => {
                    fs::remove_file(entry.path())?;
                    debug!(
                        target: "strand::storage",
                        location = %self.location,
                        shard = index,
                        "Removed stale shard"
                    );
                    removed += 1;
                }
                _ => {}
            }
        }
        Ok(removed)
    }
}

impl Target for RecordFileTarget {
    fn location(&self) -> &Location {
        &self.location
    }

    fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
        &self.naming
    }

    fn shard_base(&self) -> &str {
        &self.base
    }
}

impl fmt::Display for RecordFileTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.base == DEFAULT_SHARD_BASE {
            write!(f, "RecordFile({})", self.location)
        } else {
            write!(f, "RecordFile({}, base={})", self.location, self.base)
        }
    }
}
