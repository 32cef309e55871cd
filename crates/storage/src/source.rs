//! Readable locations.

use crate::format;
use crate::location::Location;
use crate::naming::{NamingScheme, SequentialNamingScheme, DEFAULT_SHARD_BASE};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use strand_core::{Error, Result, TypeDescriptor};
use tracing::{debug, warn};

/// Read capability over a location.
///
/// Reading happens only when a pipeline consumes the collection built from
/// the source, never at construction.
pub trait Source<T>: fmt::Display + Send + Sync {
    /// Element type of the records
    fn ptype(&self) -> &TypeDescriptor<T>;

    /// Location read from
    fn location(&self) -> &Location;

    /// Read every record, in shard order
    fn read(&self) -> Result<Vec<T>>;
}

/// Source over a directory of record files.
pub struct RecordFileSource<T> {
    location: Location,
    ptype: TypeDescriptor<T>,
    naming: Arc<dyn NamingScheme>,
    base: String,
}

impl<T: 'static> RecordFileSource<T> {
    /// Source reading `part-NNNNN` shards at `location`.
    pub fn new(location: impl Into<Location>, ptype: TypeDescriptor<T>) -> Self {
        Self::with_naming(
            location,
            ptype,
            Arc::new(SequentialNamingScheme::default()),
            DEFAULT_SHARD_BASE,
        )
    }

    /// Source reading shards named by `naming` under `base`.
    pub fn with_naming(
        location: impl Into<Location>,
        ptype: TypeDescriptor<T>,
        naming: Arc<dyn NamingScheme>,
        base: impl Into<String>,
    ) -> Self {
        RecordFileSource {
            location: location.into(),
            ptype,
            naming,
            base: base.into(),
        }
    }

    /// Naming scheme used to recognise shard files
    pub fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
        &self.naming
    }

    /// Shard files present at the location, ordered by shard index
    pub fn shard_files(&self) -> Result<Vec<(u32, PathBuf)>> {
        let mut shards = Vec::new();
        for entry in fs::read_dir(self.location.path())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if let Some(index) = self.naming.shard_index(&self.base, name) {
                shards.push((index, entry.path()));
            }
        }
        shards.sort_by_key(|(index, _)| *index);
        Ok(shards)
    }

    /// Total size in bytes of all shard files
    pub fn input_size(&self) -> Result<u64> {
        let mut total = 0;
        for (_, path) in self.shard_files()? {
            total += fs::metadata(path)?.len();
        }
        Ok(total)
    }
}

impl<T: 'static> Source<T> for RecordFileSource<T> {
    fn ptype(&self) -> &TypeDescriptor<T> {
        &self.ptype
    }

    fn location(&self) -> &Location {
        &self.location
    }

    fn read(&self) -> Result<Vec<T>> {
        if !self.location.is_readable() {
            return Err(Error::InvalidOperation(format!(
                "{} is not readable (nothing written yet?)",
                self
            )));
        }
        let shards = self.shard_files()?;
        if shards.is_empty() {
            warn!(
                target: "strand::storage",
                location = %self.location,
                scheme = self.naming.scheme_id(),
                "No shard files found"
            );
        }
        let mut records = Vec::new();
        for (index, path) in &shards {
            let mut shard = format::read_record_file(path, &self.ptype)?;
            debug!(
                target: "strand::storage",
                shard = index,
                records = shard.len(),
                "Read shard"
            );
            records.append(&mut shard);
        }
        Ok(records)
    }
}

impl<T> Clone for RecordFileSource<T> {
    fn clone(&self) -> Self {
        RecordFileSource {
            location: self.location.clone(),
            ptype: self.ptype.clone(),
            naming: Arc::clone(&self.naming),
            base: self.base.clone(),
        }
    }
}

impl<T> fmt::Display for RecordFileSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.base == DEFAULT_SHARD_BASE {
            write!(f, "RecordFile({})", self.location)
        } else {
            write!(f, "RecordFile({}, base={})", self.location, self.base)
        }
    }
}
