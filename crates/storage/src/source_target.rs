//! Source and target bound to one location.
//!
//! A [`SourceTarget`] lets a pipeline write intermediate results and read
//! them back later with the same element type and the same naming scheme.
//! Both halves are built from a single location, so they can never drift
//! apart. Identity (display, equality, hashing) is the target's string,
//! which names the location and any shard base other than `part`.

use crate::location::Location;
use crate::naming::{NamingScheme, SequentialNamingScheme, DEFAULT_SHARD_BASE};
use crate::source::{RecordFileSource, Source};
use crate::target::{RecordFileTarget, Target};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Arc;
use strand_core::{Error, Pair, Result, TableType, TypeDescriptor};
use tracing::debug;

/// Readable and writable binding of one location.
pub struct SourceTarget<T> {
    source: RecordFileSource<T>,
    target: RecordFileTarget,
}

impl<T: 'static> SourceTarget<T> {
    /// Bind `location` for records of `ptype` with the sequential naming scheme.
    ///
    /// # Errors
    ///
    /// `Binding` if the location is neither readable nor writable. A location
    /// that does not exist yet but could be created is accepted.
    pub fn new(location: impl Into<Location>, ptype: TypeDescriptor<T>) -> Result<Self> {
        Self::with_naming_scheme(location, ptype, Arc::new(SequentialNamingScheme::default()))
    }

    /// Bind `location` with an explicit naming scheme.
    pub fn with_naming_scheme(
        location: impl Into<Location>,
        ptype: TypeDescriptor<T>,
        naming: Arc<dyn NamingScheme>,
    ) -> Result<Self> {
        let location = location.into();
        let readable = location.is_readable();
        let writable = location.is_writable();
        if !readable && !writable {
            return Err(Error::binding(
                location.to_string(),
                "location is neither readable nor writable",
            ));
        }
        debug!(
            target: "strand::storage",
            location = %location,
            readable,
            writable,
            ptype = ptype.name(),
            scheme = naming.scheme_id(),
            "Bound source/target"
        );
        Ok(Self::from_parts(location, ptype, naming, DEFAULT_SHARD_BASE))
    }

    fn from_parts(
        location: Location,
        ptype: TypeDescriptor<T>,
        naming: Arc<dyn NamingScheme>,
        base: &str,
    ) -> Self {
        SourceTarget {
            source: RecordFileSource::with_naming(location.clone(), ptype, Arc::clone(&naming), base),
            target: RecordFileTarget::with_naming(location, naming, base),
        }
    }

    /// Use `base` instead of `part` as the shard file prefix.
    pub fn with_shard_base(self, base: &str) -> Self {
        let naming = Arc::clone(self.target.naming_scheme());
        let location = self.target.location().clone();
        Self::from_parts(location, self.source.ptype().clone(), naming, base)
    }

    /// Element type of the bound records
    pub fn ptype(&self) -> &TypeDescriptor<T> {
        self.source.ptype()
    }

    /// Read half of the binding
    pub fn source(&self) -> &RecordFileSource<T> {
        &self.source
    }

    /// Write half of the binding
    pub fn target(&self) -> &RecordFileTarget {
        &self.target
    }

    /// Naming scheme shared by both halves
    pub fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
        self.target.naming_scheme()
    }

    /// Bound location
    pub fn location(&self) -> &Location {
        self.target.location()
    }

    /// Write `shards[i]` as shard `i` through the target.
    pub fn write_shards(&self, shards: &[Vec<T>]) -> Result<Vec<PathBuf>> {
        self.target.write_shards(self.source.ptype(), shards)
    }

    /// Read every record back through the source.
    pub fn read(&self) -> Result<Vec<T>> {
        self.source.read()
    }
}

impl<T> Clone for SourceTarget<T> {
    fn clone(&self) -> Self {
        SourceTarget {
            source: self.source.clone(),
            target: self.target.clone(),
        }
    }
}

impl<T: 'static> Source<T> for SourceTarget<T> {
    fn ptype(&self) -> &TypeDescriptor<T> {
        self.source.ptype()
    }

    fn location(&self) -> &Location {
        Source::location(&self.source)
    }

    fn read(&self) -> Result<Vec<T>> {
        self.source.read()
    }
}

impl<T: 'static> Target for SourceTarget<T> {
    fn location(&self) -> &Location {
        self.target.location()
    }

    fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
        self.target.naming_scheme()
    }

    fn shard_base(&self) -> &str {
        self.target.shard_base()
    }
}

impl<T> fmt::Display for SourceTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.target, f)
    }
}

impl<T: 'static> fmt::Debug for SourceTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceTarget")
            .field("target", &self.target.to_string())
            .field("ptype", self.source.ptype())
            .finish()
    }
}

impl<T> PartialEq for SourceTarget<T> {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl<T> Eq for SourceTarget<T> {}

impl<T> Hash for SourceTarget<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

/// Source/target binding for keyed rows.
pub struct TableSourceTarget<K, V> {
    inner: SourceTarget<Pair<K, V>>,
    table_type: TableType<K, V>,
}

impl<K: 'static, V: 'static> TableSourceTarget<K, V> {
    /// Bind `location` for rows of `table_type`.
    pub fn new(location: impl Into<Location>, table_type: &TableType<K, V>) -> Result<Self> {
        Ok(TableSourceTarget {
            inner: SourceTarget::new(location, table_type.ptype().clone())?,
            table_type: table_type.clone(),
        })
    }

    /// Bind `location` with an explicit naming scheme.
    pub fn with_naming_scheme(
        location: impl Into<Location>,
        table_type: &TableType<K, V>,
        naming: Arc<dyn NamingScheme>,
    ) -> Result<Self> {
        Ok(TableSourceTarget {
            inner: SourceTarget::with_naming_scheme(location, table_type.ptype().clone(), naming)?,
            table_type: table_type.clone(),
        })
    }

    /// Use `base` instead of `part` as the shard file prefix.
    pub fn with_shard_base(self, base: &str) -> Self {
        TableSourceTarget {
            inner: self.inner.with_shard_base(base),
            table_type: self.table_type,
        }
    }

    /// Table type of the bound rows
    pub fn table_type(&self) -> &TableType<K, V> {
        &self.table_type
    }

    /// Row type, `Pair<K, V>`
    pub fn ptype(&self) -> &TypeDescriptor<Pair<K, V>> {
        self.inner.ptype()
    }

    /// Read half of the binding
    pub fn source(&self) -> &RecordFileSource<Pair<K, V>> {
        self.inner.source()
    }

    /// Write half of the binding
    pub fn target(&self) -> &RecordFileTarget {
        self.inner.target()
    }

    /// Naming scheme shared by both halves
    pub fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
        self.inner.naming_scheme()
    }

    /// Bound location
    pub fn location(&self) -> &Location {
        self.inner.location()
    }

    /// The untyped-key binding underneath
    pub fn as_source_target(&self) -> &SourceTarget<Pair<K, V>> {
        &self.inner
    }

    /// Write `shards[i]` as shard `i`.
    pub fn write_shards(&self, shards: &[Vec<Pair<K, V>>]) -> Result<Vec<PathBuf>> {
        self.inner.write_shards(shards)
    }

    /// Read every row back.
    pub fn read(&self) -> Result<Vec<Pair<K, V>>> {
        self.inner.read()
    }
}

impl<K, V> Clone for TableSourceTarget<K, V> {
    fn clone(&self) -> Self {
        TableSourceTarget {
            inner: self.inner.clone(),
            table_type: self.table_type.clone(),
        }
    }
}

impl<K: 'static, V: 'static> Source<Pair<K, V>> for TableSourceTarget<K, V> {
    fn ptype(&self) -> &TypeDescriptor<Pair<K, V>> {
        self.inner.ptype()
    }

    fn location(&self) -> &Location {
        self.inner.location()
    }

    fn read(&self) -> Result<Vec<Pair<K, V>>> {
        self.inner.read()
    }
}

impl<K: 'static, V: 'static> Target for TableSourceTarget<K, V> {
    fn location(&self) -> &Location {
        self.inner.location()
    }

    fn naming_scheme(&self) -> &Arc<dyn NamingScheme> {
        self.inner.naming_scheme()
    }

    fn shard_base(&self) -> &str {
        self.inner.target().shard_base()
    }
}

impl<K, V> fmt::Display for TableSourceTarget<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<K: 'static, V: 'static> fmt::Debug for TableSourceTarget<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSourceTarget")
            .field("target", &self.inner.to_string())
            .field("table_type", &self.table_type)
            .finish()
    }
}

impl<K, V> PartialEq for TableSourceTarget<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, V> Eq for TableSourceTarget<K, V> {}

impl<K, V> Hash for TableSourceTarget<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}
