//! Table and grouped-table element types
//!
//! A [`TableType<K, V>`] is the descriptor of a table row `Pair<K, V>` that
//! also keeps typed handles on its key and value descriptors. Its sub-type
//! list always has exactly two entries, `[key, value]`.
//!
//! A [`GroupedTableType<K, V>`] describes the rows produced by grouping a
//! table by key. The value side of a grouped row is a single-pass sequence
//! owned by the engine; the detached form of a row is `Pair<K, Vec<V>>`.

use crate::composite;
use crate::descriptor::{AnyType, TypeDescriptor};
use crate::error::Result;
use crate::pair::Pair;
use std::fmt;

/// Descriptor of a table row `Pair<K, V>`
pub struct TableType<K, V> {
    ptype: TypeDescriptor<Pair<K, V>>,
    key: TypeDescriptor<K>,
    value: TypeDescriptor<V>,
}

impl<K, V> Clone for TableType<K, V> {
    fn clone(&self) -> Self {
        TableType {
            ptype: self.ptype.clone(),
            key: self.key.clone(),
            value: self.value.clone(),
        }
    }
}

impl<K: 'static, V: 'static> TableType<K, V> {
    /// Compose a table type from key and value descriptors
    ///
    /// The resulting sub-types are exactly `[key, value]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidType` if the descriptors belong to different families.
    pub fn compose(key: &TypeDescriptor<K>, value: &TypeDescriptor<V>) -> Result<Self> {
        Ok(TableType {
            ptype: composite::pair_of(key, value)?,
            key: key.clone(),
            value: value.clone(),
        })
    }

    /// Descriptor of the key component
    pub fn key_type(&self) -> &TypeDescriptor<K> {
        &self.key
    }

    /// Descriptor of the value component
    pub fn value_type(&self) -> &TypeDescriptor<V> {
        &self.value
    }

    /// Descriptor of the whole row
    pub fn ptype(&self) -> &TypeDescriptor<Pair<K, V>> {
        &self.ptype
    }

    /// `[key, value]`
    pub fn sub_types(&self) -> &[AnyType] {
        self.ptype.sub_types()
    }

    /// Display name of the row type
    pub fn name(&self) -> &str {
        self.ptype.name()
    }

    /// Serialization family shared by key and value
    pub fn family(&self) -> &'static str {
        self.ptype.family()
    }

    /// Detached copy of a row; detaches key and value independently
    pub fn detach(&self, row: &Pair<K, V>) -> Result<Pair<K, V>> {
        Ok(Pair::of(
            self.key.detach(row.first())?,
            self.value.detach(row.second())?,
        ))
    }
}

impl<K, V> AsRef<TypeDescriptor<Pair<K, V>>> for TableType<K, V> {
    fn as_ref(&self) -> &TypeDescriptor<Pair<K, V>> {
        &self.ptype
    }
}

impl<K: 'static, V: 'static> PartialEq for TableType<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.ptype == other.ptype
    }
}

impl<K: 'static, V: 'static> fmt::Debug for TableType<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableType")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

/// Descriptor of grouped rows `(K, sequence of V)`
pub struct GroupedTableType<K, V> {
    table: TableType<K, V>,
    detached: TypeDescriptor<Pair<K, Vec<V>>>,
}

impl<K, V> Clone for GroupedTableType<K, V> {
    fn clone(&self) -> Self {
        GroupedTableType {
            table: self.table.clone(),
            detached: self.detached.clone(),
        }
    }
}

impl<K: 'static, V: 'static> GroupedTableType<K, V> {
    /// Grouped type for rows of `table`
    pub fn new(table: &TableType<K, V>) -> Result<Self> {
        let values = composite::collection_of(table.value_type());
        Ok(GroupedTableType {
            detached: composite::pair_of(table.key_type(), &values)?,
            table: table.clone(),
        })
    }

    /// Table type of the ungrouped rows
    pub fn table_type(&self) -> &TableType<K, V> {
        &self.table
    }

    /// Descriptor of the key component
    pub fn key_type(&self) -> &TypeDescriptor<K> {
        self.table.key_type()
    }

    /// Descriptor of each grouped value
    pub fn value_type(&self) -> &TypeDescriptor<V> {
        self.table.value_type()
    }

    /// Descriptor of a materialized grouped row `Pair<K, Vec<V>>`
    pub fn detached_type(&self) -> &TypeDescriptor<Pair<K, Vec<V>>> {
        &self.detached
    }
}

impl<K: 'static, V: 'static> fmt::Debug for GroupedTableType<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedTableType")
            .field("key", self.key_type())
            .field("value", self.value_type())
            .finish()
    }
}
