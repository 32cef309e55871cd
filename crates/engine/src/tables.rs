//! Table utilities
//!
//! Conversions between collections of pairs and tables, key and value
//! projections, and detached copies of rows.
//!
//! `as_table`, `keys` and `values` register ordinary transform steps, so they
//! stay lazy and compose with user steps. The detach helpers are plain
//! functions meant to be called from inside a `DoFn`; they share no state and
//! are safe to call from any thread.
//!
//! # Example
//!
//! ```
//! use strand_core::{BincodeFamily, Pair, TypeFamily};
//! use strand_engine::{tables, Pipeline};
//!
//! let family = BincodeFamily;
//! let rows = family.pairs(&family.ints(), &family.strings()).unwrap();
//! let pipeline = Pipeline::new();
//! let pairs = pipeline.create(vec![Pair::of(1, "a".to_string())], rows);
//!
//! let table = tables::as_table(&pairs).unwrap();
//! assert_eq!(tables::keys(&table).materialize().unwrap(), vec![1]);
//! ```

use crate::collection::DistributedCollection;
use crate::dofn::{do_fn, Emitter, IdentityFn};
use crate::plan::StepKind;
use crate::table::DistributedTable;
use std::sync::Arc;
use strand_core::{Error, GroupedTableType, Pair, Result, TableType};
use tracing::trace;

/// Reinterpret a collection of pairs as a table.
///
/// The key and value types are recovered from the element type's two
/// sub-types. The registered step is an identity transform; values are not
/// touched.
///
/// # Errors
///
/// - `ShapeMismatch` if the element type does not have exactly two sub-types
/// - `InvalidType` if the sub-types are not descriptors of `K` and `V`
///
/// Nothing is registered on failure.
pub fn as_table<K: 'static, V: 'static>(collection: &DistributedCollection<Pair<K, V>>) -> Result<DistributedTable<K, V>> {
    let ptype = collection.ptype();
    let sub_types = ptype.sub_types();
    if sub_types.len() != 2 {
        return Err(Error::shape_mismatch(ptype.name(), 2, sub_types.len()));
    }
    let key = sub_types[0].downcast::<K>().ok_or_else(|| {
        Error::invalid_type(format!(
            "key sub-type {} of {} does not describe the key type",
            sub_types[0].name(),
            ptype.name()
        ))
    })?;
    let value = sub_types[1].downcast::<V>().ok_or_else(|| {
        Error::invalid_type(format!(
            "value sub-type {} of {} does not describe the value type",
            sub_types[1].name(),
            ptype.name()
        ))
    })?;
    let table_type = TableType::compose(&key, &value)?;

    let rows = collection.apply_step(
        "as-table",
        StepKind::Reinterpret,
        Arc::new(IdentityFn),
        table_type.ptype().clone(),
    );
    Ok(DistributedTable::from_collection(rows, table_type))
}

/// The first component of every row, one output per row.
pub fn keys<K: 'static, V: 'static>(table: &DistributedTable<K, V>) -> DistributedCollection<K> {
    table.as_collection().apply_step(
        "keys",
        StepKind::ParallelDo,
        Arc::new(do_fn(|row: Pair<K, V>, out: &mut Emitter<K>| {
            out.emit(row.into_first());
            Ok(())
        })),
        table.key_type().clone(),
    )
}

/// The second component of every row, one output per row.
pub fn values<K: 'static, V: 'static>(table: &DistributedTable<K, V>) -> DistributedCollection<V> {
    table.as_collection().apply_step(
        "values",
        StepKind::ParallelDo,
        Arc::new(do_fn(|row: Pair<K, V>, out: &mut Emitter<V>| {
            out.emit(row.into_second());
            Ok(())
        })),
        table.value_type().clone(),
    )
}

/// Independent copy of `row`: key and value detached by their own types.
///
/// The input is not modified.
pub fn get_detached_value<K: 'static, V: 'static>(table_type: &TableType<K, V>, row: &Pair<K, V>) -> Result<Pair<K, V>> {
    Ok(Pair::of(
        table_type.key_type().detach(row.first())?,
        table_type.value_type().detach(row.second())?,
    ))
}

/// Materialize a grouped row.
///
/// Drains the row's values once, to exhaustion, detaching every value and
/// the key. The row is consumed; its value sequence cannot be read again.
///
/// The whole group is held in memory. No bound is applied to group size.
pub fn get_grouped_detached_value<K, V, I>(grouped_type: &GroupedTableType<K, V>, row: Pair<K, I>) -> Result<Pair<K, Vec<V>>>
where
    K: 'static,
    V: 'static,
    I: IntoIterator<Item = V>,
{
    let (key, grouped) = row.into_parts();
    let key = grouped_type.key_type().detach(&key)?;
    let value_type = grouped_type.value_type();
    let grouped = grouped.into_iter();
    let mut detached = Vec::with_capacity(grouped.size_hint().0);
    for value in grouped {
        detached.push(value_type.detach(&value)?);
    }
    trace!(
        target: "strand::engine",
        values = detached.len(),
        "Grouped row detached"
    );
    Ok(Pair::of(key, detached))
}
