//! Keyed collections

use crate::collection::DistributedCollection;
use crate::dofn::DoFn;
use crate::grouped::GroupedTable;
use crate::pipeline::Pipeline;
use crate::plan::{GroupByKeyNode, StepInfo, StepKind};
use std::fmt;
use std::sync::Arc;
use strand_core::{GroupedTableType, Pair, Result, TableType, TypeDescriptor};

/// A collection of `Pair<K, V>` rows that also knows its key and value types.
pub struct DistributedTable<K, V> {
    rows: DistributedCollection<Pair<K, V>>,
    table_type: TableType<K, V>,
}

impl<K, V> Clone for DistributedTable<K, V> {
    fn clone(&self) -> Self {
        DistributedTable {
            rows: self.rows.clone(),
            table_type: self.table_type.clone(),
        }
    }
}

impl<K: 'static, V: 'static> DistributedTable<K, V> {
    pub(crate) fn from_collection(rows: DistributedCollection<Pair<K, V>>, table_type: TableType<K, V>) -> Self {
        DistributedTable { rows, table_type }
    }

    /// Row type
    pub fn table_type(&self) -> &TableType<K, V> {
        &self.table_type
    }

    /// Key type
    pub fn key_type(&self) -> &TypeDescriptor<K> {
        self.table_type.key_type()
    }

    /// Value type
    pub fn value_type(&self) -> &TypeDescriptor<V> {
        self.table_type.value_type()
    }

    /// Pipeline this table belongs to
    pub fn pipeline(&self) -> &Pipeline {
        self.rows.pipeline()
    }

    /// Step producing this table
    pub fn step(&self) -> &StepInfo {
        self.rows.step()
    }

    /// The same rows viewed as a plain collection
    pub fn as_collection(&self) -> &DistributedCollection<Pair<K, V>> {
        &self.rows
    }

    /// Apply `f` to every row.
    pub fn parallel_do<O, F>(&self, name: &str, f: F, ptype: TypeDescriptor<O>) -> DistributedCollection<O>
    where
        O: 'static,
        F: DoFn<Pair<K, V>, O> + 'static,
    {
        self.rows.parallel_do(name, f, ptype)
    }

    /// Apply `f` to every row, producing keyed rows.
    pub fn parallel_do_table<K2, V2, F>(&self, name: &str, f: F, table_type: &TableType<K2, V2>) -> DistributedTable<K2, V2>
    where
        K2: 'static,
        V2: 'static,
        F: DoFn<Pair<K, V>, Pair<K2, V2>> + 'static,
    {
        self.rows.parallel_do_table(name, f, table_type)
    }

    /// Rows for which `predicate` holds.
    pub fn filter<F>(&self, name: &str, predicate: F) -> DistributedTable<K, V>
    where
        F: Fn(&Pair<K, V>) -> bool + Send + Sync + 'static,
    {
        DistributedTable::from_collection(self.rows.filter(name, predicate), self.table_type.clone())
    }

    /// Group rows by key.
    ///
    /// Keys are compared by their encoded bytes. Groups appear in the order
    /// their key was first seen and keep the input order of their values.
    pub fn group_by_key(&self) -> Result<GroupedTable<K, V>> {
        let grouped_type = GroupedTableType::new(&self.table_type)?;
        let info = self.pipeline().register_step(
            "group-by-key",
            StepKind::GroupByKey,
            &[self.step()],
            grouped_type.detached_type().name(),
        );
        let node = Arc::new(GroupByKeyNode::new(
            info,
            Arc::clone(self.rows.node()),
            self.key_type().clone(),
        ));
        Ok(GroupedTable::new(self.pipeline().clone(), node, grouped_type))
    }

    /// Evaluate the plan up to this table and return its rows.
    pub fn materialize(&self) -> Result<Vec<Pair<K, V>>> {
        self.rows.materialize()
    }
}

impl<K: 'static, V: 'static> fmt::Debug for DistributedTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedTable")
            .field("step", self.step())
            .field("table_type", &self.table_type)
            .finish()
    }
}
