//! Grouped tables
//!
//! Grouping a table yields one row per distinct key. The value side of a row
//! is a [`GroupedValues`]: a forward-only sequence that is consumed by
//! iterating it and cannot be restarted. Code that needs the values after
//! the transform call returns must materialize them first, see
//! [`crate::tables::get_grouped_detached_value`].

use crate::collection::DistributedCollection;
use crate::dofn::{do_fn, DoFn, Emitter};
use crate::pipeline::Pipeline;
use crate::plan::{NodeRef, ParallelDoNode, StepInfo, StepKind, StreamGroupsNode};
use crate::table::DistributedTable;
use crate::tables;
use std::fmt;
use std::sync::Arc;
use strand_core::{GroupedTableType, Pair, Result, TableType, TypeDescriptor};

/// Single-pass sequence of the values sharing one key.
pub struct GroupedValues<V> {
    inner: Box<dyn Iterator<Item = V> + Send>,
}

impl<V> GroupedValues<V> {
    /// Wrap any sendable iterator.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: Send + 'static,
    {
        GroupedValues {
            inner: Box::new(values.into_iter()),
        }
    }
}

impl<V: Send + 'static> GroupedValues<V> {
    pub(crate) fn from_vec(values: Vec<V>) -> Self {
        Self::new(values)
    }
}

impl<V> Iterator for GroupedValues<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> fmt::Debug for GroupedValues<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedValues")
            .field("size_hint", &self.inner.size_hint())
            .finish()
    }
}

/// A table grouped by key: one `Pair<K, GroupedValues<V>>` row per key.
pub struct GroupedTable<K, V> {
    pipeline: Pipeline,
    node: NodeRef<Pair<K, Vec<V>>>,
    grouped_type: GroupedTableType<K, V>,
}

impl<K, V> Clone for GroupedTable<K, V> {
    fn clone(&self) -> Self {
        GroupedTable {
            pipeline: self.pipeline.clone(),
            node: Arc::clone(&self.node),
            grouped_type: self.grouped_type.clone(),
        }
    }
}

impl<K: 'static, V: 'static> GroupedTable<K, V> {
    pub(crate) fn new(
        pipeline: Pipeline,
        node: NodeRef<Pair<K, Vec<V>>>,
        grouped_type: GroupedTableType<K, V>,
    ) -> Self {
        GroupedTable {
            pipeline,
            node,
            grouped_type,
        }
    }

    /// Grouped row type
    pub fn grouped_type(&self) -> &GroupedTableType<K, V> {
        &self.grouped_type
    }

    /// Key type
    pub fn key_type(&self) -> &TypeDescriptor<K> {
        self.grouped_type.key_type()
    }

    /// Value type
    pub fn value_type(&self) -> &TypeDescriptor<V> {
        self.grouped_type.value_type()
    }

    /// Pipeline this table belongs to
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Step producing the groups
    pub fn step(&self) -> &StepInfo {
        self.node.info()
    }
}

impl<K: 'static, V: Send + 'static> GroupedTable<K, V> {
    fn rows(&self) -> NodeRef<Pair<K, GroupedValues<V>>> {
        Arc::new(StreamGroupsNode::new(Arc::clone(&self.node)))
    }

    /// Apply `f` to every grouped row.
    pub fn parallel_do<O, F>(&self, name: &str, f: F, ptype: TypeDescriptor<O>) -> DistributedCollection<O>
    where
        O: 'static,
        F: DoFn<Pair<K, GroupedValues<V>>, O> + 'static,
    {
        let info = self
            .pipeline
            .register_step(name, StepKind::ParallelDo, &[self.step()], ptype.name());
        let node = Arc::new(ParallelDoNode::new(info, self.rows(), Arc::new(f)));
        DistributedCollection::from_node(self.pipeline.clone(), node, ptype)
    }

    /// Apply `f` to every grouped row, producing keyed rows.
    pub fn parallel_do_table<K2, V2, F>(&self, name: &str, f: F, table_type: &TableType<K2, V2>) -> DistributedTable<K2, V2>
    where
        K2: 'static,
        V2: 'static,
        F: DoFn<Pair<K, GroupedValues<V>>, Pair<K2, V2>> + 'static,
    {
        let rows = self.parallel_do(name, f, table_type.ptype().clone());
        DistributedTable::from_collection(rows, table_type.clone())
    }

    /// Flatten back into one row per value; the key is detached for each row.
    pub fn ungroup(&self) -> DistributedTable<K, V> {
        let key_type = self.key_type().clone();
        self.parallel_do_table(
            "ungroup",
            do_fn(move |row: Pair<K, GroupedValues<V>>, out: &mut Emitter<Pair<K, V>>| {
                let (key, values) = row.into_parts();
                for value in values {
                    out.emit(Pair::of(key_type.detach(&key)?, value));
                }
                Ok(())
            }),
            self.grouped_type.table_type(),
        )
    }

    /// Fold each group's values into one with `combine`.
    pub fn combine_values<F>(&self, name: &str, combine: F) -> DistributedTable<K, V>
    where
        F: Fn(V, V) -> V + Send + Sync + 'static,
    {
        self.parallel_do_table(
            name,
            do_fn(move |row: Pair<K, GroupedValues<V>>, out: &mut Emitter<Pair<K, V>>| {
                let (key, mut values) = row.into_parts();
                if let Some(first) = values.next() {
                    let combined = values.fold(first, |acc, v| combine(acc, v));
                    out.emit(Pair::of(key, combined));
                }
                Ok(())
            }),
            self.grouped_type.table_type(),
        )
    }

    /// Evaluate the grouping and return every row with its values
    /// materialized and detached.
    pub fn materialize_detached(&self) -> Result<Vec<Pair<K, Vec<V>>>> {
        self.rows()
            .execute()?
            .into_iter()
            .map(|row| tables::get_grouped_detached_value(&self.grouped_type, row))
            .collect()
    }
}

impl<K: 'static, V: 'static> fmt::Debug for GroupedTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupedTable")
            .field("step", self.step())
            .field("grouped_type", &self.grouped_type)
            .finish()
    }
}
