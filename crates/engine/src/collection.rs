//! Lazy typed collections

use crate::dofn::{do_fn, DoFn, Emitter};
use crate::pipeline::Pipeline;
use crate::plan::{NodeRef, ParallelDoNode, StepInfo, StepKind};
use crate::table::DistributedTable;
use std::fmt;
use std::sync::Arc;
use strand_core::{Pair, Result, TableType, TypeDescriptor};
use tracing::debug;

/// A lazy, ordered sequence of `T` produced by a plan step.
///
/// Every transform returns a new collection backed by a new step; the
/// receiver is left untouched and can feed any number of further steps.
pub struct DistributedCollection<T> {
    pipeline: Pipeline,
    node: NodeRef<T>,
    ptype: TypeDescriptor<T>,
}

impl<T> Clone for DistributedCollection<T> {
    fn clone(&self) -> Self {
        DistributedCollection {
            pipeline: self.pipeline.clone(),
            node: Arc::clone(&self.node),
            ptype: self.ptype.clone(),
        }
    }
}

impl<T: 'static> DistributedCollection<T> {
    pub(crate) fn from_node(pipeline: Pipeline, node: NodeRef<T>, ptype: TypeDescriptor<T>) -> Self {
        DistributedCollection {
            pipeline,
            node,
            ptype,
        }
    }

    /// Element type
    pub fn ptype(&self) -> &TypeDescriptor<T> {
        &self.ptype
    }

    /// Pipeline this collection belongs to
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Step producing this collection
    pub fn step(&self) -> &StepInfo {
        self.node.info()
    }

    pub(crate) fn node(&self) -> &NodeRef<T> {
        &self.node
    }

    /// Register a transform step of `kind` over this collection.
    pub(crate) fn apply_step<O: 'static>(
        &self,
        name: &str,
        kind: StepKind,
        f: Arc<dyn DoFn<T, O>>,
        ptype: TypeDescriptor<O>,
    ) -> DistributedCollection<O> {
        let info = self
            .pipeline
            .register_step(name, kind, &[self.step()], ptype.name());
        let node = Arc::new(ParallelDoNode::new(info, Arc::clone(&self.node), f));
        DistributedCollection::from_node(self.pipeline.clone(), node, ptype)
    }

    /// Apply `f` to every element; outputs are typed by `ptype`.
    pub fn parallel_do<O, F>(&self, name: &str, f: F, ptype: TypeDescriptor<O>) -> DistributedCollection<O>
    where
        O: 'static,
        F: DoFn<T, O> + 'static,
    {
        self.apply_step(name, StepKind::ParallelDo, Arc::new(f), ptype)
    }

    /// Apply `f` to every element, producing keyed rows.
    pub fn parallel_do_table<K, V, F>(&self, name: &str, f: F, table_type: &TableType<K, V>) -> DistributedTable<K, V>
    where
        K: 'static,
        V: 'static,
        F: DoFn<T, Pair<K, V>> + 'static,
    {
        let rows = self.parallel_do(name, f, table_type.ptype().clone());
        DistributedTable::from_collection(rows, table_type.clone())
    }

    /// One output per element.
    pub fn map<O, F>(&self, name: &str, f: F, ptype: TypeDescriptor<O>) -> DistributedCollection<O>
    where
        O: 'static,
        F: Fn(T) -> O + Send + Sync + 'static,
    {
        self.parallel_do(
            name,
            do_fn(move |input: T, out: &mut Emitter<O>| {
                out.emit(f(input));
                Ok(())
            }),
            ptype,
        )
    }

    /// Elements for which `predicate` holds.
    pub fn filter<F>(&self, name: &str, predicate: F) -> DistributedCollection<T>
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.parallel_do(
            name,
            do_fn(move |input: T, out: &mut Emitter<T>| {
                if predicate(&input) {
                    out.emit(input);
                }
                Ok(())
            }),
            self.ptype.clone(),
        )
    }

    /// Evaluate the plan up to this collection and return its elements.
    pub fn materialize(&self) -> Result<Vec<T>> {
        let values = self.node.execute()?;
        debug!(
            target: "strand::engine",
            step = self.step().id,
            elements = values.len(),
            "Collection materialized"
        );
        Ok(values)
    }
}

impl<T: 'static> fmt::Debug for DistributedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedCollection")
            .field("step", self.step())
            .field("ptype", &self.ptype)
            .finish()
    }
}
