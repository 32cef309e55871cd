//! Logical plan
//!
//! Collections are handles on plan nodes. Building a collection only
//! registers a step; nodes run when an output is materialized or the
//! pipeline runs its writes. The executor here is in-process and sequential:
//! a node pulls its parent's full output, then applies its own step, so
//! element order is preserved end to end.

use crate::dofn::{self, DoFn};
use crate::grouped::GroupedValues;
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;
use strand_core::{Pair, Result, TypeDescriptor};
use strand_storage::Source;
use tracing::debug;

/// What a step does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// In-memory values handed to the pipeline
    Create,
    /// Records read from a source
    Read,
    /// Element-wise transform
    ParallelDo,
    /// Identity transform that only changes the declared element type
    Reinterpret,
    /// Rows grouped by key
    GroupByKey,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Create => "create",
            StepKind::Read => "read",
            StepKind::ParallelDo => "parallel-do",
            StepKind::Reinterpret => "reinterpret",
            StepKind::GroupByKey => "group-by-key",
        };
        f.write_str(name)
    }
}

/// Metadata of one registered step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInfo {
    /// Unique within the pipeline, increasing in registration order
    pub id: u64,
    /// Caller-supplied step name
    pub name: String,
    /// What the step does
    pub kind: StepKind,
    /// Ids of the steps feeding this one
    pub parents: Vec<u64>,
    /// Name of the output element type
    pub element_type: String,
}

/// A node of the plan producing elements of type `T`.
pub(crate) trait PlanNode<T>: Send + Sync {
    fn info(&self) -> &StepInfo;

    fn execute(&self) -> Result<Vec<T>>;
}

pub(crate) type NodeRef<T> = Arc<dyn PlanNode<T>>;

/// Values supplied by the caller; every execution hands out detached copies.
pub(crate) struct CreateNode<T> {
    info: StepInfo,
    values: Vec<T>,
    ptype: TypeDescriptor<T>,
}

impl<T> CreateNode<T> {
    pub(crate) fn new(info: StepInfo, values: Vec<T>, ptype: TypeDescriptor<T>) -> Self {
        CreateNode {
            info,
            values,
            ptype,
        }
    }
}

impl<T: Send + Sync + 'static> PlanNode<T> for CreateNode<T> {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn execute(&self) -> Result<Vec<T>> {
        self.values.iter().map(|v| self.ptype.detach(v)).collect()
    }
}

pub(crate) struct ReadNode<T> {
    info: StepInfo,
    source: Arc<dyn Source<T>>,
}

impl<T> ReadNode<T> {
    pub(crate) fn new(info: StepInfo, source: Arc<dyn Source<T>>) -> Self {
        ReadNode { info, source }
    }
}

impl<T: 'static> PlanNode<T> for ReadNode<T> {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn execute(&self) -> Result<Vec<T>> {
        let records = self.source.read()?;
        debug!(
            target: "strand::engine",
            step = self.info.id,
            source = %self.source,
            records = records.len(),
            "Read source"
        );
        Ok(records)
    }
}

pub(crate) struct ParallelDoNode<I, O> {
    info: StepInfo,
    parent: NodeRef<I>,
    f: Arc<dyn DoFn<I, O>>,
}

impl<I, O> ParallelDoNode<I, O> {
    pub(crate) fn new(info: StepInfo, parent: NodeRef<I>, f: Arc<dyn DoFn<I, O>>) -> Self {
        ParallelDoNode { info, parent, f }
    }
}

impl<I: 'static, O: 'static> PlanNode<O> for ParallelDoNode<I, O> {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn execute(&self) -> Result<Vec<O>> {
        let input = self.parent.execute()?;
        let inputs = input.len();
        let output = dofn::apply(self.f.as_ref(), input, inputs)?;
        debug!(
            target: "strand::engine",
            step = self.info.id,
            name = %self.info.name,
            kind = %self.info.kind,
            inputs,
            outputs = output.len(),
            "Step executed"
        );
        Ok(output)
    }
}

/// Groups rows by the encoded bytes of their key.
///
/// Groups come out in the order their key was first seen; values within a
/// group keep their input order.
pub(crate) struct GroupByKeyNode<K, V> {
    info: StepInfo,
    parent: NodeRef<Pair<K, V>>,
    key_type: TypeDescriptor<K>,
}

impl<K, V> GroupByKeyNode<K, V> {
    pub(crate) fn new(info: StepInfo, parent: NodeRef<Pair<K, V>>, key_type: TypeDescriptor<K>) -> Self {
        GroupByKeyNode {
            info,
            parent,
            key_type,
        }
    }
}

impl<K: 'static, V: 'static> PlanNode<Pair<K, Vec<V>>> for GroupByKeyNode<K, V> {
    fn info(&self) -> &StepInfo {
        &self.info
    }

    fn execute(&self) -> Result<Vec<Pair<K, Vec<V>>>> {
        let rows = self.parent.execute()?;
        let inputs = rows.len();
        let mut index: FxHashMap<Vec<u8>, usize> = FxHashMap::default();
        let mut groups: Vec<(K, Vec<V>)> = Vec::new();
        for row in rows {
            let (key, value) = row.into_parts();
            let encoded = self.key_type.encode(&key)?;
            match index.get(&encoded) {
                Some(&slot) => groups[slot].1.push(value),
                None => {
                    index.insert(encoded, groups.len());
                    groups.push((key, vec![value]));
                }
            }
        }
        debug!(
            target: "strand::engine",
            step = self.info.id,
            inputs,
            groups = groups.len(),
            "Rows grouped"
        );
        Ok(groups
            .into_iter()
            .map(|(key, values)| Pair::of(key, values))
            .collect())
    }
}

/// Hands each buffered group downstream as a single-pass value sequence.
pub(crate) struct StreamGroupsNode<K, V> {
    parent: NodeRef<Pair<K, Vec<V>>>,
}

impl<K, V> StreamGroupsNode<K, V> {
    pub(crate) fn new(parent: NodeRef<Pair<K, Vec<V>>>) -> Self {
        StreamGroupsNode { parent }
    }
}

impl<K: 'static, V: Send + 'static> PlanNode<Pair<K, GroupedValues<V>>> for StreamGroupsNode<K, V> {
    fn info(&self) -> &StepInfo {
        self.parent.info()
    }

    fn execute(&self) -> Result<Vec<Pair<K, GroupedValues<V>>>> {
        Ok(self
            .parent
            .execute()?
            .into_iter()
            .map(|group| {
                let (key, values) = group.into_parts();
                Pair::of(key, GroupedValues::from_vec(values))
            })
            .collect())
    }
}
