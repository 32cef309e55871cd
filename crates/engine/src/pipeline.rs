//! Pipeline: step registry and write scheduling
//!
//! A [`Pipeline`] is a cheap handle (one `Arc`). Every collection keeps a
//! handle on the pipeline that created it, so steps registered through any
//! collection land in the same plan.
//!
//! Writes are recorded by [`Pipeline::write`] and only performed by
//! [`Pipeline::run`]. Each write splits its records into `shards` contiguous
//! runs and writes shard `i` through the target's naming scheme.

use crate::collection::DistributedCollection;
use crate::config::PipelineConfig;
use crate::plan::{CreateNode, ReadNode, StepInfo, StepKind};
use crate::table::DistributedTable;
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use strand_core::{Error, Pair, Result, TableType, TypeDescriptor};
use strand_storage::{Location, Source, SourceTarget, TableSourceTarget};
use tracing::{debug, info};

type WriteFn = Box<dyn FnOnce(usize) -> Result<WriteSummary> + Send>;

struct PendingWrite {
    target: String,
    run: WriteFn,
}

struct PipelineInner {
    config: PipelineConfig,
    next_step: AtomicU64,
    steps: Mutex<Vec<StepInfo>>,
    writes: Mutex<Vec<PendingWrite>>,
}

/// Builder and executor of a typed transform graph.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<PipelineInner>,
}

/// Outcome of one write performed by [`Pipeline::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Display string of the target
    pub target: String,
    /// Records written across all shards
    pub records: usize,
    /// Shard files, in shard order
    pub files: Vec<PathBuf>,
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineResult {
    /// One entry per write, in the order the writes were registered
    pub writes: Vec<WriteSummary>,
}

impl PipelineResult {
    /// Records written by all writes
    pub fn total_records(&self) -> usize {
        self.writes.iter().map(|w| w.records).sum()
    }
}

impl Pipeline {
    /// Pipeline with the default configuration.
    pub fn new() -> Self {
        Self::build(PipelineConfig::default())
    }

    /// Pipeline with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration does not validate.
    pub fn with_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Pipeline configured from a `strand.toml` file.
    pub fn from_config_file(path: &Path) -> Result<Self> {
        Self::with_config(PipelineConfig::from_file(path)?)
    }

    fn build(config: PipelineConfig) -> Self {
        debug!(
            target: "strand::engine",
            pipeline = %config.name,
            shards = config.shards,
            "Pipeline created"
        );
        Pipeline {
            inner: Arc::new(PipelineInner {
                config,
                next_step: AtomicU64::new(0),
                steps: Mutex::new(Vec::new()),
                writes: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Every step registered so far, in registration order
    pub fn steps(&self) -> Vec<StepInfo> {
        self.inner.steps.lock().clone()
    }

    /// Number of writes waiting for [`Pipeline::run`]
    pub fn pending_writes(&self) -> usize {
        self.inner.writes.lock().len()
    }

    pub(crate) fn register_step(
        &self,
        name: &str,
        kind: StepKind,
        parents: &[&StepInfo],
        element_type: &str,
    ) -> StepInfo {
        let info = StepInfo {
            id: self.inner.next_step.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            kind,
            parents: parents.iter().map(|p| p.id).collect(),
            element_type: element_type.to_string(),
        };
        debug!(
            target: "strand::engine",
            step = info.id,
            name = %info.name,
            kind = %info.kind,
            element_type = %info.element_type,
            "Step registered"
        );
        self.inner.steps.lock().push(info.clone());
        info
    }

    /// Collection over in-memory values.
    ///
    /// The values are detached every time the collection is evaluated, so
    /// downstream steps never alias them.
    pub fn create<T>(&self, values: Vec<T>, ptype: TypeDescriptor<T>) -> DistributedCollection<T>
    where
        T: Send + Sync + 'static,
    {
        let info = self.register_step("create", StepKind::Create, &[], ptype.name());
        let node = Arc::new(CreateNode::new(info, values, ptype.clone()));
        DistributedCollection::from_node(self.clone(), node, ptype)
    }

    /// Table over in-memory rows.
    pub fn create_table<K, V>(&self, rows: Vec<Pair<K, V>>, table_type: &TableType<K, V>) -> DistributedTable<K, V>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let rows = self.create(rows, table_type.ptype().clone());
        DistributedTable::from_collection(rows, table_type.clone())
    }

    /// Collection read from `source` when evaluated.
    pub fn read<T, S>(&self, source: S) -> DistributedCollection<T>
    where
        T: 'static,
        S: Source<T> + 'static,
    {
        let ptype = source.ptype().clone();
        let info = self.register_step(&source.to_string(), StepKind::Read, &[], ptype.name());
        let node = Arc::new(ReadNode::new(info, Arc::new(source)));
        DistributedCollection::from_node(self.clone(), node, ptype)
    }

    /// Table read from a keyed binding when evaluated.
    pub fn read_table<K: 'static, V: 'static>(&self, source: &TableSourceTarget<K, V>) -> DistributedTable<K, V> {
        let rows = self.read(source.clone());
        DistributedTable::from_collection(rows, source.table_type().clone())
    }

    /// Bind `path` using the configured naming.
    pub fn source_target<T: 'static>(
        &self,
        path: impl Into<Location>,
        ptype: TypeDescriptor<T>,
    ) -> Result<SourceTarget<T>> {
        let naming = &self.inner.config.naming;
        Ok(SourceTarget::with_naming_scheme(path, ptype, Arc::new(naming.scheme()))?
            .with_shard_base(&naming.base))
    }

    /// Bind `path` for keyed rows using the configured naming.
    pub fn table_source_target<K: 'static, V: 'static>(
        &self,
        path: impl Into<Location>,
        table_type: &TableType<K, V>,
    ) -> Result<TableSourceTarget<K, V>> {
        let naming = &self.inner.config.naming;
        Ok(
            TableSourceTarget::with_naming_scheme(path, table_type, Arc::new(naming.scheme()))?
                .with_shard_base(&naming.base),
        )
    }

    /// Schedule `collection` to be written to `target` on the next run.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if the collection belongs to another pipeline
    /// - `InvalidType` if the target is bound to a different element type
    pub fn write<T: 'static>(&self, collection: &DistributedCollection<T>, target: &SourceTarget<T>) -> Result<()> {
        if !collection.pipeline().same_as(self) {
            return Err(Error::InvalidOperation(format!(
                "collection '{}' belongs to another pipeline",
                collection.step().name
            )));
        }
        if collection.ptype() != target.ptype() {
            return Err(Error::invalid_type(format!(
                "cannot write {} to {} bound to {}",
                collection.ptype(),
                target,
                target.ptype()
            )));
        }
        let node = collection.node().clone();
        let target = target.clone();
        let name = target.to_string();
        debug!(target: "strand::engine", target = %name, "Write scheduled");
        self.inner.writes.lock().push(PendingWrite {
            target: name.clone(),
            run: Box::new(move |shards| {
                let records = node.execute()?;
                let count = records.len();
                let files = target.write_shards(&split_into_shards(records, shards))?;
                Ok(WriteSummary {
                    target: name,
                    records: count,
                    files,
                })
            }),
        });
        Ok(())
    }

    /// Schedule `table` to be written to a keyed binding on the next run.
    pub fn write_table<K: 'static, V: 'static>(
        &self,
        table: &DistributedTable<K, V>,
        target: &TableSourceTarget<K, V>,
    ) -> Result<()> {
        self.write(table.as_collection(), target.as_source_target())
    }

    /// Perform every scheduled write, in registration order.
    ///
    /// Writes that succeeded before a failure stay on disk; the failed write
    /// and all writes after it are dropped.
    pub fn run(&self) -> Result<PipelineResult> {
        let writes = std::mem::take(&mut *self.inner.writes.lock());
        let shards = self.inner.config.shards;
        let mut result = PipelineResult::default();
        for write in writes {
            debug!(target: "strand::engine", target = %write.target, shards, "Writing");
            let summary = (write.run)(shards)?;
            info!(
                target: "strand::engine",
                pipeline = %self.inner.config.name,
                target = %summary.target,
                records = summary.records,
                files = summary.files.len(),
                "Output written"
            );
            result.writes.push(summary);
        }
        info!(
            target: "strand::engine",
            pipeline = %self.inner.config.name,
            writes = result.writes.len(),
            records = result.total_records(),
            "Pipeline run complete"
        );
        Ok(result)
    }

    /// Returns true if both handles refer to the same pipeline
    pub fn same_as(&self, other: &Pipeline) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.inner.config.name)
            .field("steps", &self.inner.steps.lock().len())
            .field("pending_writes", &self.inner.writes.lock().len())
            .finish()
    }
}

/// Split `records` into `shards` contiguous runs; earlier shards take the
/// remainder, so sizes differ by at most one.
fn split_into_shards<T>(records: Vec<T>, shards: usize) -> Vec<Vec<T>> {
    let shards = shards.max(1);
    let base = records.len() / shards;
    let extra = records.len() % shards;
    let mut records = records.into_iter();
    (0..shards)
        .map(|i| records.by_ref().take(base + usize::from(i < extra)).collect())
        .collect()
}
