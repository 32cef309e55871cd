//! Pipeline engine for strand
//!
//! This crate builds and evaluates typed transform graphs:
//! - Pipeline: step registry, bindings and scheduled writes
//! - DistributedCollection / DistributedTable / GroupedTable: lazy handles
//! - DoFn: one input element to zero or more outputs
//! - tables: pair/table conversion, key/value projection, detached copies
//! - PipelineConfig: `strand.toml` configuration
//!
//! Building a collection only registers a step. Steps run when a collection
//! is materialized or when `Pipeline::run` performs the scheduled writes. The
//! bundled executor is in-process, sequential and order-preserving.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod dofn;
pub mod grouped;
pub mod pipeline;
pub mod plan;
pub mod table;
pub mod tables;

pub use collection::DistributedCollection;
pub use config::{NamingConfig, PipelineConfig, CONFIG_FILE_NAME};
pub use dofn::{do_fn, DoFn, Emitter, IdentityFn};
pub use grouped::{GroupedTable, GroupedValues};
pub use pipeline::{Pipeline, PipelineResult, WriteSummary};
pub use plan::{StepInfo, StepKind};
pub use table::DistributedTable;
