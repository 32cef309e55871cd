//! Strand - typed data binding for distributed collection pipelines
//!
//! Strand describes how element types are encoded, composed and safely
//! copied, binds storage locations as typed sources and targets, and builds
//! lazy transform graphs over collections and keyed tables.
//!
//! # Quick Start
//!
//! ```
//! use strand::{tables, BincodeFamily, Pair, Pipeline, TypeFamily};
//!
//! let family = BincodeFamily;
//! let pipeline = Pipeline::new();
//! let pairs = pipeline.create(
//!     vec![Pair::of(1, "a".to_string()), Pair::of(2, "b".to_string())],
//!     family.pairs(&family.ints(), &family.strings())?,
//! );
//!
//! let table = tables::as_table(&pairs)?;
//! assert_eq!(tables::values(&table).materialize()?, vec!["a", "b"]);
//! # Ok::<(), strand::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `strand-core`: type descriptors, type families, pairs and errors
//! - `strand-storage`: locations, naming schemes, record files, source/target bindings
//! - `strand-engine`: pipelines, collections, tables and table utilities

pub use strand_core::*;
pub use strand_engine::*;
pub use strand_storage::{
    ClassicNamingScheme, Location, NamingScheme, RecordFileSource, RecordFileTarget,
    SequentialNamingScheme, Source, SourceTarget, TableSourceTarget, Target, TaskKind,
};

/// Storage crate, for items not re-exported at the root
pub use strand_storage as storage;
