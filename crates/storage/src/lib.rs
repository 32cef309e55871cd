//! Storage binding for strand
//!
//! This crate binds logical locations to typed record storage:
//! - Location: a directory of shard files with readable/writable probes
//! - NamingScheme: deterministic shard-index-to-file-name functions
//! - Record file format: length-prefixed, CRC-checked records tagged with
//!   the type family that encoded them
//! - RecordFileSource / RecordFileTarget: read and write halves
//! - SourceTarget / TableSourceTarget: both halves bound to one location
//!
//! Binding never touches record data. Sources read only when a pipeline
//! consumes them, and targets create their directory on first write.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod format;
pub mod location;
pub mod naming;
pub mod source;
pub mod source_target;
pub mod target;

pub use format::{read_record_file, write_record_file, RecordFileHeader};
pub use location::Location;
pub use naming::{ClassicNamingScheme, NamingScheme, SequentialNamingScheme, TaskKind};
pub use source::{RecordFileSource, Source};
pub use source_target::{SourceTarget, TableSourceTarget};
pub use target::{RecordFileTarget, Target};
