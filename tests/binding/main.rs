//! Binding Tests
//!
//! Source/target bindings on disk:
//! - source_target: construction, identity, naming and shard layout
//! - pipeline_io: writing collections and tables, reading them back

#[path = "../common/mod.rs"]
mod common;

mod pipeline_io;
mod source_target;
