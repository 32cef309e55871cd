//! Core types for strand
//!
//! This crate defines the typed contracts every other strand crate builds on:
//! - Pair: Two-field immutable tuple, the element type of tables
//! - TypeDescriptor: Runtime witness for an element type (encode, decode, detach)
//! - AnyType: Type-erased descriptor used for structural sub-types
//! - TableType / GroupedTableType: Key/value row types
//! - TypeFamily: Factory bound to one serialization scheme (bincode, JSON, MessagePack)
//! - Error: Error type shared by all crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod composite;
pub mod descriptor;
pub mod error;
pub mod family;
mod framing;
pub mod pair;
pub mod table_type;

pub use descriptor::{AnyType, DescriptorBuilder, TypeDescriptor};
pub use error::{Error, Result};
pub use family::{BincodeFamily, JsonFamily, MsgPackFamily, TypeFamily};
pub use pair::Pair;
pub use table_type::{GroupedTableType, TableType};
