//! Shared test utilities for all integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use strand::{DistributedCollection, DistributedTable, Pair, Pipeline, TableType, TypeFamily};
use tempfile::TempDir;

/// Rows of the `[(1,"a"), (1,"b"), (2,"c")]` scenario.
pub fn scenario_rows() -> Vec<Pair<i32, String>> {
    vec![
        Pair::of(1, "a".to_string()),
        Pair::of(1, "b".to_string()),
        Pair::of(2, "c".to_string()),
    ]
}

/// Scenario rows as a collection of `(int, string)` pairs.
pub fn scenario_pairs<F: TypeFamily>(pipeline: &Pipeline, family: F) -> DistributedCollection<Pair<i32, String>> {
    let ptype = family
        .pairs(&family.ints(), &family.strings())
        .expect("same-family pair type");
    pipeline.create(scenario_rows(), ptype)
}

/// Scenario rows as a table.
pub fn scenario_table<F: TypeFamily>(pipeline: &Pipeline, family: F) -> DistributedTable<i32, String> {
    pipeline.create_table(scenario_rows(), &int_string_table(family))
}

/// `(i32, String)` table type of `family`.
pub fn int_string_table<F: TypeFamily>(family: F) -> TableType<i32, String> {
    family
        .table_of(&family.ints(), &family.strings())
        .expect("same-family table type")
}

/// Record type with owned heap data, used where detach must copy storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    pub source: String,
    pub payload: Vec<u8>,
}

impl Event {
    pub fn new(id: u64, source: &str, payload: &[u8]) -> Self {
        Event {
            id,
            source: source.to_string(),
            payload: payload.to_vec(),
        }
    }
}

/// Temporary directory that lives as long as the returned guard.
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}
