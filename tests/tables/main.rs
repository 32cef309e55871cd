//! Table Utility Tests
//!
//! End-to-end tests for the pair/table conversions and detach helpers:
//! - as_table: shape checks and identity reinterpretation
//! - projection: keys and values
//! - detach: independent copies of rows and grouped rows
//! - grouping: group_by_key, ungroup and combine_values

#[path = "../common/mod.rs"]
mod common;

mod as_table;
mod detach;
mod grouping;
