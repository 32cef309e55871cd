//! Grouping and grouped-row detachment inside transforms.

use crate::common::*;
use parking_lot::Mutex;
use std::sync::Arc;
use strand::{
    tables, BincodeFamily, DoFn, Emitter, GroupedTableType, GroupedValues, JsonFamily, Pair,
    Pipeline, Result, StepKind, TypeFamily,
};

#[test]
fn group_by_key_on_scenario() {
    let pipeline = Pipeline::new();
    let grouped = scenario_table(&pipeline, BincodeFamily).group_by_key().unwrap();

    assert_eq!(grouped.step().kind, StepKind::GroupByKey);
    assert_eq!(
        grouped.materialize_detached().unwrap(),
        vec![
            Pair::of(1, vec!["a".to_string(), "b".to_string()]),
            Pair::of(2, vec!["c".to_string()]),
        ]
    );
}

#[test]
fn ungroup_keeps_every_row() {
    let pipeline = Pipeline::new();
    let table = scenario_table(&pipeline, JsonFamily);
    let rows = table.group_by_key().unwrap().ungroup().materialize().unwrap();
    assert_eq!(rows, scenario_rows());
}

#[test]
fn combine_values_per_key() {
    let pipeline = Pipeline::new();
    let joined = scenario_table(&pipeline, BincodeFamily)
        .group_by_key()
        .unwrap()
        .combine_values("join", |a, b| format!("{}{}", a, b));
    assert_eq!(
        joined.materialize().unwrap(),
        vec![Pair::of(1, "ab".to_string()), Pair::of(2, "c".to_string())]
    );
}

/// Keeps every grouped row it sees, the way an accumulating transform does.
struct Collect {
    grouped_type: GroupedTableType<i32, String>,
    kept: Arc<Mutex<Vec<Pair<i32, Vec<String>>>>>,
}

impl DoFn<Pair<i32, GroupedValues<String>>, i32> for Collect {
    fn process(&self, row: Pair<i32, GroupedValues<String>>, out: &mut Emitter<i32>) -> Result<()> {
        let row = tables::get_grouped_detached_value(&self.grouped_type, row)?;
        out.emit(row.second().len() as i32);
        self.kept.lock().push(row);
        Ok(())
    }
}

#[test]
fn detached_groups_outlive_the_transform_call() {
    let pipeline = Pipeline::new();
    let f = BincodeFamily;
    let grouped = scenario_table(&pipeline, f).group_by_key().unwrap();

    let kept = Arc::new(Mutex::new(Vec::new()));
    let collect = Collect {
        grouped_type: grouped.grouped_type().clone(),
        kept: Arc::clone(&kept),
    };

    let sizes = grouped.parallel_do("sizes", collect, f.ints());
    assert_eq!(sizes.materialize().unwrap(), vec![2, 1]);

    let kept = kept.lock();
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0], Pair::of(1, vec!["a".to_string(), "b".to_string()]));
    assert_eq!(kept[1], Pair::of(2, vec!["c".to_string()]));
}

#[test]
fn grouping_compares_encoded_keys() {
    let pipeline = Pipeline::new();
    let f = JsonFamily;
    let tt = f.table_of(&f.strings(), &f.ints()).unwrap();
    let table = pipeline.create_table(
        vec![
            Pair::of("x".to_string(), 1),
            Pair::of("y".to_string(), 2),
            Pair::of("x".to_string(), 3),
        ],
        &tt,
    );
    let keys = tables::keys(&table.group_by_key().unwrap().ungroup());
    assert_eq!(keys.materialize().unwrap(), vec!["x", "x", "y"]);
}
