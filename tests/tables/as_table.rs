//! as_table: reinterpretation of pair collections as tables.

use crate::common::*;
use strand::{
    tables, BincodeFamily, Error, JsonFamily, MsgPackFamily, Pair, Pipeline, StepKind,
    TypeDescriptor, TypeFamily,
};

// ============================================================================
// Table Types
// ============================================================================

fn check_table_of_sub_types<F: TypeFamily>(family: F) {
    let kt = family.ints();
    let vt = family.strings();
    let tt = family.table_of(&kt, &vt).unwrap();

    assert_eq!(tt.sub_types().len(), 2);
    assert!(tt.sub_types()[0].same_as(&kt.erase()));
    assert!(tt.sub_types()[1].same_as(&vt.erase()));
    assert_eq!(tt.family(), family.family_id());
}

#[test]
fn table_of_sub_types_are_key_and_value_in_every_family() {
    check_table_of_sub_types(BincodeFamily);
    check_table_of_sub_types(JsonFamily);
    check_table_of_sub_types(MsgPackFamily);
}

#[test]
fn table_of_rejects_foreign_component() {
    let err = BincodeFamily
        .table_of(&BincodeFamily.ints(), &JsonFamily.strings())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidType(_)));
    assert!(err.is_construction_error());
}

// ============================================================================
// Scenario
// ============================================================================

fn check_scenario<F: TypeFamily>(family: F) {
    let pipeline = Pipeline::new();
    let pairs = scenario_pairs(&pipeline, family);
    let table = tables::as_table(&pairs).unwrap();

    assert_eq!(table.materialize().unwrap(), scenario_rows());
    assert_eq!(tables::keys(&table).materialize().unwrap(), vec![1, 1, 2]);
    assert_eq!(
        tables::values(&table).materialize().unwrap(),
        vec!["a", "b", "c"]
    );
}

#[test]
fn scenario_rows_survive_as_table_in_every_family() {
    check_scenario(BincodeFamily);
    check_scenario(JsonFamily);
    check_scenario(MsgPackFamily);
}

#[test]
fn as_table_registers_reinterpret_step() {
    let pipeline = Pipeline::new();
    let pairs = scenario_pairs(&pipeline, BincodeFamily);
    let table = tables::as_table(&pairs).unwrap();

    let step = table.step();
    assert_eq!(step.kind, StepKind::Reinterpret);
    assert_eq!(step.parents, vec![pairs.step().id]);
    assert_eq!(step.element_type, table.table_type().name());
}

#[test]
fn as_table_is_lazy() {
    let pipeline = Pipeline::new();
    let f = BincodeFamily;
    let pairs = pipeline
        .create(scenario_rows(), f.pairs(&f.ints(), &f.strings()).unwrap())
        .parallel_do(
            "fail",
            strand::do_fn(|_row: Pair<i32, String>, _out: &mut strand::Emitter<Pair<i32, String>>| {
                Err(Error::InvalidOperation("evaluated".into()))
            }),
            f.pairs(&f.ints(), &f.strings()).unwrap(),
        );

    // Building the table never evaluates the failing step
    let table = tables::as_table(&pairs).unwrap();
    assert!(table.materialize().is_err());
}

// ============================================================================
// Shape Mismatch
// ============================================================================

fn opaque_pair_type(sub_types: usize) -> TypeDescriptor<Pair<i32, String>> {
    let f = BincodeFamily;
    let records = f.records::<Pair<i32, String>>();
    let decoder = records.clone();
    let mut builder = TypeDescriptor::builder(format!("Opaque{}", sub_types), f.family_id())
        .encode_with(move |v| records.encode(v))
        .decode_with(move |b| decoder.decode(b));
    for _ in 0..sub_types {
        builder = builder.sub_type(f.ints().erase());
    }
    builder.build().unwrap()
}

#[test]
fn as_table_rejects_zero_sub_types_without_partial_output() {
    let pipeline = Pipeline::new();
    let pairs = pipeline.create(scenario_rows(), opaque_pair_type(0));
    let steps_before = pipeline.steps();

    let err = tables::as_table(&pairs).unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected: 2,
            actual: 0,
            ..
        }
    ));
    assert_eq!(pipeline.steps(), steps_before);
}

#[test]
fn as_table_rejects_three_sub_types_without_partial_output() {
    let pipeline = Pipeline::new();
    let pairs = pipeline.create(scenario_rows(), opaque_pair_type(3));
    let steps_before = pipeline.steps();

    let err = tables::as_table(&pairs).unwrap_err();
    assert!(matches!(
        err,
        Error::ShapeMismatch {
            expected: 2,
            actual: 3,
            ..
        }
    ));
    assert_eq!(pipeline.steps(), steps_before);

    // The input collection is still usable
    assert_eq!(pairs.materialize().unwrap(), scenario_rows());
}

#[test]
fn shape_mismatch_message_names_the_type() {
    let pipeline = Pipeline::new();
    let pairs = pipeline.create(scenario_rows(), opaque_pair_type(0));
    let message = tables::as_table(&pairs).unwrap_err().to_string();
    assert!(message.contains("Opaque0"));
}
