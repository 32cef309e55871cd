//! Writing through a pipeline and reading the output back.

use crate::common::*;
use std::fs;
use strand::{
    tables, BincodeFamily, Error, JsonFamily, MsgPackFamily, Pair, Pipeline, PipelineConfig,
    TypeFamily, CONFIG_FILE_NAME,
};

#[test]
fn write_then_read_back_collection() {
    let dir = temp_dir();
    let f = BincodeFamily;
    let pipeline = Pipeline::new();
    let out = pipeline.source_target(dir.path().join("events"), f.records::<Event>()).unwrap();

    let events = vec![Event::new(1, "a", b"x"), Event::new(2, "b", b"")];
    pipeline.write(&pipeline.create(events.clone(), f.records::<Event>()), &out).unwrap();
    let result = pipeline.run().unwrap();

    assert_eq!(result.writes.len(), 1);
    assert_eq!(result.writes[0].target, out.to_string());
    assert_eq!(result.total_records(), 2);

    let reader = Pipeline::new();
    assert_eq!(reader.read(out.clone()).materialize().unwrap(), events);
}

#[test]
fn intermediate_output_feeds_a_later_stage() {
    let dir = temp_dir();
    let f = MsgPackFamily;
    let tt = int_string_table(f);

    let first = Pipeline::new();
    let stage = first.table_source_target(dir.path().join("stage"), &tt).unwrap();
    first.write_table(&scenario_table(&first, f), &stage).unwrap();
    first.run().unwrap();

    let second = Pipeline::new();
    let table = second.read_table(&stage);
    assert!(table.key_type().same_as(tt.key_type()));
    assert_eq!(tables::keys(&table).materialize().unwrap(), vec![1, 1, 2]);
    assert_eq!(tables::values(&table).materialize().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn grouped_output_round_trips() {
    let dir = temp_dir();
    let f = JsonFamily;
    let pipeline = Pipeline::new();
    let sums_type = f.table_of(&f.strings(), &f.longs()).unwrap();
    let out = pipeline.table_source_target(dir.path(), &sums_type).unwrap();

    let words = pipeline.create(
        vec!["b".to_string(), "a".to_string(), "b".to_string()],
        f.strings(),
    );
    let counts = words
        .map("one", |w| Pair::of(w, 1i64), sums_type.ptype().clone());
    let counts = tables::as_table(&counts)
        .unwrap()
        .group_by_key()
        .unwrap()
        .combine_values("sum", |a, b| a + b);
    pipeline.write_table(&counts, &out).unwrap();
    pipeline.run().unwrap();

    assert_eq!(
        out.read().unwrap(),
        vec![Pair::of("b".to_string(), 2), Pair::of("a".to_string(), 1)]
    );
}

#[test]
fn configured_pipeline_shards_output() {
    let dir = temp_dir();
    let config_path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&config_path, "name = \"sharded\"\nshards = 4\n\n[naming]\nbase = \"chunk\"\n").unwrap();

    let pipeline = Pipeline::from_config_file(&config_path).unwrap();
    assert_eq!(pipeline.config().name, "sharded");

    let f = BincodeFamily;
    let out = pipeline.source_target(dir.path().join("out"), f.ints()).unwrap();
    pipeline.write(&pipeline.create((0..10).collect(), f.ints()), &out).unwrap();
    let result = pipeline.run().unwrap();

    let names: Vec<String> = result.writes[0]
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["chunk-00000", "chunk-00001", "chunk-00002", "chunk-00003"]);
    assert_eq!(out.read().unwrap(), (0..10).collect::<Vec<i32>>());
}

#[test]
fn rerun_overwrites_previous_shards() {
    let dir = temp_dir();
    let f = BincodeFamily;
    let config = PipelineConfig::default().with_shards(2);

    let pipeline = Pipeline::with_config(config.clone()).unwrap();
    let out = pipeline.source_target(dir.path(), f.ints()).unwrap();
    pipeline.write(&pipeline.create(vec![1, 2, 3], f.ints()), &out).unwrap();
    pipeline.run().unwrap();

    let again = Pipeline::with_config(config).unwrap();
    again.write(&again.create(vec![7, 8], f.ints()), &out).unwrap();
    again.run().unwrap();

    assert_eq!(out.read().unwrap(), vec![7, 8]);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn rerun_with_fewer_shards_drops_stale_shards() {
    let dir = temp_dir();
    let f = BincodeFamily;

    let wide = Pipeline::with_config(PipelineConfig::default().with_shards(3)).unwrap();
    let out = wide.source_target(dir.path(), f.ints()).unwrap();
    wide.write(&wide.create(vec![1, 2, 3], f.ints()), &out).unwrap();
    wide.run().unwrap();
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);

    let narrow = Pipeline::new();
    narrow.write(&narrow.create(vec![7, 8], f.ints()), &out).unwrap();
    let result = narrow.run().unwrap();

    assert_eq!(result.writes[0].files, vec![dir.path().join("part-00000")]);
    assert_eq!(out.read().unwrap(), vec![7, 8]);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn failed_step_fails_the_run() {
    let dir = temp_dir();
    let f = BincodeFamily;
    let pipeline = Pipeline::new();
    let out = pipeline.source_target(dir.path().join("out"), f.ints()).unwrap();
    let broken = pipeline.create(vec![1, 2], f.ints()).parallel_do(
        "broken",
        strand::do_fn(|_: i32, _: &mut strand::Emitter<i32>| Err(Error::InvalidOperation("boom".into()))),
        f.ints(),
    );
    pipeline.write(&broken, &out).unwrap();

    assert!(matches!(pipeline.run(), Err(Error::InvalidOperation(_))));
    assert!(!dir.path().join("out").exists());
}
