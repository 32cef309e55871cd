//! SourceTarget construction and on-disk layout.

use crate::common::*;
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use strand::storage::format::RECORD_FILE_MAGIC;
use strand::{
    BincodeFamily, ClassicNamingScheme, Error, JsonFamily, NamingScheme, SequentialNamingScheme,
    Source, SourceTarget, TableSourceTarget, Target, TaskKind, TypeFamily,
};

// ============================================================================
// Construction
// ============================================================================

#[test]
fn existing_directory_binds() {
    let dir = temp_dir();
    let st = SourceTarget::new(dir.path(), BincodeFamily.longs()).unwrap();
    assert_eq!(st.location().path(), dir.path());
}

#[test]
fn not_yet_existing_directory_binds() {
    let dir = temp_dir();
    let path = dir.path().join("later").join("out");
    let st = SourceTarget::new(path.as_path(), BincodeFamily.longs()).unwrap();

    // Binding never creates anything
    assert!(!path.exists());

    // Reading before anything was written fails at read time
    assert!(st.read().is_err());
}

#[test]
fn location_under_a_file_is_binding_error() {
    let dir = temp_dir();
    let file = dir.path().join("data.bin");
    fs::write(&file, b"not a directory").unwrap();

    let err = SourceTarget::new(file.join("out"), BincodeFamily.longs()).unwrap_err();
    assert!(matches!(err, Error::Binding { .. }));
    assert!(err.to_string().contains("out"));

    let tt = int_string_table(BincodeFamily);
    let err = TableSourceTarget::new(file.join("out"), &tt).unwrap_err();
    assert!(matches!(err, Error::Binding { .. }));
}

#[cfg(unix)]
#[test]
fn location_below_read_only_dir_is_binding_error() {
    use std::os::unix::fs::PermissionsExt;

    let dir = temp_dir();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores the mode bits, nothing to check there
    let privileged = fs::File::create(locked.join("x")).is_ok();
    let bound = SourceTarget::new(locked.join("out"), BincodeFamily.longs());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    if privileged {
        return;
    }

    assert!(matches!(bound, Err(Error::Binding { .. })));
}

#[test]
fn table_type_never_changes() {
    let dir = temp_dir();
    let tt = int_string_table(JsonFamily);
    let st = TableSourceTarget::new(dir.path(), &tt).unwrap();

    assert!(st.table_type().key_type().same_as(tt.key_type()));
    assert!(st.table_type().value_type().same_as(tt.value_type()));
    assert!(st.ptype().same_as(tt.ptype()));
    assert!(st.clone().with_shard_base("other").ptype().same_as(tt.ptype()));
}

// ============================================================================
// Identity
// ============================================================================

#[test]
fn display_delegates_to_target() {
    let dir = temp_dir();
    let st = SourceTarget::new(dir.path(), BincodeFamily.strings()).unwrap();
    assert_eq!(st.to_string(), st.target().to_string());
    assert_eq!(st.to_string(), format!("RecordFile({})", dir.path().display()));
}

#[test]
fn equality_and_hash_follow_target_string() {
    let dir = temp_dir();
    let a = SourceTarget::new(dir.path(), BincodeFamily.strings()).unwrap();
    let b = SourceTarget::new(dir.path(), BincodeFamily.strings()).unwrap();
    let c = SourceTarget::new(dir.path().join("c"), BincodeFamily.strings()).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    let set: HashSet<_> = vec![a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn bindings_with_different_shard_bases_differ() {
    let dir = temp_dir();
    let parts = SourceTarget::new(dir.path(), BincodeFamily.ints()).unwrap();
    let counts = parts.clone().with_shard_base("counts");

    parts.write_shards(&[vec![1]]).unwrap();
    counts.write_shards(&[vec![2]]).unwrap();

    assert_ne!(parts, counts);
    let set: HashSet<_> = vec![parts.clone(), counts.clone()].into_iter().collect();
    assert_eq!(set.len(), 2);
    assert_eq!(parts.read().unwrap(), vec![1]);
    assert_eq!(counts.read().unwrap(), vec![2]);
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn source_and_target_share_one_naming_scheme() {
    let dir = temp_dir();
    let scheme: Arc<dyn NamingScheme> = Arc::new(ClassicNamingScheme::new(TaskKind::Reduce));
    let st = SourceTarget::with_naming_scheme(dir.path(), BincodeFamily.ints(), scheme.clone()).unwrap();

    assert!(Arc::ptr_eq(st.naming_scheme(), &scheme));
    assert!(Arc::ptr_eq(st.source().naming_scheme(), st.target().naming_scheme()));
    assert_eq!(Source::location(&st), Target::location(&st));
}

#[test]
fn shards_are_named_by_the_scheme() {
    let dir = temp_dir();
    let scheme = Arc::new(ClassicNamingScheme::new(TaskKind::Map));
    let st = SourceTarget::with_naming_scheme(dir.path(), BincodeFamily.ints(), scheme).unwrap();

    let files = st.write_shards(&[vec![1], vec![2], vec![3]]).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["part-m-00000", "part-m-00001", "part-m-00002"]);

    let header = fs::read(&files[0]).unwrap();
    assert_eq!(&header[..4], &RECORD_FILE_MAGIC);
}

#[test]
fn sequential_names_are_unique_and_ordered_for_100k_shards() {
    let scheme = SequentialNamingScheme::default();
    let names: Vec<String> = (0..100_000).map(|i| scheme.name("part", i)).collect();

    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), 100_000);
    assert!(names.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn foreign_files_are_ignored_on_read() {
    let dir = temp_dir();
    let st = SourceTarget::new(dir.path(), BincodeFamily.ints()).unwrap();
    st.write_shards(&[vec![1, 2]]).unwrap();
    fs::write(dir.path().join("_SUCCESS"), b"").unwrap();
    fs::write(dir.path().join("part-00001.tmp"), b"partial").unwrap();

    assert_eq!(st.read().unwrap(), vec![1, 2]);
}

#[test]
fn reading_with_another_family_fails() {
    let dir = temp_dir();
    SourceTarget::new(dir.path(), BincodeFamily.ints())
        .unwrap()
        .write_shards(&[vec![1]])
        .unwrap();

    let json = SourceTarget::new(dir.path(), JsonFamily.ints()).unwrap();
    assert!(matches!(json.read(), Err(Error::InvalidType(_))));
}

#[test]
fn damaged_shard_is_corruption() {
    let dir = temp_dir();
    let st = SourceTarget::new(dir.path(), BincodeFamily.strings()).unwrap();
    let files = st.write_shards(&[vec!["hello".to_string()]]).unwrap();

    let mut bytes = fs::read(&files[0]).unwrap();
    let last = bytes.len() - 6;
    bytes[last] ^= 0x01;
    fs::write(&files[0], bytes).unwrap();

    assert!(matches!(st.read(), Err(Error::Corruption(_))));
}
