//! Detached copies of rows and grouped rows.

use crate::common::*;
use proptest::prelude::*;
use strand::{
    tables, BincodeFamily, Error, GroupedValues, JsonFamily, MsgPackFamily, Pair, TypeFamily,
};

// ============================================================================
// Rows
// ============================================================================

#[test]
fn detached_row_is_equal_but_not_aliased() {
    let f = BincodeFamily;
    let tt = f.table_of(&f.strings(), &f.records::<Event>()).unwrap();
    let row = Pair::of("sensor".to_string(), Event::new(7, "north", b"payload"));

    let copy = tables::get_detached_value(&tt, &row).unwrap();

    assert_eq!(copy, row);
    assert_ne!(copy.first().as_ptr(), row.first().as_ptr());
    assert_ne!(copy.second().source.as_ptr(), row.second().source.as_ptr());
    assert_ne!(copy.second().payload.as_ptr(), row.second().payload.as_ptr());
}

#[test]
fn detach_leaves_input_untouched() {
    let f = JsonFamily;
    let tt = f.table_of(&f.longs(), &f.records::<Event>()).unwrap();
    let row = Pair::of(1, Event::new(1, "a", &[1, 2, 3]));
    let before = row.clone();

    let mut copy = tables::get_detached_value(&tt, &row).unwrap();
    copy = copy.map_second(|mut e| {
        e.payload.clear();
        e
    });

    assert_eq!(row, before);
    assert!(copy.second().payload.is_empty());
}

#[test]
fn detach_recurses_into_nested_pairs() {
    let f = MsgPackFamily;
    let inner = f.pairs(&f.strings(), &f.bytes()).unwrap();
    let tt = f.table_of(&f.ints(), &inner).unwrap();
    let row = Pair::of(1, Pair::of("k".to_string(), vec![9u8; 16]));

    let copy = tables::get_detached_value(&tt, &row).unwrap();
    assert_eq!(copy, row);
    assert_ne!(copy.second().second().as_ptr(), row.second().second().as_ptr());
}

#[test]
fn failed_detach_is_detach_error() {
    let f = BincodeFamily;
    let strict = f
        .derived(
            "Positive",
            &f.longs(),
            |n: i64| {
                if n > 0 {
                    Ok(n)
                } else {
                    Err(Error::InvalidOperation(format!("{} is not positive", n)))
                }
            },
            |n: &i64| Ok(*n),
        )
        .unwrap();
    let tt = f.table_of(&f.ints(), &strict).unwrap();

    let err = tables::get_detached_value(&tt, &Pair::of(1, -5)).unwrap_err();
    assert!(matches!(err, Error::Detach { .. }));
    assert!(!err.is_construction_error());
}

proptest! {
    #[test]
    fn detach_is_idempotent(id in any::<u64>(), source in "[a-z]{0,10}", payload in prop::collection::vec(any::<u8>(), 0..32)) {
        let f = BincodeFamily;
        let tt = f.table_of(&f.longs(), &f.records::<Event>()).unwrap();
        let row = Pair::of(id as i64, Event { id, source, payload });

        let once = tables::get_detached_value(&tt, &row).unwrap();
        let twice = tables::get_detached_value(&tt, &once).unwrap();
        prop_assert_eq!(&once, &row);
        prop_assert_eq!(twice, once);
    }
}

// ============================================================================
// Grouped Rows
// ============================================================================

#[test]
fn grouped_row_materializes_every_value() {
    let f = BincodeFamily;
    let tt = f.table_of(&f.ints(), &f.strings()).unwrap();
    let gt = f.grouped_table_of(&tt).unwrap();
    let values = vec!["v1".to_string(), "v2".to_string(), "v3".to_string()];
    let row = Pair::of(3, GroupedValues::new(values.clone()));

    let detached = tables::get_grouped_detached_value(&gt, row).unwrap();

    assert_eq!(*detached.first(), 3);
    assert_eq!(detached.second().len(), 3);
    assert_eq!(detached.second(), &values);
}

#[test]
fn grouped_row_is_drained_exactly_once() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let f = JsonFamily;
    let tt = f.table_of(&f.strings(), &f.longs()).unwrap();
    let gt = f.grouped_table_of(&tt).unwrap();

    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let values = GroupedValues::new((1..=4).map(move |v| {
        counter.fetch_add(1, Ordering::SeqCst);
        v
    }));

    let detached = tables::get_grouped_detached_value(&gt, Pair::of("k".to_string(), values)).unwrap();
    assert_eq!(detached.second(), &vec![1, 2, 3, 4]);
    assert_eq!(pulled.load(Ordering::SeqCst), 4);
}

#[test]
fn grouped_detach_stops_at_first_failure() {
    let f = BincodeFamily;
    let strict = f
        .derived(
            "NonEmpty",
            &f.strings(),
            |s: String| {
                if s.is_empty() {
                    Err(Error::InvalidOperation("empty".into()))
                } else {
                    Ok(s)
                }
            },
            |s: &String| Ok(s.clone()),
        )
        .unwrap();
    let tt = f.table_of(&f.ints(), &strict).unwrap();
    let gt = f.grouped_table_of(&tt).unwrap();
    let values = GroupedValues::new(vec!["a".to_string(), String::new()]);

    let err = tables::get_grouped_detached_value(&gt, Pair::of(1, values)).unwrap_err();
    assert!(matches!(err, Error::Detach { .. }));
}
