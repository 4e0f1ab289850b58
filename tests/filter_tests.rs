use std::borrow::Cow;

use brushmap::core::{GeoPoint, Record, datetime_to_unix_seconds, filter_records, record_time};
use brushmap::interaction::{Selection, SelectionMessage, SelectionStore};
use chrono::{NaiveDate, Utc};

fn utc(year: i32, month: u32, day: u32) -> f64 {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date");
    datetime_to_unix_seconds(date.and_utc().with_timezone(&Utc))
}

fn two_records() -> Vec<Record> {
    vec![
        Record::new(utc(2019, 1, 15), 5.0, GeoPoint::new(-5.2, 35.5)),
        Record::new(utc(2019, 2, 20), 3.0, GeoPoint::new(12.1, 33.0)),
    ]
}

fn select(low: f64, high: f64) -> Selection {
    Selection::between(low, high).expect("non-empty selection")
}

#[test]
fn record_before_the_low_bound_is_excluded() {
    let records = two_records();
    let filtered = filter_records(
        &records,
        select(utc(2019, 1, 20), utc(2019, 3, 1)),
        record_time,
    );

    assert_eq!(filtered.as_ref(), &records[1..]);
}

#[test]
fn records_on_either_bound_are_excluded() {
    let records = two_records();
    let filtered = filter_records(
        &records,
        select(utc(2019, 1, 15), utc(2019, 2, 20)),
        record_time,
    );

    assert!(filtered.is_empty());
}

#[test]
fn clearing_after_narrowing_restores_the_initial_output() {
    let records = two_records();
    let mut store = SelectionStore::default();
    let initial = filter_records(&records, store.selection(), record_time).into_owned();

    let steps = [
        (select(utc(2019, 1, 1), utc(2019, 3, 1)), 2),
        (select(utc(2019, 1, 1), utc(2019, 2, 1)), 1),
    ];
    for (selection, expected) in steps {
        assert!(store.apply(SelectionMessage::new(selection)));
        assert_eq!(
            filter_records(&records, store.selection(), record_time).len(),
            expected
        );
    }

    assert!(store.apply(SelectionMessage::clear()));
    let cleared = filter_records(&records, store.selection(), record_time);
    assert!(matches!(cleared, Cow::Borrowed(_)));
    assert_eq!(cleared.as_ref(), initial.as_slice());
    assert_eq!(store.revision(), 3);
}
