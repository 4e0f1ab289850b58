use std::borrow::Cow;

use brushmap::core::{GeoPoint, Record, filter_records, record_time};
use brushmap::interaction::Selection;
use proptest::prelude::*;

fn records_from(times: &[f64]) -> Vec<Record> {
    times
        .iter()
        .enumerate()
        .map(|(index, &time)| Record::new(time, index as f64, GeoPoint::new(0.0, 0.0)))
        .collect()
}

proptest! {
    #[test]
    fn unselected_borrows_every_record(
        times in prop::collection::vec(-1_000.0f64..1_000.0, 0..64)
    ) {
        let records = records_from(&times);
        let filtered = filter_records(&records, Selection::Unselected, record_time);

        prop_assert!(matches!(filtered, Cow::Borrowed(_)));
        prop_assert_eq!(filtered.as_ref(), records.as_slice());
    }

    #[test]
    fn selection_keeps_exactly_the_strictly_inside_records(
        times in prop::collection::vec(-1_000.0f64..1_000.0, 0..64),
        a in -1_000.0f64..1_000.0,
        b in -1_000.0f64..1_000.0
    ) {
        prop_assume!(a != b);
        let records = records_from(&times);
        let selection = Selection::between(a, b).expect("finite distinct bounds");
        let (low, high) = selection.bounds().expect("active selection");

        let filtered = filter_records(&records, selection, record_time);

        prop_assert!(filtered.iter().all(|record| low < record.time && record.time < high));
        let expected: Vec<Record> = records
            .iter()
            .copied()
            .filter(|record| low < record.time && record.time < high)
            .collect();
        prop_assert_eq!(filtered.as_ref(), expected.as_slice());
    }

    #[test]
    fn records_on_a_brush_edge_are_excluded(
        times in prop::collection::vec(0.0f64..100.0, 0..32),
        edge in 10.0f64..90.0
    ) {
        let mut with_edges = times.clone();
        with_edges.push(edge);
        with_edges.push(edge + 5.0);
        let records = records_from(&with_edges);
        let selection = Selection::between(edge, edge + 5.0).expect("selection");

        let filtered = filter_records(&records, selection, record_time);

        prop_assert!(filtered.iter().all(|record| record.time != edge && record.time != edge + 5.0));
    }
}
