use brushmap::core::{GeoPoint, Record, bin_records, record_measure, record_time};
use proptest::prelude::*;

fn records_from(values: &[(f64, f64)]) -> Vec<Record> {
    values
        .iter()
        .map(|&(time, measure)| Record::new(time, measure, GeoPoint::new(0.0, 0.0)))
        .collect()
}

proptest! {
    #[test]
    fn bins_partition_the_domain(
        values in prop::collection::vec((0.0f64..1_000.0, 0.0f64..50.0), 0..64),
        thresholds in prop::collection::vec(-100.0f64..1_100.0, 0..12)
    ) {
        let records = records_from(&values);
        let bins = bin_records(&records, Some((0.0, 1_000.0)), &thresholds, record_time, record_measure)
            .expect("bins");

        prop_assert!(!bins.is_empty());
        prop_assert_eq!(bins[0].start, 0.0);
        prop_assert_eq!(bins[bins.len() - 1].end, 1_000.0);
        for pair in bins.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
            prop_assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn every_in_domain_record_is_counted_once(
        values in prop::collection::vec((-200.0f64..1_200.0, 0.0f64..50.0), 0..64),
        thresholds in prop::collection::vec(0.0f64..1_000.0, 0..12)
    ) {
        let records = records_from(&values);
        let bins = bin_records(&records, Some((0.0, 1_000.0)), &thresholds, record_time, record_measure)
            .expect("bins");

        let in_domain: Vec<&Record> = records
            .iter()
            .filter(|record| (0.0..=1_000.0).contains(&record.time))
            .collect();
        let counted: usize = bins.iter().map(|bin| bin.count).sum();
        prop_assert_eq!(counted, in_domain.len());

        let expected_sum: f64 = in_domain.iter().map(|record| record.measure).sum();
        let binned_sum: f64 = bins.iter().map(|bin| bin.sum).sum();
        prop_assert!((expected_sum - binned_sum).abs() <= 1e-6 * expected_sum.max(1.0));
    }

    #[test]
    fn bin_sums_do_not_depend_on_input_order(
        values in prop::collection::vec((0.0f64..1_000.0, 0.0f64..50.0), 1..64),
        thresholds in prop::collection::vec(0.0f64..1_000.0, 0..12)
    ) {
        let records = records_from(&values);
        let mut reversed = records.clone();
        reversed.reverse();

        let forward = bin_records(&records, Some((0.0, 1_000.0)), &thresholds, record_time, record_measure)
            .expect("bins");
        let backward = bin_records(&reversed, Some((0.0, 1_000.0)), &thresholds, record_time, record_measure)
            .expect("bins");

        prop_assert_eq!(forward, backward);
    }
}
