use brushmap::core::{Scale, ScaleKind, ScaleOptions};
use proptest::prelude::*;

proptest! {
    #[test]
    fn linear_round_trip_property(
        domain_start in -1_000_000.0f64..1_000_000.0,
        domain_span in 0.001f64..1_000_000.0,
        value_factor in 0.0f64..1.0
    ) {
        let domain_end = domain_start + domain_span;
        let value = domain_start + value_factor * domain_span;

        let scale = Scale::linear((domain_start, domain_end), (0.0, 2048.0)).expect("valid scale");
        let recovered = scale.invert(scale.map(value));

        prop_assert!((recovered - value).abs() <= 1e-6);
    }

    #[test]
    fn sqrt_round_trip_property(
        domain_end in 0.001f64..1_000_000.0,
        value_factor in 0.0f64..1.0,
        max_radius in 1.0f64..100.0
    ) {
        let value = value_factor * domain_end;

        let scale = Scale::sqrt((0.0, domain_end), (0.0, max_radius)).expect("valid scale");
        let radius = scale.map(value);
        let recovered = scale.invert(radius);

        prop_assert!(radius >= 0.0 && radius <= max_radius + 1e-9);
        prop_assert!((recovered - value).abs() <= 1e-6 * domain_end.max(1.0));
    }

    #[test]
    fn time_round_trip_property(
        time_start in 0.0f64..2_000_000_000.0,
        time_span in 1.0f64..500_000_000.0,
        value_factor in 0.0f64..1.0
    ) {
        let time_end = time_start + time_span;
        let value = time_start + value_factor * time_span;

        let scale = Scale::time((time_start, time_end), (0.0, 885.0)).expect("valid scale");
        let recovered = scale.invert(scale.map(value));

        prop_assert!((recovered - value).abs() <= 1e-3);
    }

    #[test]
    fn nice_time_domain_contains_the_extent(
        time_start in 0.0f64..2_000_000_000.0,
        time_span in 60.0f64..500_000_000.0
    ) {
        let time_end = time_start + time_span;
        let scale = Scale::build(
            ScaleKind::Time,
            (time_start, time_end),
            (0.0, 885.0),
            ScaleOptions::niced(),
        )
        .expect("valid scale");
        let (low, high) = scale.domain();

        prop_assert!(low <= time_start);
        prop_assert!(high >= time_end);
        let mapped_start = scale.map(time_start);
        let mapped_end = scale.map(time_end);
        prop_assert!(mapped_start >= -1e-9 && mapped_end <= 885.0 + 1e-9);
    }
}
