use approx::assert_abs_diff_eq;
use brushmap::AtlasError;
use brushmap::core::{Scale, ScaleKind, ScaleOptions, datetime_to_unix_seconds};
use chrono::{NaiveDate, Utc};

fn utc(year: i32, month: u32, day: u32) -> f64 {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date");
    datetime_to_unix_seconds(date.and_utc().with_timezone(&Utc))
}

#[test]
fn linear_round_trip_within_tolerance() {
    let scale = Scale::linear((10.0, 110.0), (0.0, 800.0)).expect("valid scale");
    let original = 42.5;
    let recovered = scale.invert(scale.map(original));
    assert_abs_diff_eq!(recovered, original, epsilon = 1e-9);
}

#[test]
fn sqrt_scale_makes_area_proportional() {
    let scale = Scale::sqrt((0.0, 100.0), (0.0, 15.0)).expect("valid scale");
    assert_abs_diff_eq!(scale.map(0.0), 0.0);
    assert_abs_diff_eq!(scale.map(100.0), 15.0);
    assert_abs_diff_eq!(scale.map(25.0), 7.5, epsilon = 1e-12);
    assert_abs_diff_eq!(scale.invert(7.5), 25.0, epsilon = 1e-9);
}

#[test]
fn descending_range_maps_high_values_up() {
    let scale = Scale::linear((0.0, 20.0), (53.0, 0.0)).expect("valid scale");
    assert_abs_diff_eq!(scale.map(0.0), 53.0);
    assert_abs_diff_eq!(scale.map(20.0), 0.0);
    assert_abs_diff_eq!(scale.map(10.0), 26.5);
}

#[test]
fn time_round_trip_within_tolerance() {
    let scale = Scale::time((utc(2019, 1, 1), utc(2019, 12, 31)), (0.0, 885.0))
        .expect("valid scale");
    let original = utc(2019, 6, 15);
    assert_abs_diff_eq!(scale.invert(scale.map(original)), original, epsilon = 1e-3);
}

#[test]
fn degenerate_domain_maps_to_range_midpoint() {
    for kind in [ScaleKind::Linear, ScaleKind::Sqrt, ScaleKind::Time] {
        let scale = Scale::build(kind, (5.0, 5.0), (0.0, 100.0), ScaleOptions::default())
            .expect("degenerate domain is valid");
        assert!(scale.is_degenerate());
        assert_abs_diff_eq!(scale.map(5.0), 50.0);
        assert_abs_diff_eq!(scale.invert(50.0), 5.0);
    }
}

#[test]
fn degenerate_niced_time_domain_stays_finite() {
    let t = utc(2019, 1, 15);
    let scale = Scale::build(ScaleKind::Time, (t, t), (0.0, 885.0), ScaleOptions::niced())
        .expect("valid scale");
    let mapped = scale.map(t);
    assert!(mapped.is_finite());
    assert!((0.0..=885.0).contains(&mapped));
}

#[test]
fn inverted_or_non_finite_domain_is_rejected() {
    assert_eq!(
        Scale::linear((10.0, 1.0), (0.0, 1.0)),
        Err(AtlasError::InvalidDomain {
            low: 10.0,
            high: 1.0
        })
    );
    assert!(matches!(
        Scale::time((f64::NAN, 1.0), (0.0, 1.0)),
        Err(AtlasError::InvalidDomain { .. })
    ));
    assert!(matches!(
        Scale::linear((0.0, 1.0), (0.0, f64::INFINITY)),
        Err(AtlasError::InvalidRange { .. })
    ));
}

#[test]
fn nice_linear_domain_rounds_outward() {
    let scale = Scale::build(
        ScaleKind::Linear,
        (0.0, 1043.0),
        (0.0, 1.0),
        ScaleOptions::niced(),
    )
    .expect("valid scale");
    assert_eq!(scale.domain(), (0.0, 1100.0));
}

#[test]
fn nice_time_domain_snaps_to_weeks_for_a_season() {
    let scale = Scale::build(
        ScaleKind::Time,
        (utc(2019, 1, 15), utc(2019, 5, 2)),
        (0.0, 885.0),
        ScaleOptions::niced(),
    )
    .expect("valid scale");
    // Sundays around the extent.
    assert_eq!(scale.domain(), (utc(2019, 1, 13), utc(2019, 5, 5)));
}

#[test]
fn nice_time_domain_snaps_to_quarters_for_multi_year_spans() {
    let scale = Scale::build(
        ScaleKind::Time,
        (utc(2019, 2, 15), utc(2021, 9, 15)),
        (0.0, 885.0),
        ScaleOptions::niced(),
    )
    .expect("valid scale");
    // Quarter boundaries, not whole years.
    assert_eq!(scale.domain(), (utc(2019, 1, 1), utc(2021, 10, 1)));
}

#[test]
fn nice_time_domain_snaps_to_years_for_a_decade() {
    let scale = Scale::build(
        ScaleKind::Time,
        (utc(2010, 3, 10), utc(2019, 10, 5)),
        (0.0, 885.0),
        ScaleOptions::niced(),
    )
    .expect("valid scale");
    assert_eq!(scale.domain(), (utc(2010, 1, 1), utc(2020, 1, 1)));
}

#[test]
fn time_ticks_over_a_year_are_month_starts() {
    let scale = Scale::time((utc(2019, 1, 1), utc(2020, 1, 1)), (0.0, 885.0))
        .expect("valid scale");
    let ticks = scale.ticks(None);
    assert_eq!(ticks.len(), 13);
    assert_eq!(ticks.first().copied(), Some(utc(2019, 1, 1)));
    assert_eq!(ticks.get(1).copied(), Some(utc(2019, 2, 1)));
    assert_eq!(ticks.last().copied(), Some(utc(2020, 1, 1)));
}

#[test]
fn linear_ticks_use_round_steps() {
    let scale = Scale::linear((0.0, 20.0), (53.0, 0.0)).expect("valid scale");
    let ticks = scale.ticks(Some(5));
    assert_eq!(ticks, vec![0.0, 5.0, 10.0, 15.0, 20.0]);
}
