use brushmap::api::{AtlasConfig, DerivedValue, SessionFrame, ViewSession};
use brushmap::core::{Dataset, GeoPoint, Record, Viewport, datetime_to_unix_seconds};
use brushmap::geo::GeographyModel;
use brushmap::interaction::{BrushEvent, PixelExtent, Selection};
use brushmap::render::NullRenderer;
use brushmap::source::{CsvText, StaticDataset, TopologyText};
use brushmap::AtlasError;
use chrono::{NaiveDate, Utc};
use futures::executor::block_on;

const MINI_WORLD: &str = include_str!("fixtures/mini_world.topo.json");
const EVENTS: &str = include_str!("fixtures/events.csv");

fn utc(year: i32, month: u32, day: u32) -> f64 {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date");
    datetime_to_unix_seconds(date.and_utc().with_timezone(&Utc))
}

fn loaded_session() -> ViewSession {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let topology = TopologyText::new("mini world", MINI_WORLD);
    let dataset = CsvText::new("events", EVENTS);
    block_on(session.load(&topology, &dataset));
    session
}

/// Pixel span over February 2019 on the default 885 px plot.
fn february_brush(session: &ViewSession) -> PixelExtent {
    let x_scale = session.histogram_x_scale().expect("histogram ready");
    PixelExtent::new(
        x_scale.map(utc(2019, 2, 1)),
        x_scale.map(utc(2019, 3, 1)),
    )
}

#[test]
fn session_reports_loading_until_polled() {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let topology = TopologyText::new("mini world", MINI_WORLD);
    let dataset = CsvText::new("events", EVENTS);

    let load = session.load(&topology, &dataset);
    assert!(session.is_loading());
    assert_eq!(session.frame(), SessionFrame::Loading);
    assert_eq!(session.histogram_x_scale(), None);

    block_on(load);
    assert!(!session.is_loading());
    assert!(session.frame().ready().is_some());
}

#[test]
fn one_resolved_input_is_still_loading() {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let resolver = session.resolver();

    assert!(resolver.resolve_dataset(Ok(Dataset::new(vec![Record::new(
        utc(2019, 1, 1),
        1.0,
        GeoPoint::new(0.0, 0.0),
    )]))));
    assert_eq!(session.frame(), SessionFrame::Loading);
    assert!(!session.dispatch_brush(BrushEvent::DragEnd(Some(PixelExtent::new(0.0, 10.0)))));
}

#[test]
fn ready_frame_shows_every_record_and_monthly_bars() {
    let session = loaded_session();
    let frame = session.frame();
    let frame = frame.ready().expect("ready frame");

    assert_eq!(frame.viewport, Viewport::new(960, 500));
    assert_eq!(frame.map.bubbles.len(), 6);
    // sphere, graticule, one land polygon, interiors
    assert_eq!(frame.map.backdrop.len(), 4);
    assert_eq!(frame.histogram.bars.len(), 5);
    assert_eq!(frame.histogram.brush, None);

    let titles: Vec<Option<&str>> = frame
        .histogram
        .bars
        .iter()
        .map(|bar| bar.title.as_deref())
        .collect();
    assert_eq!(
        titles,
        vec![Some("10"), Some("12"), Some("5"), Some("0"), Some("20")]
    );

    let largest = frame
        .map
        .bubbles
        .iter()
        .map(|bubble| bubble.radius)
        .fold(0.0, f64::max);
    assert!((largest - 15.0).abs() <= 1e-9);
}

#[test]
fn histogram_domain_is_niced_to_weeks() {
    let session = loaded_session();
    let x_scale = session.histogram_x_scale().expect("histogram ready");

    assert_eq!(x_scale.domain(), (utc(2019, 1, 13), utc(2019, 5, 5)));
    assert_eq!(x_scale.range(), (0.0, 885.0));
}

#[test]
fn brushing_filters_the_map_but_not_the_histogram() {
    let session = loaded_session();
    let before = session.snapshot().expect("snapshot");
    let brush = february_brush(&session);

    assert!(session.dispatch_brush(BrushEvent::DragEnd(Some(brush))));

    let (low, high) = session.selection().bounds().expect("active selection");
    assert!((low - utc(2019, 2, 1)).abs() <= 1e-3);
    assert!((high - utc(2019, 3, 1)).abs() <= 1e-3);

    let filtered = session.filtered_dataset().expect("filtered records");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].measure, 12.0);

    let after = session.snapshot().expect("snapshot");
    assert_eq!(after.record_count, 6);
    assert_eq!(after.filtered_count, 1);
    assert_eq!(after.bins, before.bins);
    assert_eq!(after.time_domain, before.time_domain);

    let frame = session.frame();
    let frame = frame.ready().expect("ready frame");
    assert_eq!(frame.map.bubbles.len(), 1);
    assert_eq!(frame.histogram.bars.len(), 5);
    assert!(frame.histogram.brush.is_some());
}

#[test]
fn clearing_the_brush_restores_every_record() {
    let session = loaded_session();
    let brush = february_brush(&session);
    session.dispatch_brush(BrushEvent::DragEnd(Some(brush)));

    assert!(session.dispatch_brush(BrushEvent::DragEnd(None)));
    assert_eq!(session.selection(), Selection::Unselected);
    assert_eq!(session.filtered_dataset().map(|dataset| dataset.len()), Some(6));
    assert_eq!(session.selection_revision(), 2);
}

#[test]
fn selection_change_recomputes_only_the_filtered_records() {
    let session = loaded_session();
    let _ = session.frame();
    for value in DerivedValue::ALL {
        assert_eq!(session.recomputation_count(value), 1, "{value:?}");
    }

    let brush = february_brush(&session);
    session.dispatch_brush(BrushEvent::DragUpdate(Some(brush)));
    let _ = session.frame();

    assert_eq!(session.recomputation_count(DerivedValue::FilteredRecords), 2);
    for value in [
        DerivedValue::SizeScale,
        DerivedValue::HistogramXScale,
        DerivedValue::Bins,
        DerivedValue::HistogramYScale,
        DerivedValue::Backdrop,
    ] {
        assert_eq!(session.recomputation_count(value), 1, "{value:?}");
    }

    // A repeated identical selection is not a change.
    session.dispatch_brush(BrushEvent::DragEnd(Some(brush)));
    let _ = session.frame();
    assert_eq!(session.recomputation_count(DerivedValue::FilteredRecords), 2);
}

#[test]
fn narrowing_then_clearing_restores_the_initial_frame() {
    let session = loaded_session();
    let initial_records = session.filtered_dataset().expect("filtered records");
    let initial_frame = session.frame();
    let x_scale = session.histogram_x_scale().expect("histogram ready");
    let span = |from: f64, to: f64| PixelExtent::new(x_scale.map(from), x_scale.map(to));

    assert!(session.dispatch_brush(BrushEvent::DragEnd(Some(span(
        utc(2019, 1, 17),
        utc(2019, 3, 1)
    )))));
    assert_eq!(session.filtered_dataset().map(|dataset| dataset.len()), Some(2));
    assert!(session.dispatch_brush(BrushEvent::DragEnd(Some(span(
        utc(2019, 1, 17),
        utc(2019, 2, 5)
    )))));
    assert_eq!(session.filtered_dataset().map(|dataset| dataset.len()), Some(1));
    assert!(session.dispatch_brush(BrushEvent::DragEnd(None)));

    assert_eq!(session.selection(), Selection::Unselected);
    assert_eq!(session.filtered_dataset(), Some(initial_records));
    assert_eq!(session.frame(), initial_frame);
}

#[test]
fn single_record_dataset_centers_on_the_histogram() {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let topology = TopologyText::new("mini world", MINI_WORLD);
    let dataset = StaticDataset::new(
        "one event",
        Dataset::new(vec![Record::new(
            utc(2019, 2, 20),
            4.0,
            GeoPoint::new(12.1, 33.0),
        )]),
    );
    block_on(session.load(&topology, &dataset));

    let x_scale = session.histogram_x_scale().expect("histogram ready");
    assert_eq!(x_scale.map(utc(2019, 2, 20)), 442.5);

    let frame = session.frame();
    let frame = frame.ready().expect("ready frame");
    assert_eq!(frame.map.bubbles.len(), 1);
    assert!((frame.map.bubbles[0].radius - 15.0).abs() <= 1e-9);
    assert_eq!(frame.histogram.bars.len(), 1);
    assert_eq!(frame.histogram.bars[0].title.as_deref(), Some("4"));
    assert!(frame.histogram.bars.iter().all(|bar| bar.x.is_finite()));
}

#[test]
fn empty_drag_update_does_not_flicker_the_map() {
    let session = loaded_session();
    let brush = february_brush(&session);
    session.dispatch_brush(BrushEvent::DragUpdate(Some(brush)));

    assert!(!session.dispatch_brush(BrushEvent::DragUpdate(None)));
    assert!(session.selection().is_active());
    assert_eq!(session.filtered_dataset().map(|dataset| dataset.len()), Some(1));
}

#[test]
fn failed_source_is_reported_instead_of_loading() {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let topology = TopologyText::new("broken world", "{ not json");
    let dataset = CsvText::new("events", EVENTS);
    block_on(session.load(&topology, &dataset));

    let SessionFrame::Failed(errors) = session.frame() else {
        panic!("expected a failed frame");
    };
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        AtlasError::InvalidTopology(_) | AtlasError::SourceFetch { .. }
    ));
    assert!(session.dataset().is_some());
    assert!(session.geography().is_none());

    let mut renderer = NullRenderer::default();
    assert!(!session.render(&mut renderer).expect("render"));
    assert_eq!(renderer.frames_rendered, 0);
}

#[test]
fn failure_wins_over_a_pending_input() {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let resolver = session.resolver();
    resolver.resolve_geography(Err(AtlasError::InvalidTopology("bad".to_owned())));

    assert!(session.is_loading());
    assert!(matches!(session.frame(), SessionFrame::Failed(_)));
}

#[test]
fn dataset_without_dates_has_no_data() {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let topology = TopologyText::new("mini world", MINI_WORLD);
    let dataset = StaticDataset::new(
        "undated",
        Dataset::new(vec![Record::new(f64::NAN, 3.0, GeoPoint::new(1.0, 1.0))]),
    );
    block_on(session.load(&topology, &dataset));

    assert_eq!(session.frame(), SessionFrame::NoData);
    assert_eq!(session.snapshot(), None);
}

#[test]
fn results_after_drop_are_discarded() {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let resolver = session.resolver();
    let topology = TopologyText::new("mini world", MINI_WORLD);
    let dataset = CsvText::new("events", EVENTS);

    let load = session.load(&topology, &dataset);
    drop(session);
    assert!(resolver.is_detached());

    block_on(load);
    assert!(!resolver.resolve_geography(Ok(GeographyModel::default())));
}

#[test]
fn resize_drops_the_visible_brush_but_keeps_the_selection() {
    let session = loaded_session();
    let brush = february_brush(&session);
    session.dispatch_brush(BrushEvent::DragEnd(Some(brush)));
    let _ = session.frame();

    session.resize(Viewport::new(480, 400)).expect("resize");

    assert_eq!(session.brush().extent(), None);
    assert!(session.selection().is_active());
    let frame = session.frame();
    let frame = frame.ready().expect("ready frame");
    assert_eq!(frame.viewport, Viewport::new(480, 400));
    assert_eq!(frame.histogram.brush, None);
    assert_eq!(frame.map.bubbles.len(), 1);
    assert_eq!(session.recomputation_count(DerivedValue::Backdrop), 2);
    assert_eq!(session.recomputation_count(DerivedValue::Bins), 2);
    assert_eq!(session.recomputation_count(DerivedValue::SizeScale), 1);

    assert!(session.resize(Viewport::new(0, 400)).is_err());
}

#[test]
fn null_renderer_receives_ready_frames() {
    let session = loaded_session();
    let mut renderer = NullRenderer::default();

    assert!(session.render(&mut renderer).expect("render"));
    assert_eq!(renderer.frames_rendered, 1);
    assert_eq!(renderer.last_bubble_count, 6);
    assert_eq!(renderer.last_bar_count, 5);
}

#[test]
fn snapshot_serializes_to_json() {
    let session = loaded_session();
    let snapshot = session.snapshot().expect("snapshot");
    let json = snapshot.to_json_pretty().expect("json");

    assert!(json.contains("\"record_count\": 6"));
    assert!(json.contains("\"Unselected\""));
}
