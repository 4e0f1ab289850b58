use brushmap::api::{
    AtlasConfig, AtlasLayout, ViewSession, filtered_dataset, histogram_bins, histogram_x_scale,
};
use brushmap::core::{Dataset, GeoPoint, Record, Scale};
use brushmap::interaction::{BrushEvent, PixelExtent, Selection};
use brushmap::source::{StaticDataset, TopologyText};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const MINI_WORLD: &str = include_str!("../tests/fixtures/mini_world.topo.json");

// 2019-01-01T00:00:00Z
const YEAR_START: f64 = 1_546_300_800.0;
const DAY: f64 = 86_400.0;

fn generated_dataset(len: usize) -> Dataset {
    (0..len)
        .map(|i| {
            let t = YEAR_START + (i % 365) as f64 * DAY + (i % 24) as f64 * 3_600.0;
            let measure = (i % 17) as f64;
            let location = GeoPoint::new((i % 360) as f64 - 180.0, (i % 140) as f64 - 70.0);
            Record::new(t, measure, location)
        })
        .collect::<Vec<_>>()
        .into()
}

fn bench_monthly_binning_50k(c: &mut Criterion) {
    let dataset = generated_dataset(50_000);
    let layout = AtlasLayout::from_config(&AtlasConfig::default()).expect("layout");
    let x_scale = histogram_x_scale(&dataset, layout).expect("x scale");

    c.bench_function("monthly_binning_50k", |b| {
        b.iter(|| {
            let _ = histogram_bins(black_box(&dataset), black_box(x_scale)).expect("bins");
        })
    });
}

fn bench_selection_filter_50k(c: &mut Criterion) {
    let dataset = generated_dataset(50_000);
    let selection = Selection::between(YEAR_START + 60.0 * DAY, YEAR_START + 200.0 * DAY)
        .expect("selection");

    c.bench_function("selection_filter_50k", |b| {
        b.iter(|| {
            let _ = filtered_dataset(black_box(&dataset), black_box(selection));
        })
    });
}

fn bench_time_scale_round_trip(c: &mut Criterion) {
    let scale = Scale::time((YEAR_START, YEAR_START + 365.0 * DAY), (0.0, 885.0))
        .expect("valid scale");

    c.bench_function("time_scale_round_trip", |b| {
        b.iter(|| {
            let px = scale.map(black_box(YEAR_START + 123.4 * DAY));
            let _ = scale.invert(black_box(px));
        })
    });
}

fn bench_brush_drag_frame_50k(c: &mut Criterion) {
    let session = ViewSession::new(AtlasConfig::default()).expect("session");
    let topology = TopologyText::new("mini world", MINI_WORLD);
    let dataset = StaticDataset::new("generated", generated_dataset(50_000));
    futures::executor::block_on(session.load(&topology, &dataset));
    let _ = session.frame();

    let mut offset = 0.0;
    c.bench_function("brush_drag_frame_50k", |b| {
        b.iter(|| {
            offset = (offset + 7.0) % 600.0;
            session.dispatch_brush(BrushEvent::DragUpdate(Some(PixelExtent::new(
                offset,
                offset + 200.0,
            ))));
            let _ = black_box(session.frame());
        })
    });
}

criterion_group!(
    benches,
    bench_monthly_binning_50k,
    bench_selection_filter_50k,
    bench_time_scale_round_trip,
    bench_brush_drag_frame_50k
);
criterion_main!(benches);
