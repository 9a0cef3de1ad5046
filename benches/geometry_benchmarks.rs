//! Performance benchmarks for CrabShot size negotiation and sensor geometry
//!
//! Run with: cargo bench
//!
//! Negotiation runs on every start and topology change, metering on every
//! tap, so both should stay well under a frame interval.

use crabshot::geometry::{crop_rect, jpeg_orientation, metering_rect};
use crabshot::sizes::SizeNegotiator;
use crabshot::types::{AspectRatio, Mode, Rect, Rotation, Size};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

const ACTIVE_ARRAY: Rect = Rect::new(0, 0, 4000, 3000);

/// A dense candidate list, similar to what high-end sensors report.
fn generate_sizes(count: u32) -> Vec<Size> {
    (1..=count)
        .flat_map(|i| {
            let w = 160 * i;
            [
                Size::new(w, w * 3 / 4),
                Size::new(w, w * 9 / 16),
                Size::new(w, w),
            ]
        })
        .collect()
}

fn bench_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Size Negotiation");
    group.measurement_time(Duration::from_secs(5));

    for count in [4u32, 16, 32] {
        let sizes = generate_sizes(count);
        let negotiator = SizeNegotiator::new(&sizes, &sizes, &sizes, 2160);

        group.bench_with_input(BenchmarkId::new("negotiate", count * 3), &negotiator, |b, n| {
            b.iter(|| {
                n.negotiate(black_box(AspectRatio::of(16, 9)), black_box(Mode::Video), None)
                    .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("build", count * 3), &sizes, |b, sizes| {
            b.iter(|| SizeNegotiator::new(black_box(sizes), sizes, sizes, 2160))
        });
    }

    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sensor Geometry");

    group.bench_function("crop_rect", |b| {
        b.iter(|| crop_rect(black_box(ACTIVE_ARRAY), black_box(3.7)))
    });

    for rotation in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg270] {
        let orientation = jpeg_orientation(90, rotation);
        group.bench_function(BenchmarkId::new("metering_rect", orientation), |b| {
            b.iter(|| {
                metering_rect(
                    black_box(ACTIVE_ARRAY),
                    orientation,
                    1080,
                    1440,
                    black_box(312.0),
                    black_box(977.0),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_negotiation, bench_geometry);
criterion_main!(benches);
