// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use eventmap_geometry::{MapBounds, Seat, ShapeBatch, ShapeKind, argb_to_color};
use eventmap_render_ref::RecordingBackend;
use eventmap_scene::{EventMap, SceneConfig, SeatId};
use kurbo::Rect;
use peniko::Color;

const SEAT: f64 = 10.0;
const GAP: f64 = 2.0;

/// Seats laid out in rows of 100, like a stadium block.
fn grid(n: usize) -> Vec<Seat> {
    (0..n)
        .map(|i| {
            let x = (i % 100) as f64 * (SEAT + GAP);
            let y = (i / 100) as f64 * (SEAT + GAP);
            Seat::rectangle(
                Rect::new(x, y, x + SEAT, y + SEAT),
                argb_to_color(0xFF20_60C0),
            )
        })
        .collect()
}

fn bounds_for(seats: &[Seat]) -> MapBounds {
    MapBounds::infer(seats.iter().map(Seat::bounds)).unwrap()
}

fn prepared_map(n: usize) -> (EventMap, Vec<SeatId>, RecordingBackend) {
    let (mut map, ids) = EventMap::with_inferred_bounds(grid(n), SceneConfig::default()).unwrap();
    let mut backend = RecordingBackend::with_max_texture_size(2048);
    map.prepare(&mut backend);
    (map, ids, backend)
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch/pack");
    for n in [100_usize, 1_000, 10_000, 50_000] {
        let seats = grid(n);
        let bounds = bounds_for(&seats);
        let items: Vec<(Rect, Color)> = seats.iter().map(|s| (s.bounds(), s.color())).collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &items, |b, items| {
            b.iter(|| {
                let batch =
                    ShapeBatch::pack(ShapeKind::Rectangle, &bounds, false, items.iter().copied());
                black_box(batch);
            });
        });
    }
    group.finish();
}

fn bench_colour_patch_vs_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch/update");
    for n in [1_000_usize, 10_000, 50_000] {
        group.bench_function(BenchmarkId::new("patch_one", n), |b| {
            b.iter_batched(
                || prepared_map(n),
                |(mut map, ids, mut backend)| {
                    map.set_color(ids[n / 2], Color::WHITE).unwrap();
                    map.prepare(&mut backend);
                    black_box(map);
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(BenchmarkId::new("rebuild", n), |b| {
            b.iter_batched(
                || prepared_map(n),
                |(mut map, ids, mut backend)| {
                    map.add_again(ids[n / 2]).unwrap();
                    map.prepare(&mut backend);
                    black_box(map);
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pack, bench_colour_patch_vs_rebuild);
criterion_main!(benches);
