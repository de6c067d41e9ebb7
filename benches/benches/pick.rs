// Copyright 2025 the Eventmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use eventmap_camera::{Camera, Projection};
use eventmap_geometry::{Seat, argb_to_color};
use eventmap_render_ref::RecordingBackend;
use eventmap_scene::{EventMap, FrameView, SceneConfig};
use kurbo::{Point, Rect, Size};

fn grid(n: usize) -> Vec<Seat> {
    (0..n)
        .map(|i| {
            let x = (i % 100) as f64 * 12.0;
            let y = (i / 100) as f64 * 12.0;
            Seat::rectangle(
                Rect::new(x, y, x + 10.0, y + 10.0),
                argb_to_color(0xFF20_60C0),
            )
        })
        .collect()
}

fn bench_find_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick/find_intersection");
    for n in [100_usize, 1_000, 10_000] {
        let (mut map, _) = EventMap::with_inferred_bounds(grid(n), SceneConfig::default()).unwrap();
        let mut backend = RecordingBackend::with_max_texture_size(2048);
        map.prepare(&mut backend);

        let bounds = *map.bounds();
        let projection = Projection::orthographic(Size::new(1080.0, 1920.0), &bounds).unwrap();
        let view = FrameView::new(&Camera::new(bounds), projection);
        // Centre of the last seat: the worst case for a first-hit scan.
        let last = map.seats().last().and_then(|id| map.seat(id)).unwrap();
        let world = bounds.to_world(last.bounds().center());
        let hit_pixel = view.world_to_screen(world).unwrap();
        let miss_pixel = Point::new(0.0, 0.0);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("hit_last", n), &hit_pixel, |b, p| {
            b.iter(|| black_box(map.find_intersection(*p, &view)));
        });
        group.bench_with_input(BenchmarkId::new("miss", n), &miss_pixel, |b, p| {
            b.iter(|| black_box(map.find_intersection(*p, &view)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_find_intersection);
criterion_main!(benches);
