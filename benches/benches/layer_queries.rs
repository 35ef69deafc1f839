// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Circle, Line, Point, Rect};
use strata_layer::{EntityFlags, Geometry, Layer, SelectMode};

/// A floor-plan-like drawing: a grid of rooms, each with four walls and a column.
fn gen_plan(rooms: usize, size: f64) -> Vec<Geometry> {
    let mut out = Vec::with_capacity(rooms * rooms * 5);
    for j in 0..rooms {
        for i in 0..rooms {
            let (x, y) = (i as f64 * size, j as f64 * size);
            out.push(Geometry::Line(Line::new((x, y), (x + size, y))));
            out.push(Geometry::Line(Line::new((x + size, y), (x + size, y + size))));
            out.push(Geometry::Line(Line::new((x + size, y + size), (x, y + size))));
            out.push(Geometry::Line(Line::new((x, y + size), (x, y))));
            out.push(Geometry::Circle(Circle::new(
                (x + size / 2.0, y + size / 2.0),
                size / 10.0,
            )));
        }
    }
    out
}

fn build(plan: &[Geometry], extent: f64) -> Layer {
    let mut layer = Layer::with_extents(Rect::new(0.0, 0.0, extent, extent)).unwrap();
    for g in plan {
        let _ = layer.add(g.clone(), EntityFlags::default()).unwrap();
    }
    layer
}

fn bench_bulk_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("layer_bulk_load");
    let plan = gen_plan(32, 100.0);
    group.throughput(Throughput::Elements(plan.len() as u64));
    group.bench_function("add_each", |b| {
        b.iter(|| black_box(build(&plan, 3200.0).len()))
    });
    group.bench_function("stage_then_commit", |b| {
        b.iter_batched(
            || Layer::with_extents(Rect::new(0.0, 0.0, 1.0, 1.0)).unwrap(),
            |mut layer| {
                for g in &plan {
                    let _ = layer.stage(g.clone(), EntityFlags::default()).unwrap();
                }
                black_box(layer.commit_staged().unwrap())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_interactive(c: &mut Criterion) {
    let mut group = c.benchmark_group("layer_interactive");
    let plan = gen_plan(32, 100.0);
    let layer = build(&plan, 3200.0);
    let probes: Vec<Point> = (0..256)
        .map(|q| Point::new((q % 16) as f64 * 197.0 + 3.0, (q / 16) as f64 * 193.0 + 1.0))
        .collect();

    group.bench_function("pick", |b| {
        b.iter(|| black_box(probes.iter().filter_map(|p| layer.pick(*p)).count()))
    });
    group.bench_function("snap", |b| {
        b.iter(|| {
            black_box(
                probes
                    .iter()
                    .filter_map(|p| layer.snap(*p).unwrap())
                    .count(),
            )
        })
    });
    group.bench_function("crossing_select_400", |b| {
        b.iter(|| {
            let hits = layer
                .select(Rect::new(1000.0, 1000.0, 1400.0, 1400.0), SelectMode::Crossing)
                .unwrap();
            black_box(hits.len())
        })
    });
    group.bench_function("visible_viewport_800", |b| {
        b.iter(|| {
            let hits = layer.visible(Rect::new(600.0, 600.0, 1400.0, 1400.0)).unwrap();
            black_box(hits.len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_bulk_load, bench_interactive);
criterion_main!(benches);
