// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use strata_quadtree::{Boundary, Quadtree, QuadtreeConfig, SpatialEntity};

#[derive(Copy, Clone, Debug)]
struct Cell {
    id: u32,
    bounds: Boundary,
}

impl SpatialEntity for Cell {
    type Id = u32;
    const SUPPORTS_VALUE_EQ: bool = true;

    fn id(&self) -> u32 {
        self.id
    }

    fn bounds(&self) -> Boundary {
        self.bounds
    }

    fn value_eq(&self, other: &Self) -> bool {
        self.bounds == other.bounds
    }
}

fn gen_grid_cells(n: usize, cell: f64) -> Vec<Cell> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            out.push(Cell {
                id: out.len() as u32,
                bounds: Boundary::from_xywh(x as f64 * cell, y as f64 * cell, cell, cell),
            });
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_clustered_cells(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Cell> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push(Cell {
                id: out.len() as u32,
                bounds: Boundary::from_xywh(cx + dx, cy + dy, 4.0, 4.0),
            });
        }
    }
    out
}

fn build(cells: &[Cell], extent: f64, threshold: usize) -> Quadtree<Cell> {
    let mut tree = Quadtree::new(
        0.0,
        0.0,
        extent,
        extent,
        QuadtreeConfig::with_threshold(threshold),
    )
    .unwrap();
    for c in cells {
        let _ = tree.add_object(*c).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_insert");
    for &n in &[32usize, 64, 128] {
        let cells = gen_grid_cells(n, 10.0);
        let extent = n as f64 * 10.0;
        group.throughput(Throughput::Elements((n * n) as u64));
        for &threshold in &[4usize, 16] {
            group.bench_function(format!("grid_n{n}_t{threshold}"), |b| {
                b.iter(|| black_box(build(&cells, extent, threshold).node_count()))
            });
        }
    }
    let cells = gen_clustered_cells(16, 256, 128.0);
    group.bench_function("clustered_16x256", |b| {
        b.iter(|| black_box(build(&cells, 2200.0, 8).node_count()))
    });

    // Coincident entities exercise the distinct-value scan without ever splitting.
    let stack: Vec<Cell> = (0..512)
        .map(|id| Cell {
            id,
            bounds: Boundary::from_xywh(50.0, 50.0, 1.0, 1.0),
        })
        .collect();
    group.bench_function("coincident_512", |b| {
        b.iter(|| black_box(build(&stack, 100.0, 8).node_count()))
    });
    group.finish();
}

fn bench_region_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_region");
    let cells = gen_grid_cells(128, 8.0);
    let tree = build(&cells, 1024.0, 8);
    group.bench_function("many_windows", |b| {
        b.iter(|| {
            let mut total = 0usize;
            for q in 0..256 {
                let x = (q % 64) as f64 * 8.0;
                let y = (q / 64) as f64 * 8.0;
                total += tree.get_in_region(x, y, x + 64.0, y + 64.0).unwrap().len();
            }
            black_box(total)
        })
    });
    group.finish();
}

fn bench_closest(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_closest");
    let cells = gen_clustered_cells(16, 256, 128.0);
    let tree = build(&cells, 2200.0, 8);
    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    let probes: Vec<(f64, f64)> = (0..256)
        .map(|_| (rng.next_f64() * 2000.0, rng.next_f64() * 2000.0))
        .collect();
    group.bench_function("random_probes_tol16", |b| {
        b.iter(|| {
            let found = probes
                .iter()
                .filter(|(x, y)| tree.get_closest(*x, *y, 16.0).is_some())
                .count();
            black_box(found)
        })
    });
    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quadtree_resize");
    let cells = gen_grid_cells(64, 10.0);
    group.bench_function("grow_rebuild_n64", |b| {
        b.iter_batched(
            || build(&cells, 640.0, 8),
            |mut tree| {
                tree.resize(-640.0, -640.0, 1280.0, 1280.0).unwrap();
                black_box(tree.node_count())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_region_query,
    bench_closest,
    bench_resize,
);
criterion_main!(benches);
