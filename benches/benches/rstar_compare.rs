// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use strata_quadtree::{Boundary, Quadtree, QuadtreeConfig, SpatialEntity};

use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

#[derive(Copy, Clone, Debug)]
struct Cell {
    id: u32,
    bounds: Boundary,
}

impl SpatialEntity for Cell {
    type Id = u32;

    fn id(&self) -> u32 {
        self.id
    }

    fn bounds(&self) -> Boundary {
        self.bounds
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

fn to_rstar(cells: &[Cell]) -> Vec<GeomWithData<Rectangle<[f64; 2]>, u32>> {
    cells
        .iter()
        .map(|c| {
            let b = c.bounds;
            GeomWithData::new(
                Rectangle::from_corners([b.xmin, b.ymin], [b.xmax, b.ymax]),
                c.id,
            )
        })
        .collect()
}

fn bench_rstar_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rstar_compare");
    for &n in &[64usize, 128] {
        let cells = gen_grid_cells(n, 10.0);
        let extent = n as f64 * 10.0;
        let window = Boundary::from_xywh(100.0, 100.0, 400.0, 400.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("strata_build_query_n{n}"), |b| {
            b.iter(|| {
                let mut tree =
                    Quadtree::new(0.0, 0.0, extent, extent, QuadtreeConfig::default()).unwrap();
                for c in &cells {
                    let _ = tree.add_object(*c).unwrap();
                }
                let hits = tree
                    .get_in_region(window.xmin, window.ymin, window.xmax, window.ymax)
                    .unwrap()
                    .len();
                black_box(hits)
            })
        });

        group.bench_function(format!("rstar_build_query_bulk_n{n}"), |b| {
            b.iter_batched(
                || to_rstar(&cells),
                |items| {
                    let tree = RTree::bulk_load(items);
                    let aabb = AABB::from_corners(
                        [window.xmin, window.ymin],
                        [window.xmax, window.ymax],
                    );
                    black_box(tree.locate_in_envelope_intersecting(&aabb).count())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rstar_compare);
criterion_main!(benches);
