// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bulk import.
//!
//! Stage a drawing that does not fit the layer's starting extents, commit it
//! in one go, then cull against a viewport.
//!
//! Run:
//! - `cargo run -p strata_demos --example bulk_import`

use kurbo::{Circle, Line, Point, Rect};
use strata_layer::{EntityFlags, Geometry, Layer, LayerConfig};

const SETTINGS: &str = r#"
snap_tolerance = 4.0
pick_tolerance = 2.0

[quadtree]
threshold = 8
max_depth = 10
"#;

fn main() {
    tracing_subscriber::fmt::init();

    let config = LayerConfig::from_toml_str(SETTINGS).unwrap();
    let mut layer = Layer::new(Rect::new(0.0, 0.0, 100.0, 100.0), config).unwrap();

    // A 20x20 grid of rooms, far larger than the starting extents.
    for j in 0..20 {
        for i in 0..20 {
            let (x, y) = (f64::from(i) * 50.0, f64::from(j) * 50.0);
            layer
                .stage(
                    Geometry::Line(Line::new((x, y), (x + 50.0, y))),
                    EntityFlags::default(),
                )
                .unwrap();
            layer
                .stage(
                    Geometry::Line(Line::new((x, y), (x, y + 50.0))),
                    EntityFlags::default(),
                )
                .unwrap();
            layer
                .stage(
                    Geometry::Circle(Circle::new((x + 25.0, y + 25.0), 3.0)),
                    EntityFlags::default(),
                )
                .unwrap();
        }
    }
    println!("staged {} entities", layer.staged_len());
    assert!(layer.pick(Point::new(25.0, 0.5)).is_none());

    let committed = layer.commit_staged().unwrap();
    println!(
        "committed {committed}; extents now {:?}, {} index nodes",
        layer.extents(),
        layer.index().node_count()
    );
    assert_eq!(layer.staged_len(), 0);
    assert!(layer.extents().contains(Point::new(999.0, 999.0)));
    assert!(layer.pick(Point::new(25.0, 0.5)).is_some());

    // Only what falls inside the viewport needs painting.
    let viewport = Rect::new(200.0, 200.0, 300.0, 300.0);
    let visible = layer.visible(viewport).unwrap();
    println!("{} of {} entities visible in {viewport:?}", visible.len(), layer.len());
    assert!(visible.len() < layer.len());

    let damage = layer.take_damage();
    println!(
        "{} dirty rects, union {:?}",
        damage.dirty_rects.len(),
        damage.union_rect()
    );
}
