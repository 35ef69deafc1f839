// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer basics.
//!
//! Draw a few entities, then pick, snap, and marquee-select them.
//!
//! Run:
//! - `cargo run -p strata_demos --example layer_basics`

use core::f64::consts::PI;

use kurbo::{Circle, Line, Point, Rect};
use strata_layer::{EntityFlags, Geometry, Layer, SelectMode, SnapKind};

fn main() {
    let mut layer = Layer::with_extents(Rect::new(0.0, 0.0, 500.0, 500.0)).unwrap();

    let wall = layer
        .add(
            Geometry::Line(Line::new((50.0, 50.0), (350.0, 50.0))),
            EntityFlags::default(),
        )
        .unwrap();
    let column = layer
        .add(
            Geometry::Circle(Circle::new((200.0, 200.0), 15.0)),
            EntityFlags::default(),
        )
        .unwrap();
    let door = layer
        .add(
            Geometry::arc(Point::new(350.0, 50.0), 40.0, PI / 2.0, PI / 2.0),
            EntityFlags::default(),
        )
        .unwrap();
    let _label = layer
        .add(
            Geometry::Text {
                insertion: Point::new(60.0, 60.0),
                height: 8.0,
                content: "LIVING".to_owned(),
            },
            EntityFlags::VISIBLE,
        )
        .unwrap();

    // Click just above the wall.
    let hit = layer.pick(Point::new(120.0, 52.0));
    println!("pick near wall: {hit:?}");
    assert_eq!(hit, Some(wall));

    // Snap to the column centre.
    let snap = layer.snap(Point::new(203.0, 198.0)).unwrap().unwrap();
    println!("snap: {snap:?}");
    assert_eq!((snap.entity, snap.kind), (column, SnapKind::Center));

    // Crossing selection catches the door swing and the wall end; window only the door.
    let marquee = Rect::new(300.0, 30.0, 400.0, 120.0);
    let window = layer.select(marquee, SelectMode::Window).unwrap();
    let crossing = layer.select(marquee, SelectMode::Crossing).unwrap();
    println!("window: {window:?}");
    println!("crossing: {crossing:?}");
    assert!(!window.contains(&wall));
    assert!(crossing.contains(&wall) && crossing.contains(&door));

    let damage = layer.take_damage();
    println!("repaint: {:?}", damage.union_rect());
}
