// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strata Layer: a Kurbo-native CAD drawing layer backed by `strata_quadtree`.
//!
//! A [`Layer`] owns the entities of one drawing layer and keeps them in a
//! [`Quadtree`](strata_quadtree::Quadtree) so the editor's interactive
//! queries stay fast as the drawing grows.
//!
//! - Geometry: points, lines, arcs, circles, text and linear dimensions, see [`Geometry`].
//! - Picking with a tolerance, nearest entity first ([`Layer::pick`]).
//! - Window and crossing marquee selection ([`Layer::select`]).
//! - Redraw culling against a viewport ([`Layer::visible`]).
//! - Object snap to endpoints, midpoints, centres, nodes and insertion points ([`Layer::snap`]).
//! - Two-phase bulk load that grows the extents before indexing ([`Layer::stage`],
//!   [`Layer::commit_staged`]).
//! - Coarse repaint damage ([`Layer::take_damage`]).
//!
//! Visibility, selectability and snapping are per-entity [`EntityFlags`].
//!
//! ## Example
//!
//! ```
//! use kurbo::{Line, Point, Rect};
//! use strata_layer::{EntityFlags, Geometry, Layer, SelectMode, SnapKind};
//!
//! let mut layer = Layer::with_extents(Rect::new(0.0, 0.0, 1000.0, 1000.0)).unwrap();
//! let wall = layer
//!     .add(Geometry::Line(Line::new((100.0, 100.0), (400.0, 100.0))), EntityFlags::default())
//!     .unwrap();
//!
//! // Click near the wall.
//! assert_eq!(layer.pick(Point::new(250.0, 102.0)), Some(wall));
//!
//! // Snap to its midpoint.
//! let snap = layer.snap(Point::new(252.0, 101.0)).unwrap().unwrap();
//! assert_eq!(snap.kind, SnapKind::Midpoint);
//!
//! // Window selection needs the whole wall inside the marquee.
//! let hits = layer.select(Rect::new(0.0, 0.0, 300.0, 300.0), SelectMode::Window).unwrap();
//! assert!(hits.is_empty());
//! let hits = layer.select(Rect::new(0.0, 0.0, 300.0, 300.0), SelectMode::Crossing).unwrap();
//! assert_eq!(hits, vec![wall]);
//!
//! // Everything added so far needs painting once.
//! assert!(layer.take_damage().union_rect().is_some());
//! ```

mod config;
mod error;
mod geometry;
mod layer;
mod types;

pub use config::LayerConfig;
pub use error::{LayerError, LayerResult};
pub use geometry::{Entity, Geometry};
pub use layer::Layer;
pub use types::{Damage, EntityFlags, EntityId, SelectMode, SnapKind, SnapPoint};
