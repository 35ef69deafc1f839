// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Strata Quadtree: an adaptive region quadtree for CAD drawing layers.
//!
//! The tree answers "what is near here" for the entities of one drawing layer:
//! marquee selection, redraw culling, pick and snap.
//!
//! - Entities are registered by identity, so value-identical entities coexist.
//! - Leaves subdivide into four equal quadrants (NE, NW, SW, SE, y up) once
//!   their population exceeds a threshold. Subdivision is deferred until the
//!   triggering insert has finished and never recurses into itself.
//! - With value deduplication on, a leaf full of coincident entities is left
//!   alone instead of splitting forever.
//! - Sparse children can be merged back with [`Quadtree::purge_subnodes`], and
//!   [`Quadtree::resize`] rebuilds the tree for new drawing extents.
//! - Structural changes are published to [`NodeEvents`] observers.
//!
//! The tree stores entity *handles*: anything implementing [`SpatialEntity`],
//! typically `&T` or `Rc<T>`. It never owns the drawing objects themselves.
//!
//! # Example
//!
//! ```rust
//! use strata_quadtree::{PointEntity, Quadtree, QuadtreeConfig};
//!
//! let mut tree = Quadtree::new(0.0, 0.0, 100.0, 100.0, QuadtreeConfig::with_threshold(4)).unwrap();
//! for i in 0..10 {
//!     let v = i as f64 * 9.0 + 1.0;
//!     tree.add_object(PointEntity::new(i, v, v)).unwrap();
//! }
//! assert!(tree.root().has_subnodes());
//!
//! // Coarse candidates for a marquee.
//! let hits = tree.get_in_region(0.0, 0.0, 20.0, 20.0).unwrap();
//! assert!(hits.iter().any(|p| p.id == 1));
//!
//! // Pick.
//! let nearest = tree.get_closest(29.0, 29.5, 2.0).unwrap();
//! assert_eq!(nearest.id, 3);
//! ```
//!
//! ## Placement and queries
//!
//! An entity lives in exactly one leaf: the one whose quadrant receives its
//! [anchor](SpatialEntity::anchor). Every node also keeps a conservative
//! [reach](QuadNode::reach) covering the bounds of everything placed below it,
//! and queries descend by reach. Region queries therefore return a superset
//! of the entities whose bounds touch the region; callers refine with their
//! own geometry.
//!
//! ### Float semantics
//!
//! Boundaries with NaN or inverted coordinates are rejected with
//! [`QuadtreeError::InvalidBoundary`].

mod config;
mod entity;
mod error;
mod events;
mod node;
mod policy;
mod tree;
mod types;

pub use config::QuadtreeConfig;
pub use entity::{PointEntity, SpatialEntity};
pub use error::{QuadResult, QuadtreeError};
pub use events::{EventLog, NodeEvent, NodeEvents, Silent, TraceEvents};
pub use node::{Leaves, NodeId, QuadNode};
pub use policy::SplitPolicy;
pub use tree::{Quadtree, SplitState};
pub use types::{Boundary, Quadrant};
