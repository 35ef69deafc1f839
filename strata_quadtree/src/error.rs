// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by every fallible quadtree operation.

use crate::node::NodeId;

/// Precondition violations reported by the quadtree.
///
/// None of these are transient; each one is a programmer error surfaced at the
/// call that would have broken an invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuadtreeError {
    /// A boundary with `max < min` on either axis (or NaN extents).
    #[error(
        "boundary extents must satisfy min <= max (xmin: {xmin}, ymin: {ymin}, xmax: {xmax}, ymax: {ymax})"
    )]
    InvalidBoundary {
        /// Offending minimum x.
        xmin: f64,
        /// Offending minimum y.
        ymin: f64,
        /// Offending maximum x.
        xmax: f64,
        /// Offending maximum y.
        ymax: f64,
    },
    /// Subdivision thresholds must be positive.
    #[error("threshold must be at least 1 (got {0})")]
    InvalidThreshold(usize),
    /// A node's boundary cannot change once it has a parent or children.
    #[error("boundary of {0:?} is fixed once the node is wired into the tree")]
    BoundaryLocked(NodeId),
    /// The identity is already registered or already staged.
    #[error("entity {id} is already registered")]
    AlreadyRegistered {
        /// Debug rendering of the identity.
        id: String,
    },
    /// The handle does not name a live node.
    #[error("{0:?} does not refer to a live node")]
    StaleNode(NodeId),
    /// Registry and leaves disagree; only reported by the explicit consistency check.
    #[error("registry holds {registered} entities but leaves hold {reachable}")]
    Inconsistent {
        /// Entities in the identity registry.
        registered: usize,
        /// Entities found by walking every leaf.
        reachable: usize,
    },
    /// An observer failed while handling a node event.
    #[error("observer failed on `{event}`: {message}")]
    Observer {
        /// Event name (`full`, `subdivided`, `reparented`, `adjusted`).
        event: &'static str,
        /// Observer-provided reason.
        message: String,
    },
    /// Configuration could not be parsed or is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type QuadResult<T> = Result<T, QuadtreeError>;
