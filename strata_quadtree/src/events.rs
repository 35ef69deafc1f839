// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node lifecycle notifications.
//!
//! Nodes publish four events. They are delivered synchronously, in-stack, at
//! the point where they fire; there is no queue. The owning
//! [`Quadtree`](crate::Quadtree) always listens first (it turns `full` into a
//! pending split), then every observer registered with
//! [`Quadtree::observe`](crate::Quadtree::observe), in registration order.
//!
//! An observer that returns `Err` aborts the operation and the error reaches
//! the original caller unchanged.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::QuadResult;
use crate::node::{NodeId, QuadNode};

/// Typed listener for node lifecycle events. Every method defaults to a no-op.
pub trait NodeEvents<E> {
    /// A leaf's population now passes its split policy.
    fn on_full(&mut self, node: &QuadNode<E>) -> QuadResult<()> {
        let _ = node;
        Ok(())
    }

    /// A leaf became internal with the given children (NE, NW, SW, SE).
    fn on_subdivided(&mut self, node: &QuadNode<E>, children: [NodeId; 4]) -> QuadResult<()> {
        let _ = (node, children);
        Ok(())
    }

    /// `child` was attached to `parent`, or detached when `parent` is `None`.
    fn on_reparented(&mut self, child: NodeId, parent: Option<NodeId>) -> QuadResult<()> {
        let _ = (child, parent);
        Ok(())
    }

    /// A node's threshold changed from `old` to `new`.
    fn on_adjusted(&mut self, node: &QuadNode<E>, old: usize, new: usize) -> QuadResult<()> {
        let _ = (node, old, new);
        Ok(())
    }
}

/// Listener that ignores everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct Silent;

impl<E> NodeEvents<E> for Silent {}

/// A recorded node event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeEvent {
    /// See [`NodeEvents::on_full`].
    Full(NodeId),
    /// See [`NodeEvents::on_subdivided`].
    Subdivided(NodeId, [NodeId; 4]),
    /// See [`NodeEvents::on_reparented`].
    Reparented(NodeId, Option<NodeId>),
    /// See [`NodeEvents::on_adjusted`].
    Adjusted {
        /// Node whose threshold changed.
        node: NodeId,
        /// Previous threshold.
        old: usize,
        /// New threshold.
        new: usize,
    },
}

/// Diagnostic observer that appends every event to a shared log.
///
/// Clone it before handing it to the tree to keep a reading handle:
///
/// ```
/// use strata_quadtree::{EventLog, PointEntity, Quadtree, QuadtreeConfig};
///
/// let mut tree = Quadtree::new(0.0, 0.0, 100.0, 100.0, QuadtreeConfig::with_threshold(1)).unwrap();
/// let log = EventLog::default();
/// tree.observe(Box::new(log.clone()));
/// tree.add_object(PointEntity::new(1, 10.0, 10.0)).unwrap();
/// tree.add_object(PointEntity::new(2, 90.0, 90.0)).unwrap();
/// assert!(log.subdivisions() >= 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<NodeEvent>>>,
}

impl EventLog {
    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<NodeEvent> {
        self.events.borrow().clone()
    }

    /// Number of `subdivided` events recorded.
    pub fn subdivisions(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|e| matches!(e, NodeEvent::Subdivided(..)))
            .count()
    }

    /// Forget recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn push(&self, e: NodeEvent) {
        self.events.borrow_mut().push(e);
    }
}

impl<E> NodeEvents<E> for EventLog {
    fn on_full(&mut self, node: &QuadNode<E>) -> QuadResult<()> {
        self.push(NodeEvent::Full(node.id()));
        Ok(())
    }

    fn on_subdivided(&mut self, node: &QuadNode<E>, children: [NodeId; 4]) -> QuadResult<()> {
        self.push(NodeEvent::Subdivided(node.id(), children));
        Ok(())
    }

    fn on_reparented(&mut self, child: NodeId, parent: Option<NodeId>) -> QuadResult<()> {
        self.push(NodeEvent::Reparented(child, parent));
        Ok(())
    }

    fn on_adjusted(&mut self, node: &QuadNode<E>, old: usize, new: usize) -> QuadResult<()> {
        self.push(NodeEvent::Adjusted {
            node: node.id(),
            old,
            new,
        });
        Ok(())
    }
}

/// Observer that reports structural changes through `tracing` at debug level.
#[derive(Copy, Clone, Debug, Default)]
pub struct TraceEvents;

impl<E> NodeEvents<E> for TraceEvents {
    fn on_full(&mut self, node: &QuadNode<E>) -> QuadResult<()> {
        tracing::debug!(node = ?node.id(), population = node.len(), "node full");
        Ok(())
    }

    fn on_subdivided(&mut self, node: &QuadNode<E>, children: [NodeId; 4]) -> QuadResult<()> {
        tracing::debug!(node = ?node.id(), depth = node.depth(), ?children, "node subdivided");
        Ok(())
    }

    fn on_reparented(&mut self, child: NodeId, parent: Option<NodeId>) -> QuadResult<()> {
        tracing::trace!(?child, ?parent, "node reparented");
        Ok(())
    }

    fn on_adjusted(&mut self, node: &QuadNode<E>, old: usize, new: usize) -> QuadResult<()> {
        tracing::debug!(node = ?node.id(), old, new, "threshold adjusted");
        Ok(())
    }
}
