// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadrant nodes and the arena that owns them.
//!
//! Nodes live in slots of a [`NodeArena`] owned by the tree and refer to each
//! other by [`NodeId`]. A node's `parent` is a plain handle, so there are no
//! ownership cycles and tearing the whole tree down is an arena clear.

use crate::entity::SpatialEntity;
use crate::error::{QuadResult, QuadtreeError};
use crate::events::NodeEvents;
use crate::policy::SplitPolicy;
use crate::types::{Boundary, Quadrant};

/// Generational handle to a node.
///
/// A slot freed by a merge or rebuild may be reused; its generation is bumped
/// so stale handles never alias the new node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Node slots are 32-bit; a tree never approaches 2^32 nodes."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// One quadrant: a leaf holding entities, or an internal node with four children.
#[derive(Clone, Debug)]
pub struct QuadNode<E> {
    id: NodeId,
    boundary: Boundary,
    reach: Boundary,
    parent: Option<NodeId>,
    children: Option<[NodeId; 4]>,
    objects: Vec<E>,
    threshold: usize,
    depth: usize,
}

impl<E> QuadNode<E> {
    fn new(
        id: NodeId,
        boundary: Boundary,
        parent: Option<NodeId>,
        threshold: usize,
        depth: usize,
    ) -> Self {
        Self {
            id,
            boundary,
            reach: boundary,
            parent,
            children: None,
            objects: Vec::new(),
            threshold,
            depth,
        }
    }

    /// Handle of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The quadrant this node covers.
    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Conservative box covering this quadrant and every entity placed below it.
    ///
    /// Entities are stored by anchor, so their bounds may stick out of the
    /// quadrant; queries descend by reach rather than by boundary.
    pub fn reach(&self) -> Boundary {
        self.reach
    }

    /// Parent handle, `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Distance from the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Population above which subdivision is considered.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Whether this node is internal.
    pub fn has_subnodes(&self) -> bool {
        self.children.is_some()
    }

    /// Children in NE, NW, SW, SE order.
    pub fn subnodes(&self) -> Option<[NodeId; 4]> {
        self.children
    }

    /// Entities held by this leaf. Always empty for internal nodes.
    pub fn objects(&self) -> &[E] {
        &self.objects
    }

    /// Number of entities held directly.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the node holds no entities directly.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove and return every entity held by this leaf.
    pub fn take_objects(&mut self) -> Vec<E> {
        core::mem::take(&mut self.objects)
    }

    /// Grow the reach to cover `b`.
    pub(crate) fn extend_reach(&mut self, b: &Boundary) {
        self.reach = self.reach.union(b);
    }
}

impl<E: SpatialEntity> QuadNode<E> {
    /// Replace the boundary.
    ///
    /// Only allowed while the node is detached and childless, which in
    /// practice means a leaf root.
    pub fn set_boundary(&mut self, boundary: Boundary) -> QuadResult<()> {
        if self.parent.is_some() || self.children.is_some() {
            return Err(QuadtreeError::BoundaryLocked(self.id));
        }
        boundary.validate()?;
        self.boundary = boundary;
        self.reach = self
            .objects
            .iter()
            .fold(boundary, |r, o| r.union(&o.bounds()));
        Ok(())
    }

    /// Append an entity to this leaf. Returns `false` (and does nothing) on
    /// an internal node.
    pub fn add_object(&mut self, obj: E) -> bool {
        if self.children.is_some() {
            return false;
        }
        self.extend_reach(&obj.bounds());
        self.objects.push(obj);
        true
    }

    /// Remove the entity with identity `id` from this leaf.
    pub fn del_object(&mut self, id: &E::Id) -> Option<E> {
        let pos = self.objects.iter().position(|o| o.id() == *id)?;
        Some(self.objects.remove(pos))
    }

    /// Whether this leaf may subdivide under `policy`.
    pub fn can_subdivide(&self, policy: &SplitPolicy) -> bool {
        self.children.is_none() && policy.can_subdivide(&self.objects, self.threshold, self.depth)
    }

    /// Change the threshold.
    ///
    /// Emits `adjusted`, then `full` if the leaf now passes `policy`. Children
    /// created later inherit the new value; existing children keep theirs.
    pub fn set_threshold(
        &mut self,
        threshold: usize,
        policy: &SplitPolicy,
        events: &mut dyn NodeEvents<E>,
    ) -> QuadResult<()> {
        if threshold < 1 {
            return Err(QuadtreeError::InvalidThreshold(threshold));
        }
        let old = core::mem::replace(&mut self.threshold, threshold);
        events.on_adjusted(self, old, threshold)?;
        if threshold < old && self.can_subdivide(policy) {
            events.on_full(self)?;
        }
        Ok(())
    }
}

/// Slot storage for nodes, owned by the tree.
#[derive(Clone, Debug)]
pub(crate) struct NodeArena<E> {
    nodes: Vec<Option<QuadNode<E>>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl<E> Default for NodeArena<E> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
        }
    }
}

impl<E> NodeArena<E> {
    /// Allocate a node, reusing a free slot when possible.
    pub(crate) fn alloc(
        &mut self,
        boundary: Boundary,
        parent: Option<NodeId>,
        threshold: usize,
        depth: usize,
    ) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.nodes.push(None);
            self.generations.push(1);
            (self.nodes.len() - 1, 1)
        };
        let id = NodeId::new(idx, generation);
        self.nodes[idx] = Some(QuadNode::new(id, boundary, parent, threshold, depth));
        id
    }

    fn release(&mut self, id: NodeId) -> Option<QuadNode<E>> {
        let node = self.nodes.get_mut(id.idx())?.take_if(|n| n.id == id)?;
        self.free_list.push(id.idx());
        Some(node)
    }

    /// Drop every node. All outstanding handles become stale.
    pub(crate) fn clear(&mut self) {
        for (idx, slot) in self.nodes.iter_mut().enumerate() {
            if slot.take().is_some() {
                self.free_list.push(idx);
            }
        }
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&QuadNode<E>> {
        self.nodes
            .get(id.idx())
            .and_then(Option::as_ref)
            .filter(|n| n.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut QuadNode<E>> {
        self.nodes
            .get_mut(id.idx())
            .and_then(Option::as_mut)
            .filter(|n| n.id == id)
    }

    pub(crate) fn live(&self, id: NodeId) -> QuadResult<&QuadNode<E>> {
        self.get(id).ok_or(QuadtreeError::StaleNode(id))
    }

    pub(crate) fn live_mut(&mut self, id: NodeId) -> QuadResult<&mut QuadNode<E>> {
        self.get_mut(id).ok_or(QuadtreeError::StaleNode(id))
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Split a leaf into four children that exactly tile its boundary.
    ///
    /// The children inherit the current threshold. The leaf's former
    /// entities are returned for the caller to redistribute. Emits
    /// `subdivided`, then `reparented` once per child. Calling this on an
    /// internal node does nothing.
    pub(crate) fn subdivide(
        &mut self,
        id: NodeId,
        events: &mut dyn NodeEvents<E>,
    ) -> QuadResult<Vec<E>> {
        let node = self.live(id)?;
        if node.has_subnodes() {
            return Ok(Vec::new());
        }
        let quarters = node.boundary.quadrants();
        let threshold = node.threshold;
        let depth = node.depth + 1;
        let children = Quadrant::ALL
            .map(|q| self.alloc(quarters[q.index()], Some(id), threshold, depth));

        let node = self.live_mut(id)?;
        node.children = Some(children);
        let displaced = node.take_objects();

        events.on_subdivided(self.live(id)?, children)?;
        for child in children {
            events.on_reparented(child, Some(id))?;
        }
        Ok(displaced)
    }

    /// Detach and free the four children of `id`, leaving it an empty leaf.
    ///
    /// Entities still held by the children are returned. Grandchildren are not
    /// visited; the caller guarantees the children are leaves. Emits
    /// `reparented(child, None)` once per child.
    pub(crate) fn del_subnodes(
        &mut self,
        id: NodeId,
        events: &mut dyn NodeEvents<E>,
    ) -> QuadResult<Vec<E>> {
        let node = self.live_mut(id)?;
        let Some(children) = node.children.take() else {
            return Ok(Vec::new());
        };
        let mut orphans = node.take_objects();
        for child in children {
            if let Some(mut c) = self.release(child) {
                orphans.append(&mut c.objects);
            }
        }
        for child in children {
            events.on_reparented(child, None)?;
        }
        Ok(orphans)
    }
}

/// Lazy depth-first walk over leaves, children visited NE, NW, SW, SE.
///
/// Produced by [`Quadtree::nodes`](crate::Quadtree::nodes). Each call starts a
/// fresh traversal.
#[derive(Debug)]
pub struct Leaves<'a, E> {
    arena: &'a NodeArena<E>,
    stack: Vec<NodeId>,
    region: Option<Boundary>,
}

impl<'a, E> Leaves<'a, E> {
    pub(crate) fn new(arena: &'a NodeArena<E>, root: NodeId) -> Self {
        Self {
            arena,
            stack: vec![root],
            region: None,
        }
    }

    /// Only visit subtrees whose reach intersects `region`.
    pub(crate) fn within(arena: &'a NodeArena<E>, root: NodeId, region: Boundary) -> Self {
        Self {
            region: Some(region),
            ..Self::new(arena, root)
        }
    }
}

impl<'a, E> Iterator for Leaves<'a, E> {
    type Item = &'a QuadNode<E>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if let Some(region) = &self.region
                && !node.reach.intersects(region)
            {
                continue;
            }
            match node.children {
                Some(children) => self.stack.extend(children.iter().rev()),
                None => return Some(node),
            }
        }
        None
    }
}
