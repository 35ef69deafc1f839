// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `Quadtree` facade: registry, guarded subdivision, merge, resize, queries.

use std::collections::{HashMap, HashSet};

use crate::config::QuadtreeConfig;
use crate::entity::SpatialEntity;
use crate::error::{QuadResult, QuadtreeError};
use crate::events::NodeEvents;
use crate::node::{Leaves, NodeArena, NodeId, QuadNode};
use crate::policy::SplitPolicy;
use crate::types::Boundary;

/// Where the deferred subdivision machinery currently stands.
///
/// At most one structural change is in flight: a `full` leaf is recorded as
/// `Requested` only while the tree is `Idle`, and the request is carried out
/// (`Splitting`) once the triggering operation has finished placing its
/// entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SplitState {
    /// Nothing pending.
    #[default]
    Idle,
    /// This leaf will be subdivided at the next safe point.
    Requested(NodeId),
    /// This leaf is being subdivided and its entities redistributed.
    Splitting(NodeId),
}

#[derive(Clone, Debug)]
struct Registered<E> {
    entity: E,
    leaf: NodeId,
}

/// Adaptive region quadtree over borrowed entity handles.
///
/// See the [crate documentation](crate) for the model and an example.
pub struct Quadtree<E: SpatialEntity> {
    arena: NodeArena<E>,
    root: NodeId,
    registry: HashMap<E::Id, Registered<E>>,
    queue: Vec<E>,
    staged: HashSet<E::Id>,
    split: SplitState,
    policy: SplitPolicy,
    observers: Vec<Box<dyn NodeEvents<E>>>,
}

impl<E: SpatialEntity> core::fmt::Debug for Quadtree<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Quadtree")
            .field("root", &self.root)
            .field("nodes", &self.arena.len())
            .field("registered", &self.registry.len())
            .field("queued", &self.queue.len())
            .field("split", &self.split)
            .field("policy", &self.policy)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

/// Event sink handed to nodes: the tree's own bookkeeping first, then observers.
struct Dispatch<'a, E> {
    split: &'a mut SplitState,
    observers: &'a mut [Box<dyn NodeEvents<E>>],
}

impl<E> NodeEvents<E> for Dispatch<'_, E> {
    fn on_full(&mut self, node: &QuadNode<E>) -> QuadResult<()> {
        if *self.split == SplitState::Idle {
            *self.split = SplitState::Requested(node.id());
        }
        for o in self.observers.iter_mut() {
            o.on_full(node)?;
        }
        Ok(())
    }

    fn on_subdivided(&mut self, node: &QuadNode<E>, children: [NodeId; 4]) -> QuadResult<()> {
        for o in self.observers.iter_mut() {
            o.on_subdivided(node, children)?;
        }
        Ok(())
    }

    fn on_reparented(&mut self, child: NodeId, parent: Option<NodeId>) -> QuadResult<()> {
        for o in self.observers.iter_mut() {
            o.on_reparented(child, parent)?;
        }
        Ok(())
    }

    fn on_adjusted(&mut self, node: &QuadNode<E>, old: usize, new: usize) -> QuadResult<()> {
        for o in self.observers.iter_mut() {
            o.on_adjusted(node, old, new)?;
        }
        Ok(())
    }
}

impl<E: SpatialEntity + Clone> Quadtree<E> {
    /// Create an empty tree covering `(xmin, ymin)..(xmax, ymax)`.
    pub fn new(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        config: QuadtreeConfig,
    ) -> QuadResult<Self> {
        Self::with_boundary(Boundary::try_new(xmin, ymin, xmax, ymax)?, config)
    }

    /// Create an empty tree covering `boundary`.
    pub fn with_boundary(boundary: Boundary, config: QuadtreeConfig) -> QuadResult<Self> {
        boundary.validate()?;
        config.validate()?;
        let mut arena = NodeArena::default();
        let root = arena.alloc(boundary, None, config.threshold, 0);
        Ok(Self {
            arena,
            root,
            registry: HashMap::new(),
            queue: Vec::new(),
            staged: HashSet::new(),
            split: SplitState::Idle,
            policy: config.policy(),
            observers: Vec::new(),
        })
    }

    /// Register a diagnostic observer. Observers run after the tree's own
    /// handling, in registration order.
    pub fn observe(&mut self, observer: Box<dyn NodeEvents<E>>) {
        self.observers.push(observer);
    }

    // --- mutation ---

    /// Index an entity.
    ///
    /// Returns `Ok(false)` without touching the tree when the identity is
    /// already registered. The entity is placed in the leaf that receives its
    /// anchor; if that leaf becomes over-full it is subdivided before this
    /// call returns.
    pub fn add_object(&mut self, obj: E) -> QuadResult<bool> {
        let id = obj.id();
        if self.registry.contains_key(&id) {
            return Ok(false);
        }
        let leaf = self.place(self.root, obj.clone())?;
        self.registry.insert(id, Registered { entity: obj, leaf });
        self.notify_if_full(leaf)?;
        self.drain_splits()?;
        Ok(true)
    }

    /// Remove an entity from both the registry and its leaf.
    pub fn del_object(&mut self, id: &E::Id) -> Option<E> {
        let reg = self.registry.remove(id)?;
        if let Some(leaf) = self.arena.get_mut(reg.leaf) {
            let _ = leaf.del_object(id);
        }
        tracing::trace!(?id, leaf = ?reg.leaf, "entity removed");
        Some(reg.entity)
    }

    /// Stage an entity without indexing it, typically while the final
    /// boundary is still unknown.
    ///
    /// Rejected when the identity is already registered or already staged.
    pub fn queue_object(&mut self, obj: E) -> QuadResult<()> {
        let id = obj.id();
        if self.registry.contains_key(&id) || !self.staged.insert(id) {
            return Err(QuadtreeError::AlreadyRegistered {
                id: format!("{id:?}"),
            });
        }
        self.queue.push(obj);
        Ok(())
    }

    /// Drain and return the staged entities, oldest first.
    pub fn empty_queue(&mut self) -> Vec<E> {
        self.staged.clear();
        core::mem::take(&mut self.queue)
    }

    /// Withdraw one staged entity, keeping the others in order.
    pub fn unqueue(&mut self, id: &E::Id) -> Option<E> {
        if !self.staged.remove(id) {
            return None;
        }
        let pos = self.queue.iter().position(|q| q.id() == *id)?;
        Some(self.queue.remove(pos))
    }

    /// Entities currently staged.
    pub fn queued(&self) -> &[E] {
        &self.queue
    }

    /// Change a node's threshold; a lowered threshold may subdivide the node
    /// before this call returns.
    pub fn set_threshold(&mut self, node: NodeId, threshold: usize) -> QuadResult<()> {
        let Self {
            arena,
            split,
            observers,
            policy,
            ..
        } = self;
        arena.live_mut(node)?.set_threshold(
            threshold,
            policy,
            &mut Dispatch { split, observers },
        )?;
        tracing::debug!(?node, threshold, "threshold set");
        self.drain_splits()
    }

    /// Move the tree to a new boundary.
    ///
    /// A tree that never subdivided just takes the new boundary. Otherwise the
    /// tree is torn down and every registered entity is reinserted, which
    /// keeps the registry intact and rebuilds the structure for the new
    /// extents. The root's threshold carries over; thresholds adjusted on
    /// inner nodes do not.
    pub fn resize(&mut self, xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> QuadResult<()> {
        let boundary = Boundary::try_new(xmin, ymin, xmax, ymax)?;
        let root = self.arena.live_mut(self.root)?;
        if !root.has_subnodes() {
            root.set_boundary(boundary)?;
            tracing::debug!(?boundary, "root boundary replaced");
            return Ok(());
        }

        let entities: Vec<E> = self
            .nodes()
            .flat_map(|leaf| leaf.objects().iter().cloned())
            .collect();
        debug_assert_eq!(
            entities.len(),
            self.registry.len(),
            "every registered entity lives in exactly one leaf"
        );
        self.clear();
        self.arena.live_mut(self.root)?.set_boundary(boundary)?;
        tracing::debug!(?boundary, entities = entities.len(), "rebuilding after resize");
        // A failed split still leaves its entity registered, so keep going.
        let mut first_err = None;
        for e in entities {
            if let Err(err) = self.add_object(e) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Merge the four children of `node` back into it when they are all
    /// leaves and hold fewer than `node`'s threshold entities together.
    ///
    /// Returns whether a merge happened. Merges never cascade: `node`'s own
    /// parent is left alone even if it becomes mergeable.
    pub fn purge_subnodes(&mut self, node: NodeId) -> QuadResult<bool> {
        let n = self.arena.live(node)?;
        let Some(children) = n.subnodes() else {
            return Ok(false);
        };
        let mut population = 0;
        for c in children {
            let child = self.arena.live(c)?;
            if child.has_subnodes() {
                return Ok(false);
            }
            population += child.len();
        }
        if population >= n.threshold() {
            return Ok(false);
        }

        let mut orphans = Vec::with_capacity(population);
        for c in children {
            orphans.append(&mut self.arena.live_mut(c)?.take_objects());
        }
        let Self {
            arena,
            split,
            observers,
            ..
        } = self;
        let detached = arena.del_subnodes(node, &mut Dispatch { split, observers });
        for obj in orphans {
            self.replace_from(node, obj)?;
        }
        detached?;
        tracing::debug!(?node, population, "children merged");
        self.drain_splits()?;
        Ok(true)
    }

    /// Drop every entity and node, keeping the root boundary and threshold.
    ///
    /// Staged entities and observers are kept.
    pub fn clear(&mut self) {
        let root = self.root();
        let (boundary, threshold) = (root.boundary(), root.threshold());
        self.arena.clear();
        self.registry.clear();
        self.split = SplitState::Idle;
        self.root = self.arena.alloc(boundary, None, threshold, 0);
    }

    // --- queries ---

    /// Look up a registered entity.
    pub fn get_object(&self, id: &E::Id) -> Option<&E> {
        self.registry.get(id).map(|r| &r.entity)
    }

    /// Whether the identity is registered.
    pub fn contains(&self, id: &E::Id) -> bool {
        self.registry.contains_key(id)
    }

    /// Every registered entity, in no particular order.
    pub fn objects(&self) -> impl Iterator<Item = &E> + '_ {
        self.registry.values().map(|r| &r.entity)
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Entities stored in every leaf that the region reaches.
    ///
    /// This is the coarse candidate set for marquee selection and redraw
    /// culling: each returned entity lives in a leaf whose reach intersects
    /// the region, but its own bounds may not. Every entity whose bounds do
    /// intersect the region is returned. No entity is returned twice.
    pub fn get_in_region(
        &self,
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    ) -> QuadResult<Vec<&E>> {
        let region = Boundary::try_new(xmin, ymin, xmax, ymax)?;
        Ok(Leaves::within(&self.arena, self.root, region)
            .flat_map(|leaf| leaf.objects().iter())
            .collect())
    }

    /// Every entity within `tol` of the point, nearest first.
    ///
    /// Distance is measured by [`SpatialEntity::distance_to`]. Equal
    /// distances keep traversal order.
    pub fn find(&self, x: f64, y: f64, tol: f64) -> Vec<&E> {
        let mut hits: Vec<(f64, &E)> = self
            .near(x, y, tol)
            .map(|obj| (obj.distance_to(x, y), obj))
            .filter(|(d, _)| *d <= tol)
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, obj)| obj).collect()
    }

    /// The entity nearest to the point, if any lies within `tol`.
    pub fn get_closest(&self, x: f64, y: f64, tol: f64) -> Option<&E> {
        let mut best: Option<(f64, &E)> = None;
        for obj in self.near(x, y, tol) {
            let d = obj.distance_to(x, y);
            if d <= tol && best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, obj));
            }
        }
        best.map(|(_, obj)| obj)
    }

    fn near(&self, x: f64, y: f64, tol: f64) -> impl Iterator<Item = &E> + '_ {
        let probe = Boundary::from_point(x, y).inflate(tol.max(0.0));
        Leaves::within(&self.arena, self.root, probe).flat_map(|leaf| leaf.objects().iter())
    }

    // --- structure ---

    /// The root node.
    pub fn root(&self) -> &QuadNode<E> {
        self.arena.get(self.root).expect("root node is always live")
    }

    /// A node by handle, `None` if the handle is stale.
    pub fn node(&self, id: NodeId) -> Option<&QuadNode<E>> {
        self.arena.get(id)
    }

    /// Lazy depth-first walk over the leaves. Each call starts over.
    pub fn nodes(&self) -> Leaves<'_, E> {
        Leaves::new(&self.arena, self.root)
    }

    /// Number of live nodes, leaves and internal.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// The split policy in force.
    pub fn policy(&self) -> SplitPolicy {
        self.policy
    }

    /// Current state of the deferred split machinery.
    pub fn split_state(&self) -> SplitState {
        self.split
    }

    /// The leaf that currently stores `id`.
    pub fn leaf_of(&self, id: &E::Id) -> Option<NodeId> {
        self.registry.get(id).map(|r| r.leaf)
    }

    /// Compare the registry against the leaves.
    ///
    /// This walks the whole tree and is meant for tests and maintenance, not
    /// for the insertion path.
    pub fn check_consistency(&self) -> QuadResult<()> {
        let mut reachable = 0;
        let mut misplaced = 0;
        for leaf in self.nodes() {
            for obj in leaf.objects() {
                reachable += 1;
                if self.leaf_of(&obj.id()) != Some(leaf.id()) {
                    misplaced += 1;
                }
            }
        }
        let registered = self.registry.len();
        if reachable != registered || misplaced != 0 {
            tracing::warn!(registered, reachable, misplaced, "quadtree is inconsistent");
            return Err(QuadtreeError::Inconsistent {
                registered,
                reachable,
            });
        }
        Ok(())
    }

    // --- internals ---

    /// Descend from `start` by anchor and append `obj` to the receiving leaf.
    fn place(&mut self, start: NodeId, obj: E) -> QuadResult<NodeId> {
        let (ax, ay) = obj.anchor();
        let bounds = obj.bounds();
        let mut id = start;
        loop {
            let node = self.arena.live_mut(id)?;
            match node.subnodes() {
                Some(children) => {
                    node.extend_reach(&bounds);
                    id = children[node.boundary().quadrant_of(ax, ay).index()];
                }
                None => {
                    node.add_object(obj);
                    tracing::trace!(leaf = ?id, depth = node.depth(), "entity placed");
                    return Ok(id);
                }
            }
        }
    }

    /// Re-place an already registered entity below `start` and record its new leaf.
    fn replace_from(&mut self, start: NodeId, obj: E) -> QuadResult<NodeId> {
        let id = obj.id();
        let leaf = self.place(start, obj)?;
        if let Some(reg) = self.registry.get_mut(&id) {
            reg.leaf = leaf;
        }
        Ok(leaf)
    }

    fn notify_if_full(&mut self, leaf: NodeId) -> QuadResult<()> {
        let Self {
            arena,
            split,
            observers,
            policy,
            ..
        } = self;
        let node = arena.live(leaf)?;
        if node.can_subdivide(policy) {
            Dispatch { split, observers }.on_full(node)?;
        } else if node.len() > node.threshold() && node.depth() >= policy.max_depth() {
            tracing::trace!(?leaf, population = node.len(), "over threshold at max depth");
        }
        Ok(())
    }

    /// Carry out pending subdivisions until none remain.
    ///
    /// Leaves left over-full by a split are checked here, after the split has
    /// finished, rather than from inside it.
    fn drain_splits(&mut self) -> QuadResult<()> {
        let mut backlog: Vec<NodeId> = Vec::new();
        loop {
            let id = match self.split {
                SplitState::Requested(id) => id,
                SplitState::Splitting(_) => return Ok(()),
                SplitState::Idle => {
                    let Some(next) = backlog.pop() else {
                        return Ok(());
                    };
                    if self
                        .arena
                        .get(next)
                        .is_some_and(|n| n.can_subdivide(&self.policy))
                    {
                        self.split = SplitState::Requested(next);
                    }
                    continue;
                }
            };
            self.split = SplitState::Splitting(id);
            let outcome = self.split_leaf(id);
            self.split = SplitState::Idle;
            let children = outcome?;
            backlog.extend(children.iter().rev());
        }
    }

    fn split_leaf(&mut self, id: NodeId) -> QuadResult<[NodeId; 4]> {
        let captured = self.arena.live_mut(id)?.take_objects();
        let Self {
            arena,
            split,
            observers,
            ..
        } = self;
        let subdivided = arena.subdivide(id, &mut Dispatch { split, observers });

        // Every captured entity goes back into the tree even if an observer failed.
        let mut first_err = subdivided.err();
        for obj in captured {
            let leaf = self.replace_from(id, obj)?;
            if let Err(e) = self.notify_if_full(leaf) {
                first_err.get_or_insert(e);
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }
        let node = self.arena.live(id)?;
        tracing::debug!(node = ?id, depth = node.depth(), "leaf subdivided");
        node.subnodes().ok_or(QuadtreeError::StaleNode(id))
    }
}
