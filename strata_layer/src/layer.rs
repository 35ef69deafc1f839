// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing layer: entity slots, the spatial index, and the queries built on it.

use std::rc::Rc;

use kurbo::{Point, Rect};
use strata_quadtree::{NodeEvents, Quadtree, SpatialEntity};

use crate::config::LayerConfig;
use crate::error::{LayerError, LayerResult};
use crate::geometry::{Entity, Geometry, rect_boundary};
use crate::types::{Damage, EntityFlags, EntityId, SelectMode, SnapPoint};

#[derive(Clone, Debug)]
struct Slot {
    entity: Rc<Entity>,
    flags: EntityFlags,
    staged: bool,
}

/// One drawing layer.
///
/// Entities live in generational slots owned by the layer; the quadtree holds
/// `Rc` handles to them and answers every spatial query.
pub struct Layer {
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    index: Quadtree<Rc<Entity>>,
    config: LayerConfig,
    damage: Damage,
}

impl core::fmt::Debug for Layer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let alive = self.slots.iter().filter(|s| s.is_some()).count();
        f.debug_struct("Layer")
            .field("slots_total", &self.slots.len())
            .field("slots_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("index", &self.index)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Layer {
    /// Create an empty layer covering `extents`.
    pub fn new(extents: Rect, config: LayerConfig) -> LayerResult<Self> {
        config.validate()?;
        let index = Quadtree::with_boundary(rect_boundary(extents), config.quadtree.clone())?;
        Ok(Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            index,
            config,
            damage: Damage::default(),
        })
    }

    /// Create an empty layer with the default configuration.
    pub fn with_extents(extents: Rect) -> LayerResult<Self> {
        Self::new(extents, LayerConfig::default())
    }

    /// The configuration the layer was built with.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Current drawing extents (the index root boundary).
    pub fn extents(&self) -> Rect {
        let b = self.index.root().boundary();
        Rect::new(b.xmin, b.ymin, b.xmax, b.ymax)
    }

    /// The spatial index, for inspection.
    pub fn index(&self) -> &Quadtree<Rc<Entity>> {
        &self.index
    }

    /// Register a diagnostic observer on the spatial index.
    pub fn observe(&mut self, observer: Box<dyn NodeEvents<Rc<Entity>>>) {
        self.index.observe(observer);
    }

    // --- entities ---

    /// Add an entity and index it immediately.
    ///
    /// On error the entity is not kept: its slot is freed and it is dropped
    /// from the index again.
    pub fn add(&mut self, geometry: Geometry, flags: EntityFlags) -> LayerResult<EntityId> {
        let entity = self.alloc(geometry, flags, false);
        let id = entity.id();
        let bounds = entity.geometry().bounds();
        if let Err(err) = self.index.add_object(entity) {
            let _ = self.index.del_object(&id);
            self.slots[id.idx()] = None;
            self.free_list.push(id.idx());
            tracing::debug!(?id, %err, "entity add rolled back");
            return Err(err.into());
        }
        if flags.contains(EntityFlags::VISIBLE) {
            self.damage.push(bounds);
        }
        tracing::trace!(?id, "entity added");
        Ok(id)
    }

    /// Remove an entity, staged or indexed, and return its geometry.
    pub fn remove(&mut self, id: EntityId) -> LayerResult<Geometry> {
        if self.slot(id).is_none() {
            return Err(LayerError::UnknownEntity(id));
        }
        let slot = self.slots[id.idx()]
            .take()
            .ok_or(LayerError::UnknownEntity(id))?;
        self.free_list.push(id.idx());

        if slot.staged {
            let withdrawn = self.index.unqueue(&id);
            debug_assert!(withdrawn.is_some(), "staged slot without a queued entity");
        } else {
            let removed = self.index.del_object(&id);
            debug_assert!(removed.is_some(), "indexed slot without a registered entity");
            if slot.flags.contains(EntityFlags::VISIBLE) {
                self.damage.push(slot.entity.geometry().bounds());
            }
        }
        tracing::trace!(?id, staged = slot.staged, "entity removed");
        Ok(slot.entity.geometry().clone())
    }

    /// Look up an entity, staged or indexed.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slot(id).map(|s| &*s.entity)
    }

    /// Flags of an entity.
    pub fn flags(&self, id: EntityId) -> Option<EntityFlags> {
        self.slot(id).map(|s| s.flags)
    }

    /// Replace an entity's flags. Toggling visibility of an indexed entity
    /// records damage.
    pub fn set_flags(&mut self, id: EntityId, flags: EntityFlags) -> LayerResult<()> {
        let slot = self
            .slot_mut(id)
            .ok_or(LayerError::UnknownEntity(id))?;
        let toggled = (slot.flags ^ flags).contains(EntityFlags::VISIBLE);
        slot.flags = flags;
        if toggled && !slot.staged {
            let r = slot.entity.geometry().bounds();
            self.damage.push(r);
        }
        Ok(())
    }

    /// Every live entity, staged ones included, in slot order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().flatten().map(|s| &*s.entity)
    }

    /// Number of indexed entities.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no entity is indexed.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of staged entities awaiting [`Layer::commit_staged`].
    pub fn staged_len(&self) -> usize {
        self.index.queued().len()
    }

    // --- bulk load ---

    /// Stage an entity for a later [`Layer::commit_staged`].
    ///
    /// Staged entities have an id and can be looked up, but take no part in
    /// queries until committed.
    pub fn stage(&mut self, geometry: Geometry, flags: EntityFlags) -> LayerResult<EntityId> {
        let entity = self.alloc(geometry, flags, true);
        let id = entity.id();
        self.index.queue_object(entity)?;
        Ok(id)
    }

    /// Index every staged entity, first growing the extents to cover them.
    ///
    /// Returns how many entities were committed.
    pub fn commit_staged(&mut self) -> LayerResult<usize> {
        let batch = self.index.empty_queue();
        if batch.is_empty() {
            return Ok(0);
        }
        let current = self.index.root().boundary();
        let needed = batch
            .iter()
            .fold(current, |acc, e| acc.union(&SpatialEntity::bounds(e)));
        if needed != current {
            if let Err(err) = self
                .index
                .resize(needed.xmin, needed.ymin, needed.xmax, needed.ymax)
            {
                for e in batch {
                    self.index.queue_object(e)?;
                }
                return Err(err.into());
            }
            tracing::debug!(extents = ?needed, "extents grown for staged entities");
        }

        let count = batch.len();
        let mut first_err = None;
        for e in batch {
            if let Some(slot) = self.slots.get_mut(e.id().idx()).and_then(Option::as_mut) {
                slot.staged = false;
                if slot.flags.contains(EntityFlags::VISIBLE) {
                    self.damage.push(e.geometry().bounds());
                }
            }
            if let Err(err) = self.index.add_object(e) {
                first_err.get_or_insert(err);
            }
        }
        if let Some(err) = first_err {
            return Err(err.into());
        }
        tracing::debug!(count, "staged entities committed");
        Ok(count)
    }

    /// Move the layer to new extents, rebuilding the index if needed.
    pub fn set_extents(&mut self, extents: Rect) -> LayerResult<()> {
        let b = rect_boundary(extents);
        self.index.resize(b.xmin, b.ymin, b.xmax, b.ymax)?;
        Ok(())
    }

    /// Take the damage recorded since the last call.
    pub fn take_damage(&mut self) -> Damage {
        core::mem::take(&mut self.damage)
    }

    // --- queries ---

    /// Hit test with the configured pick tolerance.
    pub fn pick(&self, pt: Point) -> Option<EntityId> {
        self.pick_within(pt, self.config.pick_tolerance)
    }

    /// Hit test: the nearest selectable entity within `tol` of `pt`.
    ///
    /// If several are equally near, the newer [`EntityId`] wins.
    pub fn pick_within(&self, pt: Point, tol: f64) -> Option<EntityId> {
        let mut best: Option<(f64, EntityId)> = None;
        for e in self.index.find(pt.x, pt.y, tol) {
            let id = e.id();
            if !self.has_flags(id, EntityFlags::SELECTABLE) {
                continue;
            }
            let d = e.geometry().distance_to(pt);
            match best {
                None => best = Some((d, id)),
                Some((bd, bid)) => {
                    if d < bd || (d == bd && id.is_newer_than(bid)) {
                        best = Some((d, id));
                    }
                }
            }
        }
        best.map(|(_, id)| id)
    }

    /// Marquee selection over selectable entities.
    pub fn select(&self, rect: Rect, mode: SelectMode) -> LayerResult<Vec<EntityId>> {
        let window = rect_boundary(rect);
        let candidates = self
            .index
            .get_in_region(window.xmin, window.ymin, window.xmax, window.ymax)?;
        Ok(candidates
            .into_iter()
            .filter(|e| self.has_flags(e.id(), EntityFlags::SELECTABLE))
            .filter(|e| {
                let g = e.geometry();
                window.contains(&rect_boundary(g.bounds()))
                    || (mode == SelectMode::Crossing && g.touches(rect.abs()))
            })
            .map(|e| e.id())
            .collect())
    }

    /// Visible entities whose bounds intersect `viewport`, for redraw culling.
    pub fn visible(&self, viewport: Rect) -> LayerResult<Vec<EntityId>> {
        let view = rect_boundary(viewport);
        let candidates = self
            .index
            .get_in_region(view.xmin, view.ymin, view.xmax, view.ymax)?;
        Ok(candidates
            .into_iter()
            .filter(|e| self.has_flags(e.id(), EntityFlags::VISIBLE))
            .filter(|e| view.intersects(&rect_boundary(e.geometry().bounds())))
            .map(|e| e.id())
            .collect())
    }

    /// Snap with the configured snap tolerance.
    pub fn snap(&self, pt: Point) -> LayerResult<Option<SnapPoint>> {
        self.snap_within(pt, self.config.snap_tolerance)
    }

    /// The nearest snap point of any snappable entity within `tol` of `pt`.
    ///
    /// Equally near points keep the first one found.
    pub fn snap_within(&self, pt: Point, tol: f64) -> LayerResult<Option<SnapPoint>> {
        let candidates =
            self.index
                .get_in_region(pt.x - tol, pt.y - tol, pt.x + tol, pt.y + tol)?;
        let mut best: Option<(f64, SnapPoint)> = None;
        for e in candidates {
            let id = e.id();
            if !self.has_flags(id, EntityFlags::SNAPPABLE) {
                continue;
            }
            for (kind, point) in e.geometry().snap_points() {
                let d = point.distance(pt);
                if d <= tol && best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((
                        d,
                        SnapPoint {
                            entity: id,
                            kind,
                            point,
                        },
                    ));
                }
            }
        }
        Ok(best.map(|(_, s)| s))
    }

    // --- internals ---

    fn alloc(&mut self, geometry: Geometry, flags: EntityFlags, staged: bool) -> Rc<Entity> {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.slots.push(None);
            self.generations.push(1);
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "EntityId uses 32-bit indices by design."
        )]
        let id = EntityId::new(idx as u32, generation);
        let entity = Rc::new(Entity::new(id, geometry));
        self.slots[idx] = Some(Slot {
            entity: entity.clone(),
            flags,
            staged,
        });
        entity
    }

    fn slot(&self, id: EntityId) -> Option<&Slot> {
        self.slots
            .get(id.idx())?
            .as_ref()
            .filter(|s| s.entity.id() == id)
    }

    fn slot_mut(&mut self, id: EntityId) -> Option<&mut Slot> {
        self.slots
            .get_mut(id.idx())?
            .as_mut()
            .filter(|s| s.entity.id() == id)
    }

    fn has_flags(&self, id: EntityId, flags: EntityFlags) -> bool {
        self.slot(id).is_some_and(|s| s.flags.contains(flags))
    }
}
