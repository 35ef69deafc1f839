// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the layer: entity identifiers, flags, snap results, and damage.

use kurbo::{Point, Rect};

/// Identifier for an entity on a [`Layer`](crate::Layer).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - A fresh slot starts at generation `1`.
/// - Removing an entity frees its slot; every `EntityId` naming that slot is now stale.
/// - Reusing a freed slot increments its generation, so a stale id never
///   aliases the new entity.
///
/// ### Newer
///
/// An id with a higher generation is newer; equal generations compare by slot
/// index. [`Layer::pick`](crate::Layer::pick) uses this order to break ties
/// between equally distant entities.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct EntityId(pub(crate) u32, pub(crate) u32);

impl EntityId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Whether `self` was allocated after `other`.
    pub fn is_newer_than(self, other: Self) -> bool {
        (self.1 > other.1) || (self.1 == other.1 && self.0 > other.0)
    }
}

bitflags::bitflags! {
    /// Entity flags controlling drawing, selection, and snapping.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EntityFlags: u8 {
        /// Entity is drawn and participates in redraw culling.
        const VISIBLE    = 0b0000_0001;
        /// Entity can be picked and marquee-selected.
        const SELECTABLE = 0b0000_0010;
        /// Entity offers snap points.
        const SNAPPABLE  = 0b0000_0100;
    }
}

impl Default for EntityFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// How a marquee rectangle selects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SelectMode {
    /// Only entities lying entirely inside the rectangle.
    #[default]
    Window,
    /// Entities inside the rectangle or whose outline crosses its edge.
    Crossing,
}

/// Kind of a characteristic point offered for snapping.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SnapKind {
    /// End of a line, arc or dimension line.
    Endpoint,
    /// Middle of a line or arc.
    Midpoint,
    /// Centre of a circle or arc.
    Center,
    /// A point entity or a dimension definition point.
    Node,
    /// Insertion point of text.
    Insertion,
}

/// Result of [`Layer::snap`](crate::Layer::snap).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SnapPoint {
    /// Entity offering the point.
    pub entity: EntityId,
    /// What kind of point it is.
    pub kind: SnapKind,
    /// Location in drawing units.
    pub point: Point,
}

/// Regions that need repainting since the last [`Layer::take_damage`](crate::Layer::take_damage).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Damage {
    /// Drawing-space rectangles that should be repainted.
    pub dirty_rects: Vec<Rect>,
}

impl Damage {
    /// Returns the union of all damage rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }

    /// True if nothing needs repainting.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }

    pub(crate) fn push(&mut self, r: Rect) {
        self.dirty_rects.push(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_than_semantics() {
        let old = EntityId::new(10, 1);
        let newer_same_slot = EntityId::new(10, 2);
        let same_gen_higher_slot = EntityId::new(11, 2);
        let same_gen_lower_slot = EntityId::new(9, 2);

        assert!(newer_same_slot.is_newer_than(old));
        assert!(same_gen_higher_slot.is_newer_than(newer_same_slot));
        assert!(!same_gen_lower_slot.is_newer_than(newer_same_slot));
    }

    #[test]
    fn damage_union() {
        let mut d = Damage::default();
        assert_eq!(d.union_rect(), None);
        d.push(Rect::new(0.0, 0.0, 1.0, 1.0));
        d.push(Rect::new(5.0, -2.0, 6.0, 0.5));
        assert_eq!(d.union_rect(), Some(Rect::new(0.0, -2.0, 6.0, 1.0)));
    }
}
