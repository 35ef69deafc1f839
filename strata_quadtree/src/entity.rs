// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The capability an indexed object must provide.

use core::fmt::Debug;
use core::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use crate::types::Boundary;

/// Anything the quadtree can index.
///
/// The tree stores values of the implementing type as cheap handles
/// (typically `&T`, `Rc<T>` or a small `Copy` reference), registered under
/// [`SpatialEntity::id`]. Identity, not value, is the registry key, so two
/// coincident points are two distinct entries.
///
/// The identity and geometry must not change while the entity is indexed;
/// remove it, mutate it, and add it back instead.
pub trait SpatialEntity {
    /// Stable identity for the registration lifetime.
    type Id: Copy + Eq + Hash + Debug;

    /// Whether [`SpatialEntity::value_eq`] is meaningful for this type.
    ///
    /// When `false` the dedup-aware split rule degrades to a plain
    /// population check.
    const SUPPORTS_VALUE_EQ: bool = false;

    /// Identity of this entity.
    fn id(&self) -> Self::Id;

    /// Bounding box in drawing units.
    fn bounds(&self) -> Boundary;

    /// Representative point used for placement. Defaults to the centre of
    /// [`SpatialEntity::bounds`].
    fn anchor(&self) -> (f64, f64) {
        self.bounds().center()
    }

    /// Distance from the point to the entity, used by nearest queries.
    ///
    /// The default measures to the bounding box; entities with real geometry
    /// should measure to their outline.
    fn distance_to(&self, x: f64, y: f64) -> f64 {
        self.bounds().distance_to_point(x, y)
    }

    /// Value equality, consulted only when `SUPPORTS_VALUE_EQ` is `true`.
    fn value_eq(&self, _other: &Self) -> bool {
        false
    }
}

macro_rules! forward_entity {
    ($($ptr:ty),*) => {$(
        impl<T: SpatialEntity + ?Sized> SpatialEntity for $ptr {
            type Id = T::Id;
            const SUPPORTS_VALUE_EQ: bool = T::SUPPORTS_VALUE_EQ;

            #[inline]
            fn id(&self) -> Self::Id {
                (**self).id()
            }

            #[inline]
            fn bounds(&self) -> Boundary {
                (**self).bounds()
            }

            #[inline]
            fn anchor(&self) -> (f64, f64) {
                (**self).anchor()
            }

            #[inline]
            fn distance_to(&self, x: f64, y: f64) -> f64 {
                (**self).distance_to(x, y)
            }

            #[inline]
            fn value_eq(&self, other: &Self) -> bool {
                (**self).value_eq(&**other)
            }
        }
    )*};
}

forward_entity!(&T, Rc<T>, Arc<T>);

/// A labelled point, handy for tests and for point-like collaborators.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointEntity {
    /// Identity.
    pub id: u64,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl PointEntity {
    /// Create a point entity.
    pub const fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

impl SpatialEntity for PointEntity {
    type Id = u64;
    const SUPPORTS_VALUE_EQ: bool = true;

    fn id(&self) -> u64 {
        self.id
    }

    fn bounds(&self) -> Boundary {
        Boundary::from_point(self.x, self.y)
    }

    fn anchor(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }

    fn value_eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_forward_identity_and_equality() {
        let a = Rc::new(PointEntity::new(1, 2.0, 3.0));
        let b = Rc::new(PointEntity::new(2, 2.0, 3.0));
        assert_ne!(a.id(), b.id());
        assert!(a.value_eq(&b));
        assert!(
            <Rc<PointEntity> as SpatialEntity>::SUPPORTS_VALUE_EQ,
            "Rc must forward the equality capability"
        );

        let r: &PointEntity = &a;
        assert_eq!(SpatialEntity::anchor(&r), (2.0, 3.0));
        assert_eq!(SpatialEntity::distance_to(&r, 5.0, 7.0), 5.0);
    }
}
