// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use serde::{Deserialize, Serialize};

use crate::error::{QuadResult, QuadtreeError};

/// Axis-aligned boundary of a quadrant or entity, in drawing units.
///
/// The y axis points up, as in model space: "north" is larger `y`.
/// Edges are closed, so a point on a shared midline is contained by every
/// quadrant touching it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Minimum x (west edge).
    pub xmin: f64,
    /// Minimum y (south edge).
    pub ymin: f64,
    /// Maximum x (east edge).
    pub xmax: f64,
    /// Maximum y (north edge).
    pub ymax: f64,
}

/// One of the four quadrants produced by a subdivision, in storage order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// `x >= mid_x`, `y >= mid_y`.
    NorthEast = 0,
    /// `x < mid_x`, `y >= mid_y`.
    NorthWest = 1,
    /// `x < mid_x`, `y < mid_y`.
    SouthWest = 2,
    /// `x >= mid_x`, `y < mid_y`.
    SouthEast = 3,
}

impl Quadrant {
    /// All quadrants in child order.
    pub const ALL: [Self; 4] = [
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthWest,
        Self::SouthEast,
    ];

    /// Position of this quadrant in a node's child array.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl Boundary {
    /// Create a boundary from min/max corners without validation.
    ///
    /// Use [`Boundary::try_new`] for caller-supplied coordinates.
    pub const fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Create a boundary, rejecting inverted or NaN extents.
    pub fn try_new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> QuadResult<Self> {
        let b = Self::new(xmin, ymin, xmax, ymax);
        b.validate()?;
        Ok(b)
    }

    /// Create a degenerate boundary around a single point.
    pub const fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Create a boundary from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self::new(x, y, x + w, y + h)
    }

    /// Check `xmax >= xmin` and `ymax >= ymin`. NaN extents fail the check.
    pub fn validate(&self) -> QuadResult<()> {
        if self.xmax >= self.xmin && self.ymax >= self.ymin {
            Ok(())
        } else {
            Err(QuadtreeError::InvalidBoundary {
                xmin: self.xmin,
                ymin: self.ymin,
                xmax: self.xmax,
                ymax: self.ymax,
            })
        }
    }

    /// Width along x.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height along y.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Area of the boundary.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Centre point.
    pub fn center(&self) -> (f64, f64) {
        (
            0.5 * (self.xmin + self.xmax),
            0.5 * (self.ymin + self.ymax),
        )
    }

    /// Whether this boundary contains the point (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        self.xmin <= x && x <= self.xmax && self.ymin <= y && y <= self.ymax
    }

    /// Whether `other` lies entirely inside this boundary.
    pub fn contains(&self, other: &Self) -> bool {
        self.xmin <= other.xmin
            && self.ymin <= other.ymin
            && other.xmax <= self.xmax
            && other.ymax <= self.ymax
    }

    /// Whether the two boundaries share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        self.xmin <= other.xmax
            && other.xmin <= self.xmax
            && self.ymin <= other.ymax
            && other.ymin <= self.ymax
    }

    /// Smallest boundary covering both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Grow the boundary by `d` on every side.
    pub fn inflate(&self, d: f64) -> Self {
        Self::new(self.xmin - d, self.ymin - d, self.xmax + d, self.ymax + d)
    }

    /// Euclidean distance from the point to this boundary; `0.0` when inside.
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = (self.xmin - x).max(0.0).max(x - self.xmax);
        let dy = (self.ymin - y).max(0.0).max(y - self.ymax);
        dx.hypot(dy)
    }

    /// The quadrant of this boundary that receives the point.
    ///
    /// Points on a midline go east / north. Points outside the boundary are
    /// clamped to the nearest quadrant.
    pub fn quadrant_of(&self, x: f64, y: f64) -> Quadrant {
        let (mx, my) = self.center();
        match (x >= mx, y >= my) {
            (true, true) => Quadrant::NorthEast,
            (false, true) => Quadrant::NorthWest,
            (false, false) => Quadrant::SouthWest,
            (true, false) => Quadrant::SouthEast,
        }
    }

    /// One exact quarter of this boundary, split at the midpoint on each axis.
    pub fn quadrant(&self, q: Quadrant) -> Self {
        let (mx, my) = self.center();
        match q {
            Quadrant::NorthEast => Self::new(mx, my, self.xmax, self.ymax),
            Quadrant::NorthWest => Self::new(self.xmin, my, mx, self.ymax),
            Quadrant::SouthWest => Self::new(self.xmin, self.ymin, mx, my),
            Quadrant::SouthEast => Self::new(mx, self.ymin, self.xmax, my),
        }
    }

    /// All four quarters in child order.
    pub fn quadrants(&self) -> [Self; 4] {
        Quadrant::ALL.map(|q| self.quadrant(q))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants_tile_parent() {
        let b = Boundary::new(0.0, 0.0, 100.0, 60.0);
        let qs = b.quadrants();
        let total: f64 = qs.iter().map(Boundary::area).sum();
        assert_eq!(total, b.area());
        for q in qs {
            assert!(b.contains(&q));
            assert_eq!(q.area(), b.area() / 4.0);
        }
        assert_eq!(qs[0], Boundary::new(50.0, 30.0, 100.0, 60.0));
        assert_eq!(qs[2], Boundary::new(0.0, 0.0, 50.0, 30.0));
    }

    #[test]
    fn midline_points_go_north_east() {
        let b = Boundary::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(b.quadrant_of(5.0, 5.0), Quadrant::NorthEast);
        assert_eq!(b.quadrant_of(4.9, 5.0), Quadrant::NorthWest);
        assert_eq!(b.quadrant_of(4.9, 4.9), Quadrant::SouthWest);
        assert_eq!(b.quadrant_of(5.0, 0.0), Quadrant::SouthEast);
        // Outside points clamp to the nearest quarter.
        assert_eq!(b.quadrant_of(-50.0, 99.0), Quadrant::NorthWest);
    }

    #[test]
    fn inverted_and_nan_extents_are_rejected() {
        assert!(Boundary::try_new(0.0, 0.0, -1.0, 1.0).is_err());
        assert!(Boundary::try_new(0.0, 2.0, 1.0, 1.0).is_err());
        assert!(Boundary::try_new(f64::NAN, 0.0, 1.0, 1.0).is_err());
        assert!(Boundary::try_new(3.0, 3.0, 3.0, 3.0).is_ok());
    }

    #[test]
    fn distance_is_zero_inside() {
        let b = Boundary::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(b.distance_to_point(5.0, 5.0), 0.0);
        assert_eq!(b.distance_to_point(13.0, 14.0), 5.0);
        assert!(b.intersects(&Boundary::new(10.0, 10.0, 20.0, 20.0)));
        assert!(!b.intersects(&Boundary::new(10.5, 0.0, 20.0, 20.0)));
    }
}
