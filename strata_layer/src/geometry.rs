// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing geometry and the indexed entity wrapper.

use kurbo::{
    Affine, Arc, Circle, Line, ParamCurve, ParamCurveNearest, PathSeg, Point, Rect, Shape, Vec2,
};
use strata_quadtree::{Boundary, SpatialEntity};

use crate::types::{EntityId, SnapKind};

/// Flattening tolerance for arcs and circles, in drawing units.
const CURVE_TOLERANCE: f64 = 1e-3;
/// Accuracy passed to nearest-point solves.
const NEAREST_ACCURACY: f64 = 1e-9;
/// Average glyph advance as a fraction of text height.
const TEXT_ASPECT: f64 = 0.6;

/// Geometry of one drawing entity. All coordinates are in drawing units, y up.
#[derive(Clone, Debug)]
pub enum Geometry {
    /// A point (node).
    Point(Point),
    /// A straight segment.
    Line(Line),
    /// A circular or elliptical arc.
    Arc(Arc),
    /// A full circle.
    Circle(Circle),
    /// Single-line text, growing right and up from its insertion point.
    Text {
        /// Lower-left insertion point.
        insertion: Point,
        /// Cap height.
        height: f64,
        /// The string.
        content: String,
    },
    /// Aligned linear dimension between two definition points.
    Dimension {
        /// First definition point.
        start: Point,
        /// Second definition point.
        end: Point,
        /// Perpendicular distance from the measured segment to the dimension line,
        /// positive to the left of `start -> end`.
        offset: f64,
    },
}

impl Geometry {
    /// Circular arc from `start_angle` sweeping `sweep_angle` radians counter-clockwise.
    pub fn arc(center: Point, radius: f64, start_angle: f64, sweep_angle: f64) -> Self {
        Self::Arc(Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle,
            sweep_angle,
            x_rotation: 0.0,
        })
    }

    /// Axis-aligned bounding box of the drawn geometry.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Point(p) => Rect::from_points(*p, *p),
            Self::Line(l) => l.bounding_box(),
            Self::Arc(a) => a.bounding_box(),
            Self::Circle(c) => c.bounding_box(),
            Self::Text {
                insertion,
                height,
                content,
            } => {
                let width = content.chars().count() as f64 * height * TEXT_ASPECT;
                Rect::from_points(*insertion, *insertion + Vec2::new(width, *height))
            }
            Self::Dimension { start, .. } => self
                .segments()
                .iter()
                .fold(Rect::from_points(*start, *start), |r, s| {
                    r.union(s.bounding_box())
                }),
        }
    }

    /// Point used to place the entity in the index.
    pub fn anchor(&self) -> Point {
        match self {
            Self::Point(p) => *p,
            _ => self.bounds().center(),
        }
    }

    /// Outline as path segments. Empty for points and text.
    pub fn segments(&self) -> Vec<PathSeg> {
        match self {
            Self::Point(_) | Self::Text { .. } => Vec::new(),
            Self::Line(l) => vec![PathSeg::Line(*l)],
            Self::Arc(a) => a.path_segments(CURVE_TOLERANCE).collect(),
            Self::Circle(c) => c.path_segments(CURVE_TOLERANCE).collect(),
            Self::Dimension { start, end, offset } => {
                let shift = dimension_normal(*start, *end) * *offset;
                let (a, b) = (*start + shift, *end + shift);
                vec![
                    PathSeg::Line(Line::new(*start, a)),
                    PathSeg::Line(Line::new(a, b)),
                    PathSeg::Line(Line::new(*end, b)),
                ]
            }
        }
    }

    /// Distance from `p` to the outline.
    ///
    /// Text is measured to its box, and is at distance zero anywhere inside it.
    pub fn distance_to(&self, p: Point) -> f64 {
        match self {
            Self::Point(q) => q.distance(p),
            Self::Circle(c) => (c.center.distance(p) - c.radius).abs(),
            Self::Text { .. } => rect_boundary(self.bounds()).distance_to_point(p.x, p.y),
            _ => self
                .segments()
                .iter()
                .map(|s| s.nearest(p, NEAREST_ACCURACY).distance_sq)
                .fold(f64::INFINITY, f64::min)
                .sqrt(),
        }
    }

    /// Characteristic points offered for snapping.
    pub fn snap_points(&self) -> Vec<(SnapKind, Point)> {
        match self {
            Self::Point(p) => vec![(SnapKind::Node, *p)],
            Self::Line(l) => vec![
                (SnapKind::Endpoint, l.p0),
                (SnapKind::Endpoint, l.p1),
                (SnapKind::Midpoint, l.p0.midpoint(l.p1)),
            ],
            Self::Arc(a) => vec![
                (SnapKind::Endpoint, arc_point(a, a.start_angle)),
                (SnapKind::Endpoint, arc_point(a, a.start_angle + a.sweep_angle)),
                (
                    SnapKind::Midpoint,
                    arc_point(a, a.start_angle + a.sweep_angle / 2.0),
                ),
                (SnapKind::Center, a.center),
            ],
            Self::Circle(c) => vec![(SnapKind::Center, c.center)],
            Self::Text { insertion, .. } => vec![(SnapKind::Insertion, *insertion)],
            Self::Dimension { start, end, offset } => {
                let shift = dimension_normal(*start, *end) * *offset;
                vec![
                    (SnapKind::Node, *start),
                    (SnapKind::Node, *end),
                    (SnapKind::Endpoint, *start + shift),
                    (SnapKind::Endpoint, *end + shift),
                ]
            }
        }
    }

    /// Whether the geometry has any part inside `region` (closed).
    ///
    /// A circle that encloses the region without its outline entering it does
    /// not touch it.
    pub fn touches(&self, region: Rect) -> bool {
        let area = rect_boundary(region);
        match self {
            Self::Point(p) => area.contains_point(p.x, p.y),
            Self::Text { .. } => area.intersects(&rect_boundary(self.bounds())),
            _ => {
                let edges = [
                    Line::new((region.x0, region.y0), (region.x1, region.y0)),
                    Line::new((region.x1, region.y0), (region.x1, region.y1)),
                    Line::new((region.x1, region.y1), (region.x0, region.y1)),
                    Line::new((region.x0, region.y1), (region.x0, region.y0)),
                ];
                self.segments().iter().any(|s| {
                    let (a, b) = (s.start(), s.end());
                    area.contains_point(a.x, a.y)
                        || area.contains_point(b.x, b.y)
                        || edges.iter().any(|e| !s.intersect_line(*e).is_empty())
                })
            }
        }
    }

    /// Value equality: same kind and same defining coordinates.
    pub fn same_shape(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Point(a), Self::Point(b)) => a == b,
            (Self::Line(a), Self::Line(b)) => a.p0 == b.p0 && a.p1 == b.p1,
            (Self::Arc(a), Self::Arc(b)) => {
                a.center == b.center
                    && a.radii == b.radii
                    && a.start_angle == b.start_angle
                    && a.sweep_angle == b.sweep_angle
                    && a.x_rotation == b.x_rotation
            }
            (Self::Circle(a), Self::Circle(b)) => a.center == b.center && a.radius == b.radius,
            (
                Self::Text {
                    insertion: ia,
                    height: ha,
                    content: ca,
                },
                Self::Text {
                    insertion: ib,
                    height: hb,
                    content: cb,
                },
            ) => ia == ib && ha == hb && ca == cb,
            (
                Self::Dimension {
                    start: sa,
                    end: ea,
                    offset: oa,
                },
                Self::Dimension {
                    start: sb,
                    end: eb,
                    offset: ob,
                },
            ) => sa == sb && ea == eb && oa == ob,
            _ => false,
        }
    }
}

fn arc_point(a: &Arc, angle: f64) -> Point {
    let (s, c) = angle.sin_cos();
    let local = Affine::rotate(a.x_rotation) * Point::new(a.radii.x * c, a.radii.y * s);
    a.center + local.to_vec2()
}

/// Unit normal to the left of `start -> end`; straight up for a degenerate pair.
fn dimension_normal(start: Point, end: Point) -> Vec2 {
    let d = end - start;
    let len = d.hypot();
    if len == 0.0 {
        return Vec2::new(0.0, 1.0);
    }
    Vec2::new(-d.y / len, d.x / len)
}

pub(crate) fn rect_boundary(r: Rect) -> Boundary {
    let r = r.abs();
    Boundary::new(r.x0, r.y0, r.x1, r.y1)
}

/// One entity as stored in the index: identity, geometry, and indexing extents.
#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    geometry: Geometry,
    extents: Boundary,
}

impl Entity {
    pub(crate) fn new(id: EntityId, geometry: Geometry) -> Self {
        // Index extents also cover snap points, so an arc is found near its centre.
        let extents = geometry
            .snap_points()
            .into_iter()
            .fold(geometry.bounds(), |r, (_, p)| r.union_pt(p));
        Self {
            id,
            geometry,
            extents: rect_boundary(extents),
        }
    }

    /// Identity on the owning layer.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
}

impl SpatialEntity for Entity {
    type Id = EntityId;
    const SUPPORTS_VALUE_EQ: bool = true;

    fn id(&self) -> EntityId {
        self.id
    }

    fn bounds(&self) -> Boundary {
        self.extents
    }

    fn anchor(&self) -> (f64, f64) {
        let p = self.geometry.anchor();
        (p.x, p.y)
    }

    fn distance_to(&self, x: f64, y: f64) -> f64 {
        self.geometry.distance_to(Point::new(x, y))
    }

    fn value_eq(&self, other: &Self) -> bool {
        self.geometry.same_shape(&other.geometry)
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, PI};

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn line_distance_and_snaps() {
        let g = Geometry::Line(Line::new((0.0, 0.0), (10.0, 0.0)));
        assert!(close(g.distance_to(Point::new(5.0, 3.0)), 3.0));
        assert!(close(g.distance_to(Point::new(13.0, 4.0)), 5.0));
        let mids: Vec<_> = g
            .snap_points()
            .into_iter()
            .filter(|(k, _)| *k == SnapKind::Midpoint)
            .collect();
        assert_eq!(mids, vec![(SnapKind::Midpoint, Point::new(5.0, 0.0))]);
    }

    #[test]
    fn arc_snaps_follow_sweep() {
        // Quarter arc from east to north.
        let g = Geometry::arc(Point::new(0.0, 0.0), 10.0, 0.0, FRAC_PI_2);
        let pts = g.snap_points();
        let (_, start) = pts[0];
        let (_, end) = pts[1];
        let (_, mid) = pts[2];
        assert!(close(start.x, 10.0) && close(start.y, 0.0));
        assert!(close(end.x, 0.0) && close(end.y, 10.0));
        assert!(close(mid.x, mid.y));
        assert_eq!(pts[3], (SnapKind::Center, Point::ZERO));

        // On the arc, and off it beyond the sweep.
        assert!(g.distance_to(Point::new(0.0, 12.0)) < 2.0 + 1e-2);
        let past = g.distance_to(Point::new(0.0, -10.0));
        assert!(past > 14.0, "south point is nearest to the start endpoint, got {past}");
    }

    #[test]
    fn circle_distance_is_to_outline() {
        let g = Geometry::Circle(Circle::new((0.0, 0.0), 5.0));
        assert!(close(g.distance_to(Point::new(0.0, 0.0)), 5.0));
        assert!(close(g.distance_to(Point::new(8.0, 0.0)), 3.0));
    }

    #[test]
    fn touches_distinguishes_outline_from_interior() {
        let circle = Geometry::Circle(Circle::new((0.0, 0.0), 50.0));
        assert!(!circle.touches(Rect::new(-5.0, -5.0, 5.0, 5.0)));
        assert!(circle.touches(Rect::new(45.0, -5.0, 55.0, 5.0)));

        let line = Geometry::Line(Line::new((-10.0, 0.0), (10.0, 0.0)));
        assert!(line.touches(Rect::new(-1.0, -1.0, 1.0, 1.0)), "crosses the box");
        assert!(!line.touches(Rect::new(-1.0, 1.0, 1.0, 2.0)));
    }

    #[test]
    fn dimension_offsets_to_the_left() {
        let g = Geometry::Dimension {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 0.0),
            offset: 2.0,
        };
        let b = g.bounds();
        assert_eq!(b, Rect::new(0.0, 0.0, 10.0, 2.0));
        assert!(close(g.distance_to(Point::new(5.0, 3.0)), 1.0));
    }

    #[test]
    fn text_box_grows_with_content() {
        let g = Geometry::Text {
            insertion: Point::new(1.0, 1.0),
            height: 2.0,
            content: "ABCDE".to_owned(),
        };
        assert_eq!(g.bounds(), Rect::new(1.0, 1.0, 7.0, 3.0));
        assert_eq!(g.distance_to(Point::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn value_equality_ignores_identity() {
        let a = Entity::new(EntityId::new(0, 1), Geometry::Point(Point::new(1.0, 2.0)));
        let b = Entity::new(EntityId::new(1, 1), Geometry::Point(Point::new(1.0, 2.0)));
        let c = Entity::new(
            EntityId::new(2, 1),
            Geometry::arc(Point::new(1.0, 2.0), 1.0, 0.0, PI),
        );
        assert!(a.value_eq(&b));
        assert!(!a.value_eq(&c));
        assert_ne!(SpatialEntity::id(&a), SpatialEntity::id(&b));
    }

    #[test]
    fn arc_extents_cover_centre() {
        let e = Entity::new(
            EntityId::new(0, 1),
            Geometry::arc(Point::new(0.0, 0.0), 10.0, 0.0, 0.2),
        );
        assert!(SpatialEntity::bounds(&e).contains_point(0.0, 0.0));
        assert!(!rect_boundary(e.geometry().bounds()).contains_point(0.0, 0.0));
    }
}
