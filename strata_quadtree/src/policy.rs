// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split policy: decides whether a leaf may subdivide.
//!
//! A leaf is a split candidate once its population exceeds its threshold.
//! With value deduplication enabled (the default) the leaf must additionally
//! hold more than `threshold` *distinct* values. Value-identical entities (for
//! example coincident points) can never be separated by a midline split, so
//! counting them would subdivide forever.

use crate::entity::SpatialEntity;

/// Decision procedure consulted by [`QuadNode::can_subdivide`](crate::QuadNode::can_subdivide).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SplitPolicy {
    dedup_values: bool,
    max_depth: usize,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self::new(true, crate::config::DEFAULT_MAX_DEPTH)
    }
}

impl SplitPolicy {
    /// Create a policy.
    ///
    /// `dedup_values` enables the equality scan for entity types that support
    /// it. Nodes at `max_depth` never subdivide.
    pub const fn new(dedup_values: bool, max_depth: usize) -> Self {
        Self {
            dedup_values,
            max_depth,
        }
    }

    /// A policy that only compares population against the threshold.
    pub const fn population_only(max_depth: usize) -> Self {
        Self::new(false, max_depth)
    }

    /// Depth at which nodes stop subdividing. The root is depth 0.
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether value deduplication is active.
    pub const fn dedup_values(&self) -> bool {
        self.dedup_values
    }

    /// Whether a leaf at `depth` holding `objects` may subdivide.
    pub fn can_subdivide<E: SpatialEntity>(
        &self,
        objects: &[E],
        threshold: usize,
        depth: usize,
    ) -> bool {
        if objects.len() <= threshold || depth >= self.max_depth {
            return false;
        }
        if !(self.dedup_values && E::SUPPORTS_VALUE_EQ) {
            return true;
        }
        distinct_exceeds(objects, threshold)
    }
}

/// Quadratic scan counting pairwise-distinct values, stopping as soon as the
/// count passes `limit`.
fn distinct_exceeds<E: SpatialEntity>(objects: &[E], limit: usize) -> bool {
    let mut distinct: Vec<&E> = Vec::with_capacity(limit + 1);
    for obj in objects {
        if distinct.iter().any(|seen| E::value_eq(seen, obj)) {
            continue;
        }
        distinct.push(obj);
        if distinct.len() > limit {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::PointEntity;
    use crate::types::Boundary;

    fn pts(coords: &[(f64, f64)]) -> Vec<PointEntity> {
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| PointEntity::new(i as u64, x, y))
            .collect()
    }

    #[test]
    fn population_must_exceed_threshold() {
        let p = SplitPolicy::default();
        let objs = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(!p.can_subdivide(&objs, 3, 0));
        assert!(p.can_subdivide(&objs, 2, 0));
    }

    #[test]
    fn identical_values_never_split() {
        let p = SplitPolicy::default();
        let objs = pts(&[(4.0, 4.0); 10]);
        assert!(!p.can_subdivide(&objs, 5, 0));

        // Without dedup the same population is a candidate.
        let plain = SplitPolicy::population_only(8);
        assert!(plain.can_subdivide(&objs, 5, 0));
    }

    #[test]
    fn distinct_count_must_also_exceed() {
        let p = SplitPolicy::default();
        // Six objects but only three distinct positions.
        let objs = pts(&[
            (1.0, 1.0),
            (1.0, 1.0),
            (2.0, 2.0),
            (2.0, 2.0),
            (3.0, 3.0),
            (3.0, 3.0),
        ]);
        assert!(!p.can_subdivide(&objs, 3, 0));
        assert!(p.can_subdivide(&objs, 2, 0));
    }

    #[test]
    fn depth_limit_blocks_split() {
        let p = SplitPolicy::new(true, 2);
        let objs = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(p.can_subdivide(&objs, 1, 1));
        assert!(!p.can_subdivide(&objs, 1, 2));
    }

    #[derive(Clone)]
    struct Opaque(u32);

    impl SpatialEntity for Opaque {
        type Id = u32;
        fn id(&self) -> u32 {
            self.0
        }
        fn bounds(&self) -> Boundary {
            Boundary::from_point(0.0, 0.0)
        }
    }

    #[test]
    fn types_without_equality_use_population() {
        let p = SplitPolicy::default();
        let objs = [Opaque(1), Opaque(2), Opaque(3)];
        assert!(p.can_subdivide(&objs, 2, 0));
    }
}
