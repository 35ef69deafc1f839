// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer settings.

use serde::{Deserialize, Serialize};
use strata_quadtree::QuadtreeConfig;

use crate::error::{LayerError, LayerResult};

/// Layer configuration, usually read from the `[layer]` table of a drawing
/// settings file.
///
/// ```
/// use strata_layer::LayerConfig;
///
/// let cfg = LayerConfig::from_toml_str(
///     r#"
///     pick_tolerance = 1.5
///
///     [quadtree]
///     threshold = 32
///     "#,
/// )
/// .unwrap();
/// assert_eq!(cfg.quadtree.threshold, 32);
/// assert_eq!(cfg.pick_tolerance, 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LayerConfig {
    /// Settings for the spatial index.
    #[serde(default)]
    pub quadtree: QuadtreeConfig,
    /// Radius used by [`Layer::snap`](crate::Layer::snap), in drawing units.
    #[serde(default = "default_snap_tolerance")]
    pub snap_tolerance: f64,
    /// Radius used by [`Layer::pick`](crate::Layer::pick), in drawing units.
    #[serde(default = "default_pick_tolerance")]
    pub pick_tolerance: f64,
}

fn default_snap_tolerance() -> f64 {
    5.0
}
fn default_pick_tolerance() -> f64 {
    3.0
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            quadtree: QuadtreeConfig::default(),
            snap_tolerance: default_snap_tolerance(),
            pick_tolerance: default_pick_tolerance(),
        }
    }
}

impl LayerConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> LayerResult<Self> {
        let cfg: Self = toml::from_str(s).map_err(|e| LayerError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject negative or non-finite tolerances and an invalid index configuration.
    pub fn validate(&self) -> LayerResult<()> {
        self.quadtree.validate()?;
        for (name, v) in [
            ("snap_tolerance", self.snap_tolerance),
            ("pick_tolerance", self.pick_tolerance),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(LayerError::Config(format!(
                    "{name} must be finite and non-negative (got {v})"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strata_quadtree::QuadtreeError;

    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        assert_eq!(LayerConfig::from_toml_str("").unwrap(), LayerConfig::default());
    }

    #[test]
    fn nested_index_errors_pass_through() {
        let err = LayerConfig::from_toml_str("[quadtree]\nthreshold = 0").unwrap_err();
        assert_eq!(err, LayerError::Index(QuadtreeError::InvalidThreshold(0)));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let err = LayerConfig::from_toml_str("snap_tolerance = -1.0").unwrap_err();
        assert!(matches!(err, LayerError::Config(_)));
    }
}
