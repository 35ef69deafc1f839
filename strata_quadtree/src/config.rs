// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning knobs for a [`Quadtree`](crate::Quadtree).

use serde::{Deserialize, Serialize};

use crate::error::{QuadResult, QuadtreeError};
use crate::policy::SplitPolicy;

pub(crate) const DEFAULT_THRESHOLD: usize = 8;
pub(crate) const DEFAULT_MAX_DEPTH: usize = 24;

/// Quadtree configuration.
///
/// Every field has a default, so a partial TOML table is enough:
///
/// ```
/// use strata_quadtree::QuadtreeConfig;
///
/// let cfg = QuadtreeConfig::from_toml_str("threshold = 16").unwrap();
/// assert_eq!(cfg.threshold, 16);
/// assert!(cfg.dedup_values);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuadtreeConfig {
    /// Entities a leaf tolerates before subdivision is considered.
    #[serde(default = "default_threshold")]
    pub threshold: usize,
    /// Depth at which nodes stop subdividing.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Ignore value-identical entities when deciding to subdivide.
    #[serde(default = "default_dedup_values")]
    pub dedup_values: bool,
}

fn default_threshold() -> usize {
    DEFAULT_THRESHOLD
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_dedup_values() -> bool {
    true
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            max_depth: default_max_depth(),
            dedup_values: default_dedup_values(),
        }
    }
}

impl QuadtreeConfig {
    /// Default configuration with a different threshold.
    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Parse a TOML document and validate it.
    pub fn from_toml_str(s: &str) -> QuadResult<Self> {
        let cfg: Self = toml::from_str(s).map_err(|e| QuadtreeError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> QuadResult<()> {
        if self.threshold < 1 {
            return Err(QuadtreeError::InvalidThreshold(self.threshold));
        }
        if self.max_depth < 1 {
            return Err(QuadtreeError::Config(
                "max_depth must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// The split policy this configuration describes.
    pub fn policy(&self) -> SplitPolicy {
        SplitPolicy::new(self.dedup_values, self.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = QuadtreeConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, QuadtreeConfig::default());
    }

    #[test]
    fn zero_threshold_is_rejected() {
        let err = QuadtreeConfig::from_toml_str("threshold = 0").unwrap_err();
        assert_eq!(err, QuadtreeError::InvalidThreshold(0));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = QuadtreeConfig::from_toml_str("threshold = \"many\"").unwrap_err();
        assert!(matches!(err, QuadtreeError::Config(_)));
    }

    #[test]
    fn policy_reflects_flags() {
        let cfg = QuadtreeConfig {
            dedup_values: false,
            max_depth: 3,
            ..QuadtreeConfig::default()
        };
        let p = cfg.policy();
        assert!(!p.dedup_values());
        assert_eq!(p.max_depth(), 3);
    }
}
