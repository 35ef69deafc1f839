// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer errors.

use strata_quadtree::QuadtreeError;

use crate::types::EntityId;

/// Errors reported by a [`Layer`](crate::Layer).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayerError {
    /// The spatial index rejected the operation.
    #[error(transparent)]
    Index(#[from] QuadtreeError),
    /// The id is stale or was never issued by this layer.
    #[error("{0:?} does not refer to an entity on this layer")]
    UnknownEntity(EntityId),
    /// Configuration could not be parsed or is out of range.
    #[error("invalid layer configuration: {0}")]
    Config(String),
}

/// Result alias for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;
