// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel error types.
//!
//! Classifies every kernel-level failure into one of four categories:
//! malformed construction, degenerate geometry, mesh invariant violation,
//! and split pathology. Boundary code (file I/O, CLI argument handling)
//! uses `anyhow` and wraps these via `#[from]`.

use thiserror::Error;

/// Errors raised by the geometry kernel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsgError {
    /// Construction-time data doesn't satisfy the mesh's own invariants,
    /// e.g. mismatched surfid/polygon counts or a polygon index out of range.
    #[error("malformed mesh construction: {reason}")]
    MalformedConstruction { reason: String },

    /// A polygon could not be triangulated or has no well-defined plane.
    #[error("degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    /// A completed mesh fails a topological sanity check.
    #[error("mesh invariant violation: {reason}")]
    MeshInvariantViolation { reason: String },

    /// A plane split hit a cutting plane parallel to a spanning edge.
    #[error("split pathology: plane parallel to spanning edge in polygon {polygon}")]
    SplitPathology { polygon: usize },
}

impl CsgError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedConstruction {
            reason: reason.into(),
        }
    }

    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    pub fn loose_verts() -> Self {
        Self::MeshInvariantViolation {
            reason: "loose vertices present".to_string(),
        }
    }

    pub fn non_manifold(polygon: usize) -> Self {
        Self::MeshInvariantViolation {
            reason: format!(
                "non-manifold or unorientable at polygon {polygon}: duplicate directed edge"
            ),
        }
    }

    pub fn not_closed(border_polygons: &[usize]) -> Self {
        Self::MeshInvariantViolation {
            reason: format!("non-closed, border half-edges at polygons {border_polygons:?}"),
        }
    }

    pub fn split_pathology(polygon: usize) -> Self {
        Self::SplitPathology { polygon }
    }
}

pub type Result<T> = std::result::Result<T, CsgError>;
