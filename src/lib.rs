// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! pyrocsg - a boolean CSG kernel over closed polyhedral meshes, built for
//! fire-dynamics-simulation geometry preprocessing.
//!
//! The mesh substrate ([`geometry::Mesh`]) is a vertex-indexed polygon
//! soup rather than a triangle-only structure, so a union/intersection/
//! difference pipeline ([`geometry::union`], [`geometry::intersection`],
//! [`geometry::difference`]) can preserve coplanar faces as single
//! n-gons instead of fragmenting them into triangles.

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;

pub use config::Tolerance;
pub use error::CsgError;
pub use geometry::{difference, intersection, union, BspNode, Mesh, Plane, Vector};
