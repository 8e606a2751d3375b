// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and CSG operations.

pub mod boolean;
pub mod bsp;
pub mod halfedge;
pub mod mesh;
pub mod plane;
pub mod vector;

pub use boolean::{difference, intersection, union};
pub use bsp::BspNode;
pub use halfedge::{HalfEdge, HalfEdgeMap};
pub use mesh::Mesh;
pub use plane::Plane;
pub use vector::Vector;
