// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean operations between two closed meshes, driven by a pair of BSP
//! trees. `Mesh` itself carries no union/intersection/difference methods;
//! the recipes live here, each built from `clip_to`/`invert`/`append`.

use super::bsp::BspNode;
use super::mesh::Mesh;
use crate::config::Tolerance;
use crate::error::CsgError;

/// `a ∪ b`.
pub fn union(mesh_a: &Mesh, mesh_b: &Mesh, tol: &Tolerance) -> Result<Mesh, CsgError> {
    let (mut a, mut tree_a, mut b, mut tree_b) = build_pair(mesh_a, mesh_b, tol)?;

    tree_a.clip_to(&mut a, tol, &tree_b)?;
    tree_b.clip_to(&mut b, tol, &tree_a)?;
    tree_b.invert(&mut b);
    tree_b.clip_to(&mut b, tol, &tree_a)?;
    tree_b.invert(&mut b);

    tree_a.append(&mut a, tol, &b)?;
    tree_a.merge_polygons_to_concave(&mut a)?;
    tree_a.sync_geom(&mut a);
    Ok(a)
}

/// `a ∩ b`.
pub fn intersection(mesh_a: &Mesh, mesh_b: &Mesh, tol: &Tolerance) -> Result<Mesh, CsgError> {
    let (mut a, mut tree_a, mut b, mut tree_b) = build_pair(mesh_a, mesh_b, tol)?;

    tree_a.invert(&mut a);
    tree_b.clip_to(&mut b, tol, &tree_a)?;
    tree_b.invert(&mut b);
    tree_a.clip_to(&mut a, tol, &tree_b)?;
    tree_b.clip_to(&mut b, tol, &tree_a)?;
    tree_a.append(&mut a, tol, &b)?;
    tree_a.invert(&mut a);
    tree_a.merge_polygons_to_concave(&mut a)?;
    tree_a.sync_geom(&mut a);
    Ok(a)
}

/// `a \ b`.
pub fn difference(mesh_a: &Mesh, mesh_b: &Mesh, tol: &Tolerance) -> Result<Mesh, CsgError> {
    let (mut a, mut tree_a, mut b, mut tree_b) = build_pair(mesh_a, mesh_b, tol)?;

    tree_a.invert(&mut a);
    tree_a.clip_to(&mut a, tol, &tree_b)?;
    tree_b.clip_to(&mut b, tol, &tree_a)?;
    tree_b.invert(&mut b);
    tree_b.clip_to(&mut b, tol, &tree_a)?;
    tree_b.invert(&mut b);
    tree_a.append(&mut a, tol, &b)?;
    tree_a.invert(&mut a);
    tree_a.merge_polygons_to_concave(&mut a)?;
    tree_a.sync_geom(&mut a);
    Ok(a)
}

fn build_pair(
    mesh_a: &Mesh,
    mesh_b: &Mesh,
    tol: &Tolerance,
) -> Result<(Mesh, BspNode, Mesh, BspNode), CsgError> {
    let mut a = mesh_a.clone();
    let mut b = mesh_b.clone();
    let mut tree_a = BspNode::new();
    let mut tree_b = BspNode::new();
    tree_a.build(&mut a, tol, None)?;
    tree_b.build(&mut b, tol, None)?;
    Ok((a, tree_a, b, tree_b))
}
