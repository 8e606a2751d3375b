// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary Space Partitioning tree over a [`Mesh`]'s polygons.
//!
//! A `BspNode` holds no reference to its mesh; every method that needs the
//! mesh takes it as an explicit `&mut Mesh` parameter instead. The tree is
//! pure topology (a plane, the polygon indices coplanar with it, and two
//! optional children); pairing one tree with one mesh is the caller's
//! responsibility, exactly as it is in the data model's ownership rules.

use super::mesh::Mesh;
use super::plane::Plane;
use crate::config::Tolerance;
use crate::error::CsgError;

#[derive(Debug, Default, Clone)]
pub struct BspNode {
    plane: Option<Plane>,
    ipolygons: Vec<usize>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
}

impl BspNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plane(&self) -> Option<&Plane> {
        self.plane.as_ref()
    }

    pub fn ipolygons(&self) -> &[usize] {
        &self.ipolygons
    }

    pub fn front(&self) -> Option<&BspNode> {
        self.front.as_deref()
    }

    pub fn back(&self) -> Option<&BspNode> {
        self.back.as_deref()
    }

    /// Builds a BSP over `ipolygons` (or every polygon in `mesh` when
    /// `None`). Calling `build` again on an existing tree with further
    /// polygons (from the same mesh) filters them down to the bottom of
    /// the tree and grows new nodes there.
    pub fn build(
        &mut self,
        mesh: &mut Mesh,
        tol: &Tolerance,
        ipolygons: Option<Vec<usize>>,
    ) -> Result<(), CsgError> {
        let ipolygons = ipolygons.unwrap_or_else(|| mesh.get_ipolygons());
        if ipolygons.is_empty() {
            return Ok(());
        }

        let mut start = 0;
        if self.plane.is_none() {
            self.plane = Some(mesh.get_plane_of_polygon(ipolygons[0])?);
            self.ipolygons.push(ipolygons[0]);
            start = 1;
        }
        let plane = self.plane.expect("just set above");

        let mut front = Vec::new();
        let mut back = Vec::new();
        for &ipolygon in &ipolygons[start..] {
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            mesh.split_polygon(
                ipolygon,
                &plane,
                tol,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            )?;
            self.ipolygons.append(&mut coplanar_front);
            self.ipolygons.append(&mut coplanar_back);
        }

        if !front.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(BspNode::new()))
                .build(mesh, tol, Some(front))?;
        }
        if !back.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(BspNode::new()))
                .build(mesh, tol, Some(back))?;
        }
        Ok(())
    }

    /// Flips every contained polygon's winding (once, on `mesh`) and
    /// inverts the tree's own planes/children so it represents the
    /// complementary solid.
    pub fn invert(&mut self, mesh: &mut Mesh) {
        mesh.flip();
        self.invert_tree();
    }

    fn invert_tree(&mut self) {
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert_tree();
        }
        if let Some(back) = &mut self.back {
            back.invert_tree();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Removes, from `ipolygons`, every polygon that lies inside the solid
    /// this tree represents. Front of a leaf is outside (kept); back of a
    /// leaf is inside (discarded).
    pub fn clip_polygons(
        &self,
        mesh: &mut Mesh,
        tol: &Tolerance,
        ipolygons: Vec<usize>,
    ) -> Result<Vec<usize>, CsgError> {
        let Some(plane) = self.plane else {
            return Ok(ipolygons);
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for ipolygon in ipolygons {
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            mesh.split_polygon(
                ipolygon,
                &plane,
                tol,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            )?;
            // Coplanar-front (same orientation as this plane) is outside
            // the solid on this side, coplanar-back is inside it.
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);
        }

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(mesh, tol, front)?,
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(mesh, tol, back)?,
            None => Vec::new(),
        };

        front.extend(back);
        Ok(front)
    }

    /// Replaces this node's coplanar polygons by clipping them against
    /// `other`, then recurses into both children.
    pub fn clip_to(
        &mut self,
        mesh: &mut Mesh,
        tol: &Tolerance,
        other: &BspNode,
    ) -> Result<(), CsgError> {
        let ipolygons = std::mem::take(&mut self.ipolygons);
        self.ipolygons = other.clip_polygons(mesh, tol, ipolygons)?;
        if let Some(front) = &mut self.front {
            front.clip_to(mesh, tol, other)?;
        }
        if let Some(back) = &mut self.back {
            back.clip_to(mesh, tol, other)?;
        }
        Ok(())
    }

    /// Pre-order traversal collecting every coplanar polygon index still
    /// referenced by the tree.
    pub fn get_all_ipolygons(&self) -> Vec<usize> {
        let mut out = self.ipolygons.clone();
        if let Some(front) = &self.front {
            out.extend(front.get_all_ipolygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.get_all_ipolygons());
        }
        out
    }

    /// Merges `other`'s mesh into `mesh` and grows this tree over the
    /// newly-added polygons.
    pub fn append(
        &mut self,
        mesh: &mut Mesh,
        tol: &Tolerance,
        other_mesh: &Mesh,
    ) -> Result<(), CsgError> {
        let new_ipolygons = mesh.append(other_mesh, tol);
        self.build(mesh, tol, Some(new_ipolygons))
    }

    /// Rewrites `mesh`'s polygon and surfid lists to contain exactly the
    /// polygons still referenced by the tree. The vertex array is left
    /// uncompacted.
    pub fn sync_geom(&self, mesh: &mut Mesh) {
        let mut new_polygons = Vec::new();
        let mut new_surfids = Vec::new();
        for ipolygon in self.get_all_ipolygons() {
            new_polygons.push(mesh.get_polygon(ipolygon).to_vec());
            new_surfids.push(mesh.get_polygon_surfid(ipolygon));
        }
        *mesh = Mesh::new(
            mesh.verts_owned(),
            new_polygons,
            Some(new_surfids),
            mesh.hid.clone(),
        )
        .expect("rebuilt mesh preserves vertex range invariants");
    }

    /// Fuses coplanar neighbor polygons sharing a directed edge and its
    /// reverse, when they carry the same surfid, into one concave polygon.
    /// Only merges within this node's own coplanar list, not its children
    /// — the source leaves that recursion as an explicit, never-finished
    /// FIXME, so it's left unfinished here too. Re-derived from scratch:
    /// the source's own merge routine references undefined variables and
    /// cannot be replicated directly.
    pub fn merge_polygons_to_concave(&mut self, mesh: &mut Mesh) -> Result<(), CsgError> {
        loop {
            let halfedges = mesh.get_halfedges(Some(&self.ipolygons))?;
            let mut merged = None;
            'search: for &ipolygon0 in &self.ipolygons {
                let polygon0 = mesh.get_polygon(ipolygon0).to_vec();
                let n = polygon0.len();
                for i in 0..n {
                    let edge = (polygon0[i], polygon0[(i + 1) % n]);
                    let reverse = (edge.1, edge.0);
                    if let Some(ipolygon1) = halfedges.get(reverse) {
                        if ipolygon1 == ipolygon0 {
                            continue;
                        }
                        if mesh.get_polygon_surfid(ipolygon0) == mesh.get_polygon_surfid(ipolygon1)
                        {
                            merged = Some((edge, ipolygon0, ipolygon1));
                            break 'search;
                        }
                    }
                }
            }
            let Some((edge, ipolygon0, ipolygon1)) = merged else {
                return Ok(());
            };
            self.merge_coplanar_polygons(mesh, edge, ipolygon0, ipolygon1);
        }
    }

    /// Splices `polygon0` and `polygon1` at their shared directed edge
    /// `edge = (u, v)`: rotate polygon0 so it ends at `u`, rotate polygon1
    /// so it starts right after `v` (i.e. skipping the reverse edge), and
    /// concatenate. `polygon1`'s slot is dropped from the node.
    fn merge_coplanar_polygons(
        &mut self,
        mesh: &mut Mesh,
        edge: (usize, usize),
        ipolygon0: usize,
        ipolygon1: usize,
    ) {
        let polygon0 = mesh.get_polygon(ipolygon0).to_vec();
        let polygon1 = mesh.get_polygon(ipolygon1).to_vec();

        let i0 = polygon0.iter().position(|&v| v == edge.1).unwrap();
        let i1 = polygon1.iter().position(|&v| v == edge.0).unwrap();

        // polygon0 rotated to end right after edge.1 (its occurrence of
        // the shared edge's far endpoint), then polygon1 rotated to start
        // right after its occurrence of the shared edge's near endpoint
        // (i.e. skipping the reverse edge entirely), with the two
        // duplicated shared-edge vertices merged into one seam.
        let mut spliced: Vec<usize> = polygon0[..=i0].to_vec();
        spliced.extend_from_slice(&polygon1[(i1 + 1)..]);
        spliced.extend_from_slice(&polygon1[..i1]);
        spliced.extend_from_slice(&polygon0[(i0 + 1)..]);

        mesh.update_polygon(ipolygon0, spliced);
        self.ipolygons.retain(|&p| p != ipolygon1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::vector::Vector;

    fn tetrahedron() -> Mesh {
        Mesh::new(
            vec![-1.0, -1.0, 0.0, 1.0, -1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            vec![vec![2, 1, 0], vec![0, 1, 3], vec![1, 2, 3], vec![2, 0, 3]],
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn build_over_tetrahedron_has_depth_four() {
        let mut mesh = tetrahedron();
        let tol = Tolerance::default();
        let mut root = BspNode::new();
        root.build(&mut mesh, &tol, None).unwrap();

        let mut depth = 0;
        let mut node = &root;
        loop {
            depth += 1;
            assert_eq!(node.ipolygons().len(), 1);
            match node.back() {
                Some(back) => node = back,
                None => break,
            }
        }
        assert_eq!(depth, 4);
        assert!(root.front().is_none());
    }

    #[test]
    fn invert_twice_restores_tree() {
        let mut mesh = tetrahedron();
        let tol = Tolerance::default();
        let mut root = BspNode::new();
        root.build(&mut mesh, &tol, None).unwrap();
        let before = root.get_all_ipolygons();

        root.invert(&mut mesh);
        root.invert(&mut mesh);

        assert_eq!(root.get_all_ipolygons(), before);
        assert!(mesh.check_is_solid().is_ok());
    }

    #[test]
    fn cube_union_with_itself_is_itself() {
        let cube = unit_cube();
        let tol = Tolerance::default();

        let mut mesh_a = cube.clone();
        let mut mesh_b = cube;
        let mut a = BspNode::new();
        let mut b = BspNode::new();
        a.build(&mut mesh_a, &tol, None).unwrap();
        b.build(&mut mesh_b, &tol, None).unwrap();

        a.clip_to(&mut mesh_a, &tol, &b).unwrap();
        b.clip_to(&mut mesh_b, &tol, &a).unwrap();
        b.invert(&mut mesh_b);
        b.clip_to(&mut mesh_b, &tol, &a).unwrap();
        b.invert(&mut mesh_b);
        a.append(&mut mesh_a, &tol, &mesh_b).unwrap();
        a.sync_geom(&mut mesh_a);

        assert!(mesh_a.check_is_solid().is_ok());
        // Self-union may leave coincident duplicate faces rather than a
        // single deduped shell, so only check the volume isn't lost or
        // doubled outright.
        let volume = cube_volume_estimate(&mesh_a);
        assert!(volume > 4.0 && volume < 16.0);
    }

    fn unit_cube() -> Mesh {
        Mesh::new(
            vec![
                -1.0, -1.0, -1.0, -1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0,
                1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0,
            ],
            vec![
                vec![0, 1, 2, 3],
                vec![7, 6, 5, 4],
                vec![1, 7, 4, 2],
                vec![0, 3, 5, 6],
                vec![1, 0, 6, 7],
                vec![2, 4, 5, 3],
            ],
            None,
            None,
        )
        .unwrap()
    }

    fn cube_volume_estimate(mesh: &Mesh) -> f64 {
        // Divergence-theorem volume estimate from triangulated faces,
        // used only to sanity-check the union fixture, not part of the
        // kernel's public surface.
        let mut volume = 0.0;
        for ipolygon in 0..mesh.get_npolygons() {
            for (i0, i1, i2) in mesh.get_tris_of_polygon(ipolygon).unwrap() {
                let a = mesh.get_vert(i0);
                let b = mesh.get_vert(i1);
                let c = mesh.get_vert(i2);
                volume += a.dot(b.cross(c)) / 6.0;
            }
        }
        volume.abs()
    }
}
