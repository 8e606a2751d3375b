// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Vertex-indexed polygon soup: the kernel's mesh substrate.
//!
//! A `Mesh` is a packed `f64` vertex array, a list of polygons (each a ring
//! of ≥3 vertex indices, counter-clockwise when viewed from outside), and
//! one material id (`surfid`) per polygon. Indices are never reused or
//! compacted within a single BSP pipeline run; splitting only appends.

use super::halfedge::HalfEdgeMap;
use super::plane::Plane;
use super::vector::Vector;
use crate::config::Tolerance;
use crate::error::CsgError;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// A vertex-indexed polygon soup with per-polygon material ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Packed vertex coordinates: vertex `i` occupies `verts[3i..3i+3]`.
    verts: Vec<f64>,
    polygons: Vec<Vec<usize>>,
    surfids: Vec<u32>,
    pub hid: Option<String>,
}

impl Mesh {
    pub fn new(
        verts: Vec<f64>,
        polygons: Vec<Vec<usize>>,
        surfids: Option<Vec<u32>>,
        hid: Option<String>,
    ) -> Result<Self, CsgError> {
        if verts.len() % 3 != 0 {
            return Err(CsgError::malformed(format!(
                "vertex array length {} is not a multiple of 3",
                verts.len()
            )));
        }
        let nverts = verts.len() / 3;
        for (ipolygon, polygon) in polygons.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(CsgError::malformed(format!(
                    "polygon {ipolygon} has fewer than 3 vertices"
                )));
            }
            for &ivert in polygon {
                if ivert >= nverts {
                    return Err(CsgError::malformed(format!(
                        "polygon {ipolygon} references out-of-range vertex {ivert}"
                    )));
                }
            }
        }
        let surfids = surfids.unwrap_or_else(|| vec![0; polygons.len()]);
        if surfids.len() != polygons.len() {
            return Err(CsgError::malformed(format!(
                "surfid count {} does not match polygon count {}",
                surfids.len(),
                polygons.len()
            )));
        }
        Ok(Self {
            verts,
            polygons,
            surfids,
            hid,
        })
    }

    pub fn empty() -> Self {
        Self {
            verts: Vec::new(),
            polygons: Vec::new(),
            surfids: Vec::new(),
            hid: None,
        }
    }

    // -- vertices --

    pub fn get_vert(&self, ivert: usize) -> Vector {
        Vector::new(
            self.verts[3 * ivert],
            self.verts[3 * ivert + 1],
            self.verts[3 * ivert + 2],
        )
    }

    pub fn append_vert(&mut self, v: Vector) -> usize {
        self.verts.push(v.x);
        self.verts.push(v.y);
        self.verts.push(v.z);
        self.get_nverts() - 1
    }

    pub fn get_nverts(&self) -> usize {
        self.verts.len() / 3
    }

    pub fn verts_owned(&self) -> Vec<f64> {
        self.verts.clone()
    }

    pub fn get_iverts(&self) -> Vec<usize> {
        (0..self.get_nverts()).collect()
    }

    // -- polygons --

    pub fn get_polygon(&self, ipolygon: usize) -> &[usize] {
        &self.polygons[ipolygon]
    }

    pub fn get_polygon_verts(&self, ipolygon: usize) -> Vec<Vector> {
        self.polygons[ipolygon]
            .iter()
            .map(|&ivert| self.get_vert(ivert))
            .collect()
    }

    pub fn get_polygon_surfid(&self, ipolygon: usize) -> u32 {
        self.surfids[ipolygon]
    }

    pub fn update_polygon(&mut self, ipolygon: usize, polygon: Vec<usize>) -> usize {
        self.polygons[ipolygon] = polygon;
        ipolygon
    }

    pub fn append_polygon(&mut self, polygon: Vec<usize>, surfid: u32) -> usize {
        self.polygons.push(polygon);
        self.surfids.push(surfid);
        self.get_npolygons() - 1
    }

    pub fn get_npolygons(&self) -> usize {
        self.polygons.len()
    }

    pub fn get_ipolygons(&self) -> Vec<usize> {
        (0..self.get_npolygons()).collect()
    }

    pub fn get_plane_of_polygon(&self, ipolygon: usize) -> Result<Plane, CsgError> {
        Plane::from_points(&self.get_polygon_verts(ipolygon))
    }

    /// Reverses every polygon's winding, flipping all normals.
    pub fn flip(&mut self) {
        for polygon in &mut self.polygons {
            polygon.reverse();
        }
    }

    /// Appends `other`'s vertices, polygons (re-indexed) and surfids to
    /// `self`, welds duplicate vertices, and returns the indices of the
    /// polygons that came from `other` (used by `BspNode::append` to grow
    /// an existing tree incrementally rather than rebuilding it).
    pub fn append(&mut self, other: &Mesh, tol: &Tolerance) -> Vec<usize> {
        let original_nverts = self.get_nverts();
        let original_npolygons = self.get_npolygons();

        self.verts.extend_from_slice(&other.verts);
        for polygon in &other.polygons {
            self.polygons
                .push(polygon.iter().map(|&i| i + original_nverts).collect());
        }
        self.surfids.extend_from_slice(&other.surfids);

        self.merge_duplicated_verts(tol);

        (original_npolygons..self.get_npolygons()).collect()
    }

    /// Naive O(n^2) weld: merges vertices within `tol.weld_eps` of each
    /// other, rewrites every polygon through the resulting old->new index
    /// map, and compacts the vertex array. Returns the number of vertices
    /// removed.
    pub fn merge_duplicated_verts(&mut self, tol: &Tolerance) -> usize {
        let nverts = self.get_nverts();
        let mut remap = vec![usize::MAX; nverts];
        let mut unique: Vec<Vector> = Vec::new();

        for i in 0..nverts {
            let v = self.get_vert(i);
            let mut found = None;
            for (j, &u) in unique.iter().enumerate() {
                if v.approx_eq(u, tol.weld_eps) {
                    found = Some(j);
                    break;
                }
            }
            match found {
                Some(j) => remap[i] = j,
                None => {
                    remap[i] = unique.len();
                    unique.push(v);
                }
            }
        }

        let removed = nverts - unique.len();
        if removed > 0 {
            let mut new_verts = Vec::with_capacity(unique.len() * 3);
            for v in &unique {
                new_verts.push(v.x);
                new_verts.push(v.y);
                new_verts.push(v.z);
            }
            self.verts = new_verts;
            for polygon in &mut self.polygons {
                for ivert in polygon.iter_mut() {
                    *ivert = remap[*ivert];
                }
            }
        }
        removed
    }

    // -- topology --

    pub fn get_halfedges(&self, ipolygons: Option<&[usize]>) -> Result<HalfEdgeMap, CsgError> {
        let owned;
        let ipolygons = match ipolygons {
            Some(p) => p,
            None => {
                owned = self.get_ipolygons();
                &owned
            }
        };
        HalfEdgeMap::build(&self.polygons, ipolygons)
    }

    pub fn get_border_halfedges(
        &self,
        ipolygons: Option<&[usize]>,
    ) -> Result<Vec<((usize, usize), usize)>, CsgError> {
        Ok(self.get_halfedges(ipolygons)?.borders())
    }

    // -- triangulation --

    fn get_earclip_of_polygon(
        polygon: &mut Vec<usize>,
        verts: &[Vector],
        normal: Vector,
    ) -> Result<(usize, usize, usize), CsgError> {
        let n = polygon.len();
        for i in 0..n - 1 {
            let i0 = polygon[i % n];
            let i1 = polygon[(i + 1) % n];
            let i2 = polygon[(i + 2) % n];
            let a = verts[i % n];
            let b = verts[(i + 1) % n];
            let c = verts[(i + 2) % n];
            let cross = b.minus(a).cross(c.minus(a));
            if cross.dot(normal) > 0.0 {
                polygon.remove((i + 1) % n);
                return Ok((i0, i1, i2));
            }
        }
        Err(CsgError::degenerate("triangulation impossible, no convex ear"))
    }

    /// Ear-clip triangulation against the polygon's own Newell normal.
    /// Collinear triples yield a zero cross and are skipped automatically.
    pub fn get_tris_of_polygon(
        &self,
        ipolygon: usize,
    ) -> Result<Vec<(usize, usize, usize)>, CsgError> {
        let mut polygon = self.polygons[ipolygon].clone();
        if polygon.len() == 3 {
            return Ok(vec![(polygon[0], polygon[1], polygon[2])]);
        }
        let normal = self.get_plane_of_polygon(ipolygon)?.normal;
        let mut tris = Vec::new();
        while polygon.len() > 2 {
            let verts: Vec<Vector> = polygon.iter().map(|&i| self.get_vert(i)).collect();
            let tri = Self::get_earclip_of_polygon(&mut polygon, &verts, normal)?;
            tris.push(tri);
        }
        Ok(tris)
    }

    // -- plane splitting --

    /// Splits `ipolygon` by `plane`, classifying it (and, if spanning,
    /// cutting it) into the four output lists, then cascades any new
    /// cut-vertex into the bordering polygon sharing the cut edge so the
    /// mesh stays manifold.
    #[allow(clippy::too_many_arguments)]
    pub fn split_polygon(
        &mut self,
        ipolygon: usize,
        plane: &Plane,
        tol: &Tolerance,
        coplanar_front: &mut Vec<usize>,
        coplanar_back: &mut Vec<usize>,
        front: &mut Vec<usize>,
        back: &mut Vec<usize>,
    ) -> Result<(), CsgError> {
        let polygon = self.polygons[ipolygon].clone();
        let n = polygon.len();
        let surfid = self.surfids[ipolygon];
        let cutoff = tol.classify_cutoff(plane.d);

        let mut polygon_type = 0u8;
        let mut ivert_types = Vec::with_capacity(n);
        for &ivert in &polygon {
            let distance = plane.signed_distance(self.get_vert(ivert));
            let t = if distance < -cutoff {
                BACK
            } else if distance > cutoff {
                FRONT
            } else {
                COPLANAR
            };
            ivert_types.push(t);
            polygon_type |= t;
        }

        match polygon_type {
            COPLANAR => {
                let polygon_normal = self.get_plane_of_polygon(ipolygon)?.normal;
                if plane.normal.dot(polygon_normal) > 0.0 {
                    coplanar_front.push(ipolygon);
                } else {
                    coplanar_back.push(ipolygon);
                }
            }
            FRONT => front.push(ipolygon),
            BACK => back.push(ipolygon),
            SPANNING => {
                let mut front_iverts = Vec::new();
                let mut back_iverts = Vec::new();
                // Reverse-edge-keyed so the cascade step below can find,
                // for a cut on edge (u, v), the neighbor polygon that
                // owns edge (v, u).
                let mut split_edges: Vec<((usize, usize), usize)> = Vec::new();

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ivert0, ivert1) = (polygon[i], polygon[j]);
                    let (type0, type1) = (ivert_types[i], ivert_types[j]);

                    if type0 != BACK {
                        front_iverts.push(ivert0);
                    }
                    if type0 != FRONT {
                        back_iverts.push(ivert0);
                    }

                    if (type0 | type1) == SPANNING {
                        let v0 = self.get_vert(ivert0);
                        let v1 = self.get_vert(ivert1);
                        let denom = plane.normal.dot(v1.minus(v0));
                        if denom.abs() < 1e-12 {
                            return Err(CsgError::split_pathology(ipolygon));
                        }
                        let t = (plane.d - plane.normal.dot(v0)) / denom;
                        let cut_vert = v0.lerp(v1, t);
                        let cut_ivert = self.append_vert(cut_vert);
                        split_edges.push(((ivert1, ivert0), cut_ivert));
                        front_iverts.push(cut_ivert);
                        back_iverts.push(cut_ivert);
                    }
                }

                let mut updated = false;
                if front_iverts.len() >= 3 {
                    updated = true;
                    self.update_polygon(ipolygon, front_iverts);
                    front.push(ipolygon);
                }
                if back_iverts.len() >= 3 {
                    if updated {
                        let new_ipolygon = self.append_polygon(back_iverts, surfid);
                        back.push(new_ipolygon);
                    } else {
                        self.update_polygon(ipolygon, back_iverts);
                        back.push(ipolygon);
                    }
                }

                if !split_edges.is_empty() {
                    let halfedges = self.get_halfedges(None)?;
                    for (split_edge, cut_ivert) in split_edges {
                        let Some(neighbor) = halfedges.get(split_edge) else {
                            continue; // border, nothing to cascade into
                        };
                        let mut neighbor_polygon = self.polygons[neighbor].clone();
                        let i = neighbor_polygon
                            .iter()
                            .position(|&v| v == split_edge.0)
                            .expect("half-edge map is consistent with its own polygons");
                        neighbor_polygon.insert(i + 1, cut_ivert);
                        self.update_polygon(neighbor, neighbor_polygon);
                    }
                }
            }
            _ => unreachable!("polygon_type is a 2-bit OR of COPLANAR/FRONT/BACK"),
        }
        Ok(())
    }

    // -- sanity checks --

    pub fn check_loose_verts(&self) -> Result<(), CsgError> {
        let nverts = self.get_nverts();
        let mut used = vec![false; nverts];
        for polygon in &self.polygons {
            for &ivert in polygon {
                used[ivert] = true;
            }
        }
        if used.iter().any(|&u| !u) {
            return Err(CsgError::loose_verts());
        }
        Ok(())
    }

    pub fn check_degenerate_geometry(&self) -> Result<(), CsgError> {
        for ipolygon in 0..self.get_npolygons() {
            self.get_tris_of_polygon(ipolygon)?;
        }
        Ok(())
    }

    pub fn check_is_solid(&self) -> Result<(), CsgError> {
        let borders = self.get_border_halfedges(None)?;
        if !borders.is_empty() {
            let polys: Vec<usize> = borders.iter().map(|(_, p)| *p).collect();
            return Err(CsgError::not_closed(&polys));
        }
        Ok(())
    }

    pub fn check_geom_sanity(&self) -> Result<(), CsgError> {
        self.check_loose_verts()?;
        self.check_degenerate_geometry()?;
        self.check_is_solid()?;
        Ok(())
    }

    /// Assigns a deterministic, seeded pseudo-random surfid in `range` to
    /// every polygon. Test-fixture helper only; never called from the
    /// reader/writer or boolean-driver paths, which default surfids to 0.
    pub fn with_random_surfids(&mut self, seed: u64, range: std::ops::Range<u32>) {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(seed);
        for surfid in &mut self.surfids {
            *surfid = rng.gen_range(range.clone());
        }
    }
}
