// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Directed half-edge map over a set of polygons.
//!
//! Keyed by the directed pair `(u, v)`, not the canonical `(min, max)` pair
//! a twin-finding structure would use, because orientation consistency
//! (every edge should appear once per direction in a closed 2-manifold) is
//! exactly what this module is used to check.

use crate::error::CsgError;
use std::collections::HashMap;

pub type HalfEdge = (usize, usize);

/// Maps each directed edge `(u, v)` to the index of the polygon that owns
/// it. Seeing the same directed edge twice means the input is non-manifold
/// or inconsistently oriented.
#[derive(Debug, Default, Clone)]
pub struct HalfEdgeMap {
    map: HashMap<HalfEdge, usize>,
}

impl HalfEdgeMap {
    /// Builds the map over `polygons` (each a ring of vertex indices),
    /// restricted to the polygon indices in `ipolygons`.
    pub fn build(
        polygons: &[Vec<usize>],
        ipolygons: &[usize],
    ) -> Result<Self, CsgError> {
        let mut map = HashMap::new();
        for &ipolygon in ipolygons {
            let polygon = &polygons[ipolygon];
            let n = polygon.len();
            for i in 0..n {
                let edge = (polygon[i], polygon[(i + 1) % n]);
                if map.insert(edge, ipolygon).is_some() {
                    return Err(CsgError::non_manifold(ipolygon));
                }
            }
        }
        Ok(Self { map })
    }

    pub fn get(&self, edge: HalfEdge) -> Option<usize> {
        self.map.get(&edge).copied()
    }

    pub fn contains(&self, edge: HalfEdge) -> bool {
        self.map.contains_key(&edge)
    }

    /// Half-edges whose reverse is absent from the map: the mesh's
    /// boundary (empty for a closed manifold).
    pub fn borders(&self) -> Vec<(HalfEdge, usize)> {
        self.map
            .iter()
            .filter(|((u, v), _)| !self.map.contains_key(&(*v, *u)))
            .map(|(&edge, &ipolygon)| (edge, ipolygon))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Vec<Vec<usize>> {
        vec![
            vec![2, 1, 0],
            vec![0, 1, 3],
            vec![1, 2, 3],
            vec![2, 0, 3],
        ]
    }

    #[test]
    fn closed_tetrahedron_has_no_borders() {
        let polys = tetrahedron();
        let he = HalfEdgeMap::build(&polys, &[0, 1, 2, 3]).unwrap();
        assert_eq!(he.len(), 12);
        assert!(he.borders().is_empty());
    }

    #[test]
    fn open_tetrahedron_reports_borders() {
        let polys = tetrahedron();
        let he = HalfEdgeMap::build(&polys, &[1, 2, 3]).unwrap();
        assert_eq!(he.borders().len(), 3);
    }

    #[test]
    fn duplicate_directed_edge_is_non_manifold() {
        let polys = vec![vec![2, 1, 0], vec![0, 1, 3], vec![1, 2, 3], vec![3, 0, 2]];
        assert!(HalfEdgeMap::build(&polys, &[0, 1, 2, 3]).is_err());
    }
}
