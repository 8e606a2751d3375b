// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL reading and writing.
//!
//! Writing always emits ASCII STL, matching the source format exactly
//! (`solid name` / `facet normal 0 0 0` / 9-decimal vertex lines). Reading
//! accepts both ASCII and binary STL via `stl_io`, since a round-trip
//! through third-party tools is far more likely to hand back binary.

use crate::config::Tolerance;
use crate::geometry::Mesh;
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `mesh` as ASCII STL, triangulating every polygon first. Normals
/// are always written as `0 0 0`; nothing downstream of this kernel is
/// expected to rely on STL facet normals.
pub fn write_stl(mesh: &Mesh, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "solid name")?;
    for ipolygon in 0..mesh.get_npolygons() {
        let tris = mesh.get_tris_of_polygon(ipolygon)?;
        for (i0, i1, i2) in tris {
            writeln!(w, "facet normal 0 0 0")?;
            writeln!(w, " outer loop")?;
            for ivert in [i0, i1, i2] {
                let v = mesh.get_vert(ivert);
                writeln!(w, "  vertex {:.9} {:.9} {:.9}", v.x, v.y, v.z)?;
            }
            writeln!(w, " endloop")?;
            writeln!(w, "endfacet")?;
        }
    }
    writeln!(w, "endsolid name")?;
    Ok(())
}

/// Reads an STL file (ASCII or binary) into a mesh of independent
/// triangles, welds duplicate vertices by `tol`, and runs a full sanity
/// check so malformed input surfaces as a [`CsgError`] rather than later
/// as a silent BSP failure.
pub fn read_stl(path: impl AsRef<Path>, surfid: u32, tol: &Tolerance) -> anyhow::Result<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let stl = stl_io::read_stl(&mut reader)
        .with_context(|| format!("parsing {}", path.display()))?;

    let mut verts = Vec::with_capacity(stl.vertices.len() * 3);
    for v in &stl.vertices {
        verts.push(v[0] as f64);
        verts.push(v[1] as f64);
        verts.push(v[2] as f64);
    }
    let mut polygons = Vec::with_capacity(stl.faces.len());
    let mut surfids = Vec::with_capacity(stl.faces.len());
    for face in &stl.faces {
        polygons.push(vec![face.vertices[0], face.vertices[1], face.vertices[2]]);
        surfids.push(surfid);
    }

    let mut mesh: Mesh = Mesh::new(verts, polygons, Some(surfids), None).map_err(anyhow::Error::from)?;
    mesh.merge_duplicated_verts(tol);
    mesh.check_geom_sanity().map_err(anyhow::Error::from)?;
    Ok(mesh)
}
