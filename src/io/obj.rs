// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ writing, with a sibling `.mtl` carrying the fixed
//! seven-color surfid palette used throughout the fire-dynamics-simulation
//! toolchain. There is no OBJ reader: OBJ is an export-only convenience
//! format here, matching the source, which never reads OBJ back in.

use crate::geometry::Mesh;
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// `Kd` diffuse colors keyed by surfid 0-6, fixed across every export.
const PALETTE: [(f32, f32, f32); 7] = [
    (0.6, 0.0, 0.0),
    (0.6, 0.6, 0.6),
    (0.0, 0.6, 0.0),
    (0.0, 0.0, 0.6),
    (0.0, 0.6, 0.6),
    (0.6, 0.0, 0.6),
    (0.6, 0.6, 0.0),
];

/// Writes `mesh` to `path` as OBJ plus a `<path>.mtl` sibling. Vertices are
/// swapped `(x, y, z) -> (x, z, -y)` to match the FDS/OBJ coordinate
/// convention. Faces are grouped by surfid under `usemtl` directives.
pub fn write_obj(mesh: &Mesh, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .context("OBJ output path has no file name")?
        .to_string_lossy()
        .into_owned();

    let mut by_surfid: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for ipolygon in 0..mesh.get_npolygons() {
        by_surfid
            .entry(mesh.get_polygon_surfid(ipolygon))
            .or_default()
            .push(ipolygon);
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "# Reference to materials")?;
    writeln!(w, "mtllib {filename}.mtl")?;
    writeln!(w, "# List of vertices x,y,z")?;
    for ivert in 0..mesh.get_nverts() {
        let v = mesh.get_vert(ivert);
        writeln!(w, "v {} {} {}", v.x, v.z, -v.y)?;
    }
    writeln!(w, "# List of polygons by material (surfid)")?;
    for (surfid, ipolygons) in &by_surfid {
        writeln!(w, "usemtl {surfid}")?;
        for &ipolygon in ipolygons {
            let face: Vec<String> = mesh
                .get_polygon(ipolygon)
                .iter()
                .map(|&ivert| (ivert + 1).to_string())
                .collect();
            writeln!(w, "f {}", face.join(" "))?;
        }
    }
    writeln!(w, "# End")?;

    let mtl_path = path.with_file_name(format!("{filename}.mtl"));
    let mtl_file =
        File::create(&mtl_path).with_context(|| format!("creating {}", mtl_path.display()))?;
    let mut mtl = BufWriter::new(mtl_file);
    writeln!(mtl, "# Materials")?;
    for (id, (r, g, b)) in PALETTE.iter().enumerate() {
        writeln!(mtl, "newmtl {id}")?;
        writeln!(mtl, "Kd {r} {g} {b}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> Mesh {
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
            Some(vec![0, 1, 2, 3, 4, 5]),
            None,
        )
        .unwrap()
    }

    #[test]
    fn write_obj_produces_sibling_mtl_with_seven_colors() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("pyrocsg_test_{}.obj", std::process::id()));
        write_obj(&cube(), &path).unwrap();

        let obj = std::fs::read_to_string(&path).unwrap();
        assert!(obj.contains("usemtl 0"));
        assert!(obj.contains("f 1 2 3 4"));

        let mtl_path = path.with_file_name(format!(
            "{}.mtl",
            path.file_name().unwrap().to_string_lossy()
        ));
        let mtl = std::fs::read_to_string(&mtl_path).unwrap();
        assert_eq!(mtl.matches("newmtl").count(), 7);
        assert!(mtl.contains("Kd 0.6 0 0"));

        std::fs::remove_file(&path).ok();
        std::fs::remove_file(&mtl_path).ok();
    }
}
