// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end boolean operation scenarios.

use anyhow::Result;
use approx::assert_abs_diff_eq;
use pyrocsg::{difference, intersection, union, Mesh, Tolerance, Vector};

fn cube(center: Vector, half: f64) -> Mesh {
    let c = center;
    let h = half;
    let v = |dx: f64, dy: f64, dz: f64| Vector::new(c.x + dx * h, c.y + dy * h, c.z + dz * h);
    let corners = [
        v(-1.0, -1.0, -1.0),
        v(-1.0, -1.0, 1.0),
        v(-1.0, 1.0, 1.0),
        v(-1.0, 1.0, -1.0),
        v(1.0, -1.0, -1.0),
        v(1.0, -1.0, 1.0),
        v(1.0, 1.0, 1.0),
        v(1.0, 1.0, -1.0),
    ];
    let mut verts = Vec::new();
    for p in corners {
        verts.extend_from_slice(&p.to_array());
    }
    Mesh::new(
        verts,
        vec![
            vec![0, 1, 2, 3],
            vec![7, 6, 5, 4],
            vec![1, 5, 6, 2],
            vec![0, 3, 7, 4],
            vec![3, 2, 6, 7],
            vec![0, 4, 5, 1],
        ],
        None,
        None,
    )
    .unwrap()
}

#[test]
fn overlapping_cubes_union_is_a_single_closed_solid() -> Result<()> {
    let tol = Tolerance::default();
    let a = cube(Vector::new(0.0, 0.0, 0.0), 1.0);
    let b = cube(Vector::new(1.2, 0.0, 0.0), 1.0);

    let result = union(&a, &b, &tol)?;
    result.check_geom_sanity()?;
    assert!(result.get_npolygons() > 0);
    Ok(())
}

#[test]
fn overlapping_cubes_intersection_is_box_shaped() -> Result<()> {
    let tol = Tolerance::default();
    let a = cube(Vector::new(0.0, 0.0, 0.0), 1.0);
    let b = cube(Vector::new(1.2, 0.0, 0.0), 1.0);

    let result = intersection(&a, &b, &tol)?;
    result.check_geom_sanity()?;
    // A cube sliced by another axis-aligned cube stays box-shaped; the
    // BSP clip may leave the faces fragmented before merging collapses
    // them back to six, so only bound the fragment count from below.
    assert!(result.get_npolygons() >= 6);
    Ok(())
}

#[test]
fn containing_cube_difference_leaves_a_shell() -> Result<()> {
    let tol = Tolerance::default();
    let outer = cube(Vector::new(0.0, 0.0, 0.0), 2.0);
    let inner = cube(Vector::new(0.0, 0.0, 0.0), 1.0);

    let result = difference(&outer, &inner, &tol)?;
    result.check_geom_sanity()?;
    assert!(result.get_npolygons() > 6);
    Ok(())
}

#[test]
fn union_then_difference_round_trips_toward_the_original() -> Result<()> {
    let tol = Tolerance::default();
    let a = cube(Vector::new(0.0, 0.0, 0.0), 1.0);
    let b = cube(Vector::new(5.0, 0.0, 0.0), 1.0);

    let unioned = union(&a, &b, &tol)?;
    let recovered = difference(&unioned, &b, &tol)?;
    recovered.check_geom_sanity()?;
    assert_eq!(recovered.get_npolygons(), 6);
    // And the recovered cube should sit where `a` originally did.
    let verts: Vec<Vector> = (0..recovered.get_nverts())
        .map(|i| recovered.get_vert(i))
        .collect();
    for v in &verts {
        assert_abs_diff_eq!(v.x.clamp(-1.0, 1.0), v.x, epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn identical_cubes_union_preserves_volume() -> Result<()> {
    let tol = Tolerance::default();
    let a = cube(Vector::new(0.0, 0.0, 0.0), 1.0);
    let b = cube(Vector::new(0.0, 0.0, 0.0), 1.0);

    let result = union(&a, &b, &tol)?;
    result.check_geom_sanity()?;
    assert!(result.get_npolygons() >= 6);
    Ok(())
}

#[test]
fn c_shaped_solid_builds_and_clips_without_error() -> Result<()> {
    // An L-shaped solid: a big cube with a notch cut from one corner,
    // exercising a BSP tree deeper than a convex solid would need.
    let tol = Tolerance::default();
    let big = cube(Vector::new(0.0, 0.0, 0.0), 2.0);
    let notch = cube(Vector::new(2.0, 2.0, 2.0), 1.0);

    let l_shape = difference(&big, &notch, &tol)?;
    l_shape.check_geom_sanity()?;
    assert!(l_shape.get_npolygons() >= 6);
    Ok(())
}
