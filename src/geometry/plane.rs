// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Oriented planes, derived from polygon vertex rings via Newell's method.

use super::vector::Vector;
use crate::error::CsgError;

/// An oriented plane `{ p : normal . p = d }`, with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector,
    pub d: f64,
}

impl Plane {
    pub fn new(normal: Vector, d: f64) -> Self {
        Self { normal, d }
    }

    /// Derives a plane from a polygon's ordered vertex ring using Newell's
    /// method: the sum of `(p_{i+1} - p_i) x (p_{i+2} - p_i)` over the ring
    /// is robust to slight concavity and non-planarity, unlike a single
    /// 3-point cross product. Fails when the accumulated normal is zero,
    /// i.e. all points are collinear.
    pub fn from_points(points: &[Vector]) -> Result<Self, CsgError> {
        let n = points.len();
        if n < 3 {
            return Err(CsgError::degenerate(format!(
                "plane requires at least 3 points, got {n}"
            )));
        }
        let mut total = Vector::zero();
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            let c = points[(i + 2) % n];
            total = total.plus(b.minus(a).cross(c.minus(a)));
        }
        let normal = total.unit(1e-12).ok_or_else(|| {
            CsgError::degenerate("could not find a plane, points are collinear")
        })?;
        let d = points[0].dot(normal);
        Ok(Self { normal, d })
    }

    pub fn flip(&mut self) {
        self.normal = self.normal.negated();
        self.d = -self.d;
    }

    pub fn flipped(self) -> Self {
        Self::new(self.normal.negated(), -self.d)
    }

    /// Signed distance from `p` to the plane.
    pub fn signed_distance(&self, p: Vector) -> f64 {
        self.normal.dot(p) - self.d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn from_points_axis_aligned_square() {
        let pts = [
            Vector::new(0.0, 0.0, 5.0),
            Vector::new(1.0, 0.0, 5.0),
            Vector::new(1.0, 1.0, 5.0),
            Vector::new(0.0, 1.0, 5.0),
        ];
        let plane = Plane::from_points(&pts).unwrap();
        assert_abs_diff_eq!(plane.normal.z.abs(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(plane.d.abs(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn from_points_slightly_concave_still_planar() {
        let pts = [
            Vector::new(0.0, 0.0, 5.0),
            Vector::new(1.0, 0.1, 5.0),
            Vector::new(2.0, 0.0, 5.0),
            Vector::new(0.0, 1.0, 5.0),
        ];
        let plane = Plane::from_points(&pts).unwrap();
        assert_abs_diff_eq!(plane.normal.z.abs(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn from_points_collinear_fails() {
        let pts = [
            Vector::new(0.0, 0.0, 0.0),
            Vector::new(1.0, 0.0, 0.0),
            Vector::new(2.0, 0.0, 0.0),
            Vector::new(3.0, 0.0, 0.0),
        ];
        assert!(Plane::from_points(&pts).is_err());
    }

    #[test]
    fn flip_negates_normal_and_d() {
        let mut plane = Plane::new(Vector::new(1.0, 0.0, 0.0), 5.0);
        plane.flip();
        assert_eq!(plane.normal, Vector::new(-1.0, 0.0, 0.0));
        assert_eq!(plane.d, -5.0);
    }
}
