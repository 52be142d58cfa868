// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector2, Vector3};

/// Unnormalized normal of a triangle (length is twice its area)
pub fn triangle_cross(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> Vector3<f64> {
    let v1 = p1 - p0;
    let v2 = p2 - p0;
    v1.cross(&v2)
}

/// Area of a triangle given three vertices
pub fn triangle_area(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    triangle_cross(p0, p1, p2).norm() * 0.5
}

/// Polygon normal by Newell's method.
///
/// Unlike the cross product of the first three vertices this stays correct
/// when leading vertices are collinear or the polygon has a reflex corner.
/// The result is not normalized.
pub fn newell_normal<'a, I>(points: I) -> Vector3<f64>
where
    I: IntoIterator<Item = &'a Point3<f64>>,
{
    let mut rest = points.into_iter();
    let mut normal = Vector3::zeros();
    let mut current = match rest.next() {
        Some(p) => p,
        None => return normal,
    };
    let start = current;

    for next in rest.chain(std::iter::once(start)) {
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
        current = next;
    }

    normal
}

/// Linear interpolation between two points
pub fn lerp_point(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    a + (b - a) * t
}

/// Linear interpolation between two 3D vectors
pub fn lerp_vector(a: &Vector3<f64>, b: &Vector3<f64>, t: f64) -> Vector3<f64> {
    a + (b - a) * t
}

/// Linear interpolation between two texture coordinates
pub fn lerp_uv(a: &Vector2<f64>, b: &Vector2<f64>, t: f64) -> Vector2<f64> {
    a + (b - a) * t
}
