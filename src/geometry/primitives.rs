// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! All primitives are wound counter-clockwise when seen from outside and
//! carry texture coordinates.

use super::{Mesh, Vertex, VertexLayout};
use nalgebra::{Point3, Vector2, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Sphere { r: f64, segments: u32 },
    Cylinder { h: f64, r: f64, segments: u32 },
    Torus { major: f64, minor: f64, major_segments: u32, minor_segments: u32 },
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64, segments: u32) -> Self {
        let segments = if segments > 2 { segments } else { 32 };
        Self::Sphere { r, segments }
    }

    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        let segments = if segments > 2 { segments } else { 32 };
        Self::Cylinder { h, r, segments }
    }

    /// Torus around the z axis
    pub fn torus(major: f64, minor: f64, major_segments: u32, minor_segments: u32) -> Self {
        Self::Torus {
            major,
            minor,
            major_segments: major_segments.max(3),
            minor_segments: minor_segments.max(3),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cube { size, center } => generate_cube_mesh(*size, *center),
            Self::Sphere { r, segments } => generate_sphere_mesh(*r, *segments),
            Self::Cylinder { h, r, segments } => generate_cylinder_mesh(*h, *r, *segments),
            Self::Torus {
                major,
                minor,
                major_segments,
                minor_segments,
            } => generate_torus_mesh(*major, *minor, *major_segments, *minor_segments),
        }
    }
}

/// Cube with separate vertices per face so each face keeps a flat normal
/// and its own [0, 1] texture space
fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let mut mesh = Mesh::with_capacity(36, 12, VertexLayout::with_normals_and_uvs());

    let min = if center { -size / 2.0 } else { Vector3::zeros() };
    let max = min + size;

    // 8 vertices of the cube
    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    // 6 faces, each with its normal
    let faces = [
        // Front (z+)
        ([4, 5, 6], Vector3::new(0.0, 0.0, 1.0)),
        ([4, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        // Back (z-)
        ([1, 0, 3], Vector3::new(0.0, 0.0, -1.0)),
        ([1, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        // Right (x+)
        ([5, 1, 2], Vector3::new(1.0, 0.0, 0.0)),
        ([5, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        // Left (x-)
        ([0, 4, 7], Vector3::new(-1.0, 0.0, 0.0)),
        ([0, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        // Top (y+)
        ([7, 6, 2], Vector3::new(0.0, 1.0, 0.0)),
        ([7, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        // Bottom (y-)
        ([0, 1, 5], Vector3::new(0.0, -1.0, 0.0)),
        ([0, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];

    for (indices, normal) in faces {
        let mut triangle = [0; 3];
        for (slot, &corner) in triangle.iter_mut().zip(indices.iter()) {
            let position = positions[corner];
            let uv = face_uv(&position, &min, &size, &normal);
            *slot = mesh.add_vertex(Vertex::new(position, normal).with_uv(uv));
        }
        mesh.add_triangle(triangle);
    }

    mesh
}

/// Planar texture coordinate on a cube face, dropping the normal's axis
fn face_uv(position: &Point3<f64>, min: &Vector3<f64>, size: &Vector3<f64>, normal: &Vector3<f64>) -> Vector2<f64> {
    let local = (position.coords - min).component_div(size);
    if normal.x != 0.0 {
        Vector2::new(local.y, local.z)
    } else if normal.y != 0.0 {
        Vector2::new(local.x, local.z)
    } else {
        Vector2::new(local.x, local.y)
    }
}

/// UV sphere around the y axis.
///
/// The seam column is duplicated for texture continuity and the pole rows
/// collapse to a single position, so the mesh is only closed once welded.
fn generate_sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let stacks = segments as usize;
    let slices = segments as usize;
    let mut mesh = Mesh::with_capacity(
        (stacks + 1) * (slices + 1),
        stacks * slices * 2,
        VertexLayout::with_normals_and_uvs(),
    );

    for i in 0..=stacks {
        // Poles are pinned so their rows weld to a single point
        let (sin_phi, cos_phi) = match i {
            0 => (0.0, 1.0),
            i if i == stacks => (0.0, -1.0),
            _ => (PI * i as f64 / stacks as f64).sin_cos(),
        };

        for j in 0..=slices {
            // The seam column repeats the first column's position exactly
            let theta = 2.0 * PI * (j % slices) as f64 / slices as f64;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let normal = Vector3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
            let position = Point3::from(normal * radius);
            let uv = Vector2::new(j as f64 / slices as f64, 1.0 - i as f64 / stacks as f64);
            mesh.add_vertex(Vertex::new(position, normal).with_uv(uv));
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let first = i * (slices + 1) + j;
            let second = first + slices + 1;

            mesh.add_triangle([first, first + 1, second]);
            mesh.add_triangle([second, first + 1, second + 1]);
        }
    }

    mesh
}

/// Closed cylinder from z=0 to z=height with shared rim vertices
fn generate_cylinder_mesh(height: f64, radius: f64, segments: u32) -> Mesh {
    let segments = segments as usize;
    let mut mesh = Mesh::with_capacity(2 + segments * 2, segments * 4, VertexLayout::with_normals_and_uvs());

    let bottom_center = mesh.add_vertex(
        Vertex::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, -1.0))
            .with_uv(Vector2::new(0.5, 0.5)),
    );
    let top_center = mesh.add_vertex(
        Vertex::new(Point3::new(0.0, 0.0, height), Vector3::new(0.0, 0.0, 1.0))
            .with_uv(Vector2::new(0.5, 0.5)),
    );

    let mut bottom = Vec::with_capacity(segments);
    let mut top = Vec::with_capacity(segments);

    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        let radial = Vector3::new(cos, sin, 0.0);
        let u = i as f64 / segments as f64;

        bottom.push(mesh.add_vertex(
            Vertex::new(Point3::new(radius * cos, radius * sin, 0.0), radial).with_uv(Vector2::new(u, 0.0)),
        ));
        top.push(mesh.add_vertex(
            Vertex::new(Point3::new(radius * cos, radius * sin, height), radial).with_uv(Vector2::new(u, 1.0)),
        ));
    }

    for i in 0..segments {
        let next = (i + 1) % segments;

        mesh.add_triangle([bottom_center, bottom[next], bottom[i]]);
        mesh.add_triangle([top_center, top[i], top[next]]);

        // Side quad, reusing rim vertices to keep the mesh closed
        mesh.add_triangle([bottom[i], bottom[next], top[i]]);
        mesh.add_triangle([top[i], bottom[next], top[next]]);
    }

    mesh.recompute_normals();
    mesh
}

/// Torus around the z axis; every vertex is shared so the mesh is closed
fn generate_torus_mesh(major: f64, minor: f64, major_segments: u32, minor_segments: u32) -> Mesh {
    let n = major_segments as usize;
    let m = minor_segments as usize;
    let mut mesh = Mesh::with_capacity(n * m, n * m * 2, VertexLayout::with_normals_and_uvs());

    for i in 0..n {
        let u = 2.0 * PI * i as f64 / n as f64;
        let (sin_u, cos_u) = u.sin_cos();
        for j in 0..m {
            let v = 2.0 * PI * j as f64 / m as f64;
            let (sin_v, cos_v) = v.sin_cos();

            let ring = major + minor * cos_v;
            let position = Point3::new(ring * cos_u, ring * sin_u, minor * sin_v);
            let normal = Vector3::new(cos_v * cos_u, cos_v * sin_u, sin_v);
            let uv = Vector2::new(i as f64 / n as f64, j as f64 / m as f64);
            mesh.add_vertex(Vertex::new(position, normal).with_uv(uv));
        }
    }

    let index = |i: usize, j: usize| (i % n) * m + (j % m);
    for i in 0..n {
        for j in 0..m {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            mesh.add_triangle([a, b, c]);
            mesh.add_triangle([a, c, d]);
        }
    }

    mesh
}
