// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use crate::error::{Result, SliceError};
use crate::utils::math::{triangle_area, triangle_cross};
use ahash::AHashMap;
use nalgebra::{Matrix4, Point3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// RGB vertex color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    /// Default marker for vertices generated on the cut
    pub const MAGENTA: Color = Color::new(1.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Vertex with position and optional shading attributes.
///
/// Attributes not listed in the owning mesh's [`VertexLayout`] hold
/// defaults and are ignored by exporters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub uv: Vector2<f64>,
    pub color: Color,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal,
            uv: Vector2::zeros(),
            color: Color::WHITE,
        }
    }

    /// Vertex carrying only a position
    pub fn at(position: Point3<f64>) -> Self {
        Self::new(position, Vector3::zeros())
    }

    pub fn with_uv(mut self, uv: Vector2<f64>) -> Self {
        self.uv = uv;
        self
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        // Transform normal (use inverse transpose for normals)
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        let normal = normal_matrix.transform_vector(&self.normal);
        self.normal = normal.try_normalize(0.0).unwrap_or(normal);
    }
}

/// Which optional vertex attributes carry meaning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexLayout {
    pub normals: bool,
    pub uvs: bool,
    pub colors: bool,
}

impl VertexLayout {
    pub fn with_normals_and_uvs() -> Self {
        Self {
            normals: true,
            uvs: true,
            colors: false,
        }
    }
}

/// Indexed triangle mesh.
///
/// `indices` references `vertices` in groups of three.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<usize>,
    pub layout: VertexLayout,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize, layout: VertexLayout) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(triangle_count * 3),
            layout,
        }
    }

    /// Build a mesh from separate attribute buffers.
    ///
    /// Optional attribute buffers must match `positions` in length; a
    /// mismatched buffer is ignored and left out of the layout.
    pub fn from_buffers(
        positions: &[Point3<f64>],
        normals: Option<&[Vector3<f64>]>,
        uvs: Option<&[Vector2<f64>]>,
        indices: Vec<usize>,
    ) -> Self {
        let normals = normals.filter(|n| n.len() == positions.len());
        let uvs = uvs.filter(|u| u.len() == positions.len());

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let mut vertex = Vertex::at(position);
                if let Some(normals) = normals {
                    vertex.normal = normals[i];
                }
                if let Some(uvs) = uvs {
                    vertex.uv = uvs[i];
                }
                vertex
            })
            .collect();

        Self {
            vertices,
            indices,
            layout: VertexLayout {
                normals: normals.is_some(),
                uvs: uvs.is_some(),
                colors: false,
            },
        }
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: [usize; 3]) {
        self.indices.extend_from_slice(&triangle);
    }

    /// Iterate complete triangles; a trailing partial group is skipped
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Positions of one triangle
    pub fn triangle_positions(&self, triangle: [usize; 3]) -> [Point3<f64>; 3] {
        [
            self.vertices[triangle[0]].position,
            self.vertices[triangle[1]].position,
            self.vertices[triangle[2]].position,
        ]
    }

    /// Check the triangulation and index bounds
    pub fn validate(&self) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            return Err(SliceError::NotTriangulated {
                index_count: self.indices.len(),
            });
        }
        let vertex_count = self.vertices.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(SliceError::IndexOutOfBounds { index, vertex_count });
        }
        Ok(())
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Total area of all triangles
    pub fn surface_area(&self) -> f64 {
        self.triangles()
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                triangle_area(&a, &b, &c)
            })
            .sum()
    }

    /// Merge vertices sharing an exact position.
    ///
    /// The first vertex at a position keeps its attributes. Triangles that
    /// collapse onto a repeated index are dropped. Returns the old-to-new
    /// index map so callers can remap their own references.
    pub fn merge_vertices(&mut self) -> Vec<usize> {
        let mut remap = Vec::with_capacity(self.vertices.len());
        let mut merged: Vec<Vertex> = Vec::with_capacity(self.vertices.len());
        let mut by_position: AHashMap<[u64; 3], usize> = AHashMap::new();

        for vertex in &self.vertices {
            let key = position_key(&vertex.position);
            let index = *by_position.entry(key).or_insert_with(|| {
                merged.push(*vertex);
                merged.len() - 1
            });
            remap.push(index);
        }

        let mut indices = Vec::with_capacity(self.indices.len());
        for [a, b, c] in self.triangles() {
            let (a, b, c) = (remap[a], remap[b], remap[c]);
            if a == b || b == c || a == c {
                continue;
            }
            indices.extend_from_slice(&[a, b, c]);
        }

        self.vertices = merged;
        self.indices = indices;
        remap
    }

    /// Remove orphaned vertices (vertices not referenced by any triangle)
    /// Returns the number of vertices removed
    pub fn remove_orphaned_vertices(&mut self) -> usize {
        let mut used_vertices = vec![false; self.vertices.len()];
        for &index in &self.indices {
            used_vertices[index] = true;
        }

        // Build remapping: old_index -> new_index
        let mut new_indices = vec![0; self.vertices.len()];
        let mut new_vertices = Vec::with_capacity(self.vertices.len());

        for (old_idx, &used) in used_vertices.iter().enumerate() {
            if used {
                new_indices[old_idx] = new_vertices.len();
                new_vertices.push(self.vertices[old_idx]);
            }
        }

        for index in &mut self.indices {
            *index = new_indices[*index];
        }

        let removed = self.vertices.len() - new_vertices.len();
        self.vertices = new_vertices;
        removed
    }

    /// Recompute vertex normals from triangle geometry
    /// This calculates face normals and averages them at shared vertices
    pub fn recompute_normals(&mut self) {
        self.layout.normals = true;
        if self.vertices.is_empty() {
            return;
        }

        let mut normal_sums: Vec<Vector3<f64>> = vec![Vector3::zeros(); self.vertices.len()];

        for triangle in self.triangles() {
            let [p0, p1, p2] = self.triangle_positions(triangle);

            // Cross product length is twice the area, so the sum is area weighted
            let face_normal = triangle_cross(&p0, &p1, &p2);
            if face_normal.norm() > 1e-12 {
                for &idx in &triangle {
                    normal_sums[idx] += face_normal;
                }
            }
        }

        for (vertex, sum) in self.vertices.iter_mut().zip(normal_sums) {
            // Fallback: default normal if no triangle with area references this vertex
            vertex.normal = sum
                .try_normalize(1e-12)
                .unwrap_or_else(|| Vector3::new(0.0, 0.0, 1.0));
        }
    }
}

/// Hash key for exact position equality; `-0.0` and `0.0` share a key
fn position_key(p: &Point3<f64>) -> [u64; 3] {
    [
        (p.x + 0.0).to_bits(),
        (p.y + 0.0).to_bits(),
        (p.z + 0.0).to_bits(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_recompute_normals() {
        let mut mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), false).to_mesh();

        // Verify normals exist
        assert!(!mesh.vertices.is_empty());
        assert!(mesh.vertices.iter().all(|v| v.normal.norm() > 0.0));

        mesh.recompute_normals();

        assert!(mesh.vertices.iter().all(|v| {
            let norm = v.normal.norm();
            norm > 0.9 && norm < 1.1
        }));
    }

    #[test]
    fn test_merge_vertices_welds_cube() {
        let mut mesh = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh();
        assert_eq!(mesh.vertex_count(), 36);

        let remap = mesh.merge_vertices();

        assert_eq!(remap.len(), 36);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn test_merge_vertices_treats_signed_zero_as_equal() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vertex::at(Point3::new(0.0, 0.0, 0.0)));
        let b = mesh.add_vertex(Vertex::at(Point3::new(-0.0, 0.0, 0.0)));
        let c = mesh.add_vertex(Vertex::at(Point3::new(1.0, 0.0, 0.0)));
        let d = mesh.add_vertex(Vertex::at(Point3::new(0.0, 1.0, 0.0)));
        mesh.add_triangle([a, c, d]);
        mesh.add_triangle([b, d, c]);

        let remap = mesh.merge_vertices();
        assert_eq!(remap[a], remap[b]);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_merge_vertices_drops_collapsed_triangles() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vertex::at(Point3::new(0.0, 0.0, 0.0)));
        let b = mesh.add_vertex(Vertex::at(Point3::new(0.0, 0.0, 0.0)));
        let c = mesh.add_vertex(Vertex::at(Point3::new(1.0, 0.0, 0.0)));
        mesh.add_triangle([a, b, c]);

        mesh.merge_vertices();
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_remove_orphaned_vertices() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vertex::at(Point3::new(0.0, 0.0, 0.0)));
        mesh.add_vertex(Vertex::at(Point3::new(5.0, 5.0, 5.0)));
        let c = mesh.add_vertex(Vertex::at(Point3::new(1.0, 0.0, 0.0)));
        let d = mesh.add_vertex(Vertex::at(Point3::new(0.0, 1.0, 0.0)));
        mesh.add_triangle([a, c, d]);

        assert_eq!(mesh.remove_orphaned_vertices(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_rejects_partial_triangle() {
        let mut mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), true).to_mesh();
        mesh.indices.push(0);
        assert_eq!(
            mesh.validate(),
            Err(SliceError::NotTriangulated { index_count: 37 })
        );
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_index() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vertex::at(Point3::origin()));
        mesh.add_triangle([0, 0, 3]);
        assert_eq!(
            mesh.validate(),
            Err(SliceError::IndexOutOfBounds {
                index: 3,
                vertex_count: 1
            })
        );
    }

    #[test]
    fn test_surface_area_of_cube() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
        assert!((mesh.surface_area() - 600.0).abs() < 1e-9);
    }
}
