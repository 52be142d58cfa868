// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry analytics and statistics

use super::mesh_utils::{find_boundary_edges, is_closed};
use super::Mesh;
use serde::{Deserialize, Serialize};

/// Geometry statistics and analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStats {
    /// Enclosed volume, sign given by triangle winding
    pub signed_volume: f64,
    /// Total surface area in square units
    pub surface_area: f64,
    /// Bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Edges used by a single triangle
    pub boundary_edge_count: usize,
    /// Every edge shared by exactly two triangles
    pub is_watertight: bool,
}

impl MeshStats {
    /// Create empty stats
    pub fn empty() -> Self {
        Self {
            signed_volume: 0.0,
            surface_area: 0.0,
            bbox: [0.0; 6],
            vertex_count: 0,
            triangle_count: 0,
            boundary_edge_count: 0,
            is_watertight: false,
        }
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume.abs()
    }
}

/// Analyze mesh geometry and compute statistics
pub fn analyze(mesh: &Mesh) -> MeshStats {
    if mesh.vertices.is_empty() || mesh.is_empty() {
        return MeshStats {
            vertex_count: mesh.vertex_count(),
            ..MeshStats::empty()
        };
    }

    let bbox = mesh.bounding_box();

    MeshStats {
        signed_volume: calculate_signed_volume(mesh),
        surface_area: mesh.surface_area(),
        bbox: [bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z],
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        boundary_edge_count: find_boundary_edges(mesh).len(),
        is_watertight: is_closed(mesh),
    }
}

/// Sum of signed tetrahedra against the origin
fn calculate_signed_volume(mesh: &Mesh) -> f64 {
    mesh.triangles()
        .map(|triangle| {
            let [v0, v1, v2] = mesh.triangle_positions(triangle);
            v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_analyze_cube() {
        let mesh = Primitive::cube(Vector3::new(10.0, 10.0, 10.0), true).to_mesh();
        let stats = analyze(&mesh);

        assert!((stats.signed_volume - 1000.0).abs() < 1e-9);
        assert!((stats.surface_area - 600.0).abs() < 1e-9);
        assert_eq!(stats.vertex_count, 36); // 12 triangles × 3 vertices
        assert_eq!(stats.triangle_count, 12);
        assert_eq!(stats.bbox, [-5.0, -5.0, -5.0, 5.0, 5.0, 5.0]);
        // Per-face vertices leave every edge open until welded
        assert!(!stats.is_watertight);
    }

    #[test]
    fn test_analyze_sphere() {
        let mesh = Primitive::sphere(5.0, 32).to_mesh();
        let stats = analyze(&mesh);

        let expected_volume = 4.0 / 3.0 * std::f64::consts::PI * 5.0_f64.powi(3);
        let expected_area = 4.0 * std::f64::consts::PI * 5.0_f64.powi(2);

        assert!(
            (stats.volume() - expected_volume).abs() < expected_volume * 0.05,
            "Volume {} not close to expected {}",
            stats.volume(),
            expected_volume
        );
        assert!(
            (stats.surface_area - expected_area).abs() < expected_area * 0.05,
            "Surface area {} not close to expected {}",
            stats.surface_area,
            expected_area
        );
    }

    #[test]
    fn test_empty_mesh() {
        let stats = analyze(&Mesh::new());
        assert_eq!(stats, MeshStats::empty());
    }
}
