// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Hole capping for sliced halves

use super::loops::{reconstruct, EdgeLoop};
use crate::geometry::{Mesh, Plane};
use crate::utils::math::{newell_normal, triangle_area};

/// Which half a cap closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CapSide {
    Front,
    Back,
}

impl CapSide {
    /// Caps face away from the material: the front half's cap points
    /// against the plane normal, the back half's cap along it
    fn needs_reversal(self, alignment: f64) -> bool {
        match self {
            CapSide::Front => alignment > 0.0,
            CapSide::Back => alignment < 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CapSummary {
    pub loop_lengths: Vec<usize>,
    pub cap_triangles: usize,
    pub cap_area: f64,
    pub open_chains: usize,
    pub degenerate_loops: usize,
}

/// Close every boundary loop of `mesh` with a fan of triangles
pub(crate) fn close_holes(mesh: &mut Mesh, boundary: &[(usize, usize)], plane: &Plane, side: CapSide) -> CapSummary {
    let reconstruction = reconstruct(boundary);
    let mut summary = CapSummary {
        open_chains: reconstruction.open_chains,
        degenerate_loops: reconstruction.degenerate_loops,
        ..CapSummary::default()
    };

    for mut edge_loop in reconstruction.loops {
        orient(mesh, &mut edge_loop, plane, side);

        for triangle in edge_loop.fan() {
            let [a, b, c] = mesh.triangle_positions(triangle);
            summary.cap_area += triangle_area(&a, &b, &c);
            summary.cap_triangles += 1;
            mesh.add_triangle(triangle);
        }
        summary.loop_lengths.push(edge_loop.len());
    }

    log::debug!(
        "{:?} cap: {} loops, {} triangles",
        side,
        summary.loop_lengths.len(),
        summary.cap_triangles
    );

    summary
}

fn orient(mesh: &Mesh, edge_loop: &mut EdgeLoop, plane: &Plane, side: CapSide) {
    let normal = newell_normal(edge_loop.vertices().iter().map(|&i| &mesh.vertices[i].position));
    let alignment = normal.dot(&plane.normal);
    if side.needs_reversal(alignment) {
        edge_loop.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vertex;
    use crate::utils::math::triangle_cross;
    use nalgebra::{Point3, Vector3};

    /// Unit square in z = 0, listed counter-clockwise seen from +z
    fn square() -> (Mesh, Vec<(usize, usize)>) {
        let mut mesh = Mesh::new();
        for [x, y] in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
            mesh.add_vertex(Vertex::at(Point3::new(x, y, 0.0)));
        }
        (mesh, vec![(0, 1), (1, 2), (2, 3), (3, 0)])
    }

    fn cap_normals(mesh: &Mesh) -> Vec<Vector3<f64>> {
        mesh.triangles()
            .map(|t| {
                let [a, b, c] = mesh.triangle_positions(t);
                triangle_cross(&a, &b, &c)
            })
            .collect()
    }

    #[test]
    fn test_front_cap_faces_against_normal() {
        let (mut mesh, boundary) = square();
        let plane = Plane::new(Vector3::z(), 0.0);
        let summary = close_holes(&mut mesh, &boundary, &plane, CapSide::Front);

        assert_eq!(summary.loop_lengths, vec![4]);
        assert_eq!(summary.cap_triangles, 2);
        assert!((summary.cap_area - 1.0).abs() < 1e-12);
        for normal in cap_normals(&mesh) {
            assert!(normal.dot(&plane.normal) < 0.0);
        }
    }

    #[test]
    fn test_back_cap_faces_along_normal() {
        let (mut mesh, boundary) = square();
        let plane = Plane::new(Vector3::z(), 0.0);
        close_holes(&mut mesh, &boundary, &plane, CapSide::Back);

        for normal in cap_normals(&mesh) {
            assert!(normal.dot(&plane.normal) > 0.0);
        }
    }

    #[test]
    fn test_collinear_leading_vertices_still_orient() {
        // Midpoint on the first edge makes the first three vertices collinear
        let mut mesh = Mesh::new();
        for [x, y] in [[0.0, 0.0], [0.5, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
            mesh.add_vertex(Vertex::at(Point3::new(x, y, 0.0)));
        }
        let boundary = [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)];
        let plane = Plane::new(Vector3::z(), 0.0);
        let summary = close_holes(&mut mesh, &boundary, &plane, CapSide::Front);

        assert_eq!(summary.cap_triangles, 3);
        assert!((summary.cap_area - 1.0).abs() < 1e-12);
        for normal in cap_normals(&mesh).into_iter().filter(|n| n.norm() > 0.0) {
            assert!(normal.z < 0.0);
        }
    }

    #[test]
    fn test_open_boundary_is_reported() {
        let (mut mesh, _) = square();
        let plane = Plane::new(Vector3::z(), 0.0);
        let summary = close_holes(&mut mesh, &[(0, 1), (1, 2)], &plane, CapSide::Front);

        assert_eq!(summary.open_chains, 1);
        assert_eq!(summary.cap_triangles, 0);
        assert!(mesh.is_empty());
    }
}
