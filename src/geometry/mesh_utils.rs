// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh connectivity checks

use super::Mesh;
use ahash::AHashMap;

/// Undirected edge, smaller index first for consistent hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub v0: usize,
    pub v1: usize,
}

impl Edge {
    pub fn new(v0: usize, v1: usize) -> Self {
        if v0 < v1 {
            Self { v0, v1 }
        } else {
            Self { v0: v1, v1: v0 }
        }
    }
}

/// Number of triangles incident to each undirected edge
pub fn edge_incidence(mesh: &Mesh) -> AHashMap<Edge, u32> {
    let mut edge_counts: AHashMap<Edge, u32> = AHashMap::new();

    for [a, b, c] in mesh.triangles() {
        for edge in [Edge::new(a, b), Edge::new(b, c), Edge::new(c, a)] {
            *edge_counts.entry(edge).or_insert(0) += 1;
        }
    }

    edge_counts
}

/// Check if mesh is manifold (each edge shared by at most 2 triangles)
pub fn is_manifold(mesh: &Mesh) -> bool {
    edge_incidence(mesh).values().all(|&count| count <= 2)
}

/// Check if mesh is closed (each edge shared by exactly 2 triangles)
pub fn is_closed(mesh: &Mesh) -> bool {
    !mesh.is_empty() && edge_incidence(mesh).values().all(|&count| count == 2)
}

/// Edges used by exactly one triangle, sorted
pub fn find_boundary_edges(mesh: &Mesh) -> Vec<Edge> {
    let mut edges: Vec<Edge> = edge_incidence(mesh)
        .into_iter()
        .filter(|&(_, count)| count == 1)
        .map(|(edge, _)| edge)
        .collect();
    edges.sort_unstable();
    edges
}
