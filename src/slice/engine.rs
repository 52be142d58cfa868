// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-triangle splitting against a plane
//!
//! Each source triangle is walked corner by corner. A corner is copied to
//! every side that keeps it, and an edge whose endpoints sit strictly on
//! opposite sides emits one interpolated vertex into both sides. The
//! resulting polygons (3 or 4 corners) are fanned into triangles.
//!
//! Along the way every side records the in-plane segment of each triangle
//! it owns, oriented along that side's polygon. Those segments are the open
//! boundary that the capping stage later closes.

use super::SliceOptions;
use crate::geometry::{Mesh, Plane, PlaneSide, Vertex, VertexLayout};
use crate::utils::math::{lerp_point, lerp_uv, lerp_vector};
use ahash::AHashMap;
use std::cmp::Ordering;

/// One half produced by the split, before welding and capping
#[derive(Debug, Clone)]
pub(crate) struct SideMesh {
    pub mesh: Mesh,
    /// Directed edges lying in the cutting plane, in mesh-local indices
    pub boundary: Vec<(usize, usize)>,
}

/// Output of [`split_mesh`]
#[derive(Debug, Clone)]
pub(crate) struct Split {
    pub front: SideMesh,
    pub back: SideMesh,
    /// Distinct crossing edges, each producing one vertex per side
    pub intersections: usize,
}

/// Polygon corner in side-local indices
#[derive(Debug, Clone, Copy)]
struct Corner {
    index: usize,
    on_plane: bool,
}

/// Interpolated vertex on one crossing source edge, one copy per half
#[derive(Debug, Clone, Copy)]
struct IntersectionRecord {
    t: f64,
    vertex: Vertex,
    front: usize,
    back: usize,
}

/// Accumulates one output half
struct SideBuilder {
    mesh: Mesh,
    /// Source vertex index to side vertex index
    copies: Vec<Option<usize>>,
    boundary: Vec<(usize, usize)>,
}

impl SideBuilder {
    fn new(source: &Mesh) -> Self {
        let layout = VertexLayout {
            normals: source.layout.normals,
            uvs: source.layout.uvs,
            colors: true,
        };
        Self {
            mesh: Mesh::with_capacity(source.vertex_count(), source.triangle_count(), layout),
            copies: vec![None; source.vertex_count()],
            boundary: Vec::new(),
        }
    }

    /// Copy a source vertex at most once
    fn copy_source(&mut self, source: &Mesh, index: usize, options: &SliceOptions) -> usize {
        if let Some(existing) = self.copies[index] {
            return existing;
        }
        let mut vertex = source.vertices[index];
        if !source.layout.colors {
            vertex.color = options.base_color;
        }
        let copied = self.mesh.add_vertex(vertex);
        self.copies[index] = Some(copied);
        copied
    }

    fn fan(&mut self, polygon: &[Corner]) {
        if polygon.len() < 3 {
            return;
        }
        for pair in polygon[1..].windows(2) {
            self.mesh
                .add_triangle([polygon[0].index, pair[0].index, pair[1].index]);
        }
    }

    /// Record the segment between the two on-plane corners of `polygon`,
    /// walking the polygon's own direction
    fn record_cut(&mut self, polygon: &[Corner]) {
        let mut on_plane = polygon
            .iter()
            .enumerate()
            .filter(|(_, corner)| corner.on_plane)
            .map(|(position, _)| position);

        let (first, second) = match (on_plane.next(), on_plane.next(), on_plane.next()) {
            (Some(first), Some(second), None) => (first, second),
            _ => return,
        };

        if second == first + 1 {
            self.boundary.push((polygon[first].index, polygon[second].index));
        } else if first == 0 && second == polygon.len() - 1 {
            self.boundary.push((polygon[second].index, polygon[first].index));
        }
    }

    fn finish(self) -> SideMesh {
        SideMesh {
            mesh: self.mesh,
            boundary: self.boundary,
        }
    }
}

struct Splitter<'a> {
    source: &'a Mesh,
    options: &'a SliceOptions,
    distances: Vec<f64>,
    sides: Vec<PlaneSide>,
    front: SideBuilder,
    back: SideBuilder,
    /// Keyed on the unordered source edge
    intersections: AHashMap<(usize, usize), IntersectionRecord>,
}

impl<'a> Splitter<'a> {
    fn new(source: &'a Mesh, plane: &Plane, options: &'a SliceOptions) -> Self {
        let distances: Vec<f64> = source
            .vertices
            .iter()
            .map(|v| plane.distance_to_point(&v.position))
            .collect();
        let sides = distances
            .iter()
            .map(|&d| PlaneSide::from_distance(d, options.on_plane_tolerance))
            .collect();

        Self {
            source,
            options,
            distances,
            sides,
            front: SideBuilder::new(source),
            back: SideBuilder::new(source),
            intersections: AHashMap::new(),
        }
    }

    fn split_triangle(&mut self, triangle: [usize; 3], front_poly: &mut Vec<Corner>, back_poly: &mut Vec<Corner>) {
        front_poly.clear();
        back_poly.clear();

        for j in 0..3 {
            let current = triangle[j];
            let next = triangle[(j + 1) % 3];
            let side = self.sides[current];
            let on_plane = side == PlaneSide::On;

            if side.keeps_front() {
                let index = self.front.copy_source(self.source, current, self.options);
                front_poly.push(Corner { index, on_plane });
            }
            if side.keeps_back() {
                let index = self.back.copy_source(self.source, current, self.options);
                back_poly.push(Corner { index, on_plane });
            }

            if side.crosses(self.sides[next]) {
                let cut = self.intersection(current, next);
                front_poly.push(Corner {
                    index: cut.front,
                    on_plane: true,
                });
                back_poly.push(Corner {
                    index: cut.back,
                    on_plane: true,
                });
            }
        }

        self.front.fan(front_poly);
        self.back.fan(back_poly);

        let count = |wanted: PlaneSide| triangle.iter().filter(|&&i| self.sides[i] == wanted).count();
        let (in_front, behind, on) = (count(PlaneSide::Front), count(PlaneSide::Back), count(PlaneSide::On));

        if in_front > 0 && behind > 0 {
            self.front.record_cut(front_poly);
            self.back.record_cut(back_poly);
        } else if on == 2 && in_front == 1 {
            self.front.record_cut(front_poly);
        } else if on == 2 && behind == 1 {
            self.back.record_cut(back_poly);
        }
    }

    /// Interpolated vertex on the crossing edge between `current` and
    /// `next`, created on first use and shared by the neighbouring triangle.
    ///
    /// Interpolation always starts at the endpoint with the smaller position,
    /// so duplicated edges (texture seams) produce bit-identical points that
    /// weld afterwards.
    fn intersection(&mut self, current: usize, next: usize) -> IntersectionRecord {
        let key = (current.min(next), current.max(next));
        if let Some(existing) = self.intersections.get(&key) {
            return *existing;
        }

        let (from, to) = if position_order(&self.source.vertices[next], &self.source.vertices[current]).is_lt() {
            (next, current)
        } else {
            (current, next)
        };

        let d_from = self.distances[from].abs();
        let d_to = self.distances[to].abs();
        let t = d_from / (d_from + d_to);

        let a = &self.source.vertices[from];
        let b = &self.source.vertices[to];
        let normal = if self.source.layout.normals {
            lerp_vector(&a.normal, &b.normal, t)
                .try_normalize(0.0)
                .unwrap_or_else(nalgebra::Vector3::zeros)
        } else {
            a.normal
        };
        let record = IntersectionRecord {
            t,
            vertex: Vertex {
                position: lerp_point(&a.position, &b.position, t),
                normal,
                uv: lerp_uv(&a.uv, &b.uv, t),
                color: self.options.intersection_color,
            },
            front: self.front.mesh.vertex_count(),
            back: self.back.mesh.vertex_count(),
        };
        self.front.mesh.add_vertex(record.vertex);
        self.back.mesh.add_vertex(record.vertex);

        log::trace!("edge {}-{} crosses at t = {:.6}", from, to, record.t);

        self.intersections.insert(key, record);
        record
    }
}

/// Lexicographic order on positions
fn position_order(a: &Vertex, b: &Vertex) -> Ordering {
    let (p, q) = (&a.position, &b.position);
    p.x.total_cmp(&q.x)
        .then(p.y.total_cmp(&q.y))
        .then(p.z.total_cmp(&q.z))
}

/// Split `mesh` by a normalized `plane` into front and back halves with
/// their open in-plane boundaries
pub(crate) fn split_mesh(mesh: &Mesh, plane: &Plane, options: &SliceOptions) -> Split {
    let mut splitter = Splitter::new(mesh, plane, options);
    let mut front_poly = Vec::with_capacity(4);
    let mut back_poly = Vec::with_capacity(4);

    for triangle in mesh.triangles() {
        splitter.split_triangle(triangle, &mut front_poly, &mut back_poly);
    }

    Split {
        intersections: splitter.intersections.len(),
        front: splitter.front.finish(),
        back: splitter.back.finish(),
    }
}
