// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Plane slicing
//!
//! Splits a triangle mesh into the part in front of a plane and the part
//! behind it, then optionally closes the opening on each half with cap
//! triangles so both halves stay solid.
//!
//! The plane must be expressed in the mesh's local space. Use
//! [`slice_in_world`] when the plane is given in world space.

mod batch;
mod caps;
mod engine;
pub mod loops;

pub use batch::{slice_all, slice_scene, SliceJob};
pub use loops::{reconstruct, reconstruct_loops, EdgeLoop, LoopReconstruction};

use crate::error::{Result, SliceError};
use crate::geometry::{Color, Mesh, Plane};
use caps::CapSide;
use engine::SideMesh;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// Slicing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceOptions {
    /// Fill the cut opening of each half with cap triangles
    pub close_holes: bool,
    /// Rebuild vertex normals from the final topology
    pub recompute_normals: bool,
    /// Half-width of the band classified as on the plane
    pub on_plane_tolerance: f64,
    /// Color given to copied vertices when the input has none
    pub base_color: Color,
    /// Color marking vertices created on the cut
    pub intersection_color: Color,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            close_holes: true,
            recompute_normals: true,
            on_plane_tolerance: 0.0,
            base_color: Color::WHITE,
            intersection_color: Color::MAGENTA,
        }
    }
}

impl SliceOptions {
    pub fn with_close_holes(mut self, close_holes: bool) -> Self {
        self.close_holes = close_holes;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.on_plane_tolerance = tolerance;
        self
    }
}

/// Per-half slicing statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideReport {
    /// Surface triangles after welding, before capping
    pub triangles: usize,
    /// Edge count of every capped loop
    pub loop_lengths: Vec<usize>,
    pub cap_triangles: usize,
    pub cap_area: f64,
    /// Boundary chains that never closed
    pub open_chains: usize,
    /// Closed boundary chains of fewer than three edges
    pub degenerate_loops: usize,
}

/// Slicing statistics for both halves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceReport {
    /// Source edges crossing the plane
    pub intersections: usize,
    pub front: SideReport,
    pub back: SideReport,
}

/// Both halves of a slice
#[derive(Debug, Clone, PartialEq)]
pub struct SliceOutput {
    /// Geometry on the side the plane normal points to
    pub front: Mesh,
    /// Geometry on the opposite side
    pub back: Mesh,
    pub report: SliceReport,
}

impl SliceOutput {
    pub fn into_halves(self) -> (Mesh, Mesh) {
        (self.front, self.back)
    }
}

/// Slice `mesh` by `plane` with default options, returning `(front, back)`.
///
/// A half with no geometry comes back as an empty mesh.
pub fn slice(mesh: &Mesh, plane: &Plane, close_holes: bool) -> Result<(Mesh, Mesh)> {
    let options = SliceOptions::default().with_close_holes(close_holes);
    slice_with_options(mesh, plane, &options).map(SliceOutput::into_halves)
}

/// Slice `mesh` by `plane`
pub fn slice_with_options(mesh: &Mesh, plane: &Plane, options: &SliceOptions) -> Result<SliceOutput> {
    mesh.validate()?;
    let plane = plane.normalized()?;
    let tolerance = options.on_plane_tolerance;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(SliceError::InvalidTolerance(tolerance));
    }

    let split = engine::split_mesh(mesh, &plane, options);
    let (front, front_report) = finish_side(split.front, &plane, CapSide::Front, options);
    let (back, back_report) = finish_side(split.back, &plane, CapSide::Back, options);

    let report = SliceReport {
        intersections: split.intersections,
        front: front_report,
        back: back_report,
    };

    log::debug!(
        "sliced {} triangles: front {} (+{} cap), back {} (+{} cap), {} intersections",
        mesh.triangle_count(),
        report.front.triangles,
        report.front.cap_triangles,
        report.back.triangles,
        report.back.cap_triangles,
        report.intersections
    );

    Ok(SliceOutput { front, back, report })
}

/// Slice a mesh placed in a scene by a plane given in world space.
///
/// The plane is carried into the mesh's local space through the inverse of
/// `world_transform`; the halves are returned in local space.
pub fn slice_in_world(
    mesh: &Mesh,
    world_transform: &Matrix4<f64>,
    world_plane: &Plane,
    options: &SliceOptions,
) -> Result<SliceOutput> {
    let local_plane = world_plane.to_local(world_transform)?;
    slice_with_options(mesh, &local_plane, options)
}

/// Weld, re-shade and cap one half
fn finish_side(side: SideMesh, plane: &Plane, cap_side: CapSide, options: &SliceOptions) -> (Mesh, SideReport) {
    let SideMesh { mut mesh, boundary } = side;

    let remap = mesh.merge_vertices();
    let boundary: Vec<(usize, usize)> = boundary
        .into_iter()
        .map(|(a, b)| (remap[a], remap[b]))
        .filter(|(a, b)| a != b)
        .collect();

    if options.recompute_normals {
        mesh.recompute_normals();
    }

    let mut report = SideReport {
        triangles: mesh.triangle_count(),
        ..SideReport::default()
    };

    if options.close_holes && !boundary.is_empty() {
        let summary = caps::close_holes(&mut mesh, &boundary, plane, cap_side);
        report.loop_lengths = summary.loop_lengths;
        report.cap_triangles = summary.cap_triangles;
        report.cap_area = summary.cap_area;
        report.open_chains = summary.open_chains;
        report.degenerate_loops = summary.degenerate_loops;
    }

    mesh.remove_orphaned_vertices();
    (mesh, report)
}
