// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshslice
//!
//! Plane slicing kernel for indexed triangle meshes. A cut splits a mesh
//! into the geometry in front of a plane and the geometry behind it,
//! interpolating vertex attributes along crossing edges, and closes each
//! half with cap triangles rebuilt from the cut's boundary loops.
//!
//! ```
//! use meshslice::{slice, Plane, Primitive};
//! use nalgebra::Vector3;
//!
//! let sphere = Primitive::sphere(1.0, 24).to_mesh();
//! let plane = Plane::new(Vector3::new(0.0, 1.0, 0.0), 0.0);
//! let (top, bottom) = slice(&sphere, &plane, true).unwrap();
//! assert!(!top.is_empty() && !bottom.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod slice;
pub mod utils;

pub use config::SliceConfig;
pub use error::{Result, SliceError};
pub use geometry::{analyze, Color, Mesh, MeshStats, Plane, PlaneSide, Primitive, Vertex, VertexLayout};
pub use io::{export, export_stl, export_gltf, import_stl, ExportFormat};
pub use slice::{
    reconstruct_loops, slice, slice_all, slice_in_world, slice_scene, slice_with_options, EdgeLoop, SideReport,
    SliceJob, SliceOptions, SliceOutput, SliceReport,
};
