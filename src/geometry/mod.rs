// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation and operations

mod analytics;
mod bbox;
mod mesh;
pub mod mesh_utils;
mod plane;
mod primitives;

pub use analytics::{analyze, MeshStats};
pub use bbox::BoundingBox;
pub use mesh::{Color, Mesh, Vertex, VertexLayout};
pub use plane::{Plane, PlaneSide};
pub use primitives::Primitive;
