// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for the slicing kernel

use nalgebra::Vector3;
use thiserror::Error;

/// Precondition violations reported by the slicing kernel.
///
/// Empty halves, degenerate loops and coplanar triangles are valid outcomes
/// and never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SliceError {
    /// Index buffer length is not a multiple of three.
    #[error("mesh is not triangulated: {index_count} indices is not a multiple of 3")]
    NotTriangulated { index_count: usize },

    /// A triangle references a vertex that does not exist.
    #[error("index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds { index: usize, vertex_count: usize },

    /// Plane normal is zero, NaN or infinite.
    #[error("invalid plane normal [{}, {}, {}]", .0.x, .0.y, .0.z)]
    InvalidPlane(Vector3<f64>),

    /// On-plane tolerance is negative, NaN or infinite.
    #[error("invalid on-plane tolerance {0}")]
    InvalidTolerance(f64),

    /// World transform cannot be inverted into mesh-local space.
    #[error("world transform is not invertible")]
    NonInvertibleTransform,
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, SliceError>;
