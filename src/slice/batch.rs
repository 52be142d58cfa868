// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Parallel slicing of independent meshes using rayon

use super::{slice_in_world, slice_with_options, SliceOptions, SliceOutput};
use crate::error::Result;
use crate::geometry::{Mesh, Plane};
use nalgebra::Matrix4;
use rayon::prelude::*;

/// A mesh placed in a scene
#[derive(Debug, Clone, Copy)]
pub struct SliceJob<'a> {
    pub mesh: &'a Mesh,
    /// Local-to-world transform of the mesh
    pub world_transform: Matrix4<f64>,
}

impl<'a> SliceJob<'a> {
    pub fn new(mesh: &'a Mesh, world_transform: Matrix4<f64>) -> Self {
        Self { mesh, world_transform }
    }
}

/// Slice every mesh by the same local-space plane.
///
/// Results keep the input order. The first failing mesh fails the batch.
pub fn slice_all(meshes: &[Mesh], plane: &Plane, options: &SliceOptions) -> Result<Vec<SliceOutput>> {
    meshes
        .par_iter()
        .map(|mesh| slice_with_options(mesh, plane, options))
        .collect()
}

/// Slice every placed mesh by one world-space plane
pub fn slice_scene(jobs: &[SliceJob<'_>], world_plane: &Plane, options: &SliceOptions) -> Result<Vec<SliceOutput>> {
    log::debug!("slicing {} scene objects", jobs.len());
    jobs.par_iter()
        .map(|job| slice_in_world(job.mesh, &job.world_transform, world_plane, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SliceError;
    use crate::geometry::Primitive;
    use nalgebra::Vector3;

    #[test]
    fn test_slice_all_matches_sequential() {
        let meshes = vec![
            Primitive::sphere(1.0, 12).to_mesh(),
            Primitive::cylinder(2.0, 0.5, 12).to_mesh(),
            Primitive::torus(2.0, 0.5, 16, 8).to_mesh(),
        ];
        let plane = Plane::new(Vector3::new(1.0, 0.0, 0.0), -0.1);
        let options = SliceOptions::default();

        let parallel = slice_all(&meshes, &plane, &options).unwrap();
        for (mesh, output) in meshes.iter().zip(&parallel) {
            assert_eq!(&slice_with_options(mesh, &plane, &options).unwrap(), output);
        }
    }

    #[test]
    fn test_slice_scene_uses_each_transform() {
        let cube = Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true).to_mesh();
        let jobs = [
            SliceJob::new(&cube, Matrix4::identity()),
            // Entirely above the plane
            SliceJob::new(&cube, Matrix4::new_translation(&Vector3::new(0.0, 0.0, 10.0))),
        ];
        let outputs = slice_scene(&jobs, &Plane::new(Vector3::z(), 0.0), &SliceOptions::default()).unwrap();

        assert_eq!(outputs.len(), 2);
        assert!(!outputs[0].back.is_empty());
        assert!(outputs[1].back.is_empty());
        assert_eq!(outputs[1].front.triangle_count(), 12);
    }

    #[test]
    fn test_batch_fails_on_bad_mesh() {
        let mut broken = Primitive::sphere(1.0, 8).to_mesh();
        broken.indices.push(0);
        let meshes = vec![Primitive::sphere(1.0, 8).to_mesh(), broken];

        let result = slice_all(&meshes, &Plane::new(Vector3::z(), 0.0), &SliceOptions::default());
        assert!(matches!(result, Err(SliceError::NotTriangulated { .. })));
    }
}
