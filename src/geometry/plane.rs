// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cutting planes and point classification

use crate::error::{Result, SliceError};
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Side of a plane a point lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneSide {
    /// Positive signed distance (the side the normal points to)
    Front,
    /// Negative signed distance
    Back,
    /// Within the on-plane band
    On,
}

impl PlaneSide {
    /// Classify a signed distance.
    ///
    /// With `tolerance == 0.0` only an exact zero is `On`. Floating-point
    /// noise near the plane is therefore classified strictly, which can
    /// produce slivers for near-coplanar input.
    pub fn from_distance(distance: f64, tolerance: f64) -> Self {
        if distance > tolerance {
            PlaneSide::Front
        } else if distance < -tolerance {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    /// Whether a vertex on this side is copied into the front half
    pub fn keeps_front(self) -> bool {
        matches!(self, PlaneSide::Front | PlaneSide::On)
    }

    /// Whether a vertex on this side is copied into the back half
    pub fn keeps_back(self) -> bool {
        matches!(self, PlaneSide::Back | PlaneSide::On)
    }

    /// True for an edge whose endpoints sit strictly on opposite sides
    pub fn crosses(self, other: PlaneSide) -> bool {
        matches!(
            (self, other),
            (PlaneSide::Front, PlaneSide::Back) | (PlaneSide::Back, PlaneSide::Front)
        )
    }
}

/// Plane in Hessian normal form: `normal · p + constant = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub constant: f64,
}

impl Plane {
    pub fn new(normal: Vector3<f64>, constant: f64) -> Self {
        Self { normal, constant }
    }

    /// Plane through `point` with the given normal
    pub fn from_normal_and_point(normal: Vector3<f64>, point: &Point3<f64>) -> Self {
        Self {
            normal,
            constant: -point.coords.dot(&normal),
        }
    }

    /// Plane through three points, wound counter-clockwise around the normal.
    /// Returns `None` for collinear points.
    pub fn from_coplanar_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let normal = (b - a).cross(&(c - a)).try_normalize(0.0)?;
        Some(Self::from_normal_and_point(normal, a))
    }

    /// Signed distance, scaled by the normal's length
    pub fn distance_to_point(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.constant
    }

    pub fn classify(&self, point: &Point3<f64>, tolerance: f64) -> PlaneSide {
        PlaneSide::from_distance(self.distance_to_point(point), tolerance)
    }

    /// Check the normal is finite and non-zero
    pub fn validate(&self) -> Result<()> {
        let finite = self.normal.iter().all(|c| c.is_finite()) && self.constant.is_finite();
        if !finite || self.normal.norm_squared() == 0.0 {
            return Err(SliceError::InvalidPlane(self.normal));
        }
        Ok(())
    }

    /// Same plane with a unit-length normal
    pub fn normalized(&self) -> Result<Self> {
        self.validate()?;
        let length = self.normal.norm();
        if !length.is_finite() || length == 0.0 {
            return Err(SliceError::InvalidPlane(self.normal));
        }
        Ok(Self {
            normal: self.normal / length,
            constant: self.constant / length,
        })
    }

    /// Point on the plane closest to the origin
    pub fn coplanar_point(&self) -> Point3<f64> {
        let length_sq = self.normal.norm_squared();
        Point3::from(self.normal * (-self.constant / length_sq))
    }

    /// Opposite orientation, same set of points
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            constant: -self.constant,
        }
    }

    /// Apply an affine transform to the plane.
    ///
    /// The normal is carried by the inverse transpose of the linear part and
    /// re-normalized; a coplanar point is carried by the full matrix.
    pub fn transform(&self, matrix: &Matrix4<f64>) -> Result<Self> {
        let plane = self.normalized()?;
        let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .ok_or(SliceError::NonInvertibleTransform)?
            .transpose();

        let point = matrix.transform_point(&plane.coplanar_point());
        let normal = (normal_matrix * plane.normal)
            .try_normalize(0.0)
            .ok_or(SliceError::NonInvertibleTransform)?;

        Ok(Self::from_normal_and_point(normal, &point))
    }

    /// Express a world-space plane in the local space of an object whose
    /// local-to-world transform is `world`
    pub fn to_local(&self, world: &Matrix4<f64>) -> Result<Self> {
        let inverse = world
            .try_inverse()
            .ok_or(SliceError::NonInvertibleTransform)?;
        self.transform(&inverse)
    }
}
