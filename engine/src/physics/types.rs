//! Physics type re-exports from glam
//!
//! This module provides the core mathematical types used throughout
//! the physics system, re-exported from the glam library, plus the
//! plain-old-data [`Triangle`] used by hull volumes.
//!
//! # Conventions
//!
//! - Points are `Vec4` with `w = 1.0`, directions and extents use `w = 0.0`.
//! - Matrices are column-major `Mat4`; translations live in `w_axis`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

pub use glam::{Mat3, Mat4, Quat, Vec3, Vec4};

/// Number of `f32` values that make up one triangle in a flat vertex stream
/// (three corners of `x, y, z, w`).
pub const FLOATS_PER_TRIANGLE: usize = 12;

/// A triangle with three homogeneous corners.
///
/// Layout is `#[repr(C)]` and `Pod` so a slice of triangles can be handed to
/// debug renderers as a flat `f32` buffer without copying field by field.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Triangle {
    /// Corners in winding order, `w = 1.0`
    pub corners: [Vec4; 3],
}

static_assertions::assert_eq_size!(Triangle, [f32; FLOATS_PER_TRIANGLE]);

impl Triangle {
    /// Creates a triangle from three homogeneous corners.
    pub fn new(a: Vec4, b: Vec4, c: Vec4) -> Self {
        Self { corners: [a, b, c] }
    }

    /// Creates a triangle from three points, setting `w = 1.0` on each corner.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self::new(a.extend(1.0), b.extend(1.0), c.extend(1.0))
    }

    /// Returns the triangle with every corner transformed by `matrix`.
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let [a, b, c] = self.corners;
        Self::from_points(
            matrix.transform_point3(a.truncate()),
            matrix.transform_point3(b.truncate()),
            matrix.transform_point3(c.truncate()),
        )
    }

    /// Unnormalized face normal (`(b - a) x (c - a)`).
    pub fn face_normal(&self) -> Vec3 {
        let [a, b, c] = self.corners.map(Vec4::truncate);
        (b - a).cross(c - a)
    }

    /// Builds triangles from a flat vertex stream of `x, y, z, w` corners.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::MalformedTriangleData`] when the stream length is
    /// not a multiple of [`FLOATS_PER_TRIANGLE`].
    pub fn from_flat(data: &[f32]) -> Result<Vec<Self>, PhysicsError> {
        if data.len() % FLOATS_PER_TRIANGLE != 0 {
            return Err(PhysicsError::MalformedTriangleData(data.len()));
        }

        Ok(data
            .chunks_exact(FLOATS_PER_TRIANGLE)
            .map(|chunk| {
                Self::new(
                    Vec4::from_slice(&chunk[0..4]),
                    Vec4::from_slice(&chunk[4..8]),
                    Vec4::from_slice(&chunk[8..12]),
                )
            })
            .collect())
    }

    /// Flattens triangles back into an `x, y, z, w` vertex stream.
    pub fn to_flat(triangles: &[Self]) -> Vec<f32> {
        bytemuck::cast_slice::<Self, f32>(triangles).to_vec()
    }
}
