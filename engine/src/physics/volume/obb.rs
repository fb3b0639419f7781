//! Oriented bounding box
//!
//! Center, half-width extents and a rotation. The rotation is kept as a
//! `Mat3`; the `Mat4` accessors exist for callers that work with full
//! transforms.

use glam::{Mat3, Mat4, Vec3, Vec4};

use super::Bounds;

/// Box with arbitrary orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    position: Vec4,
    extents: Vec3,
    rotation: Mat3,
}

impl Default for Obb {
    fn default() -> Self {
        Self::new(Vec4::W, Vec3::ZERO)
    }
}

impl Obb {
    /// Axis-aligned (identity rotation) box at `center` with half widths `extents`.
    pub fn new(center: Vec4, extents: Vec3) -> Self {
        Self {
            position: center.truncate().extend(1.0),
            extents: extents.abs(),
            rotation: Mat3::IDENTITY,
        }
    }

    /// Box with an initial orientation. Only the upper 3x3 of `rotation` is used.
    pub fn with_rotation(center: Vec4, extents: Vec3, rotation: &Mat4) -> Self {
        Self {
            rotation: Mat3::from_mat4(*rotation),
            ..Self::new(center, extents)
        }
    }

    pub fn position(&self) -> Vec4 {
        self.position
    }

    /// Half widths along the box's local axes.
    pub fn extents(&self) -> Vec3 {
        self.extents
    }

    pub fn set_extents(&mut self, extents: Vec3) {
        self.extents = extents.abs();
    }

    /// Full widths along the local axes.
    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }

    pub fn rotation(&self) -> Mat4 {
        Mat4::from_mat3(self.rotation)
    }

    /// Inverse orientation. Rotations are orthonormal, so this is the transpose.
    pub fn inverse_rotation(&self) -> Mat4 {
        Mat4::from_mat3(self.rotation.transpose())
    }

    /// Local axes in world space (columns of the rotation).
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation.x_axis,
            self.rotation.y_axis,
            self.rotation.z_axis,
        ]
    }

    pub fn set_rotation(&mut self, rotation: &Mat4) {
        self.rotation = Mat3::from_mat4(*rotation);
    }

    /// Applies `transform` to the center, relative to the current position.
    pub fn update_position(&mut self, transform: &Mat4) {
        self.position = transform
            .transform_point3(self.position.truncate())
            .extend(1.0);
    }

    /// Moves the center to an absolute position.
    pub fn set_position(&mut self, position: Vec4) {
        self.position = position.truncate().extend(1.0);
    }

    /// Multiplies the extents component-wise.
    pub fn scale(&mut self, factor: Vec3) {
        self.extents *= factor.abs();
    }

    /// Closest point in or on the box to `point`.
    ///
    /// The point is moved into the box's local frame, clamped to
    /// `[-extent, extent]` on each local axis and moved back to world space.
    pub fn find_closest_pt(&self, point: Vec4) -> Vec4 {
        let center = self.position.truncate();
        let local = self.rotation.transpose() * (point.truncate() - center);
        let clamped = local.clamp(-self.extents, self.extents);
        (center + self.rotation * clamped).extend(1.0)
    }

    /// The eight corners in world space.
    pub fn corners(&self) -> [Vec4; 8] {
        let center = self.position.truncate();
        let e = self.extents;
        std::array::from_fn(|i| {
            let local = Vec3::new(
                if i & 4 == 0 { -e.x } else { e.x },
                if i & 2 == 0 { -e.y } else { e.y },
                if i & 1 == 0 { -e.z } else { e.z },
            );
            (center + self.rotation * local).extend(1.0)
        })
    }

    /// Half size of the world-space AABB enclosing the box.
    pub fn world_half_extents(&self) -> Vec3 {
        self.rotation.x_axis.abs() * self.extents.x
            + self.rotation.y_axis.abs() * self.extents.y
            + self.rotation.z_axis.abs() * self.extents.z
    }

    pub fn bounding_radius(&self) -> f32 {
        self.extents.length()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_center_half_extents(self.position.truncate(), self.world_half_extents())
    }
}
