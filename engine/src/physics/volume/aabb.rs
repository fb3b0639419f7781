//! Axis-aligned bounding box
//!
//! Stored as a center position plus a half diagonal (always non-negative per
//! component). `min`/`max` are derived and kept in sync on every change.

use glam::{Mat4, Vec3, Vec4};

use super::Bounds;

/// Axis-aligned box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    position: Vec4,
    half_diagonal: Vec4,
    min: Vec4,
    max: Vec4,
}

impl Default for Aabb {
    /// A point box at the origin.
    fn default() -> Self {
        Self::from_center_half_diagonal(Vec4::W, Vec3::ZERO)
    }
}

impl Aabb {
    /// Builds a box spanning two opposite corners.
    ///
    /// `bot == top` is legal and gives a point box.
    pub fn new(bot: Vec4, top: Vec4) -> Self {
        let bot = bot.truncate();
        let top = top.truncate();
        Self::from_center_half_diagonal(((bot + top) * 0.5).extend(1.0), (top - bot).abs() * 0.5)
    }

    /// Builds a box from its center and half diagonal.
    pub fn from_center_half_diagonal(center: Vec4, half_diagonal: Vec3) -> Self {
        let mut aabb = Self {
            position: center.truncate().extend(1.0),
            half_diagonal: half_diagonal.abs().extend(0.0),
            min: Vec4::W,
            max: Vec4::W,
        };
        aabb.calculate_bounds();
        aabb
    }

    fn calculate_bounds(&mut self) {
        let center = self.position.truncate();
        let half = self.half_diagonal.truncate();
        self.min = (center - half).extend(1.0);
        self.max = (center + half).extend(1.0);
    }

    /// Center of the box (`w = 1`).
    pub fn position(&self) -> Vec4 {
        self.position
    }

    /// Vector from the center to the max corner (`w = 0`).
    pub fn half_diagonal(&self) -> Vec4 {
        self.half_diagonal
    }

    /// Minimum corner (`w = 1`).
    pub fn min(&self) -> Vec4 {
        self.min
    }

    /// Maximum corner (`w = 1`).
    pub fn max(&self) -> Vec4 {
        self.max
    }

    /// Applies `transform` to the center, relative to the current position.
    pub fn update_position(&mut self, transform: &Mat4) {
        self.position = transform
            .transform_point3(self.position.truncate())
            .extend(1.0);
        self.calculate_bounds();
    }

    /// Moves the center to an absolute position.
    pub fn set_position(&mut self, position: Vec4) {
        self.position = position.truncate().extend(1.0);
        self.calculate_bounds();
    }

    /// Multiplies the half diagonal component-wise.
    pub fn scale(&mut self, factor: Vec3) {
        self.half_diagonal = (self.half_diagonal.truncate() * factor.abs()).extend(0.0);
        self.calculate_bounds();
    }

    /// Clamps each axis of `point` into `[min, max]`.
    pub fn closest_point(&self, point: Vec4) -> Vec4 {
        point
            .truncate()
            .clamp(self.min.truncate(), self.max.truncate())
            .extend(1.0)
    }

    /// True if `point` is inside the box or on its surface.
    pub fn contains_point(&self, point: Vec4) -> bool {
        let p = point.truncate();
        self.min.truncate().cmple(p).all() && p.cmple(self.max.truncate()).all()
    }

    /// The eight corners; bit 2 of the index selects max x, bit 1 max y,
    /// bit 0 max z.
    pub fn corners(&self) -> [Vec4; 8] {
        let lo = self.min;
        let hi = self.max;
        std::array::from_fn(|i| {
            Vec4::new(
                if i & 4 == 0 { lo.x } else { hi.x },
                if i & 2 == 0 { lo.y } else { hi.y },
                if i & 1 == 0 { lo.z } else { hi.z },
                1.0,
            )
        })
    }

    /// Radius of the sphere through all corners.
    pub fn bounding_radius(&self) -> f32 {
        self.half_diagonal.truncate().length()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            min: self.min.truncate(),
            max: self.max.truncate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_point_at_origin() {
        let aabb = Aabb::default();
        assert_eq!(aabb.position(), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(aabb.half_diagonal(), Vec4::ZERO);
    }

    #[test]
    fn test_swapped_corners_still_positive() {
        let aabb = Aabb::new(Vec4::new(1.0, 1.0, 1.0, 1.0), Vec4::new(-1.0, -1.0, -1.0, 1.0));
        assert_eq!(aabb.half_diagonal(), Vec4::new(1.0, 1.0, 1.0, 0.0));
        assert_eq!(aabb.min(), Vec4::new(-1.0, -1.0, -1.0, 1.0));
    }

    #[test]
    fn test_closest_point_clamps_each_axis() {
        let aabb = Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE);
        let p = aabb.closest_point(Vec4::new(5.0, 0.5, -7.0, 1.0));
        assert_eq!(p, Vec4::new(1.0, 0.5, -1.0, 1.0));

        let inside = Vec4::new(0.25, -0.5, 0.0, 1.0);
        assert_eq!(aabb.closest_point(inside), inside);
        assert!(aabb.contains_point(inside));
    }

    #[test]
    fn test_corners_order() {
        let aabb = Aabb::from_center_half_diagonal(Vec4::W, Vec3::ONE);
        let corners = aabb.corners();
        assert_eq!(corners[0], Vec4::new(-1.0, -1.0, -1.0, 1.0));
        assert_eq!(corners[7], Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(corners[4], Vec4::new(1.0, -1.0, -1.0, 1.0));
    }

    #[test]
    fn test_bounding_radius() {
        let aabb = Aabb::from_center_half_diagonal(Vec4::W, Vec3::new(3.0, 4.0, 0.0));
        assert!((aabb.bounding_radius() - 5.0).abs() < 1e-6);
    }
}
