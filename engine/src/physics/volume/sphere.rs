//! Sphere volume
//!
//! Keeps the squared radius cached so inside/outside tests never need a
//! square root.

use glam::{Mat4, Vec4};

use super::Bounds;

/// Sphere with a center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    position: Vec4,
    prev_position: Vec4,
    radius: f32,
    sqr_radius: f32,
}

impl Default for Sphere {
    /// Zero-radius sphere at the origin.
    fn default() -> Self {
        Self::new(0.0, Vec4::W)
    }
}

impl Sphere {
    /// Creates a sphere. Negative radii are clamped to zero.
    pub fn new(radius: f32, position: Vec4) -> Self {
        let position = position.truncate().extend(1.0);
        let radius = radius.max(0.0);
        Self {
            position,
            prev_position: position,
            radius,
            sqr_radius: radius * radius,
        }
    }

    pub fn position(&self) -> Vec4 {
        self.position
    }

    /// Position before the last `update_position*` call.
    pub fn prev_position(&self) -> Vec4 {
        self.prev_position
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn sqr_radius(&self) -> f32 {
        self.sqr_radius
    }

    /// Changes the radius. This is the only way a sphere's size changes.
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
        self.sqr_radius = self.radius * self.radius;
    }

    /// Applies `transform` on top of the current position.
    pub fn update_position(&mut self, transform: &Mat4) {
        self.prev_position = self.position;
        self.position = transform
            .transform_point3(self.position.truncate())
            .extend(1.0);
    }

    /// Moves the center to `position`, remembering the previous one.
    pub fn update_position_point(&mut self, position: Vec4) {
        self.prev_position = self.position;
        self.position = position.truncate().extend(1.0);
    }

    /// Moves the center to `position` without touching the previous position.
    pub fn set_position(&mut self, position: Vec4) {
        self.position = position.truncate().extend(1.0);
    }

    /// Squared distance from the center to `point`.
    pub fn sqr_distance_to(&self, point: Vec4) -> f32 {
        self.position.truncate().distance_squared(point.truncate())
    }

    /// True if `point` is inside the sphere or on its surface.
    pub fn contains_point(&self, point: Vec4) -> bool {
        self.sqr_distance_to(point) <= self.sqr_radius
    }

    /// Points inside the sphere are their own closest point, outside points
    /// project onto the surface.
    pub fn closest_point(&self, point: Vec4) -> Vec4 {
        if self.contains_point(point) {
            return point.truncate().extend(1.0);
        }
        let center = self.position.truncate();
        let dir = (point.truncate() - center).normalize_or_zero();
        (center + dir * self.radius).extend(1.0)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_center_radius(self.position.truncate(), self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_zero_radius_is_legal() {
        let sphere = Sphere::new(0.0, Vec4::W);
        assert_eq!(sphere.radius(), 0.0);
        assert!(sphere.contains_point(Vec4::W));
        assert!(!sphere.contains_point(Vec4::new(0.001, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_set_radius_updates_square() {
        let mut sphere = Sphere::new(1.0, Vec4::W);
        sphere.set_radius(3.0);
        assert_eq!(sphere.sqr_radius(), 9.0);
    }

    #[test]
    fn test_point_overload_is_absolute() {
        let mut sphere = Sphere::new(1.0, Vec4::new(1.0, 1.0, 1.0, 1.0));
        sphere.update_position_point(Vec4::new(4.0, 0.0, 0.0, 1.0));
        sphere.update_position_point(Vec4::new(4.0, 0.0, 0.0, 1.0));
        assert_eq!(sphere.position(), Vec4::new(4.0, 0.0, 0.0, 1.0));
        assert_eq!(sphere.prev_position(), Vec4::new(4.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_matrix_update_tracks_previous_position() {
        let mut sphere = Sphere::new(1.0, Vec4::W);
        sphere.update_position(&Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(sphere.prev_position(), Vec4::W);
        assert_eq!(sphere.position(), Vec4::new(0.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn test_closest_point_projects_to_surface() {
        let sphere = Sphere::new(2.0, Vec4::W);
        let p = sphere.closest_point(Vec4::new(0.0, 0.0, 10.0, 1.0));
        assert_eq!(p, Vec4::new(0.0, 0.0, 2.0, 1.0));
    }
}
