//! Rigid bodies
//!
//! A [`Body`] accumulates forces during a tick and integrates them in
//! [`Body::update`] with a two-point average-acceleration scheme:
//!
//! ```text
//! new     = net_force / mass
//! last    = average            (average of the previous step)
//! average = (last + new) / 2
//! velocity += average * dt
//! position += velocity * dt
//! ```
//!
//! The resulting translation is pushed to every owned bounding volume as a
//! relative transform, so volumes never need to know the body's absolute
//! position.
//!
//! # Example
//!
//! ```ignore
//! use haven_physics_engine::physics::{Body, HandleAllocator, Sphere};
//! use glam::Vec4;
//!
//! let mut handles = HandleAllocator::new();
//! let mut body = Body::new(&mut handles, 1.0, Some(Sphere::new(0.5, Vec4::W).into()), false, false);
//! body.add_force(Vec4::new(5.0, 0.0, 0.0, 0.0));
//! body.update(1.0 / 60.0);
//! ```

use glam::{Mat4, Vec3, Vec4};

use super::handle::{BodyHandle, HandleAllocator};
use super::volume::BoundingVolume;

/// A simulated rigid body owning one or more bounding volumes.
///
/// Bodies are intentionally not `Clone`: a clone would share the handle of the
/// original. Moving a body keeps its handle and all of its state.
#[derive(Debug)]
pub struct Body {
    handle: BodyHandle,
    volumes: Vec<BoundingVolume>,
    /// Mass in kg, 0 means infinite mass
    mass: f32,
    /// World position, `w = 1`
    position: Vec4,
    velocity: Vec4,
    net_force: Vec4,
    /// Acceleration computed in the latest step
    new_acceleration: Vec4,
    /// Average acceleration of the step before the latest
    last_acceleration: Vec4,
    average_acceleration: Vec4,
    /// Downward acceleration applied at the start of each step (m/s²)
    gravity: f32,
    orientation: Mat4,
    in_air: bool,
    is_immovable: bool,
    is_edge: bool,
    landed: bool,
    on_something: bool,
}

impl Body {
    /// Creates a body and assigns it the next handle from `handles`.
    ///
    /// # Arguments
    /// * `handles` - Allocator the handle is drawn from
    /// * `mass` - Mass in kg; 0 makes the body ignore forces and impulses
    /// * `volume` - Optional first bounding volume; its position becomes the
    ///   body's position
    /// * `is_immovable` - Immovable bodies are skipped by [`Body::update`]
    /// * `is_edge` - Marks level geometry edges that hits should be flagged with
    pub fn new(
        handles: &mut HandleAllocator,
        mass: f32,
        volume: Option<BoundingVolume>,
        is_immovable: bool,
        is_edge: bool,
    ) -> Self {
        let handle = handles.next_handle();
        let position = volume
            .as_ref()
            .map_or(Vec4::W, |v| v.position().truncate().extend(1.0));

        let mut body = Self {
            handle,
            volumes: Vec::new(),
            mass,
            position,
            velocity: Vec4::ZERO,
            net_force: Vec4::ZERO,
            new_acceleration: Vec4::ZERO,
            last_acceleration: Vec4::ZERO,
            average_acceleration: Vec4::ZERO,
            gravity: 0.0,
            orientation: Mat4::IDENTITY,
            in_air: true,
            is_immovable,
            is_edge,
            landed: false,
            on_something: false,
        };
        if let Some(volume) = volume {
            body.add_volume(volume);
        }
        body
    }

    /// Sets the initial in-air flag, builder style.
    pub fn with_in_air(mut self, in_air: bool) -> Self {
        self.in_air = in_air;
        self
    }

    /// Adds `force` to the net force of the current step.
    pub fn add_force(&mut self, force: Vec4) {
        self.net_force += force.truncate().extend(0.0);
    }

    /// Changes velocity by `impulse / mass` immediately.
    ///
    /// No-op for zero-mass and immovable bodies.
    pub fn add_impulse(&mut self, impulse: Vec4) {
        if self.mass == 0.0 || self.is_immovable {
            return;
        }
        self.velocity += impulse.truncate().extend(0.0) / self.mass;
    }

    /// Integrates one time step and moves every owned volume.
    ///
    /// Zero-mass and immovable bodies are left untouched, including their
    /// pending forces.
    pub fn update(&mut self, dt: f32) {
        if self.is_immovable || self.mass == 0.0 {
            return;
        }

        self.net_force.y -= self.mass * self.gravity;

        self.new_acceleration = (self.net_force.truncate() / self.mass).extend(0.0);
        self.last_acceleration = self.average_acceleration;
        self.average_acceleration = (self.last_acceleration + self.new_acceleration) * 0.5;

        self.velocity += self.average_acceleration * dt;
        let delta = self.velocity.truncate() * dt;
        self.position += delta.extend(0.0);

        self.net_force = Vec4::ZERO;
        self.translate_volumes(delta);
    }

    fn translate_volumes(&mut self, delta: Vec3) {
        let transform = Mat4::from_translation(delta);
        for volume in &mut self.volumes {
            volume.update_position(&transform);
        }
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn position(&self) -> Vec4 {
        self.position
    }

    /// Moves the body to an absolute position. Volumes are shifted by the
    /// same delta, so their offsets from the body are kept.
    pub fn set_position(&mut self, position: Vec4) {
        let delta = position.truncate() - self.position.truncate();
        self.position = position.truncate().extend(1.0);
        self.translate_volumes(delta);
    }

    pub fn velocity(&self) -> Vec4 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec4) {
        self.velocity = velocity.truncate().extend(0.0);
    }

    /// Pending force of the current step.
    pub fn net_force(&self) -> Vec4 {
        self.net_force
    }

    /// Acceleration computed in the latest step.
    pub fn acceleration(&self) -> Vec4 {
        self.new_acceleration
    }

    /// Average acceleration of the step before the latest.
    pub fn last_acceleration(&self) -> Vec4 {
        self.last_acceleration
    }

    pub fn average_acceleration(&self) -> Vec4 {
        self.average_acceleration
    }

    pub fn gravity(&self) -> f32 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    pub fn orientation(&self) -> Mat4 {
        self.orientation
    }

    /// Sets the body orientation and forwards it to every volume.
    pub fn set_rotation(&mut self, rotation: &Mat4) {
        self.orientation = *rotation;
        for volume in &mut self.volumes {
            volume.set_rotation(rotation);
        }
    }

    /// Scales every owned volume.
    pub fn scale(&mut self, factor: Vec3) {
        for volume in &mut self.volumes {
            volume.scale(factor);
        }
    }

    pub fn in_air(&self) -> bool {
        self.in_air
    }

    pub fn set_in_air(&mut self, in_air: bool) {
        self.in_air = in_air;
    }

    pub fn is_immovable(&self) -> bool {
        self.is_immovable
    }

    pub fn is_edge(&self) -> bool {
        self.is_edge
    }

    pub fn landed(&self) -> bool {
        self.landed
    }

    pub fn set_landed(&mut self, landed: bool) {
        self.landed = landed;
    }

    pub fn on_something(&self) -> bool {
        self.on_something
    }

    pub fn set_on_something(&mut self, on_something: bool) {
        self.on_something = on_something;
    }

    /// Takes ownership of `volume`, pointing its back-reference at this body.
    pub fn add_volume(&mut self, mut volume: BoundingVolume) {
        volume.set_body_handle(self.handle);
        volume.set_slot(self.volumes.len() as u32);
        self.volumes.push(volume);
    }

    /// Volume at `index`. Panics if out of range.
    pub fn volume(&self, index: usize) -> &BoundingVolume {
        &self.volumes[index]
    }

    /// Volume at `index`. Panics if out of range.
    pub fn volume_mut(&mut self, index: usize) -> &mut BoundingVolume {
        &mut self.volumes[index]
    }

    pub fn volumes(&self) -> &[BoundingVolume] {
        &self.volumes
    }

    pub fn volume_count(&self) -> usize {
        self.volumes.len()
    }

    /// Places a single volume at an absolute position. Panics if out of range.
    pub fn set_volume_position(&mut self, index: usize, position: Vec4) {
        self.volumes[index].set_position(position);
    }

    /// Panics if `index` is out of range.
    pub fn collision_response(&self, index: usize) -> bool {
        self.volumes[index].collision_response()
    }

    /// Panics if `index` is out of range.
    pub fn set_collision_response(&mut self, index: usize, enabled: bool) {
        self.volumes[index].set_collision_response(enabled);
    }

    pub fn set_collision_response_all(&mut self, enabled: bool) {
        for volume in &mut self.volumes {
            volume.set_collision_response(enabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::volume::{Aabb, Sphere};

    fn body(handles: &mut HandleAllocator, mass: f32) -> Body {
        Body::new(handles, mass, None, false, false)
    }

    #[test]
    fn test_defaults() {
        let mut handles = HandleAllocator::new();
        let b = body(&mut handles, 1.0);
        assert_eq!(b.position(), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert!(b.in_air());
        assert!(!b.is_edge());
        assert!(!b.is_immovable());
        assert_eq!(b.gravity(), 0.0);
        assert_eq!(b.orientation(), Mat4::IDENTITY);
    }

    #[test]
    fn test_forces_accumulate_and_clear() {
        let mut handles = HandleAllocator::new();
        let mut b = body(&mut handles, 1.0);
        b.add_force(Vec4::new(1.0, 0.0, 3.0, 0.0));
        b.add_force(Vec4::new(1.0, 0.0, 3.0, 0.0));
        assert_eq!(b.net_force(), Vec4::new(2.0, 0.0, 6.0, 0.0));

        b.update(0.1);
        assert_eq!(b.net_force(), Vec4::ZERO);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut handles = HandleAllocator::new();
        let mut b = body(&mut handles, 2.0);
        b.set_gravity(10.0);
        b.update(1.0);
        assert_eq!(b.acceleration(), Vec4::new(0.0, -10.0, 0.0, 0.0));
        assert!(b.velocity().y < 0.0);
    }

    #[test]
    fn test_immovable_body_ignores_everything() {
        let mut handles = HandleAllocator::new();
        let mut b = Body::new(&mut handles, 1.0, None, true, false);
        b.add_force(Vec4::new(10.0, 0.0, 0.0, 0.0));
        b.add_impulse(Vec4::new(10.0, 0.0, 0.0, 0.0));
        b.update(1.0);
        assert_eq!(b.position(), Vec4::W);
        assert_eq!(b.velocity(), Vec4::ZERO);
    }

    #[test]
    fn test_volumes_follow_integration() {
        let mut handles = HandleAllocator::new();
        let sphere = Sphere::new(1.0, Vec4::new(0.0, 2.0, 0.0, 1.0));
        let mut b = Body::new(&mut handles, 1.0, Some(sphere.into()), false, false);
        assert_eq!(b.position(), Vec4::new(0.0, 2.0, 0.0, 1.0));

        b.set_velocity(Vec4::new(1.0, 0.0, 0.0, 0.0));
        b.update(0.5);
        assert_eq!(b.position(), Vec4::new(0.5, 2.0, 0.0, 1.0));
        assert_eq!(b.volume(0).position(), b.position());
    }

    #[test]
    fn test_set_position_keeps_volume_offsets() {
        let mut handles = HandleAllocator::new();
        let mut b = body(&mut handles, 1.0);
        b.add_volume(Aabb::from_center_half_diagonal(Vec4::new(1.0, 0.0, 0.0, 1.0), Vec3::ONE).into());
        b.set_position(Vec4::new(0.0, 10.0, 0.0, 1.0));
        assert_eq!(b.volume(0).position(), Vec4::new(1.0, 10.0, 0.0, 1.0));
    }

    #[test]
    fn test_added_volumes_point_back_at_body() {
        let mut handles = HandleAllocator::new();
        let mut b = body(&mut handles, 1.0);
        b.add_volume(Sphere::default().into());
        b.add_volume(Sphere::default().into());
        assert_eq!(b.volume(1).body_handle(), b.handle());
        assert_eq!(b.volume(1).slot(), 1);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_volume_panics() {
        let mut handles = HandleAllocator::new();
        let b = body(&mut handles, 1.0);
        let _ = b.volume(0);
    }
}
