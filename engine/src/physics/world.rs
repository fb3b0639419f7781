//! Physics world
//!
//! [`PhysicsWorld`] is the handle-based front end the game layer talks to. It
//! owns every body, the handle allocator, the octree broad phase, the hull
//! template registry and the hit list produced by the last tick.
//!
//! # Tick
//!
//! [`PhysicsWorld::update`] runs, in order:
//!
//! 1. integration of every movable body (gravity only while in the air),
//! 2. re-indexing of every moved volume in the octree,
//! 3. broad phase plus narrow phase per movable body, filling the hit list,
//! 4. contact flags: a hit whose normal `y` exceeds the ground threshold
//!    marks the body as standing on something.
//!
//! Contacts are reported, never resolved: positions and velocities are left
//! for the response layer to correct.
//!
//! # Example
//!
//! ```ignore
//! use haven_physics_engine::config::PhysicsConfig;
//! use haven_physics_engine::physics::PhysicsWorld;
//! use glam::Vec3;
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default());
//! let ground = world.create_aabb(0.0, true, Vec3::ZERO, Vec3::new(50.0, 0.5, 50.0), false);
//! let ball = world.create_sphere(1.0, false, Vec3::new(0.0, 3.0, 0.0), 0.5);
//!
//! for _ in 0..60 {
//!     world.update(1.0 / 60.0);
//! }
//! for hit in world.hit_data() {
//!     println!("{} hit {} at {:?}", hit.collider, hit.victim, hit.position);
//! }
//! ```

use std::collections::HashMap;

use glam::{EulerRot, Mat4, Vec3, Vec4};
use tracing::{debug, info, instrument, warn};

use super::body::Body;
use super::collision::{HitData, volume_vs_volume};
use super::handle::{BodyHandle, HandleAllocator};
use super::octree::Octree;
use super::types::Triangle;
use super::volume::{Aabb, BoundingVolume, Hull, Obb, Shape, Sphere, VolumeKind};
use crate::config::PhysicsConfig;
use crate::error::PhysicsError;

/// Mass given to bodies spawned from a hull template.
const TEMPLATE_INSTANCE_MASS: f32 = 1.0;

/// Owner of all simulation state.
#[derive(Debug)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    handles: HandleAllocator,
    bodies: Vec<Body>,
    /// Position of each body in `bodies`
    slots: HashMap<BodyHandle, usize>,
    octree: Octree,
    hit_data: Vec<HitData>,
    templates: HashMap<String, Vec<Triangle>>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl PhysicsWorld {
    /// Creates an empty world. Unusable octree tuning is replaced by defaults.
    pub fn new(mut config: PhysicsConfig) -> Self {
        let octree = Octree::new(config.octree);
        config.octree = *octree.config();
        info!(
            gravity = config.global_gravity,
            leaf_capacity = config.octree.leaf_capacity,
            "physics world created"
        );
        Self {
            octree,
            config,
            handles: HandleAllocator::new(),
            bodies: Vec::new(),
            slots: HashMap::new(),
            hit_data: Vec::new(),
            templates: HashMap::new(),
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // ========================================================================
    // BODY CREATION
    // ========================================================================

    fn insert_body(&mut self, body: Body) -> BodyHandle {
        let handle = body.handle();
        for volume in body.volumes() {
            self.octree.add_body(handle, volume);
        }
        self.slots.insert(handle, self.bodies.len());
        self.bodies.push(body);
        handle
    }

    fn create_body(
        &mut self,
        mass: f32,
        volume: BoundingVolume,
        is_immovable: bool,
        is_edge: bool,
    ) -> BodyHandle {
        let kind = volume.kind();
        let body = Body::new(&mut self.handles, mass, Some(volume), is_immovable, is_edge);
        let handle = self.insert_body(body);
        info!(%handle, ?kind, mass, is_immovable, "body created");
        handle
    }

    /// Creates a body with a sphere volume.
    pub fn create_sphere(&mut self, mass: f32, is_immovable: bool, position: Vec3, radius: f32) -> BodyHandle {
        self.create_body(
            mass,
            Sphere::new(radius, position.extend(1.0)).into(),
            is_immovable,
            false,
        )
    }

    /// Creates a body with an axis-aligned box volume.
    pub fn create_aabb(
        &mut self,
        mass: f32,
        is_immovable: bool,
        center: Vec3,
        half_diagonal: Vec3,
        is_edge: bool,
    ) -> BodyHandle {
        self.create_body(
            mass,
            Aabb::from_center_half_diagonal(center.extend(1.0), half_diagonal).into(),
            is_immovable,
            is_edge,
        )
    }

    /// Creates a body with an oriented box volume (identity rotation).
    pub fn create_obb(
        &mut self,
        mass: f32,
        is_immovable: bool,
        center: Vec3,
        extents: Vec3,
        is_edge: bool,
    ) -> BodyHandle {
        self.create_body(mass, Obb::new(center.extend(1.0), extents).into(), is_immovable, is_edge)
    }

    /// Creates a body with a hull volume whose origin sits at `position`.
    pub fn create_hull(
        &mut self,
        mass: f32,
        is_immovable: bool,
        position: Vec3,
        triangles: Vec<Triangle>,
    ) -> BodyHandle {
        self.create_body(
            mass,
            Hull::with_position(position.extend(1.0), triangles).into(),
            is_immovable,
            false,
        )
    }

    /// Spawns an immovable hull body from a registered template.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::UnknownTemplate`] if nothing is registered under `template_id`.
    pub fn create_hull_instance(&mut self, template_id: &str) -> Result<BodyHandle, PhysicsError> {
        let Some(triangles) = self.templates.get(template_id).cloned() else {
            warn!(template_id, "unknown hull template");
            return Err(PhysicsError::UnknownTemplate(template_id.to_owned()));
        };
        Ok(self.create_body(TEMPLATE_INSTANCE_MASS, Hull::new(triangles).into(), true, false))
    }

    /// Attaches another volume to an existing body and indexes it.
    ///
    /// Returns the volume's index within the body, `None` for an unknown handle.
    pub fn add_volume(&mut self, handle: BodyHandle, volume: BoundingVolume) -> Option<usize> {
        let Some(&slot) = self.slots.get(&handle) else {
            warn!(%handle, "add_volume on unknown body");
            return None;
        };
        let body = &mut self.bodies[slot];
        body.add_volume(volume);
        let index = body.volume_count() - 1;
        self.octree.add_body(handle, body.volume(index));
        Some(index)
    }

    // ========================================================================
    // HULL TEMPLATES
    // ========================================================================

    /// Registers (or replaces) a named hull template.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::EmptyTemplate`] if `triangles` is empty.
    pub fn register_hull_template(
        &mut self,
        template_id: impl Into<String>,
        triangles: Vec<Triangle>,
    ) -> Result<(), PhysicsError> {
        let template_id = template_id.into();
        if triangles.is_empty() {
            return Err(PhysicsError::EmptyTemplate(template_id));
        }
        info!(template_id = %template_id, triangles = triangles.len(), "hull template registered");
        self.templates.insert(template_id, triangles);
        Ok(())
    }

    /// Registers a template from a flat `x, y, z, w` vertex stream.
    ///
    /// # Errors
    ///
    /// [`PhysicsError::MalformedTriangleData`] for a partial triangle,
    /// [`PhysicsError::EmptyTemplate`] for an empty stream.
    pub fn register_hull_template_from_flat(
        &mut self,
        template_id: impl Into<String>,
        data: &[f32],
    ) -> Result<(), PhysicsError> {
        let triangles = Triangle::from_flat(data)?;
        self.register_hull_template(template_id, triangles)
    }

    /// Forgets a template. Bodies already spawned from it are unaffected.
    pub fn release_hull_template(&mut self, template_id: &str) -> bool {
        let removed = self.templates.remove(template_id).is_some();
        if removed {
            info!(template_id, "hull template released");
        }
        removed
    }

    pub fn has_hull_template(&self, template_id: &str) -> bool {
        self.templates.contains_key(template_id)
    }

    // ========================================================================
    // BODY MUTATION
    // ========================================================================

    fn with_body<F>(&mut self, handle: BodyHandle, op: &str, f: F) -> bool
    where
        F: FnOnce(&mut Body),
    {
        match self.slots.get(&handle) {
            Some(&slot) => {
                f(&mut self.bodies[slot]);
                true
            }
            None => {
                warn!(%handle, op, "unknown body");
                false
            }
        }
    }

    /// Re-indexes every volume of a body after it was moved through
    /// [`Self::body_mut`].
    pub fn reindex_body(&mut self, handle: BodyHandle) {
        if let Some(&slot) = self.slots.get(&handle) {
            let body = &self.bodies[slot];
            for volume in body.volumes() {
                self.octree.update_body(handle, volume);
            }
        }
    }

    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) {
        self.with_body(handle, "apply_force", |b| b.add_force(force.extend(0.0)));
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        self.with_body(handle, "apply_impulse", |b| b.add_impulse(impulse.extend(0.0)));
    }

    /// Teleports a body; its volumes keep their offsets.
    pub fn set_body_position(&mut self, handle: BodyHandle, position: Vec3) {
        if self.with_body(handle, "set_body_position", |b| b.set_position(position.extend(1.0))) {
            self.reindex_body(handle);
        }
    }

    /// Orients a body from yaw (Y), pitch (X) and roll (Z) in radians.
    /// Roll is applied first, yaw last.
    pub fn set_body_rotation(&mut self, handle: BodyHandle, yaw: f32, pitch: f32, roll: f32) {
        let rotation = Mat4::from_euler(EulerRot::YXZ, yaw, pitch, roll);
        if self.with_body(handle, "set_body_rotation", |b| b.set_rotation(&rotation)) {
            self.reindex_body(handle);
        }
    }

    pub fn set_body_scale(&mut self, handle: BodyHandle, scale: Vec3) {
        if self.with_body(handle, "set_body_scale", |b| b.scale(scale)) {
            self.reindex_body(handle);
        }
    }

    pub fn set_body_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        self.with_body(handle, "set_body_velocity", |b| b.set_velocity(velocity.extend(0.0)));
    }

    /// Gravity handed to airborne bodies from the next tick on.
    pub fn set_global_gravity(&mut self, gravity: f32) {
        self.config.global_gravity = gravity;
    }

    /// Destroys a body and drops its octree entries.
    pub fn release_body(&mut self, handle: BodyHandle) -> bool {
        let Some(slot) = self.slots.remove(&handle) else {
            warn!(%handle, "release of unknown body");
            return false;
        };
        let body = self.bodies.swap_remove(slot);
        for volume in body.volumes() {
            self.octree.remove_body(handle, volume);
        }
        if let Some(moved) = self.bodies.get(slot) {
            self.slots.insert(moved.handle(), slot);
        }
        info!(%handle, "body released");
        true
    }

    /// Destroys every body, clears hits and restarts handles at 1.
    /// Hull templates are kept.
    pub fn release_all(&mut self) {
        info!(bodies = self.bodies.len(), "releasing all bodies");
        self.bodies.clear();
        self.slots.clear();
        self.octree.clear();
        self.hit_data.clear();
        self.handles.reset_counter();
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.slots.get(&handle).map(|&slot| &self.bodies[slot])
    }

    /// Mutable access to a body. Call [`Self::reindex_body`] after moving
    /// any of its volumes.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.slots.get(&handle).map(|&slot| &mut self.bodies[slot])
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body_position(&self, handle: BodyHandle) -> Option<Vec4> {
        self.body(handle).map(Body::position)
    }

    pub fn body_velocity(&self, handle: BodyHandle) -> Option<Vec4> {
        self.body(handle).map(Body::velocity)
    }

    pub fn body_in_air(&self, handle: BodyHandle) -> Option<bool> {
        self.body(handle).map(Body::in_air)
    }

    /// Half extents of a body's primary volume: the half diagonal of a box,
    /// the radius on every axis of a sphere, the local half widths of an
    /// oriented box and the scale of a hull. `None` for an unknown body.
    pub fn body_size(&self, handle: BodyHandle) -> Option<Vec3> {
        let body = self.body(handle)?;
        let size = match body.volumes().first()?.shape() {
            Shape::Aabb(a) => a.half_diagonal().truncate(),
            Shape::Sphere(s) => Vec3::splat(s.radius()),
            Shape::Obb(o) => o.extents(),
            Shape::Hull(h) => h.scale_factor().truncate(),
        };
        Some(size)
    }

    /// Kind of volume `index` of a body, [`VolumeKind::None`] if either is unknown.
    pub fn volume_kind(&self, handle: BodyHandle, index: usize) -> VolumeKind {
        self.body(handle)
            .and_then(|b| b.volumes().get(index))
            .map_or(VolumeKind::None, BoundingVolume::kind)
    }

    /// Number of volumes on a body, 0 if unknown.
    pub fn volume_count(&self, handle: BodyHandle) -> usize {
        self.body(handle).map_or(0, Body::volume_count)
    }

    /// Hits recorded by the last [`Self::update`].
    pub fn hit_data(&self) -> &[HitData] {
        &self.hit_data
    }

    pub fn hit_data_at(&self, index: usize) -> Option<&HitData> {
        self.hit_data.get(index)
    }

    /// Removes a hit once the response layer has handled it. Later hits
    /// shift down by one.
    pub fn remove_hit_data_at(&mut self, index: usize) -> Option<HitData> {
        (index < self.hit_data.len()).then(|| self.hit_data.remove(index))
    }

    pub fn hit_data_len(&self) -> usize {
        self.hit_data.len()
    }

    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    // ========================================================================
    // SIMULATION
    // ========================================================================

    /// Advances the simulation by `dt` seconds.
    #[instrument(level = "debug", skip(self))]
    pub fn update(&mut self, dt: f32) {
        self.hit_data.clear();

        let gravity = self.config.global_gravity;
        for body in self.bodies.iter_mut().filter(|b| !b.is_immovable()) {
            body.set_gravity(if body.in_air() { gravity } else { 0.0 });
            body.update(dt);
        }

        for body in self.bodies.iter().filter(|b| !b.is_immovable()) {
            for volume in body.volumes() {
                self.octree.update_body(body.handle(), volume);
            }
        }

        let threshold = self.config.ground_normal_threshold;
        for i in 0..self.bodies.len() {
            if self.bodies[i].is_immovable() {
                continue;
            }
            let (hits, on_something) = self.collide_body(i, threshold);

            let body = &mut self.bodies[i];
            let was_in_air = body.in_air();
            body.set_on_something(on_something);
            body.set_in_air(!on_something);
            body.set_landed(was_in_air && on_something);
            self.hit_data.extend(hits);
        }

        debug!(
            bodies = self.bodies.len(),
            hits = self.hit_data.len(),
            "physics tick"
        );
    }

    /// Narrow phase for one body against its broad-phase candidates.
    fn collide_body(&self, index: usize, threshold: f32) -> (Vec<HitData>, bool) {
        let body = &self.bodies[index];
        let handle = body.handle();
        let mut hits = Vec::new();
        let mut on_something = false;

        for collider in body.volumes() {
            let bounds = collider.bounds();
            for other in self.octree.query_bounds(&bounds, Some(handle)) {
                let Some(victim_body) = self.body(other) else {
                    continue;
                };
                for victim in victim_body.volumes() {
                    if !bounds.overlaps(&victim.bounds()) {
                        continue;
                    }
                    let mut hit = volume_vs_volume(collider, victim);
                    if !hit.intersect {
                        continue;
                    }
                    hit.is_edge = victim_body.is_edge();
                    if collider.collision_response()
                        && victim.collision_response()
                        && hit.normal.y > threshold
                    {
                        on_something = true;
                    }
                    hits.push(hit);
                }
            }
        }
        (hits, on_something)
    }
}
