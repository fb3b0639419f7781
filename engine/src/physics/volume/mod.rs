//! Bounding volumes attached to rigid bodies
//!
//! A [`BoundingVolume`] wraps one of four shapes ([`Aabb`], [`Obb`], [`Sphere`],
//! [`Hull`]) together with the bookkeeping every shape shares: the owning
//! body's handle, the volume's slot inside that body, and the
//! collision-response flag.
//!
//! # Position contracts
//!
//! - `update_position(&Mat4)` is *cumulative*: the matrix is applied on top of
//!   the current placement, so two calls with a translation `T` move the volume
//!   by `2T`. The simulation uses this every tick.
//! - `set_position(Vec4)` is *absolute*: teleports, editor placement.
//! - `scale(Vec3)` multiplies box extents and the hull's scale factor. Spheres
//!   ignore it and only change through [`Sphere::set_radius`].
//! - `set_rotation(&Mat4)` only affects [`Obb`] and [`Hull`].

pub mod aabb;
pub mod hull;
pub mod obb;
pub mod sphere;

pub use aabb::Aabb;
pub use hull::{Hull, closest_point_on_triangle};
pub use obb::Obb;
pub use sphere::Sphere;

use glam::{Mat4, Vec3, Vec4};

use super::handle::BodyHandle;

/// Type tag of a bounding volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VolumeKind {
    /// No volume (unknown body or index)
    #[default]
    None,
    /// Axis-aligned box
    Aabb,
    /// Oriented box
    Obb,
    /// Sphere
    Sphere,
    /// Triangle hull
    Hull,
}

/// World-space axis-aligned extent used by the broad phase.
///
/// Overlap is inclusive on faces, so touching volumes are reported as
/// potential pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Bounds {
    /// Creates bounds from two corners, ordering components so `min <= max`.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Bounds centered at `center` with the given half extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = half_extents.abs();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Cube around a sphere.
    pub fn from_center_radius(center: Vec3, radius: f32) -> Self {
        Self::from_center_half_extents(center, Vec3::splat(radius))
    }

    /// Smallest bounds containing every point. Returns `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// Component-wise union.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True if the two regions touch or overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// True if `other` lies entirely inside `self` (faces included).
    pub fn contains(&self, other: &Self) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Center of the region.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Size along each axis.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// True if no component is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Minimum corner as a homogeneous point.
    pub fn min_pos(&self) -> Vec4 {
        self.min.extend(1.0)
    }

    /// Maximum corner as a homogeneous point.
    pub fn max_pos(&self) -> Vec4 {
        self.max.extend(1.0)
    }
}

/// The geometric part of a bounding volume.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned box
    Aabb(Aabb),
    /// Oriented box
    Obb(Obb),
    /// Sphere
    Sphere(Sphere),
    /// Triangle hull
    Hull(Hull),
}

/// A shape attached (or about to be attached) to a rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingVolume {
    shape: Shape,
    body: BodyHandle,
    slot: u32,
    collision_response: bool,
}

impl From<Aabb> for BoundingVolume {
    fn from(aabb: Aabb) -> Self {
        Self::new(Shape::Aabb(aabb))
    }
}

impl From<Obb> for BoundingVolume {
    fn from(obb: Obb) -> Self {
        Self::new(Shape::Obb(obb))
    }
}

impl From<Sphere> for BoundingVolume {
    fn from(sphere: Sphere) -> Self {
        Self::new(Shape::Sphere(sphere))
    }
}

impl From<Hull> for BoundingVolume {
    fn from(hull: Hull) -> Self {
        Self::new(Shape::Hull(hull))
    }
}

impl BoundingVolume {
    /// Wraps a shape. The volume starts unowned ([`BodyHandle::NONE`], slot 0)
    /// with collision response enabled.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            body: BodyHandle::NONE,
            slot: 0,
            collision_response: true,
        }
    }

    /// Sets the owning body handle, builder style.
    pub fn with_body(mut self, body: BodyHandle) -> Self {
        self.body = body;
        self
    }

    /// Sets the slot, builder style. Together with the owner it identifies
    /// the volume in the octree, so volumes indexed without a [`Body`] under
    /// the same handle need distinct slots.
    ///
    /// [`Body`]: crate::physics::body::Body
    pub fn with_slot(mut self, slot: u32) -> Self {
        self.slot = slot;
        self
    }

    /// Type tag of the wrapped shape.
    pub fn kind(&self) -> VolumeKind {
        match self.shape {
            Shape::Aabb(_) => VolumeKind::Aabb,
            Shape::Obb(_) => VolumeKind::Obb,
            Shape::Sphere(_) => VolumeKind::Sphere,
            Shape::Hull(_) => VolumeKind::Hull,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Handle of the owning body, [`BodyHandle::NONE`] if unowned.
    pub fn body_handle(&self) -> BodyHandle {
        self.body
    }

    pub fn set_body_handle(&mut self, body: BodyHandle) {
        self.body = body;
    }

    /// Index of this volume inside its owning body.
    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub(crate) fn set_slot(&mut self, slot: u32) {
        self.slot = slot;
    }

    pub fn collision_response(&self) -> bool {
        self.collision_response
    }

    pub fn set_collision_response(&mut self, enabled: bool) {
        self.collision_response = enabled;
    }

    /// World-space position (`w = 1`).
    pub fn position(&self) -> Vec4 {
        match &self.shape {
            Shape::Aabb(v) => v.position(),
            Shape::Obb(v) => v.position(),
            Shape::Sphere(v) => v.position(),
            Shape::Hull(v) => v.position(),
        }
    }

    /// Applies a relative transform on top of the current placement.
    pub fn update_position(&mut self, transform: &Mat4) {
        match &mut self.shape {
            Shape::Aabb(v) => v.update_position(transform),
            Shape::Obb(v) => v.update_position(transform),
            Shape::Sphere(v) => v.update_position(transform),
            Shape::Hull(v) => v.update_position(transform),
        }
    }

    /// Moves the volume to an absolute position.
    pub fn set_position(&mut self, position: Vec4) {
        match &mut self.shape {
            Shape::Aabb(v) => v.set_position(position),
            Shape::Obb(v) => v.set_position(position),
            Shape::Sphere(v) => v.set_position(position),
            Shape::Hull(v) => v.set_position(position),
        }
    }

    /// Multiplies the shape's extent parameters. No effect on spheres.
    pub fn scale(&mut self, factor: Vec3) {
        match &mut self.shape {
            Shape::Aabb(v) => v.scale(factor),
            Shape::Obb(v) => v.scale(factor),
            Shape::Hull(v) => v.scale(factor),
            Shape::Sphere(_) => {}
        }
    }

    /// Sets the orientation. No effect on axis-aligned boxes and spheres.
    pub fn set_rotation(&mut self, rotation: &Mat4) {
        match &mut self.shape {
            Shape::Obb(v) => v.set_rotation(rotation),
            Shape::Hull(v) => v.set_rotation(rotation),
            Shape::Aabb(_) | Shape::Sphere(_) => {}
        }
    }

    /// World-space axis-aligned extent.
    pub fn bounds(&self) -> Bounds {
        match &self.shape {
            Shape::Aabb(v) => v.bounds(),
            Shape::Obb(v) => v.bounds(),
            Shape::Sphere(v) => v.bounds(),
            Shape::Hull(v) => v.bounds(),
        }
    }

    /// Radius of a sphere around [`Self::position`] that encloses the shape.
    pub fn bounding_sphere_radius(&self) -> f32 {
        match &self.shape {
            Shape::Aabb(v) => v.bounding_radius(),
            Shape::Obb(v) => v.bounding_radius(),
            Shape::Sphere(v) => v.radius(),
            Shape::Hull(v) => v.bounding_radius(),
        }
    }

    /// Closest point on (or inside) the shape to `point`.
    pub fn closest_point(&self, point: Vec4) -> Vec4 {
        match &self.shape {
            Shape::Aabb(v) => v.closest_point(point),
            Shape::Obb(v) => v.find_closest_pt(point),
            Shape::Sphere(v) => v.closest_point(point),
            Shape::Hull(v) => v.closest_point(point),
        }
    }

    pub fn as_aabb(&self) -> Option<&Aabb> {
        match &self.shape {
            Shape::Aabb(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_obb(&self) -> Option<&Obb> {
        match &self.shape {
            Shape::Obb(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match &self.shape {
            Shape::Sphere(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sphere_mut(&mut self) -> Option<&mut Sphere> {
        match &mut self.shape {
            Shape::Sphere(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_hull(&self) -> Option<&Hull> {
        match &self.shape {
            Shape::Hull(v) => Some(v),
            _ => None,
        }
    }
}
