//! Physics module
//!
//! Rigid-body simulation core: bodies with force integration, the bounding
//! volume family, an octree broad phase and pairwise narrow-phase tests.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! - Distances in meters
//! - Velocities in m/s
//! - Accelerations in m/s²
//! - Mass in kg (0 = infinite mass)
//!
//! # Submodules
//!
//! - [`types`] - glam re-exports and the POD [`types::Triangle`]
//! - [`handle`] - Body handles and their allocator
//! - [`volume`] - AABB, OBB, sphere and hull volumes
//! - [`body`] - Rigid bodies and the average-acceleration integrator
//! - [`octree`] - Broad-phase spatial index
//! - [`collision`] - Narrow-phase pair tests and hit data
//! - [`world`] - Handle-based world tying everything together
//!
//! # Threading
//!
//! Nothing here locks. A world and everything it owns is meant to be driven
//! from one simulation thread per tick.

pub mod body;
pub mod collision;
pub mod handle;
pub mod octree;
pub mod types;
pub mod volume;
pub mod world;

// Re-export commonly used types at the physics module level
pub use body::Body;
pub use collision::{CollisionKind, HitData, volume_vs_volume};
pub use handle::{BodyHandle, HandleAllocator};
pub use octree::{Octree, VolumeKey};
pub use types::{Mat4, Triangle, Vec3, Vec4};
pub use volume::{Aabb, BoundingVolume, Bounds, Hull, Obb, Shape, Sphere, VolumeKind};
pub use world::PhysicsWorld;
