//! Haven Physics Engine Library
//!
//! The physics simulation core of an interactive 3D game: rigid-body
//! integration, a closed family of bounding volumes with exact closest-point
//! queries, and a dynamically growing octree broad phase.
//!
//! # Modules
//!
//! - [`physics`] - Bodies, volumes, octree, narrow phase and the world front end
//! - [`config`] - Serde-backed tunables with JSON loading
//! - [`error`] - Error type for the fallible, caller-facing operations
//!
//! # Example
//!
//! ```ignore
//! use haven_physics_engine::{PhysicsConfig, PhysicsWorld};
//! use glam::Vec3;
//!
//! let mut world = PhysicsWorld::new(PhysicsConfig::default());
//! let ground = world.create_aabb(0.0, true, Vec3::ZERO, Vec3::new(20.0, 0.5, 20.0), false);
//! let ball = world.create_sphere(2.0, false, Vec3::new(0.0, 5.0, 0.0), 0.5);
//!
//! world.apply_impulse(ball, Vec3::new(1.0, 0.0, 0.0));
//! world.update(1.0 / 60.0);
//!
//! let mut nearby = Vec::new();
//! let body = world.body(ball).unwrap();
//! world.octree().find_potential_intersections(body.volume(0), &mut nearby);
//! ```

pub mod config;
pub mod error;
pub mod physics;

// Re-export the main entry points at crate level for convenience
pub use config::{OctreeConfig, PhysicsConfig};
pub use error::PhysicsError;
pub use physics::{BodyHandle, PhysicsWorld};
