//! Physics configuration
//!
//! Tunables for the world and the octree broad phase. Every field has a
//! default, so a JSON document only needs to name the values it overrides:
//!
//! ```json
//! { "global_gravity": 20.0, "octree": { "leaf_capacity": 8 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PhysicsError;

// ============================================================================
// DEFAULTS
// ============================================================================

/// Downward acceleration applied to every body (m/s²).
pub const DEFAULT_GRAVITY: f32 = 9.81;

/// Minimum `y` component of a hit normal for the hit to count as standing on
/// ground. Roughly a 47° slope.
pub const DEFAULT_GROUND_NORMAL_THRESHOLD: f32 = 0.68;

/// Entries a node holds before it subdivides.
pub const DEFAULT_LEAF_CAPACITY: usize = 16;

/// Deepest level a node can subdivide to.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// Nodes with an edge shorter than this never subdivide (meters).
pub const DEFAULT_MIN_NODE_SIZE: f32 = 1.0;

// ============================================================================
// OCTREE
// ============================================================================

/// Broad-phase octree tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Entries a node holds before it subdivides
    pub leaf_capacity: usize,
    /// Deepest subdivision level, root is 0
    pub max_depth: u32,
    /// Smallest node edge length that may still subdivide (meters)
    pub min_node_size: f32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            min_node_size: DEFAULT_MIN_NODE_SIZE,
        }
    }
}

impl OctreeConfig {
    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if self.leaf_capacity == 0 {
            return Err(PhysicsError::InvalidConfig(
                "octree.leaf_capacity must be at least 1".into(),
            ));
        }
        if !(self.min_node_size.is_finite() && self.min_node_size > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "octree.min_node_size must be positive, got {}",
                self.min_node_size
            )));
        }
        Ok(())
    }

    /// Copy with unusable values replaced: a zero leaf capacity becomes 1 and
    /// a non-positive or non-finite minimum node size falls back to the default.
    pub fn sanitized(self) -> Self {
        let min_node_size = if self.min_node_size.is_finite() && self.min_node_size > 0.0 {
            self.min_node_size
        } else {
            DEFAULT_MIN_NODE_SIZE
        };
        Self {
            leaf_capacity: self.leaf_capacity.max(1),
            min_node_size,
            ..self
        }
    }
}

// ============================================================================
// WORLD
// ============================================================================

/// Top-level physics settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity given to every body the world creates (m/s², pointing down)
    pub global_gravity: f32,
    /// Minimum hit normal `y` for a contact to count as ground
    pub ground_normal_threshold: f32,
    /// Broad-phase settings
    pub octree: OctreeConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            global_gravity: DEFAULT_GRAVITY,
            ground_normal_threshold: DEFAULT_GROUND_NORMAL_THRESHOLD,
            octree: OctreeConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, PhysicsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhysicsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Pretty-printed JSON, the same shape [`Self::from_json_str`] accepts.
    pub fn to_json_string(&self) -> Result<String, PhysicsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.global_gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "global_gravity must be finite, got {}",
                self.global_gravity
            )));
        }
        if !(0.0..=1.0).contains(&self.ground_normal_threshold) {
            return Err(PhysicsError::InvalidConfig(format!(
                "ground_normal_threshold must be within [0, 1], got {}",
                self.ground_normal_threshold
            )));
        }
        self.octree.validate()
    }
}
