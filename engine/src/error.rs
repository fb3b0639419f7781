//! Error types for the fallible, caller-facing parts of the physics core.
//!
//! The per-tick simulation path never returns errors: operations on unknown
//! handles or immovable bodies are defined as no-ops. Only configuration
//! loading, the hull template registry and triangle import can fail.

use thiserror::Error;

/// Errors reported by configuration loading and geometry import.
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Reading a configuration file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration document was not valid JSON for [`crate::config::PhysicsConfig`]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of its accepted range
    #[error("invalid physics config: {0}")]
    InvalidConfig(String),

    /// No hull template is registered under this id
    #[error("unknown hull template '{0}'")]
    UnknownTemplate(String),

    /// A hull template was registered without any triangles
    #[error("hull template '{0}' has no triangles")]
    EmptyTemplate(String),

    /// A flat vertex stream did not hold a whole number of triangles
    #[error("triangle data of length {0} is not a multiple of 12 floats")]
    MalformedTriangleData(usize),
}
