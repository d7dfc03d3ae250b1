//! Error types for the collision core
//!
//! None of these escape a collision: the resolver logs them and degrades to a
//! safe fallback. They are surfaced only at the edges (factory, scene, config).

use std::fmt;

use crate::sim::body::{BodyId, BodyKind};
use crate::sim::scene::ResourceId;

/// Top-level error enum for the simulation
#[derive(Debug)]
pub enum SimError {
    /// The body factory refused to build a body from the given spec
    FactoryRejected {
        kind: BodyKind,
        /// Human-readable reason (e.g. "radius must be positive")
        reason: &'static str,
    },

    /// A body id was referenced but is not in the live set
    UnknownBody(BodyId),

    /// A body was asked to collide with itself
    SelfCollision(BodyId),

    /// A GPU-side resource could not be released
    ResourceRelease {
        resource: ResourceId,
        reason: &'static str,
    },

    /// Tuning or settings JSON could not be parsed
    Config(serde_json::Error),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::FactoryRejected { kind, reason } => {
                write!(f, "cannot create {}: {}", kind.as_str(), reason)
            }
            SimError::UnknownBody(id) => write!(f, "body {} is not in the live set", id.0),
            SimError::SelfCollision(id) => write!(f, "body {} cannot collide with itself", id.0),
            SimError::ResourceRelease { resource, reason } => {
                write!(f, "failed to release {:?}: {}", resource, reason)
            }
            SimError::Config(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Config(e)
    }
}
