//! Deterministic collision simulation
//!
//! All collision logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (through [`RandomSource`])
//! - Stable iteration order (by body id)
//! - No rendering or platform dependencies; the renderer and UI are reached
//!   only through the collaborator traits

pub mod body;
pub mod bounce;
pub mod classify;
pub mod collision;
pub mod events;
pub mod fragment;
pub mod merge;
pub mod rng;
pub mod scene;
pub mod state;
pub mod tick;

pub use body::{BodyId, BodyKind, BodySpec, CelestialBody, normalize};
pub use classify::{OutcomeKind, classify, impact_parameter};
pub use collision::{
    BodyFactory, BodyHost, BodyLifecycle, CollisionEnv, CollisionResult, collision_energy,
    process_collision,
};
pub use events::{NotificationCenter, Notifier, SoundCue, SoundEvent, ToastKind};
pub use rng::{RandomSource, RngState};
pub use scene::{BlackHoleEffect, GpuResources, NodeId, ResourceId, ResourcePool, SceneGraph};
pub use state::{BodyRegistry, Universe};
pub use tick::{Contact, detect_overlaps, tick};
