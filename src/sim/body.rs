//! Celestial bodies as the collision core sees them

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::scene::NodeId;

/// Stable identity of a live body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Body types the player can spawn (or that debris becomes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyKind {
    Asteroid,
    Comet,
    Moon,
    Planet,
    Star,
    BlackHole,
}

impl BodyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::Asteroid => "asteroid",
            BodyKind::Comet => "comet",
            BodyKind::Moon => "moon",
            BodyKind::Planet => "planet",
            BodyKind::Star => "star",
            BodyKind::BlackHole => "black_hole",
        }
    }

    /// Parse the `as_str` form (as sent by the page)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "asteroid" => Some(BodyKind::Asteroid),
            "comet" => Some(BodyKind::Comet),
            "moon" => Some(BodyKind::Moon),
            "planet" => Some(BodyKind::Planet),
            "star" => Some(BodyKind::Star),
            "black_hole" => Some(BodyKind::BlackHole),
            _ => None,
        }
    }

    /// Label used in player-facing messages
    pub fn display_name(&self) -> &'static str {
        match self {
            BodyKind::Asteroid => "Asteroid",
            BodyKind::Comet => "Comet",
            BodyKind::Moon => "Moon",
            BodyKind::Planet => "Planet",
            BodyKind::Star => "Star",
            BodyKind::BlackHole => "Black Hole",
        }
    }

    #[inline]
    pub fn is_black_hole(&self) -> bool {
        *self == BodyKind::BlackHole
    }
}

/// Everything the body factory needs to build a new body
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub kind: BodyKind,
    pub name: String,
    pub mass: f64,
    pub radius: f64,
    pub position: DVec3,
    pub velocity: DVec3,
}

impl BodySpec {
    pub fn new(kind: BodyKind, mass: f64, radius: f64) -> Self {
        Self {
            kind,
            name: kind.display_name().to_string(),
            mass,
            radius,
            position: DVec3::ZERO,
            velocity: DVec3::ZERO,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn moving(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }
}

/// A live celestial body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelestialBody {
    pub id: BodyId,
    pub name: String,
    pub kind: BodyKind,
    pub mass: f64,
    pub radius: f64,
    pub position: DVec3,
    pub velocity: DVec3,
    /// Render scale multiplier, tracks radius changes from merges
    pub visual_scale: f64,
    /// Scene node owning this body's render resources
    #[serde(skip)]
    pub node: Option<NodeId>,
}

impl CelestialBody {
    pub fn new(id: BodyId, spec: BodySpec) -> Self {
        Self {
            id,
            name: spec.name,
            kind: spec.kind,
            mass: spec.mass,
            radius: spec.radius,
            position: spec.position,
            velocity: spec.velocity,
            visual_scale: 1.0,
            node: None,
        }
    }

    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.mass
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn distance_to(&self, other: &CelestialBody) -> f64 {
        self.position.distance(other.position)
    }

    /// Gameplay escape velocity `sqrt(2 k m / r)`
    pub fn escape_velocity(&self, gravity_scale: f64) -> f64 {
        (2.0 * gravity_scale * self.mass / self.radius).sqrt()
    }

    /// Scale radius and visual scale together
    pub fn scale_size(&mut self, factor: f64) {
        self.radius *= factor;
        self.visual_scale *= factor;
    }

    pub fn overlaps(&self, other: &CelestialBody) -> bool {
        self.distance_to(other) < self.radius + other.radius
    }
}

/// Replace missing or invalid physical state with safe defaults
///
/// Upstream producers sometimes hand over bodies with zero mass or a NaN
/// velocity. Mass falls back to 1 and velocity to zero; radius and visual
/// scale fall back to 1 as well so nothing downstream divides by zero.
pub fn normalize(mut body: CelestialBody) -> CelestialBody {
    if !body.mass.is_finite() || body.mass <= 0.0 {
        log::debug!("Body {} has mass {}, defaulting to 1", body.id.0, body.mass);
        body.mass = 1.0;
    }
    if !body.velocity.is_finite() {
        body.velocity = DVec3::ZERO;
    }
    if !body.radius.is_finite() || body.radius <= 0.0 {
        body.radius = 1.0;
    }
    if !body.visual_scale.is_finite() || body.visual_scale <= 0.0 {
        body.visual_scale = 1.0;
    }
    body
}
