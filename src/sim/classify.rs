//! Collision classification
//!
//! Decides which of the outcome rules applies to a pair of touching bodies.
//! Pure and deterministic: same bodies in, same outcome out.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::body::CelestialBody;
use crate::CollisionTuning;

/// What a collision turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Bodies fuse into the heavier one
    Merge,
    /// Grazing elastic contact, both survive
    Bounce,
    /// High-energy impact ejects debris
    Fragmentation,
    /// Both bodies are lost
    Destruction,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Merge => "merge",
            OutcomeKind::Bounce => "bounce",
            OutcomeKind::Fragmentation => "fragmentation",
            OutcomeKind::Destruction => "destruction",
        }
    }
}

/// Classify a collision; first matching rule wins
///
/// 1. Black holes always absorb.
/// 2. Big mass disparity at sub-escape speed is a capture.
/// 3. Faster than twice the average escape velocity shatters.
/// 4. Grazing impacts bounce.
/// 5. Everything else merges.
pub fn classify(
    a: &CelestialBody,
    b: &CelestialBody,
    relative_velocity: DVec3,
    tuning: &CollisionTuning,
) -> OutcomeKind {
    if a.kind.is_black_hole() || b.kind.is_black_hole() {
        return OutcomeKind::Merge;
    }

    let mass_ratio = a.mass.max(b.mass) / a.mass.min(b.mass);
    let speed = relative_velocity.length();
    let avg_escape = average_escape_velocity(a, b, tuning);

    if mass_ratio > tuning.capture_mass_ratio && speed < avg_escape {
        return OutcomeKind::Merge;
    }

    if speed > tuning.fragmentation_speed_factor * avg_escape {
        return OutcomeKind::Fragmentation;
    }

    if impact_parameter(a, b, relative_velocity) > tuning.grazing_impact_parameter {
        return OutcomeKind::Bounce;
    }

    // Slow, near-equal, central: soft capture and inelastic impact land here alike
    OutcomeKind::Merge
}

/// Mean of the two bodies' gameplay escape velocities
pub fn average_escape_velocity(
    a: &CelestialBody,
    b: &CelestialBody,
    tuning: &CollisionTuning,
) -> f64 {
    0.5 * (a.escape_velocity(tuning.gravity_scale) + b.escape_velocity(tuning.gravity_scale))
}

/// Normalized closest-approach offset of the two straight-line trajectories
///
/// 0 is head-on, 1 is tangent (or wider; clamped). Zero relative velocity
/// counts as a head-on contact.
pub fn impact_parameter(a: &CelestialBody, b: &CelestialBody, relative_velocity: DVec3) -> f64 {
    let speed_sq = relative_velocity.length_squared();
    if speed_sq == 0.0 {
        return 0.0;
    }

    let relative_position = b.position - a.position;
    let along = relative_position.dot(relative_velocity) / speed_sq;
    let offset = relative_position - relative_velocity * along;

    (offset.length() / (a.radius + b.radius)).clamp(0.0, 1.0)
}
