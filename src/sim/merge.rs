//! Merge outcome: one body absorbs the other
//!
//! Conserves:
//! - Total mass: m_new = m_a + m_b
//! - Momentum: p_new = p_a + p_b
//! - Centre of mass (position settles on the mass-weighted centroid)
//!
//! Radius follows constant density, r_new = r * (m_new / m_old)^(1/3), except
//! for black holes whose event horizon is fixed.

use super::body::CelestialBody;
use super::classify::OutcomeKind;
use super::collision::{CollisionEnv, CollisionResult};
use super::events::{SoundCue, ToastKind};
use crate::timeline::LogCategory;
use crate::{combined_mass, mass_weight, volume_scale};

/// Pick (survivor, absorbed)
///
/// A black hole always survives against anything else; otherwise the
/// heavier body does, with ties going to `a`.
fn survivor_order(a: CelestialBody, b: CelestialBody) -> (CelestialBody, CelestialBody) {
    match (a.kind.is_black_hole(), b.kind.is_black_hole()) {
        (true, false) => (a, b),
        (false, true) => (b, a),
        _ if b.mass > a.mass => (b, a),
        _ => (a, b),
    }
}

/// Fold `absorbed` into `survivor`, returning the survivor
pub fn absorb(mut survivor: CelestialBody, absorbed: &CelestialBody) -> CelestialBody {
    let old_mass = survivor.mass;
    let total_mass = combined_mass(survivor.mass, absorbed.mass);
    // Weighted averages instead of p / m so huge masses cannot overflow
    let w_absorbed = mass_weight(absorbed.mass, survivor.mass);
    let w_survivor = 1.0 - w_absorbed;

    survivor.velocity = survivor.velocity * w_survivor + absorbed.velocity * w_absorbed;
    survivor.position = survivor.position * w_survivor + absorbed.position * w_absorbed;
    survivor.mass = total_mass;

    if !survivor.kind.is_black_hole() {
        survivor.scale_size(volume_scale(total_mass, old_mass));
    }

    survivor
}

pub fn merge(
    a: CelestialBody,
    b: CelestialBody,
    energy: f64,
    env: &mut CollisionEnv<'_>,
) -> CollisionResult {
    let (survivor, absorbed) = survivor_order(a, b);
    let survivor = absorb(survivor, &absorbed);

    env.bodies.remove_body(&absorbed);

    let message = if survivor.kind.is_black_hole() {
        let message = format!("{} absorbed {}", survivor.name, absorbed.name);
        env.notifier.timeline(&message, LogCategory::Absorption);
        env.notifier.play_sound(SoundCue::Absorb, survivor.position);
        message
    } else {
        let message = format!("{} merged with {}", absorbed.name, survivor.name);
        env.notifier.timeline(&message, LogCategory::Collision);
        env.notifier.play_sound(SoundCue::Merge, survivor.position);
        message
    };
    env.notifier.show_message(&message, ToastKind::Major);

    CollisionResult {
        kind: OutcomeKind::Merge,
        survivors: vec![survivor],
        debris: Vec::new(),
        removed: vec![absorbed.id],
        message,
        energy,
    }
}
