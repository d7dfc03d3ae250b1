//! Bounce outcome: grazing elastic contact
//!
//! Velocities are split along the centre-to-centre axis. The normal parts go
//! through the 1-D elastic formula, the tangential parts are kept. Vertical
//! speed is then clamped and damped so bounces stay near the orbital plane,
//! and overlapping bodies are pushed apart.

use glam::DVec3;

use super::body::CelestialBody;
use super::classify::OutcomeKind;
use super::collision::{CollisionEnv, CollisionResult};
use super::events::{SoundCue, ToastKind};
use crate::{CollisionTuning, mass_weight};
use crate::timeline::LogCategory;

/// Unit vector from `a` to `b` (+X when the centres coincide)
pub fn collision_axis(a: &CelestialBody, b: &CelestialBody) -> DVec3 {
    (b.position - a.position).try_normalize().unwrap_or(DVec3::X)
}

/// 1-D elastic exchange of the normal components
///
/// Returns the new normal speeds `(v1n', v2n')`.
pub fn elastic_normal(m1: f64, v1n: f64, m2: f64, v2n: f64) -> (f64, f64) {
    let w1 = mass_weight(m1, m2);
    let w2 = 1.0 - w1;
    let v1 = v1n * (w1 - w2) + v2n * 2.0 * w2;
    let v2 = v2n * (w2 - w1) + v1n * 2.0 * w1;
    (v1, v2)
}

/// Clamp then damp the out-of-plane (Y) velocity component
pub fn damp_vertical(velocity: &mut DVec3, tuning: &CollisionTuning) {
    let max = tuning.bounce_max_vertical_speed;
    velocity.y = velocity.y.clamp(-max, max) * tuning.bounce_vertical_damping;
}

/// Push overlapping bodies apart along `axis` to the minimum separation
pub fn separate(a: &mut CelestialBody, b: &mut CelestialBody, axis: DVec3, tuning: &CollisionTuning) {
    let min_distance = tuning.bounce_separation_factor * (a.radius + b.radius);
    let distance = a.distance_to(b);
    if distance < min_distance {
        let push = 0.5 * (min_distance - distance);
        a.position -= axis * push;
        b.position += axis * push;
    }
}

pub fn bounce(
    mut a: CelestialBody,
    mut b: CelestialBody,
    energy: f64,
    env: &mut CollisionEnv<'_>,
) -> CollisionResult {
    let tuning = env.tuning;
    let axis = collision_axis(&a, &b);

    let v1n = a.velocity.dot(axis);
    let v2n = b.velocity.dot(axis);
    let v1t = a.velocity - axis * v1n;
    let v2t = b.velocity - axis * v2n;

    let (v1n, v2n) = elastic_normal(a.mass, v1n, b.mass, v2n);
    a.velocity = v1t + axis * v1n;
    b.velocity = v2t + axis * v2n;

    damp_vertical(&mut a.velocity, tuning);
    damp_vertical(&mut b.velocity, tuning);

    separate(&mut a, &mut b, axis, tuning);

    let message = format!("{} bounced off {}", a.name, b.name);
    env.notifier.show_message(&message, ToastKind::Minor);
    env.notifier.timeline(&message, LogCategory::Collision);
    env.notifier
        .play_sound(SoundCue::Bounce, (a.position + b.position) * 0.5);

    CollisionResult {
        kind: OutcomeKind::Bounce,
        survivors: vec![a, b],
        debris: Vec::new(),
        removed: Vec::new(),
        message,
        energy,
    }
}
