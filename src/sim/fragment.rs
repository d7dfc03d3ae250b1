//! Fragmentation outcome: a high-energy impact sheds debris
//!
//! The heavier parent keeps `1 - f` of the combined mass, the rest is split
//! evenly across 2..=5 fragments thrown out on a ring in the XZ plane.
//! Every derived number is checked; a bad fragment is skipped, a bad debris
//! mass falls back to a merge.

use std::f64::consts::TAU;

use glam::DVec3;

use super::body::{BodyKind, BodySpec, CelestialBody};
use super::classify::OutcomeKind;
use super::collision::{CollisionEnv, CollisionResult};
use super::events::{SoundCue, ToastKind};
use super::merge::merge;
use super::rng::RandomSource;
use crate::consts::MIN_FRAGMENTS;
use crate::timeline::LogCategory;
use crate::{CollisionTuning, combined_mass, volume_scale};

/// Number of fragments for a given impact energy
///
/// `floor(sqrt(E / scale)) + 2`, capped at `tuning.max_fragments`.
pub fn fragment_count(energy: f64, tuning: &CollisionTuning) -> usize {
    // Saturating cast: NaN -> 0, +inf -> usize::MAX
    let extra = (energy / tuning.fragment_energy_scale).sqrt().floor() as usize;
    extra
        .saturating_add(MIN_FRAGMENTS)
        .min(tuning.max_fragments)
}

/// Where one fragment goes and how fast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentPlan {
    pub position: DVec3,
    pub velocity: DVec3,
    pub radius: f64,
}

/// Shared inputs for every fragment of one impact
#[derive(Debug, Clone, Copy)]
pub struct Ejecta {
    pub count: usize,
    pub midpoint: DVec3,
    pub bulk_velocity: DVec3,
    /// Distance from the midpoint where fragments appear
    pub offset: f64,
    /// Base ejection speed, `sqrt(E / M)`
    pub speed: f64,
    pub debris_mass: f64,
}

impl Ejecta {
    /// Plan fragment `index`; `None` when its radius is unusable
    pub fn plan(
        &self,
        index: usize,
        rng: &mut dyn RandomSource,
        tuning: &CollisionTuning,
    ) -> Option<FragmentPlan> {
        let angle = TAU * index as f64 / self.count as f64;
        let direction = DVec3::new(angle.cos(), 0.0, angle.sin());

        let speed = self.speed * rng.range(0.5, 1.0);
        let jitter = (rng.next_f64() - 0.5) * 0.5 * speed;
        let ejection = direction * speed + DVec3::new(0.0, jitter, 0.0);

        let outward = ejection.try_normalize().unwrap_or(direction);
        let mut position = self.midpoint + outward * self.offset;
        let mut velocity = ejection + self.bulk_velocity;
        let radius = (self.debris_mass / tuning.debris_density_scale).cbrt();

        if !position.is_finite() {
            position = self.midpoint;
        }
        if !velocity.is_finite() {
            velocity = DVec3::ZERO;
        }
        if !radius.is_finite() || radius <= 0.0 {
            return None;
        }

        Some(FragmentPlan {
            position,
            velocity,
            radius,
        })
    }
}

pub fn fragment(
    a: CelestialBody,
    b: CelestialBody,
    energy: f64,
    env: &mut CollisionEnv<'_>,
) -> CollisionResult {
    let tuning = env.tuning;
    let energy = if energy.is_finite() {
        energy
    } else {
        tuning.fallback_energy
    };

    let count = fragment_count(energy, tuning);
    let total_mass = combined_mass(a.mass, b.mass);
    let debris_mass = tuning.debris_mass_fraction * total_mass / count as f64;

    if !debris_mass.is_finite() || debris_mass <= 0.0 {
        log::warn!(
            "Debris mass {} for {} and {} is unusable, merging instead",
            debris_mass,
            a.name,
            b.name
        );
        return merge(a, b, energy, env);
    }

    let (mut survivor, lost) = if b.mass > a.mass { (b, a) } else { (a, b) };

    let ejecta = Ejecta {
        count,
        midpoint: (survivor.position + lost.position) * 0.5,
        bulk_velocity: (survivor.velocity + lost.velocity) * 0.5,
        offset: 0.5 * (survivor.radius + lost.radius),
        speed: (energy / total_mass).sqrt(),
        debris_mass,
    };

    let mut debris = Vec::with_capacity(count);
    for index in 0..count {
        let Some(plan) = ejecta.plan(index, &mut *env.rng, tuning) else {
            log::warn!("Skipping fragment {} with degenerate radius", index);
            continue;
        };

        let spec = BodySpec::new(BodyKind::Asteroid, debris_mass, plan.radius)
            .named(format!("{} Fragment {}", survivor.name, index + 1))
            .at(plan.position)
            .moving(plan.velocity);

        match env.bodies.create_body(spec) {
            Ok(body) => debris.push(body),
            Err(e) => log::error!("Fragment {} not created: {}", index, e),
        }
    }

    if !debris.is_empty() {
        env.bodies.add_bodies(debris.clone());
    }

    let old_mass = survivor.mass;
    survivor.mass = (1.0 - tuning.debris_mass_fraction) * total_mass;
    if !survivor.kind.is_black_hole() {
        survivor.scale_size(volume_scale(survivor.mass, old_mass));
    }

    env.bodies.remove_body(&lost);

    let message = format!(
        "{} and {} shattered into {} fragments",
        survivor.name,
        lost.name,
        debris.len()
    );
    env.notifier.show_message(&message, ToastKind::Major);
    env.notifier.timeline(&message, LogCategory::Collision);
    if debris.len() < count {
        env.notifier.timeline(
            &format!("{} of {} fragments were lost", count - debris.len(), count),
            LogCategory::Debris,
        );
    }
    env.notifier.play_sound(SoundCue::Shatter, ejecta.midpoint);

    CollisionResult {
        kind: OutcomeKind::Fragmentation,
        survivors: vec![survivor],
        debris,
        removed: vec![lost.id],
        message,
        energy,
    }
}
