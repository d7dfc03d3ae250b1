//! Collision resolution entry point
//!
//! [`process_collision`] takes ownership of two touching bodies, classifies
//! the contact and applies the matching outcome:
//! - merge: heavier body absorbs the lighter one (momentum conserved)
//! - bounce: elastic exchange along the contact axis
//! - fragmentation: 30% of the combined mass becomes debris
//! - destruction: both bodies are lost
//!
//! Survivors come back in the [`CollisionResult`]; the caller returns them
//! to the live set. Removed bodies go through [`BodyLifecycle::remove_body`]
//! and debris through [`BodyLifecycle::add_bodies`] before this returns.
//! Nothing in here fails: every degenerate input degrades to a safe outcome.

use glam::DVec3;
use serde::Serialize;

use super::body::{BodyId, BodySpec, CelestialBody, normalize};
use super::classify::{OutcomeKind, classify};
use super::events::{Notifier, SoundCue, ToastKind};
use super::rng::RandomSource;
use super::{bounce, fragment, merge};
use crate::timeline::LogCategory;
use crate::{CollisionTuning, SimError, mass_weight};

/// Builds new bodies (debris)
pub trait BodyFactory {
    /// Create a body; it is not live until handed to [`BodyLifecycle::add_bodies`]
    fn create_body(&mut self, spec: BodySpec) -> Result<CelestialBody, SimError>;
}

/// Owns the live body set and the bodies' render resources
pub trait BodyLifecycle {
    /// Drop a body from the live set and release its render resources
    fn remove_body(&mut self, body: &CelestialBody);
    /// Add several bodies in one batch
    fn add_bodies(&mut self, bodies: Vec<CelestialBody>);
}

/// Factory plus lifecycle, the body-side collaborator of the resolver
pub trait BodyHost: BodyFactory + BodyLifecycle {}

impl<T: BodyFactory + BodyLifecycle> BodyHost for T {}

/// Collaborators a collision needs
pub struct CollisionEnv<'a> {
    pub bodies: &'a mut dyn BodyHost,
    pub notifier: &'a mut dyn Notifier,
    pub rng: &'a mut dyn RandomSource,
    pub tuning: &'a CollisionTuning,
}

/// Outcome of one resolved collision
#[derive(Debug, Clone, Serialize)]
pub struct CollisionResult {
    pub kind: OutcomeKind,
    /// Bodies still alive afterwards, in resolution order
    pub survivors: Vec<CelestialBody>,
    /// Newly created fragments (already added to the live set)
    pub debris: Vec<CelestialBody>,
    /// Bodies handed to the lifecycle sink
    pub removed: Vec<BodyId>,
    pub message: String,
    pub energy: f64,
}

impl CollisionResult {
    /// The first survivor, if any
    pub fn survivor(&self) -> Option<&CelestialBody> {
        self.survivors.first()
    }

    /// Mass of everything that came out of the collision
    pub fn total_mass(&self) -> f64 {
        self.survivors
            .iter()
            .chain(self.debris.iter())
            .map(|b| b.mass)
            .sum()
    }
}

/// Collision energy in the centre-of-mass frame, `0.5 * mu * |v_rel|^2`
pub fn collision_energy(a: &CelestialBody, b: &CelestialBody, relative_velocity: DVec3) -> f64 {
    let reduced_mass = a.mass * mass_weight(b.mass, a.mass);
    0.5 * reduced_mass * relative_velocity.length_squared()
}

/// Resolve a collision between two touching bodies
pub fn process_collision(
    a: CelestialBody,
    b: CelestialBody,
    env: &mut CollisionEnv<'_>,
) -> CollisionResult {
    let a = normalize(a);
    let b = normalize(b);

    let relative_velocity = b.velocity - a.velocity;
    let mut kind = classify(&a, &b, relative_velocity, env.tuning);
    let mut energy = collision_energy(&a, &b, relative_velocity);

    if !energy.is_finite() {
        log::warn!(
            "Collision energy between {} and {} is {}, forcing merge",
            a.name,
            b.name,
            energy
        );
        env.notifier.timeline(
            &format!("Unstable collision between {} and {}", a.name, b.name),
            LogCategory::Warning,
        );
        kind = OutcomeKind::Merge;
        energy = env.tuning.fallback_energy;
    }

    log::debug!(
        "Collision {} <-> {}: {} (E = {:.1})",
        a.name,
        b.name,
        kind.as_str(),
        energy
    );

    match kind {
        OutcomeKind::Merge => merge::merge(a, b, energy, env),
        OutcomeKind::Fragmentation => fragment::fragment(a, b, energy, env),
        OutcomeKind::Bounce => bounce::bounce(a, b, energy, env),
        OutcomeKind::Destruction => destroy(a, b, energy, env),
    }
}

/// Remove both bodies, no survivors, no debris
pub fn destroy(
    a: CelestialBody,
    b: CelestialBody,
    energy: f64,
    env: &mut CollisionEnv<'_>,
) -> CollisionResult {
    env.bodies.remove_body(&a);
    env.bodies.remove_body(&b);

    let message = format!("{} and {} destroyed each other", a.name, b.name);
    env.notifier.show_message(&message, ToastKind::Major);
    env.notifier.timeline(&message, LogCategory::Collision);
    let midpoint = (a.position + b.position) * 0.5;
    env.notifier.play_sound(SoundCue::Destroy, midpoint);

    CollisionResult {
        kind: OutcomeKind::Destruction,
        survivors: Vec::new(),
        debris: Vec::new(),
        removed: vec![a.id, b.id],
        message,
        energy,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::sim::body::BodyKind;
    use proptest::prelude::*;

    #[test]
    fn test_collision_energy() {
        let a = body(1, BodyKind::Asteroid, 2.0, 1.0, DVec3::ZERO, DVec3::ZERO);
        let b = body(2, BodyKind::Asteroid, 2.0, 1.0, DVec3::X, DVec3::new(3.0, 0.0, 0.0));
        // mu = 1, |v|^2 = 9
        assert!((collision_energy(&a, &b, b.velocity - a.velocity) - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_energy_forces_merge() {
        let mut h = Harness::new();
        let a = body(
            1,
            BodyKind::Asteroid,
            1.0,
            1.0,
            DVec3::ZERO,
            DVec3::new(1.0e200, 0.0, 0.0),
        );
        let b = body(
            2,
            BodyKind::Asteroid,
            1.0,
            1.0,
            DVec3::new(1.5, 0.0, 0.0),
            DVec3::new(-1.0e200, 0.0, 0.0),
        );

        let result = process_collision(a, b, &mut h.env());
        assert_eq!(result.kind, OutcomeKind::Merge);
        assert_eq!(result.energy, 1000.0);
        assert_eq!(result.survivors.len(), 1);
        assert_eq!(result.survivors[0].mass, 2.0);
        assert_eq!(h.notes.timeline.by_category(LogCategory::Warning).count(), 1);
    }

    #[test]
    fn test_zero_mass_is_defaulted() {
        let mut h = Harness::new();
        let a = body(
            1,
            BodyKind::Asteroid,
            0.0,
            2.0,
            DVec3::ZERO,
            DVec3::new(1.0, 0.0, 0.0),
        );
        let b = body(
            2,
            BodyKind::Asteroid,
            10.0,
            2.0,
            DVec3::new(3.0, 0.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
        );

        let result = process_collision(a, b, &mut h.env());
        assert_eq!(result.kind, OutcomeKind::Merge);
        assert!(result.energy.is_finite());
        assert_eq!(result.survivors[0].mass, 11.0);
        assert_eq!(result.removed, vec![BodyId(1)]);
    }

    #[test]
    fn test_fast_zero_mass_impact_is_classified_after_defaulting() {
        // Mass 0 becomes 1 before classification, so a fast impact still shatters
        let mut h = Harness::new();
        let a = body(
            1,
            BodyKind::Asteroid,
            0.0,
            2.0,
            DVec3::ZERO,
            DVec3::new(1000.0, 0.0, 0.0),
        );
        let b = body(
            2,
            BodyKind::Asteroid,
            10.0,
            2.0,
            DVec3::new(3.0, 0.0, 0.0),
            DVec3::new(-1000.0, 0.0, 0.0),
        );

        let result = process_collision(a, b, &mut h.env());
        assert_eq!(result.kind, OutcomeKind::Fragmentation);
        // 0.5 * (10 / 11) * 2000^2
        assert!((result.energy - 0.5 * (10.0 / 11.0) * 4.0e6).abs() < 1e-6);
        assert_eq!(result.survivor().map(|s| s.id), Some(BodyId(2)));
        assert!((result.total_mass() - 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_masses_merge_without_overflow() {
        let mut h = Harness::new();
        let a = body(1, BodyKind::Star, 1.0e308, 2.0, DVec3::ZERO, DVec3::ZERO);
        let b = body(2, BodyKind::Star, 1.0e308, 2.0, DVec3::X, DVec3::ZERO);

        let result = process_collision(a, b, &mut h.env());
        assert_eq!(result.kind, OutcomeKind::Merge);
        let survivor = result.survivor().unwrap();
        assert_eq!(survivor.mass, f64::MAX);
        assert!(survivor.radius.is_finite());
        assert!((survivor.position - DVec3::new(0.5, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_destroy_removes_both() {
        let mut h = Harness::new();
        let a = body(1, BodyKind::Comet, 3.0, 1.0, DVec3::ZERO, DVec3::ZERO);
        let b = body(2, BodyKind::Moon, 4.0, 1.0, DVec3::X, DVec3::ZERO);

        let result = destroy(a, b, 12.0, &mut h.env());
        assert_eq!(result.kind, OutcomeKind::Destruction);
        assert!(result.survivors.is_empty());
        assert!(result.debris.is_empty());
        assert_eq!(h.host.removed, vec![BodyId(1), BodyId(2)]);
        assert_eq!(result.energy, 12.0);
    }

    proptest! {
        #[test]
        fn prop_black_hole_always_merges_and_keeps_radius(
            hole_mass in 1.0f64..1.0e6,
            other_mass in 0.1f64..1.0e6,
            speed in 0.0f64..1.0e4,
            offset in 0.0f64..3.9,
        ) {
            let mut h = Harness::new();
            let hole = body(1, BodyKind::BlackHole, hole_mass, 2.0, DVec3::ZERO, DVec3::ZERO);
            let other = body(
                2,
                BodyKind::Planet,
                other_mass,
                2.0,
                DVec3::new(offset, 0.0, 1.0),
                DVec3::new(0.0, 0.0, -speed),
            );

            let result = process_collision(other, hole, &mut h.env());
            prop_assert_eq!(result.kind, OutcomeKind::Merge);
            prop_assert_eq!(result.survivors.len(), 1);
            let survivor = &result.survivors[0];
            prop_assert_eq!(survivor.kind, BodyKind::BlackHole);
            prop_assert_eq!(survivor.radius, 2.0);
            prop_assert_eq!(&result.removed, &vec![BodyId(2)]);
        }

        #[test]
        fn prop_classification_is_deterministic(
            ma in 0.1f64..1.0e4,
            mb in 0.1f64..1.0e4,
            vx in -500.0f64..500.0,
            vz in -500.0f64..500.0,
            dz in -3.0f64..3.0,
        ) {
            let tuning = CollisionTuning::default();
            let a = body(1, BodyKind::Asteroid, ma, 2.0, DVec3::ZERO, DVec3::ZERO);
            let b = body(2, BodyKind::Planet, mb, 2.0, DVec3::new(3.0, 0.0, dz), DVec3::new(vx, 0.0, vz));
            let rel = b.velocity - a.velocity;
            let first = classify(&a, &b, rel, &tuning);
            for _ in 0..3 {
                prop_assert_eq!(classify(&a, &b, rel, &tuning), first);
            }
        }

        #[test]
        fn prop_result_is_always_valid(
            ma in -10.0f64..1.0e4,
            mb in -10.0f64..1.0e4,
            vx in -1.0e3f64..1.0e3,
            vz in -1.0e3f64..1.0e3,
            dz in -3.0f64..3.0,
        ) {
            let mut h = Harness::new();
            let a = body(1, BodyKind::Asteroid, ma, 2.0, DVec3::ZERO, DVec3::ZERO);
            let b = body(2, BodyKind::Moon, mb, 2.0, DVec3::new(3.0, 0.0, dz), DVec3::new(vx, 0.0, vz));

            let result = process_collision(a, b, &mut h.env());
            prop_assert!(result.energy.is_finite());
            prop_assert!(result.survivors.len() <= 2);
            for s in result.survivors.iter().chain(result.debris.iter()) {
                prop_assert!(s.mass > 0.0 && s.mass.is_finite());
                prop_assert!(s.radius > 0.0 && s.radius.is_finite());
                prop_assert!(s.position.is_finite());
                prop_assert!(s.velocity.is_finite());
            }
        }

        #[test]
        fn prop_result_is_valid_near_max_mass(
            ma in 1.0e300f64..f64::MAX,
            mb in 1.0e300f64..f64::MAX,
            vx in -1.0e3f64..1.0e3,
            vz in -1.0e3f64..1.0e3,
            dz in -3.0f64..3.0,
        ) {
            let mut h = Harness::new();
            let a = body(1, BodyKind::Star, ma, 2.0, DVec3::ZERO, DVec3::ZERO);
            let b = body(2, BodyKind::Star, mb, 2.0, DVec3::new(3.0, 0.0, dz), DVec3::new(vx, 0.0, vz));

            let result = process_collision(a, b, &mut h.env());
            prop_assert!(result.energy.is_finite());
            for s in result.survivors.iter().chain(result.debris.iter()) {
                prop_assert!(s.mass > 0.0 && s.mass.is_finite());
                prop_assert!(s.radius > 0.0 && s.radius.is_finite());
                prop_assert!(s.position.is_finite());
                prop_assert!(s.velocity.is_finite());
            }
        }
    }
}
