//! Live body registry and the universe that drives collisions
//!
//! The registry is the body factory and the lifecycle sink: it assigns ids,
//! spawns scene nodes and releases them again. [`Universe`] wraps it together
//! with notifications, tuning and the seeded RNG.

use std::collections::HashMap;

use rand_pcg::Pcg32;

use super::body::{BodyId, BodySpec, CelestialBody};
use super::classify::OutcomeKind;
use super::collision::{BodyFactory, BodyLifecycle, CollisionEnv, CollisionResult, process_collision};
use super::events::NotificationCenter;
use super::rng::RngState;
use super::scene::{BlackHoleEffect, ResourcePool, SceneGraph};
use crate::{CollisionTuning, SimError};

/// Owns the live bodies and their render-side bookkeeping
#[derive(Debug)]
pub struct BodyRegistry {
    /// Live bodies (sorted by id for determinism)
    bodies: Vec<CelestialBody>,
    pub scene: SceneGraph,
    pub resources: ResourcePool,
    pub black_hole_effect: BlackHoleEffect,
    next_id: u32,
}

impl Default for BodyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            scene: SceneGraph::new(),
            resources: ResourcePool::new(),
            black_hole_effect: BlackHoleEffect::default(),
            next_id: 1,
        }
    }

    fn next_body_id(&mut self) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies
            .binary_search_by_key(&id, |b| b.id)
            .ok()
            .map(|i| &self.bodies[i])
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.get(id).is_some()
    }

    /// Put a body (back) into the live set, replacing any body with its id
    pub fn insert(&mut self, body: CelestialBody) {
        match self.bodies.binary_search_by_key(&body.id, |b| b.id) {
            Ok(i) => self.bodies[i] = body,
            Err(i) => self.bodies.insert(i, body),
        }
    }

    /// Take a body out of the live set, keeping its render resources
    pub fn take(&mut self, id: BodyId) -> Option<CelestialBody> {
        let index = self.bodies.binary_search_by_key(&id, |b| b.id).ok()?;
        Some(self.bodies.remove(index))
    }

    pub fn total_mass(&self) -> f64 {
        self.bodies.iter().map(|b| b.mass).sum()
    }

    pub fn bodies_mut(&mut self) -> &mut [CelestialBody] {
        &mut self.bodies
    }

    /// Hand the black-hole effect to `id` if it is free
    fn claim_effect(&mut self, id: BodyId) {
        if self.black_hole_effect.claim(id, &mut self.resources) {
            log::debug!("Black hole effect attached to body {}", id.0);
        }
    }
}

impl BodyFactory for BodyRegistry {
    fn create_body(&mut self, spec: BodySpec) -> Result<CelestialBody, SimError> {
        let reject = |reason| SimError::FactoryRejected {
            kind: spec.kind,
            reason,
        };
        if !spec.mass.is_finite() || spec.mass <= 0.0 {
            return Err(reject("mass must be positive"));
        }
        if !spec.radius.is_finite() || spec.radius <= 0.0 {
            return Err(reject("radius must be positive"));
        }
        if !spec.position.is_finite() || !spec.velocity.is_finite() {
            return Err(reject("position and velocity must be finite"));
        }

        let id = self.next_body_id();
        let kind = spec.kind;
        let mut body = CelestialBody::new(id, spec);
        body.node = Some(self.scene.spawn_body_node(kind, &mut self.resources));
        if kind.is_black_hole() {
            self.claim_effect(id);
        }
        Ok(body)
    }
}

impl BodyLifecycle for BodyRegistry {
    fn remove_body(&mut self, body: &CelestialBody) {
        self.bodies.retain(|b| b.id != body.id);

        if self.black_hole_effect.owner() == Some(body.id) {
            self.black_hole_effect.dispose(&mut self.resources);
        }

        if let Some(node) = body.node {
            let failures = self.scene.dispose(node, &mut self.resources);
            if failures > 0 {
                log::warn!(
                    "{} render resources of {} could not be released",
                    failures,
                    body.name
                );
            }
        }
    }

    fn add_bodies(&mut self, bodies: Vec<CelestialBody>) {
        if bodies.is_empty() {
            return;
        }
        log::debug!("Adding {} bodies", bodies.len());
        self.bodies.extend(bodies);
        self.bodies.sort_by_key(|b| b.id);
    }
}

/// Everything a running garden needs to resolve collisions
#[derive(Debug)]
pub struct Universe {
    /// RNG seed (the RNG itself is rebuilt from this on reset)
    pub seed: u64,
    pub registry: BodyRegistry,
    pub notifications: NotificationCenter,
    pub tuning: CollisionTuning,
    rng: Pcg32,
    /// Fresh fragment -> the body it broke off from, until they separate
    ejecta: HashMap<BodyId, BodyId>,
    /// Fixed steps taken so far
    pub time_ticks: u64,
}

impl Universe {
    /// Create an empty universe with the given seed
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, CollisionTuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: CollisionTuning) -> Self {
        Self {
            seed,
            registry: BodyRegistry::new(),
            notifications: NotificationCenter::default(),
            tuning,
            rng: RngState::new(seed).to_rng(),
            ejecta: HashMap::new(),
            time_ticks: 0,
        }
    }

    /// Add a body built from `spec` to the live set
    pub fn spawn(&mut self, spec: BodySpec) -> Result<BodyId, SimError> {
        let body = self.registry.create_body(spec)?;
        let id = body.id;
        log::info!("Spawned {} ({})", body.name, body.kind.as_str());
        self.registry.insert(body);
        Ok(id)
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        self.registry.bodies()
    }

    pub fn body(&self, id: BodyId) -> Option<&CelestialBody> {
        self.registry.get(id)
    }

    pub fn total_mass(&self) -> f64 {
        self.registry.total_mass()
    }

    /// Remove a live body and release its resources
    pub fn remove(&mut self, id: BodyId) -> Result<(), SimError> {
        let body = self.registry.take(id).ok_or(SimError::UnknownBody(id))?;
        self.registry.remove_body(&body);
        Ok(())
    }

    /// True for a fragment and its parent, or two fragments of one parent,
    /// that have not drifted apart since the impact
    pub fn is_fresh_ejecta(&self, a: BodyId, b: BodyId) -> bool {
        let parent_a = self.ejecta.get(&a);
        let parent_b = self.ejecta.get(&b);
        parent_a == Some(&b) || parent_b == Some(&a) || (parent_a.is_some() && parent_a == parent_b)
    }

    /// Forget fragments that are gone or touch neither their parent nor a sibling
    pub fn release_ejecta(&mut self) {
        let registry = &self.registry;
        let touching = |a: BodyId, b: BodyId| match (registry.get(a), registry.get(b)) {
            (Some(x), Some(y)) => x.overlaps(y),
            _ => false,
        };

        let held: Vec<BodyId> = self
            .ejecta
            .iter()
            .filter(|&(&fragment, &parent)| {
                touching(fragment, parent)
                    || (registry.contains(parent)
                        && self.ejecta.iter().any(|(&other, &p)| {
                            p == parent && other != fragment && touching(fragment, other)
                        }))
            })
            .map(|(&fragment, _)| fragment)
            .collect();
        self.ejecta.retain(|fragment, _| held.contains(fragment));
    }

    /// Resolve a collision between two live bodies
    ///
    /// Fails only when an id is unknown or both ids are the same; in that
    /// case nothing has been touched.
    pub fn collide(&mut self, a: BodyId, b: BodyId) -> Result<CollisionResult, SimError> {
        if a == b {
            return Err(SimError::SelfCollision(a));
        }
        for id in [a, b] {
            if !self.registry.contains(id) {
                return Err(SimError::UnknownBody(id));
            }
        }

        let body_a = self.registry.take(a).ok_or(SimError::UnknownBody(a))?;
        let body_b = self.registry.take(b).ok_or(SimError::UnknownBody(b))?;

        let mut env = CollisionEnv {
            bodies: &mut self.registry,
            notifier: &mut self.notifications,
            rng: &mut self.rng,
            tuning: &self.tuning,
        };
        let result = process_collision(body_a, body_b, &mut env);

        for survivor in &result.survivors {
            self.registry.insert(survivor.clone());
            if survivor.kind.is_black_hole() {
                // The absorbed hole may have held the effect
                self.registry.claim_effect(survivor.id);
            }
        }

        if result.kind == OutcomeKind::Fragmentation {
            if let Some(parent) = result.survivor().map(|s| s.id) {
                for fragment in &result.debris {
                    self.ejecta.insert(fragment.id, parent);
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyKind;
    use crate::sim::classify::OutcomeKind;
    use glam::DVec3;

    fn spec(kind: BodyKind, mass: f64, radius: f64, x: f64, vx: f64) -> BodySpec {
        BodySpec::new(kind, mass, radius)
            .at(DVec3::new(x, 0.0, 0.0))
            .moving(DVec3::new(vx, 0.0, 0.0))
    }

    #[test]
    fn test_spawn_assigns_sorted_ids() {
        let mut universe = Universe::new(1);
        let a = universe.spawn(spec(BodyKind::Planet, 1.0, 1.0, 0.0, 0.0)).unwrap();
        let b = universe.spawn(spec(BodyKind::Moon, 1.0, 1.0, 5.0, 0.0)).unwrap();
        assert!(a < b);
        assert_eq!(universe.bodies().len(), 2);
        assert!(universe.body(a).unwrap().node.is_some());
    }

    #[test]
    fn test_factory_rejects_bad_specs() {
        let mut registry = BodyRegistry::new();
        let err = registry
            .create_body(BodySpec::new(BodyKind::Asteroid, 1.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, SimError::FactoryRejected { .. }));

        let err = registry
            .create_body(BodySpec::new(BodyKind::Asteroid, f64::NAN, 1.0))
            .unwrap_err();
        assert!(matches!(err, SimError::FactoryRejected { .. }));

        let bad = BodySpec::new(BodyKind::Asteroid, 1.0, 1.0).moving(DVec3::splat(f64::INFINITY));
        assert!(registry.create_body(bad).is_err());
        assert_eq!(registry.resources.live_count(), 0);
    }

    #[test]
    fn test_remove_releases_resources_and_is_idempotent() {
        let mut registry = BodyRegistry::new();
        let star = registry
            .create_body(BodySpec::new(BodyKind::Star, 10.0, 2.0))
            .unwrap();
        registry.add_bodies(vec![star.clone()]);
        assert!(registry.resources.live_count() > 0);

        registry.remove_body(&star);
        assert!(registry.is_empty());
        assert_eq!(registry.resources.live_count(), 0);
        assert!(registry.scene.is_empty());

        registry.remove_body(&star);
        assert_eq!(registry.resources.live_count(), 0);
    }

    #[test]
    fn test_black_hole_effect_released_with_owner() {
        let mut universe = Universe::new(1);
        let hole = universe
            .spawn(spec(BodyKind::BlackHole, 100.0, 1.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(universe.registry.black_hole_effect.owner(), Some(hole));

        universe.remove(hole).unwrap();
        assert!(!universe.registry.black_hole_effect.is_active());
        assert_eq!(universe.registry.resources.live_count(), 0);
    }

    #[test]
    fn test_effect_moves_to_surviving_black_hole() {
        let mut universe = Universe::new(1);
        let small = universe
            .spawn(spec(BodyKind::BlackHole, 10.0, 1.0, 0.0, 0.0))
            .unwrap();
        let big = universe
            .spawn(spec(BodyKind::BlackHole, 1000.0, 1.0, 1.5, 0.0))
            .unwrap();
        assert_eq!(universe.registry.black_hole_effect.owner(), Some(small));

        let result = universe.collide(small, big).unwrap();
        assert_eq!(result.survivor().unwrap().id, big);
        assert_eq!(universe.registry.black_hole_effect.owner(), Some(big));
    }

    #[test]
    fn test_collide_reinserts_survivors() {
        let mut universe = Universe::new(7);
        let a = universe.spawn(spec(BodyKind::Asteroid, 10.0, 2.0, 0.0, 5.0)).unwrap();
        let b = universe.spawn(spec(BodyKind::Asteroid, 10.0, 2.0, 3.0, -5.0)).unwrap();

        let result = universe.collide(a, b).unwrap();
        assert_eq!(result.kind, OutcomeKind::Merge);
        assert_eq!(universe.bodies().len(), 1);
        assert_eq!(universe.body(a).unwrap().mass, 20.0);
        assert!(universe.body(b).is_none());
    }

    #[test]
    fn test_collide_fragmentation_adds_debris() {
        let mut universe = Universe::new(7);
        let a = universe.spawn(spec(BodyKind::Planet, 50.0, 2.0, 0.0, 100.0)).unwrap();
        let b = universe.spawn(spec(BodyKind::Planet, 50.0, 2.0, 3.0, -100.0)).unwrap();

        let result = universe.collide(a, b).unwrap();
        assert_eq!(result.kind, OutcomeKind::Fragmentation);
        assert_eq!(universe.bodies().len(), 1 + result.debris.len());
        assert!((universe.total_mass() - 100.0).abs() < 1e-9);
        for debris in &result.debris {
            assert!(universe.body(debris.id).is_some());
        }
    }

    #[test]
    fn test_collide_errors_leave_state_untouched() {
        let mut universe = Universe::new(1);
        let a = universe.spawn(spec(BodyKind::Moon, 1.0, 1.0, 0.0, 0.0)).unwrap();

        assert!(matches!(universe.collide(a, a), Err(SimError::SelfCollision(_))));
        assert!(matches!(
            universe.collide(a, BodyId(99)),
            Err(SimError::UnknownBody(BodyId(99)))
        ));
        assert!(universe.body(a).is_some());
        assert!(matches!(universe.remove(BodyId(99)), Err(SimError::UnknownBody(_))));
    }

    #[test]
    fn test_same_seed_same_debris() {
        let run = |seed| {
            let mut universe = Universe::new(seed);
            let a = universe.spawn(spec(BodyKind::Planet, 50.0, 2.0, 0.0, 100.0)).unwrap();
            let b = universe.spawn(spec(BodyKind::Planet, 50.0, 2.0, 3.0, -100.0)).unwrap();
            universe
                .collide(a, b)
                .unwrap()
                .debris
                .iter()
                .map(|d| (d.position, d.velocity))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
