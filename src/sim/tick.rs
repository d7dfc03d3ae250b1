//! Fixed timestep simulation tick
//!
//! Drifts every body, finds touching pairs and resolves them closest-first.
//! A body takes part in at most one collision per tick, and fresh debris is
//! left alone until it has cleared the body it broke off from.

use std::collections::HashSet;

use super::body::{BodyId, CelestialBody};
use super::collision::CollisionResult;
use super::state::Universe;

/// Two overlapping bodies found by [`detect_overlaps`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: BodyId,
    pub b: BodyId,
    /// Centre distance at detection time
    pub separation: f64,
}

/// All overlapping pairs, closest first (ties broken by id)
pub fn detect_overlaps(bodies: &[CelestialBody]) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            if a.overlaps(b) {
                contacts.push(Contact {
                    a: a.id,
                    b: b.id,
                    separation: a.distance_to(b),
                });
            }
        }
    }

    contacts.sort_by(|x, y| {
        x.separation
            .total_cmp(&y.separation)
            .then(x.a.cmp(&y.a))
            .then(x.b.cmp(&y.b))
    });
    contacts
}

/// Move every body along its velocity
pub fn drift(bodies: &mut [CelestialBody], dt: f64) {
    for body in bodies {
        body.position += body.velocity * dt;
    }
}

/// Advance the universe by one fixed timestep
pub fn tick(universe: &mut Universe, dt: f64) -> Vec<CollisionResult> {
    drift(universe.registry.bodies_mut(), dt);
    universe.release_ejecta();

    let contacts = detect_overlaps(universe.bodies());
    let mut consumed: HashSet<BodyId> = HashSet::new();
    let mut results = Vec::new();

    for contact in contacts {
        if consumed.contains(&contact.a) || consumed.contains(&contact.b) {
            continue;
        }
        if universe.is_fresh_ejecta(contact.a, contact.b) {
            log::debug!("Fragments of {} <-> {} still separating", contact.a.0, contact.b.0);
            continue;
        }

        match universe.collide(contact.a, contact.b) {
            Ok(result) => {
                consumed.insert(contact.a);
                consumed.insert(contact.b);
                results.push(result);
            }
            Err(e) => log::warn!("Skipping contact {} <-> {}: {}", contact.a.0, contact.b.0, e),
        }
    }

    universe.time_ticks += 1;
    results
}
