//! Scene graph handles and GPU resource bookkeeping
//!
//! The renderer lives in the browser; this side only tracks which nodes exist,
//! how they nest, and which geometry/material handles each one owns, so a
//! removed body can give everything back exactly once.

use std::collections::{BTreeMap, BTreeSet};

use super::body::{BodyId, BodyKind};
use crate::SimError;

/// Scene node handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// GPU-side resource handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    Geometry(u32),
    Material(u32),
    Effect(u32),
}

/// Releases GPU-side resources
pub trait GpuResources {
    fn release(&mut self, resource: ResourceId) -> Result<(), SimError>;
}

/// In-memory allocator standing in for the renderer's resource tables
#[derive(Debug, Default)]
pub struct ResourcePool {
    live: BTreeSet<ResourceId>,
    next_id: u32,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn allocate_geometry(&mut self) -> ResourceId {
        let res = ResourceId::Geometry(self.next());
        self.live.insert(res);
        res
    }

    pub fn allocate_material(&mut self) -> ResourceId {
        let res = ResourceId::Material(self.next());
        self.live.insert(res);
        res
    }

    pub fn allocate_effect(&mut self) -> ResourceId {
        let res = ResourceId::Effect(self.next());
        self.live.insert(res);
        res
    }

    pub fn is_live(&self, resource: ResourceId) -> bool {
        self.live.contains(&resource)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl GpuResources for ResourcePool {
    fn release(&mut self, resource: ResourceId) -> Result<(), SimError> {
        if self.live.remove(&resource) {
            Ok(())
        } else {
            Err(SimError::ResourceRelease {
                resource,
                reason: "not allocated",
            })
        }
    }
}

#[derive(Debug, Clone, Default)]
struct SceneNode {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    geometry: Option<ResourceId>,
    materials: Vec<ResourceId>,
}

/// Parent/child structure of render nodes
#[derive(Debug)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    root: NodeId,
    next_id: u32,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, SceneNode::default());
        Self {
            nodes,
            root,
            next_id: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// Number of nodes, excluding the root
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    pub fn children_of(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Add a node under `parent` owning the given resources
    pub fn add_node(
        &mut self,
        parent: NodeId,
        geometry: Option<ResourceId>,
        materials: Vec<ResourceId>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                parent: Some(parent),
                children: Vec::new(),
                geometry,
                materials,
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        id
    }

    /// Build the node tree for a body: a mesh plus one child per sub-part
    pub fn spawn_body_node(&mut self, kind: BodyKind, pool: &mut ResourcePool) -> NodeId {
        let geometry = pool.allocate_geometry();
        let material = pool.allocate_material();
        let node = self.add_node(self.root, Some(geometry), vec![material]);

        for _ in 0..sub_parts(kind) {
            let geometry = pool.allocate_geometry();
            let material = pool.allocate_material();
            self.add_node(node, Some(geometry), vec![material]);
        }

        node
    }

    /// Detach a node from its parent, keeping it (and its subtree) alive
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(&node).and_then(|n| n.parent.take()) else {
            return;
        };
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|&c| c != node);
        }
    }

    /// Detach a node and release every resource it and its descendants own
    ///
    /// A failed release is logged and skipped; the rest still go back. Returns
    /// the number of failures. Unknown nodes are a no-op.
    pub fn dispose(&mut self, node: NodeId, gpu: &mut dyn GpuResources) -> usize {
        if node == self.root || !self.contains(node) {
            return 0;
        }

        self.detach(node);

        let mut failures = 0;
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(n) = self.nodes.remove(&id) else {
                continue;
            };
            stack.extend(n.children.iter().copied());

            for resource in n.geometry.into_iter().chain(n.materials) {
                if let Err(e) = gpu.release(resource) {
                    log::error!("Scene node {}: {}", id.0, e);
                    failures += 1;
                }
            }
        }
        failures
    }
}

/// Extra render parts per body type (atmosphere, corona, accretion disk)
fn sub_parts(kind: BodyKind) -> usize {
    match kind {
        BodyKind::Asteroid | BodyKind::Moon => 0,
        BodyKind::Comet => 1,
        BodyKind::Planet => 1,
        BodyKind::Star => 2,
        BodyKind::BlackHole => 1,
    }
}

/// The dedicated black-hole lensing effect; only one body may own it
#[derive(Debug, Default)]
pub struct BlackHoleEffect {
    owner: Option<BodyId>,
    resource: Option<ResourceId>,
}

impl BlackHoleEffect {
    pub fn owner(&self) -> Option<BodyId> {
        self.owner
    }

    pub fn is_active(&self) -> bool {
        self.resource.is_some()
    }

    /// Give the effect to `owner` if nobody holds it yet
    pub fn claim(&mut self, owner: BodyId, pool: &mut ResourcePool) -> bool {
        if self.owner.is_some() {
            return false;
        }
        self.owner = Some(owner);
        self.resource = Some(pool.allocate_effect());
        true
    }

    /// Release the effect resource; safe to call repeatedly
    pub fn dispose(&mut self, gpu: &mut dyn GpuResources) {
        self.owner = None;
        if let Some(resource) = self.resource.take() {
            if let Err(e) = gpu.release(resource) {
                log::error!("Black hole effect: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fails to release materials, succeeds for everything else
    struct BrokenMaterials {
        pool: ResourcePool,
        attempts: usize,
    }

    impl GpuResources for BrokenMaterials {
        fn release(&mut self, resource: ResourceId) -> Result<(), SimError> {
            self.attempts += 1;
            match resource {
                ResourceId::Material(_) => Err(SimError::ResourceRelease {
                    resource,
                    reason: "context lost",
                }),
                _ => self.pool.release(resource),
            }
        }
    }

    #[test]
    fn test_spawn_body_node_allocates_parts() {
        let mut scene = SceneGraph::new();
        let mut pool = ResourcePool::new();

        let node = scene.spawn_body_node(BodyKind::Star, &mut pool);
        assert_eq!(scene.parent_of(node), Some(scene.root()));
        assert_eq!(scene.children_of(node).len(), 2);
        assert_eq!(scene.len(), 3);
        // Mesh + material for the body and each sub-part
        assert_eq!(pool.live_count(), 6);
    }

    #[test]
    fn test_dispose_releases_subtree() {
        let mut scene = SceneGraph::new();
        let mut pool = ResourcePool::new();
        let node = scene.spawn_body_node(BodyKind::Planet, &mut pool);
        let keep = scene.spawn_body_node(BodyKind::Asteroid, &mut pool);

        let failures = scene.dispose(node, &mut pool);
        assert_eq!(failures, 0);
        assert!(!scene.contains(node));
        assert!(scene.contains(keep));
        assert_eq!(scene.children_of(scene.root()), &[keep]);
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn test_dispose_twice_is_noop() {
        let mut scene = SceneGraph::new();
        let mut pool = ResourcePool::new();
        let node = scene.spawn_body_node(BodyKind::Comet, &mut pool);

        scene.dispose(node, &mut pool);
        assert_eq!(scene.dispose(node, &mut pool), 0);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_failed_release_does_not_block_siblings() {
        let mut scene = SceneGraph::new();
        let mut pool = ResourcePool::new();
        let node = scene.spawn_body_node(BodyKind::Star, &mut pool);

        let mut gpu = BrokenMaterials { pool, attempts: 0 };
        let failures = scene.dispose(node, &mut gpu);

        // 3 materials failed, 3 geometries still released
        assert_eq!(failures, 3);
        assert_eq!(gpu.attempts, 6);
        assert_eq!(gpu.pool.live_count(), 3);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_detach_keeps_node() {
        let mut scene = SceneGraph::new();
        let mut pool = ResourcePool::new();
        let node = scene.spawn_body_node(BodyKind::Moon, &mut pool);

        scene.detach(node);
        assert!(scene.contains(node));
        assert_eq!(scene.parent_of(node), None);
        assert!(scene.children_of(scene.root()).is_empty());
    }

    #[test]
    fn test_black_hole_effect_singleton() {
        let mut pool = ResourcePool::new();
        let mut effect = BlackHoleEffect::default();

        assert!(effect.claim(BodyId(1), &mut pool));
        assert!(!effect.claim(BodyId(2), &mut pool));
        assert_eq!(effect.owner(), Some(BodyId(1)));
        assert!(effect.is_active());

        let resource = effect.resource.unwrap();
        assert!(pool.is_live(resource));

        effect.dispose(&mut pool);
        effect.dispose(&mut pool);
        assert!(!effect.is_active());
        assert!(!pool.is_live(resource));
        assert_eq!(pool.live_count(), 0);
    }
}
