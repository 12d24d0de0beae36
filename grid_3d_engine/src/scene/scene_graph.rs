/// Scene graph - the entity hierarchy of a world.
///
/// Owns the root, hands out node IDs and exposes lookups by entity or
/// by ID. Lookup misses are reported as `false` / `None`, never as
/// errors.

use crate::engine_debug;
use crate::entity::{EntityKey, EntityStore};
use crate::render::Renderer;
use crate::utils::IdGenerator;
use super::scene_node::{NodeId, NodeTarget, SceneNode, SceneRoot};

#[derive(Debug, Default)]
pub struct SceneGraph {
    root: SceneRoot,
    ids: IdGenerator,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            root: SceneRoot::new(),
            ids: IdGenerator::new(),
        }
    }

    pub fn root(&self) -> &SceneRoot {
        &self.root
    }

    /// Add a node for `entity` under the root.
    ///
    /// Returns `None` when the key no longer names an entity.
    pub fn add_node(&mut self, entity: EntityKey, store: &dyn EntityStore) -> Option<NodeId> {
        self.root.add_child(entity, &mut self.ids, store)
    }

    /// Add a node for `entity` under `parent` (`NodeId::ROOT` for the root)
    pub fn add_child_node(&mut self, parent: NodeId, entity: EntityKey, store: &dyn EntityStore) -> Option<NodeId> {
        if parent.is_root() {
            return self.add_node(entity, store);
        }
        let node = self.root.find_mut(NodeTarget::Id(parent))?;
        node.add_child(entity, &mut self.ids, store)
    }

    /// Destroy the first node naming `target` and its whole subtree.
    ///
    /// Every destroyed entity is marked done. Returns `false` if no node matched.
    pub fn delete_node(&mut self, target: impl Into<NodeTarget>, store: &mut dyn EntityStore) -> bool {
        self.root.delete_child(target, store)
    }

    /// Unlink a subtree without destroying it
    pub fn detach_node(&mut self, target: impl Into<NodeTarget>) -> Option<SceneNode> {
        self.root.detach_child(target)
    }

    /// Re-attach a detached subtree under `parent`.
    ///
    /// The node is handed back if `parent` does not exist or its ID is
    /// already present in the graph.
    pub fn attach_node(&mut self, parent: NodeId, node: SceneNode) -> Result<(), SceneNode> {
        if self.root.find(NodeTarget::Id(node.id())).is_some() {
            return Err(node);
        }
        if parent.is_root() {
            self.root.attach_child(node);
            return Ok(());
        }
        match self.root.find_mut(NodeTarget::Id(parent)) {
            Some(parent) => {
                parent.attach_child(node);
                Ok(())
            }
            None => Err(node),
        }
    }

    pub fn find_node(&self, target: impl Into<NodeTarget>) -> Option<&SceneNode> {
        self.root.find(target.into())
    }

    pub fn find_node_mut(&mut self, target: impl Into<NodeTarget>) -> Option<&mut SceneNode> {
        self.root.find_mut(target.into())
    }

    /// Number of nodes below the root
    pub fn node_count(&self) -> usize {
        self.root.count_descendants()
    }

    /// Aggregate child bounds into every first-tier node's entity AABB
    pub fn recalculate_aabb(&self, store: &mut dyn EntityStore) {
        self.root.recompute_aabb(store);
    }

    /// Pre-order update of the whole tree
    pub fn update(&mut self, dt: f64, store: &mut dyn EntityStore) {
        self.root.update(dt, store);
    }

    pub fn render(&self, renderer: &mut dyn Renderer, store: &dyn EntityStore) {
        self.root.render(renderer, store);
    }

    /// Destroy every node, marking all entities done.
    ///
    /// IDs already handed out stay retired.
    pub fn destroy(&mut self, store: &mut dyn EntityStore) {
        let count = self.node_count();
        self.root.delete_all_children(store);
        engine_debug!("grid3d::SceneGraph", "Destroyed {} nodes", count);
    }

    /// Log the tree at DEBUG
    pub fn debug_dump(&self, store: &dyn EntityStore) {
        engine_debug!(
            "grid3d::SceneGraph",
            "root {} ({} nodes)",
            NodeId::ROOT, self.node_count()
        );
        self.root.dump(store);
    }
}

#[cfg(test)]
#[path = "scene_graph_tests.rs"]
mod tests;
