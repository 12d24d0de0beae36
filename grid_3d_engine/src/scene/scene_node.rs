/// Scene graph nodes.
///
/// The tree is split statically: the graph's `SceneRoot` only holds
/// children, and every `SceneNode` below it carries an entity. Children
/// are owned by value; the parent link is an ID looked up through the
/// graph, never a second owner.

use std::fmt;
use glam::{Mat4, Vec3};
use crate::engine_debug;
use crate::entity::{EntityKey, EntityStore};
use crate::render::Renderer;
use crate::scene::AABB;
use crate::utils::IdGenerator;
use super::update_transform::TransformRule;

/// Node identifier, unique within one scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub i32);

impl NodeId {
    /// Sentinel naming the graph root
    pub const ROOT: NodeId = NodeId(-1);

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn is_root(self) -> bool {
        self == NodeId::ROOT
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a lookup names its node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTarget {
    Entity(EntityKey),
    Id(NodeId),
}

impl From<EntityKey> for NodeTarget {
    fn from(key: EntityKey) -> Self {
        NodeTarget::Entity(key)
    }
}

impl From<NodeId> for NodeTarget {
    fn from(id: NodeId) -> Self {
        NodeTarget::Id(id)
    }
}

// ===== CHILD LIST OPERATIONS (shared by SceneNode and SceneRoot) =====

/// Depth-first, self-first search below `children`.
fn find_in(children: &[SceneNode], target: NodeTarget) -> Option<&SceneNode> {
    children.iter().find_map(|child| child.find(target))
}

fn find_in_mut(children: &mut [SceneNode], target: NodeTarget) -> Option<&mut SceneNode> {
    children.iter_mut().find_map(|child| child.find_mut(target))
}

/// Unlink the first node matching `target` and hand it back.
fn take_in(children: &mut Vec<SceneNode>, target: NodeTarget) -> Option<SceneNode> {
    for i in 0..children.len() {
        if children[i].matches(target) {
            let mut node = children.remove(i);
            node.parent = None;
            return Some(node);
        }
        if let Some(node) = take_in(&mut children[i].children, target) {
            return Some(node);
        }
    }
    None
}

fn count_in(children: &[SceneNode]) -> usize {
    children.iter().map(|child| 1 + child.count_descendants()).sum()
}

fn push_child(
    children: &mut Vec<SceneNode>,
    parent: NodeId,
    entity: EntityKey,
    ids: &mut IdGenerator,
    store: &dyn EntityStore,
) -> Option<NodeId> {
    if !store.contains(entity) {
        return None;
    }
    let id = NodeId(ids.next_id());
    let mut node = SceneNode::new(id, entity);
    node.parent = Some(parent);
    children.push(node);
    Some(id)
}

// ===== SCENE NODE =====

/// A tree node bound to one entity.
#[derive(Debug)]
pub struct SceneNode {
    id: NodeId,
    entity: EntityKey,
    parent: Option<NodeId>,
    children: Vec<SceneNode>,
    transform: Mat4,
    update_rule: Option<Box<dyn TransformRule>>,
}

impl SceneNode {
    fn new(id: NodeId, entity: EntityKey) -> Self {
        Self {
            id,
            entity,
            parent: None,
            children: Vec::new(),
            transform: Mat4::IDENTITY,
            update_rule: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn entity(&self) -> EntityKey {
        self.entity
    }

    /// Parent ID (`NodeId::ROOT` for first-tier nodes, `None` once detached)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn matches(&self, target: NodeTarget) -> bool {
        match target {
            NodeTarget::Entity(key) => self.entity == key,
            NodeTarget::Id(id) => self.id == id,
        }
    }

    // ===== TRANSFORM =====

    /// Local transform relative to the parent
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    /// Offset from the parent (translation part of the local transform)
    pub fn translation(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Replace the translation part of the local transform
    pub fn set_translate(&mut self, offset: Vec3) {
        self.transform.w_axis = offset.extend(1.0);
    }

    /// Post-multiply the local transform
    pub fn apply_transform(&mut self, transform: &Mat4) {
        self.transform *= *transform;
    }

    pub fn set_update_rule(&mut self, rule: Box<dyn TransformRule>) {
        self.update_rule = Some(rule);
    }

    pub fn clear_update_rule(&mut self) -> Option<Box<dyn TransformRule>> {
        self.update_rule.take()
    }

    pub fn has_update_rule(&self) -> bool {
        self.update_rule.is_some()
    }

    // ===== STRUCTURE =====

    /// Attach a new child for `entity`. Returns `None` for a stale key.
    pub fn add_child(&mut self, entity: EntityKey, ids: &mut IdGenerator, store: &dyn EntityStore) -> Option<NodeId> {
        push_child(&mut self.children, self.id, entity, ids, store)
    }

    /// Attach an existing subtree as the last child
    pub fn attach_child(&mut self, mut node: SceneNode) {
        node.parent = Some(self.id);
        self.children.push(node);
    }

    /// Destroy the first descendant matching `target` (and its subtree).
    ///
    /// Only one node is removed even if several match.
    pub fn delete_child(&mut self, target: impl Into<NodeTarget>, store: &mut dyn EntityStore) -> bool {
        match take_in(&mut self.children, target.into()) {
            Some(node) => {
                node.destroy(store);
                true
            }
            None => false,
        }
    }

    /// Destroy every child subtree, marking their entities done
    pub fn delete_all_children(&mut self, store: &mut dyn EntityStore) {
        for child in self.children.drain(..) {
            child.destroy(store);
        }
    }

    /// Unlink the first descendant matching `target` and return it
    pub fn detach_child(&mut self, target: impl Into<NodeTarget>) -> Option<SceneNode> {
        take_in(&mut self.children, target.into())
    }

    /// This node or a descendant, depth-first and self-first
    pub fn find(&self, target: NodeTarget) -> Option<&SceneNode> {
        if self.matches(target) {
            return Some(self);
        }
        find_in(&self.children, target)
    }

    pub fn find_mut(&mut self, target: NodeTarget) -> Option<&mut SceneNode> {
        if self.matches(target) {
            return Some(self);
        }
        find_in_mut(&mut self.children, target)
    }

    /// Direct and indirect children
    pub fn count_descendants(&self) -> usize {
        count_in(&self.children)
    }

    /// Mark this node's entity and every descendant's entity done.
    pub fn destroy(self, store: &mut dyn EntityStore) {
        store.set_done(self.entity, true);
        for child in self.children {
            child.destroy(store);
        }
    }

    // ===== BOUNDS =====

    /// Grow this node's entity AABB to cover all descendants.
    ///
    /// A child's box is shifted by the child's translation into its parent's
    /// frame; results are written back in each entity's local frame.
    pub fn recompute_aabb(&self, store: &mut dyn EntityStore) {
        let Some(mut bounds) = store.aabb(self.entity) else {
            return;
        };
        for child in &self.children {
            child.fold_aabb(&mut bounds, store);
        }
        store.set_aabb(self.entity, bounds);
    }

    /// Fold this subtree's bounds into `parent_bounds` (parent frame).
    fn fold_aabb(&self, parent_bounds: &mut AABB, store: &mut dyn EntityStore) {
        let Some(mut bounds) = store.aabb(self.entity) else {
            return;
        };
        for child in &self.children {
            child.fold_aabb(&mut bounds, store);
        }
        parent_bounds.expand_to_include(&bounds.translated(self.translation()));
        store.set_aabb(self.entity, bounds);
    }

    // ===== TICK =====

    /// Apply the update rule, update the entity, then the children
    pub fn update(&mut self, dt: f64, store: &mut dyn EntityStore) {
        if let Some(rule) = &mut self.update_rule {
            let step = rule.next_transform(dt);
            self.transform *= step;
        }
        store.update_entity(self.entity, dt);
        for child in &mut self.children {
            child.update(dt, store);
        }
    }

    /// Draw the entity at its position under the local transform, then
    /// the children inside the same matrix scope.
    pub fn render(&self, renderer: &mut dyn Renderer, store: &dyn EntityStore) {
        renderer.push_matrix();
        if let Some(position) = store.position(self.entity) {
            renderer.translate(position);
            renderer.mult_matrix(&self.transform);
            store.render_entity(self.entity, renderer);
        }
        for child in &self.children {
            child.render(renderer, store);
        }
        renderer.pop_matrix();
    }

    fn dump(&self, depth: usize, store: &dyn EntityStore) {
        engine_debug!(
            "grid3d::SceneGraph",
            "{:indent$}node {} entity {:?} at {:?} ({} children)",
            "", self.id, self.entity, store.position(self.entity), self.children.len(),
            indent = depth * 2
        );
        for child in &self.children {
            child.dump(depth + 1, store);
        }
    }
}

// ===== SCENE ROOT =====

/// Entity-less top of the tree
#[derive(Debug, Default)]
pub struct SceneRoot {
    children: Vec<SceneNode>,
}

impl SceneRoot {
    pub fn new() -> Self {
        Self { children: Vec::new() }
    }

    pub fn id(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn add_child(&mut self, entity: EntityKey, ids: &mut IdGenerator, store: &dyn EntityStore) -> Option<NodeId> {
        push_child(&mut self.children, NodeId::ROOT, entity, ids, store)
    }

    pub fn attach_child(&mut self, mut node: SceneNode) {
        node.parent = Some(NodeId::ROOT);
        self.children.push(node);
    }

    pub fn delete_child(&mut self, target: impl Into<NodeTarget>, store: &mut dyn EntityStore) -> bool {
        match take_in(&mut self.children, target.into()) {
            Some(node) => {
                node.destroy(store);
                true
            }
            None => false,
        }
    }

    pub fn delete_all_children(&mut self, store: &mut dyn EntityStore) {
        for child in self.children.drain(..) {
            child.destroy(store);
        }
    }

    pub fn detach_child(&mut self, target: impl Into<NodeTarget>) -> Option<SceneNode> {
        take_in(&mut self.children, target.into())
    }

    pub fn find(&self, target: NodeTarget) -> Option<&SceneNode> {
        find_in(&self.children, target)
    }

    pub fn find_mut(&mut self, target: NodeTarget) -> Option<&mut SceneNode> {
        find_in_mut(&mut self.children, target)
    }

    pub fn count_descendants(&self) -> usize {
        count_in(&self.children)
    }

    pub fn recompute_aabb(&self, store: &mut dyn EntityStore) {
        for child in &self.children {
            child.recompute_aabb(store);
        }
    }

    pub fn update(&mut self, dt: f64, store: &mut dyn EntityStore) {
        for child in &mut self.children {
            child.update(dt, store);
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer, store: &dyn EntityStore) {
        renderer.push_matrix();
        for child in &self.children {
            child.render(renderer, store);
        }
        renderer.pop_matrix();
    }

    pub(crate) fn dump(&self, store: &dyn EntityStore) {
        for child in &self.children {
            child.dump(1, store);
        }
    }
}

#[cfg(test)]
#[path = "scene_node_tests.rs"]
mod tests;
