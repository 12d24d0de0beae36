//! Scene module
//!
//! Hierarchical entity ownership (`SceneGraph`, `SceneNode`), per-tick
//! node transform rules and axis-aligned bounding boxes.

mod aabb;
mod scene_node;
mod scene_graph;
mod update_transform;

pub use aabb::AABB;
pub use scene_node::{NodeId, NodeTarget, SceneNode, SceneRoot};
pub use scene_graph::SceneGraph;
pub use update_transform::{TransformRule, UpdateTransformation};
