// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node arena and its queries.

use alloc::vec::Vec;
use glam::{DAffine3, DVec3};
use log::debug;

use crate::types::{Aabb3, Damage, LocalNode, NodeFlags, NodeId, QueryFilter, RayHit};

#[derive(Clone, Debug, Default)]
struct WorldNode {
    world_transform: DAffine3,
    world_bounds: Option<Aabb3>,
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: LocalNode,
    world: WorldNode,
    dirty: bool,
}

impl Node {
    fn new(local: LocalNode) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            local,
            world: WorldNode::default(),
            dirty: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A hierarchy of nodes with local transforms and cached world boxes.
pub struct Scene {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
    epoch: u64,
}

impl core::fmt::Debug for Scene {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|s| s.node.is_some()).count();
        f.debug_struct("Scene")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            epoch: 0,
        }
    }

    /// Insert a new node as a child of `parent` (or as a root if `None`).
    ///
    /// A dead `parent` makes the node a root.
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalNode) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation += 1;
            slot.node = Some(Node::new(local));
            let generation = slot.generation;
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            self.slots.push(Slot {
                generation: 1,
                node: Some(Node::new(local)),
            });
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.slots.len() - 1) as u32, 1_u32)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = parent {
            if self.is_alive(p) {
                self.link_parent(id, p);
            } else {
                debug!("insert under dead parent {p:?}; {id:?} becomes a root");
            }
        }
        id
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(parent) = self.parent_of(id) {
            self.unlink_parent(id, parent);
        }
        for child in self.children_of(id).to_vec() {
            self.remove(child);
        }
        // The slot keeps its generation so stale ids stay dead after reuse.
        self.slots[id.idx()].node = None;
        self.free_list.push(id.idx());
    }

    /// Move `id` under `new_parent`, or make it a root.
    ///
    /// Ignored when it would create a cycle.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        if let Some(p) = new_parent
            && (!self.is_alive(p) || self.path_to_root(p).contains(&id))
        {
            debug!("refusing to reparent {id:?} under {p:?}");
            return;
        }
        if let Some(parent) = self.parent_of(id) {
            self.unlink_parent(id, parent);
        }
        if let Some(p) = new_parent {
            self.link_parent(id, p);
        }
        self.mark_subtree_dirty(id);
    }

    /// Update local bounds.
    pub fn set_local_bounds(&mut self, id: NodeId, bounds: Option<Aabb3>) {
        if let Some(node) = self.node_mut(id) {
            node.local.local_bounds = bounds;
            node.dirty = true;
        }
    }

    /// Update the local transform. Descendants move along at the next commit.
    pub fn set_local_transform(&mut self, id: NodeId, transform: DAffine3) {
        if let Some(node) = self.node_mut(id) {
            node.local.local_transform = transform;
        }
        self.mark_subtree_dirty(id);
    }

    /// Update flags.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(node) = self.node_mut(id) {
            // flags do not affect world transforms/bounds
            node.local.flags = flags;
        }
    }

    /// Local data of a node.
    pub fn local(&self, id: NodeId) -> Option<&LocalNode> {
        self.node(id).map(|n| &n.local)
    }

    /// Recompute world transforms and boxes of dirty nodes, returning coarse damage.
    pub fn commit(&mut self) -> Damage {
        self.epoch = self.epoch.wrapping_add(1);
        let mut damage = Damage::default();
        let roots: Vec<NodeId> = self.roots().collect();
        for root in roots {
            self.update_world_recursive(root, DAffine3::IDENTITY, false, &mut damage);
        }
        damage
    }

    /// Live nodes without a parent, in slot order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| match &s.node {
            Some(n) if n.parent.is_none() => {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "NodeId uses 32-bit indices by design."
                )]
                Some(NodeId::new(i as u32, s.generation))
            }
            _ => None,
        })
    }

    /// Whether `id` refers to a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Parent of a node.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Children of a node, in insertion order.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Path from the root down to `id` (inclusive). Empty for dead ids.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            if !self.is_alive(n) {
                break;
            }
            out.push(n);
            cur = self.parent_of(n);
        }
        out.reverse();
        out
    }

    /// World box as of the last commit.
    pub fn world_bounds(&self, id: NodeId) -> Option<Aabb3> {
        self.node(id)?.world.world_bounds
    }

    /// World transform as of the last commit.
    pub fn world_transform(&self, id: NodeId) -> Option<DAffine3> {
        self.node(id).map(|n| n.world.world_transform)
    }

    /// Nodes in the subtree of `root` whose world boxes the ray strikes, nearest first.
    ///
    /// Uses world data as of the last commit. `direction` need not be normalized; distances
    /// are measured along the normalized direction. Equal distances keep depth-first order.
    pub fn ray_cast(
        &self,
        root: NodeId,
        origin: DVec3,
        direction: DVec3,
        filter: QueryFilter,
    ) -> Vec<RayHit> {
        let mut hits = Vec::new();
        let Some(dir) = direction.try_normalize() else {
            return hits;
        };
        let mut stack = Vec::new();
        if self.is_alive(root) {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if filter.accepts(node.local.flags)
                && let Some(bounds) = node.world.world_bounds
                && let Some(distance) = bounds.ray_intersection(origin, dir)
            {
                hits.push(RayHit {
                    node: id,
                    distance,
                    point: origin + dir * distance,
                });
            }
            stack.extend(node.children.iter().rev().copied());
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    // --- internals ---

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn link_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = Some(parent);
        }
    }

    fn unlink_parent(&mut self, id: NodeId, parent: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    fn mark_subtree_dirty(&mut self, id: NodeId) {
        let children = match self.node_mut(id) {
            Some(n) => {
                n.dirty = true;
                n.children.clone()
            }
            None => return,
        };
        for c in children {
            self.mark_subtree_dirty(c);
        }
    }

    fn update_world_recursive(
        &mut self,
        id: NodeId,
        parent_tf: DAffine3,
        parent_dirty: bool,
        damage: &mut Damage,
    ) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let dirty = node.dirty || parent_dirty;
        if dirty {
            let old = node.world.world_bounds;
            node.world.world_transform = parent_tf * node.local.local_transform;
            let world_tf = node.world.world_transform;
            node.world.world_bounds = node.local.local_bounds.map(|b| b.transformed(world_tf));
            node.dirty = false;
            if old != node.world.world_bounds {
                damage.dirty_bounds.extend(old);
                damage.dirty_bounds.extend(node.world.world_bounds);
            }
        }
        let world_tf = node.world.world_transform;
        let children = node.children.clone();
        for child in children {
            self.update_world_recursive(child, world_tf, dirty, damage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(center: DVec3) -> LocalNode {
        LocalNode {
            local_bounds: Some(Aabb3::from_center(DVec3::ZERO, DVec3::splat(0.5))),
            local_transform: DAffine3::from_translation(center),
            ..Default::default()
        }
    }

    #[test]
    fn ray_cast_orders_nearest_first() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let far = scene.insert(Some(root), boxed(DVec3::new(0.0, 0.0, -10.0)));
        let near = scene.insert(Some(root), boxed(DVec3::new(0.0, 0.0, -2.0)));
        let _ = scene.commit();

        let hits = scene.ray_cast(root, DVec3::ZERO, DVec3::NEG_Z * 4.0, QueryFilter::PICKING);
        let order: Vec<NodeId> = hits.iter().map(|h| h.node).collect();
        assert_eq!(order, [near, far]);
        assert_eq!(hits[0].distance, 1.5);
        assert_eq!(hits[0].point, DVec3::new(0.0, 0.0, -1.5));
    }

    #[test]
    fn ray_cast_stays_inside_root_and_honors_flags() {
        let mut scene = Scene::new();
        let world = scene.insert(None, LocalNode::default());
        let overlay = scene.insert(None, LocalNode::default());
        let a = scene.insert(Some(world), boxed(DVec3::new(0.0, 0.0, -5.0)));
        let b = scene.insert(Some(overlay), boxed(DVec3::new(0.0, 0.0, -5.0)));
        let _ = scene.commit();

        let hits = scene.ray_cast(world, DVec3::ZERO, DVec3::NEG_Z, QueryFilter::PICKING);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, a);

        scene.set_flags(b, NodeFlags::VISIBLE);
        let hits = scene.ray_cast(overlay, DVec3::ZERO, DVec3::NEG_Z, QueryFilter::PICKING);
        assert!(hits.is_empty());
        let hits = scene.ray_cast(overlay, DVec3::ZERO, DVec3::NEG_Z, QueryFilter::default());
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn parent_transform_moves_descendants() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let group = scene.insert(Some(root), LocalNode::default());
        let leaf = scene.insert(Some(group), boxed(DVec3::ZERO));
        let _ = scene.commit();

        scene.set_local_transform(group, DAffine3::from_translation(DVec3::new(10.0, 0.0, 0.0)));
        let damage = scene.commit();
        assert!(!damage.is_empty());
        let b = scene.world_bounds(leaf).unwrap();
        assert_eq!(b.center(), DVec3::new(10.0, 0.0, 0.0));
        assert!(damage.union().unwrap().contains(DVec3::ZERO));
    }

    #[test]
    fn reparent_updates_world_data() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let a = scene.insert(
            Some(root),
            LocalNode {
                local_transform: DAffine3::from_translation(DVec3::X * 100.0),
                ..Default::default()
            },
        );
        let b = scene.insert(
            Some(root),
            LocalNode {
                local_transform: DAffine3::from_translation(DVec3::Y * 100.0),
                ..Default::default()
            },
        );
        let leaf = scene.insert(Some(a), boxed(DVec3::ZERO));
        let _ = scene.commit();
        assert_eq!(scene.world_bounds(leaf).unwrap().center(), DVec3::X * 100.0);

        scene.reparent(leaf, Some(b));
        let _ = scene.commit();
        assert_eq!(scene.world_bounds(leaf).unwrap().center(), DVec3::Y * 100.0);
        assert_eq!(scene.path_to_root(leaf), [root, b, leaf]);
        assert_eq!(scene.children_of(a), &[] as &[NodeId]);

        // A node cannot move under its own descendant.
        scene.reparent(root, Some(leaf));
        assert_eq!(scene.parent_of(root), None);
    }

    #[test]
    fn removed_ids_stay_dead_after_slot_reuse() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::default());
        let child = scene.insert(Some(root), boxed(DVec3::ZERO));
        let grandchild = scene.insert(Some(child), boxed(DVec3::ZERO));
        scene.remove(child);
        assert!(!scene.is_alive(child));
        assert!(!scene.is_alive(grandchild));
        assert!(scene.children_of(root).is_empty());

        let reused = scene.insert(Some(root), boxed(DVec3::ZERO));
        assert!(scene.is_alive(reused));
        assert!(!scene.is_alive(child));
        assert!(!scene.is_alive(grandchild));
        assert_eq!(scene.roots().collect::<Vec<_>>(), [root]);
    }
}
