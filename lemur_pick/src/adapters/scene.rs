// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapter for the Lemur reference scene.
//!
//! ## Feature
//!
//! Enable with `scene_adapter`.
//!
//! ## Notes
//!
//! [`Scene`] answers ray queries with [`QueryFilter::PICKING`], so hidden or
//! non-collidable nodes never become hit geometry. Use [`FilteredScene`] to pick with a
//! different filter. Queries see world data as of the last [`Scene::commit`].

use alloc::vec::Vec;

use lemur_scene::{NodeId, QueryFilter, Scene};

use crate::types::{CollisionResult, CollisionScene, ParentLookup, Ray};

impl ParentLookup<NodeId> for Scene {
    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        Self::parent_of(self, *node)
    }
}

impl CollisionScene<NodeId> for Scene {
    fn collide_with(&self, root: &NodeId, ray: &Ray, results: &mut Vec<CollisionResult<NodeId>>) {
        collide(self, *root, ray, QueryFilter::PICKING, results);
    }
}

/// A [`Scene`] borrowed with an explicit query filter.
#[derive(Clone, Copy, Debug)]
pub struct FilteredScene<'a> {
    /// The scene to query.
    pub scene: &'a Scene,
    /// Filter applied to every ray cast.
    pub filter: QueryFilter,
}

impl ParentLookup<NodeId> for FilteredScene<'_> {
    fn parent_of(&self, node: &NodeId) -> Option<NodeId> {
        self.scene.parent_of(*node)
    }
}

impl CollisionScene<NodeId> for FilteredScene<'_> {
    fn collide_with(&self, root: &NodeId, ray: &Ray, results: &mut Vec<CollisionResult<NodeId>>) {
        collide(self.scene, *root, ray, self.filter, results);
    }
}

fn collide(
    scene: &Scene,
    root: NodeId,
    ray: &Ray,
    filter: QueryFilter,
    results: &mut Vec<CollisionResult<NodeId>>,
) {
    results.extend(
        scene
            .ray_cast(root, ray.origin, ray.direction, filter)
            .into_iter()
            .map(|hit| CollisionResult {
                geometry: hit.node,
                distance: hit.distance,
                contact_point: hit.point,
            }),
    );
}
