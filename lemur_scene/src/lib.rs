// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lemur Scene: a small 3D node tree with world boxes and ray queries.
//!
//! This crate is the reference collision scene for `lemur_pick`. It is deliberately plain:
//!
//! - Represents a hierarchy of nodes with local transforms, optional local boxes, and flags.
//! - [`Scene::commit`] recomputes world transforms and conservative world AABBs and reports
//!   coarse [`Damage`].
//! - [`Scene::ray_cast`] returns the nodes of one root's subtree struck by a ray, nearest first.
//!
//! It does not render, load assets, or manage materials. Host engines with their own scene
//! graph implement `lemur_pick`'s collision trait directly instead.
//!
//! ## API overview
//!
//! - [`Scene`]: container managing nodes and world data.
//! - [`LocalNode`]: per-node local data (bounds, transform, flags).
//! - [`NodeFlags`]: visibility and collision controls.
//! - [`NodeId`]: generational handle of a node.
//! - [`QueryFilter`]: restricts ray results.
//! - [`Aabb3`]: the box type, with the slab test in [`Aabb3::ray_intersection`].
//!
//! ## Minimal usage
//!
//! ```
//! use glam::{DAffine3, DVec3};
//! use lemur_scene::{Aabb3, LocalNode, QueryFilter, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.insert(None, LocalNode::default());
//! let crate_box = scene.insert(
//!     Some(root),
//!     LocalNode {
//!         local_bounds: Some(Aabb3::from_center(DVec3::ZERO, DVec3::ONE)),
//!         local_transform: DAffine3::from_translation(DVec3::new(0.0, 0.0, -10.0)),
//!         ..Default::default()
//!     },
//! );
//! let _ = scene.commit();
//!
//! let hits = scene.ray_cast(root, DVec3::ZERO, DVec3::NEG_Z, QueryFilter::PICKING);
//! assert_eq!(hits[0].node, crate_box);
//! assert_eq!(hits[0].distance, 9.0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod scene;
mod types;

pub use scene::Scene;
pub use types::{Aabb3, Damage, LocalNode, NodeFlags, NodeId, QueryFilter, RayHit};
