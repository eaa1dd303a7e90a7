// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node handles, flags, bounds, and query results.

use alloc::vec::Vec;
use bitflags::bitflags;
use glam::{DAffine3, DVec3};

/// Identifier for a node in the scene (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32, u32);

impl NodeId {
    pub(crate) fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.1
    }
}

bitflags! {
    /// Node flags controlling visibility and collision.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is visible.
        const VISIBLE    = 0b0000_0001;
        /// Node takes part in ray queries.
        const COLLIDABLE = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::COLLIDABLE
    }
}

/// Axis-aligned box in 3D.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb3 {
    /// Box spanning two corners, in any order.
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box centered on `center` with the given half extents.
    pub fn from_center(center: DVec3, half_extents: DVec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Smallest box containing both.
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Center point.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Conservative world box of this box under `transform` (all eight corners).
    pub fn transformed(&self, transform: DAffine3) -> Self {
        let mut out: Option<Self> = None;
        for i in 0..8_u8 {
            let corner = DVec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = transform.transform_point3(corner);
            out = Some(match out {
                Some(b) => Self {
                    min: b.min.min(p),
                    max: b.max.max(p),
                },
                None => Self { min: p, max: p },
            });
        }
        out.unwrap_or(*self)
    }

    /// Slab test. Returns the ray parameter where the ray enters the box.
    ///
    /// A ray starting inside the box enters at `0`. Hits behind the origin are ignored.
    pub fn ray_intersection(&self, origin: DVec3, direction: DVec3) -> Option<f64> {
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d > -f64::EPSILON && d < f64::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                core::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Local geometry for a node.
#[derive(Clone, Debug)]
pub struct LocalNode {
    /// Bounds in node space. `None` for pure grouping nodes, which never collide.
    pub local_bounds: Option<Aabb3>,
    /// Transform relative to the parent.
    pub local_transform: DAffine3,
    /// Visibility and collision flags.
    ///
    /// See [`NodeFlags`] for available bits and how they interact with [`QueryFilter`].
    pub flags: NodeFlags,
}

impl Default for LocalNode {
    fn default() -> Self {
        Self {
            local_bounds: None,
            local_transform: DAffine3::IDENTITY,
            flags: NodeFlags::default(),
        }
    }
}

/// Filters applied during ray queries.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only consider nodes marked [`NodeFlags::VISIBLE`].
    pub visible_only: bool,
    /// If true, only consider nodes marked [`NodeFlags::COLLIDABLE`].
    pub collidable_only: bool,
}

impl QueryFilter {
    /// Visible and collidable nodes only; what picking wants.
    pub const PICKING: Self = Self {
        visible_only: true,
        collidable_only: true,
    };

    pub(crate) fn accepts(&self, flags: NodeFlags) -> bool {
        (!self.visible_only || flags.contains(NodeFlags::VISIBLE))
            && (!self.collidable_only || flags.contains(NodeFlags::COLLIDABLE))
    }
}

/// A node struck by a ray.
#[derive(Clone, Debug, PartialEq)]
pub struct RayHit {
    /// The node whose world box was struck.
    pub node: NodeId,
    /// Distance along the (normalized) ray to the entry point.
    pub distance: f64,
    /// World-space entry point.
    pub point: DVec3,
}

/// World boxes touched by a [`Scene::commit`](crate::Scene::commit).
#[derive(Clone, Debug, Default)]
pub struct Damage {
    /// Old and new world boxes of nodes whose bounds changed.
    pub dirty_bounds: Vec<Aabb3>,
}

impl Damage {
    /// Union of all damaged boxes.
    pub fn union(&self) -> Option<Aabb3> {
        let mut it = self.dirty_bounds.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, Aabb3::union))
    }

    /// Whether nothing moved.
    pub fn is_empty(&self) -> bool {
        self.dirty_bounds.is_empty()
    }
}
