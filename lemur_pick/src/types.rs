// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types for picking: rays, cameras, viewports, collision results, and scene lookups.
//!
//! ## Overview
//!
//! A pick session never walks a scene graph itself. It asks a [`CollisionScene`] for the
//! geometry a [`Ray`] strikes below a root, and walks up through [`ParentLookup`] to find a
//! node that handles cursor events. Rays come from a [`Viewport`]: a screen rectangle and the
//! [`Camera`] that renders into it.
//!
//! Screen coordinates have their origin at the bottom-left of the window, y up.
//! Cameras follow glam's right-handed conventions with a `[0, 1]` depth range
//! ([`DMat4::perspective_rh`], [`DMat4::orthographic_rh`]).

use alloc::vec::Vec;

use glam::{DMat4, DVec3};
use kurbo::{Point, Rect};

/// A half-line in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
}

impl Ray {
    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// View and projection used to build pick rays.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// World to view transform.
    pub view: DMat4,
    /// View to clip transform.
    pub projection: DMat4,
    /// Whether the projection is parallel (orthographic).
    pub parallel: bool,
}

impl Camera {
    /// Depth range of [`Camera::screen_space`]: GUI elements live in `z` within `±GUI_DEPTH`.
    pub const GUI_DEPTH: f64 = 1000.0;

    /// A parallel camera mapping world `x`/`y` one to one onto a `width` by `height` window.
    ///
    /// This is the camera of a GUI overlay: rays start in front of every element and travel
    /// down `-z`.
    pub fn screen_space(width: f64, height: f64) -> Self {
        Self {
            view: DMat4::IDENTITY,
            projection: DMat4::orthographic_rh(
                0.0,
                width,
                0.0,
                height,
                -Self::GUI_DEPTH,
                Self::GUI_DEPTH,
            ),
            parallel: true,
        }
    }

    /// A perspective camera at `eye` looking at `target`.
    pub fn perspective(
        fov_y_radians: f64,
        aspect: f64,
        near: f64,
        far: f64,
        eye: DVec3,
        target: DVec3,
    ) -> Self {
        Self {
            view: DMat4::look_at_rh(eye, target, DVec3::Y),
            projection: DMat4::perspective_rh(fov_y_radians, aspect, near, far),
            parallel: false,
        }
    }
}

/// A screen rectangle and the camera that renders into it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Screen-space rectangle, origin at the bottom-left.
    pub bounds: Rect,
    /// Camera used to build rays for this viewport.
    pub camera: Camera,
}

impl Viewport {
    /// A viewport covering `bounds`.
    pub fn new(bounds: Rect, camera: Camera) -> Self {
        Self { bounds, camera }
    }

    /// A full-window GUI viewport using [`Camera::screen_space`].
    pub fn screen(width: f64, height: f64) -> Self {
        Self::new(
            Rect::new(0.0, 0.0, width, height),
            Camera::screen_space(width, height),
        )
    }

    /// World-space pick ray through a screen location.
    ///
    /// Returns `None` for degenerate viewports or cameras.
    pub fn pick_ray(&self, location: Point) -> Option<Ray> {
        let (w, h) = (self.bounds.width(), self.bounds.height());
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        let ndc_x = (location.x - self.bounds.x0) / w * 2.0 - 1.0;
        let ndc_y = (location.y - self.bounds.y0) / h * 2.0 - 1.0;

        let view_proj = self.camera.projection * self.camera.view;
        let det = view_proj.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inverse = view_proj.inverse();
        let near = inverse.project_point3(DVec3::new(ndc_x, ndc_y, 0.0));
        let direction = if self.camera.parallel {
            // Straight down the view axis.
            self.camera
                .view
                .inverse()
                .transform_vector3(DVec3::NEG_Z)
                .try_normalize()?
        } else {
            let far = inverse.project_point3(DVec3::new(ndc_x, ndc_y, 1.0));
            (far - near).try_normalize()?
        };
        Some(Ray {
            origin: near,
            direction,
        })
    }
}

/// Geometry struck by a pick ray.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionResult<K> {
    /// The geometry node that was struck.
    pub geometry: K,
    /// Distance along the ray.
    pub distance: f64,
    /// World-space contact point.
    pub contact_point: DVec3,
}

/// Look up the parent of a node, to walk from struck geometry to the node that handles it.
pub trait ParentLookup<K> {
    /// Returns the parent of `node`, or `None` if `node` is a root.
    fn parent_of(&self, node: &K) -> Option<K>;
}

/// Ray queries against a scene, one root at a time.
pub trait CollisionScene<K>: ParentLookup<K> {
    /// Append the geometry below `root` struck by `ray` to `results`, nearest first.
    fn collide_with(&self, root: &K, ray: &Ray, results: &mut Vec<CollisionResult<K>>);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec3, b: DVec3) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn screen_space_ray_runs_straight_into_the_screen() {
        let vp = Viewport::screen(800.0, 600.0);
        let ray = vp.pick_ray(Point::new(100.0, 50.0)).unwrap();
        assert!(close(ray.direction, DVec3::NEG_Z));
        assert!(close(ray.origin, DVec3::new(100.0, 50.0, Camera::GUI_DEPTH)));
    }

    #[test]
    fn perspective_center_ray_follows_the_view_axis() {
        let camera = Camera::perspective(
            core::f64::consts::FRAC_PI_2,
            1.0,
            0.1,
            100.0,
            DVec3::new(0.0, 0.0, 10.0),
            DVec3::ZERO,
        );
        let vp = Viewport::new(Rect::new(0.0, 0.0, 200.0, 200.0), camera);
        let ray = vp.pick_ray(Point::new(100.0, 100.0)).unwrap();
        assert!(close(ray.direction, DVec3::NEG_Z));
        assert!(close(ray.origin, DVec3::new(0.0, 0.0, 9.9)));

        // Off-center rays diverge from the axis.
        let right = vp.pick_ray(Point::new(200.0, 100.0)).unwrap();
        assert!(right.direction.x > 0.5);
    }

    #[test]
    fn offset_viewport_uses_its_own_rectangle() {
        let mut vp = Viewport::screen(100.0, 100.0);
        vp.bounds = Rect::new(100.0, 0.0, 200.0, 100.0);
        let ray = vp.pick_ray(Point::new(150.0, 50.0)).unwrap();
        assert!(close(ray.origin, DVec3::new(50.0, 50.0, Camera::GUI_DEPTH)));
    }

    #[test]
    fn degenerate_viewport_has_no_ray() {
        let vp = Viewport::new(Rect::ZERO, Camera::screen_space(1.0, 1.0));
        assert!(vp.pick_ray(Point::ZERO).is_none());
    }
}
