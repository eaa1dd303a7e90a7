// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lemur Pick: cursor events for scene nodes, by ray casting.
//!
//! ## Overview
//!
//! This crate turns pointer input into per-node cursor events. It does not own a scene
//! graph: the host implements [`CollisionScene`](crate::types::CollisionScene) for whatever
//! it renders, and attaches [`CursorListener`](crate::listener::CursorListener)s to the
//! nodes that should react through [`PickTargets`](crate::targets::PickTargets).
//!
//! ## Workflow
//!
//! 1) Register collision roots with a [`PickEventSession`](crate::session::PickEventSession),
//!    each with the [`Viewport`](crate::types::Viewport) that renders it. Roots added later
//!    have priority, so register GUI overlays after the world.
//! 2) Feed pointer input through a [`MouseDriver`](crate::mouse::MouseDriver) or a
//!    [`TouchDriver`](crate::touch::TouchDriver), or call the session directly.
//! 3) Listeners receive motion, enter, exit, and button events. Consuming a motion or
//!    button event stops further delivery, and the drivers mark the raw event consumed so
//!    an input mapper further down the chain ignores it.
//!
//! ## Capture
//!
//! A press captures the pressed node. Until the release it receives every motion event
//! first, along with the enter and exit notifications of the nodes it is dragged over.
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use lemur_pick::listener::{ClickListener, CursorButtonEvent};
//! use lemur_pick::session::PickEventSession;
//! use lemur_pick::targets::PickTargets;
//! use lemur_pick::types::{CollisionResult, CollisionScene, ParentLookup, Ray, Viewport};
//!
//! // A "scene" with one button covering the left half of the screen.
//! struct Panel;
//! impl ParentLookup<u32> for Panel {
//!     fn parent_of(&self, _node: &u32) -> Option<u32> {
//!         None
//!     }
//! }
//! impl CollisionScene<u32> for Panel {
//!     fn collide_with(&self, _root: &u32, ray: &Ray, results: &mut Vec<CollisionResult<u32>>) {
//!         if ray.origin.x < 50.0 {
//!             results.push(CollisionResult { geometry: 1, distance: 1.0, contact_point: ray.at(1.0) });
//!         }
//!     }
//! }
//!
//! let mut targets: PickTargets<u32> = PickTargets::new();
//! targets.add_listener(
//!     1,
//!     Rc::new(ClickListener::new(|_: &CursorButtonEvent<u32>, node: &u32| {
//!         println!("clicked {node}");
//!     })),
//! );
//! let mut session = PickEventSession::new();
//! session.add_collision_root(0, Viewport::screen(100.0, 100.0));
//!
//! let at = kurbo::Point::new(20.0, 20.0);
//! session.cursor_moved(&Panel, &targets, at);
//! assert_eq!(session.hit_target(), Some(&1));
//! assert!(session.button_event(&targets, 0, at, true));
//! assert!(session.button_event(&targets, 0, at, false));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod hover;
pub mod listener;
pub mod mouse;
pub mod session;
pub mod targets;
pub mod touch;
pub mod types;

#[cfg(test)]
mod testing;

pub use listener::{ClickListener, CursorButtonEvent, CursorListener, CursorMotionEvent};
pub use mouse::{MouseDriver, MouseInput};
pub use session::PickEventSession;
pub use targets::PickTargets;
pub use touch::{TouchDriver, TouchInput};
pub use types::{Camera, CollisionResult, CollisionScene, ParentLookup, Ray, Viewport};
