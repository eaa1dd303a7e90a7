// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pick session implementation.
//!
//! ## Overview
//!
//! A [`PickEventSession`] is the state of one pointer. It turns screen locations into cursor
//! events for scene nodes by casting rays into every registered collision root.
//!
//! ## Target Selection
//!
//! - Roots are evaluated most recently added first, so an overlay registered after the
//!   world it covers wins where both are hit.
//! - Within a root, collisions are taken in the order the scene returns them (nearest first).
//! - Each collision resolves to its nearest pickable ancestor through
//!   [`PickTargets::find_hit_target`]. Geometry without one is skipped.
//! - The first resolved hit across all roots is the *hit target*. Exit and enter
//!   notifications derive from changes of that one target only.
//!
//! ## Capture
//!
//! - A press makes the hit target the *capture*. While a capture is held, further presses
//!   go to it instead of the hit target, and it is kept until a release.
//! - The capture gets every motion event first, before any ray is cast, and a capture that
//!   consumes the motion ends the pick for that call. Those events carry the viewport the
//!   capture was picked through.
//! - The capture also hears the enter and exit notifications of other nodes, so a dragged
//!   element can track what it passes over.
//! - A release goes to the capture first and always clears it. An unconsumed release also
//!   goes to the hit target when that is a different node.
//!
//! ## Sharing
//!
//! Clones share the registered roots and start with fresh hit and capture state; touch
//! input uses one clone per pointer.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashSet;
use kurbo::Point;
use log::{debug, trace};

use crate::hover::{HoverEvent, HoverState};
use crate::listener::{CursorButtonEvent, CursorMotionEvent};
use crate::targets::PickTargets;
use crate::types::{CollisionResult, CollisionScene, Ray, Viewport};

/// Hit testing and cursor event delivery for one pointer.
///
/// ## Usage
///
/// - Register roots with [`PickEventSession::add_collision_root`].
/// - Call [`PickEventSession::cursor_moved`] whenever the pointer moves and once per frame
///   (the scene may have moved under a still pointer).
/// - Call [`PickEventSession::button_event`] for presses and releases.
/// - Call [`PickEventSession::clear_hit_target`] when the pointer goes away.
pub struct PickEventSession<K> {
    roots: Rc<RefCell<Vec<(K, Viewport)>>>,
    hover: HoverState<K>,
    /// Pick information of the current hit target, carried into button events.
    hit_event: Option<CursorMotionEvent<K>>,
    capture: Option<K>,
    /// Viewport the capture was picked through, carried into its motion events.
    capture_viewport: Option<Viewport>,
    /// Targets that already received the motion event of the current call.
    delivered: HashSet<K>,
    /// Rays built during the current call, one per distinct viewport.
    rays: Vec<(Viewport, Option<Ray>)>,
    results: Vec<CollisionResult<K>>,
    location: Point,
}

impl<K: Debug> Debug for PickEventSession<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PickEventSession")
            .field("roots", &self.roots.borrow().len())
            .field("hit_target", &self.hover)
            .field("capture", &self.capture)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl<K> Clone for PickEventSession<K> {
    fn clone(&self) -> Self {
        Self {
            roots: self.roots.clone(),
            hover: HoverState::default(),
            hit_event: None,
            capture: None,
            capture_viewport: None,
            delivered: HashSet::new(),
            rays: Vec::new(),
            results: Vec::new(),
            location: self.location,
        }
    }
}

impl<K> Default for PickEventSession<K> {
    fn default() -> Self {
        Self {
            roots: Rc::new(RefCell::new(Vec::new())),
            hover: HoverState::default(),
            hit_event: None,
            capture: None,
            capture_viewport: None,
            delivered: HashSet::new(),
            rays: Vec::new(),
            results: Vec::new(),
            location: Point::ZERO,
        }
    }
}

impl<K: Clone + Eq + Hash + Debug> PickEventSession<K> {
    /// Create a session without roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collision root and the viewport its rays come from.
    ///
    /// Registering a known root replaces its viewport and keeps its priority.
    pub fn add_collision_root(&mut self, root: K, viewport: Viewport) {
        let mut roots = self.roots.borrow_mut();
        if let Some(entry) = roots.iter_mut().find(|(r, _)| *r == root) {
            entry.1 = viewport;
            return;
        }
        debug!("adding collision root {root:?}");
        roots.push((root, viewport));
    }

    /// Unregister a collision root. Returns whether it was registered.
    pub fn remove_collision_root(&mut self, root: &K) -> bool {
        let mut roots = self.roots.borrow_mut();
        let before = roots.len();
        roots.retain(|(r, _)| r != root);
        let removed = roots.len() != before;
        if removed {
            debug!("removed collision root {root:?}");
        }
        removed
    }

    /// Replace the viewport of a registered root, for example after a window resize.
    pub fn set_viewport(&mut self, root: &K, viewport: Viewport) -> bool {
        match self.roots.borrow_mut().iter_mut().find(|(r, _)| r == root) {
            Some(entry) => {
                entry.1 = viewport;
                true
            }
            None => false,
        }
    }

    /// The viewport of a registered root.
    pub fn viewport_of(&self, root: &K) -> Option<Viewport> {
        self.roots
            .borrow()
            .iter()
            .find(|(r, _)| r == root)
            .map(|(_, v)| *v)
    }

    /// Registered roots, in registration order (lowest priority first).
    pub fn collision_roots(&self) -> Vec<K> {
        self.roots.borrow().iter().map(|(r, _)| r.clone()).collect()
    }

    /// The node currently under the pointer.
    pub fn hit_target(&self) -> Option<&K> {
        self.hover.current()
    }

    /// The node holding the capture.
    pub fn capture(&self) -> Option<&K> {
        self.capture.as_ref()
    }

    /// The last location passed to [`PickEventSession::cursor_moved`].
    pub fn location(&self) -> Point {
        self.location
    }

    /// Pick at `location` and deliver motion, enter, and exit events.
    ///
    /// Returns whether a listener consumed the motion.
    pub fn cursor_moved<S>(&mut self, scene: &S, targets: &PickTargets<K>, location: Point) -> bool
    where
        S: CollisionScene<K> + ?Sized,
    {
        self.location = location;
        self.delivered.clear();
        self.rays.clear();
        let capture = self.capture.clone();

        if let Some(cap) = &capture {
            let mut event = CursorMotionEvent::new(location);
            event.viewport = self.capture_viewport;
            self.delivered.insert(cap.clone());
            targets.moved(cap, &mut event, cap, Some(cap));
            if event.is_consumed() {
                return true;
            }
        }

        let roots: Vec<(K, Viewport)> = self.roots.borrow().clone();
        let mut results = core::mem::take(&mut self.results);
        let mut found = false;
        let mut consumed = false;
        'roots: for (root, viewport) in roots.iter().rev() {
            let Some(ray) = self.ray_for(viewport, location) else {
                continue;
            };
            results.clear();
            scene.collide_with(root, &ray, &mut results);
            for collision in results.drain(..) {
                let Some(target) = targets.find_hit_target(scene, &collision.geometry) else {
                    continue;
                };
                let mut event = CursorMotionEvent::with_collision(location, *viewport, collision);
                if !found {
                    found = true;
                    self.set_hit_target(targets, Some(target.clone()), &event);
                }
                if !self.delivered.insert(target.clone()) {
                    continue;
                }
                targets.moved(&target, &mut event, &target, capture.as_ref());
                if event.is_consumed() {
                    consumed = true;
                    break 'roots;
                }
            }
        }
        self.results = results;

        if !found {
            self.set_hit_target(targets, None, &CursorMotionEvent::new(location));
        }
        consumed
    }

    /// Deliver a button press or release.
    ///
    /// Returns whether a listener consumed it.
    pub fn button_event(
        &mut self,
        targets: &PickTargets<K>,
        button: u32,
        location: Point,
        pressed: bool,
    ) -> bool {
        let mut event = CursorButtonEvent::new(button, pressed, location);
        if let Some(hit) = &self.hit_event {
            event.viewport = hit.viewport;
            event.collision = hit.collision.clone();
        }

        if pressed {
            if let Some(cap) = self.capture.clone() {
                targets.button_event(&cap, &mut event, &cap, Some(&cap));
                return event.is_consumed();
            }
            let Some(hit) = self.hover.current().cloned() else {
                return false;
            };
            trace!("capture taken by {hit:?}");
            self.capture = Some(hit.clone());
            self.capture_viewport = event.viewport;
            targets.button_event(&hit, &mut event, &hit, Some(&hit));
            return event.is_consumed();
        }

        let former = self.capture.take();
        self.capture_viewport = None;
        if let Some(cap) = &former {
            trace!("capture released by {cap:?}");
            targets.button_event(cap, &mut event, cap, Some(cap));
            if event.is_consumed() {
                return true;
            }
        }
        if let Some(hit) = self.hover.current().cloned()
            && former.as_ref() != Some(&hit)
        {
            targets.button_event(&hit, &mut event, &hit, None);
        }
        event.is_consumed()
    }

    /// Exit the current hit target and drop the capture.
    pub fn clear_hit_target(&mut self, targets: &PickTargets<K>) {
        let event = CursorMotionEvent::new(self.location);
        self.set_hit_target(targets, None, &event);
        self.capture = None;
        self.capture_viewport = None;
    }

    fn ray_for(&mut self, viewport: &Viewport, location: Point) -> Option<Ray> {
        if let Some((_, ray)) = self.rays.iter().find(|(v, _)| v == viewport) {
            return *ray;
        }
        let ray = viewport.pick_ray(location);
        self.rays.push((*viewport, ray));
        ray
    }

    fn set_hit_target(
        &mut self,
        targets: &PickTargets<K>,
        target: Option<K>,
        event: &CursorMotionEvent<K>,
    ) {
        self.hit_event = target.is_some().then(|| event.fresh());
        let capture = self.capture.clone();
        for transition in self.hover.update(target) {
            let (node, entering) = match transition {
                HoverEvent::Exit(node) => (node, false),
                HoverEvent::Enter(node) => (node, true),
            };
            trace!(
                "{} {node:?}",
                if entering { "entered" } else { "exited" }
            );
            let mut recipients = Vec::with_capacity(2);
            recipients.push(node.clone());
            if let Some(cap) = &capture
                && *cap != node
            {
                recipients.push(cap.clone());
            }
            for recipient in recipients {
                let mut ev = event.fresh();
                if entering {
                    targets.entered(&recipient, &mut ev, &node, capture.as_ref());
                } else {
                    targets.exited(&recipient, &mut ev, &node, capture.as_ref());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{ClickListener, CursorListener};
    use crate::testing::{Recorder, StripScene, drain, new_log};
    use alloc::vec;
    use core::cell::Cell;
    use pretty_assertions::assert_eq;

    const WORLD: u32 = 100;
    const OVERLAY: u32 = 200;

    fn at(x: f64) -> Point {
        Point::new(x, 50.0)
    }

    fn session_with(roots: &[u32]) -> PickEventSession<u32> {
        let mut s = PickEventSession::new();
        for &r in roots {
            s.add_collision_root(r, Viewport::screen(100.0, 100.0));
        }
        s
    }

    #[test]
    fn enter_once_then_moves_on_repeat() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 50.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        let mut s = session_with(&[WORLD]);

        assert!(!s.cursor_moved(&scene, &targets, at(10.0)));
        assert!(!s.cursor_moved(&scene, &targets, at(10.0)));
        assert_eq!(
            drain(&log),
            vec![
                (1, "enter", 1, None),
                (1, "move", 1, None),
                (1, "move", 1, None),
            ]
        );
        assert_eq!(s.hit_target(), Some(&1));

        s.cursor_moved(&scene, &targets, at(80.0));
        assert_eq!(drain(&log), vec![(1, "exit", 1, None)]);
        assert_eq!(s.hit_target(), None);
    }

    #[test]
    fn later_root_wins_and_click_stays_in_overlay() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 100.0, 5.0);
        scene.strip(OVERLAY, 2, 0.0, 100.0, 500.0);
        let world_clicks = Rc::new(Cell::new(0));
        let overlay_clicks = Rc::new(Cell::new(0));
        let mut targets: PickTargets<u32> = PickTargets::new();
        let w = world_clicks.clone();
        targets.add_listener(
            1,
            Rc::new(ClickListener::new(move |_: &CursorButtonEvent<u32>, _: &u32| {
                w.set(w.get() + 1);
            })),
        );
        let o = overlay_clicks.clone();
        targets.add_listener(
            2,
            Rc::new(ClickListener::new(move |_: &CursorButtonEvent<u32>, _: &u32| {
                o.set(o.get() + 1);
            })),
        );
        let mut s = session_with(&[WORLD, OVERLAY]);

        s.cursor_moved(&scene, &targets, at(30.0));
        assert_eq!(s.hit_target(), Some(&2));
        assert!(s.button_event(&targets, 0, at(30.0), true));
        assert_eq!(s.capture(), Some(&2));
        assert!(s.button_event(&targets, 0, at(30.0), false));
        assert_eq!(s.capture(), None);
        assert_eq!(overlay_clicks.get(), 1);
        assert_eq!(world_clicks.get(), 0);
    }

    #[test]
    fn distinct_targets_each_move_once_until_consumed() {
        let mut scene = StripScene::default();
        // Two pieces of geometry under the same pickable node, plus one behind them.
        scene.strip(WORLD, 10, 0.0, 100.0, 1.0);
        scene.strip(WORLD, 11, 0.0, 100.0, 2.0);
        scene.strip(WORLD, 20, 0.0, 100.0, 3.0);
        scene.parents.insert(10, 1);
        scene.parents.insert(11, 1);
        scene.parents.insert(1, WORLD);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        targets.add_listener(20, Recorder::new(20, &log));
        let mut s = session_with(&[WORLD]);

        s.cursor_moved(&scene, &targets, at(50.0));
        assert_eq!(
            drain(&log),
            vec![
                (1, "enter", 1, None),
                (1, "move", 1, None),
                (20, "move", 20, None),
            ]
        );

        targets.add_listener(1, Recorder::consuming(101, &log));
        assert!(s.cursor_moved(&scene, &targets, at(50.0)));
        assert_eq!(
            drain(&log),
            vec![(1, "move", 1, None), (101, "move", 1, None)]
        );
    }

    #[test]
    fn consuming_capture_hides_fresh_hits() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 50.0, 5.0);
        scene.strip(WORLD, 2, 50.0, 100.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::consuming(1, &log));
        targets.add_listener(2, Recorder::new(2, &log));
        let mut s = session_with(&[WORLD]);

        s.cursor_moved(&scene, &targets, at(10.0));
        s.button_event(&targets, 0, at(10.0), true);
        drain(&log);

        assert!(s.cursor_moved(&scene, &targets, at(60.0)));
        assert_eq!(drain(&log), vec![(1, "move", 1, Some(1))]);
        assert_eq!(s.hit_target(), Some(&1));
    }

    #[test]
    fn capture_tracks_what_it_passes_over() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 50.0, 5.0);
        scene.strip(WORLD, 2, 50.0, 100.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        targets.add_listener(2, Recorder::new(2, &log));
        let mut s = session_with(&[WORLD]);

        s.cursor_moved(&scene, &targets, at(10.0));
        assert!(!s.button_event(&targets, 0, at(10.0), true));
        drain(&log);

        s.cursor_moved(&scene, &targets, at(60.0));
        assert_eq!(
            drain(&log),
            vec![
                (1, "move", 1, Some(1)),
                (1, "exit", 1, Some(1)),
                (2, "enter", 2, Some(1)),
                (1, "enter", 2, Some(1)),
                (2, "move", 2, Some(1)),
            ]
        );

        assert!(!s.button_event(&targets, 0, at(60.0), false));
        assert_eq!(
            drain(&log),
            vec![(1, "release", 1, Some(1)), (2, "release", 2, None)]
        );
        assert_eq!(s.capture(), None);
    }

    #[test]
    fn second_press_goes_to_the_held_capture() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 50.0, 5.0);
        scene.strip(WORLD, 2, 50.0, 100.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        targets.add_listener(2, Recorder::new(2, &log));
        let mut s = session_with(&[WORLD]);

        s.cursor_moved(&scene, &targets, at(10.0));
        s.button_event(&targets, 0, at(10.0), true);
        s.cursor_moved(&scene, &targets, at(60.0));
        drain(&log);

        assert!(!s.button_event(&targets, 1, at(60.0), true));
        assert_eq!(drain(&log), vec![(1, "press", 1, Some(1))]);
        assert_eq!(s.capture(), Some(&1));
        assert_eq!(s.hit_target(), Some(&2));
    }

    #[test]
    fn captured_motion_keeps_its_viewport() {
        struct SeesViewport(Rc<RefCell<Vec<bool>>>);
        impl CursorListener<u32> for SeesViewport {
            fn cursor_moved(
                &self,
                event: &mut CursorMotionEvent<u32>,
                _target: &u32,
                _capture: Option<&u32>,
            ) {
                self.0.borrow_mut().push(event.viewport.is_some());
            }
        }

        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 50.0, 5.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Rc::new(SeesViewport(seen.clone())));
        let mut s = session_with(&[WORLD]);

        s.cursor_moved(&scene, &targets, at(10.0));
        s.button_event(&targets, 0, at(10.0), true);
        seen.borrow_mut().clear();

        s.cursor_moved(&scene, &targets, at(80.0));
        assert_eq!(s.hit_target(), None);
        assert_eq!(*seen.borrow(), [true]);

        s.button_event(&targets, 0, at(80.0), false);
        assert_eq!(s.capture_viewport, None);
    }

    #[test]
    fn release_reaches_shared_capture_and_hit_once() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 100.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        let mut s = session_with(&[WORLD]);

        s.cursor_moved(&scene, &targets, at(10.0));
        s.button_event(&targets, 0, at(10.0), true);
        s.button_event(&targets, 0, at(10.0), false);
        let releases = drain(&log)
            .into_iter()
            .filter(|e| e.1 == "release")
            .count();
        assert_eq!(releases, 1);
    }

    #[test]
    fn press_without_hit_is_ignored() {
        let scene = StripScene::default();
        let targets: PickTargets<u32> = PickTargets::new();
        let mut s = session_with(&[WORLD]);
        s.cursor_moved(&scene, &targets, at(10.0));
        assert!(!s.button_event(&targets, 0, at(10.0), true));
        assert_eq!(s.capture(), None);
    }

    #[test]
    fn clones_share_roots_but_not_state() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 100.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        let mut a = session_with(&[WORLD]);
        a.cursor_moved(&scene, &targets, at(10.0));

        let mut b = a.clone();
        assert_eq!(b.hit_target(), None);
        b.add_collision_root(OVERLAY, Viewport::screen(100.0, 100.0));
        assert_eq!(a.collision_roots(), [WORLD, OVERLAY]);

        assert!(a.remove_collision_root(&OVERLAY));
        assert!(!b.remove_collision_root(&OVERLAY));
        assert_eq!(b.collision_roots(), [WORLD]);
    }

    #[test]
    fn clear_hit_target_exits_and_releases_capture() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 100.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        let mut s = session_with(&[WORLD]);
        s.cursor_moved(&scene, &targets, at(10.0));
        s.button_event(&targets, 0, at(10.0), true);
        drain(&log);

        s.clear_hit_target(&targets);
        assert_eq!(drain(&log), vec![(1, "exit", 1, Some(1))]);
        assert_eq!(s.hit_target(), None);
        assert_eq!(s.capture(), None);
    }

    #[test]
    fn viewport_updates_change_the_ray() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 50.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        let mut s = session_with(&[WORLD]);

        s.cursor_moved(&scene, &targets, at(60.0));
        assert_eq!(s.hit_target(), None);

        // The same root now renders into the right half of a wider window.
        let mut vp = Viewport::screen(100.0, 100.0);
        vp.bounds = kurbo::Rect::new(50.0, 0.0, 150.0, 100.0);
        assert!(s.set_viewport(&WORLD, vp));
        assert_eq!(s.viewport_of(&WORLD), Some(vp));
        s.cursor_moved(&scene, &targets, at(60.0));
        assert_eq!(s.hit_target(), Some(&1));
    }

    #[test]
    fn listener_added_during_dispatch_waits_for_next_call() {
        let mut scene = StripScene::default();
        scene.strip(WORLD, 1, 0.0, 100.0, 5.0);
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        let Some(list) = targets.listeners(&1) else {
            panic!("node 1 has a control");
        };

        struct AddOnMove {
            list: lemur_input::ListenerList<dyn CursorListener<u32>>,
            extra: Rc<dyn CursorListener<u32>>,
        }
        impl CursorListener<u32> for AddOnMove {
            fn cursor_moved(
                &self,
                _event: &mut CursorMotionEvent<u32>,
                _target: &u32,
                _capture: Option<&u32>,
            ) {
                if !self.list.contains(&self.extra) {
                    self.list.add(self.extra.clone());
                }
            }
        }
        targets.add_listener(
            1,
            Rc::new(AddOnMove {
                list: list.clone(),
                extra: Recorder::new(2, &log),
            }),
        );

        let mut s = session_with(&[WORLD]);
        s.cursor_moved(&scene, &targets, at(10.0));
        assert_eq!(
            drain(&log),
            vec![(1, "enter", 1, None), (1, "move", 1, None)]
        );
        s.cursor_moved(&scene, &targets, at(10.0));
        assert_eq!(
            drain(&log),
            vec![(1, "move", 1, None), (2, "move", 1, None)]
        );
    }
}
