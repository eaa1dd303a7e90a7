// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mouse driver: one pick session fed by raw mouse events.
//!
//! Motion only records the cursor location. Picking happens once per frame in
//! [`MouseDriver::update`], so a scene that moves under a still cursor still produces
//! enter and exit events. Button events are delivered immediately against the hit target
//! of the last update.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;
use lemur_input::raw::{MouseButtonEvent, MouseMotionEvent};
use lemur_input::RawInputListener;
use log::debug;

use crate::session::PickEventSession;
use crate::targets::PickTargets;
use crate::types::CollisionScene;

/// Drives a [`PickEventSession`] from the mouse.
#[derive(Debug)]
pub struct MouseDriver<K> {
    session: PickEventSession<K>,
    location: Option<Point>,
    enabled: bool,
}

impl<K: Clone + Eq + Hash + Debug> MouseDriver<K> {
    /// Create an enabled driver around `session`.
    pub fn new(session: PickEventSession<K>) -> Self {
        Self {
            session,
            location: None,
            enabled: true,
        }
    }

    /// The driven session.
    pub fn session(&self) -> &PickEventSession<K> {
        &self.session
    }

    /// The driven session, for root registration.
    pub fn session_mut(&mut self) -> &mut PickEventSession<K> {
        &mut self.session
    }

    /// Last known cursor location.
    pub fn location(&self) -> Option<Point> {
        self.location
    }

    /// Enable or disable picking. Disabling exits the hit target and drops the capture.
    pub fn set_enabled(&mut self, enabled: bool, targets: &PickTargets<K>) {
        if self.enabled == enabled {
            return;
        }
        debug!("mouse picking {}", if enabled { "enabled" } else { "disabled" });
        self.enabled = enabled;
        if !enabled {
            self.session.clear_hit_target(targets);
        }
    }

    /// Whether picking is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pick at the last cursor location. Call once per frame.
    ///
    /// Returns whether a listener consumed the motion.
    pub fn update<S>(&mut self, scene: &S, targets: &PickTargets<K>) -> bool
    where
        S: CollisionScene<K> + ?Sized,
    {
        if !self.enabled {
            return false;
        }
        let Some(location) = self.location else {
            return false;
        };
        self.session.cursor_moved(scene, targets, location)
    }

    /// Record the cursor location of a motion event.
    pub fn on_motion(&mut self, event: &MouseMotionEvent) {
        self.location = Some(event.location);
    }

    /// Deliver a button event; marks `event` consumed when a target consumed it.
    pub fn on_button(&mut self, targets: &PickTargets<K>, event: &mut MouseButtonEvent) -> bool {
        if !self.enabled {
            return false;
        }
        self.location = Some(event.location);
        let consumed = self
            .session
            .button_event(targets, event.button, event.location, event.pressed);
        if consumed {
            event.consumed = true;
        }
        consumed
    }
}

/// A [`RawInputListener`] view of a [`MouseDriver`] for one frame.
///
/// Place it before the input mapper in [`dispatch_frame`](lemur_input::dispatch_frame) so
/// clicks consumed by the scene never reach key bindings.
pub struct MouseInput<'a, K, S: ?Sized> {
    /// The driver receiving events.
    pub driver: &'a mut MouseDriver<K>,
    /// Scene picked at the end of the frame.
    pub scene: &'a S,
    /// Listeners of pickable nodes.
    pub targets: &'a PickTargets<K>,
}

impl<K: Debug, S: ?Sized> Debug for MouseInput<'_, K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MouseInput")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl<K, S> RawInputListener for MouseInput<'_, K, S>
where
    K: Clone + Eq + Hash + Debug,
    S: CollisionScene<K> + ?Sized,
{
    fn end_input(&mut self) {
        self.driver.update(self.scene, self.targets);
    }

    fn on_mouse_button_event(&mut self, event: &mut MouseButtonEvent) {
        self.driver.on_button(self.targets, event);
    }

    fn on_mouse_motion_event(&mut self, event: &mut MouseMotionEvent) {
        self.driver.on_motion(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Recorder, StripScene, drain, new_log};
    use crate::types::Viewport;
    use alloc::vec;
    use kurbo::Vec2;
    use lemur_input::raw::RawInputEvent;
    use lemur_input::dispatch_frame;
    use pretty_assertions::assert_eq;

    fn fixture() -> (StripScene, MouseDriver<u32>) {
        let mut scene = StripScene::default();
        scene.strip(100, 1, 0.0, 50.0, 5.0);
        let mut session = PickEventSession::new();
        session.add_collision_root(100, Viewport::screen(100.0, 100.0));
        (scene, MouseDriver::new(session))
    }

    #[test]
    fn motion_is_picked_at_update() {
        let (scene, mut driver) = fixture();
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));

        assert!(!driver.update(&scene, &targets));
        driver.on_motion(&MouseMotionEvent::new(Point::new(10.0, 10.0), Vec2::ZERO));
        assert!(drain(&log).is_empty());
        driver.update(&scene, &targets);
        assert_eq!(
            drain(&log),
            vec![(1, "enter", 1, None), (1, "move", 1, None)]
        );
    }

    #[test]
    fn consumed_clicks_mark_the_raw_event() {
        let (scene, mut driver) = fixture();
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::consuming(1, &log));

        let mut events = vec![
            RawInputEvent::MouseMotion(MouseMotionEvent::new(Point::new(10.0, 10.0), Vec2::ZERO)),
        ];
        let mut input = MouseInput {
            driver: &mut driver,
            scene: &scene,
            targets: &targets,
        };
        let mut chain: [&mut dyn RawInputListener; 1] = [&mut input];
        dispatch_frame(&mut chain, 0.016, &mut events);

        let mut press = MouseButtonEvent::new(0, true, Point::new(10.0, 10.0));
        assert!(driver.on_button(&targets, &mut press));
        assert!(press.consumed);
        assert_eq!(driver.session().capture(), Some(&1));

        // Outside every strip: nothing to press.
        let mut miss = MouseButtonEvent::new(0, false, Point::new(90.0, 10.0));
        driver.on_motion(&MouseMotionEvent::new(Point::new(90.0, 10.0), Vec2::ZERO));
        assert!(driver.on_button(&targets, &mut miss), "capture still gets the release");
        assert_eq!(driver.session().capture(), None);
    }

    #[test]
    fn disabling_exits_and_stops_picking() {
        let (scene, mut driver) = fixture();
        let log = new_log();
        let mut targets: PickTargets<u32> = PickTargets::new();
        targets.add_listener(1, Recorder::new(1, &log));
        driver.on_motion(&MouseMotionEvent::new(Point::new(10.0, 10.0), Vec2::ZERO));
        driver.update(&scene, &targets);
        drain(&log);

        driver.set_enabled(false, &targets);
        assert_eq!(drain(&log), vec![(1, "exit", 1, None)]);
        driver.update(&scene, &targets);
        let mut press = MouseButtonEvent::new(0, true, Point::new(10.0, 10.0));
        assert!(!driver.on_button(&targets, &mut press));
        assert!(drain(&log).is_empty());
        assert!(!driver.is_enabled());
    }
}
