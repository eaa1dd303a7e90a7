// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch driver: one pick session per active pointer.
//!
//! ## Lifecycle
//!
//! - `Down` clones the template session (sharing its roots), picks at the touch location,
//!   and presses button 0. A second `Down` for a live id replaces its session.
//! - `Move` records the location and picks there.
//! - `Up` releases button 0, exits the hit target, and drops the session.
//! - Other phases and events for unknown ids are ignored.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Point;
use lemur_input::RawInputListener;
use lemur_input::raw::{TouchEvent, TouchKind};
use log::trace;

use crate::session::PickEventSession;
use crate::targets::PickTargets;
use crate::types::CollisionScene;

/// Button index reported for touch presses.
pub const TOUCH_BUTTON: u32 = 0;

#[derive(Debug)]
struct Pointer<K> {
    session: PickEventSession<K>,
    location: Point,
}

/// Drives one [`PickEventSession`] per touch pointer.
#[derive(Debug)]
pub struct TouchDriver<K> {
    template: PickEventSession<K>,
    pointers: BTreeMap<u32, Pointer<K>>,
    enabled: bool,
}

impl<K: Clone + Eq + Hash + Debug> TouchDriver<K> {
    /// Create an enabled driver. Pointer sessions are clones of `template`.
    pub fn new(template: PickEventSession<K>) -> Self {
        Self {
            template,
            pointers: BTreeMap::new(),
            enabled: true,
        }
    }

    /// The template session. Roots registered here are seen by every pointer.
    pub fn template(&self) -> &PickEventSession<K> {
        &self.template
    }

    /// The template session, for root registration.
    pub fn template_mut(&mut self) -> &mut PickEventSession<K> {
        &mut self.template
    }

    /// Ids of the live pointers, ascending.
    pub fn pointer_ids(&self) -> Vec<u32> {
        self.pointers.keys().copied().collect()
    }

    /// Session of a live pointer.
    pub fn session(&self, pointer_id: u32) -> Option<&PickEventSession<K>> {
        self.pointers.get(&pointer_id).map(|p| &p.session)
    }

    /// Enable or disable touch picking. Disabling ends every live pointer without a release.
    pub fn set_enabled(&mut self, enabled: bool, targets: &PickTargets<K>) {
        self.enabled = enabled;
        if !enabled {
            for (_, mut pointer) in core::mem::take(&mut self.pointers) {
                pointer.session.clear_hit_target(targets);
            }
        }
    }

    /// Whether touch picking is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handle a touch event; marks `event` consumed when a target consumed it.
    pub fn on_touch<S>(&mut self, scene: &S, targets: &PickTargets<K>, event: &mut TouchEvent) -> bool
    where
        S: CollisionScene<K> + ?Sized,
    {
        if !self.enabled {
            return false;
        }
        let id = event.pointer_id;
        let location = event.location;
        let consumed = match event.kind {
            TouchKind::Down => {
                if let Some(mut old) = self.pointers.remove(&id) {
                    old.session.clear_hit_target(targets);
                }
                trace!("touch {id} down");
                let mut session = self.template.clone();
                let moved = session.cursor_moved(scene, targets, location);
                let pressed = session.button_event(targets, TOUCH_BUTTON, location, true);
                self.pointers.insert(id, Pointer { session, location });
                moved || pressed
            }
            TouchKind::Move => {
                let Some(pointer) = self.pointers.get_mut(&id) else {
                    return false;
                };
                pointer.location = location;
                pointer.session.cursor_moved(scene, targets, location)
            }
            TouchKind::Up => {
                let Some(mut pointer) = self.pointers.remove(&id) else {
                    return false;
                };
                trace!("touch {id} up");
                let released = pointer
                    .session
                    .button_event(targets, TOUCH_BUTTON, location, false);
                pointer.session.clear_hit_target(targets);
                released
            }
            TouchKind::Other => false,
        };
        if consumed {
            event.consumed = true;
        }
        consumed
    }

    /// Pick every live pointer at its last location, in pointer id order. Call once per frame.
    pub fn update<S>(&mut self, scene: &S, targets: &PickTargets<K>)
    where
        S: CollisionScene<K> + ?Sized,
    {
        if !self.enabled {
            return;
        }
        for pointer in self.pointers.values_mut() {
            pointer.session.cursor_moved(scene, targets, pointer.location);
        }
    }
}

/// A [`RawInputListener`] view of a [`TouchDriver`] for one frame.
pub struct TouchInput<'a, K, S: ?Sized> {
    /// The driver receiving events.
    pub driver: &'a mut TouchDriver<K>,
    /// Scene picked against.
    pub scene: &'a S,
    /// Listeners of pickable nodes.
    pub targets: &'a PickTargets<K>,
}

impl<K: Debug, S: ?Sized> Debug for TouchInput<'_, K, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TouchInput")
            .field("driver", &self.driver)
            .finish_non_exhaustive()
    }
}

impl<K, S> RawInputListener for TouchInput<'_, K, S>
where
    K: Clone + Eq + Hash + Debug,
    S: CollisionScene<K> + ?Sized,
{
    fn end_input(&mut self) {
        self.driver.update(self.scene, self.targets);
    }

    fn on_touch_event(&mut self, event: &mut TouchEvent) {
        self.driver.on_touch(self.scene, self.targets, event);
    }
}
