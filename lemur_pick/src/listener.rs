// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor events and the listeners that receive them.
//!
//! Every callback receives the event, the `target` it is delivered for, and the session's
//! current `capture`. The two differ while a drag has left the pressed element: the pressed
//! element keeps receiving motion with `capture` set to itself, and it also hears about the
//! elements it passes over through `cursor_entered`/`cursor_exited` with `target` set to them.

use core::cell::RefCell;

use kurbo::Point;

use crate::types::{CollisionResult, Viewport};

/// A pointer button press or release, resolved against the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorButtonEvent<K> {
    /// Button index: 0 primary, 1 secondary, 2 middle. Touch pointers use 0.
    pub button: u32,
    /// Press (`true`) or release (`false`).
    pub pressed: bool,
    /// Screen location, origin at the bottom-left.
    pub location: Point,
    /// Viewport of the root where the current hit was found.
    pub viewport: Option<Viewport>,
    /// Collision of the current hit, if any.
    pub collision: Option<CollisionResult<K>>,
    consumed: bool,
}

impl<K> CursorButtonEvent<K> {
    /// An unconsumed event without pick information.
    pub fn new(button: u32, pressed: bool, location: Point) -> Self {
        Self {
            button,
            pressed,
            location,
            viewport: None,
            collision: None,
            consumed: false,
        }
    }

    /// Stop further delivery of this event.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Whether a listener consumed the event.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

/// Pointer motion, resolved against the scene. Also used for enter and exit notifications.
#[derive(Clone, Debug, PartialEq)]
pub struct CursorMotionEvent<K> {
    /// Screen location, origin at the bottom-left.
    pub location: Point,
    /// Viewport of the root the collision came from.
    pub viewport: Option<Viewport>,
    /// Collision that resolved to the target, if any.
    pub collision: Option<CollisionResult<K>>,
    consumed: bool,
}

impl<K> CursorMotionEvent<K> {
    /// An unconsumed event without pick information.
    pub fn new(location: Point) -> Self {
        Self {
            location,
            viewport: None,
            collision: None,
            consumed: false,
        }
    }

    /// An unconsumed event for a collision found through `viewport`.
    pub fn with_collision(
        location: Point,
        viewport: Viewport,
        collision: CollisionResult<K>,
    ) -> Self {
        Self {
            location,
            viewport: Some(viewport),
            collision: Some(collision),
            consumed: false,
        }
    }

    /// Stop further delivery of this event.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    /// Whether a listener consumed the event.
    pub fn is_consumed(&self) -> bool {
        self.consumed
    }

    /// A fresh unconsumed copy carrying the same pick information.
    pub(crate) fn fresh(&self) -> Self
    where
        K: Clone,
    {
        Self {
            consumed: false,
            ..self.clone()
        }
    }
}

/// Receives cursor events for a pickable node. All methods default to doing nothing.
pub trait CursorListener<K> {
    /// A button was pressed or released.
    fn cursor_button_event(
        &self,
        _event: &mut CursorButtonEvent<K>,
        _target: &K,
        _capture: Option<&K>,
    ) {
    }

    /// The cursor started hovering `target`.
    fn cursor_entered(&self, _event: &mut CursorMotionEvent<K>, _target: &K, _capture: Option<&K>) {
    }

    /// The cursor stopped hovering `target`.
    fn cursor_exited(&self, _event: &mut CursorMotionEvent<K>, _target: &K, _capture: Option<&K>) {}

    /// The cursor moved over `target`, or anywhere while `target` holds the capture.
    fn cursor_moved(&self, _event: &mut CursorMotionEvent<K>, _target: &K, _capture: Option<&K>) {}
}

/// Movement allowed between press and release for a click, in screen pixels.
pub const CLICK_THRESHOLD: f64 = 3.0;

/// Reports clicks: a press and a release on the same target without the pointer travelling
/// farther than a threshold in between.
///
/// Presses and clicks are consumed, so a click on a GUI element does not reach the
/// input mapper as a raw button press.
pub struct ClickListener<K, F> {
    on_click: F,
    threshold: f64,
    pressed: RefCell<Option<(K, Point)>>,
}

impl<K, F> core::fmt::Debug for ClickListener<K, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClickListener")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl<K, F> ClickListener<K, F>
where
    F: Fn(&CursorButtonEvent<K>, &K),
{
    /// Call `on_click` for each click, with the default [`CLICK_THRESHOLD`].
    pub fn new(on_click: F) -> Self {
        Self::with_threshold(CLICK_THRESHOLD, on_click)
    }

    /// Call `on_click` for each click, allowing `threshold` pixels of travel per axis.
    pub fn with_threshold(threshold: f64, on_click: F) -> Self {
        Self {
            on_click,
            threshold,
            pressed: RefCell::new(None),
        }
    }
}

impl<K, F> CursorListener<K> for ClickListener<K, F>
where
    K: Clone + PartialEq,
    F: Fn(&CursorButtonEvent<K>, &K),
{
    fn cursor_button_event(
        &self,
        event: &mut CursorButtonEvent<K>,
        target: &K,
        _capture: Option<&K>,
    ) {
        if event.pressed {
            *self.pressed.borrow_mut() = Some((target.clone(), event.location));
            event.consume();
            return;
        }
        let Some((down_target, down)) = self.pressed.borrow_mut().take() else {
            return;
        };
        let dx = event.location.x - down.x;
        let dy = event.location.y - down.y;
        let within = |d: f64| d <= self.threshold && d >= -self.threshold;
        if down_target == *target && within(dx) && within(dy) {
            event.consume();
            (self.on_click)(event, target);
        }
    }
}
