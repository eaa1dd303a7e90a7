// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw device events as delivered by the host, and the listener contract that consumes them.
//!
//! ## Framing
//!
//! The host delivers input in frames:
//!
//! 1) [`RawInputListener::begin_input`] with the elapsed time of the frame,
//! 2) every device event of the frame, in arrival order,
//! 3) [`RawInputListener::end_input`].
//!
//! Each event carries a `consumed` flag. Listeners run in order, and a listener earlier in
//! the chain (for example a GUI pick driver) can mark an event consumed so later listeners
//! (for example the [`InputMapper`](crate::mapper::InputMapper)) can ignore it.
//! [`dispatch_frame`] runs one frame through a listener chain.

use alloc::string::String;
use kurbo::{Point, Vec2};

use crate::primitive::KeyCode;

/// A key press or release.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyInputEvent {
    /// Platform key code.
    pub key: KeyCode,
    /// Typed character, if any.
    pub character: Option<char>,
    /// Press (`true`) or release (`false`).
    pub pressed: bool,
    /// Whether this is an auto-repeat of a held key.
    pub repeating: bool,
    /// Set by a listener that handled the event.
    pub consumed: bool,
}

impl KeyInputEvent {
    /// A non-repeating press or release.
    pub fn new(key: KeyCode, pressed: bool) -> Self {
        Self {
            key,
            character: None,
            pressed,
            repeating: false,
            consumed: false,
        }
    }
}

/// A mouse button press or release at a cursor location.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseButtonEvent {
    /// Button index: 0 primary, 1 secondary, 2 middle.
    pub button: u32,
    /// Press (`true`) or release (`false`).
    pub pressed: bool,
    /// Cursor location in screen coordinates, origin at the bottom-left.
    pub location: Point,
    /// Set by a listener that handled the event.
    pub consumed: bool,
}

impl MouseButtonEvent {
    /// A press or release of `button` at `location`.
    pub fn new(button: u32, pressed: bool, location: Point) -> Self {
        Self {
            button,
            pressed,
            location,
            consumed: false,
        }
    }
}

/// Cursor motion and wheel rotation.
#[derive(Clone, Debug, PartialEq)]
pub struct MouseMotionEvent {
    /// Absolute cursor location after the motion.
    pub location: Point,
    /// Relative motion since the previous event.
    pub delta: Vec2,
    /// Absolute wheel position.
    pub wheel: f64,
    /// Wheel change since the previous event, in host units (usually 120 per detent).
    pub wheel_delta: f64,
    /// Set by a listener that handled the event.
    pub consumed: bool,
}

impl MouseMotionEvent {
    /// Motion to `location` by `delta`, without wheel change.
    pub fn new(location: Point, delta: Vec2) -> Self {
        Self {
            location,
            delta,
            wheel: 0.0,
            wheel_delta: 0.0,
            consumed: false,
        }
    }

    /// Wheel rotation by `wheel_delta` at `location`.
    pub fn wheel(location: Point, wheel_delta: f64) -> Self {
        Self {
            location,
            delta: Vec2::ZERO,
            wheel: 0.0,
            wheel_delta,
            consumed: false,
        }
    }
}

/// A joystick axis reading.
#[derive(Clone, Debug, PartialEq)]
pub struct JoyAxisEvent {
    /// Index of the joystick.
    pub joystick: u32,
    /// Logical id of the axis as reported by the host (for example `"x"` or `"pov_y"`).
    pub axis: String,
    /// Axis value, nominally in `[-1, 1]`.
    pub value: f64,
    /// Set by a listener that handled the event.
    pub consumed: bool,
}

/// A joystick button press or release.
#[derive(Clone, Debug, PartialEq)]
pub struct JoyButtonEvent {
    /// Index of the joystick.
    pub joystick: u32,
    /// Logical id of the button as reported by the host (for example `"0"`).
    pub button: String,
    /// Press (`true`) or release (`false`).
    pub pressed: bool,
    /// Set by a listener that handled the event.
    pub consumed: bool,
}

/// Phase of a touch pointer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TouchKind {
    /// A pointer touched down.
    Down,
    /// A pointer moved while down.
    Move,
    /// A pointer lifted.
    Up,
    /// Gestures and other host-specific notifications.
    Other,
}

/// A touch pointer event.
#[derive(Clone, Debug, PartialEq)]
pub struct TouchEvent {
    /// Device-level pointer id (for example the finger index).
    pub pointer_id: u32,
    /// Phase of the pointer.
    pub kind: TouchKind,
    /// Location in screen coordinates, origin at the bottom-left.
    pub location: Point,
    /// Set by a listener that handled the event.
    pub consumed: bool,
}

impl TouchEvent {
    /// An unconsumed touch event.
    pub fn new(pointer_id: u32, kind: TouchKind, location: Point) -> Self {
        Self {
            pointer_id,
            kind,
            location,
            consumed: false,
        }
    }
}

/// Any raw device event.
#[derive(Clone, Debug, PartialEq)]
pub enum RawInputEvent {
    /// See [`KeyInputEvent`].
    Key(KeyInputEvent),
    /// See [`MouseButtonEvent`].
    MouseButton(MouseButtonEvent),
    /// See [`MouseMotionEvent`].
    MouseMotion(MouseMotionEvent),
    /// See [`JoyAxisEvent`].
    JoyAxis(JoyAxisEvent),
    /// See [`JoyButtonEvent`].
    JoyButton(JoyButtonEvent),
    /// See [`TouchEvent`].
    Touch(TouchEvent),
}

impl RawInputEvent {
    /// Whether a listener marked the event consumed.
    pub fn is_consumed(&self) -> bool {
        match self {
            Self::Key(e) => e.consumed,
            Self::MouseButton(e) => e.consumed,
            Self::MouseMotion(e) => e.consumed,
            Self::JoyAxis(e) => e.consumed,
            Self::JoyButton(e) => e.consumed,
            Self::Touch(e) => e.consumed,
        }
    }
}

/// Consumer of raw device input.
///
/// All handlers default to doing nothing.
pub trait RawInputListener {
    /// A new input frame starts; `tpf` is the elapsed time since the previous one.
    fn begin_input(&mut self, _tpf: f64) {}
    /// The current input frame is complete.
    fn end_input(&mut self) {}
    /// A key event arrived.
    fn on_key_event(&mut self, _event: &mut KeyInputEvent) {}
    /// A mouse button event arrived.
    fn on_mouse_button_event(&mut self, _event: &mut MouseButtonEvent) {}
    /// A mouse motion event arrived.
    fn on_mouse_motion_event(&mut self, _event: &mut MouseMotionEvent) {}
    /// A joystick axis event arrived.
    fn on_joy_axis_event(&mut self, _event: &mut JoyAxisEvent) {}
    /// A joystick button event arrived.
    fn on_joy_button_event(&mut self, _event: &mut JoyButtonEvent) {}
    /// A touch event arrived.
    fn on_touch_event(&mut self, _event: &mut TouchEvent) {}

    /// Route `event` to the matching handler.
    fn on_event(&mut self, event: &mut RawInputEvent) {
        match event {
            RawInputEvent::Key(e) => self.on_key_event(e),
            RawInputEvent::MouseButton(e) => self.on_mouse_button_event(e),
            RawInputEvent::MouseMotion(e) => self.on_mouse_motion_event(e),
            RawInputEvent::JoyAxis(e) => self.on_joy_axis_event(e),
            RawInputEvent::JoyButton(e) => self.on_joy_button_event(e),
            RawInputEvent::Touch(e) => self.on_touch_event(e),
        }
    }
}

/// Run one input frame through `listeners`.
///
/// Every listener sees `begin_input`, then each event in order (listeners in slice order,
/// with the consumed flag carried along), then `end_input`.
pub fn dispatch_frame(
    listeners: &mut [&mut dyn RawInputListener],
    tpf: f64,
    events: &mut [RawInputEvent],
) {
    for l in listeners.iter_mut() {
        l.begin_input(tpf);
    }
    for event in events.iter_mut() {
        for l in listeners.iter_mut() {
            l.on_event(event);
        }
    }
    for l in listeners.iter_mut() {
        l.end_input();
    }
}
