// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunable constants and the joystick layout used by the mapper.

use alloc::string::{String, ToString};

use hashbrown::HashMap;

use crate::primitive::{Axis, Button};

/// Tuning constants for value normalization and classification.
///
/// The defaults match long-standing behavior and are rarely worth changing.
#[derive(Clone, Debug, PartialEq)]
pub struct InputConfig {
    /// Axis readings with a magnitude below this are snapped to zero.
    pub dead_zone: f64,
    /// Scaled values beyond `±state_threshold` classify as positive or negative.
    pub state_threshold: f64,
    /// Mouse deltas are divided by the frame time and then by this factor.
    pub mouse_scale: f64,
    /// Wheel deltas are divided by this factor (one detent per unit).
    pub wheel_scale: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dead_zone: 0.01,
            state_threshold: 0.01,
            mouse_scale: 1024.0,
            wheel_scale: 120.0,
        }
    }
}

/// Maps the host's logical joystick axis and button ids to [`Axis`] and [`Button`] values.
#[derive(Clone, Debug)]
pub struct JoystickLayout {
    axes: HashMap<String, Axis>,
    buttons: HashMap<String, Button>,
}

impl JoystickLayout {
    /// A layout with no entries.
    pub fn empty() -> Self {
        Self {
            axes: HashMap::new(),
            buttons: HashMap::new(),
        }
    }

    /// Bind a logical axis id.
    pub fn set_axis(&mut self, raw_id: &str, axis: Axis) {
        self.axes.insert(raw_id.to_string(), axis);
    }

    /// Bind a logical button id.
    pub fn set_button(&mut self, raw_id: &str, button: Button) {
        self.buttons.insert(raw_id.to_string(), button);
    }

    /// The axis for a logical id, if known.
    pub fn axis(&self, raw_id: &str) -> Option<&Axis> {
        self.axes.get(raw_id)
    }

    /// The button for a logical id, if known.
    pub fn button(&self, raw_id: &str) -> Option<&Button> {
        self.buttons.get(raw_id)
    }
}

impl Default for JoystickLayout {
    fn default() -> Self {
        let mut layout = Self::empty();
        for (id, axis) in [
            ("x", Axis::JOYSTICK_LEFT_X),
            ("y", Axis::JOYSTICK_LEFT_Y),
            ("rx", Axis::JOYSTICK_RIGHT_X),
            ("ry", Axis::JOYSTICK_RIGHT_Y),
            ("z", Axis::JOYSTICK_RIGHT_X),
            ("rz", Axis::JOYSTICK_RIGHT_Y),
            ("pov_x", Axis::JOYSTICK_HAT_X),
            ("pov_y", Axis::JOYSTICK_HAT_Y),
        ] {
            layout.set_axis(id, axis);
        }
        for (id, button) in [
            ("0", Button::JOYSTICK_BUTTON1),
            ("1", Button::JOYSTICK_BUTTON2),
            ("2", Button::JOYSTICK_BUTTON3),
            ("3", Button::JOYSTICK_BUTTON4),
            ("4", Button::JOYSTICK_LEFT1),
            ("5", Button::JOYSTICK_RIGHT1),
            ("6", Button::JOYSTICK_LEFT2),
            ("7", Button::JOYSTICK_RIGHT2),
            ("8", Button::JOYSTICK_SELECT),
            ("9", Button::JOYSTICK_START),
            ("10", Button::JOYSTICK_LEFT_STICK),
            ("11", Button::JOYSTICK_RIGHT_STICK),
        ] {
            layout.set_button(id, button);
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_covers_both_sticks() {
        let layout = JoystickLayout::default();
        assert_eq!(layout.axis("x"), Some(&Axis::JOYSTICK_LEFT_X));
        assert_eq!(layout.axis("rz"), Some(&Axis::JOYSTICK_RIGHT_Y));
        assert_eq!(layout.button("9"), Some(&Button::JOYSTICK_START));
        assert!(layout.axis("throttle").is_none());
    }

    #[test]
    fn default_constants() {
        let c = InputConfig::default();
        assert_eq!(c.dead_zone, 0.01);
        assert_eq!(c.mouse_scale, 1024.0);
        assert_eq!(c.wheel_scale, 120.0);
    }
}
