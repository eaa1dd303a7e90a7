// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device primitives that can be bound to functions: analog axes, digital buttons, and keys.

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::hash::{Hash, Hasher};

/// Text of a primitive's id or name. Cloning never copies the text.
#[derive(Clone)]
enum Label {
    Static(&'static str),
    Shared(Rc<str>),
}

impl Label {
    fn as_str(&self) -> &str {
        match self {
            Self::Static(s) => s,
            Self::Shared(s) => s,
        }
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Self::Shared(Rc::from(s))
    }
}

/// A named analog input channel.
///
/// Equality and hashing consider only the id.
#[derive(Clone)]
pub struct Axis {
    id: Label,
    name: Label,
}

impl Axis {
    /// Horizontal mouse motion.
    pub const MOUSE_X: Self = Self::from_static("mouse_x", "Mouse X");
    /// Vertical mouse motion.
    pub const MOUSE_Y: Self = Self::from_static("mouse_y", "Mouse Y");
    /// Mouse wheel.
    pub const MOUSE_WHEEL: Self = Self::from_static("mouse_wheel", "Mouse Wheel");
    /// Left stick, horizontal.
    pub const JOYSTICK_LEFT_X: Self = Self::from_static("joystick_left_x", "Joystick Left X");
    /// Left stick, vertical.
    pub const JOYSTICK_LEFT_Y: Self = Self::from_static("joystick_left_y", "Joystick Left Y");
    /// Right stick, horizontal.
    pub const JOYSTICK_RIGHT_X: Self = Self::from_static("joystick_right_x", "Joystick Right X");
    /// Right stick, vertical.
    pub const JOYSTICK_RIGHT_Y: Self = Self::from_static("joystick_right_y", "Joystick Right Y");
    /// Directional hat, horizontal.
    pub const JOYSTICK_HAT_X: Self = Self::from_static("joystick_hat_x", "Joystick Hat X");
    /// Directional hat, vertical.
    pub const JOYSTICK_HAT_Y: Self = Self::from_static("joystick_hat_y", "Joystick Hat Y");

    /// Create an axis from static strings.
    pub const fn from_static(id: &'static str, name: &'static str) -> Self {
        Self {
            id: Label::Static(id),
            name: Label::Static(name),
        }
    }

    /// Create an ad hoc axis.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let (id, name): (String, String) = (id.into(), name.into());
        Self {
            id: Label::from(id),
            name: Label::from(name),
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// A named digital input.
///
/// Equality and hashing consider only the id.
#[derive(Clone)]
pub struct Button {
    id: Label,
    name: Label,
}

impl Button {
    /// Primary (usually left) mouse button.
    pub const MOUSE_BUTTON1: Self = Self::from_static("mouse_1", "Mouse Button 1");
    /// Secondary (usually right) mouse button.
    pub const MOUSE_BUTTON2: Self = Self::from_static("mouse_2", "Mouse Button 2");
    /// Middle mouse button.
    pub const MOUSE_BUTTON3: Self = Self::from_static("mouse_3", "Mouse Button 3");
    /// First face button.
    pub const JOYSTICK_BUTTON1: Self = Self::from_static("joystick_1", "Joystick Button 1");
    /// Second face button.
    pub const JOYSTICK_BUTTON2: Self = Self::from_static("joystick_2", "Joystick Button 2");
    /// Third face button.
    pub const JOYSTICK_BUTTON3: Self = Self::from_static("joystick_3", "Joystick Button 3");
    /// Fourth face button.
    pub const JOYSTICK_BUTTON4: Self = Self::from_static("joystick_4", "Joystick Button 4");
    /// Upper left shoulder.
    pub const JOYSTICK_LEFT1: Self = Self::from_static("joystick_left1", "Joystick Left 1");
    /// Lower left shoulder.
    pub const JOYSTICK_LEFT2: Self = Self::from_static("joystick_left2", "Joystick Left 2");
    /// Upper right shoulder.
    pub const JOYSTICK_RIGHT1: Self = Self::from_static("joystick_right1", "Joystick Right 1");
    /// Lower right shoulder.
    pub const JOYSTICK_RIGHT2: Self = Self::from_static("joystick_right2", "Joystick Right 2");
    /// Select / back.
    pub const JOYSTICK_SELECT: Self = Self::from_static("joystick_select", "Joystick Select");
    /// Start.
    pub const JOYSTICK_START: Self = Self::from_static("joystick_start", "Joystick Start");
    /// Left stick click.
    pub const JOYSTICK_LEFT_STICK: Self =
        Self::from_static("joystick_left_stick", "Joystick Left Stick");
    /// Right stick click.
    pub const JOYSTICK_RIGHT_STICK: Self =
        Self::from_static("joystick_right_stick", "Joystick Right Stick");

    /// Create a button from static strings.
    pub const fn from_static(id: &'static str, name: &'static str) -> Self {
        Self {
            id: Label::Static(id),
            name: Label::Static(name),
        }
    }

    /// Create an ad hoc button.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let (id, name): (String, String) = (id.into(), name.into());
        Self {
            id: Label::from(id),
            name: Label::from(name),
        }
    }

    /// Ad hoc button for a joystick button the layout does not know.
    pub fn unmapped_joystick(raw_id: &str) -> Self {
        Self::new(
            format!("joystick_{raw_id}"),
            format!("Joystick Button {raw_id}"),
        )
    }

    /// Ad hoc button for a mouse button beyond the standard three. `index` is zero based.
    pub fn unmapped_mouse(index: u32) -> Self {
        let n = index + 1;
        Self::new(format!("mouse_{n}"), format!("Mouse Button {n}"))
    }

    /// The mouse button for a raw button index, if it is one of the three standard buttons.
    pub fn for_mouse_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::MOUSE_BUTTON1),
            1 => Some(Self::MOUSE_BUTTON2),
            2 => Some(Self::MOUSE_BUTTON3),
            _ => None,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

macro_rules! impl_id_identity {
    ($ty:ident) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id.as_str() == other.id.as_str()
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.as_str().hash(state);
            }
        }

        impl core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!(stringify!($ty), "({})"), self.id.as_str())
            }
        }
    };
}

impl_id_identity!(Axis);
impl_id_identity!(Button);

/// A platform key code as reported by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u32);

#[expect(missing_docs, reason = "Key names are self-describing.")]
impl KeyCode {
    pub const ESCAPE: Self = Self(0x01);
    pub const DIGIT1: Self = Self(0x02);
    pub const DIGIT2: Self = Self(0x03);
    pub const DIGIT3: Self = Self(0x04);
    pub const DIGIT4: Self = Self(0x05);
    pub const DIGIT5: Self = Self(0x06);
    pub const DIGIT6: Self = Self(0x07);
    pub const DIGIT7: Self = Self(0x08);
    pub const DIGIT8: Self = Self(0x09);
    pub const DIGIT9: Self = Self(0x0A);
    pub const DIGIT0: Self = Self(0x0B);
    pub const TAB: Self = Self(0x0F);
    pub const Q: Self = Self(0x10);
    pub const W: Self = Self(0x11);
    pub const E: Self = Self(0x12);
    pub const R: Self = Self(0x13);
    pub const RETURN: Self = Self(0x1C);
    pub const LCONTROL: Self = Self(0x1D);
    pub const A: Self = Self(0x1E);
    pub const S: Self = Self(0x1F);
    pub const D: Self = Self(0x20);
    pub const F: Self = Self(0x21);
    pub const GRAVE: Self = Self(0x29);
    pub const LSHIFT: Self = Self(0x2A);
    pub const Z: Self = Self(0x2C);
    pub const X: Self = Self(0x2D);
    pub const C: Self = Self(0x2E);
    pub const RSHIFT: Self = Self(0x36);
    pub const LMENU: Self = Self(0x38);
    pub const SPACE: Self = Self(0x39);
    pub const F1: Self = Self(0x3B);
    pub const RCONTROL: Self = Self(0x9D);
    pub const RMENU: Self = Self(0xB8);
    pub const UP: Self = Self(0xC8);
    pub const LEFT: Self = Self(0xCB);
    pub const RIGHT: Self = Self(0xCD);
    pub const DOWN: Self = Self(0xD0);
}

/// Any primitive that can drive a function: a key, a button, or an axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InputPrimitive {
    /// Keyboard key.
    Key(KeyCode),
    /// Digital button (mouse or joystick).
    Button(Button),
    /// Analog axis (mouse or joystick).
    Axis(Axis),
}

impl InputPrimitive {
    /// Mouse axes report motion only while it happens; they read 0 in frames without events.
    pub fn is_impulse(&self) -> bool {
        match self {
            Self::Axis(a) => *a == Axis::MOUSE_X || *a == Axis::MOUSE_Y || *a == Axis::MOUSE_WHEEL,
            _ => false,
        }
    }
}

impl From<KeyCode> for InputPrimitive {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

impl From<Button> for InputPrimitive {
    fn from(button: Button) -> Self {
        Self::Button(button)
    }
}

impl From<Axis> for InputPrimitive {
    fn from(axis: Axis) -> Self {
        Self::Axis(axis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_display_name() {
        let a = Axis::new("mouse_x", "Some other label");
        assert_eq!(a, Axis::MOUSE_X);
        assert_eq!(a.name(), "Some other label");
        assert_ne!(Button::MOUSE_BUTTON1, Button::MOUSE_BUTTON2);
    }

    #[test]
    fn unmapped_joystick_buttons_are_stable() {
        let a = Button::unmapped_joystick("14");
        let b = Button::unmapped_joystick("14");
        assert_eq!(a, b);
        assert_eq!(a.id(), "joystick_14");
    }

    #[test]
    fn impulse_axes() {
        assert!(InputPrimitive::from(Axis::MOUSE_WHEEL).is_impulse());
        assert!(!InputPrimitive::from(Axis::JOYSTICK_LEFT_X).is_impulse());
        assert!(!InputPrimitive::from(KeyCode::W).is_impulse());
    }

    #[test]
    fn mouse_button_indices() {
        assert_eq!(Button::for_mouse_index(0), Some(Button::MOUSE_BUTTON1));
        assert_eq!(Button::for_mouse_index(2), Some(Button::MOUSE_BUTTON3));
        assert_eq!(Button::for_mouse_index(7), None);
        assert_eq!(Button::unmapped_mouse(7).id(), "mouse_8");
    }

    #[test]
    fn ad_hoc_clones_share_their_text() {
        let a = Button::unmapped_mouse(4);
        let b = a.clone();
        assert!(matches!(
            (&a.id, &b.id),
            (Label::Shared(x), Label::Shared(y)) if Rc::ptr_eq(x, y)
        ));
        assert_eq!(b.name(), "Mouse Button 5");
    }
}
