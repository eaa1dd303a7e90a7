// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The input mapper: raw device input in, function notifications out.
//!
//! ## Overview
//!
//! [`InputMapper::map`] binds a [`FunctionId`] to a primary [`InputPrimitive`], an optional
//! modifier chord, and a bias. Each binding is a *state group*. Each primitive that was
//! mapped or has seen input owns a *state group index*, which holds the primitive's current
//! raw value and the groups that reference it, most modifiers first.
//!
//! ## Evaluation
//!
//! - Raw events update a primitive's value right away. Axis values inside the dead zone read 0.
//! - When a primitive turns on or off, the groups that use it as primary are re-evaluated.
//!   A group is *true* when its function's group is active, its primary is on, and all of its
//!   modifiers are on. Among the groups sharing a primary, only the true groups with the most
//!   modifiers are activated; the rest are deactivated. A change of a modifier re-evaluates
//!   the primaries that depend on it.
//! - At [`end_input`](RawInputListener::end_input), each active group computes
//!   `raw * bias * scale`. Analog listeners receive that value every frame. State listeners
//!   receive the classified [`InputState`] when it changes.
//! - A group that is deactivated while on sends one final `Off` (and one analog `0.0`) so
//!   listeners see a clean release even when the cause is a mode change.
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use lemur_input::function::{FunctionId, FunctionRegistry};
//! use lemur_input::listener::StateFunctionListener;
//! use lemur_input::mapper::InputMapper;
//! use lemur_input::primitive::KeyCode;
//! use lemur_input::raw::{KeyInputEvent, RawInputListener};
//! use lemur_input::state::InputState;
//!
//! let mut functions = FunctionRegistry::new();
//! let forward = functions.register("movement", "forward").unwrap();
//!
//! let mut mapper = InputMapper::new();
//! mapper.activate_group("movement");
//! mapper.map_positive(&forward, KeyCode::W);
//! mapper.map(&forward, InputState::Negative, KeyCode::S, [] as [KeyCode; 0]);
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = seen.clone();
//! let listener: Rc<dyn StateFunctionListener> =
//!     Rc::new(move |_: &FunctionId, state: InputState, _: f64| log.borrow_mut().push(state));
//! mapper.add_state_listener(listener, &[forward.clone()]).unwrap();
//!
//! mapper.begin_input(0.016);
//! mapper.on_key_event(&mut KeyInputEvent::new(KeyCode::W, true));
//! mapper.end_input();
//! assert_eq!(*seen.borrow(), [InputState::Positive]);
//! ```

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use log::{debug, trace, warn};

use crate::config::{InputConfig, JoystickLayout};
use crate::error::InputError;
use crate::function::{DEFAULT_GROUP, FunctionId};
use crate::listener::{
    AnalogFunctionListener, ListenerList, StateFunctionListener, StateMethodDelegate,
};
use crate::primitive::{Axis, Button, InputPrimitive};
use crate::raw::{
    JoyAxisEvent, JoyButtonEvent, KeyInputEvent, MouseButtonEvent, MouseMotionEvent,
    RawInputListener,
};
use crate::state::InputState;

/// Handle to a binding created by [`InputMapper::map`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Mapping(usize);

/// The static description of a binding.
#[derive(Clone, Debug)]
pub struct Binding {
    /// Function driven by this binding.
    pub function: FunctionId,
    /// Sign applied to the primary's raw value.
    pub bias: InputState,
    /// Primitive whose value drives the function.
    pub primary: InputPrimitive,
    /// Primitives that must also be on for the binding to be active.
    pub modifiers: Vec<InputPrimitive>,
    /// Multiplier applied together with the bias.
    pub scale: f64,
}

#[derive(Debug)]
struct StateGroup {
    binding: Binding,
    active: bool,
    last_value: f64,
    last_state: InputState,
}

#[derive(Debug, Default)]
struct StateGroupIndex {
    value: f64,
    /// Groups that reference this primitive, most modifiers first.
    groups: Vec<usize>,
}

#[derive(Debug, Default)]
struct FunctionListeners {
    state: ListenerList<dyn StateFunctionListener>,
    analog: ListenerList<dyn AnalogFunctionListener>,
}

/// Maps raw device input to logical functions and notifies function listeners.
///
/// ## Usage
///
/// - Bind with [`InputMapper::map`] (append-only).
/// - Subscribe with [`InputMapper::add_state_listener`], [`InputMapper::add_analog_listener`],
///   or the closure helpers [`InputMapper::add_delegate`] and
///   [`InputMapper::add_state_delegate`].
/// - Feed raw input through the [`RawInputListener`] implementation, one frame at a time.
/// - Enable or disable families of functions with [`InputMapper::activate_group`] and
///   [`InputMapper::deactivate_group`].
pub struct InputMapper {
    config: InputConfig,
    joystick_layout: JoystickLayout,
    groups: Vec<StateGroup>,
    indexes: HashMap<InputPrimitive, StateGroupIndex>,
    /// Active state groups in activation order.
    active: Vec<usize>,
    active_groups: HashSet<String>,
    listeners: HashMap<FunctionId, FunctionListeners>,
    /// Accumulated mouse deltas of the current frame, per impulse axis.
    impulses: HashMap<InputPrimitive, f64>,
    /// Ad hoc buttons for raw mouse indices beyond the standard three.
    extra_mouse_buttons: HashMap<u32, Button>,
    tpf: f64,
}

impl core::fmt::Debug for InputMapper {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InputMapper")
            .field("mappings", &self.groups.len())
            .field("indexes", &self.indexes.len())
            .field("active", &self.active.len())
            .field("active_groups", &self.active_groups)
            .finish_non_exhaustive()
    }
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl InputMapper {
    /// Create a mapper with default constants and joystick layout.
    pub fn new() -> Self {
        Self::with_config(InputConfig::default())
    }

    /// Create a mapper with custom constants.
    pub fn with_config(config: InputConfig) -> Self {
        let mut active_groups = HashSet::new();
        active_groups.insert(DEFAULT_GROUP.to_string());
        Self {
            config,
            joystick_layout: JoystickLayout::default(),
            groups: Vec::new(),
            indexes: HashMap::new(),
            active: Vec::new(),
            active_groups,
            listeners: HashMap::new(),
            impulses: HashMap::new(),
            extra_mouse_buttons: HashMap::new(),
            tpf: 0.0,
        }
    }

    /// The constants in use.
    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Replace the joystick layout used to translate raw joystick ids.
    pub fn set_joystick_layout(&mut self, layout: JoystickLayout) {
        self.joystick_layout = layout;
    }

    /// The joystick layout in use.
    pub fn joystick_layout(&self) -> &JoystickLayout {
        &self.joystick_layout
    }

    /// Bind `function` to `primary` with the given bias and modifier chord.
    ///
    /// Overlapping bindings are allowed; at runtime the binding with the most modifiers that
    /// are all on wins over the others sharing its primary.
    pub fn map<P, M>(
        &mut self,
        function: &FunctionId,
        bias: InputState,
        primary: P,
        modifiers: M,
    ) -> Mapping
    where
        P: Into<InputPrimitive>,
        M: IntoIterator,
        M::Item: Into<InputPrimitive>,
    {
        debug_assert!(bias != InputState::Off, "a binding needs a direction");
        let primary = primary.into();
        let modifiers: Vec<InputPrimitive> = modifiers.into_iter().map(Into::into).collect();
        let id = self.groups.len();
        let specificity = modifiers.len();

        let mut touched = Vec::with_capacity(modifiers.len() + 1);
        touched.push(primary.clone());
        for m in &modifiers {
            if !touched.contains(m) {
                touched.push(m.clone());
            }
        }

        debug!(
            "mapping {function:?} ({bias:?}) to {primary:?} with {} modifier(s)",
            modifiers.len()
        );
        self.groups.push(StateGroup {
            binding: Binding {
                function: function.clone(),
                bias,
                primary: primary.clone(),
                modifiers,
                scale: 1.0,
            },
            active: false,
            last_value: 0.0,
            last_state: InputState::Off,
        });

        for p in touched {
            let index = self.indexes.entry(p).or_default();
            let groups = &self.groups;
            let pos = index
                .groups
                .iter()
                .position(|&g| groups[g].binding.modifiers.len() < specificity)
                .unwrap_or(index.groups.len());
            index.groups.insert(pos, id);
        }

        // The primitives may already be held.
        self.refresh_index(&primary);
        Mapping(id)
    }

    /// Bind `function` to `primary` with a positive bias and no modifiers.
    pub fn map_positive(
        &mut self,
        function: &FunctionId,
        primary: impl Into<InputPrimitive>,
    ) -> Mapping {
        self.map(function, InputState::Positive, primary, [] as [InputPrimitive; 0])
    }

    /// Set the multiplier of a binding. Takes effect on the next frame.
    pub fn set_scale(&mut self, mapping: Mapping, scale: f64) {
        if let Some(g) = self.groups.get_mut(mapping.0) {
            g.binding.scale = scale;
        }
    }

    /// Describe a binding.
    pub fn binding(&self, mapping: Mapping) -> Option<&Binding> {
        self.groups.get(mapping.0).map(|g| &g.binding)
    }

    /// Whether a binding is currently active.
    pub fn is_mapping_active(&self, mapping: Mapping) -> bool {
        self.groups.get(mapping.0).is_some_and(|g| g.active)
    }

    /// Bindings of `function`, in creation order.
    pub fn mappings_for<'a>(
        &'a self,
        function: &'a FunctionId,
    ) -> impl Iterator<Item = Mapping> + 'a {
        self.groups
            .iter()
            .enumerate()
            .filter(move |(_, g)| g.binding.function == *function)
            .map(|(i, _)| Mapping(i))
    }

    /// Whether `function` has at least one binding.
    pub fn has_mappings(&self, function: &FunctionId) -> bool {
        self.groups.iter().any(|g| g.binding.function == *function)
    }

    /// Functions with at least one binding, in order of first binding.
    pub fn function_ids(&self) -> Vec<FunctionId> {
        let mut out: Vec<FunctionId> = Vec::new();
        for g in &self.groups {
            if !out.contains(&g.binding.function) {
                out.push(g.binding.function.clone());
            }
        }
        out
    }

    /// Current raw value of a primitive (0 when unknown).
    pub fn value(&self, primitive: &InputPrimitive) -> f64 {
        self.indexes.get(primitive).map_or(0.0, |i| i.value)
    }

    /// Register a state listener for each of `functions`.
    pub fn add_state_listener(
        &mut self,
        listener: Rc<dyn StateFunctionListener>,
        functions: &[FunctionId],
    ) -> Result<(), InputError> {
        if functions.is_empty() {
            return Err(InputError::NoFunctions);
        }
        for f in functions {
            self.function_listeners(f).state.add(listener.clone());
        }
        Ok(())
    }

    /// Remove a state listener from each of `functions`.
    pub fn remove_state_listener(
        &mut self,
        listener: &Rc<dyn StateFunctionListener>,
        functions: &[FunctionId],
    ) -> Result<(), InputError> {
        if functions.is_empty() {
            return Err(InputError::NoFunctions);
        }
        for f in functions {
            if let Some(l) = self.listeners.get(f) {
                l.state.remove(listener);
            }
        }
        Ok(())
    }

    /// Register an analog listener for each of `functions`.
    pub fn add_analog_listener(
        &mut self,
        listener: Rc<dyn AnalogFunctionListener>,
        functions: &[FunctionId],
    ) -> Result<(), InputError> {
        if functions.is_empty() {
            return Err(InputError::NoFunctions);
        }
        for f in functions {
            self.function_listeners(f).analog.add(listener.clone());
        }
        Ok(())
    }

    /// Remove an analog listener from each of `functions`.
    pub fn remove_analog_listener(
        &mut self,
        listener: &Rc<dyn AnalogFunctionListener>,
        functions: &[FunctionId],
    ) -> Result<(), InputError> {
        if functions.is_empty() {
            return Err(InputError::NoFunctions);
        }
        for f in functions {
            if let Some(l) = self.listeners.get(f) {
                l.analog.remove(listener);
            }
        }
        Ok(())
    }

    /// Shared handle to the state listeners of `function`.
    ///
    /// Changes made through the handle during a dispatch apply from the next dispatch on.
    pub fn state_listeners(
        &mut self,
        function: &FunctionId,
    ) -> ListenerList<dyn StateFunctionListener> {
        self.function_listeners(function).state.clone()
    }

    /// Shared handle to the analog listeners of `function`.
    pub fn analog_listeners(
        &mut self,
        function: &FunctionId,
    ) -> ListenerList<dyn AnalogFunctionListener> {
        self.function_listeners(function).analog.clone()
    }

    /// Run `callback` whenever `function` is released. Returns the listener for removal.
    pub fn add_delegate(
        &mut self,
        function: &FunctionId,
        callback: impl Fn() + 'static,
    ) -> Rc<dyn StateFunctionListener> {
        let delegate: Rc<dyn StateFunctionListener> =
            Rc::new(StateMethodDelegate::on_release(callback));
        self.function_listeners(function).state.add(delegate.clone());
        delegate
    }

    /// Run `callback` with the new state on every transition of `function`.
    pub fn add_state_delegate(
        &mut self,
        function: &FunctionId,
        callback: impl Fn(InputState) + 'static,
    ) -> Rc<dyn StateFunctionListener> {
        let delegate: Rc<dyn StateFunctionListener> =
            Rc::new(StateMethodDelegate::with_state(callback));
        self.function_listeners(function).state.add(delegate.clone());
        delegate
    }

    /// Let functions of group `name` participate in evaluation.
    ///
    /// Bindings whose primitives are already held become active right away and notify on
    /// the next frame.
    pub fn activate_group(&mut self, name: &str) {
        if !self.active_groups.insert(name.to_string()) {
            return;
        }
        debug!("activating input group `{name}`");
        self.refresh_group(name);
    }

    /// Stop functions of group `name` from firing. Active bindings are released.
    pub fn deactivate_group(&mut self, name: &str) {
        if !self.active_groups.remove(name) {
            return;
        }
        debug!("deactivating input group `{name}`");
        self.refresh_group(name);
    }

    /// Whether group `name` is active.
    pub fn is_group_active(&self, name: &str) -> bool {
        self.active_groups.contains(name)
    }

    /// Names of the active groups, in no particular order.
    pub fn active_groups(&self) -> impl Iterator<Item = &str> {
        self.active_groups.iter().map(String::as_str)
    }

    /// Release every primitive, for example when the window loses focus.
    ///
    /// Active bindings send their final `Off` notifications.
    pub fn clear_input(&mut self) {
        let held: Vec<InputPrimitive> = self
            .indexes
            .iter()
            .filter(|(_, i)| i.value != 0.0)
            .map(|(p, _)| p.clone())
            .collect();
        self.impulses.clear();
        for p in held {
            self.set_value(p, 0.0);
        }
    }

    fn function_listeners(&mut self, function: &FunctionId) -> &mut FunctionListeners {
        self.listeners.entry(function.clone()).or_default()
    }

    fn is_on(&self, primitive: &InputPrimitive) -> bool {
        self.indexes.get(primitive).is_some_and(|i| i.value != 0.0)
    }

    fn is_true(&self, group: usize) -> bool {
        let b = &self.groups[group].binding;
        self.active_groups.contains(b.function.group())
            && self.is_on(&b.primary)
            && b.modifiers.iter().all(|m| self.is_on(m))
    }

    fn group_value(&self, group: usize) -> f64 {
        let b = &self.groups[group].binding;
        self.value(&b.primary) * b.bias.as_f64() * b.scale
    }

    /// Store a raw value, snapping the dead zone to zero, and re-evaluate on on/off changes.
    fn set_value(&mut self, primitive: InputPrimitive, value: f64) {
        let dz = self.config.dead_zone;
        let value = if value > -dz && value < dz { 0.0 } else { value };
        let index = self.indexes.entry(primitive.clone()).or_default();
        let was_on = index.value != 0.0;
        index.value = value;
        if was_on != (value != 0.0) {
            self.refresh_from(&primitive);
        }
    }

    /// Re-evaluate `primitive` as a primary and every primary that uses it as a modifier.
    fn refresh_from(&mut self, primitive: &InputPrimitive) {
        let Some(index) = self.indexes.get(primitive) else {
            return;
        };
        let mut primaries: Vec<InputPrimitive> = Vec::new();
        primaries.push(primitive.clone());
        for &g in &index.groups {
            let p = &self.groups[g].binding.primary;
            if !primaries.contains(p) {
                primaries.push(p.clone());
            }
        }
        for p in primaries {
            self.refresh_index(&p);
        }
    }

    fn refresh_group(&mut self, name: &str) {
        let mut primaries: Vec<InputPrimitive> = Vec::new();
        for g in &self.groups {
            if g.binding.function.group() == name && !primaries.contains(&g.binding.primary) {
                primaries.push(g.binding.primary.clone());
            }
        }
        for p in primaries {
            self.refresh_index(&p);
        }
    }

    /// Activate the most specific true groups with `primary` as primary; deactivate the rest.
    fn refresh_index(&mut self, primary: &InputPrimitive) {
        let Some(index) = self.indexes.get(primary) else {
            return;
        };
        let candidates: Vec<usize> = index
            .groups
            .iter()
            .copied()
            .filter(|&g| self.groups[g].binding.primary == *primary)
            .collect();

        let mut winning: Option<usize> = None;
        let mut activate = Vec::new();
        let mut deactivate = Vec::new();
        for g in candidates {
            let specificity = self.groups[g].binding.modifiers.len();
            let wins = self.is_true(g)
                && match winning {
                    None => {
                        winning = Some(specificity);
                        true
                    }
                    Some(w) => w == specificity,
                };
            if wins {
                activate.push(g);
            } else {
                deactivate.push(g);
            }
        }
        for g in deactivate {
            self.set_active(g, false);
        }
        for g in activate {
            self.set_active(g, true);
        }
    }

    fn set_active(&mut self, group: usize, active: bool) {
        let g = &mut self.groups[group];
        if g.active == active {
            return;
        }
        g.active = active;
        if active {
            trace!("activated {:?} via {:?}", g.binding.function, g.binding.primary);
            self.active.push(group);
            return;
        }

        trace!("deactivated {:?} via {:?}", g.binding.function, g.binding.primary);
        let (last_state, last_value) = (g.last_state, g.last_value);
        g.last_state = InputState::Off;
        g.last_value = 0.0;
        let function = g.binding.function.clone();
        self.active.retain(|&a| a != group);
        if last_state != InputState::Off {
            self.notify_state(&function, InputState::Off);
        }
        if last_value != 0.0 {
            self.notify_analog(&function, 0.0);
        }
    }

    fn update_group(&mut self, group: usize) {
        let value = self.group_value(group);
        let threshold = self.config.state_threshold;
        let g = &mut self.groups[group];
        let mut transition = None;
        if value != g.last_value {
            let state = InputState::classify(value, threshold);
            if state != g.last_state {
                transition = Some(state);
                g.last_state = state;
            }
            g.last_value = value;
        }
        let function = g.binding.function.clone();
        if let Some(state) = transition {
            self.notify_state(&function, state);
        }
        self.notify_analog(&function, value);
    }

    fn notify_state(&self, function: &FunctionId, state: InputState) {
        let Some(l) = self.listeners.get(function) else {
            return;
        };
        for listener in l.state.snapshot().iter() {
            listener.value_changed(function, state, self.tpf);
        }
    }

    fn notify_analog(&self, function: &FunctionId, value: f64) {
        let Some(l) = self.listeners.get(function) else {
            return;
        };
        for listener in l.analog.snapshot().iter() {
            listener.value_active(function, value, self.tpf);
        }
    }

    fn add_impulse(&mut self, axis: Axis, delta: f64, divisor: f64) {
        let primitive = InputPrimitive::Axis(axis);
        let total = self.impulses.entry(primitive.clone()).or_insert(0.0);
        *total += delta;
        let value = *total / divisor;
        self.set_value(primitive, value);
    }

    /// Zero mouse axes that saw no motion this frame.
    fn reset_idle_impulses(&mut self) {
        let idle: Vec<InputPrimitive> = self
            .indexes
            .iter()
            .filter(|(p, i)| i.value != 0.0 && p.is_impulse() && !self.impulses.contains_key(*p))
            .map(|(p, _)| p.clone())
            .collect();
        for p in idle {
            self.set_value(p, 0.0);
        }
        self.impulses.clear();
    }
}

impl RawInputListener for InputMapper {
    fn begin_input(&mut self, tpf: f64) {
        self.tpf = tpf;
    }

    fn end_input(&mut self) {
        self.reset_idle_impulses();
        let active = self.active.clone();
        for g in active {
            self.update_group(g);
        }
    }

    fn on_key_event(&mut self, event: &mut KeyInputEvent) {
        if event.repeating || (event.consumed && event.pressed) {
            return;
        }
        let value = if event.pressed { 1.0 } else { 0.0 };
        self.set_value(InputPrimitive::Key(event.key), value);
    }

    fn on_mouse_button_event(&mut self, event: &mut MouseButtonEvent) {
        if event.consumed && event.pressed {
            return;
        }
        let index = event.button;
        let button = match Button::for_mouse_index(index) {
            Some(b) => b,
            None => self
                .extra_mouse_buttons
                .entry(index)
                .or_insert_with(|| Button::unmapped_mouse(index))
                .clone(),
        };
        let value = if event.pressed { 1.0 } else { 0.0 };
        self.set_value(InputPrimitive::Button(button), value);
    }

    fn on_mouse_motion_event(&mut self, event: &mut MouseMotionEvent) {
        if event.consumed {
            return;
        }
        let frame = if self.tpf > 0.0 { self.tpf } else { 1.0 };
        let motion_divisor = frame * self.config.mouse_scale;
        if event.delta.x != 0.0 {
            self.add_impulse(Axis::MOUSE_X, event.delta.x, motion_divisor);
        }
        if event.delta.y != 0.0 {
            self.add_impulse(Axis::MOUSE_Y, event.delta.y, motion_divisor);
        }
        if event.wheel_delta != 0.0 {
            let wheel_divisor = self.config.wheel_scale;
            self.add_impulse(Axis::MOUSE_WHEEL, event.wheel_delta, wheel_divisor);
        }
    }

    fn on_joy_axis_event(&mut self, event: &mut JoyAxisEvent) {
        let Some(axis) = self.joystick_layout.axis(&event.axis).cloned() else {
            warn!(
                "no axis mapping for joystick {} axis `{}`; dropping event",
                event.joystick, event.axis
            );
            return;
        };
        if event.consumed && event.value != 0.0 {
            return;
        }
        self.set_value(InputPrimitive::Axis(axis), event.value);
    }

    fn on_joy_button_event(&mut self, event: &mut JoyButtonEvent) {
        if event.consumed && event.pressed {
            return;
        }
        let button = match self.joystick_layout.button(&event.button) {
            Some(b) => b.clone(),
            None => {
                debug!(
                    "joystick {} button `{}` has no layout entry; using an ad hoc button",
                    event.joystick, event.button
                );
                Button::unmapped_joystick(&event.button)
            }
        };
        let value = if event.pressed { 1.0 } else { 0.0 };
        self.set_value(InputPrimitive::Button(button), value);
    }
}
