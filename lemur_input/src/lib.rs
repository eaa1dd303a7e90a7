// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lemur Input: logical input functions driven by raw device events.
//!
//! ## Overview
//!
//! Game code rarely wants to know that `W` was pressed. It wants to know that *move forward*
//! is on, and by how much. This crate decouples the two:
//!
//! - A [`FunctionId`](crate::function::FunctionId) names a logical action such as *jump* or
//!   *move forward*, inside a named group such as `"movement"`.
//! - [`InputMapper::map`](crate::mapper::InputMapper::map) binds a function to a primary
//!   [`InputPrimitive`](crate::primitive::InputPrimitive) (key, button, or axis), an optional
//!   modifier chord, and a bias.
//! - Listeners subscribe per function. State listeners see
//!   [`InputState`](crate::state::InputState) transitions; analog listeners see the scaled value
//!   every frame while the function is active.
//!
//! ## Specificity
//!
//! When bindings share a primary, the one with the most modifiers that are all held wins.
//! With `Shift+W` bound to *run* and `W` bound to *walk*, holding `Shift` and `W` fires only
//! *run*; letting go of `Shift` hands `W` back to *walk*.
//!
//! ## Groups
//!
//! Functions belong to groups that can be switched on and off as a unit, for example to
//! suspend movement while a menu is open. Only the `"default"` group starts active.
//! Deactivating a group releases its active bindings with a final `Off` notification.
//!
//! ## Frames
//!
//! The host feeds raw events through [`RawInputListener`](crate::raw::RawInputListener):
//! `begin_input`, the frame's events, then `end_input`. Listener notifications for held
//! inputs are sent from `end_input`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod error;
pub mod function;
pub mod listener;
pub mod mapper;
pub mod primitive;
pub mod raw;
pub mod state;

pub use config::{InputConfig, JoystickLayout};
pub use error::InputError;
pub use function::{DEFAULT_GROUP, FunctionId, FunctionRegistry};
pub use listener::{
    AnalogFunctionListener, ListenerList, StateFunctionListener, StateMethodDelegate,
};
pub use mapper::{Binding, InputMapper, Mapping};
pub use primitive::{Axis, Button, InputPrimitive, KeyCode};
pub use raw::{RawInputEvent, RawInputListener, dispatch_frame};
pub use state::InputState;
