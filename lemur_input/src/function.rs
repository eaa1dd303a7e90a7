// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Logical input functions and the registry that keeps them unique.
//!
//! ## Overview
//!
//! A [`FunctionId`] names something the application wants to react to ("Move", "Jump",
//! "Toggle console"). Raw inputs are bound to functions through the
//! [`InputMapper`](crate::mapper::InputMapper), and listeners subscribe to functions rather
//! than to devices.
//!
//! Every function belongs to a named group. Groups can be enabled and disabled in bulk,
//! for example to silence all "movement" functions while a text field has focus.
//!
//! ## Uniqueness
//!
//! Functions are created only through a [`FunctionRegistry`], which rejects a second
//! registration of the same `(group, id)` pair.
//!
//! ```
//! use lemur_input::function::FunctionRegistry;
//! use lemur_input::InputError;
//!
//! let mut functions = FunctionRegistry::new();
//! let jump = functions.register("movement", "jump").unwrap();
//! assert_eq!(jump.group(), "movement");
//! assert!(matches!(
//!     functions.register("movement", "jump"),
//!     Err(InputError::DuplicateFunction { .. })
//! ));
//! ```

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

use hashbrown::HashMap;

use crate::error::InputError;

/// Name of the group used when none is given. It is active from construction.
pub const DEFAULT_GROUP: &str = "default";

#[derive(Debug)]
struct FunctionInner {
    group: String,
    id: String,
    name: String,
}

/// Identifier of a logical application function.
///
/// Cheap to clone. Equality and hashing use `(group, id)`; the display name is informational.
#[derive(Clone)]
pub struct FunctionId {
    inner: Rc<FunctionInner>,
}

impl FunctionId {
    /// Group this function belongs to.
    pub fn group(&self) -> &str {
        &self.inner.group
    }

    /// Identifier within the group.
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Human readable name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

impl PartialEq for FunctionId {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.group == other.inner.group && self.inner.id == other.inner.id)
    }
}

impl Eq for FunctionId {}

impl Hash for FunctionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.group.hash(state);
        self.inner.id.hash(state);
    }
}

impl core::fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "FunctionId({}:{})", self.inner.group, self.inner.id)
    }
}

impl core::fmt::Display for FunctionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.inner.name)
    }
}

/// Creates [`FunctionId`]s and guarantees that `(group, id)` pairs are unique.
///
/// Owned by the application's input configuration phase.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: HashMap<(String, String), FunctionId>,
    order: Vec<FunctionId>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function whose display name is its id.
    pub fn register(&mut self, group: &str, id: &str) -> Result<FunctionId, InputError> {
        self.register_named(group, id, id)
    }

    /// Register a function in the [`DEFAULT_GROUP`].
    pub fn register_default(&mut self, id: &str) -> Result<FunctionId, InputError> {
        self.register_named(DEFAULT_GROUP, id, id)
    }

    /// Register a function with an explicit display name.
    pub fn register_named(
        &mut self,
        group: &str,
        id: &str,
        name: &str,
    ) -> Result<FunctionId, InputError> {
        let key = (group.to_string(), id.to_string());
        if self.functions.contains_key(&key) {
            return Err(InputError::DuplicateFunction {
                group: key.0,
                id: key.1,
            });
        }
        let function = FunctionId {
            inner: Rc::new(FunctionInner {
                group: key.0.clone(),
                id: key.1.clone(),
                name: name.to_string(),
            }),
        };
        self.functions.insert(key, function.clone());
        self.order.push(function.clone());
        Ok(function)
    }

    /// Look up a previously registered function.
    pub fn get(&self, group: &str, id: &str) -> Option<&FunctionId> {
        self.functions.get(&(group.to_string(), id.to_string()))
    }

    /// Iterate registered functions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionId> {
        self.order.iter()
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
