// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Listener contracts for function notifications, and the snapshot list that stores them.
//!
//! ## Reentrancy
//!
//! Listeners are kept in a [`ListenerList`], a copy-on-write array. Dispatch iterates a
//! snapshot taken before the first callback, so a listener may add or remove listeners
//! (including itself) through a cloned handle while a dispatch is running. The change
//! takes effect on the next dispatch.
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use lemur_input::listener::ListenerList;
//!
//! let list: ListenerList<dyn Fn() -> u32> = ListenerList::new();
//! let handle = list.clone();
//! let calls = Rc::new(Cell::new(0));
//! let c = calls.clone();
//! list.add(Rc::new(move || {
//!     c.set(c.get() + 1);
//!     handle.add(Rc::new(|| 2));
//!     1
//! }));
//! for l in list.snapshot().iter() {
//!     l();
//! }
//! assert_eq!(calls.get(), 1);
//! assert_eq!(list.len(), 2);
//! ```

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::function::FunctionId;
use crate::state::InputState;

/// A shared, copy-on-write list of reference-counted listeners.
///
/// Clones share the same underlying list. Identity is by allocation ([`Rc::ptr_eq`]).
pub struct ListenerList<T: ?Sized> {
    items: Rc<RefCell<Rc<[Rc<T>]>>>,
}

impl<T: ?Sized> Clone for ListenerList<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

impl<T: ?Sized> Default for ListenerList<T> {
    fn default() -> Self {
        let empty: Vec<Rc<T>> = Vec::new();
        Self {
            items: Rc::new(RefCell::new(Rc::from(empty))),
        }
    }
}

impl<T: ?Sized> core::fmt::Debug for ListenerList<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListenerList")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> ListenerList<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a listener. Adding the same allocation twice registers it twice.
    pub fn add(&self, listener: Rc<T>) {
        let mut items = self.items.borrow_mut();
        let mut next: Vec<Rc<T>> = items.iter().cloned().collect();
        next.push(listener);
        *items = Rc::from(next);
    }

    /// Remove the first registration of `listener`. Returns whether it was present.
    pub fn remove(&self, listener: &Rc<T>) -> bool {
        let mut items = self.items.borrow_mut();
        let Some(pos) = items.iter().position(|l| Rc::ptr_eq(l, listener)) else {
            return false;
        };
        let mut next: Vec<Rc<T>> = items.iter().cloned().collect();
        next.remove(pos);
        *items = Rc::from(next);
        true
    }

    /// Whether `listener` is registered.
    pub fn contains(&self, listener: &Rc<T>) -> bool {
        self.items.borrow().iter().any(|l| Rc::ptr_eq(l, listener))
    }

    /// The current contents. Later changes to the list do not affect the returned array.
    pub fn snapshot(&self) -> Rc<[Rc<T>]> {
        self.items.borrow().clone()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }
}

/// Receives tri-state transitions of a function.
///
/// Called only when the classified [`InputState`] changes.
pub trait StateFunctionListener {
    /// `function` moved to `state`. `tpf` is the elapsed time of the current input frame.
    fn value_changed(&self, function: &FunctionId, state: InputState, tpf: f64);
}

/// Receives continuous values of a function.
///
/// Called every input frame while a binding of the function is active.
pub trait AnalogFunctionListener {
    /// `function` currently reads `value`. `tpf` is the elapsed time of the current input frame.
    fn value_active(&self, function: &FunctionId, value: f64, tpf: f64);
}

impl<F> StateFunctionListener for F
where
    F: Fn(&FunctionId, InputState, f64),
{
    fn value_changed(&self, function: &FunctionId, state: InputState, tpf: f64) {
        self(function, state, tpf);
    }
}

impl<F> AnalogFunctionListener for F
where
    F: Fn(&FunctionId, f64, f64),
{
    fn value_active(&self, function: &FunctionId, value: f64, tpf: f64) {
        self(function, value, tpf);
    }
}

/// A state listener that forwards to a callback.
///
/// Built with [`StateMethodDelegate::on_release`], the callback runs only when the
/// function returns to [`InputState::Off`]. Built with [`StateMethodDelegate::with_state`],
/// it runs on every transition and receives the new state.
pub struct StateMethodDelegate {
    callback: Box<dyn Fn(InputState)>,
    pass_state: bool,
}

impl StateMethodDelegate {
    /// Invoke `callback` when the function is released.
    pub fn on_release(callback: impl Fn() + 'static) -> Self {
        Self {
            callback: Box::new(move |_| callback()),
            pass_state: false,
        }
    }

    /// Invoke `callback` on every transition.
    pub fn with_state(callback: impl Fn(InputState) + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            pass_state: true,
        }
    }
}

impl core::fmt::Debug for StateMethodDelegate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateMethodDelegate")
            .field("pass_state", &self.pass_state)
            .finish_non_exhaustive()
    }
}

impl StateFunctionListener for StateMethodDelegate {
    fn value_changed(&self, _function: &FunctionId, state: InputState, _tpf: f64) {
        if self.pass_state || state == InputState::Off {
            (self.callback)(state);
        }
    }
}
