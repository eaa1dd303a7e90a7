// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry of pickable nodes and their cursor listeners.
//!
//! A node is pickable when it has an enabled control. Struck geometry resolves to its
//! nearest pickable ancestor (itself included); geometry without one is skipped.

use alloc::rc::Rc;
use core::hash::Hash;

use hashbrown::HashMap;
use lemur_input::ListenerList;

use crate::listener::{CursorButtonEvent, CursorListener, CursorMotionEvent};
use crate::types::ParentLookup;

struct Control<K> {
    enabled: bool,
    listeners: ListenerList<dyn CursorListener<K>>,
}

/// Cursor listeners attached to scene nodes.
pub struct PickTargets<K> {
    controls: HashMap<K, Control<K>>,
}

impl<K> core::fmt::Debug for PickTargets<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PickTargets")
            .field("controls", &self.controls.len())
            .finish_non_exhaustive()
    }
}

impl<K> Default for PickTargets<K> {
    fn default() -> Self {
        Self {
            controls: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + Hash> PickTargets<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener to `node`, making it pickable if it was not already.
    pub fn add_listener(&mut self, node: K, listener: Rc<dyn CursorListener<K>>) {
        self.controls
            .entry(node)
            .or_insert_with(|| Control {
                enabled: true,
                listeners: ListenerList::new(),
            })
            .listeners
            .add(listener);
    }

    /// Detach a listener. The node stays pickable. Returns whether it was attached.
    pub fn remove_listener(&mut self, node: &K, listener: &Rc<dyn CursorListener<K>>) -> bool {
        self.controls
            .get(node)
            .is_some_and(|c| c.listeners.remove(listener))
    }

    /// Drop the control of `node`; it stops being pickable.
    pub fn remove_node(&mut self, node: &K) -> bool {
        self.controls.remove(node).is_some()
    }

    /// Enable or disable the control of `node`. Disabled nodes are skipped by picking.
    pub fn set_enabled(&mut self, node: &K, enabled: bool) {
        if let Some(c) = self.controls.get_mut(node) {
            c.enabled = enabled;
        }
    }

    /// Whether `node` has an enabled control.
    pub fn is_pickable(&self, node: &K) -> bool {
        self.controls.get(node).is_some_and(|c| c.enabled)
    }

    /// Shared handle to the listeners of `node`, for changes during dispatch.
    pub fn listeners(&self, node: &K) -> Option<ListenerList<dyn CursorListener<K>>> {
        self.controls.get(node).map(|c| c.listeners.clone())
    }

    /// Nearest pickable node at or above `geometry`.
    pub fn find_hit_target<P>(&self, parents: &P, geometry: &K) -> Option<K>
    where
        P: ParentLookup<K> + ?Sized,
    {
        let mut cur = Some(geometry.clone());
        while let Some(node) = cur {
            if self.is_pickable(&node) {
                return Some(node);
            }
            cur = parents.parent_of(&node);
        }
        None
    }

    pub(crate) fn button_event(
        &self,
        node: &K,
        event: &mut CursorButtonEvent<K>,
        target: &K,
        capture: Option<&K>,
    ) {
        self.each(node, |l| l.cursor_button_event(event, target, capture));
    }

    pub(crate) fn moved(
        &self,
        node: &K,
        event: &mut CursorMotionEvent<K>,
        target: &K,
        capture: Option<&K>,
    ) {
        self.each(node, |l| l.cursor_moved(event, target, capture));
    }

    pub(crate) fn entered(
        &self,
        node: &K,
        event: &mut CursorMotionEvent<K>,
        target: &K,
        capture: Option<&K>,
    ) {
        self.each(node, |l| l.cursor_entered(event, target, capture));
    }

    pub(crate) fn exited(
        &self,
        node: &K,
        event: &mut CursorMotionEvent<K>,
        target: &K,
        capture: Option<&K>,
    ) {
        self.each(node, |l| l.cursor_exited(event, target, capture));
    }

    /// Run `f` for every listener of `node`, over a snapshot.
    fn each(&self, node: &K, mut f: impl FnMut(&dyn CursorListener<K>)) {
        let Some(c) = self.controls.get(node) else {
            return;
        };
        for l in c.listeners.snapshot().iter() {
            f(l.as_ref());
        }
    }
}
