// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover state helper: compute exit/enter transitions from hit-target changes.
//!
//! ## Minimal example
//!
//! ```
//! use lemur_pick::hover::{HoverEvent, HoverState};
//! let mut h: HoverState<u32> = HoverState::new();
//! assert_eq!(h.update(Some(1)), vec![HoverEvent::Enter(1)]);
//! assert_eq!(h.update(Some(1)), vec![]);
//! assert_eq!(h.update(Some(2)), vec![HoverEvent::Exit(1), HoverEvent::Enter(2)]);
//! assert_eq!(h.update(None), vec![HoverEvent::Exit(2)]);
//! ```

use alloc::vec::Vec;

/// Tracks the single hovered target of a pointer.
///
/// Only the first resolved hit counts, so the transitions reflect changes of that one
/// target rather than of every candidate under the pointer. A change always emits the
/// exit before the enter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverState<K> {
    current: Option<K>,
}

impl<K> Default for HoverState<K> {
    fn default() -> Self {
        Self { current: None }
    }
}

/// A hover transition event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// The pointer left the node.
    Exit(K),
    /// The pointer entered the node.
    Enter(K),
}

impl<K: Clone + PartialEq> HoverState<K> {
    /// Create an empty hover state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The hovered target, if any.
    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    /// Forget the hovered target, returning its exit if there was one.
    pub fn clear(&mut self) -> Vec<HoverEvent<K>> {
        self.update(None)
    }

    /// Move to `target` and return the transitions required to get there.
    pub fn update(&mut self, target: Option<K>) -> Vec<HoverEvent<K>> {
        if self.current == target {
            return Vec::new();
        }
        let mut out = Vec::new();
        if let Some(old) = self.current.take() {
            out.push(HoverEvent::Exit(old));
        }
        if let Some(new) = target {
            out.push(HoverEvent::Enter(new.clone()));
            self.current = Some(new);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn hover_enter_on_fresh_target() {
        let mut h: HoverState<u32> = HoverState::new();
        assert_eq!(h.update(Some(3)), vec![HoverEvent::Enter(3)]);
        assert_eq!(h.current(), Some(&3));
    }

    #[test]
    fn hover_change_exits_before_entering() {
        let mut h: HoverState<u32> = HoverState::new();
        let _ = h.update(Some(1));
        assert_eq!(
            h.update(Some(2)),
            vec![HoverEvent::Exit(1), HoverEvent::Enter(2)]
        );
    }

    #[test]
    fn hover_clear_and_repeat() {
        let mut h: HoverState<u32> = HoverState::new();
        assert!(h.clear().is_empty());
        let _ = h.update(Some(7));
        assert!(h.update(Some(7)).is_empty());
        assert_eq!(h.clear(), vec![HoverEvent::Exit(7)]);
        assert_eq!(h.current(), None);
    }
}
