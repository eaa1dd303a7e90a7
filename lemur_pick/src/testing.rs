// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for unit tests: a strip-shaped collision scene and a recording listener.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use hashbrown::HashMap;

use crate::listener::{CursorButtonEvent, CursorListener, CursorMotionEvent};
use crate::types::{CollisionResult, CollisionScene, ParentLookup, Ray};

/// Geometry occupying a vertical strip `x0..x1` of a screen-space root.
pub(crate) struct Strip {
    pub(crate) root: u32,
    pub(crate) geometry: u32,
    pub(crate) x0: f64,
    pub(crate) x1: f64,
    pub(crate) distance: f64,
}

#[derive(Default)]
pub(crate) struct StripScene {
    pub(crate) parents: HashMap<u32, u32>,
    pub(crate) strips: Vec<Strip>,
}

impl StripScene {
    pub(crate) fn strip(&mut self, root: u32, geometry: u32, x0: f64, x1: f64, distance: f64) {
        self.parents.insert(geometry, root);
        self.strips.push(Strip {
            root,
            geometry,
            x0,
            x1,
            distance,
        });
    }
}

impl ParentLookup<u32> for StripScene {
    fn parent_of(&self, node: &u32) -> Option<u32> {
        self.parents.get(node).copied()
    }
}

impl CollisionScene<u32> for StripScene {
    fn collide_with(&self, root: &u32, ray: &Ray, results: &mut Vec<CollisionResult<u32>>) {
        let x = ray.origin.x;
        let mut found: Vec<CollisionResult<u32>> = self
            .strips
            .iter()
            .filter(|s| s.root == *root && x >= s.x0 && x < s.x1)
            .map(|s| CollisionResult {
                geometry: s.geometry,
                distance: s.distance,
                contact_point: ray.at(s.distance),
            })
            .collect();
        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.extend(found);
    }
}

/// `(listener, kind, target, capture)`
pub(crate) type Entry = (u32, &'static str, u32, Option<u32>);
pub(crate) type Log = Rc<RefCell<Vec<Entry>>>;

pub(crate) struct Recorder {
    pub(crate) who: u32,
    pub(crate) log: Log,
    pub(crate) consume_moves: bool,
    pub(crate) consume_buttons: bool,
}

impl Recorder {
    pub(crate) fn new(who: u32, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            who,
            log: log.clone(),
            consume_moves: false,
            consume_buttons: false,
        })
    }

    pub(crate) fn consuming(who: u32, log: &Log) -> Rc<Self> {
        Rc::new(Self {
            who,
            log: log.clone(),
            consume_moves: true,
            consume_buttons: true,
        })
    }

    fn push(&self, kind: &'static str, target: &u32, capture: Option<&u32>) {
        self.log
            .borrow_mut()
            .push((self.who, kind, *target, capture.copied()));
    }
}

impl CursorListener<u32> for Recorder {
    fn cursor_button_event(
        &self,
        event: &mut CursorButtonEvent<u32>,
        target: &u32,
        capture: Option<&u32>,
    ) {
        self.push(if event.pressed { "press" } else { "release" }, target, capture);
        if self.consume_buttons {
            event.consume();
        }
    }

    fn cursor_entered(
        &self,
        _event: &mut CursorMotionEvent<u32>,
        target: &u32,
        capture: Option<&u32>,
    ) {
        self.push("enter", target, capture);
    }

    fn cursor_exited(
        &self,
        _event: &mut CursorMotionEvent<u32>,
        target: &u32,
        capture: Option<&u32>,
    ) {
        self.push("exit", target, capture);
    }

    fn cursor_moved(
        &self,
        event: &mut CursorMotionEvent<u32>,
        target: &u32,
        capture: Option<&u32>,
    ) {
        self.push("move", target, capture);
        if self.consume_moves {
            event.consume();
        }
    }
}

pub(crate) fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn drain(log: &Log) -> Vec<Entry> {
    core::mem::take(&mut *log.borrow_mut())
}
