// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two fingers on two on-screen buttons.
//!
//! Each touch pointer gets its own pick session, so each finger captures the button it
//! went down on independently. Lifting one finger releases only its own button.
//!
//! Run:
//! - `cargo run -p lemur_demos --example multitouch`

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use glam::DVec3;
use kurbo::Point;
use lemur_input::RawInputListener;
use lemur_input::dispatch_frame;
use lemur_input::raw::{RawInputEvent, TouchEvent, TouchKind};
use lemur_pick::{
    CursorButtonEvent, CursorListener, PickEventSession, PickTargets, TouchDriver, TouchInput,
    Viewport,
};
use lemur_scene::{Aabb3, LocalNode, NodeId, Scene};

/// Records which buttons are held down.
struct HoldButton {
    name: &'static str,
    held: Rc<RefCell<Vec<&'static str>>>,
}

impl CursorListener<NodeId> for HoldButton {
    fn cursor_button_event(
        &self,
        event: &mut CursorButtonEvent<NodeId>,
        _target: &NodeId,
        _capture: Option<&NodeId>,
    ) {
        let mut held = self.held.borrow_mut();
        if event.pressed {
            held.push(self.name);
        } else {
            held.retain(|n| *n != self.name);
        }
        log::info!("{} {}", self.name, if event.pressed { "down" } else { "up" });
        event.consume();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    {
        use simplelog::LevelFilter::{Off, Trace};
        simplelog::TermLogger::init(
            Trace,
            simplelog::ConfigBuilder::new()
                .set_target_level(Off)
                .set_location_level(Off)
                .build(),
            simplelog::TerminalMode::Stderr,
            simplelog::ColorChoice::Auto,
        )?;
    }

    let mut scene = Scene::new();
    let gui = scene.insert(None, LocalNode::default());
    let pad = |x0: f64| LocalNode {
        local_bounds: Some(Aabb3::new(
            DVec3::new(x0, 0.0, -1.0),
            DVec3::new(x0 + 200.0, 200.0, 1.0),
        )),
        ..LocalNode::default()
    };
    let left = scene.insert(Some(gui), pad(0.0));
    let right = scene.insert(Some(gui), pad(600.0));
    let _ = scene.commit();

    let held = Rc::new(RefCell::new(Vec::new()));
    let mut targets: PickTargets<NodeId> = PickTargets::new();
    for (node, name) in [(left, "left"), (right, "right")] {
        targets.add_listener(
            node,
            Rc::new(HoldButton {
                name,
                held: held.clone(),
            }),
        );
    }

    let mut template = PickEventSession::new();
    template.add_collision_root(gui, Viewport::screen(800.0, 600.0));
    let mut touch = TouchDriver::new(template);

    let frame = |touch: &mut TouchDriver<NodeId>, events: &[TouchEvent]| {
        let mut events: Vec<RawInputEvent> =
            events.iter().cloned().map(RawInputEvent::Touch).collect();
        let mut input = TouchInput {
            driver: touch,
            scene: &scene,
            targets: &targets,
        };
        let mut chain: [&mut dyn RawInputListener; 1] = [&mut input];
        dispatch_frame(&mut chain, 1.0 / 60.0, &mut events);
        events.iter().all(RawInputEvent::is_consumed)
    };

    let consumed = frame(
        &mut touch,
        &[
            TouchEvent::new(3, TouchKind::Down, Point::new(100.0, 100.0)),
            TouchEvent::new(7, TouchKind::Down, Point::new(700.0, 100.0)),
        ],
    );
    assert!(consumed);
    assert_eq!(*held.borrow(), ["left", "right"]);
    assert_eq!(touch.pointer_ids(), [3, 7]);

    // Finger 3 slides off its button before lifting; its capture still gets the release.
    frame(
        &mut touch,
        &[
            TouchEvent::new(3, TouchKind::Move, Point::new(400.0, 300.0)),
            TouchEvent::new(3, TouchKind::Up, Point::new(400.0, 300.0)),
        ],
    );
    assert_eq!(*held.borrow(), ["right"]);
    assert_eq!(touch.pointer_ids(), [7]);

    frame(
        &mut touch,
        &[TouchEvent::new(7, TouchKind::Up, Point::new(700.0, 100.0))],
    );
    assert!(held.borrow().is_empty());
    println!("all fingers lifted");
    Ok(())
}
