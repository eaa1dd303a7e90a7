// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A 3D world under a GUI overlay, picked with the mouse.
//!
//! The overlay root is registered after the world root, so a GUI button wins over the
//! world behind it. The mouse driver runs ahead of the input mapper: a click consumed by
//! the button never reaches the *shoot* binding, while a click on the world does.
//!
//! Run:
//! - `cargo run -p lemur_demos --example pick_overlay`

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

use glam::DVec3;
use kurbo::{Point, Rect, Vec2};
use lemur_input::raw::{MouseButtonEvent, MouseMotionEvent, RawInputEvent};
use lemur_input::{Button, FunctionRegistry, InputMapper, RawInputListener, dispatch_frame};
use lemur_pick::{
    Camera, ClickListener, CursorButtonEvent, CursorListener, CursorMotionEvent, MouseDriver,
    MouseInput, PickEventSession, PickTargets, Viewport,
};
use lemur_scene::{Aabb3, LocalNode, NodeId, Scene};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;

/// Logs hover changes of world objects without consuming anything.
struct Hover(&'static str);

impl CursorListener<NodeId> for Hover {
    fn cursor_entered(&self, _: &mut CursorMotionEvent<NodeId>, _: &NodeId, _: Option<&NodeId>) {
        log::info!("hovering {}", self.0);
    }

    fn cursor_exited(&self, _: &mut CursorMotionEvent<NodeId>, _: &NodeId, _: Option<&NodeId>) {
        log::info!("left {}", self.0);
    }
}

fn boxed(min: DVec3, max: DVec3) -> LocalNode {
    LocalNode {
        local_bounds: Some(Aabb3::new(min, max)),
        ..LocalNode::default()
    }
}

fn frame(
    mouse: &mut MouseDriver<NodeId>,
    mapper: &mut InputMapper,
    scene: &Scene,
    targets: &PickTargets<NodeId>,
    mut events: Vec<RawInputEvent>,
) {
    let mut input = MouseInput {
        driver: mouse,
        scene,
        targets,
    };
    let mut chain: [&mut dyn RawInputListener; 2] = [&mut input, mapper];
    dispatch_frame(&mut chain, 1.0 / 60.0, &mut events);
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

    // World: a crate at the origin in front of a wall.
    let mut scene = Scene::new();
    let world = scene.insert(None, LocalNode::default());
    let crate_node = scene.insert(Some(world), boxed(-DVec3::ONE, DVec3::ONE));
    let wall = scene.insert(
        Some(world),
        boxed(DVec3::new(-100.0, -100.0, -6.0), DVec3::new(100.0, 100.0, -5.0)),
    );
    // Overlay: a 100x40 button near the bottom-left corner, in pixels.
    let gui = scene.insert(None, LocalNode::default());
    let button = scene.insert(
        Some(gui),
        boxed(DVec3::new(10.0, 10.0, -1.0), DVec3::new(110.0, 50.0, 1.0)),
    );
    let _ = scene.commit();

    let clicks = Rc::new(Cell::new(0));
    let mut targets: PickTargets<NodeId> = PickTargets::new();
    targets.add_listener(crate_node, Rc::new(Hover("crate")));
    targets.add_listener(wall, Rc::new(Hover("wall")));
    let counter = clicks.clone();
    targets.add_listener(
        button,
        Rc::new(ClickListener::new(move |_: &CursorButtonEvent<NodeId>, _: &NodeId| {
            log::info!("button clicked");
            counter.set(counter.get() + 1);
        })),
    );

    let mut session = PickEventSession::new();
    let camera = Camera::perspective(
        std::f64::consts::FRAC_PI_4,
        WIDTH / HEIGHT,
        0.1,
        100.0,
        DVec3::new(0.0, 0.0, 10.0),
        DVec3::ZERO,
    );
    session.add_collision_root(world, Viewport::new(Rect::new(0.0, 0.0, WIDTH, HEIGHT), camera));
    session.add_collision_root(gui, Viewport::screen(WIDTH, HEIGHT));
    let mut mouse = MouseDriver::new(session);

    let mut functions = FunctionRegistry::new();
    let shoot = functions.register_default("shoot")?;
    let mut mapper = InputMapper::new();
    mapper.map_positive(&shoot, Button::MOUSE_BUTTON1);
    let shots = Rc::new(Cell::new(0));
    let fired = shots.clone();
    mapper.add_delegate(&shoot, move || fired.set(fired.get() + 1));

    let motion = |x: f64, y: f64| {
        RawInputEvent::MouseMotion(MouseMotionEvent::new(Point::new(x, y), Vec2::ZERO))
    };
    let press = |x: f64, y: f64, pressed: bool| {
        RawInputEvent::MouseButton(MouseButtonEvent::new(0, pressed, Point::new(x, y)))
    };

    // Click the GUI button: the wall behind it is hit too, but the overlay wins.
    frame(&mut mouse, &mut mapper, &scene, &targets, vec![motion(50.0, 30.0)]);
    assert_eq!(mouse.session().hit_target(), Some(&button));
    frame(&mut mouse, &mut mapper, &scene, &targets, vec![press(50.0, 30.0, true)]);
    frame(&mut mouse, &mut mapper, &scene, &targets, vec![press(50.0, 30.0, false)]);
    assert_eq!(clicks.get(), 1);
    assert_eq!(shots.get(), 0, "GUI clicks do not shoot");

    // Click the crate in the middle of the screen.
    frame(&mut mouse, &mut mapper, &scene, &targets, vec![motion(400.0, 300.0)]);
    assert_eq!(mouse.session().hit_target(), Some(&crate_node));
    frame(&mut mouse, &mut mapper, &scene, &targets, vec![press(400.0, 300.0, true)]);
    frame(&mut mouse, &mut mapper, &scene, &targets, vec![press(400.0, 300.0, false)]);
    assert_eq!(shots.get(), 1);

    // The crate slides away under a still cursor; the next frame exits it.
    scene.set_local_transform(
        crate_node,
        glam::DAffine3::from_translation(DVec3::new(5.0, 0.0, 0.0)),
    );
    let _ = scene.commit();
    frame(&mut mouse, &mut mapper, &scene, &targets, vec![]);
    assert_eq!(mouse.session().hit_target(), Some(&wall));

    println!("clicks: {}, shots: {}", clicks.get(), shots.get());
    Ok(())
}
