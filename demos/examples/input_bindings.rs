// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key bindings, modifier chords, and input groups.
//!
//! This example binds *walk* and *run* to `W`, with *run* requiring `Shift`, then plays a
//! few frames of keyboard, mouse, and joystick input through the mapper.
//!
//! Run:
//! - `cargo run -p lemur_demos --example input_bindings`

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use kurbo::{Point, Vec2};
use lemur_input::raw::{JoyAxisEvent, KeyInputEvent, MouseMotionEvent, RawInputEvent};
use lemur_input::{
    AnalogFunctionListener, Axis, FunctionId, FunctionRegistry, InputMapper, InputState,
    KeyCode, RawInputListener, StateFunctionListener, dispatch_frame,
};

fn init_logging() -> Result<(), Box<dyn Error>> {
    use simplelog::LevelFilter::{Debug, Off};
    simplelog::TermLogger::init(
        Debug,
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;
    Ok(())
}

fn frame(mapper: &mut InputMapper, events: Vec<RawInputEvent>) {
    let mut events = events;
    let mut chain: [&mut dyn RawInputListener; 1] = [mapper];
    dispatch_frame(&mut chain, 1.0 / 60.0, &mut events);
}

fn key(code: KeyCode, pressed: bool) -> RawInputEvent {
    RawInputEvent::Key(KeyInputEvent::new(code, pressed))
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;

    let mut functions = FunctionRegistry::new();
    let walk = functions.register("movement", "walk")?;
    let run = functions.register("movement", "run")?;
    let turn = functions.register("camera", "turn")?;

    let mut mapper = InputMapper::new();
    mapper.activate_group("movement");
    mapper.activate_group("camera");
    mapper.map_positive(&walk, KeyCode::W);
    mapper.map(&run, InputState::Positive, KeyCode::W, [KeyCode::LSHIFT]);
    let look = mapper.map_positive(&turn, Axis::MOUSE_X);
    mapper.set_scale(look, 0.5);
    mapper.map_positive(&turn, Axis::JOYSTICK_RIGHT_X);

    let states = Rc::new(RefCell::new(Vec::new()));
    let log = states.clone();
    let on_state: Rc<dyn StateFunctionListener> =
        Rc::new(move |f: &FunctionId, state: InputState, _: f64| {
            println!("{f} -> {state:?}");
            log.borrow_mut().push((f.id().to_string(), state));
        });
    mapper.add_state_listener(on_state, &[walk.clone(), run.clone()])?;

    let turning = Rc::new(RefCell::new(0.0));
    let sink = turning.clone();
    let on_turn: Rc<dyn AnalogFunctionListener> = Rc::new(move |_: &FunctionId, v: f64, _: f64| {
        *sink.borrow_mut() = v;
    });
    mapper.add_analog_listener(on_turn, &[turn.clone()])?;

    // Walk, then add Shift to run, then release Shift to walk again.
    frame(&mut mapper, vec![key(KeyCode::W, true)]);
    frame(&mut mapper, vec![key(KeyCode::LSHIFT, true)]);
    frame(&mut mapper, vec![key(KeyCode::LSHIFT, false)]);
    frame(&mut mapper, vec![key(KeyCode::W, false)]);
    let expected = [
        ("walk", InputState::Positive),
        ("walk", InputState::Off),
        ("run", InputState::Positive),
        ("run", InputState::Off),
        ("walk", InputState::Positive),
        ("walk", InputState::Off),
    ];
    let seen: Vec<(String, InputState)> = states.borrow_mut().drain(..).collect();
    let seen: Vec<(&str, InputState)> = seen.iter().map(|(id, s)| (id.as_str(), *s)).collect();
    assert_eq!(seen, expected);

    // Opening a menu suspends movement; held keys report a final `Off`.
    frame(&mut mapper, vec![key(KeyCode::W, true)]);
    mapper.deactivate_group("movement");
    assert_eq!(
        states.borrow().last().map(|(_, s)| *s),
        Some(InputState::Off)
    );
    frame(&mut mapper, vec![key(KeyCode::W, false)]);
    mapper.activate_group("movement");

    // Mouse motion is an impulse: a value for the frame it arrives in, then zero.
    frame(
        &mut mapper,
        vec![RawInputEvent::MouseMotion(MouseMotionEvent::new(
            Point::new(400.0, 300.0),
            Vec2::new(12.0, 0.0),
        ))],
    );
    println!("mouse turn: {:.3}", turning.borrow());
    assert!(*turning.borrow() > 0.0);
    frame(&mut mapper, vec![]);
    assert_eq!(*turning.borrow(), 0.0);

    // A stick axis holds its value until it moves again.
    frame(
        &mut mapper,
        vec![RawInputEvent::JoyAxis(JoyAxisEvent {
            joystick: 0,
            axis: "rx".to_string(),
            value: 0.8,
            consumed: false,
        })],
    );
    println!("stick turn: {:.3}", turning.borrow());
    Ok(())
}
