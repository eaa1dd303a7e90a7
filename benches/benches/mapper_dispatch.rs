// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use lemur_input::raw::{KeyInputEvent, MouseMotionEvent};
use lemur_input::{
    AnalogFunctionListener, Axis, FunctionId, FunctionRegistry, InputMapper, InputState, KeyCode,
    RawInputListener, StateFunctionListener,
};

const KEYS: [KeyCode; 8] = [
    KeyCode::W,
    KeyCode::A,
    KeyCode::S,
    KeyCode::D,
    KeyCode::F,
    KeyCode::SPACE,
    KeyCode::LSHIFT,
    KeyCode::LCONTROL,
];

/// `n` functions per key: one plain binding and `n - 1` chords of increasing size.
fn build_mapper(n: usize) -> (InputMapper, Vec<FunctionId>) {
    let mut registry = FunctionRegistry::new();
    let mut mapper = InputMapper::new();
    let mut functions = Vec::new();
    for (k, key) in KEYS.iter().enumerate() {
        for level in 0..n {
            let Ok(f) = registry.register_default(&format!("f{k}_{level}")) else {
                continue;
            };
            let modifiers: Vec<KeyCode> = KEYS
                .iter()
                .copied()
                .filter(|m| m != key)
                .take(level)
                .collect();
            mapper.map(&f, InputState::Positive, *key, modifiers);
            functions.push(f);
        }
    }
    let look = match registry.register_default("look") {
        Ok(f) => f,
        Err(_) => return (mapper, functions),
    };
    mapper.map_positive(&look, Axis::MOUSE_X);
    functions.push(look);

    let state: Rc<dyn StateFunctionListener> =
        Rc::new(|f: &FunctionId, s: InputState, _: f64| {
            black_box((f, s));
        });
    let analog: Rc<dyn AnalogFunctionListener> = Rc::new(|f: &FunctionId, v: f64, _: f64| {
        black_box((f, v));
    });
    let _ = mapper.add_state_listener(state, &functions);
    let _ = mapper.add_analog_listener(analog, &functions);
    (mapper, functions)
}

fn bench_key_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapper");
    for &n in &[1usize, 4, 8] {
        group.throughput(Throughput::Elements((KEYS.len() * 2) as u64));
        group.bench_function(format!("press_release_all_keys_chords{n}"), |b| {
            b.iter_batched(
                || build_mapper(n).0,
                |mut mapper| {
                    mapper.begin_input(1.0 / 60.0);
                    for key in KEYS {
                        mapper.on_key_event(&mut KeyInputEvent::new(key, true));
                    }
                    mapper.end_input();
                    mapper.begin_input(1.0 / 60.0);
                    for key in KEYS.iter().rev() {
                        mapper.on_key_event(&mut KeyInputEvent::new(*key, false));
                    }
                    mapper.end_input();
                    black_box(mapper);
                },
                BatchSize::SmallInput,
            );
        });
    }

    let (mut held, _) = build_mapper(4);
    held.begin_input(1.0 / 60.0);
    held.on_key_event(&mut KeyInputEvent::new(KeyCode::W, true));
    held.end_input();
    group.bench_function("steady_frame_with_mouse_motion", |b| {
        b.iter(|| {
            held.begin_input(1.0 / 60.0);
            held.on_mouse_motion_event(&mut MouseMotionEvent::new(
                Point::new(400.0, 300.0),
                Vec2::new(3.0, 0.0),
            ));
            held.end_input();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_key_frames);
criterion_main!(benches);
