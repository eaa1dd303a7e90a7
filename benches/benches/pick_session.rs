// Copyright 2025 the Lemur Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::DVec3;
use kurbo::Point;
use lemur_pick::{CursorListener, PickEventSession, PickTargets, Viewport};
use lemur_scene::{Aabb3, LocalNode, NodeId, Scene};

struct Nop;
impl CursorListener<NodeId> for Nop {}

/// An `n` by `n` grid of 10 px GUI buttons in one root.
fn gen_button_grid(n: usize) -> (Scene, NodeId, PickTargets<NodeId>) {
    let mut scene = Scene::new();
    let root = scene.insert(None, LocalNode::default());
    let mut targets = PickTargets::new();
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * 10.0;
            let y0 = y as f64 * 10.0;
            let node = scene.insert(
                Some(root),
                LocalNode {
                    local_bounds: Some(Aabb3::new(
                        DVec3::new(x0, y0, -1.0),
                        DVec3::new(x0 + 10.0, y0 + 10.0, 1.0),
                    )),
                    ..LocalNode::default()
                },
            );
            targets.add_listener(node, Rc::new(Nop));
        }
    }
    let _ = scene.commit();
    (scene, root, targets)
}

fn bench_cursor_moved(c: &mut Criterion) {
    let mut group = c.benchmark_group("pick_session");
    for &n in &[8usize, 32, 64] {
        let (scene, root, targets) = gen_button_grid(n);
        let size = n as f64 * 10.0;
        let mut session = PickEventSession::new();
        session.add_collision_root(root, Viewport::screen(size, size));
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("sweep_grid_n{n}"), |b| {
            let mut x = 0.0;
            b.iter(|| {
                x = (x + 7.0) % size;
                let consumed = session.cursor_moved(&scene, &targets, Point::new(x, size * 0.5));
                black_box(consumed);
            });
        });
        group.bench_function(format!("press_release_n{n}"), |b| {
            let at = Point::new(size * 0.5, size * 0.5);
            session.cursor_moved(&scene, &targets, at);
            b.iter(|| {
                black_box(session.button_event(&targets, 0, at, true));
                black_box(session.button_event(&targets, 0, at, false));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cursor_moved);
criterion_main!(benches);
