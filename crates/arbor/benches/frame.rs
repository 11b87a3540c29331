//! Frame and dispatch benchmarks over a grid of buttons inside a scrolling
//! viewport.

use std::hint::black_box;

use arbor::{
    NodeId,
    geom::Size,
    surface::Color,
    testing::Harness,
    widgets::{Block, Button, Flex, ViewportWidget},
};
use criterion::{Criterion, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Rows and columns of buttons.
const GRID: usize = 20;

/// Build a grid of buttons in a 400x400 viewport. Returns the buttons.
fn build(h: &mut Harness) -> Vec<NodeId> {
    let column = h.root.create(Flex::column());
    let mut buttons = Vec::new();
    for _ in 0..GRID {
        let row = h.root.create(Flex::row());
        for _ in 0..GRID {
            let b = h.root.create(Button::new(Size::new(30.0, 20.0)));
            h.root.append_child(row, b).expect("append button");
            buttons.push(b);
        }
        let rule = h
            .root
            .create(Block::new(Size::new(2.0, 20.0)).with_color(Color::BLACK));
        h.root.append_child(row, rule).expect("append rule");
        h.root.append_child(column, row).expect("append row");
    }
    let vw = ViewportWidget::install(&mut h.root, Size::new(400.0, 400.0), column, None)
        .expect("install viewport");
    h.root.set_child(vw).expect("set child");
    h.frame().expect("first frame");
    buttons
}

fn benchmark_full_frame(c: &mut Criterion) {
    c.bench_function("full_frame", |b| {
        let mut h = Harness::new();
        build(&mut h);
        b.iter(|| {
            h.root.request_full_repaint();
            black_box(h.frame().expect("frame"));
        });
    });
}

fn benchmark_damaged_frame(c: &mut Criterion) {
    c.bench_function("damaged_frame", |b| {
        let mut h = Harness::new();
        let buttons = build(&mut h);
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            let id = buttons[rng.random_range(0..buttons.len())];
            h.root.mark_dirty(id);
            black_box(h.frame().expect("frame"));
        });
    });
}

fn benchmark_pointer_moves(c: &mut Criterion) {
    c.bench_function("pointer_moves", |b| {
        let mut h = Harness::new();
        build(&mut h);
        let mut rng = StdRng::seed_from_u64(11);
        b.iter(|| {
            let (x, y) = (rng.random_range(0.0..400.0), rng.random_range(0.0..400.0));
            black_box(h.move_to(x, y).expect("move"));
        });
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = benchmark_full_frame, benchmark_damaged_frame, benchmark_pointer_moves
}
criterion_main!(benches);
