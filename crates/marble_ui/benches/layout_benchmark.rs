//! # Layout & Paint Benchmark
//!
//! A menu screen is rebuilt on every screen change and painted every frame;
//! these keep the build, layout and per-frame costs visible.
//!
//! Run with: `cargo bench --package marble_ui`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use marble_ui::{Color, FontSize, Gui, GuiConfig, HeadlessBackend, SlideFlags, StickAxis, WidgetId};

/// Builds a grid menu: a title and `rows` rows of four buttons.
fn build_menu(gui: &mut Gui<HeadlessBackend>, rows: usize) -> WidgetId {
    let menu = gui.vstack(WidgetId::NULL);
    gui.label(menu, "Level Set", FontSize::Medium, Color::DEFAULT_GRADIENT);

    let grid = gui.varray(menu);
    for row in 0..rows {
        let line = gui.harray(grid);
        for col in 0..4 {
            let token = (row * 4 + col) as i32;
            gui.state(line, "Level", FontSize::Small, token, 0);
        }
    }

    let footer = gui.hstack(menu);
    gui.state(footer, "Back", FontSize::Small, -1, 0);
    gui.filler(footer);
    gui.count(footer, 12345, FontSize::Small);
    gui.clock(footer, 654_321, FontSize::Small);
    menu
}

fn fresh_gui() -> Gui<HeadlessBackend> {
    Gui::new(HeadlessBackend::new(1920, 1080), GuiConfig::default())
}

/// Benchmark: build and lay out a screen from scratch.
fn bench_build_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_layout");

    for rows in [2, 8, 24] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            let mut gui = fresh_gui();
            b.iter(|| {
                let menu = build_menu(&mut gui, rows);
                gui.layout(menu, 0, 0);
                gui.delete(black_box(menu))
            });
        });
    }

    group.finish();
}

/// Benchmark: one animated frame (timer + paint) of a sliding screen.
fn bench_frame(c: &mut Criterion) {
    let mut gui = fresh_gui();
    let menu = build_menu(&mut gui, 24);
    gui.layout(menu, 0, 0);
    gui.slide(menu, SlideFlags::N | SlideFlags::EASE_ELASTIC, 0.0, 1e6, 0.01);

    c.bench_function("frame_timer_paint", |b| {
        b.iter(|| {
            gui.timer(menu, black_box(0.016));
            gui.paint(menu).len()
        });
    });
}

/// Benchmark: directional navigation across the grid.
fn bench_navigation(c: &mut Criterion) {
    let mut gui = fresh_gui();
    let menu = build_menu(&mut gui, 24);
    gui.layout(menu, 0, 0);
    gui.focus(gui.child(gui.child(gui.child(menu, 1), 0), 0));

    c.bench_function("stick_wrap", |b| {
        b.iter(|| {
            gui.stick(menu, StickAxis::Horizontal, black_box(1.0), true);
            gui.stick(menu, StickAxis::Vertical, black_box(1.0), true)
        });
    });
}

criterion_group!(benches, bench_build_layout, bench_frame, bench_navigation);
criterion_main!(benches);
