use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use treeline::config::LayoutConfig;
use treeline::engine::TreeViewEngine;
use treeline::layout::{compute_lines, visible_nodes};
use treeline::measure::{HeadlessMeasurer, MeasureSource};
use treeline::tree::{ExpansionState, TreeNode};

fn build_node(id: &str, children: usize, depth: usize) -> TreeNode {
    let mut node = TreeNode::titled(id, &format!("Goal {id}"));
    if depth > 0 {
        for child in 0..children {
            node = node.child(build_node(&format!("{id}-{child}"), children, depth - 1));
        }
    }
    node
}

fn goal_forest(columns: usize, children: usize, depth: usize) -> Vec<TreeNode> {
    (0..columns)
        .map(|column| build_node(&format!("c{column}"), children, depth))
        .collect()
}

fn forest_shapes() -> Vec<(&'static str, Vec<TreeNode>)> {
    vec![
        ("small", goal_forest(4, 2, 2)),
        ("medium", goal_forest(8, 3, 3)),
        ("large", goal_forest(16, 3, 4)),
    ]
}

fn bench_visible_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("visible_walk");
    for (name, roots) in forest_shapes() {
        let mut expanded = ExpansionState::new();
        expanded.expand_all(&roots);
        group.bench_with_input(BenchmarkId::from_parameter(name), &roots, |b, roots| {
            b.iter(|| {
                let rows = visible_nodes(black_box(roots), &expanded);
                black_box(rows.len());
            });
        });
    }
    group.finish();
}

fn bench_compute_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_lines");
    for (name, roots) in forest_shapes() {
        let mut expanded = ExpansionState::new();
        expanded.expand_all(&roots);
        let mut measurer = HeadlessMeasurer::new(LayoutConfig::default());
        measurer.layout(&roots, &expanded);
        let mut engine = TreeViewEngine::new(None);
        engine.after_render(&roots, &expanded, &measurer);

        let visible = visible_nodes(&roots, &expanded);
        let rects = engine.rects().clone();
        let container = engine.container().expect("laid out");
        group.bench_with_input(BenchmarkId::from_parameter(name), &visible, |b, visible| {
            b.iter(|| {
                let lines = compute_lines(black_box(visible), &rects, container);
                black_box(lines.len());
            });
        });
    }
    group.finish();
}

fn bench_full_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_pass");
    for (name, roots) in forest_shapes() {
        let mut expanded = ExpansionState::new();
        expanded.expand_all(&roots);
        let mut measurer = HeadlessMeasurer::new(LayoutConfig::default());
        measurer.layout(&roots, &expanded);
        group.bench_with_input(BenchmarkId::from_parameter(name), &roots, |b, roots| {
            let mut engine = TreeViewEngine::new(None);
            b.iter(|| {
                engine.after_render(black_box(roots), &expanded, &measurer);
                black_box(engine.lines().len());
            });
        });
    }
    group.finish();
}

fn bench_headless_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("headless_layout");
    for (name, roots) in forest_shapes() {
        let mut expanded = ExpansionState::new();
        expanded.expand_all(&roots);
        group.bench_with_input(BenchmarkId::from_parameter(name), &roots, |b, roots| {
            let mut measurer = HeadlessMeasurer::new(LayoutConfig::default());
            b.iter(|| {
                measurer.layout(black_box(roots), &expanded);
                black_box(measurer.container());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_visible_walk, bench_headless_layout, bench_compute_lines, bench_full_pass
);
criterion_main!(benches);
