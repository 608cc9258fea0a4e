use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use markdown_layout_engine::layout::{LayoutCache, LayoutSolver, Theme};
use markdown_layout_engine::parsing::parse_document;
use markdown_layout_engine::plugins::default_plugins;
mod common;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let plain = common::generate_markdown_content(100);
    group.bench_function("plain_no_plugins", |b| {
        b.iter(|| parse_document(std::hint::black_box(&plain), &[]));
    });

    let extended = common::generate_extended_content(50);
    let plugins = default_plugins();
    group.bench_function("extended_default_plugins", |b| {
        b.iter(|| parse_document(std::hint::black_box(&extended), &plugins));
    });

    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.sample_size(10);

    let rt = runtime();
    let doc = parse_document(&common::generate_large_document(), &default_plugins());

    group.bench_function("cold_cache", |b| {
        b.iter(|| {
            let solver =
                LayoutSolver::new(Theme::default()).with_cache(Arc::new(LayoutCache::default()));
            rt.block_on(solver.solve(&doc, 640.0))
        });
    });

    let warm = LayoutSolver::new(Theme::default());
    rt.block_on(warm.solve(&doc, 640.0));
    group.bench_function("warm_cache", |b| {
        b.iter(|| rt.block_on(warm.solve(&doc, 640.0)));
    });

    group.bench_function("resize_sweep", |b| {
        let solver = LayoutSolver::new(Theme::default());
        b.iter(|| {
            for width in [320.0, 480.0, 640.0, 800.0] {
                rt.block_on(solver.solve(&doc, width));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_solve);
criterion_main!(benches);
