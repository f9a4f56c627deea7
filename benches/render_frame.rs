//! Frame render benchmarks over the demo scenes.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;

use glyphheat::manifest::load_and_validate_manifest;
use glyphheat::renderer::HeatmapRenderer;

fn bench_render_frame(c: &mut Criterion) {
    let manifest_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/heatmap_classic.yaml");
    let manifest = load_and_validate_manifest(&manifest_path).expect("load manifest");

    let mut group = c.benchmark_group("render_frame");
    group.sample_size(50);

    group.bench_function("classic_48x24_frame0", |b| {
        b.iter(|| {
            let mut renderer =
                HeatmapRenderer::from_manifest(&manifest).expect("create renderer");
            black_box(renderer.render_frame(0))
        });
    });

    let islands_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/heatmap_islands.yaml");
    let islands = load_and_validate_manifest(&islands_path).expect("load manifest");
    group.bench_function("islands_48x24_frame0", |b| {
        b.iter(|| {
            let mut renderer = HeatmapRenderer::from_manifest(&islands).expect("create renderer");
            black_box(renderer.render_frame(0))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_render_frame);
criterion_main!(benches);
