//! Benchmark tests for treemap layout operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marketmap_core::{Dataset, HeatmapConfig, Item, Quote, Rect, ViewKind};
use marketmap_layout::{compute_layout, compute_nested_layout, Heatmap, LayoutCache, NestedOptions};

/// Power-law weights, shaped like index constituents.
fn constituents(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item::leaf(&format!("T{i}"), 3.0e12 / ((i + 1) as f64).powf(1.2)))
        .collect()
}

fn sectors(sectors: usize, per_sector: usize) -> Vec<Item> {
    (0..sectors)
        .map(|s| {
            let children = (0..per_sector)
                .map(|i| {
                    Item::Leaf(
                        Quote::new(&format!("S{s}T{i}"), 1.0e9 / (i + 1) as f64)
                            .with_change((i as f64 % 7.0) - 3.0, 0.0),
                    )
                })
                .collect();
            Item::group_of(&format!("S{s}"), children)
        })
        .collect()
}

fn bench_squarify_20(c: &mut Criterion) {
    let items = constituents(20);
    c.bench_function("squarify_20_items", |b| {
        b.iter(|| compute_layout(black_box(&items), black_box(1000.0), black_box(600.0)))
    });
}

fn bench_squarify_500(c: &mut Criterion) {
    let items = constituents(500);
    c.bench_function("squarify_500_items", |b| {
        b.iter(|| compute_layout(black_box(&items), black_box(1920.0), black_box(1080.0)))
    });
}

fn bench_squarify_5000(c: &mut Criterion) {
    let items = constituents(5_000);
    c.bench_function("squarify_5000_items", |b| {
        b.iter(|| compute_layout(black_box(&items), black_box(1920.0), black_box(1080.0)))
    });
}

fn bench_nested_11_sectors(c: &mut Criterion) {
    let items = sectors(11, 40);
    let options = NestedOptions::depth(1).with_padding(2.0).with_header(14.0);
    c.bench_function("nested_11_sectors_40_each", |b| {
        b.iter(|| {
            compute_nested_layout(
                black_box(&items),
                black_box(1920.0),
                black_box(1080.0),
                black_box(&options),
            )
        })
    });
}

fn bench_cached_layout(c: &mut Criterion) {
    let items = constituents(500);
    let bounds = Rect::new(0.0, 0.0, 1920.0, 1080.0);
    let mut cache = LayoutCache::new();
    c.bench_function("cached_500_items", |b| {
        b.iter(|| cache.layout(black_box(&items), black_box(bounds)).len())
    });
}

fn bench_heatmap_frame(c: &mut Criterion) {
    let dataset = Dataset::new("Market", ViewKind::Sectors, sectors(11, 40));
    let config = HeatmapConfig {
        max_depth: 1,
        ..HeatmapConfig::default()
    };
    let mut map = Heatmap::new(dataset, config);
    c.bench_function("heatmap_frame_nested", |b| b.iter(|| map.tiles().len()));
}

criterion_group!(
    benches,
    bench_squarify_20,
    bench_squarify_500,
    bench_squarify_5000,
    bench_nested_11_sectors,
    bench_cached_layout,
    bench_heatmap_frame,
);
criterion_main!(benches);
