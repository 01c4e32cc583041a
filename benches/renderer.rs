use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use partition_chart::config::PartitionConfig;
use partition_chart::data::{Fact, spec_from_fields};
use partition_chart::layout::{FastTextMeasure, PartitionLayout, shape_view_model};
use partition_chart::render::render_svg;
use partition_chart::theme::Theme;
use serde_json::json;
use std::hint::black_box;

/// `groups` × `leaves` facts over two layers with uneven values.
fn facts(groups: usize, leaves: usize) -> Vec<Fact> {
    let mut out = Vec::with_capacity(groups * leaves);
    for g in 0..groups {
        for l in 0..leaves {
            out.push(json!({
                "group": format!("Group {g}"),
                "leaf": format!("Leaf {g}.{l}"),
                "value": ((g * 7 + l * 13) % 29 + 1) as f64,
            }));
        }
    }
    out
}

fn layers() -> Vec<String> {
    vec!["group".to_string(), "leaf".to_string()]
}

fn config(layout: PartitionLayout) -> PartitionConfig {
    PartitionConfig {
        width: 800.0,
        height: 600.0,
        partition_layout: layout,
        ..PartitionConfig::default()
    }
}

const SIZES: [(usize, usize); 3] = [(4, 5), (12, 20), (30, 40)];

fn bench_layout(c: &mut Criterion) {
    let theme = Theme::modern();
    let spec = spec_from_fields("value", &layers(), &theme.palette);
    for layout in [PartitionLayout::Sunburst, PartitionLayout::Treemap] {
        let mut group = c.benchmark_group(format!("layout_{layout:?}").to_lowercase());
        let config = config(layout);
        for (groups, leaves) in SIZES {
            let input = facts(groups, leaves);
            group.bench_with_input(BenchmarkId::from_parameter(input.len()), &input, |b, data| {
                b.iter(|| {
                    let model = shape_view_model(&FastTextMeasure, &config, &spec, black_box(data));
                    black_box(model.quad_view_model.len());
                });
            });
        }
        group.finish();
    }
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let theme = Theme::modern();
    let spec = spec_from_fields("value", &layers(), &theme.palette);
    let config = config(PartitionLayout::Sunburst);
    for (groups, leaves) in SIZES {
        let model = shape_view_model(&FastTextMeasure, &config, &spec, &facts(groups, leaves));
        group.bench_with_input(BenchmarkId::from_parameter(groups * leaves), &model, |b, data| {
            b.iter(|| {
                let svg = render_svg(black_box(data), &theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_render
);
criterion_main!(benches);
