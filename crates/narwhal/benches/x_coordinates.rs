use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::{CancelToken, Graph, LayeredLayout, LayoutSettings};
use std::hint::black_box;
use std::time::Duration;

/// A layered DAG with `width` nodes per rank and a few long edges.
fn build_graph(ranks: usize, width: usize) -> Graph {
    let mut g = Graph::new();
    for i in 0..ranks * width {
        g.add_node(20.0 + (i % 7) as f64 * 6.0, 20.0);
    }
    for r in 0..ranks.saturating_sub(1) {
        for i in 0..width {
            let v = r * width + i;
            g.connect(v, (r + 1) * width + i);
            g.connect(v, (r + 1) * width + (i * 3 + 1) % width);
            if r + 3 < ranks && i % 4 == 0 {
                g.connect(v, (r + 3) * width + (width - 1 - i));
            }
        }
    }
    g
}

fn bench_x_coordinates(c: &mut Criterion) {
    let mut group = c.benchmark_group("x_coordinates");
    group.measurement_time(Duration::from_secs(10));

    let cases = [("grid_8x6", 8usize, 6usize), ("grid_16x12", 16, 12)];

    for (name, ranks, width) in cases {
        let g = build_graph(ranks, width);
        // Threshold 0 always picks Brandes–Köpf, `usize::MAX` always network simplex.
        for (solver, threshold) in [("brandes_kopf", 0usize), ("network_simplex", usize::MAX)] {
            let settings = LayoutSettings {
                brandes_threshold: threshold,
                ..LayoutSettings::default()
            };
            group.bench_with_input(BenchmarkId::new(solver, name), &g, |b, g| {
                b.iter_batched(
                    || LayeredLayout::new(g, settings.clone()),
                    |layout| {
                        if let Ok(mut layout) = layout {
                            let r = layout.run(&CancelToken::new());
                            black_box(r.map(|r| r.centers.len()).unwrap_or_default());
                        }
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_x_coordinates);
criterion_main!(benches);
