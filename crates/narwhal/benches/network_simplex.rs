use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use narwhal::model::RankEdge;
use narwhal::rank::network_simplex::network_simplex;
use std::hint::black_box;
use std::time::Duration;

fn build_dag_edges(node_count: usize, fanout: usize) -> Vec<RankEdge> {
    let mut edges = Vec::new();

    // A spine to guarantee connectivity.
    for i in 0..node_count.saturating_sub(1) {
        edges.push(RankEdge::new(i, i + 1, 2, 1));
    }

    // Extra forward edges to create slack.
    for i in 0..node_count {
        for k in 2..=(fanout + 1) {
            let to = i + k;
            if to >= node_count {
                break;
            }
            edges.push(RankEdge::new(i, to, 1, 1));
        }

        let to = i + 10;
        if to < node_count {
            edges.push(RankEdge::new(i, to, 1, 2));
        }
    }

    edges
}

fn bench_network_simplex(c: &mut Criterion) {
    let mut group = c.benchmark_group("network_simplex");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("dag_50_f3", 50usize, 3usize),
        ("dag_200_f4", 200usize, 4usize),
        ("dag_400_f4", 400usize, 4usize),
    ];

    for (name, nodes, fanout) in cases {
        let edges = build_dag_edges(nodes, fanout);
        group.bench_with_input(
            BenchmarkId::new("rank::network_simplex", name),
            &edges,
            |b, edges| {
                b.iter(|| {
                    let layers = network_simplex(nodes, black_box(edges), None);
                    black_box(layers.map(|l| l.len()).unwrap_or_default());
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_network_simplex);
criterion_main!(benches);
