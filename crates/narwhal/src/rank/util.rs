//! Rank helpers (longest-path, slack).

use crate::model::RankEdge;
use narwhal_graph::{BasicGraph, alg};

/// Layers every sink at 0 and every other node as low as its out-edges allow.
pub fn longest_path_layering(node_count: usize, edges: &[RankEdge]) -> Vec<i64> {
    let g = BasicGraph::new(edges.to_vec(), node_count);
    let order = alg::topological_order(&g);
    debug_assert!(order.is_some(), "ranking input must be acyclic");
    let order = order.unwrap_or_else(|| (0..g.node_count()).collect());

    let mut layer = vec![0i64; g.node_count()];
    for &v in order.iter().rev() {
        let mut best = 0i64;
        for e in g.out_edges(v) {
            if e.target != v {
                best = best.max(layer[e.target] + e.separation);
            }
        }
        layer[v] = best;
    }
    layer.truncate(node_count);
    layer
}

/// How much longer than required the edge is; 0 means tight.
pub fn slack(e: &RankEdge, layer: &[i64]) -> i64 {
    layer[e.source] - layer[e.target] - e.separation
}

/// Shifts layers so the minimum is 0.
pub fn normalize(layer: &mut [i64]) {
    let Some(min) = layer.iter().copied().min() else {
        return;
    };
    if min != 0 {
        for l in layer.iter_mut() {
            *l -= min;
        }
    }
}

/// `Σ weight × span` over all edges.
pub fn layering_cost(edges: &[RankEdge], layer: &[i64]) -> i64 {
    edges
        .iter()
        .map(|e| e.weight * (layer[e.source] - layer[e.target]))
        .sum()
}
