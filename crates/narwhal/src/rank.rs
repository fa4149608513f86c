//! Layer assignment.

pub mod network_simplex;
pub mod util;

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::RankEdge;
use narwhal_graph::{BasicGraph, alg};

/// Ranks every weakly connected component independently; each component's lowest layer is 0.
pub fn rank_general_graph(
    node_count: usize,
    edges: &[RankEdge],
    cancel: Option<&CancelToken>,
) -> Result<Vec<usize>> {
    let g = BasicGraph::new(edges.to_vec(), node_count);
    let mut layers = vec![0usize; node_count];
    let mut local_ix = vec![usize::MAX; g.node_count()];

    for comp in alg::weak_components(&g) {
        if comp.len() == 1 {
            continue;
        }
        for (i, &v) in comp.iter().enumerate() {
            local_ix[v] = i;
        }
        let mut local_edges: Vec<RankEdge> = Vec::new();
        for &v in &comp {
            for e in g.out_edges(v) {
                local_edges.push(RankEdge::new(
                    local_ix[e.source],
                    local_ix[e.target],
                    e.weight,
                    e.separation,
                ));
            }
        }
        let ranks = network_simplex::network_simplex(comp.len(), &local_edges, cancel)?;
        for (i, &v) in comp.iter().enumerate() {
            if v < node_count {
                layers[v] = ranks[i].max(0) as usize;
            }
        }
    }
    Ok(layers)
}
