//! Split long edges into chains of one-layer edges through virtual nodes.
//!
//! Only the first edge of every multiedge bucket is split here; the other members get their
//! chains later from [`edge_paths`](crate::edge_paths) or [`layer_inserter`](crate::layer_inserter).

use crate::database::Database;
use crate::model::{EdgeId, LayerEdge};
use crate::proper_graph::ProperLayeredGraph;
use narwhal_graph::GraphEdge;

/// Chain of `span` layer edges from `source` to `target`; intermediate nodes get fresh ids
/// starting at `next_virtual`.
pub(crate) fn build_chain(
    source: usize,
    target: usize,
    span: usize,
    crossing_weight: i32,
    weight: i32,
    next_virtual: &mut usize,
) -> Vec<LayerEdge> {
    let mut out: Vec<LayerEdge> = Vec::with_capacity(span);
    let mut prev = source;
    for i in 0..span {
        let next = if i + 1 < span {
            let v = *next_virtual;
            *next_virtual += 1;
            v
        } else {
            target
        };
        out.push(LayerEdge::new(prev, next, crossing_weight, weight));
        prev = next;
    }
    out
}

/// Rebuilds the chain of edge `id` for `span` layers and returns its virtual nodes in order.
pub(crate) fn set_chain(
    db: &mut Database,
    id: EdgeId,
    span: usize,
    next_virtual: &mut usize,
) -> Vec<usize> {
    let e = db.edge(id);
    let chain = build_chain(
        e.source(),
        e.target(),
        span,
        e.crossing_weight,
        e.weight,
        next_virtual,
    );
    let virtuals: Vec<usize> = chain.iter().skip(1).map(|le| le.source).collect();
    db.edge_mut(id).layer_edges = chain;
    virtuals
}

/// Result of splitting: the proper graph and the layer of every node, virtual ones included.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub graph: ProperLayeredGraph,
    pub layering: Vec<usize>,
}

/// Splits every skeleton edge spanning more than one layer. `layering` covers the
/// `node_count` input nodes.
pub fn create_proper_layered_graph(
    db: &mut Database,
    layering: &[usize],
    node_count: usize,
) -> Normalized {
    let mut next_virtual = node_count;
    let mut extended: Vec<usize> = layering[..node_count].to_vec();

    let skeleton = db.skeleton_edge_ids();
    let all: Vec<EdgeId> = db.regular_edge_ids().collect();
    for id in all {
        db.edge_mut(id).layer_edges.clear();
    }

    for &id in &skeleton {
        let (s, t) = {
            let e = db.edge(id);
            (e.source(), e.target())
        };
        if layering[s] <= layering[t] {
            debug_assert!(layering[s] == layering[t], "edge points upwards");
            continue;
        }
        let span = layering[s] - layering[t];
        let virtuals = set_chain(db, id, span, &mut next_virtual);
        for (k, &v) in virtuals.iter().enumerate() {
            debug_assert_eq!(v, extended.len());
            extended.push(layering[s] - 1 - k);
        }
    }

    let graph = ProperLayeredGraph::new(
        skeleton.iter().map(|&id| db.edge(id)),
        node_count,
        next_virtual,
    );
    tracing::debug!(
        virtual_nodes = next_virtual - node_count,
        layer_edges = graph.edge_count(),
        "created proper layered graph"
    );
    Normalized {
        graph,
        layering: extended,
    }
}
