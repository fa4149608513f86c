//! Layer doubling.
//!
//! Every layer `i` becomes layer `2i` and a new layer is slid between each pair, so that every
//! non-flat edge, even one spanning a single layer, gets a middle virtual node where a label or
//! a multiedge fan can sit. Even layers keep the existing order; odd layers are sorted by the
//! positions of their neighbours.

use crate::database::Database;
use crate::layer_arrays::LayerArrays;
use crate::model::EdgeId;
use crate::normalize::set_chain;
use crate::proper_graph::ProperLayeredGraph;
use narwhal_graph::{GraphEdge, IntPair};
use rustc_hash::FxHashMap;

/// Doubles the layering described by `la` (over the current proper graph) and rebuilds
/// every chain. Empty layers are dropped from the result.
pub fn insert_layers(
    db: &mut Database,
    la: &LayerArrays,
    node_count: usize,
) -> (ProperLayeredGraph, LayerArrays) {
    let buckets: Vec<(IntPair, Vec<EdgeId>)> = db
        .buckets()
        .filter(|(p, _)| !p.is_loop())
        .map(|(p, ids)| (p, ids.to_vec()))
        .collect();

    // Old virtual node of a bucket's first edge -> (bucket, index in the old chain).
    let mut old_virtual: FxHashMap<usize, (IntPair, usize)> = FxHashMap::default();
    for (pair, ids) in &buckets {
        let Some(&first) = ids.first() else {
            continue;
        };
        let e = db.edge(first);
        for (k, le) in e.layer_edges.iter().enumerate() {
            if le.target != e.target() {
                old_virtual.insert(le.target, (*pair, k));
            }
        }
    }

    let mut next_virtual = node_count;
    let mut new_y: Vec<usize> = (0..node_count).map(|v| 2 * la.layer_of(v)).collect();
    for (pair, ids) in &buckets {
        let (ys, yt) = (la.layer_of(pair.first), la.layer_of(pair.second));
        if ys <= yt {
            for &id in ids {
                db.edge_mut(id).layer_edges.clear();
            }
            continue;
        }
        let span = 2 * (ys - yt);
        let top = 2 * ys;
        for &id in ids {
            let virtuals = set_chain(db, id, span, &mut next_virtual);
            for (j, &v) in virtuals.iter().enumerate() {
                debug_assert_eq!(v, new_y.len());
                new_y.push(top - 1 - j);
            }
        }
    }

    let layer_count = (2 * la.layer_count()).saturating_sub(1);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];

    // Even layers: the old order, each old virtual node replaced by the matching nodes of its
    // whole bucket.
    for (i, old) in la.layers().iter().enumerate() {
        let layer = &mut layers[2 * i];
        for &v in old {
            if v < node_count {
                layer.push(v);
                continue;
            }
            let Some(&(pair, k)) = old_virtual.get(&v) else {
                continue;
            };
            for &id in db.bucket(pair) {
                if let Some(le) = db.edge(id).layer_edges.get(2 * k + 1) {
                    layer.push(le.target);
                }
            }
        }
    }

    let mut position = vec![0usize; next_virtual];
    for layer in layers.iter().step_by(2) {
        for (x, &v) in layer.iter().enumerate() {
            position[v] = x;
        }
    }

    // Odd layers: fresh virtual nodes ordered by the positions of their two neighbours.
    let graph = ProperLayeredGraph::new(
        db.regular_edge_ids().map(|id| db.edge(id)),
        node_count,
        next_virtual,
    );
    for v in node_count..next_virtual {
        if new_y[v] % 2 == 1 {
            layers[new_y[v]].push(v);
        }
    }
    for layer in layers.iter_mut().skip(1).step_by(2) {
        layer.sort_by_key(|&v| {
            let pred = graph.predecessors(v).next().map_or(0, |u| position[u]);
            let succ = graph.successors(v).next().map_or(0, |u| position[u]);
            pred + succ
        });
    }

    let mut nla = LayerArrays::from_layers(layers, next_virtual);
    nla.drop_empty_layers();
    db.register_multiple_middles();
    tracing::debug!(
        layers = nla.layer_count(),
        virtual_nodes = next_virtual - node_count,
        "doubled layers"
    );
    (graph, nla)
}
