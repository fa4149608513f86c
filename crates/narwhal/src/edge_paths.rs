//! Give every member of a multiedge bucket its own path next to the bucket's first edge.

use crate::database::Database;
use crate::layer_arrays::LayerArrays;
use crate::model::EdgeId;
use crate::normalize::set_chain;
use crate::proper_graph::ProperLayeredGraph;
use narwhal_graph::{GraphEdge, IntPair};
use rustc_hash::FxHashMap;

/// Adds paths for the remaining members of every multiedge bucket. The new virtual nodes are
/// placed right after the first edge's virtual node on each layer, in bucket order.
pub fn insert_paths(
    db: &mut Database,
    proper: &ProperLayeredGraph,
    la: &LayerArrays,
    node_count: usize,
) -> (ProperLayeredGraph, LayerArrays) {
    let old_total = proper.node_count();
    let mut next_virtual = old_total;
    let mut new_y: Vec<usize> = la.y().to_vec();

    // Old skeleton virtual node -> (bucket, index in the chain).
    let mut skeleton_virtual: FxHashMap<usize, (IntPair, usize)> = FxHashMap::default();
    let buckets: Vec<(IntPair, Vec<EdgeId>)> = db
        .buckets()
        .filter(|(p, _)| !p.is_loop())
        .map(|(p, ids)| (p, ids.to_vec()))
        .collect();

    for (pair, ids) in &buckets {
        let Some((&first, rest)) = ids.split_first() else {
            continue;
        };
        let span = db.edge(first).layer_span();
        for (k, le) in db.edge(first).layer_edges.iter().enumerate() {
            if k + 1 < span {
                skeleton_virtual.insert(le.target, (*pair, k));
            }
        }
        if span == 0 {
            continue;
        }
        let top = la.layer_of(pair.first);
        for &id in rest {
            let virtuals = set_chain(db, id, span, &mut next_virtual);
            for (k, &v) in virtuals.iter().enumerate() {
                debug_assert_eq!(v, new_y.len());
                new_y.push(top - 1 - k);
            }
        }
    }
    db.register_multiple_middles();

    let mut layers: Vec<Vec<usize>> = Vec::with_capacity(la.layer_count());
    for old in la.layers() {
        let mut layer: Vec<usize> = Vec::with_capacity(old.len());
        for &v in old {
            let Some(&(pair, k)) = skeleton_virtual.get(&v) else {
                layer.push(v);
                continue;
            };
            for &id in db.bucket(pair) {
                let e = db.edge(id);
                if e.layer_span() > k + 1 {
                    layer.push(e.layer_edges[k].target);
                }
            }
        }
        layers.push(layer);
    }

    let nla = LayerArrays::from_layers(layers, next_virtual);
    debug_assert!(nla.y() == new_y.as_slice());
    let graph = ProperLayeredGraph::new(
        db.regular_edge_ids().map(|id| db.edge(id)),
        node_count,
        next_virtual,
    );
    tracing::debug!(
        added = next_virtual - old_total,
        "inserted multiedge paths"
    );
    (graph, nla)
}
