//! Gansner–North x assignment.
//!
//! Every layer edge `(u, v)` gets an auxiliary variable `n_e` with zero-separation edges
//! `n_e -> u` and `n_e -> v`; minimizing the weighted span of those pairs pulls `u` and `v`
//! together. Neighbours in a layer are kept apart by separation edges from the right node to
//! the left one. The ranks the network simplex assigns are the x coordinates.

use crate::anchor::Anchor;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::layer_arrays::LayerArrays;
use crate::model::RankEdge;
use crate::proper_graph::ProperLayeredGraph;
use crate::rank::rank_general_graph;
use narwhal_graph::{BasicGraph, IntPair, alg};
use rustc_hash::FxHashMap;

/// Weight multiplier of a layer edge by how many of its ends are virtual.
fn edge_multiplier(graph: &ProperLayeredGraph, source: usize, target: usize) -> i64 {
    match (graph.is_virtual(source), graph.is_virtual(target)) {
        (true, true) => 8,
        (true, false) | (false, true) => 3,
        (false, false) => 1,
    }
}

fn separation(anchors: &[Anchor], right: usize, left: usize, node_sep: f64) -> i64 {
    (anchors[right].left_anchor + anchors[left].right_anchor + node_sep + 1.0) as i64
}

fn find(parent: &mut [usize], mut v: usize) -> usize {
    while parent[v] != v {
        parent[v] = parent[parent[v]];
        v = parent[v];
    }
    v
}

#[derive(Debug, Clone)]
pub struct XLayoutGraph {
    node_count: usize,
    /// Variable of every proper-graph node; glued nodes share one.
    var: Vec<usize>,
    edges: Vec<RankEdge>,
    /// `(right, left)` neighbour pair -> index of its separation edge.
    separation_ix: FxHashMap<IntPair, usize>,
    node_sep: f64,
    dropped_vertical: usize,
}

impl XLayoutGraph {
    /// `vertical_pairs` are nodes that should share an x coordinate.
    pub fn new(
        graph: &ProperLayeredGraph,
        la: &LayerArrays,
        anchors: &[Anchor],
        node_sep: f64,
        vertical_pairs: &[IntPair],
    ) -> Self {
        let n = graph.node_count();
        let (var, dropped_vertical) = glue_vertical_pairs(la, n, vertical_pairs);

        let mut edges: Vec<RankEdge> = Vec::with_capacity(graph.edge_count() * 2);
        let mut next_aux = n;
        for le in graph.edges() {
            let w = i64::from(le.weight) * edge_multiplier(graph, le.source, le.target);
            edges.push(RankEdge::new(next_aux, var[le.source], w, 0));
            edges.push(RankEdge::new(next_aux, var[le.target], w, 0));
            next_aux += 1;
        }

        let mut separation_ix: FxHashMap<IntPair, usize> = FxHashMap::default();
        for layer in la.layers() {
            for pair in layer.windows(2) {
                let (left, right) = (pair[0], pair[1]);
                separation_ix.insert(IntPair::new(right, left), edges.len());
                edges.push(RankEdge::new(
                    var[right],
                    var[left],
                    0,
                    separation(anchors, right, left, node_sep),
                ));
            }
        }

        Self {
            node_count: n,
            var,
            edges,
            separation_ix,
            node_sep,
            dropped_vertical,
        }
    }

    pub fn edges(&self) -> &[RankEdge] {
        &self.edges
    }

    pub fn variable_count(&self) -> usize {
        self.node_count + (self.edges.len() - self.separation_ix.len()) / 2
    }

    /// Auxiliary variable of `v`. Nodes glued by a vertical constraint share one.
    pub fn variable_of(&self, v: usize) -> usize {
        self.var[v]
    }

    /// Vertical pairs that could not be glued without a contradiction.
    pub fn dropped_vertical_pairs(&self) -> usize {
        self.dropped_vertical
    }

    /// Refreshes the separations between `v` and its layer neighbours after its anchor changed.
    pub fn fix_edge_separation(&mut self, la: &LayerArrays, anchors: &[Anchor], v: usize) {
        let layer = la.layer(la.layer_of(v));
        let pos = la.position(v);
        if pos > 0 {
            let left = layer[pos - 1];
            if let Some(&ix) = self.separation_ix.get(&IntPair::new(v, left)) {
                self.edges[ix].separation = separation(anchors, v, left, self.node_sep);
            }
        }
        if let Some(&right) = layer.get(pos + 1) {
            if let Some(&ix) = self.separation_ix.get(&IntPair::new(right, v)) {
                self.edges[ix].separation = separation(anchors, right, v, self.node_sep);
            }
        }
    }

    /// X coordinate of every proper-graph node.
    pub fn solve(&self, cancel: Option<&CancelToken>) -> Result<Vec<f64>> {
        let _span = tracing::debug_span!("gansner_north", variables = self.variable_count()).entered();
        let ranks = rank_general_graph(self.variable_count(), &self.edges, cancel)?;
        Ok((0..self.node_count).map(|v| ranks[self.var[v]] as f64).collect())
    }
}

/// Unions the pairs one at a time, skipping any that would make the in-layer separation order
/// contradictory.
fn glue_vertical_pairs(la: &LayerArrays, n: usize, pairs: &[IntPair]) -> (Vec<usize>, usize) {
    let mut parent: Vec<usize> = (0..n).collect();
    if pairs.is_empty() {
        return (parent, 0);
    }

    let neighbours: Vec<(usize, usize)> = la
        .layers()
        .iter()
        .flat_map(|layer| layer.windows(2).map(|p| (p[1], p[0])))
        .collect();
    let mut dropped = 0usize;
    for p in pairs {
        if p.first >= n || p.second >= n {
            dropped += 1;
            continue;
        }
        let (a, b) = (find(&mut parent, p.first), find(&mut parent, p.second));
        if a == b {
            continue;
        }
        let saved = parent.clone();
        parent[b] = a;
        let sep_edges: Vec<IntPair> = neighbours
            .iter()
            .map(|&(r, l)| IntPair::new(find(&mut parent, r), find(&mut parent, l)))
            .collect();
        if !alg::is_acyclic(&BasicGraph::new(sep_edges, n)) {
            parent = saved;
            dropped += 1;
        }
    }
    if dropped > 0 {
        tracing::warn!(dropped, "ignored vertical alignment constraints that conflict with the ordering");
    }
    let var = (0..n).map(|v| find(&mut parent, v)).collect();
    (var, dropped)
}

/// Sets `x` of every anchor by Gansner–North.
pub fn calculate_x_coordinates(
    graph: &ProperLayeredGraph,
    la: &LayerArrays,
    anchors: &mut [Anchor],
    node_sep: f64,
    vertical_pairs: &[IntPair],
    cancel: Option<&CancelToken>,
) -> Result<XLayoutGraph> {
    let xg = XLayoutGraph::new(graph, la, anchors, node_sep, vertical_pairs);
    let xs = xg.solve(cancel)?;
    for (a, x) in anchors.iter_mut().zip(xs) {
        a.x = x;
    }
    Ok(xg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflicting_vertical_pairs_are_skipped() {
        // Layer 1: [0, 1], layer 0: [2, 3]. Gluing 0-3 and 1-2 would cross.
        let la = LayerArrays::new(vec![1, 1, 0, 0]);
        let pairs = [IntPair::new(0, 3), IntPair::new(1, 2)];
        let (var, dropped) = glue_vertical_pairs(&la, 4, &pairs);
        assert_eq!(dropped, 1);
        assert_eq!(var[0], var[3]);
        assert_ne!(var[1], var[2]);
    }
}
