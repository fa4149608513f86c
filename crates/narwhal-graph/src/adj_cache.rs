//! Compact adjacency for [`BasicGraph`](crate::BasicGraph).
//!
//! Offsets are prefix sums over node degrees, so `out_edges(v)` / `in_edges(v)` are slice
//! lookups instead of O(E) scans.

use crate::GraphEdge;

#[derive(Debug, Clone, Default)]
pub(crate) struct DirectedAdjCache {
    out_offsets: Vec<usize>,
    out_edges: Vec<usize>,
    in_offsets: Vec<usize>,
    in_edges: Vec<usize>,
}

impl DirectedAdjCache {
    pub(crate) fn build<E: GraphEdge>(node_count: usize, edges: &[E]) -> Self {
        let mut out_offsets = vec![0usize; node_count + 1];
        let mut in_offsets = vec![0usize; node_count + 1];
        for e in edges {
            out_offsets[e.source() + 1] += 1;
            in_offsets[e.target() + 1] += 1;
        }
        for v in 0..node_count {
            out_offsets[v + 1] += out_offsets[v];
            in_offsets[v + 1] += in_offsets[v];
        }

        // Edge indices are written in ascending order, so every slice keeps insertion order.
        let mut out_fill = out_offsets.clone();
        let mut in_fill = in_offsets.clone();
        let mut out_edges = vec![0usize; edges.len()];
        let mut in_edges = vec![0usize; edges.len()];
        for (ix, e) in edges.iter().enumerate() {
            let s = e.source();
            let t = e.target();
            out_edges[out_fill[s]] = ix;
            out_fill[s] += 1;
            in_edges[in_fill[t]] = ix;
            in_fill[t] += 1;
        }

        Self {
            out_offsets,
            out_edges,
            in_offsets,
            in_edges,
        }
    }

    pub(crate) fn out_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.out_offsets[v_ix];
        let end = self.out_offsets[v_ix + 1];
        &self.out_edges[start..end]
    }

    pub(crate) fn in_edges(&self, v_ix: usize) -> &[usize] {
        let start = self.in_offsets[v_ix];
        let end = self.in_offsets[v_ix + 1];
        &self.in_edges[start..end]
    }
}
