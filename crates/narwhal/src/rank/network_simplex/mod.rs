//! Network simplex ranker (Gansner et al.).
//!
//! Solves `min Σ weight × (layer[source] - layer[target])` subject to
//! `layer[source] - layer[target] >= separation` on one connected, acyclic problem.
//!
//! Internally an edge runs from its lower end (`v`, the tail) to its upper end (`w`, the
//! head), so `rank[w] - rank[v] >= minlen` and the rank is the layer.

use super::util;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::RankEdge;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy)]
struct NsEdge {
    v: usize,
    w: usize,
    weight: i64,
    minlen: i64,
}

#[derive(Debug, Clone, Copy)]
struct DfsFrame {
    v: usize,
    low: usize,
    next_neighbor: usize,
}

#[derive(Debug, Clone)]
struct TreeState {
    edges: Vec<NsEdge>,
    /// Node -> incident edge indices, both directions.
    incident: Vec<Vec<usize>>,
    rank: Vec<i64>,
    root: usize,

    tree_edge: Vec<bool>,
    tree_adj: Vec<Vec<usize>>,
    parent: Vec<Option<usize>>,
    parent_edge: Vec<usize>,
    low: Vec<usize>,
    lim: Vec<usize>,
    /// Cut value of the tree edge between a node and its parent (the root has 0).
    cut: Vec<i64>,

    // Reused scratch buffers.
    postorder: Vec<usize>,
    dfs_stack: Vec<DfsFrame>,
}

impl TreeState {
    fn new(node_count: usize, edges: Vec<NsEdge>, rank: Vec<i64>) -> Self {
        let mut incident: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (ix, e) in edges.iter().enumerate() {
            incident[e.v].push(ix);
            incident[e.w].push(ix);
        }
        let edge_count = edges.len();
        Self {
            edges,
            incident,
            rank,
            root: 0,
            tree_edge: vec![false; edge_count],
            tree_adj: vec![Vec::new(); node_count],
            parent: vec![None; node_count],
            parent_edge: vec![usize::MAX; node_count],
            low: vec![0; node_count],
            lim: vec![0; node_count],
            cut: vec![0; node_count],
            postorder: Vec::with_capacity(node_count),
            dfs_stack: Vec::new(),
        }
    }

    fn node_count(&self) -> usize {
        self.rank.len()
    }

    fn slack(&self, ix: usize) -> i64 {
        let e = self.edges[ix];
        self.rank[e.w] - self.rank[e.v] - e.minlen
    }

    fn other_end(&self, ix: usize, v: usize) -> usize {
        let e = self.edges[ix];
        if e.v == v { e.w } else { e.v }
    }

    /// Grows a spanning tree of tight edges, shifting the tree's ranks to tighten the
    /// cheapest crossing edge whenever growth stalls.
    fn feasible_tree(&mut self) {
        let n = self.node_count();
        let mut in_tree = vec![false; n];
        let mut tree_nodes: Vec<usize> = vec![self.root];
        in_tree[self.root] = true;

        loop {
            let mut stack: Vec<usize> = tree_nodes.clone();
            while let Some(v) = stack.pop() {
                for k in 0..self.incident[v].len() {
                    let ix = self.incident[v][k];
                    let w = self.other_end(ix, v);
                    if !in_tree[w] && self.slack(ix) == 0 {
                        in_tree[w] = true;
                        self.tree_edge[ix] = true;
                        tree_nodes.push(w);
                        stack.push(w);
                    }
                }
            }
            if tree_nodes.len() >= n {
                break;
            }

            let mut best: Option<(i64, usize)> = None;
            for ix in 0..self.edges.len() {
                let e = self.edges[ix];
                if in_tree[e.v] == in_tree[e.w] {
                    continue;
                }
                let s = self.slack(ix);
                if best.is_none_or(|(bs, _)| s < bs) {
                    best = Some((s, ix));
                }
            }
            let Some((slack, ix)) = best else {
                debug_assert!(false, "network simplex input must be connected");
                break;
            };
            let delta = if in_tree[self.edges[ix].v] { slack } else { -slack };
            for &v in &tree_nodes {
                self.rank[v] += delta;
            }
        }
    }

    fn rebuild_tree_adjacency(&mut self) {
        for adj in &mut self.tree_adj {
            adj.clear();
        }
        for (ix, e) in self.edges.iter().enumerate() {
            if self.tree_edge[ix] {
                self.tree_adj[e.v].push(ix);
                self.tree_adj[e.w].push(ix);
            }
        }
    }

    fn init_low_lim_values(&mut self) {
        self.rebuild_tree_adjacency();
        self.parent.fill(None);
        self.parent_edge.fill(usize::MAX);
        self.postorder.clear();
        self.dfs_stack.clear();

        let mut next_lim: usize = 1;
        self.dfs_stack.push(DfsFrame {
            v: self.root,
            low: next_lim,
            next_neighbor: 0,
        });

        while let Some(frame) = self.dfs_stack.last_mut() {
            let v = frame.v;
            let Some(&ix) = self.tree_adj[v].get(frame.next_neighbor) else {
                let low = frame.low;
                self.dfs_stack.pop();
                self.low[v] = low;
                self.lim[v] = next_lim;
                next_lim += 1;
                self.postorder.push(v);
                continue;
            };
            frame.next_neighbor += 1;
            if ix == self.parent_edge[v] {
                continue;
            }
            let w = self.other_end(ix, v);
            self.parent[w] = Some(v);
            self.parent_edge[w] = ix;
            self.dfs_stack.push(DfsFrame {
                v: w,
                low: next_lim,
                next_neighbor: 0,
            });
        }
    }

    fn init_cut_values(&mut self) {
        self.cut.fill(0);
        for k in 0..self.postorder.len() {
            let child = self.postorder[k];
            if self.parent[child].is_some() {
                self.cut[child] = self.calc_cut_value(child);
            }
        }
    }

    fn calc_cut_value(&self, child: usize) -> i64 {
        let pe = self.parent_edge[child];
        let child_is_tail = self.edges[pe].v == child;
        let mut cut = self.edges[pe].weight;

        for &ix in &self.incident[child] {
            if ix == pe {
                continue;
            }
            let e = self.edges[ix];
            let is_out = e.v == child;
            let other = if is_out { e.w } else { e.v };
            let points_to_head = is_out == child_is_tail;
            cut += if points_to_head { e.weight } else { -e.weight };

            if self.tree_edge[ix] && self.parent_edge[other] == ix {
                let other_cut = self.cut[other];
                cut += if points_to_head { -other_cut } else { other_cut };
            }
        }
        cut
    }

    /// Tree edge with the most negative cut value, as the child node owning it.
    fn leave_edge(&self) -> Option<usize> {
        let mut best: Option<(i64, usize, usize)> = None;
        for v in 0..self.node_count() {
            if self.parent[v].is_none() || self.cut[v] >= 0 {
                continue;
            }
            let key = (self.cut[v], self.parent_edge[v]);
            if best.is_none_or(|(c, e, _)| key < (c, e)) {
                best = Some((key.0, key.1, v));
            }
        }
        best.map(|(_, _, v)| v)
    }

    fn is_descendant(&self, v: usize, root: usize) -> bool {
        self.low[root] <= self.lim[v] && self.lim[v] <= self.lim[root]
    }

    fn enter_edge(&self, leaving: usize) -> Option<usize> {
        let e = self.edges[leaving];
        let (tail, flip) = if self.lim[e.v] > self.lim[e.w] {
            (e.w, true)
        } else {
            (e.v, false)
        };

        let mut best: Option<(i64, usize)> = None;
        for ix in 0..self.edges.len() {
            let f = self.edges[ix];
            if flip != self.is_descendant(f.v, tail) || flip == self.is_descendant(f.w, tail) {
                continue;
            }
            let s = self.slack(ix);
            if best.is_none_or(|(bs, _)| s < bs) {
                best = Some((s, ix));
            }
        }
        best.map(|(_, ix)| ix)
    }

    fn update_ranks(&mut self) {
        for k in (0..self.postorder.len()).rev() {
            let v = self.postorder[k];
            let Some(p) = self.parent[v] else {
                continue;
            };
            let e = self.edges[self.parent_edge[v]];
            self.rank[v] = if e.v == v {
                self.rank[p] - e.minlen
            } else {
                self.rank[p] + e.minlen
            };
        }
    }

    fn exchange_edges(&mut self, leaving: usize, entering: usize) {
        self.tree_edge[leaving] = false;
        self.tree_edge[entering] = true;
        self.init_low_lim_values();
        self.init_cut_values();
        self.update_ranks();
    }
}

/// Merges parallel edges (weights summed, separation maxed) and drops self loops.
fn simple_edges(edges: &[RankEdge]) -> Vec<NsEdge> {
    let mut out: Vec<NsEdge> = Vec::with_capacity(edges.len());
    let mut by_pair: FxHashMap<(usize, usize), usize> = FxHashMap::default();
    for e in edges {
        if e.source == e.target {
            continue;
        }
        match by_pair.get(&(e.target, e.source)) {
            Some(&ix) => {
                out[ix].weight += e.weight;
                out[ix].minlen = out[ix].minlen.max(e.separation);
            }
            None => {
                by_pair.insert((e.target, e.source), out.len());
                out.push(NsEdge {
                    v: e.target,
                    w: e.source,
                    weight: e.weight,
                    minlen: e.separation,
                });
            }
        }
    }
    out
}

/// Optimal layering of one weakly connected acyclic problem, shifted so the minimum layer is 0.
pub fn network_simplex(
    node_count: usize,
    edges: &[RankEdge],
    cancel: Option<&CancelToken>,
) -> Result<Vec<i64>> {
    if node_count <= 1 || edges.is_empty() {
        return Ok(vec![0; node_count]);
    }

    let initial = util::longest_path_layering(node_count, edges);
    let mut st = TreeState::new(node_count, simple_edges(edges), initial);
    st.feasible_tree();
    st.init_low_lim_values();
    st.init_cut_values();

    let max_iterations = 1_000 + 10 * st.edges.len() * st.node_count().max(1).ilog2() as usize;
    let mut iterations = 0usize;
    while let Some(child) = st.leave_edge() {
        if let Some(c) = cancel {
            c.check()?;
        }
        if iterations >= max_iterations {
            tracing::warn!(
                iterations,
                "network simplex hit the iteration cap; keeping a feasible layering"
            );
            break;
        }
        let leaving = st.parent_edge[child];
        let Some(entering) = st.enter_edge(leaving) else {
            break;
        };
        st.exchange_edges(leaving, entering);
        iterations += 1;
    }
    tracing::trace!(iterations, nodes = node_count, "network simplex done");

    let mut rank = st.rank;
    util::normalize(&mut rank);
    Ok(rank)
}
