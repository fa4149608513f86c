//! Dense integer graphs for layered layout.
//!
//! Nodes are plain indices in `0..node_count`; edges are any type implementing [`GraphEdge`].

mod adj_cache;
pub mod alg;

use adj_cache::DirectedAdjCache;
use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;

/// An ordered pair of node indices, used as a multiedge key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IntPair {
    pub first: usize,
    pub second: usize,
}

impl IntPair {
    pub const fn new(first: usize, second: usize) -> Self {
        Self { first, second }
    }

    pub const fn reversed(self) -> Self {
        Self {
            first: self.second,
            second: self.first,
        }
    }

    pub const fn is_loop(self) -> bool {
        self.first == self.second
    }
}

impl From<(usize, usize)> for IntPair {
    fn from((first, second): (usize, usize)) -> Self {
        Self { first, second }
    }
}

/// A directed edge between two dense node indices.
pub trait GraphEdge {
    fn source(&self) -> usize;
    fn target(&self) -> usize;

    fn pair(&self) -> IntPair {
        IntPair::new(self.source(), self.target())
    }

    fn is_self_loop(&self) -> bool {
        self.source() == self.target()
    }
}

impl GraphEdge for IntPair {
    fn source(&self) -> usize {
        self.first
    }

    fn target(&self) -> usize {
        self.second
    }
}

impl GraphEdge for (usize, usize) {
    fn source(&self) -> usize {
        self.0
    }

    fn target(&self) -> usize {
        self.1
    }
}

impl<E: GraphEdge + ?Sized> GraphEdge for &E {
    fn source(&self) -> usize {
        (**self).source()
    }

    fn target(&self) -> usize {
        (**self).target()
    }
}

/// An immutable directed multigraph with compact in/out adjacency.
///
/// `node_count` is widened to cover every edge endpoint, so a graph built from edges alone
/// is always well formed.
#[derive(Debug, Clone)]
pub struct BasicGraph<E> {
    edges: Vec<E>,
    node_count: usize,
    adj: DirectedAdjCache,
}

impl<E: GraphEdge> Default for BasicGraph<E> {
    fn default() -> Self {
        Self::new(Vec::new(), 0)
    }
}

impl<E: GraphEdge> BasicGraph<E> {
    pub fn new(edges: Vec<E>, node_count: usize) -> Self {
        let node_count = edges
            .iter()
            .map(|e| e.source().max(e.target()) + 1)
            .fold(node_count, usize::max);
        let adj = DirectedAdjCache::build(node_count, &edges);
        Self {
            edges,
            node_count,
            adj,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[E] {
        &self.edges
    }

    pub fn edge(&self, ix: usize) -> &E {
        &self.edges[ix]
    }

    pub fn into_edges(self) -> Vec<E> {
        self.edges
    }

    pub fn out_edge_ixs(&self, v: usize) -> &[usize] {
        self.adj.out_edges(v)
    }

    pub fn in_edge_ixs(&self, v: usize) -> &[usize] {
        self.adj.in_edges(v)
    }

    pub fn out_edges(&self, v: usize) -> impl Iterator<Item = &E> + '_ {
        self.adj.out_edges(v).iter().map(|&ix| &self.edges[ix])
    }

    pub fn in_edges(&self, v: usize) -> impl Iterator<Item = &E> + '_ {
        self.adj.in_edges(v).iter().map(|&ix| &self.edges[ix])
    }

    pub fn out_degree(&self, v: usize) -> usize {
        self.adj.out_edges(v).len()
    }

    pub fn in_degree(&self, v: usize) -> usize {
        self.adj.in_edges(v).len()
    }

    pub fn successors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.out_edges(v).map(GraphEdge::target)
    }

    pub fn predecessors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.in_edges(v).map(GraphEdge::source)
    }

    /// Index of the first edge from `source` to `target`, if any.
    pub fn find_edge(&self, source: usize, target: usize) -> Option<usize> {
        if source >= self.node_count {
            return None;
        }
        self.adj
            .out_edges(source)
            .iter()
            .copied()
            .find(|&ix| self.edges[ix].target() == target)
    }

    /// Groups edge indices by `(source, target)`, keeping insertion order inside each group.
    pub fn edge_ixs_by_pair(&self) -> HashMap<IntPair, Vec<usize>, FxBuildHasher> {
        let mut out: HashMap<IntPair, Vec<usize>, FxBuildHasher> =
            HashMap::with_capacity_and_hasher(self.edges.len(), FxBuildHasher);
        for (ix, e) in self.edges.iter().enumerate() {
            out.entry(e.pair()).or_default().push(ix);
        }
        out
    }

    /// Maps every edge through `f`, keeping the node count.
    pub fn map_edges<F, T>(&self, f: F) -> BasicGraph<T>
    where
        F: FnMut(&E) -> T,
        T: GraphEdge,
    {
        BasicGraph::new(self.edges.iter().map(f).collect(), self.node_count)
    }
}
