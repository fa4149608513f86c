//! The proper layered graph: every edge joins adjacent layers.

use crate::model::{IntEdge, LayerEdge};
use narwhal_graph::BasicGraph;

/// One-layer edges over original nodes `0..first_virtual` and virtual nodes after them.
///
/// Every virtual node has exactly one in-edge and one out-edge.
#[derive(Debug, Clone, Default)]
pub struct ProperLayeredGraph {
    first_virtual: usize,
    graph: BasicGraph<LayerEdge>,
}

impl ProperLayeredGraph {
    pub fn new<'a>(
        edges: impl IntoIterator<Item = &'a IntEdge>,
        first_virtual: usize,
        node_count: usize,
    ) -> Self {
        let layer_edges: Vec<LayerEdge> = edges
            .into_iter()
            .flat_map(|e| e.layer_edges.iter().copied())
            .collect();
        Self::from_layer_edges(layer_edges, first_virtual, node_count)
    }

    pub fn from_layer_edges(
        layer_edges: Vec<LayerEdge>,
        first_virtual: usize,
        node_count: usize,
    ) -> Self {
        Self {
            first_virtual,
            graph: BasicGraph::new(layer_edges, node_count.max(first_virtual)),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn first_virtual_node(&self) -> usize {
        self.first_virtual
    }

    pub fn is_virtual(&self, v: usize) -> bool {
        v >= self.first_virtual
    }

    pub fn edges(&self) -> &[LayerEdge] {
        self.graph.edges()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn in_edges(&self, v: usize) -> impl Iterator<Item = &LayerEdge> + '_ {
        self.graph.in_edges(v)
    }

    pub fn out_edges(&self, v: usize) -> impl Iterator<Item = &LayerEdge> + '_ {
        self.graph.out_edges(v)
    }

    pub fn in_degree(&self, v: usize) -> usize {
        self.graph.in_degree(v)
    }

    pub fn out_degree(&self, v: usize) -> usize {
        self.graph.out_degree(v)
    }

    pub fn predecessors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.predecessors(v)
    }

    pub fn successors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.successors(v)
    }

    pub fn in_edge_of_virtual_node(&self, v: usize) -> Option<&LayerEdge> {
        if !self.is_virtual(v) {
            return None;
        }
        self.graph.in_edges(v).next()
    }

    pub fn out_edge_of_virtual_node(&self, v: usize) -> Option<&LayerEdge> {
        if !self.is_virtual(v) {
            return None;
        }
        self.graph.out_edges(v).next()
    }

    /// The same graph with every edge flipped; pairs with
    /// [`LayerArrays::reversed_clone`](crate::layer_arrays::LayerArrays::reversed_clone).
    pub fn reversed_clone(&self) -> Self {
        Self {
            first_virtual: self.first_virtual,
            graph: self.graph.map_edges(|e| e.reversed()),
        }
    }

    pub fn has_crossing_weights(&self) -> bool {
        self.graph.edges().iter().any(|e| e.crossing_weight != 1)
    }
}
