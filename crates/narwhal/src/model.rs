//! Integer edge records shared by every stage.

use crate::graph::Size;
use narwhal_graph::{GraphEdge, IntPair};

/// Index of an [`IntEdge`] in the [`Database`](crate::database::Database) arena.
pub type EdgeId = usize;

/// An input edge in the dense integer model.
///
/// The endpoints given by the caller never change; cycle removal only flips `reversed`, and
/// [`IntEdge::source`] / [`IntEdge::target`] resolve the current orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct IntEdge {
    original: IntPair,
    pub reversed: bool,
    pub weight: i32,
    pub separation: i32,
    pub crossing_weight: i32,
    pub label: Option<Size>,
    /// Index of the input edge, `None` for edges the engine inserted itself.
    pub input_index: Option<usize>,
    /// The chain of one-layer edges this edge was split into. Empty for flat and self edges.
    pub layer_edges: Vec<LayerEdge>,
}

impl IntEdge {
    pub fn new(source: usize, target: usize) -> Self {
        Self {
            original: IntPair::new(source, target),
            reversed: false,
            weight: 1,
            separation: 1,
            crossing_weight: 1,
            label: None,
            input_index: None,
            layer_edges: Vec::new(),
        }
    }

    pub fn original(&self) -> IntPair {
        self.original
    }

    pub fn is_virtual(&self) -> bool {
        self.input_index.is_none()
    }

    pub fn has_label(&self) -> bool {
        self.label.is_some()
    }

    pub fn reverse(&mut self) {
        self.reversed = !self.reversed;
    }

    /// Number of one-layer edges on the path, 0 for flat edges.
    pub fn layer_span(&self) -> usize {
        self.layer_edges.len()
    }

    /// The virtual node in the middle of the path, which carries the label.
    pub fn label_vertex(&self) -> Option<usize> {
        if self.layer_edges.len() < 2 {
            return None;
        }
        Some(self.layer_edges[self.layer_edges.len() / 2].source)
    }
}

impl GraphEdge for IntEdge {
    fn source(&self) -> usize {
        if self.reversed {
            self.original.second
        } else {
            self.original.first
        }
    }

    fn target(&self) -> usize {
        if self.reversed {
            self.original.first
        } else {
            self.original.second
        }
    }
}

/// An edge between two adjacent layers: `layer(target) == layer(source) - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerEdge {
    pub source: usize,
    pub target: usize,
    pub crossing_weight: i32,
    pub weight: i32,
}

impl LayerEdge {
    pub fn new(source: usize, target: usize, crossing_weight: i32, weight: i32) -> Self {
        Self {
            source,
            target,
            crossing_weight,
            weight,
        }
    }

    pub(crate) fn reversed(self) -> Self {
        Self {
            source: self.target,
            target: self.source,
            ..self
        }
    }
}

impl GraphEdge for LayerEdge {
    fn source(&self) -> usize {
        self.source
    }

    fn target(&self) -> usize {
        self.target
    }
}

/// A rank or separation requirement between two nodes: `layer[source] - layer[target] >= separation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankEdge {
    pub source: usize,
    pub target: usize,
    pub weight: i64,
    pub separation: i64,
}

impl RankEdge {
    pub const fn new(source: usize, target: usize, weight: i64, separation: i64) -> Self {
        Self {
            source,
            target,
            weight,
            separation,
        }
    }
}

impl GraphEdge for RankEdge {
    fn source(&self) -> usize {
        self.source
    }

    fn target(&self) -> usize {
        self.target
    }
}
