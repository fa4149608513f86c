//! Input graph: sized nodes, weighted edges and placement constraints.

use crate::constraints::Constraints;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub(crate) fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Rect {
    pub fn empty() -> Self {
        Self {
            left: f64::INFINITY,
            bottom: f64::INFINITY,
            right: f64::NEG_INFINITY,
            top: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.bottom > self.top
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.right - self.left
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.top - self.bottom
        }
    }

    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2.0, (self.bottom + self.top) / 2.0)
    }

    pub fn add_point(&mut self, x: f64, y: f64) {
        self.left = self.left.min(x);
        self.right = self.right.max(x);
        self.bottom = self.bottom.min(y);
        self.top = self.top.max(y);
    }

    pub fn pad(&mut self, delta: f64) {
        if self.is_empty() {
            return;
        }
        self.left -= delta;
        self.right += delta;
        self.bottom -= delta;
        self.top += delta;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub width: f64,
    pub height: f64,
}

impl Node {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

fn default_weight() -> i32 {
    1
}

fn default_separation() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    #[serde(default = "default_weight")]
    pub weight: i32,
    /// Minimal number of layers between the ends.
    #[serde(default = "default_separation")]
    pub separation: i32,
    #[serde(default)]
    pub label: Option<Size>,
}

impl Edge {
    pub fn new(source: usize, target: usize) -> Self {
        Self {
            source,
            target,
            weight: 1,
            separation: 1,
            label: None,
        }
    }

    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_separation(mut self, separation: i32) -> Self {
        self.separation = separation;
        self
    }

    pub fn with_label(mut self, width: f64, height: f64) -> Self {
        self.label = Some(Size::new(width, height));
        self
    }

    pub fn is_self_edge(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub constraints: Constraints,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, width: f64, height: f64) -> usize {
        self.nodes.push(Node::new(width, height));
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, edge: Edge) -> usize {
        self.edges.push(edge);
        self.edges.len() - 1
    }

    pub fn connect(&mut self, source: usize, target: usize) -> usize {
        self.add_edge(Edge::new(source, target))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Rejects edges that would corrupt the integer model.
    pub fn validate(&self) -> Result<()> {
        let n = self.nodes.len();
        for (ix, e) in self.edges.iter().enumerate() {
            for node in [e.source, e.target] {
                if node >= n {
                    return Err(Error::MissingEndpoint { edge: ix, node });
                }
            }
            if e.weight < 0 {
                return Err(Error::InvalidEdge {
                    edge: ix,
                    reason: "weight must be non-negative",
                });
            }
            if e.separation < 1 {
                return Err(Error::InvalidEdge {
                    edge: ix,
                    reason: "separation must be at least 1",
                });
            }
        }
        Ok(())
    }
}
