//! Placement constraints between input nodes.
//!
//! Vertical constraints (pins, same-layer, up-down) shape the layering; horizontal ones
//! (left-right, same-layer neighbours) only shape the order inside a layer. Up-down-vertical
//! does both: it is an up-down pair that also asks for equal x.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Constraints {
    pub pinned_to_min_layer: Vec<usize>,
    pub pinned_to_max_layer: Vec<usize>,
    pub same_layer: Vec<(usize, usize)>,
    /// `(upper, lower)`: the first node ends on a strictly higher layer.
    pub up_down: Vec<(usize, usize)>,
    pub up_down_vertical: Vec<(usize, usize)>,
    /// `(left, right)` on a shared layer.
    pub left_right: Vec<(usize, usize)>,
    pub same_layer_neighbors: Vec<Vec<usize>>,
}

impl Constraints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin_to_min_layer(&mut self, node: usize) -> &mut Self {
        self.pinned_to_min_layer.push(node);
        self
    }

    pub fn pin_to_max_layer(&mut self, node: usize) -> &mut Self {
        self.pinned_to_max_layer.push(node);
        self
    }

    pub fn same_layer(&mut self, a: usize, b: usize) -> &mut Self {
        self.same_layer.push((a, b));
        self
    }

    pub fn up_down(&mut self, upper: usize, lower: usize) -> &mut Self {
        self.up_down.push((upper, lower));
        self
    }

    pub fn up_down_vertical(&mut self, upper: usize, lower: usize) -> &mut Self {
        self.up_down_vertical.push((upper, lower));
        self
    }

    pub fn left_right(&mut self, left: usize, right: usize) -> &mut Self {
        self.left_right.push((left, right));
        self
    }

    pub fn same_layer_neighbors(&mut self, nodes: impl IntoIterator<Item = usize>) -> &mut Self {
        let list: Vec<usize> = nodes.into_iter().collect();
        if list.len() > 1 {
            self.same_layer_neighbors.push(list);
        }
        self
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        !self.has_vertical() && !self.has_horizontal()
    }

    pub fn has_vertical(&self) -> bool {
        !self.pinned_to_min_layer.is_empty()
            || !self.pinned_to_max_layer.is_empty()
            || !self.same_layer.is_empty()
            || !self.up_down.is_empty()
            || !self.up_down_vertical.is_empty()
    }

    pub fn has_horizontal(&self) -> bool {
        !self.left_right.is_empty() || !self.same_layer_neighbors.is_empty()
    }

    /// Drops every relation that names a node outside `0..node_count`.
    pub(crate) fn restricted_to(&self, node_count: usize) -> Self {
        let ok = |v: &usize| *v < node_count;
        let ok_pair = |p: &(usize, usize)| p.0 < node_count && p.1 < node_count;
        Self {
            pinned_to_min_layer: self.pinned_to_min_layer.iter().copied().filter(ok).collect(),
            pinned_to_max_layer: self.pinned_to_max_layer.iter().copied().filter(ok).collect(),
            same_layer: self.same_layer.iter().copied().filter(ok_pair).collect(),
            up_down: self.up_down.iter().copied().filter(ok_pair).collect(),
            up_down_vertical: self.up_down_vertical.iter().copied().filter(ok_pair).collect(),
            left_right: self.left_right.iter().copied().filter(ok_pair).collect(),
            same_layer_neighbors: self
                .same_layer_neighbors
                .iter()
                .filter(|l| l.iter().all(ok))
                .cloned()
                .collect(),
        }
    }
}
