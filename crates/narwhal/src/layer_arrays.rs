//! Layer membership and in-layer order.

/// `y[v]` is the layer of `v`, `layers[i]` the ordered nodes of layer `i`, `x[v]` the position
/// of `v` inside its layer. Layer 0 is the lowest one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerArrays {
    y: Vec<usize>,
    x: Vec<usize>,
    layers: Vec<Vec<usize>>,
}

impl LayerArrays {
    /// Builds layers from a layering, placing nodes of each layer in id order.
    pub fn new(y: Vec<usize>) -> Self {
        let layer_count = y.iter().copied().max().map_or(0, |m| m + 1);
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
        let mut x = vec![0usize; y.len()];
        for (v, &l) in y.iter().enumerate() {
            x[v] = layers[l].len();
            layers[l].push(v);
        }
        Self { y, x, layers }
    }

    /// Builds from explicit layers. Every node in `0..node_count` must appear exactly once.
    pub fn from_layers(layers: Vec<Vec<usize>>, node_count: usize) -> Self {
        let mut y = vec![0usize; node_count];
        let mut x = vec![0usize; node_count];
        for (l, layer) in layers.iter().enumerate() {
            for (pos, &v) in layer.iter().enumerate() {
                y[v] = l;
                x[v] = pos;
            }
        }
        Self { y, x, layers }
    }

    pub fn y(&self) -> &[usize] {
        &self.y
    }

    pub fn x(&self) -> &[usize] {
        &self.x
    }

    pub fn layers(&self) -> &[Vec<usize>] {
        &self.layers
    }

    pub fn layer(&self, i: usize) -> &[usize] {
        &self.layers[i]
    }

    pub fn layer_of(&self, v: usize) -> usize {
        self.y[v]
    }

    pub fn position(&self, v: usize) -> usize {
        self.x[v]
    }

    pub fn node_count(&self) -> usize {
        self.y.len()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Vec<usize>] {
        &mut self.layers
    }

    /// Recomputes `x` after layers were permuted in place.
    pub fn update_x_from_layers(&mut self) {
        for layer in &self.layers {
            for (pos, &v) in layer.iter().enumerate() {
                self.x[v] = pos;
            }
        }
    }

    /// Replaces the order of every layer; the layer membership must not change.
    pub fn update_layers(&mut self, layers: &[Vec<usize>]) {
        for (dst, src) in self.layers.iter_mut().zip(layers) {
            dst.clear();
            dst.extend_from_slice(src);
        }
        self.update_x_from_layers();
    }

    /// Replaces layer `layer` with a permutation of its nodes.
    pub(crate) fn set_layer_order(&mut self, layer: usize, order: Vec<usize>) {
        for (pos, &v) in order.iter().enumerate() {
            self.x[v] = pos;
        }
        self.layers[layer] = order;
    }

    pub(crate) fn swap_in_layer(&mut self, layer: usize, i: usize, j: usize) {
        self.layers[layer].swap(i, j);
        let u = self.layers[layer][i];
        let v = self.layers[layer][j];
        self.x[u] = i;
        self.x[v] = j;
    }

    /// Removes empty layers and renumbers `y`, keeping the relative order of the rest.
    pub fn drop_empty_layers(&mut self) {
        if self.layers.iter().all(|l| !l.is_empty()) {
            return;
        }
        let mut new_index = vec![0usize; self.layers.len()];
        let mut next = 0usize;
        for (i, layer) in self.layers.iter().enumerate() {
            new_index[i] = next;
            if !layer.is_empty() {
                next += 1;
            }
        }
        for l in &mut self.y {
            *l = new_index[*l];
        }
        self.layers.retain(|l| !l.is_empty());
    }

    /// The same arrangement seen upside down: layer `i` becomes `h - 1 - i`.
    pub fn reversed_clone(&self) -> Self {
        let h = self.layers.len();
        let layers: Vec<Vec<usize>> = self.layers.iter().rev().cloned().collect();
        let y = self.y.iter().map(|&l| h - 1 - l).collect();
        Self {
            y,
            x: self.x.clone(),
            layers,
        }
    }

    /// Checks `layers[y[v]][x[v]] == v` for every node and that each node appears once.
    pub fn is_consistent(&self) -> bool {
        if self.x.len() != self.y.len() {
            return false;
        }
        let total: usize = self.layers.iter().map(Vec::len).sum();
        if total != self.y.len() {
            return false;
        }
        self.y.iter().enumerate().all(|(v, &l)| {
            self.layers
                .get(l)
                .and_then(|layer| layer.get(self.x[v]))
                .is_some_and(|&u| u == v)
        })
    }

    /// Restricts to nodes `0..n`, keeping their relative order.
    pub(crate) fn truncated(&self, n: usize) -> Self {
        let layers: Vec<Vec<usize>> = self
            .layers
            .iter()
            .map(|l| l.iter().copied().filter(|&v| v < n).collect())
            .collect();
        let mut out = Self::from_layers(layers, n);
        out.drop_empty_layers();
        out
    }
}
