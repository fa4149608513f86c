//! Node ordering / crossing minimization.
//!
//! Layer-by-layer sweeps by weighted median followed by adjacent exchanges, keeping the best
//! ordering seen. The whole procedure is repeated on the upside-down graph and the better of
//! the two results wins.

pub mod constraints;
mod cross_count;
mod median;
mod transpose;

pub use constraints::HorizontalConstraints;
pub use cross_count::{crossings_total, strip_crossings};

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::layer_arrays::LayerArrays;
use crate::proper_graph::ProperLayeredGraph;
use crate::settings::LayoutSettings;
use crate::util::XorShift64Star;

struct Orderer<'a> {
    graph: &'a ProperLayeredGraph,
    la: LayerArrays,
    horizontal: Option<&'a HorizontalConstraints>,
    rng: XorShift64Star,
    max_passes: usize,
    no_gain_bound: usize,
    cancel: Option<&'a CancelToken>,
}

impl<'a> Orderer<'a> {
    fn new(
        graph: &'a ProperLayeredGraph,
        la: LayerArrays,
        settings: &LayoutSettings,
        horizontal: Option<&'a HorizontalConstraints>,
        cancel: Option<&'a CancelToken>,
    ) -> Self {
        Self {
            graph,
            la,
            horizontal: horizontal.filter(|h| !h.is_empty()),
            rng: XorShift64Star::new(settings.random_seed_for_ordering),
            max_passes: settings.max_ordering_passes(),
            no_gain_bound: settings.no_gain_bound().max(1),
            cancel,
        }
    }

    fn checkpoint(&self) -> Result<()> {
        match self.cancel {
            Some(c) => c.check(),
            None => Ok(()),
        }
    }

    /// Lays every layer out in depth-first order from the sources.
    fn init(&mut self) {
        let n = self.graph.node_count();
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); self.la.layer_count()];
        let mut visited = vec![false; n];
        let mut stack: Vec<usize> = (0..n).filter(|&v| self.graph.in_degree(v) == 0).collect();
        while let Some(u) = stack.pop() {
            layers[self.la.layer_of(u)].push(u);
            for v in self.graph.successors(u) {
                if !visited[v] {
                    visited[v] = true;
                    stack.push(v);
                }
            }
        }
        for (i, layer) in layers.into_iter().enumerate() {
            let layer = self.repaired(&layer);
            self.la.set_layer_order(i, layer);
        }
    }

    fn repaired(&self, layer: &[usize]) -> Vec<usize> {
        match self.horizontal {
            Some(h) => h.repair(layer),
            None => layer.to_vec(),
        }
    }

    fn crossings(&self) -> u64 {
        crossings_total(self.graph, &self.la)
    }

    fn calculate(&mut self) -> Result<u64> {
        self.init();
        let mut best: Vec<Vec<usize>> = self.la.layers().to_vec();
        let mut best_cc = self.crossings();
        let mut no_gain = 0usize;

        let mut i = 0usize;
        while i < self.max_passes && no_gain < self.no_gain_bound && best_cc > 0 {
            self.checkpoint()?;
            self.layer_by_layer_sweep(i % 2 == 0);
            self.adjacent_exchange();

            let cc = self.crossings();
            if cc > best_cc {
                self.la.update_layers(&best);
                no_gain += 1;
            } else if cc < best_cc || self.rng.next_bool() {
                no_gain = 0;
                best.clone_from_slice(self.la.layers());
                best_cc = cc;
            }
            i += 1;
        }
        self.la.update_layers(&best);
        tracing::trace!(passes = i, crossings = best_cc, "ordering converged");
        Ok(best_cc)
    }

    /// `up` sweeps from layer 1 upwards, ordering each layer by its lower neighbours.
    fn layer_by_layer_sweep(&mut self, up: bool) {
        let h = self.la.layer_count();
        if up {
            for i in 1..h {
                self.sweep_layer(i, true);
            }
        } else {
            for i in (0..h.saturating_sub(1)).rev() {
                self.sweep_layer(i, false);
            }
        }
    }

    fn sweep_layer(&mut self, layer: usize, by_lower_neighbors: bool) {
        let x = self.la.x();
        let nodes = self.la.layer(layer);
        let medians: Vec<Option<f64>> = nodes
            .iter()
            .map(|&v| {
                let mut positions: Vec<usize> = if by_lower_neighbors {
                    self.graph.successors(v).map(|u| x[u]).collect()
                } else {
                    self.graph.predecessors(v).map(|u| x[u]).collect()
                };
                median::weighted_median(&mut positions)
            })
            .collect();
        let sorted = median::sort_by_medians(nodes, &medians, &mut self.rng);
        let sorted = self.repaired(&sorted);
        self.la.set_layer_order(layer, sorted);
    }
}

/// Orders the layers of `la` in place and returns the weighted crossing count.
///
/// `la` must describe a layering of `graph`. Horizontal constraints, when given, hold in the
/// result.
pub fn order_layers(
    graph: &ProperLayeredGraph,
    la: &mut LayerArrays,
    settings: &LayoutSettings,
    horizontal: Option<&HorizontalConstraints>,
    cancel: Option<&CancelToken>,
) -> Result<u64> {
    let _span = tracing::debug_span!("order", nodes = graph.node_count()).entered();
    if la.layer_count() == 0 {
        return Ok(0);
    }

    let mut forward = Orderer::new(graph, la.clone(), settings, horizontal, cancel);
    let forward_cc = forward.calculate()?;
    if forward_cc == 0 {
        *la = forward.la;
        tracing::debug!(crossings = 0, "ordered layers");
        return Ok(0);
    }

    let reversed_graph = graph.reversed_clone();
    let mut backward = Orderer::new(
        &reversed_graph,
        la.reversed_clone(),
        settings,
        horizontal,
        cancel,
    );
    let backward_cc = backward.calculate()?;

    let (cc, from_reversed) = if backward_cc < forward_cc {
        (backward_cc, true)
    } else {
        (forward_cc, false)
    };
    if from_reversed {
        let h = la.layer_count();
        let layers: Vec<Vec<usize>> = (0..h)
            .map(|j| backward.la.layer(h - 1 - j).to_vec())
            .collect();
        *la = forward.la;
        la.update_layers(&layers);
    } else {
        *la = forward.la;
    }
    tracing::debug!(crossings = cc, reversed = from_reversed, "ordered layers");
    Ok(cc)
}
