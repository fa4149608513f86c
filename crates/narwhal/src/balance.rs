//! Layer balancing.
//!
//! A jumper is a node whose weighted in-degree equals its weighted out-degree, so moving it
//! anywhere inside its feasible window keeps the layering cost. Jumpers move to the least
//! populated layer of their window when that layer is lighter by more than twice their weight.

use crate::cancel::CancelToken;
use crate::error::Result;
use crate::model::RankEdge;
use narwhal_graph::BasicGraph;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

/// Exclusive feasible window `(down, up)` of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    up: i64,
    down: i64,
}

struct Balancer<'a> {
    dag: &'a BasicGraph<RankEdge>,
    layering: &'a mut [usize],
    node_counts: &'a [usize],
    layer_counts: Vec<i64>,
    windows: BTreeMap<usize, Window>,
    jumpers: BTreeSet<usize>,
}

impl Balancer<'_> {
    fn count_of(&self, v: usize) -> i64 {
        self.node_counts.get(v).copied().unwrap_or(1) as i64
    }

    fn up(&self, v: usize) -> i64 {
        self.dag
            .in_edges(v)
            .map(|e| self.layering[e.source] as i64 - e.separation + 1)
            .min()
            .unwrap_or(self.layering[v] as i64 + 1)
    }

    fn down(&self, v: usize) -> i64 {
        self.dag
            .out_edges(v)
            .map(|e| self.layering[e.target] as i64 + e.separation - 1)
            .max()
            .unwrap_or(self.layering[v] as i64 - 1)
    }

    /// Target layer strictly inside the window, preferring the lightest one.
    fn jump_target(&self, w: Window, v: usize) -> Option<usize> {
        let current = self.layering[v] as i64;
        let mut min = self.layer_counts[current as usize] - 2 * self.count_of(v);
        let mut target: Option<usize> = None;

        let top = (w.up - 1).min(self.layer_counts.len() as i64 - 1);
        let mut i = top;
        while i > current {
            let c = self.layer_counts[i as usize];
            if c < min {
                min = c;
                target = Some(i as usize);
            }
            i -= 1;
        }
        let mut i = current - 1;
        while i > w.down && i >= 0 {
            let c = self.layer_counts[i as usize];
            if c < min {
                min = c;
                target = Some(i as usize);
            }
            i -= 1;
        }
        target
    }

    fn calculate_window_and_insert_jumper(&mut self, v: usize) {
        let w = Window {
            up: self.up(v),
            down: self.down(v),
        };
        self.windows.insert(v, w);
        if self.jump_target(w, v).is_some() {
            self.jumpers.insert(v);
        }
    }

    fn jump(&mut self, jumper: usize) {
        self.jumpers.remove(&jumper);
        let Some(&w) = self.windows.get(&jumper) else {
            return;
        };
        let Some(to) = self.jump_target(w, jumper) else {
            return;
        };
        let from = self.layering[jumper];
        let count = self.count_of(jumper);
        self.layering[jumper] = to;
        self.layer_counts[from] -= count;
        self.layer_counts[to] += count;
        self.update_windows_after_jump(from, jumper);
    }

    fn update_windows_after_jump(&mut self, from: usize, jumper: usize) {
        let mut neighbors: FxHashSet<usize> = FxHashSet::default();
        let adjacent: Vec<usize> = self
            .dag
            .predecessors(jumper)
            .chain(self.dag.successors(jumper))
            .collect();
        for v in adjacent {
            if self.windows.contains_key(&v) && neighbors.insert(v) {
                self.calculate_window_and_insert_jumper(v);
            }
        }

        let from = from as i64;
        let to_update: Vec<usize> = self
            .windows
            .iter()
            .filter(|(v, w)| !neighbors.contains(v) && w.up > from && w.down < from)
            .map(|(v, _)| *v)
            .collect();
        for v in to_update {
            self.calculate_window_and_insert_jumper(v);
        }
    }
}

/// Balances `layering` in place. `node_counts[v]` is how many input nodes `v` stands for.
/// Returns the number of moves made.
pub fn balance(
    dag: &BasicGraph<RankEdge>,
    layering: &mut [usize],
    node_counts: &[usize],
    cancel: Option<&CancelToken>,
) -> Result<usize> {
    let n = layering.len().min(dag.node_count());
    if n == 0 {
        return Ok(0);
    }
    let layer_count = layering.iter().copied().max().map_or(0, |m| m + 1);
    let mut layer_counts = vec![0i64; layer_count];
    for (v, &l) in layering.iter().enumerate() {
        layer_counts[l] += node_counts.get(v).copied().unwrap_or(1) as i64;
    }

    let mut deltas = vec![0i64; n];
    for e in dag.edges() {
        if e.source < n && e.target < n {
            deltas[e.source] -= e.weight;
            deltas[e.target] += e.weight;
        }
    }

    let mut b = Balancer {
        dag,
        layering,
        node_counts,
        layer_counts,
        windows: BTreeMap::new(),
        jumpers: BTreeSet::new(),
    };
    for v in 0..n {
        if deltas[v] == 0 {
            b.calculate_window_and_insert_jumper(v);
        }
    }

    let mut moves = 0usize;
    while let Some(&jumper) = b.jumpers.iter().next() {
        if let Some(c) = cancel {
            c.check()?;
        }
        let before = b.layering[jumper];
        b.jump(jumper);
        if b.layering[jumper] != before {
            moves += 1;
        }
    }
    tracing::debug!(moves, "balanced layers");
    Ok(moves)
}
