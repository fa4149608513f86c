//! Eades-style greedy feedback arc set that never reverses a constraint edge.
//!
//! Nodes are peeled off the graph one by one: sinks go to the right end of the ordering,
//! sources to the left end, and otherwise the node with the largest out-in degree among nodes
//! without incoming constraint edges goes left. Constraint edges therefore always point
//! forward in the final ordering, provided the constraints alone are acyclic.

use narwhal_graph::IntPair;
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
struct NodeInfo {
    alive: bool,
    ins: FxHashSet<usize>,
    outs: FxHashSet<usize>,
    constrained_ins: FxHashSet<usize>,
    constrained_outs: FxHashSet<usize>,
}

impl NodeInfo {
    fn in_degree(&self) -> usize {
        self.ins.len() + self.constrained_ins.len()
    }

    fn out_degree(&self) -> usize {
        self.outs.len() + self.constrained_outs.len()
    }

    fn delta(&self) -> i64 {
        self.out_degree() as i64 - self.in_degree() as i64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    None,
    Source,
    Sink,
    Bucket(i64),
}

struct Work {
    nodes: Vec<NodeInfo>,
    slot: Vec<Slot>,
    sources: BTreeSet<usize>,
    sinks: BTreeSet<usize>,
    buckets: BTreeMap<i64, BTreeSet<usize>>,
    remaining: usize,
}

impl Work {
    fn new(node_count: usize, edges: &[IntPair], constraints: &[IntPair]) -> Self {
        let mut nodes: Vec<NodeInfo> = vec![NodeInfo::default(); node_count];
        for p in edges.iter().filter(|p| !p.is_loop()) {
            nodes[p.first].alive = true;
            nodes[p.second].alive = true;
            nodes[p.first].outs.insert(p.second);
            nodes[p.second].ins.insert(p.first);
        }
        for p in constraints.iter().filter(|p| !p.is_loop()) {
            nodes[p.first].alive = true;
            nodes[p.second].alive = true;
            nodes[p.first].constrained_outs.insert(p.second);
            nodes[p.second].constrained_ins.insert(p.first);
        }
        let remaining = nodes.iter().filter(|n| n.alive).count();
        let mut w = Self {
            nodes,
            slot: vec![Slot::None; node_count],
            sources: BTreeSet::new(),
            sinks: BTreeSet::new(),
            buckets: BTreeMap::new(),
            remaining,
        };
        for v in 0..node_count {
            if w.nodes[v].alive {
                w.assign(v);
            }
        }
        w
    }

    fn assign(&mut self, v: usize) {
        let info = &self.nodes[v];
        let slot = if info.in_degree() == 0 {
            self.sources.insert(v);
            Slot::Source
        } else if info.out_degree() == 0 {
            self.sinks.insert(v);
            Slot::Sink
        } else if info.constrained_ins.is_empty() {
            let d = info.delta();
            self.buckets.entry(d).or_default().insert(v);
            Slot::Bucket(d)
        } else {
            Slot::None
        };
        self.slot[v] = slot;
    }

    fn unassign(&mut self, v: usize) {
        match self.slot[v] {
            Slot::None => {}
            Slot::Source => {
                self.sources.remove(&v);
            }
            Slot::Sink => {
                self.sinks.remove(&v);
            }
            Slot::Bucket(d) => {
                if let Some(b) = self.buckets.get_mut(&d) {
                    b.remove(&v);
                    if b.is_empty() {
                        self.buckets.remove(&d);
                    }
                }
            }
        }
        self.slot[v] = Slot::None;
    }

    fn remove_node(&mut self, u: usize) {
        self.unassign(u);
        let info = std::mem::take(&mut self.nodes[u]);
        self.remaining -= 1;

        let mut touched: BTreeSet<usize> = BTreeSet::new();
        touched.extend(info.outs.iter().copied());
        touched.extend(info.ins.iter().copied());
        touched.extend(info.constrained_outs.iter().copied());
        touched.extend(info.constrained_ins.iter().copied());
        for &v in &touched {
            self.unassign(v);
        }

        for v in info.outs {
            self.nodes[v].ins.remove(&u);
        }
        for v in info.ins {
            self.nodes[v].outs.remove(&u);
        }
        for v in info.constrained_outs {
            self.nodes[v].constrained_ins.remove(&u);
        }
        for v in info.constrained_ins {
            self.nodes[v].constrained_outs.remove(&u);
        }

        for v in touched {
            if self.nodes[v].alive {
                self.assign(v);
            }
        }
    }

    fn pick_max_delta(&self) -> Option<usize> {
        self.buckets
            .iter()
            .next_back()
            .and_then(|(_, b)| b.iter().next().copied())
    }

    fn any_alive(&self) -> Option<usize> {
        self.nodes.iter().position(|n| n.alive)
    }
}

/// Edges of `edges` that point backwards in a constraint-respecting greedy ordering.
///
/// Reversing the result makes `edges ∪ constraints` acyclic when `constraints` is acyclic.
pub fn constrained_feedback_set(
    node_count: usize,
    edges: &[IntPair],
    constraints: &[IntPair],
) -> Vec<IntPair> {
    if edges.is_empty() {
        return Vec::new();
    }
    let mut w = Work::new(node_count, edges, constraints);
    let mut left: Vec<usize> = Vec::with_capacity(w.remaining);
    let mut right: Vec<usize> = Vec::new();

    while w.remaining > 0 {
        if let Some(&u) = w.sinks.iter().next() {
            w.remove_node(u);
            right.push(u);
            continue;
        }
        if let Some(&u) = w.sources.iter().next() {
            w.remove_node(u);
            left.push(u);
            continue;
        }
        // Only a constraint cycle can leave nothing pickable; fall back to the lowest id.
        let Some(u) = w.pick_max_delta().or_else(|| w.any_alive()) else {
            break;
        };
        w.remove_node(u);
        left.push(u);
    }

    let mut position = vec![usize::MAX; node_count];
    for (i, &v) in left.iter().chain(right.iter().rev()).enumerate() {
        position[v] = i;
    }

    edges
        .iter()
        .copied()
        .filter(|p| !p.is_loop() && position[p.first] > position[p.second])
        .collect()
}
