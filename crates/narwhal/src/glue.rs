//! Gluing of vertically constrained nodes.
//!
//! Nodes forced onto one layer collapse onto a representative. Up-down pairs and the
//! min/max-layer pins are rewritten onto representatives, and cycles among the rewritten pairs
//! are broken by dropping pairs.

use crate::constraints::Constraints;
use crate::database::Database;
use crate::greedy_fas::constrained_feedback_set;
use indexmap::IndexSet;
use narwhal_graph::{BasicGraph, GraphEdge, IntPair, alg};
use rustc_hash::{FxBuildHasher, FxHashMap};

#[derive(Debug, Clone, Default)]
pub struct VerticalConstraints {
    repr: Vec<usize>,
    members: FxHashMap<usize, Vec<usize>>,
    glued_up_down: IndexSet<IntPair, FxBuildHasher>,
    max_repr: Option<usize>,
    min_repr: Option<usize>,
    dropped: usize,
}

fn dedup_in_order(nodes: &[usize]) -> Vec<usize> {
    let mut seen: IndexSet<usize, FxBuildHasher> = IndexSet::default();
    seen.extend(nodes.iter().copied());
    seen.into_iter().collect()
}

impl VerticalConstraints {
    pub fn new(node_count: usize, constraints: &Constraints) -> Self {
        let c = constraints.restricted_to(node_count);
        let max_layer = dedup_in_order(&c.pinned_to_max_layer);
        let min_layer = dedup_in_order(&c.pinned_to_min_layer);

        let mut out = Self {
            repr: (0..node_count).collect(),
            members: FxHashMap::default(),
            glued_up_down: IndexSet::default(),
            max_repr: max_layer.first().copied(),
            min_repr: min_layer.first().copied(),
            dropped: 0,
        };
        out.glue_same_layer_components(node_count, &max_layer, &min_layer, &c.same_layer);

        for &(upper, lower) in c.up_down.iter().chain(c.up_down_vertical.iter()) {
            let p = out.glued_pair(IntPair::new(upper, lower));
            if p.is_loop() {
                // Both ends were forced onto one layer.
                out.dropped += 1;
            } else {
                out.glued_up_down.insert(p);
            }
        }
        out.add_min_max_pairs(node_count);
        out.remove_cycles_from_glued_constraints();

        if out.dropped > 0 {
            tracing::warn!(
                dropped = out.dropped,
                "dropped contradictory vertical constraints"
            );
        }
        out
    }

    fn glue_same_layer_components(
        &mut self,
        node_count: usize,
        max_layer: &[usize],
        min_layer: &[usize],
        same_layer: &[(usize, usize)],
    ) {
        let mut pairs: Vec<IntPair> = Vec::new();
        if let Some(m) = self.max_repr {
            pairs.extend(max_layer.iter().filter(|&&v| v != m).map(|&v| IntPair::new(m, v)));
        }
        if let Some(m) = self.min_repr {
            pairs.extend(min_layer.iter().filter(|&&v| v != m).map(|&v| IntPair::new(m, v)));
        }
        pairs.extend(same_layer.iter().map(|&p| IntPair::from(p)));
        if pairs.is_empty() {
            return;
        }

        let g = BasicGraph::new(pairs, node_count);
        for comp in alg::weak_components(&g) {
            if comp.len() < 2 {
                continue;
            }
            let representative = match (self.max_repr, self.min_repr) {
                (Some(m), _) if comp.contains(&m) => m,
                (_, Some(m)) if comp.contains(&m) => m,
                _ => comp[0],
            };
            if let (Some(max), Some(min)) = (self.max_repr, self.min_repr) {
                if comp.contains(&max) && comp.contains(&min) {
                    // The min and max layers were forced together.
                    self.dropped += 1;
                }
            }
            for &v in &comp {
                self.repr[v] = representative;
            }
            self.members.insert(representative, comp);
        }
    }

    fn add_min_max_pairs(&mut self, node_count: usize) {
        let max = self.max_repr.map(|m| self.repr[m]);
        let min = self.min_repr.map(|m| self.repr[m]);
        if let Some(max) = max {
            for i in 0..node_count {
                let j = self.repr[i];
                if j != max {
                    self.glued_up_down.insert(IntPair::new(max, j));
                }
            }
        }
        if let Some(min) = min {
            if max == Some(min) {
                return;
            }
            for i in 0..node_count {
                let j = self.repr[i];
                if j != min {
                    self.glued_up_down.insert(IntPair::new(j, min));
                }
            }
        }
    }

    fn remove_cycles_from_glued_constraints(&mut self) {
        let pairs: Vec<IntPair> = self.glued_up_down.iter().copied().collect();
        let g = BasicGraph::new(pairs, self.repr.len());
        let feedback = alg::dfs_feedback_set(&g);
        for ix in feedback {
            let p = *g.edge(ix);
            if self.glued_up_down.shift_remove(&p) {
                self.dropped += 1;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.glued_up_down.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.repr.len()
    }

    pub fn node_to_repr(&self, v: usize) -> usize {
        self.repr.get(v).copied().unwrap_or(v)
    }

    pub fn glued_pair(&self, p: IntPair) -> IntPair {
        IntPair::new(self.node_to_repr(p.first), self.node_to_repr(p.second))
    }

    /// Nodes glued onto `repr`; a node that was not glued stands for itself.
    pub fn members(&self, repr: usize) -> &[usize] {
        match self.members.get(&repr) {
            Some(m) => m,
            None => std::slice::from_ref(&self.repr[repr]),
        }
    }

    pub fn glued_up_down_pairs(&self) -> impl Iterator<Item = IntPair> + '_ {
        self.glued_up_down.iter().copied()
    }

    /// `count[repr]` is the number of nodes glued onto `repr`.
    pub fn glued_node_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.repr.len()];
        for &r in &self.repr {
            counts[r] += 1;
        }
        counts
    }

    /// Number of up-down relations that had to be ignored.
    pub fn dropped_constraint_count(&self) -> usize {
        self.dropped
    }

    /// Buckets to reverse so that the glued graph plus the glued constraints is acyclic.
    pub fn feedback_set(&self, db: &Database) -> Vec<IntPair> {
        let n = self.repr.len();
        let mut glued: IndexSet<IntPair, FxBuildHasher> = IndexSet::default();
        for e in db.edges() {
            let p = self.glued_pair(e.pair());
            if !p.is_loop() {
                glued.insert(p);
            }
        }
        let glued: Vec<IntPair> = glued.into_iter().collect();
        let constraints: Vec<IntPair> = self.glued_up_down.iter().copied().collect();
        let glued_feedback = constrained_feedback_set(n, &glued, &constraints);
        if glued_feedback.is_empty() {
            return Vec::new();
        }

        let by_source = BasicGraph::new(db.edges().iter().map(GraphEdge::pair).collect(), n);
        let mut out: IndexSet<IntPair, FxBuildHasher> = IndexSet::default();
        for gp in glued_feedback {
            for &source in self.members(gp.first) {
                for e in by_source.out_edges(source) {
                    if self.node_to_repr(e.second) == gp.second {
                        out.insert(*e);
                    }
                }
            }
        }
        out.into_iter().collect()
    }
}
