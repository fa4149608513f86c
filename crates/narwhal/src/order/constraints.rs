//! In-layer order constraints.
//!
//! Same-layer-neighbour lists become blocks that must stay contiguous and in list order.
//! Left-right pairs are lifted onto block roots; pairs that would form a cycle are dropped.

use crate::constraints::Constraints;
use narwhal_graph::{BasicGraph, IntPair, alg};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct HorizontalConstraints {
    root: FxHashMap<usize, usize>,
    blocks: FxHashMap<usize, Vec<usize>>,
    left_right: FxHashSet<IntPair>,
    dropped: usize,
}

impl HorizontalConstraints {
    /// Keeps only the relations between nodes that share a layer in `layering`.
    pub fn new(constraints: &Constraints, layering: &[usize]) -> Self {
        let n = layering.len();
        let c = constraints.restricted_to(n);
        let mut out = Self::default();

        for list in &c.same_layer_neighbors {
            let same_layer = list.windows(2).all(|w| layering[w[0]] == layering[w[1]]);
            let distinct: FxHashSet<usize> = list.iter().copied().collect();
            let free = list.iter().all(|v| !out.root.contains_key(v));
            if !same_layer || distinct.len() != list.len() || !free {
                out.dropped += 1;
                continue;
            }
            let r = list[0];
            for &v in list {
                out.root.insert(v, r);
            }
            out.blocks.insert(r, list.clone());
        }

        let mut lifted: Vec<IntPair> = Vec::new();
        for &(a, b) in &c.left_right {
            if layering[a] != layering[b] {
                out.dropped += 1;
                continue;
            }
            let (ra, rb) = (out.root_of(a), out.root_of(b));
            if ra == rb {
                let members = out.members(ra);
                let pa = members.iter().position(|&v| v == a);
                let pb = members.iter().position(|&v| v == b);
                if !matches!((pa, pb), (Some(pa), Some(pb)) if pa < pb) {
                    out.dropped += 1;
                }
                continue;
            }
            lifted.push(IntPair::new(ra, rb));
        }

        let g = BasicGraph::new(lifted, n);
        let feedback: FxHashSet<usize> = alg::dfs_feedback_set(&g).into_iter().collect();
        out.dropped += feedback.len();
        for (ix, p) in g.edges().iter().enumerate() {
            if !feedback.contains(&ix) {
                out.left_right.insert(*p);
            }
        }

        if out.dropped > 0 {
            tracing::warn!(
                dropped = out.dropped,
                "dropped contradictory horizontal constraints"
            );
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.left_right.is_empty()
    }

    pub fn dropped_constraint_count(&self) -> usize {
        self.dropped
    }

    pub fn root_of(&self, v: usize) -> usize {
        self.root.get(&v).copied().unwrap_or(v)
    }

    fn members(&self, root: usize) -> &[usize] {
        self.blocks.get(&root).map_or(&[][..], Vec::as_slice)
    }

    pub fn in_block(&self, v: usize) -> bool {
        self.root.contains_key(&v)
    }

    /// True when putting `v` immediately to the left of `u` breaks nothing.
    pub fn can_swap(&self, u: usize, v: usize) -> bool {
        if self.in_block(u) || self.in_block(v) {
            return false;
        }
        !self.left_right.contains(&IntPair::new(u, v))
    }

    /// Reorders `layer` into the closest order that keeps every block contiguous and every
    /// left-right pair satisfied. An already valid layer is returned unchanged.
    pub fn repair(&self, layer: &[usize]) -> Vec<usize> {
        if self.is_empty() {
            return layer.to_vec();
        }
        // Units are block roots and unconstrained nodes, keyed by their first position.
        let mut first_pos: FxHashMap<usize, usize> = FxHashMap::default();
        for (pos, &v) in layer.iter().enumerate() {
            first_pos.entry(self.root_of(v)).or_insert(pos);
        }

        let mut indegree: FxHashMap<usize, usize> = FxHashMap::default();
        let mut succ: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for p in &self.left_right {
            if first_pos.contains_key(&p.first) && first_pos.contains_key(&p.second) {
                *indegree.entry(p.second).or_default() += 1;
                succ.entry(p.first).or_default().push(p.second);
            }
        }

        let mut ready: BTreeSet<(usize, usize)> = first_pos
            .iter()
            .filter(|(u, _)| !indegree.contains_key(u))
            .map(|(&u, &pos)| (pos, u))
            .collect();
        let mut out: Vec<usize> = Vec::with_capacity(layer.len());
        while let Some((_, u)) = ready.pop_first() {
            match self.blocks.get(&u) {
                Some(members) => out.extend(members.iter().copied()),
                None => out.push(u),
            }
            for &w in succ.get(&u).map_or(&[][..], Vec::as_slice) {
                let Some(d) = indegree.get_mut(&w) else {
                    continue;
                };
                *d -= 1;
                if *d == 0 {
                    indegree.remove(&w);
                    ready.insert((first_pos[&w], w));
                }
            }
        }
        debug_assert_eq!(out.len(), layer.len());
        out
    }

    /// True when `layer` already satisfies every relation among its nodes.
    pub fn is_satisfied_by(&self, layer: &[usize]) -> bool {
        self.repair(layer) == layer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_are_pulled_together() {
        let mut c = Constraints::new();
        c.same_layer_neighbors([3, 1]);
        let h = HorizontalConstraints::new(&c, &[0, 0, 0, 0]);
        assert_eq!(h.repair(&[1, 0, 2, 3]), vec![3, 1, 0, 2]);
    }

    #[test]
    fn left_right_cycles_are_dropped() {
        let mut c = Constraints::new();
        c.left_right(0, 1).left_right(1, 0);
        let h = HorizontalConstraints::new(&c, &[0, 0]);
        assert_eq!(h.dropped_constraint_count(), 1);
        let fixed = h.repair(&[1, 0]);
        assert!(h.is_satisfied_by(&fixed));
    }
}
