//! The mutable context threaded through the pipeline.

use crate::anchor::Anchor;
use crate::model::{EdgeId, IntEdge};
use indexmap::IndexMap;
use narwhal_graph::{GraphEdge, IntPair};
use rustc_hash::FxBuildHasher;
use std::collections::BTreeSet;

type Buckets = IndexMap<IntPair, Vec<EdgeId>, FxBuildHasher>;

/// Owns every [`IntEdge`], groups them into multiedge buckets keyed by their current
/// `(source, target)`, and holds the anchors and the multiple-middle set.
#[derive(Debug, Clone, Default)]
pub struct Database {
    edges: Vec<IntEdge>,
    multiedges: Buckets,
    pub anchors: Vec<Anchor>,
    multiple_middles: BTreeSet<usize>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_edge(&mut self, edge: IntEdge) -> EdgeId {
        let id = self.edges.len();
        let key = edge.pair();
        self.edges.push(edge);
        self.multiedges.entry(key).or_default().push(id);
        id
    }

    /// Inserts an engine-made edge at `position` inside an existing bucket.
    pub(crate) fn insert_edge_in_bucket(&mut self, edge: IntEdge, position: usize) -> EdgeId {
        let id = self.edges.len();
        let key = edge.pair();
        self.edges.push(edge);
        let bucket = self.multiedges.entry(key).or_default();
        let position = position.min(bucket.len());
        bucket.insert(position, id);
        id
    }

    pub fn edge(&self, id: EdgeId) -> &IntEdge {
        &self.edges[id]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut IntEdge {
        &mut self.edges[id]
    }

    pub fn edges(&self) -> &[IntEdge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn buckets(&self) -> impl Iterator<Item = (IntPair, &[EdgeId])> + '_ {
        self.multiedges.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn bucket(&self, pair: IntPair) -> &[EdgeId] {
        self.multiedges.get(&pair).map_or(&[][..], Vec::as_slice)
    }

    /// Reverses every edge of each listed bucket. Reversed edges join the bucket of the
    /// opposite orientation, after its existing members.
    pub fn add_feedback_set(&mut self, pairs: impl IntoIterator<Item = IntPair>) {
        for pair in pairs {
            if pair.is_loop() {
                continue;
            }
            let Some(ids) = self.multiedges.shift_remove(&pair) else {
                continue;
            };
            for &id in &ids {
                self.edges[id].reverse();
            }
            self.multiedges
                .entry(pair.reversed())
                .or_default()
                .extend(ids);
        }
    }

    /// The first edge of every bucket that is not a self loop.
    pub fn skeleton_edge_ids(&self) -> Vec<EdgeId> {
        self.multiedges
            .iter()
            .filter(|(k, _)| !k.is_loop())
            .filter_map(|(_, v)| v.first().copied())
            .collect()
    }

    /// Every edge of every non-loop bucket, bucket by bucket.
    pub fn regular_edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.multiedges
            .iter()
            .filter(|(k, _)| !k.is_loop())
            .flat_map(|(_, v)| v.iter().copied())
    }

    /// Self loops grouped by node.
    pub fn self_edge_buckets(&self) -> impl Iterator<Item = (usize, &[EdgeId])> + '_ {
        self.multiedges
            .iter()
            .filter(|(k, _)| k.is_loop())
            .map(|(k, v)| (k.first, v.as_slice()))
    }

    pub fn add_multiple_middle(&mut self, v: usize) {
        self.multiple_middles.insert(v);
    }

    pub fn is_multiple_middle(&self, v: usize) -> bool {
        self.multiple_middles.contains(&v)
    }

    pub fn multiple_middles(&self) -> impl Iterator<Item = usize> + '_ {
        self.multiple_middles.iter().copied()
    }

    pub(crate) fn clear_multiple_middles(&mut self) {
        self.multiple_middles.clear();
    }

    /// Registers the middle virtual node of every member of a bucket with more than one
    /// non-flat edge.
    pub(crate) fn register_multiple_middles(&mut self) {
        let mut middles: Vec<usize> = Vec::new();
        for (pair, ids) in &self.multiedges {
            if pair.is_loop() || ids.len() < 2 {
                continue;
            }
            for &id in ids {
                if let Some(v) = self.edges[id].label_vertex() {
                    middles.push(v);
                }
            }
        }
        self.multiple_middles.extend(middles);
    }
}
