//! Break cycles by reversing a feedback edge set.
//!
//! Without vertical constraints a plain DFS feedback set is used. With them, the greedy
//! constraint-aware ordering over the glued graph decides which buckets to reverse.

use crate::database::Database;
use crate::glue::VerticalConstraints;
use indexmap::IndexSet;
use narwhal_graph::{BasicGraph, GraphEdge, IntPair, alg};
use rustc_hash::FxBuildHasher;

/// Reverses every multiedge bucket in the feedback set. Returns the reversed pairs in their
/// orientation before reversal.
pub fn run(db: &mut Database, node_count: usize, vertical: &VerticalConstraints) -> Vec<IntPair> {
    let fas = if vertical.is_empty() {
        dfs_fas(db, node_count)
    } else {
        vertical.feedback_set(db)
    };
    if !fas.is_empty() {
        tracing::debug!(reversed = fas.len(), "reversing feedback buckets");
    }
    db.add_feedback_set(fas.iter().copied());
    fas
}

fn dfs_fas(db: &Database, node_count: usize) -> Vec<IntPair> {
    let g = BasicGraph::new(db.edges().iter().map(GraphEdge::pair).collect(), node_count);
    let mut fas: IndexSet<IntPair, FxBuildHasher> = IndexSet::default();
    for ix in alg::dfs_feedback_set(&g) {
        fas.insert(*g.edge(ix));
    }
    fas.into_iter().collect()
}

/// True when the current orientation of all non-loop edges is acyclic.
pub fn is_acyclic(db: &Database, node_count: usize) -> bool {
    let pairs: Vec<IntPair> = db
        .edges()
        .iter()
        .map(GraphEdge::pair)
        .filter(|p| !p.is_loop())
        .collect();
    alg::is_acyclic(&BasicGraph::new(pairs, node_count))
}
