//! Graph algorithms over [`BasicGraph`].

use crate::{BasicGraph, GraphEdge};
use std::collections::VecDeque;

/// Weakly connected components, each listed in BFS discovery order.
///
/// Components are emitted in order of their smallest node index.
pub fn weak_components<E: GraphEdge>(g: &BasicGraph<E>) -> Vec<Vec<usize>> {
    let n = g.node_count();
    let mut seen = vec![false; n];
    let mut out: Vec<Vec<usize>> = Vec::new();
    let mut q: VecDeque<usize> = VecDeque::new();

    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut comp: Vec<usize> = Vec::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(v);
            for w in g.successors(v).chain(g.predecessors(v)) {
                if !seen[w] {
                    seen[w] = true;
                    q.push_back(w);
                }
            }
        }
        out.push(comp);
    }
    out
}

/// Kahn's algorithm. Returns `None` when the graph has a cycle (self-loops count).
pub fn topological_order<E: GraphEdge>(g: &BasicGraph<E>) -> Option<Vec<usize>> {
    let n = g.node_count();
    let mut in_deg: Vec<usize> = (0..n).map(|v| g.in_degree(v)).collect();
    let mut q: VecDeque<usize> = (0..n).filter(|&v| in_deg[v] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(n);

    while let Some(v) = q.pop_front() {
        order.push(v);
        for w in g.successors(v) {
            in_deg[w] -= 1;
            if in_deg[w] == 0 {
                q.push_back(w);
            }
        }
    }

    (order.len() == n).then_some(order)
}

pub fn is_acyclic<E: GraphEdge>(g: &BasicGraph<E>) -> bool {
    topological_order(g).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    InStack,
    Done,
}

#[derive(Debug, Clone, Copy)]
struct DfsFrame {
    v: usize,
    next_out: usize,
}

/// Indices of the edges that close a cycle during an iterative DFS.
///
/// Reversing every returned edge makes the graph acyclic. Self-loops are never returned; callers
/// handle them separately.
pub fn dfs_feedback_set<E: GraphEdge>(g: &BasicGraph<E>) -> Vec<usize> {
    let n = g.node_count();
    let mut state = vec![Visit::New; n];
    let mut feedback: Vec<usize> = Vec::new();
    let mut stack: Vec<DfsFrame> = Vec::new();

    for root in 0..n {
        if state[root] != Visit::New {
            continue;
        }
        state[root] = Visit::InStack;
        stack.push(DfsFrame { v: root, next_out: 0 });

        while let Some(frame) = stack.last_mut() {
            let v = frame.v;
            let outs = g.out_edge_ixs(v);
            let Some(&e_ix) = outs.get(frame.next_out) else {
                state[v] = Visit::Done;
                stack.pop();
                continue;
            };
            frame.next_out += 1;

            let w = g.edge(e_ix).target();
            if w == v {
                continue;
            }
            match state[w] {
                Visit::InStack => feedback.push(e_ix),
                Visit::New => {
                    state[w] = Visit::InStack;
                    stack.push(DfsFrame { v: w, next_out: 0 });
                }
                Visit::Done => {}
            }
        }
    }

    feedback
}
