use narwhal_graph::{BasicGraph, GraphEdge, IntPair};

#[test]
fn node_count_covers_edge_endpoints() {
    let g = BasicGraph::new(vec![(0, 5), (2, 1)], 3);
    assert_eq!(g.node_count(), 6);
    assert_eq!(g.edge_count(), 2);
}

#[test]
fn adjacency_keeps_insertion_order() {
    let g = BasicGraph::new(vec![(0, 2), (1, 2), (0, 1), (0, 3)], 4);
    assert_eq!(g.out_edge_ixs(0), &[0, 2, 3]);
    assert_eq!(g.in_edge_ixs(2), &[0, 1]);
    assert_eq!(g.successors(0).collect::<Vec<_>>(), vec![2, 1, 3]);
    assert_eq!(g.predecessors(2).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(g.out_degree(3), 0);
    assert_eq!(g.in_degree(3), 1);
}

#[test]
fn parallel_edges_are_kept_apart() {
    let g = BasicGraph::new(vec![(0, 1), (0, 1), (1, 0)], 2);
    assert_eq!(g.out_degree(0), 2);
    let by_pair = g.edge_ixs_by_pair();
    assert_eq!(by_pair[&IntPair::new(0, 1)], vec![0, 1]);
    assert_eq!(by_pair[&IntPair::new(1, 0)], vec![2]);
    assert_eq!(g.find_edge(1, 0), Some(2));
    assert_eq!(g.find_edge(1, 1), None);
}

#[test]
fn int_pair_helpers() {
    let p = IntPair::new(3, 7);
    assert_eq!(p.reversed(), IntPair::new(7, 3));
    assert!(!p.is_loop());
    assert!(IntPair::new(2, 2).is_loop());
    assert_eq!(p.source(), 3);
    assert_eq!(p.target(), 7);
}

#[test]
fn map_edges_keeps_nodes() {
    let g = BasicGraph::new(vec![(0, 1)], 4);
    let r = g.map_edges(|e| (e.target(), e.source()));
    assert_eq!(r.node_count(), 4);
    assert_eq!(r.edges(), &[(1, 0)]);
}
