use narwhal::database::Database;
use narwhal::edge_paths::insert_paths;
use narwhal::layer_arrays::LayerArrays;
use narwhal::layer_inserter::insert_layers;
use narwhal::model::IntEdge;
use narwhal::normalize::create_proper_layered_graph;
use narwhal::proper_graph::ProperLayeredGraph;
use narwhal_graph::GraphEdge;

fn database(edges: &[(usize, usize)]) -> Database {
    let mut db = Database::new();
    for (ix, &(s, t)) in edges.iter().enumerate() {
        let mut e = IntEdge::new(s, t);
        e.input_index = Some(ix);
        db.register_edge(e);
    }
    db
}

fn assert_proper(graph: &ProperLayeredGraph, la: &LayerArrays) {
    assert!(la.is_consistent());
    for e in graph.edges() {
        assert_eq!(la.layer_of(e.source), la.layer_of(e.target) + 1, "{e:?}");
    }
    for v in graph.first_virtual_node()..graph.node_count() {
        assert_eq!(graph.in_degree(v), 1);
        assert_eq!(graph.out_degree(v), 1);
    }
}

fn assert_simple_path(db: &Database, id: usize) {
    let e = db.edge(id);
    let chain = &e.layer_edges;
    assert_eq!(chain[0].source, e.source());
    assert_eq!(chain[chain.len() - 1].target, e.target());
    for w in chain.windows(2) {
        assert_eq!(w[0].target, w[1].source);
    }
}

#[test]
fn normalize_splits_long_edges() {
    let mut db = database(&[(0, 1), (0, 2)]);
    let n = create_proper_layered_graph(&mut db, &[3, 0, 2], 3);
    // 0 -> 1 spans three layers, 0 -> 2 one.
    assert_eq!(n.graph.node_count(), 5);
    assert_eq!(n.graph.edge_count(), 4);
    assert_eq!(n.layering, vec![3, 0, 2, 2, 1]);
    assert_eq!(db.edge(0).layer_span(), 3);
    assert_eq!(db.edge(1).layer_span(), 1);
    assert_simple_path(&db, 0);
    assert_eq!(db.edge(0).label_vertex(), Some(3));
    assert_proper(&n.graph, &LayerArrays::new(n.layering.clone()));
}

#[test]
fn normalize_skips_flat_edges() {
    let mut db = database(&[(0, 1), (1, 2)]);
    let n = create_proper_layered_graph(&mut db, &[1, 1, 0], 3);
    assert_eq!(n.graph.edge_count(), 1);
    assert_eq!(db.edge(0).layer_span(), 0);
}

#[test]
fn edge_paths_give_every_parallel_edge_its_own_chain() {
    let mut db = database(&[(0, 1), (0, 1), (0, 1)]);
    let n = create_proper_layered_graph(&mut db, &[2, 0], 2);
    let la = LayerArrays::new(n.layering);
    let (graph, la) = insert_paths(&mut db, &n.graph, &la, 2);
    assert_eq!(graph.node_count(), 5);
    assert_eq!(la.layer(1).len(), 3);
    for id in 0..3 {
        assert_eq!(db.edge(id).layer_span(), 2);
        assert_simple_path(&db, id);
    }
    assert_proper(&graph, &la);
    assert_eq!(db.multiple_middles().count(), 3);
}

#[test]
fn layer_doubling_gives_short_edges_a_middle() {
    let mut db = database(&[(0, 1), (1, 2)]);
    db.edge_mut(0).label = Some(narwhal::Size::new(20.0, 10.0));
    let n = create_proper_layered_graph(&mut db, &[2, 1, 0], 3);
    let la = LayerArrays::new(n.layering);
    let (graph, la) = insert_layers(&mut db, &la, 3);
    assert_eq!(la.y()[..3], [4, 2, 0]);
    assert_eq!(graph.node_count(), 5);
    assert_proper(&graph, &la);
    let middle = db.edge(0).label_vertex().unwrap();
    assert_eq!(la.layer_of(middle), 3);
}
