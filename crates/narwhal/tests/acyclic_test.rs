use narwhal::acyclic;
use narwhal::constraints::Constraints;
use narwhal::database::Database;
use narwhal::glue::VerticalConstraints;
use narwhal::greedy_fas::constrained_feedback_set;
use narwhal::model::IntEdge;
use narwhal_graph::{BasicGraph, GraphEdge, IntPair, alg};

fn database(edges: &[(usize, usize)]) -> Database {
    let mut db = Database::new();
    for (ix, &(s, t)) in edges.iter().enumerate() {
        let mut e = IntEdge::new(s, t);
        e.input_index = Some(ix);
        db.register_edge(e);
    }
    db
}

#[test]
fn acyclic_reverses_one_edge_of_a_triangle() {
    let mut db = database(&[(0, 1), (1, 2), (2, 0)]);
    let vertical = VerticalConstraints::new(3, &Constraints::new());
    let reversed = acyclic::run(&mut db, 3, &vertical);
    assert_eq!(reversed.len(), 1);
    assert!(acyclic::is_acyclic(&db, 3));
    assert_eq!(db.edges().iter().filter(|e| e.reversed).count(), 1);
    // Endpoints as given never change.
    assert_eq!(db.edge(2).original(), IntPair::new(2, 0));
}

#[test]
fn acyclic_leaves_a_dag_alone() {
    let mut db = database(&[(0, 1), (0, 2), (1, 2)]);
    let vertical = VerticalConstraints::new(3, &Constraints::new());
    assert!(acyclic::run(&mut db, 3, &vertical).is_empty());
    assert!(db.edges().iter().all(|e| !e.reversed));
}

#[test]
fn acyclic_moves_whole_buckets() {
    let mut db = database(&[(0, 1), (0, 1), (1, 0)]);
    let vertical = VerticalConstraints::new(2, &Constraints::new());
    acyclic::run(&mut db, 2, &vertical);
    assert!(acyclic::is_acyclic(&db, 2));
    let buckets: Vec<_> = db.buckets().collect();
    assert_eq!(buckets.len(), 1);
    assert_eq!(buckets[0].1.len(), 3);
}

#[test]
fn acyclic_ignores_self_loops() {
    let mut db = database(&[(0, 0), (0, 1)]);
    let vertical = VerticalConstraints::new(2, &Constraints::new());
    assert!(acyclic::run(&mut db, 2, &vertical).is_empty());
    assert_eq!(db.self_edge_buckets().count(), 1);
}

#[test]
fn acyclic_with_constraints_keeps_constraint_direction() {
    // The edge 1 -> 0 contradicts "0 above 1" and has to be the one reversed.
    let mut db = database(&[(1, 0), (1, 2)]);
    let mut c = Constraints::new();
    c.up_down(0, 1);
    let vertical = VerticalConstraints::new(3, &c);
    let reversed = acyclic::run(&mut db, 3, &vertical);
    assert_eq!(reversed, vec![IntPair::new(1, 0)]);
    assert_eq!(db.edge(0).pair(), IntPair::new(0, 1));
}

#[test]
fn glue_drops_a_contradiction_through_a_same_layer_partner() {
    let mut c = Constraints::new();
    c.same_layer(0, 1).up_down(0, 2).up_down(2, 1);
    let vertical = VerticalConstraints::new(3, &c);
    assert_eq!(vertical.node_to_repr(0), vertical.node_to_repr(1));
    assert_eq!(vertical.dropped_constraint_count(), 1);
    let pairs: Vec<IntPair> = vertical.glued_up_down_pairs().collect();
    assert_eq!(pairs.len(), 1);
    assert!(alg::is_acyclic(&BasicGraph::new(pairs, 3)));
}

#[test]
fn constrained_feedback_set_never_reverses_against_constraints() {
    let edges = [IntPair::new(0, 1), IntPair::new(1, 2), IntPair::new(2, 0)];
    let constraints = [IntPair::new(2, 0)];
    let fas = constrained_feedback_set(3, &edges, &constraints);
    assert!(!fas.contains(&IntPair::new(2, 0)));

    let mut remaining: Vec<IntPair> = edges
        .iter()
        .map(|e| if fas.contains(e) { e.reversed() } else { *e })
        .collect();
    remaining.extend(constraints);
    assert!(alg::is_acyclic(&BasicGraph::new(remaining, 3)));
    assert!(edges.iter().any(|e| fas.contains(e)));
}
