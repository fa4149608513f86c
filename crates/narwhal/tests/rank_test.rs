use narwhal::balance::balance;
use narwhal::model::RankEdge;
use narwhal::rank::network_simplex::network_simplex;
use narwhal::rank::rank_general_graph;
use narwhal::rank::util::{layering_cost, longest_path_layering};
use narwhal_graph::BasicGraph;

fn edges(list: &[(usize, usize)]) -> Vec<RankEdge> {
    list.iter().map(|&(s, t)| RankEdge::new(s, t, 1, 1)).collect()
}

fn assert_feasible(edges: &[RankEdge], layers: &[usize]) {
    for e in edges {
        assert!(
            layers[e.source] as i64 - layers[e.target] as i64 >= e.separation,
            "{e:?} violated by {layers:?}"
        );
    }
}

/// Variance of the number of nodes per layer.
fn population_variance(layering: &[usize]) -> f64 {
    let layers = layering.iter().copied().max().map_or(0, |m| m + 1);
    let mut counts = vec![0.0f64; layers];
    for &l in layering {
        counts[l] += 1.0;
    }
    let mean = counts.iter().sum::<f64>() / layers as f64;
    counts.iter().map(|c| (c - mean) * (c - mean)).sum::<f64>() / layers as f64
}

#[test]
fn rank_chain() {
    let es = edges(&[(0, 1), (1, 2)]);
    assert_eq!(rank_general_graph(3, &es, None).unwrap(), vec![2, 1, 0]);
}

#[test]
fn rank_respects_separation() {
    let es = vec![RankEdge::new(0, 1, 1, 3)];
    assert_eq!(rank_general_graph(2, &es, None).unwrap(), vec![3, 0]);
}

#[test]
fn rank_pulls_short_branches_up() {
    // a -> b -> c -> d and a -> e: the longest path drops e to the bottom, the optimum keeps
    // it right under a.
    let es = edges(&[(0, 1), (1, 2), (2, 3), (0, 4)]);
    let longest = longest_path_layering(5, &es);
    assert_eq!(longest[4], 0);

    let layers = rank_general_graph(5, &es, None).unwrap();
    assert_eq!(layers, vec![3, 2, 1, 0, 2]);
    let as_i64: Vec<i64> = layers.iter().map(|&l| l as i64).collect();
    assert_eq!(layering_cost(&es, &as_i64), 4);
}

#[test]
fn rank_components_start_at_zero() {
    let es = edges(&[(0, 1), (2, 3), (3, 4)]);
    let layers = rank_general_graph(6, &es, None).unwrap();
    assert_eq!(layers, vec![1, 0, 2, 1, 0, 0]);
}

#[test]
fn rank_weighted_edges_are_kept_short() {
    // 0 -> 1 -> 2 and 0 -> 3 -> 2 with a heavy edge 3 -> 2 and a forced long edge 0 -> 1.
    let es = vec![
        RankEdge::new(0, 1, 1, 2),
        RankEdge::new(1, 2, 1, 1),
        RankEdge::new(0, 3, 1, 1),
        RankEdge::new(3, 2, 10, 1),
    ];
    let layers = rank_general_graph(4, &es, None).unwrap();
    assert_feasible(&es, &layers);
    assert_eq!(layers[3] - layers[2], 1);
}

#[test]
fn network_simplex_single_node_or_no_edges() {
    assert_eq!(network_simplex(1, &[], None).unwrap(), vec![0]);
    assert_eq!(network_simplex(3, &[], None).unwrap(), vec![0, 0, 0]);
}

#[test]
fn balance_moves_jumpers_to_light_layers() {
    // 0 -> 1 -> 2 -> 5 is the spine; 3, 4 and 6 hang between 0 and 5 and all start on layer 2.
    let es = edges(&[
        (0, 1),
        (1, 2),
        (2, 5),
        (0, 3),
        (3, 5),
        (0, 4),
        (4, 5),
        (0, 6),
        (6, 5),
    ]);
    let dag = BasicGraph::new(es.clone(), 7);
    let mut layering = vec![3, 2, 1, 2, 2, 0, 2];
    let cost_before = layering_cost(&es, &layering.iter().map(|&l| l as i64).collect::<Vec<_>>());

    let variance_before = population_variance(&layering);
    let moves = balance(&dag, &mut layering, &[1; 7], None).unwrap();
    assert!(population_variance(&layering) < variance_before);
    assert_eq!(moves, 1);
    assert_eq!(layering, vec![3, 2, 1, 1, 2, 0, 2]);
    assert_feasible(&es, &layering);
    let cost_after = layering_cost(&es, &layering.iter().map(|&l| l as i64).collect::<Vec<_>>());
    assert_eq!(cost_before, cost_after);

    // A second pass finds nothing to do.
    assert_eq!(balance(&dag, &mut layering, &[1; 7], None).unwrap(), 0);
}
