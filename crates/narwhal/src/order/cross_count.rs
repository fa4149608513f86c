use crate::layer_arrays::LayerArrays;
use crate::model::LayerEdge;
use crate::proper_graph::ProperLayeredGraph;

/// Weighted crossings over all strips of adjacent layers.
pub fn crossings_total(graph: &ProperLayeredGraph, la: &LayerArrays) -> u64 {
    (0..la.layer_count().saturating_sub(1))
        .map(|bottom| strip_crossings(graph, la, bottom))
        .sum()
}

/// Weighted crossings between layer `bottom` and layer `bottom + 1`, counted with an
/// accumulator tree over the bottom positions.
pub fn strip_crossings(graph: &ProperLayeredGraph, la: &LayerArrays, bottom: usize) -> u64 {
    let bottom_nodes = la.layer(bottom);
    if bottom_nodes.is_empty() {
        return 0;
    }
    let x = la.x();
    let mut edges: Vec<&LayerEdge> = bottom_nodes
        .iter()
        .flat_map(|&v| graph.in_edges(v))
        .collect();
    edges.sort_by_key(|e| (x[e.source], x[e.target]));

    let mut first_index: usize = 1;
    while first_index < bottom_nodes.len() {
        first_index <<= 1;
    }
    let mut tree: Vec<u64> = vec![0; 2 * first_index - 1];
    first_index -= 1;

    let mut cc: u64 = 0;
    for e in edges {
        let w = e.crossing_weight.max(0) as u64;
        let mut index = first_index + x[e.target];
        tree[index] += w;
        while index > 0 {
            if index % 2 == 1 {
                cc += w * tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += w;
        }
    }
    cc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(usize, usize)], n: usize) -> ProperLayeredGraph {
        let edges = edges
            .iter()
            .map(|&(s, t)| LayerEdge::new(s, t, 1, 1))
            .collect();
        ProperLayeredGraph::from_layer_edges(edges, n, n)
    }

    #[test]
    fn counts_a_single_crossing() {
        // 2 3 on top, 0 1 below; 2->1 and 3->0 cross.
        let g = graph(&[(2, 1), (3, 0)], 4);
        let la = LayerArrays::from_layers(vec![vec![0, 1], vec![2, 3]], 4);
        assert_eq!(crossings_total(&g, &la), 1);
    }

    #[test]
    fn shared_endpoints_do_not_cross() {
        let g = graph(&[(2, 0), (2, 1), (3, 1)], 4);
        let la = LayerArrays::from_layers(vec![vec![0, 1], vec![2, 3]], 4);
        assert_eq!(crossings_total(&g, &la), 0);
    }

    #[test]
    fn crossing_weights_multiply() {
        let edges = vec![LayerEdge::new(2, 1, 3, 1), LayerEdge::new(3, 0, 2, 1)];
        let g = ProperLayeredGraph::from_layer_edges(edges, 4, 4);
        let la = LayerArrays::from_layers(vec![vec![0, 1], vec![2, 3]], 4);
        assert_eq!(crossings_total(&g, &la), 6);
    }
}
