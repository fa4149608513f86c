use narwhal::anchor::Anchor;
use narwhal::layer_arrays::LayerArrays;
use narwhal::model::LayerEdge;
use narwhal::position::bk::{Bias, BrandesKopf};
use narwhal::position::xlayout::{self, XLayoutGraph};
use narwhal::proper_graph::ProperLayeredGraph;
use narwhal_graph::IntPair;

const NODE_SEP: f64 = 10.0;

fn proper(edges: &[(usize, usize)], first_virtual: usize, n: usize) -> ProperLayeredGraph {
    let les = edges
        .iter()
        .map(|&(s, t)| LayerEdge::new(s, t, 1, 1))
        .collect();
    ProperLayeredGraph::from_layer_edges(les, first_virtual, n)
}

fn anchors(widths: &[f64]) -> Vec<Anchor> {
    widths
        .iter()
        .enumerate()
        .map(|(v, &w)| Anchor::for_node(v, w, 20.0))
        .collect()
}

fn assert_separated(la: &LayerArrays, anchors: &[Anchor], x: &[f64]) {
    for layer in la.layers() {
        for w in layer.windows(2) {
            let (u, v) = (w[0], w[1]);
            let need = anchors[u].right_anchor + anchors[v].left_anchor + NODE_SEP;
            assert!(x[v] - x[u] >= need - 1e-9, "{u} {v}: {x:?}");
        }
    }
}

/// A -> B -> D and A -> C -> D with a wide C.
fn diamond() -> (ProperLayeredGraph, LayerArrays, Vec<Anchor>) {
    let g = proper(&[(0, 1), (0, 2), (1, 3), (2, 3)], 4, 4);
    let la = LayerArrays::from_layers(vec![vec![3], vec![1, 2], vec![0]], 4);
    (g, la, anchors(&[20.0, 20.0, 40.0, 20.0]))
}

#[test]
fn bk_centers_a_diamond() {
    let (g, la, a) = diamond();
    let bk = BrandesKopf::new(&la, &g, &a, NODE_SEP);
    let x = bk.calculate();
    let mid = (x[1] + x[2]) / 2.0;
    assert!((x[0] - mid).abs() < 1e-9, "{x:?}");
    assert!((x[3] - mid).abs() < 1e-9, "{x:?}");
    assert_separated(&la, &a, &x);
}

#[test]
fn bk_biased_assignments_each_respect_separation() {
    let (g, la, a) = diamond();
    let bk = BrandesKopf::new(&la, &g, &a, NODE_SEP);
    for bias in Bias::ALL {
        assert_separated(&la, &a, &bk.biased_coordinates(bias));
    }
}

#[test]
fn bk_result_is_the_middle_of_the_aligned_assignments() {
    // Root with three children and a long edge through a virtual node.
    let g = proper(&[(0, 1), (0, 2), (0, 3), (0, 5), (5, 4), (1, 4)], 5, 6);
    let la = LayerArrays::from_layers(vec![vec![4], vec![1, 2, 3, 5], vec![0]], 6);
    let mut a = anchors(&[30.0, 20.0, 20.0, 20.0, 30.0, 1.0]);
    a[5].node = None;
    let bk = BrandesKopf::new(&la, &g, &a, NODE_SEP);
    let xs = bk.aligned_assignments();
    let x = bk.calculate();

    // Every aligned assignment is shifted onto the narrowest one: left-to-right sweeps share
    // its left end, right-to-left sweeps its right end.
    let bounds: Vec<(f64, f64)> = xs
        .iter()
        .map(|x| {
            let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (lo, hi)
        })
        .collect();
    let narrowest = (0..4)
        .min_by(|&i, &j| (bounds[i].1 - bounds[i].0).total_cmp(&(bounds[j].1 - bounds[j].0)))
        .unwrap();
    for (i, bias) in Bias::ALL.iter().enumerate() {
        if bias.left_to_right {
            assert!((bounds[i].0 - bounds[narrowest].0).abs() < 1e-9, "{bounds:?}");
        } else {
            assert!((bounds[i].1 - bounds[narrowest].1).abs() < 1e-9, "{bounds:?}");
        }
        assert_separated(&la, &a, &xs[i]);
    }

    // The result is the mean of the two middle aligned values.
    for v in 0..6 {
        let mut vals = [xs[0][v], xs[1][v], xs[2][v], xs[3][v]];
        vals.sort_by(f64::total_cmp);
        assert!((x[v] - (vals[1] + vals[2]) / 2.0).abs() < 1e-9, "{v}: {vals:?} {x:?}");
        assert!(vals[0] - 1e-9 <= x[v] && x[v] <= vals[3] + 1e-9);
    }
}

#[test]
fn network_simplex_x_keeps_neighbours_apart() {
    let g = proper(&[(0, 1), (0, 2), (0, 3), (2, 4)], 5, 5);
    let la = LayerArrays::from_layers(vec![vec![4], vec![1, 2, 3], vec![0]], 5);
    let mut a = anchors(&[50.0, 15.0, 35.0, 25.0, 10.0]);
    let xg = xlayout::calculate_x_coordinates(&g, &la, &mut a, NODE_SEP, &[], None).unwrap();
    let x: Vec<f64> = a.iter().map(|a| a.x).collect();
    assert_separated(&la, &a, &x);
    // The lone child sits right under its parent.
    assert_eq!(x[4], x[2]);
    assert_eq!(xg.variable_count(), 5 + 4);
}

#[test]
fn network_simplex_x_aligns_vertical_pairs() {
    let g = proper(&[(0, 1), (0, 2)], 3, 3);
    let la = LayerArrays::from_layers(vec![vec![1, 2], vec![0]], 3);
    let mut a = anchors(&[20.0, 20.0, 20.0]);
    let pairs = [IntPair::new(0, 2)];
    let xg = xlayout::calculate_x_coordinates(&g, &la, &mut a, NODE_SEP, &pairs, None).unwrap();
    assert_eq!(xg.dropped_vertical_pairs(), 0);
    assert_eq!(a[0].x, a[2].x);
}

#[test]
fn fixing_separation_after_a_resize() {
    let g = proper(&[(0, 1), (0, 2)], 3, 3);
    let la = LayerArrays::from_layers(vec![vec![1, 2], vec![0]], 3);
    let mut a = anchors(&[20.0, 20.0, 20.0]);
    let mut xg = XLayoutGraph::new(&g, &la, &a, NODE_SEP, &[]);
    let before = xg.solve(None).unwrap();

    a[1].right_anchor += 30.0;
    xg.fix_edge_separation(&la, &a, 1);
    let after = xg.solve(None).unwrap();
    assert!(after[2] - after[1] > before[2] - before[1]);
    assert_separated(&la, &a, &after);
}
