//! Brandes & Köpf (BK) horizontal coordinate assignment.
//!
//! Four biased assignments (left/right × up/down) align every node with a median neighbour,
//! compact the resulting blocks, and are then balanced: the narrowest assignment is the
//! reference and each node takes the mean of its two middle coordinates.

use crate::anchor::Anchor;
use crate::layer_arrays::LayerArrays;
use crate::proper_graph::ProperLayeredGraph;
use narwhal_graph::{BasicGraph, IntPair, alg};
use rustc_hash::FxHashSet;

/// Direction of one biased assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bias {
    /// Layers are swept left to right.
    pub left_to_right: bool,
    /// Nodes align with their neighbours on the layer above.
    pub bottom_up: bool,
}

impl Bias {
    pub const ALL: [Bias; 4] = [
        Bias::new(true, true),
        Bias::new(false, true),
        Bias::new(true, false),
        Bias::new(false, false),
    ];

    pub const fn new(left_to_right: bool, bottom_up: bool) -> Self {
        Self {
            left_to_right,
            bottom_up,
        }
    }

    fn is_left_from(self, i: i64, j: i64) -> bool {
        if self.left_to_right { i < j } else { j < i }
    }

    fn next_right(self, i: i64) -> i64 {
        if self.left_to_right { i + 1 } else { i - 1 }
    }

    fn next_left(self, i: i64) -> i64 {
        if self.left_to_right { i - 1 } else { i + 1 }
    }

    fn right_most(self, a: f64, b: f64) -> f64 {
        if self.left_to_right { a.max(b) } else { a.min(b) }
    }

    fn left_most(self, a: f64, b: f64) -> f64 {
        if self.left_to_right { a.min(b) } else { a.max(b) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Medians {
    None,
    One(usize),
    Two(usize, usize),
}

pub struct BrandesKopf<'a> {
    la: &'a LayerArrays,
    graph: &'a ProperLayeredGraph,
    anchors: &'a [Anchor],
    node_sep: f64,
    upper_medians: Vec<Medians>,
    lower_medians: Vec<Medians>,
    /// Layer edges `(source, target)` that may not take part in an alignment.
    marked: FxHashSet<IntPair>,
}

impl<'a> BrandesKopf<'a> {
    pub fn new(
        la: &'a LayerArrays,
        graph: &'a ProperLayeredGraph,
        anchors: &'a [Anchor],
        node_sep: f64,
    ) -> Self {
        let n = graph.node_count();
        let x = la.x();
        let medians_of = |mut nbrs: Vec<usize>| {
            nbrs.sort_by_key(|&v| x[v]);
            let c = nbrs.len();
            match c {
                0 => Medians::None,
                _ if c % 2 == 0 => Medians::Two(nbrs[c / 2 - 1], nbrs[c / 2]),
                _ => Medians::One(nbrs[c / 2]),
            }
        };
        let upper_medians = (0..n)
            .map(|v| medians_of(graph.predecessors(v).collect()))
            .collect();
        let lower_medians = (0..n)
            .map(|v| medians_of(graph.successors(v).collect()))
            .collect();
        let mut bk = Self {
            la,
            graph,
            anchors,
            node_sep,
            upper_medians,
            lower_medians,
            marked: FxHashSet::default(),
        };
        bk.mark_type1_conflicts();
        bk
    }

    fn pos(&self, v: usize) -> i64 {
        self.la.position(v) as i64
    }

    fn is_inner(&self, source: usize, target: usize) -> bool {
        self.graph.is_virtual(source) && self.graph.is_virtual(target)
    }

    /// Marks every non-inner layer edge that crosses an inner segment, strip by strip.
    fn mark_type1_conflicts(&mut self) {
        let h = self.la.layer_count();
        for lower in 0..h.saturating_sub(1) {
            let upper_len = self.la.layer(lower + 1).len() as i64;
            let layer = self.la.layer(lower);
            let mut k0: i64 = 0;
            let mut scan = 0usize;
            for (l1, &v) in layer.iter().enumerate() {
                let inner_source = self
                    .graph
                    .in_edge_of_virtual_node(v)
                    .filter(|e| self.graph.is_virtual(e.source))
                    .map(|e| e.source);
                if inner_source.is_none() && l1 + 1 != layer.len() {
                    continue;
                }
                let k1 = inner_source.map_or(upper_len - 1, |u| self.pos(u));
                for &w in &layer[scan..=l1] {
                    for e in self.graph.in_edges(w) {
                        let pu = self.pos(e.source);
                        if (pu < k0 || pu > k1) && !self.is_inner(e.source, w) {
                            self.marked.insert(IntPair::new(e.source, w));
                        }
                    }
                }
                scan = l1 + 1;
                k0 = k1;
            }
        }
    }

    fn is_marked(&self, bias: Bias, v: usize, upper: usize) -> bool {
        let p = if bias.bottom_up {
            IntPair::new(upper, v)
        } else {
            IntPair::new(v, upper)
        };
        self.marked.contains(&p)
    }

    fn upper_medians_of(&self, v: usize, bias: Bias) -> ([usize; 2], usize) {
        let m = if bias.bottom_up {
            self.upper_medians[v]
        } else {
            self.lower_medians[v]
        };
        match m {
            Medians::None => ([0, 0], 0),
            Medians::One(u) => ([u, u], 1),
            Medians::Two(a, b) if bias.left_to_right => ([a, b], 2),
            Medians::Two(a, b) => ([b, a], 2),
        }
    }

    /// Groups nodes into blocks: `root[v]` is the block root, `align` cycles through a block.
    fn create_blocks(&self, bias: Bias) -> (Vec<usize>, Vec<usize>) {
        let n = self.graph.node_count();
        let mut root: Vec<usize> = (0..n).collect();
        let mut align: Vec<usize> = (0..n).collect();
        let h = self.la.layer_count();
        if h < 2 {
            return (root, align);
        }

        let layer_pairs: Vec<(usize, usize)> = if bias.bottom_up {
            (0..h - 1).rev().map(|i| (i, i + 1)).collect()
        } else {
            (1..h).map(|i| (i, i - 1)).collect()
        };
        for (i, upper) in layer_pairs {
            let layer = self.la.layer(i);
            let upper_len = self.la.layer(upper).len() as i64;
            let mut r: i64 = if bias.left_to_right { -1 } else { upper_len };
            let order: Box<dyn Iterator<Item = &usize>> = if bias.left_to_right {
                Box::new(layer.iter())
            } else {
                Box::new(layer.iter().rev())
            };
            for &vk in order {
                let (medians, count) = self.upper_medians_of(vk, bias);
                for &u in &medians[..count] {
                    if self.is_marked(bias, vk, u) {
                        continue;
                    }
                    let pu = self.pos(u);
                    if bias.is_left_from(r, pu) {
                        align[u] = vk;
                        root[vk] = root[u];
                        align[vk] = root[vk];
                        r = pu;
                        break;
                    }
                }
            }
        }
        (root, align)
    }

    fn neighbor(&self, v: usize, pos: i64) -> Option<usize> {
        if pos < 0 {
            return None;
        }
        self.la.layer(self.la.layer_of(v)).get(pos as usize).copied()
    }

    fn right_neighbor(&self, bias: Bias, v: usize) -> Option<usize> {
        self.neighbor(v, bias.next_right(self.pos(v)))
    }

    fn left_neighbor(&self, bias: Bias, v: usize) -> Option<usize> {
        self.neighbor(v, bias.next_left(self.pos(v)))
    }

    /// Signed minimal distance from `u` to `v`: positive when `u` is left of `v`.
    fn delta_between(&self, u: usize, v: usize) -> f64 {
        let (l, r, sign) = if self.pos(u) > self.pos(v) {
            (v, u, -1.0)
        } else {
            (u, v, 1.0)
        };
        (self.anchors[l].right_anchor + self.anchors[r].left_anchor + self.node_sep) * sign
    }

    fn block(align: &[usize], v: usize) -> impl Iterator<Item = usize> + '_ {
        let mut next = Some(v);
        std::iter::from_fn(move || {
            let w = next?;
            let a = align[w];
            next = (a != v).then_some(a);
            Some(w)
        })
    }

    /// Coordinates of one biased assignment.
    pub fn biased_coordinates(&self, bias: Bias) -> Vec<f64> {
        let n = self.graph.node_count();
        let (root, align) = self.create_blocks(bias);

        let mut edges: Vec<IntPair> = Vec::new();
        for v in (0..n).filter(|&v| root[v] == v) {
            for w in Self::block(&align, v) {
                if let Some(r) = self.right_neighbor(bias, w) {
                    edges.push(IntPair::new(v, root[r]));
                }
            }
        }
        let block_graph = BasicGraph::new(edges, n);
        let topo = alg::topological_order(&block_graph).unwrap_or_else(|| {
            debug_assert!(false, "block graph has a cycle");
            (0..n).collect()
        });

        let mut x = vec![0.0f64; n];
        for &v in &topo {
            if root[v] != v {
                continue;
            }
            let mut vx: Option<f64> = None;
            for w in Self::block(&align, v) {
                if let Some(wl) = self.left_neighbor(bias, w) {
                    let cand = x[root[wl]] + self.delta_between(wl, w);
                    vx = Some(vx.map_or(cand, |c| bias.right_most(c, cand)));
                }
            }
            x[v] = vx.unwrap_or(0.0);
        }

        // Blocks with nothing on their left move as close as allowed to their right side.
        for &v in &topo {
            if root[v] != v || block_graph.in_degree(v) != 0 {
                continue;
            }
            let mut limit: Option<f64> = None;
            for w in Self::block(&align, v) {
                if let Some(wr) = self.right_neighbor(bias, w) {
                    let cand = x[root[wr]] - self.delta_between(w, wr);
                    limit = Some(limit.map_or(cand, |c| bias.left_most(c, cand)));
                }
            }
            if let Some(limit) = limit {
                x[v] = limit;
            }
        }

        for v in 0..n {
            if root[v] != v {
                x[v] = x[root[v]];
            }
        }
        x
    }

    /// All four assignments, aligned to the narrowest one.
    pub fn aligned_assignments(&self) -> [Vec<f64>; 4] {
        let mut xs: [Vec<f64>; 4] = Bias::ALL.map(|b| self.biased_coordinates(b));
        let bounds: Vec<(f64, f64)> = xs
            .iter()
            .map(|x| {
                x.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| {
                    (a.min(v), b.max(v))
                })
            })
            .collect();
        let mut least = 0usize;
        for i in 1..4 {
            if bounds[i].1 - bounds[i].0 < bounds[least].1 - bounds[least].0 {
                least = i;
            }
        }
        for (i, x) in xs.iter_mut().enumerate() {
            let delta = if Bias::ALL[i].left_to_right {
                bounds[least].0 - bounds[i].0
            } else {
                bounds[least].1 - bounds[i].1
            };
            if delta != 0.0 && delta.is_finite() {
                for v in x.iter_mut() {
                    *v += delta;
                }
            }
        }
        xs
    }

    /// Median of the four aligned assignments per node.
    pub fn calculate(&self) -> Vec<f64> {
        let n = self.graph.node_count();
        if n <= 1 {
            return vec![0.0; n];
        }
        let xs = self.aligned_assignments();
        (0..n)
            .map(|v| {
                let mut arr = [xs[0][v], xs[1][v], xs[2][v], xs[3][v]];
                arr.sort_by(f64::total_cmp);
                (arr[1] + arr[2]) / 2.0
            })
            .collect()
    }
}

/// Sets `x` of every anchor of the proper graph.
pub fn calculate_x_coordinates(
    la: &LayerArrays,
    graph: &ProperLayeredGraph,
    anchors: &mut [Anchor],
    node_sep: f64,
) {
    let _span = tracing::debug_span!("brandes_kopf", nodes = graph.node_count()).entered();
    let xs = BrandesKopf::new(la, graph, anchors, node_sep).calculate();
    for (a, x) in anchors.iter_mut().zip(xs) {
        a.x = x;
    }
}
