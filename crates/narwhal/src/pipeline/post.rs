//! Adjustments made after x and y are known: label sides, short edge straightening, stretching
//! and grid snapping. Everything here works on anchors in the internal frame.

use crate::anchor::Anchor;
use crate::graph::{Rect, Size};
use crate::layer_arrays::LayerArrays;
use crate::proper_graph::ProperLayeredGraph;
use crate::util::{EPS, cross};

const MAX_STRAIGHTENING_ROUNDS: usize = 100;
const SHIFT_EPS: f64 = 1e-4;

fn dist(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Puts each label on the outer side of the bend its edge makes at the label node.
pub(crate) fn optimize_label_sides(graph: &ProperLayeredGraph, anchors: &mut [Anchor]) {
    for i in 0..anchors.len().min(graph.node_count()) {
        if !anchors[i].label_to_the_right {
            continue;
        }
        let (Some(p), Some(s)) = (graph.predecessors(i).next(), graph.successors(i).next()) else {
            continue;
        };
        let pred = (anchors[p].x, anchors[p].y);
        let succ = (anchors[s].x, anchors[s].y);
        if put_label_outside_of_angle(&mut anchors[i], pred, succ) {
            continue;
        }
        let a = anchors[i];
        let now = dist(pred, (a.x, a.y)) + dist(succ, (a.x, a.y));
        let left_x = a.right() - a.left_anchor;
        let flipped = dist(pred, (left_x, a.y)) + dist(succ, (left_x, a.y));
        if flipped < now {
            anchors[i].put_label_to_the_left();
        }
    }
}

/// True when the label ends up outside the angle `pred, a, succ`.
fn put_label_outside_of_angle(a: &mut Anchor, pred: (f64, f64), succ: (f64, f64)) -> bool {
    if cross(pred, (a.x, a.y), succ) < -EPS {
        return true;
    }
    let saved = *a;
    a.put_label_to_the_left();
    if cross(pred, (a.x, a.y), succ) > EPS {
        return true;
    }
    *a = saved;
    false
}

/// Moves the middle node of every two-layer edge `(upper, middle, lower)` onto the segment
/// between its ends, as far as its layer neighbours allow.
pub(crate) fn straighten_short_edges(
    paths: &[(usize, usize, usize)],
    la: &LayerArrays,
    anchors: &mut [Anchor],
    node_sep: f64,
) {
    for _ in 0..MAX_STRAIGHTENING_ROUNDS {
        let mut changed = false;
        for &(upper, middle, lower) in paths {
            changed = shift_onto_segment(upper, middle, lower, la, anchors, node_sep) || changed;
        }
        if !changed {
            break;
        }
    }
}

fn shift_onto_segment(
    upper: usize,
    middle: usize,
    lower: usize,
    la: &LayerArrays,
    anchors: &mut [Anchor],
    node_sep: f64,
) -> bool {
    let (u, m, l) = (anchors[upper], anchors[middle], anchors[lower]);
    if (l.y - u.y).abs() < EPS {
        return false;
    }
    let x = (m.y - u.y) * (l.x - u.x) / (l.y - u.y) + u.x;
    let layer = la.layer(la.layer_of(middle));
    let pos = la.position(middle);
    if x > m.x + SHIFT_EPS {
        let limit = layer
            .get(pos + 1)
            .map(|&r| anchors[r].left() - node_sep - m.right_anchor);
        shift_to(anchors, middle, x, limit.map(|lim| x.min(lim)))
    } else if x < m.x - SHIFT_EPS {
        let limit = pos
            .checked_sub(1)
            .map(|p| anchors[layer[p]].right() + node_sep + m.left_anchor);
        shift_to(anchors, middle, x, limit.map(|lim| x.max(lim)))
    } else {
        false
    }
}

/// Moves `v` to `target` when nothing limits it, or to `bounded` when that is more than a
/// unit away.
fn shift_to(anchors: &mut [Anchor], v: usize, target: f64, bounded: Option<f64>) -> bool {
    match bounded {
        None => {
            anchors[v].x = target;
            true
        }
        Some(x) if (x - anchors[v].x).abs() > 1.0 => {
            anchors[v].x = x;
            true
        }
        Some(_) => false,
    }
}

pub(crate) fn anchors_box(anchors: &[Anchor]) -> Rect {
    let mut b = Rect::empty();
    for a in anchors {
        b.add_point(a.left(), a.bottom());
        b.add_point(a.right(), a.top());
    }
    b
}

/// Stretches one axis about the box center until width / height equals `desired`.
pub(crate) fn stretch_to_aspect_ratio(anchors: &mut [Anchor], desired: f64) {
    if desired <= 0.0 {
        return;
    }
    let b = anchors_box(anchors);
    if b.width() <= EPS || b.height() <= EPS {
        return;
    }
    let c = b.center();
    let ratio = b.width() / b.height();
    if ratio > desired + EPS {
        let k = ratio / desired;
        for a in anchors.iter_mut() {
            a.top_anchor *= k;
            a.bottom_anchor *= k;
            a.y = c.y + (a.y - c.y) * k;
        }
    } else if ratio < desired - EPS {
        let k = desired / ratio;
        for a in anchors.iter_mut() {
            a.left_anchor *= k;
            a.right_anchor *= k;
            a.x = c.x + (a.x - c.x) * k;
        }
    }
}

#[derive(Clone, Copy)]
struct Span {
    lo: f64,
    hi: f64,
}

impl Span {
    const EMPTY: Span = Span {
        lo: f64::INFINITY,
        hi: f64::NEG_INFINITY,
    };

    fn add(mut self, v: f64) -> Self {
        self.lo = self.lo.min(v);
        self.hi = self.hi.max(v);
        self
    }

    fn len(self) -> f64 {
        if self.hi < self.lo { 0.0 } else { self.hi - self.lo }
    }
}

/// Spreads node centers apart when the nodes span less than `minimal` across. Only the
/// centers move; anchors keep their size.
fn satisfy_minimal_extent(
    anchors: &mut [Anchor],
    node_extents: impl Iterator<Item = f64> + Clone,
    minimal: f64,
    center: fn(&Anchor) -> f64,
    sides: fn(&Anchor) -> (f64, f64),
    scale: fn(&mut Anchor, f64),
) {
    if minimal <= 0.0 {
        return;
    }
    let n = anchors.len().min(node_extents.clone().count());
    let nodes = &anchors[..n];
    let current = nodes
        .iter()
        .fold(Span::EMPTY, |s, a| {
            let (lo, hi) = sides(a);
            s.add(lo).add(hi)
        })
        .len();
    if current >= minimal {
        return;
    }
    let desired = node_extents
        .take(n)
        .fold(Span::EMPTY, |s, e| s.add(e / 2.0).add(minimal - e / 2.0))
        .len();
    let centers = nodes.iter().fold(Span::EMPTY, |s, a| s.add(center(a))).len();
    if centers <= EPS {
        return;
    }
    let k = desired / centers;
    if k > 1.0 {
        for a in anchors.iter_mut() {
            scale(a, k);
        }
    }
}

pub(crate) fn satisfy_minimal_width(anchors: &mut [Anchor], node_sizes: &[Size], minimal: f64) {
    satisfy_minimal_extent(
        anchors,
        node_sizes.iter().map(|s| s.width),
        minimal,
        |a| a.x,
        |a| (a.left(), a.right()),
        |a, k| a.x *= k,
    );
}

pub(crate) fn satisfy_minimal_height(anchors: &mut [Anchor], node_sizes: &[Size], minimal: f64) {
    satisfy_minimal_extent(
        anchors,
        node_sizes.iter().map(|s| s.height),
        minimal,
        |a| a.y,
        |a| (a.bottom(), a.top()),
        |a, k| a.y *= k,
    );
}

/// Shifts every input node so that its left side lies on a multiple of `grid`, and gives back
/// the half grid cell the anchors were widened by. `block_of` maps a node to the node whose
/// shift it shares, so vertically aligned nodes stay aligned.
pub(crate) fn snap_left_sides_to_grid(
    anchors: &mut [Anchor],
    node_sizes: &[Size],
    grid: f64,
    block_of: impl Fn(usize) -> usize,
) {
    if grid <= 0.0 {
        return;
    }
    let n = node_sizes.len();
    for a in anchors.iter_mut().take(n) {
        a.left_anchor -= grid / 2.0;
        a.right_anchor -= grid / 2.0;
    }
    let mut shifts: Vec<Option<f64>> = vec![None; n];
    for v in 0..n {
        let root = block_of(v);
        let shift = *shifts[root]
            .get_or_insert_with(|| grid_shift(anchors[root].x - node_sizes[root].width / 2.0, grid));
        anchors[v].x += shift;
    }
}

/// Move that brings `left` onto the nearest grid line.
fn grid_shift(left: f64, grid: f64) -> f64 {
    let delta = left - (left / grid).floor() * grid;
    if delta.abs() < 1e-3 {
        0.0
    } else if delta <= grid / 2.0 {
        -delta
    } else {
        grid - delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64, half: f64) -> Anchor {
        let mut a = Anchor::new(half, half, half, half);
        a.x = x;
        a.y = y;
        a
    }

    #[test]
    fn grid_snapping_picks_the_nearer_line() {
        let sizes = [Size::new(10.0, 10.0), Size::new(10.0, 10.0)];
        // Anchors were widened by half a cell on each side.
        let mut anchors = [at(17.0, 0.0, 10.0), at(-2.0, 0.0, 10.0)];
        snap_left_sides_to_grid(&mut anchors, &sizes, 10.0, |v| v);
        // Left sides 12 -> 10 and -7 -> -10.
        assert!((anchors[0].x - 15.0).abs() < 1e-9);
        assert!((anchors[1].x + 5.0).abs() < 1e-9);
        assert!((anchors[0].left_anchor - 5.0).abs() < 1e-9);
    }

    #[test]
    fn aligned_nodes_snap_together() {
        // Same center, different widths: each left side alone would round differently.
        let sizes = [Size::new(10.0, 10.0), Size::new(24.0, 10.0)];
        let mut anchors = [at(17.0, 50.0, 10.0), at(17.0, 0.0, 17.0)];
        snap_left_sides_to_grid(&mut anchors, &sizes, 10.0, |_| 0);
        assert!((anchors[0].x - 15.0).abs() < 1e-9);
        assert_eq!(anchors[0].x, anchors[1].x);
    }

    #[test]
    fn aspect_ratio_stretches_the_short_axis() {
        let mut anchors = [at(0.0, 0.0, 5.0), at(100.0, 0.0, 5.0)];
        // Box is 110 x 10; asking for 1:1 stretches y by 11.
        stretch_to_aspect_ratio(&mut anchors, 1.0);
        let b = anchors_box(&anchors);
        assert!((b.width() - b.height()).abs() < 1e-6);
    }

    #[test]
    fn middle_node_moves_onto_the_segment() {
        let la = LayerArrays::new(vec![2, 1, 0]);
        let mut anchors = [at(0.0, 100.0, 1.0), at(30.0, 50.0, 1.0), at(20.0, 0.0, 1.0)];
        straighten_short_edges(&[(0, 1, 2)], &la, &mut anchors, 10.0);
        assert!((anchors[1].x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn minimal_width_spreads_centers() {
        let sizes = [Size::new(10.0, 10.0), Size::new(10.0, 10.0)];
        let mut anchors = [at(0.0, 0.0, 5.0), at(20.0, 0.0, 5.0)];
        satisfy_minimal_width(&mut anchors, &sizes, 100.0);
        let b = anchors_box(&anchors);
        assert!((b.width() - 100.0).abs() < 1e-6);
    }
}
