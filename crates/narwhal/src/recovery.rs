//! Reading layers back out of an existing layered drawing.
//!
//! Nodes whose centers share a coordinate form a layer. Layers must not overlap along the
//! layer axis, and the edge directions tell which way the drawing flows.

use crate::database::Database;
use crate::graph::{Graph, Point};
use crate::layer_arrays::LayerArrays;
use crate::settings::LayoutDirection;
use crate::util::{EPS, approx_eq};

/// Layers found in a drawing, in the internal frame of `direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredLayers {
    pub layering: Vec<usize>,
    pub direction: LayoutDirection,
    /// Smallest gap between neighbouring layers; infinite with a single layer.
    pub layer_separation: f64,
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Groups nodes by center `y` and by center `x`. Returns `None` when neither grouping gives
/// non-overlapping layers; when both do, ties go to `y`.
pub fn recover_layers(graph: &Graph, centers: &[Point]) -> Option<RecoveredLayers> {
    if centers.is_empty() || centers.len() != graph.node_count() {
        return None;
    }
    // A layered drawing has few edges inside a layer; the axis with fewer flat edges wins.
    match (
        recover_along(graph, centers, Axis::Y),
        recover_along(graph, centers, Axis::X),
    ) {
        (Some((y, y_flat)), Some((x, x_flat))) => Some(if x_flat < y_flat { x } else { y }),
        (y, x) => y.or(x).map(|(r, _)| r),
    }
}

fn recover_along(
    graph: &Graph,
    centers: &[Point],
    axis: Axis,
) -> Option<(RecoveredLayers, usize)> {
    let coord = |v: usize| match axis {
        Axis::X => centers[v].x,
        Axis::Y => centers[v].y,
    };
    let half = |v: usize| match axis {
        Axis::X => graph.nodes[v].width / 2.0,
        Axis::Y => graph.nodes[v].height / 2.0,
    };

    let mut sorted: Vec<usize> = (0..centers.len()).collect();
    sorted.sort_by(|&a, &b| coord(a).total_cmp(&coord(b)));
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for v in sorted {
        match groups.last_mut() {
            Some(g) if approx_eq(coord(g[0]), coord(v)) => g.push(v),
            _ => groups.push(vec![v]),
        }
    }

    let mut layer_separation = f64::INFINITY;
    for pair in groups.windows(2) {
        let top = pair[0]
            .iter()
            .map(|&v| coord(v) + half(v))
            .fold(f64::NEG_INFINITY, f64::max);
        let bottom = pair[1]
            .iter()
            .map(|&v| coord(v) - half(v))
            .fold(f64::INFINITY, f64::min);
        let gap = bottom - top;
        if gap <= 0.0 {
            return None;
        }
        layer_separation = layer_separation.min(gap);
    }

    let flat = graph
        .edges
        .iter()
        .filter(|e| e.source != e.target && approx_eq(coord(e.source), coord(e.target)))
        .count();
    let descending = graph
        .edges
        .iter()
        .any(|e| e.source != e.target && coord(e.source) > coord(e.target) + EPS);
    // With the flow toward smaller coordinates the groups ascend like internal layers;
    // otherwise they are counted from the far end.
    let direction = match (axis, descending) {
        (Axis::Y, true) => LayoutDirection::TopToBottom,
        (Axis::Y, false) => LayoutDirection::BottomToTop,
        (Axis::X, true) => LayoutDirection::RightToLeft,
        (Axis::X, false) => LayoutDirection::LeftToRight,
    };
    let k = groups.len();
    let mut layering = vec![0usize; centers.len()];
    for (i, g) in groups.iter().enumerate() {
        let layer = if descending { i } else { k - 1 - i };
        for &v in g {
            layering[v] = layer;
        }
    }
    tracing::debug!(layers = k, flat, ?direction, "recovered layers");
    Some((
        RecoveredLayers {
            layering,
            direction,
            layer_separation,
        },
        flat,
    ))
}

/// Orders every layer of `la` by x. `centers` are the internal-frame centers of the input
/// nodes; virtual nodes sit where the straight line of their edge meets their layer.
pub(crate) fn order_by_coordinates(
    db: &Database,
    la: &mut LayerArrays,
    centers: &[Point],
    node_count: usize,
) {
    let mut key = vec![0.0f64; la.node_count()];
    let mut layer_y = vec![f64::NAN; la.layer_count()];
    for v in 0..node_count.min(centers.len()) {
        key[v] = centers[v].x;
        let l = la.layer_of(v);
        if layer_y[l].is_nan() {
            layer_y[l] = centers[v].y;
        }
    }

    for e in db.edges() {
        if e.layer_edges.len() < 2 {
            continue;
        }
        let (Some(first), Some(last)) = (e.layer_edges.first(), e.layer_edges.last()) else {
            continue;
        };
        let (s, t) = (centers[first.source], centers[last.target]);
        for le in &e.layer_edges[1..] {
            let v = le.source;
            let y = layer_y[la.layer_of(v)];
            key[v] = if (t.y - s.y).abs() < EPS || y.is_nan() {
                (s.x + t.x) / 2.0
            } else {
                s.x + (t.x - s.x) * (y - s.y) / (t.y - s.y)
            };
        }
    }

    for i in 0..la.layer_count() {
        let mut order = la.layer(i).to_vec();
        order.sort_by(|&a, &b| key[a].total_cmp(&key[b]).then(a.cmp(&b)));
        la.set_layer_order(i, order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rows_are_not_layers() {
        let mut g = Graph::new();
        g.add_node(10.0, 40.0);
        g.add_node(10.0, 40.0);
        g.connect(0, 1);
        // 20 apart vertically but 40 tall; 100 apart horizontally.
        let centers = [Point::new(0.0, 20.0), Point::new(100.0, 0.0)];
        let r = recover_layers(&g, &centers).expect("columns");
        assert_eq!(r.direction, LayoutDirection::LeftToRight);
        assert_eq!(r.layering, vec![1, 0]);
        assert!((r.layer_separation - 90.0).abs() < 1e-9);
    }
}
