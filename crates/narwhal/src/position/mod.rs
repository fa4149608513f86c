//! Anchor sizing and vertical placement.
//!
//! Every node of the proper layered graph gets an [`Anchor`]: original nodes take their size
//! (grown for self loops), virtual nodes are thin, and the middle node of a labeled edge
//! carries the label on its right. Layers are then stacked from the bottom.

use crate::anchor::Anchor;
use crate::cancel::CancelToken;
use crate::database::Database;
use crate::error::Result;
use crate::graph::Size;
use crate::layer_arrays::LayerArrays;
use crate::settings::{LayoutSettings, SnapToGrid};
use narwhal_graph::{GraphEdge, IntPair};

pub mod bk;
pub mod xlayout;

pub(crate) const VIRTUAL_NODE_WIDTH: f64 = 1.0;

/// Extra room below the first layer before the margins.
pub(crate) const SPACE_BEFORE_MARGINS: f64 = 500.0;

pub(crate) fn virtual_node_height(settings: &LayoutSettings) -> f64 {
    settings.min_node_height * 1.5 / 8.0
}

/// Fills `db.anchors` for `total_nodes` proper-graph nodes. `node_sizes` covers the input
/// nodes, already in the internal orientation.
pub fn calculate_anchor_sizes(
    db: &mut Database,
    node_sizes: &[Size],
    total_nodes: usize,
    settings: &LayoutSettings,
) {
    let mut anchors = vec![Anchor::default(); total_nodes];
    for (i, size) in node_sizes.iter().enumerate().take(total_nodes) {
        anchors[i] = anchor_for_original_node(db, i, *size, settings);
    }

    let vh = virtual_node_height(settings) / 2.0;
    for e in db.edges() {
        let Some(last) = e.layer_edges.last() else {
            continue;
        };
        debug_assert_eq!(last.target, e.target());
        for le in &e.layer_edges[..e.layer_edges.len() - 1] {
            let v = le.target;
            let half_width = if db.is_multiple_middle(v) {
                VIRTUAL_NODE_WIDTH * 4.0
            } else {
                VIRTUAL_NODE_WIDTH / 2.0
            };
            anchors[v] = Anchor::new(half_width, half_width, vh, vh);
        }
        if let (Some(label), Some(lj)) = (e.label, e.label_vertex()) {
            let a = &mut anchors[lj];
            a.right_anchor = label.width;
            a.left_anchor = VIRTUAL_NODE_WIDTH * 8.0;
            if a.top_anchor < label.height / 2.0 {
                a.top_anchor = label.height / 2.0;
                a.bottom_anchor = label.height / 2.0;
            }
            a.represents_label = true;
            a.label_to_the_right = true;
        }
    }
    db.anchors = anchors;
}

pub(crate) fn anchor_for_original_node(
    db: &Database,
    i: usize,
    size: Size,
    settings: &LayoutSettings,
) -> Anchor {
    let mut left = size.width / 2.0;
    let mut right = left;
    let mut top = size.height / 2.0;
    let mut bottom = top;
    if settings.grid_size_by_x > 0.0 {
        left += settings.grid_size_by_x / 2.0;
        right += settings.grid_size_by_x / 2.0;
    }

    let self_loops = db.bucket(IntPair::new(i, i));
    if !self_loops.is_empty() {
        for &id in self_loops {
            if let Some(label) = db.edge(id).label {
                right += label.width;
                if top < label.height / 2.0 {
                    top = label.height / 2.0;
                    bottom = top;
                }
            }
        }
        right += (settings.node_separation + settings.min_node_width) * self_loops.len() as f64;
    }

    let hw = settings.min_node_width / 2.0;
    let hh = settings.min_node_height / 2.0;
    let mut a = Anchor::new(left.max(hw), right.max(hw), top.max(hh), bottom.max(hh));
    a.node = Some(i);
    a
}

/// Distance to the next multiple of `grid_size` at or above `y`.
pub(crate) fn snap_delta_up(y: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 {
        return 0.0;
    }
    let k = (y / grid_size).floor();
    let delta = y - k * grid_size;
    if delta.abs() < 1e-4 {
        return 0.0;
    }
    grid_size - delta
}

/// Height that flat edges need above each layer: a third of the layer separation per edge
/// plus the label heights, taking the tallest bucket of the layer.
fn flat_edge_heights(
    db: &Database,
    la: &LayerArrays,
    original_count: usize,
    settings: &LayoutSettings,
) -> Vec<f64> {
    let y = la.y();
    let dy = settings.layer_separation / 3.0;
    let mut heights = vec![0.0f64; la.layer_count()];
    for (pair, ids) in db.buckets() {
        if pair.is_loop() || pair.first >= original_count || pair.second >= original_count {
            continue;
        }
        let layer = y[pair.first];
        if y[pair.second] != layer {
            continue;
        }
        let h: f64 = ids
            .iter()
            .map(|&id| dy + db.edge(id).label.map_or(0.0, |l| l.height))
            .sum();
        heights[layer] = heights[layer].max(h);
    }
    heights
}

/// Stacks the layers from the bottom, layer 0 first. Returns the top of the last layer.
pub fn calc_initial_y_anchor_locations(
    db: &mut Database,
    la: &LayerArrays,
    original_count: usize,
    settings: &LayoutSettings,
    layers_are_doubled: bool,
    cancel: &CancelToken,
) -> Result<f64> {
    let flat_heights = flat_edge_heights(db, la, original_count, settings);
    let mut ymax = settings.margins + SPACE_BEFORE_MARGINS;
    let mut layer_top = ymax;
    for (i, layer) in la.layers().iter().enumerate() {
        cancel.check()?;
        let mut bottom_max: f64 = 0.0;
        let mut top_max: f64 = 0.0;
        for &j in layer {
            bottom_max = bottom_max.max(db.anchors[j].bottom_anchor);
            top_max = top_max.max(db.anchors[j].top_anchor);
        }
        if layer.iter().any(|&j| j < original_count) {
            // Virtual nodes on a layer with real nodes are as tall as the layer.
            for &j in layer {
                if j >= original_count {
                    db.anchors[j].bottom_anchor = bottom_max;
                    db.anchors[j].top_anchor = top_max;
                }
            }
        }

        let flat = if i > 0 { flat_heights[i - 1] } else { 0.0 };
        let center = ymax + bottom_max + flat;
        layer_top = center + top_max;
        match settings.snap_to_grid_by_y {
            SnapToGrid::Top if settings.grid_size_by_y > 0.0 => {
                layer_top += snap_delta_up(layer_top, settings.grid_size_by_y);
                for &j in layer {
                    let a = &mut db.anchors[j];
                    a.y = layer_top - a.top_anchor;
                }
            }
            SnapToGrid::Bottom if settings.grid_size_by_y > 0.0 => {
                let mut layer_bottom = center - bottom_max;
                layer_bottom += snap_delta_up(layer_bottom, settings.grid_size_by_y);
                for &j in layer {
                    let a = &mut db.anchors[j];
                    a.y = layer_bottom + a.bottom_anchor;
                    layer_top = layer_top.max(a.top());
                }
            }
            _ => {
                for &j in layer {
                    db.anchors[j].y = center;
                }
            }
        }
        ymax = layer_top + settings.actual_layer_separation(layers_are_doubled);
    }
    Ok(layer_top)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapping_moves_up_to_the_grid() {
        assert_eq!(snap_delta_up(10.0, 0.0), 0.0);
        assert!((snap_delta_up(12.0, 5.0) - 3.0).abs() < 1e-9);
        assert_eq!(snap_delta_up(15.0, 5.0), 0.0);
        assert!((snap_delta_up(-2.0, 5.0) - 2.0).abs() < 1e-9);
    }

    fn flat_pair_database() -> (Database, LayerArrays) {
        let mut db = Database::new();
        let mut e = crate::model::IntEdge::new(1, 2);
        e.input_index = Some(0);
        db.register_edge(e);
        db.anchors = (0..3).map(|v| Anchor::for_node(v, 20.0, 20.0)).collect();
        (db, LayerArrays::new(vec![1, 0, 0]))
    }

    #[test]
    fn flat_edges_reserve_room_above_their_layer() {
        let (mut db, la) = flat_pair_database();
        let settings = LayoutSettings::default();
        assert_eq!(flat_edge_heights(&db, &la, 3, &settings), vec![10.0, 0.0]);

        let top = calc_initial_y_anchor_locations(
            &mut db,
            &la,
            3,
            &settings,
            false,
            &CancelToken::new(),
        )
        .unwrap();
        // Layer 1 sits a layer separation plus the flat edge room above layer 0.
        assert_eq!(db.anchors[0].y - db.anchors[1].y, 20.0 + 30.0 + 10.0);
        assert_eq!(top, db.anchors[0].y + 10.0);
    }

    #[test]
    fn y_placement_checks_cancellation_once_per_layer() {
        let (mut db, la) = flat_pair_database();
        let settings = LayoutSettings::default();
        let token = CancelToken::new();
        calc_initial_y_anchor_locations(&mut db, &la, 3, &settings, false, &token).unwrap();
        assert_eq!(token.progress(), la.layer_count() as u64);

        token.cancel();
        let r = calc_initial_y_anchor_locations(&mut db, &la, 3, &settings, false, &token);
        assert!(matches!(r, Err(crate::error::Error::Cancelled)));
    }
}
