//! Resizing a node after a run without ranking or ordering again.

use super::{LayeredLayout, LayoutResult};
use crate::anchor::Anchor;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::graph::Size;
use crate::layer_arrays::LayerArrays;
use crate::position::{self, bk};
use std::cmp::Ordering;

impl LayeredLayout {
    /// Gives `node` a new size, pushes the other layers away by half the height change and
    /// recomputes x. Post-processing is not repeated. Without a previous run this is a full
    /// run.
    pub fn incremental_update(
        &mut self,
        node: usize,
        width: f64,
        height: f64,
    ) -> Result<LayoutResult> {
        self.check_node(node)?;
        let size = Size::new(width, height);
        let size = if self.settings.direction.is_horizontal() {
            size.transposed()
        } else {
            size
        };
        self.node_sizes[node] = size;

        let mut resized = position::anchor_for_original_node(&self.db, node, size, &self.settings);
        let grid = self.settings.grid_size_by_x;
        if grid > 0.0 {
            // Grid snapping already gave back the half cell of every other node.
            resized.left_anchor -= grid / 2.0;
            resized.right_anchor -= grid / 2.0;
        }
        let Some(engine) = self.engine.as_mut() else {
            return self.run(&CancelToken::new());
        };
        let _span = tracing::debug_span!("incremental_update", node).entered();
        push_layers(&mut self.db.anchors, &engine.la, node, &resized);
        match engine.xlayout.as_mut() {
            Some(xg) => {
                xg.fix_edge_separation(&engine.la, &self.db.anchors, node);
                let xs = xg.solve(None)?;
                for (a, x) in self.db.anchors.iter_mut().zip(xs) {
                    a.x = x;
                }
            }
            None => bk::calculate_x_coordinates(
                &engine.la,
                &engine.proper,
                &mut self.db.anchors,
                self.settings.node_separation,
            ),
        }
        Ok(self.result())
    }
}

/// Gives `node` the extents of `resized`, keeping its center; layers below move down and
/// layers above move up by half the height change.
fn push_layers(anchors: &mut [Anchor], la: &LayerArrays, node: usize, resized: &Anchor) {
    let a = &mut anchors[node];
    let del_h = 0.5 * (resized.height() - a.height());
    a.left_anchor = resized.left_anchor;
    a.right_anchor = resized.right_anchor;
    a.top_anchor = resized.top_anchor;
    a.bottom_anchor = resized.bottom_anchor;

    let layer = la.layer_of(node);
    for (i, nodes) in la.layers().iter().enumerate() {
        let dy = match i.cmp(&layer) {
            Ordering::Less => -del_h,
            Ordering::Greater => del_h,
            Ordering::Equal => continue,
        };
        for &j in nodes {
            anchors[j].y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growing_a_node_pushes_other_layers_apart() {
        let la = LayerArrays::new(vec![1, 0, 2]);
        let mut anchors: Vec<Anchor> = (0..3).map(|v| Anchor::for_node(v, 10.0, 10.0)).collect();
        for (a, y) in anchors.iter_mut().zip([50.0, 0.0, 100.0]) {
            a.y = y;
        }
        push_layers(&mut anchors, &la, 0, &Anchor::for_node(0, 30.0, 30.0));
        assert_eq!(anchors[0].width(), 30.0);
        assert_eq!(anchors[0].y, 50.0);
        assert_eq!(anchors[1].y, -10.0);
        assert_eq!(anchors[2].y, 110.0);
    }
}
