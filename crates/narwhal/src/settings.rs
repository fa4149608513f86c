//! Layout settings.
//!
//! Every field has a default, so a partial JSON object such as `{"nodeSeparation": 20}` is a
//! complete configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub const MIN_LAYER_SEPARATION: f64 = 10.0;

/// How layer centers are aligned to a vertical grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapToGrid {
    #[default]
    None,
    /// Layer tops are placed on multiples of `grid_size_by_y`.
    Top,
    /// Layer bottoms are placed on multiples of `grid_size_by_y`.
    Bottom,
}

/// Direction in which edges flow in the reported coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutDirection {
    #[default]
    TopToBottom,
    BottomToTop,
    LeftToRight,
    RightToLeft,
}

impl LayoutDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LeftToRight | Self::RightToLeft)
    }

    /// Maps a point of the internal top-to-bottom drawing into this direction.
    pub fn apply(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::TopToBottom => (x, y),
            Self::BottomToTop => (-x, -y),
            Self::LeftToRight => (-y, x),
            Self::RightToLeft => (y, -x),
        }
    }

    /// Inverse of [`LayoutDirection::apply`].
    pub fn unapply(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            Self::TopToBottom => (x, y),
            Self::BottomToTop => (-x, -y),
            Self::LeftToRight => (y, -x),
            Self::RightToLeft => (-y, x),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutSettings {
    pub layer_separation: f64,
    pub node_separation: f64,
    /// Proper graphs with at least this many nodes use Brandes–Köpf for x coordinates.
    pub brandes_threshold: usize,
    pub random_seed_for_ordering: u64,
    pub max_number_of_passes_in_ordering: usize,
    pub no_gain_adjacent_swap_steps_bound: usize,
    pub repetition_coefficient_for_ordering: usize,
    pub min_node_width: f64,
    pub min_node_height: f64,
    pub minimal_width: f64,
    pub minimal_height: f64,
    /// Target width / height. Zero disables the stretch.
    pub aspect_ratio: f64,
    pub margins: f64,
    /// Stop after ranking: only layers are computed.
    pub layering_only: bool,
    pub grid_size_by_x: f64,
    pub grid_size_by_y: f64,
    pub snap_to_grid_by_y: SnapToGrid,
    pub direction: LayoutDirection,
    pub straighten_short_edges: bool,
    pub optimize_label_sides: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            layer_separation: 30.0,
            node_separation: 10.0,
            brandes_threshold: 600,
            random_seed_for_ordering: 1,
            max_number_of_passes_in_ordering: 24,
            no_gain_adjacent_swap_steps_bound: 5,
            repetition_coefficient_for_ordering: 1,
            min_node_width: 72.0 * 0.75 / 4.0,
            min_node_height: 72.0 * 0.5 / 4.0,
            minimal_width: 0.0,
            minimal_height: 0.0,
            aspect_ratio: 0.0,
            margins: 10.0,
            layering_only: false,
            grid_size_by_x: 0.0,
            grid_size_by_y: 0.0,
            snap_to_grid_by_y: SnapToGrid::None,
            direction: LayoutDirection::TopToBottom,
            straighten_short_edges: true,
            optimize_label_sides: true,
        }
    }
}

impl LayoutSettings {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(s)?;
        Ok(settings.normalized())
    }

    /// Applies the lower bounds every stage relies on.
    pub fn normalized(mut self) -> Self {
        if !(self.layer_separation >= MIN_LAYER_SEPARATION) {
            self.layer_separation = MIN_LAYER_SEPARATION;
        }
        self.node_separation = self.node_separation.max(0.0);
        self.min_node_width = self.min_node_width.max(0.8);
        self.min_node_height = self.min_node_height.max(0.4);
        self.minimal_width = self.minimal_width.max(0.0);
        self.minimal_height = self.minimal_height.max(0.0);
        self.aspect_ratio = self.aspect_ratio.max(0.0);
        self.margins = self.margins.max(0.0);
        self.grid_size_by_x = self.grid_size_by_x.max(0.0);
        self.grid_size_by_y = self.grid_size_by_y.max(0.0);
        self.repetition_coefficient_for_ordering = self.repetition_coefficient_for_ordering.max(1);
        self
    }

    /// Vertical distance between layer boxes; halved when layers were doubled.
    pub fn actual_layer_separation(&self, layers_are_doubled: bool) -> f64 {
        if layers_are_doubled {
            self.layer_separation / 2.0
        } else {
            self.layer_separation
        }
    }

    pub(crate) fn max_ordering_passes(&self) -> usize {
        self.max_number_of_passes_in_ordering * self.repetition_coefficient_for_ordering
    }

    pub(crate) fn no_gain_bound(&self) -> usize {
        self.no_gain_adjacent_swap_steps_bound * self.repetition_coefficient_for_ordering
    }
}
