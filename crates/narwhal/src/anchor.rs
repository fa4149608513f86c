//! Reserved space around a node center.

/// Half-extents and center of a node in the internal drawing (y grows upward).
///
/// An anchor can stand for an edge label carried by a virtual node; the label then occupies
/// one side and the anchor is asymmetric.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub left_anchor: f64,
    pub right_anchor: f64,
    pub top_anchor: f64,
    pub bottom_anchor: f64,
    pub x: f64,
    pub y: f64,
    /// Index of the input node, `None` for virtual nodes.
    pub node: Option<usize>,
    pub represents_label: bool,
    pub label_to_the_left: bool,
    pub label_to_the_right: bool,
}

impl Anchor {
    pub fn new(left_anchor: f64, right_anchor: f64, top_anchor: f64, bottom_anchor: f64) -> Self {
        Self {
            left_anchor,
            right_anchor,
            top_anchor,
            bottom_anchor,
            ..Self::default()
        }
    }

    pub fn for_node(node: usize, width: f64, height: f64) -> Self {
        let mut a = Self::new(width / 2.0, width / 2.0, height / 2.0, height / 2.0);
        a.node = Some(node);
        a
    }

    pub fn is_virtual(&self) -> bool {
        self.node.is_none()
    }

    pub fn width(&self) -> f64 {
        self.left_anchor + self.right_anchor
    }

    pub fn height(&self) -> f64 {
        self.top_anchor + self.bottom_anchor
    }

    pub fn left(&self) -> f64 {
        self.x - self.left_anchor
    }

    pub fn right(&self) -> f64 {
        self.x + self.right_anchor
    }

    pub fn top(&self) -> f64 {
        self.y + self.top_anchor
    }

    pub fn bottom(&self) -> f64 {
        self.y - self.bottom_anchor
    }

    /// Center of the reserved box; differs from `(x, y)` for asymmetric anchors.
    pub fn box_center(&self) -> (f64, f64) {
        (
            (self.left() + self.right()) / 2.0,
            (self.top() + self.bottom()) / 2.0,
        )
    }

    /// Moves the label side to the left of the center, keeping the box in place.
    pub(crate) fn put_label_to_the_left(&mut self) {
        let right = self.right();
        std::mem::swap(&mut self.left_anchor, &mut self.right_anchor);
        self.x = right - self.right_anchor;
        self.label_to_the_left = true;
        self.label_to_the_right = false;
    }
}
