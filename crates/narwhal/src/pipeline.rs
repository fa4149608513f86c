//! The layered layout engine.
//!
//! [`LayeredLayout::new`] builds the integer model and removes cycles; [`LayeredLayout::run`]
//! ranks, orders and positions. The engine keeps its state after a run so that
//! [`LayeredLayout::incremental_update`] can react to a resized node without ranking or
//! ordering again.

pub(crate) mod incremental;
pub(crate) mod post;

use crate::acyclic;
use crate::balance::balance;
use crate::cancel::CancelToken;
use crate::constraints::Constraints;
use crate::database::Database;
use crate::edge_paths::insert_paths;
use crate::error::{Error, Result};
use crate::glue::VerticalConstraints;
use crate::graph::{Graph, Point, Rect, Size};
use crate::layer_arrays::LayerArrays;
use crate::layer_inserter::insert_layers;
use crate::model::{IntEdge, RankEdge};
use crate::normalize::create_proper_layered_graph;
use crate::order::{HorizontalConstraints, order_layers};
use crate::position::xlayout::{self, XLayoutGraph};
use crate::position::{self, bk};
use crate::proper_graph::ProperLayeredGraph;
use crate::rank::rank_general_graph;
use crate::recovery;
use crate::settings::LayoutSettings;
use indexmap::IndexMap;
use narwhal_graph::{BasicGraph, GraphEdge, IntPair};
use rustc_hash::FxBuildHasher;

/// Output of a layout run. Coordinates are in the requested direction.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    /// Center of every input node. Empty when only layering was requested.
    pub centers: Vec<Point>,
    /// Box around every node and edge path, padded by the margins.
    pub bounding_box: Rect,
    /// Layers of the input nodes (virtual nodes removed, empty layers dropped).
    pub layer_arrays: LayerArrays,
    /// Constraints that were ignored because they contradicted others.
    pub dropped_constraints: usize,
    pub layers_are_doubled: bool,
    pub used_brandes: bool,
}

impl LayoutResult {
    fn empty() -> Self {
        Self {
            bounding_box: Rect::empty(),
            ..Self::default()
        }
    }
}

/// What the engine exposes for callers that continue working on a layout.
#[derive(Debug, Clone)]
pub struct LayoutParts {
    /// Layers of the proper layered graph, `None` before a run.
    pub layer_arrays: Option<LayerArrays>,
    pub proper_graph: Option<ProperLayeredGraph>,
    pub database: Database,
    pub glued_skeleton: BasicGraph<RankEdge>,
}

/// How the nodes of each layer get their order.
pub(crate) enum NodeOrder<'a> {
    /// Crossing minimization.
    Minimize,
    /// Sorted by known internal-frame coordinates of the input nodes.
    ByCoordinates(&'a [Point]),
}

/// State kept after a run.
#[derive(Debug, Clone)]
pub(crate) struct Engine {
    pub(crate) proper: ProperLayeredGraph,
    pub(crate) la: LayerArrays,
    pub(crate) xlayout: Option<XLayoutGraph>,
    pub(crate) layers_are_doubled: bool,
    pub(crate) used_brandes: bool,
    pub(crate) dropped: usize,
}

#[derive(Debug, Clone)]
pub struct LayeredLayout {
    settings: LayoutSettings,
    /// Node sizes in the internal top-to-bottom frame.
    node_sizes: Vec<Size>,
    constraints: Constraints,
    vertical: VerticalConstraints,
    /// The database right after cycle removal; every run starts from a copy.
    base_db: Database,
    db: Database,
    skeleton: BasicGraph<RankEdge>,
    engine: Option<Engine>,
}

impl LayeredLayout {
    /// Validates `graph`, builds the integer model and reverses a feedback edge set.
    pub fn new(graph: &Graph, settings: LayoutSettings) -> Result<Self> {
        let mut layout = Self::build(graph, settings, &graph.constraints)?;
        let n = layout.node_sizes.len();
        {
            let _span = tracing::debug_span!("cycle_removal", nodes = n).entered();
            acyclic::run(&mut layout.db, n, &layout.vertical);
        }
        layout.finish_model();
        Ok(layout)
    }

    fn build(graph: &Graph, settings: LayoutSettings, constraints: &Constraints) -> Result<Self> {
        graph.validate()?;
        let settings = settings.normalized();
        let horizontal = settings.direction.is_horizontal();
        let internal = |s: Size| if horizontal { s.transposed() } else { s };

        let node_sizes: Vec<Size> = graph.nodes.iter().map(|n| internal(n.size())).collect();
        let mut db = Database::new();
        for (ix, e) in graph.edges.iter().enumerate() {
            let mut ie = IntEdge::new(e.source, e.target);
            ie.weight = e.weight;
            ie.separation = e.separation;
            ie.label = e.label.map(internal);
            ie.input_index = Some(ix);
            db.register_edge(ie);
        }
        let vertical = VerticalConstraints::new(node_sizes.len(), constraints);

        Ok(Self {
            settings,
            node_sizes,
            constraints: constraints.clone(),
            vertical,
            base_db: Database::new(),
            db,
            skeleton: BasicGraph::default(),
            engine: None,
        })
    }

    fn finish_model(&mut self) {
        self.skeleton = glued_skeleton(&self.db, &self.vertical, self.node_sizes.len());
        self.base_db = self.db.clone();
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn node_count(&self) -> usize {
        self.node_sizes.len()
    }

    /// The weighted glued DAG the ranking runs on.
    pub fn glued_skeleton(&self) -> &BasicGraph<RankEdge> {
        &self.skeleton
    }

    /// Ranks, orders and positions the graph.
    pub fn run(&mut self, cancel: &CancelToken) -> Result<LayoutResult> {
        let n = self.node_count();
        let _span = tracing::debug_span!(
            "layered_layout",
            nodes = n,
            edges = self.base_db.edge_count()
        )
        .entered();
        self.engine = None;
        if n == 0 {
            return Ok(LayoutResult::empty());
        }

        let layering = self.layering(Some(cancel))?;
        if self.settings.layering_only {
            return Ok(LayoutResult {
                layer_arrays: LayerArrays::new(layering),
                dropped_constraints: self.vertical.dropped_constraint_count(),
                ..LayoutResult::empty()
            });
        }
        self.run_with_layering(&layering, NodeOrder::Minimize, cancel)
    }

    /// Network simplex on the glued skeleton, balancing, then the layers of glued nodes.
    fn layering(&self, cancel: Option<&CancelToken>) -> Result<Vec<usize>> {
        let _span = tracing::debug_span!("rank").entered();
        if let Some(c) = cancel {
            c.check()?;
        }
        let n = self.node_count();
        let mut layering = rank_general_graph(n, self.skeleton.edges(), cancel)?;
        let moves = balance(
            &self.skeleton,
            &mut layering,
            &self.vertical.glued_node_counts(),
            cancel,
        )?;
        for v in 0..n {
            layering[v] = layering[self.vertical.node_to_repr(v)];
        }
        tracing::debug!(
            layers = layering.iter().copied().max().map_or(0, |m| m + 1),
            balancing_moves = moves,
            "ranked"
        );
        Ok(layering)
    }

    pub(crate) fn run_with_layering(
        &mut self,
        layering: &[usize],
        order: NodeOrder<'_>,
        cancel: &CancelToken,
    ) -> Result<LayoutResult> {
        let n = self.node_count();
        self.db = self.base_db.clone();
        self.engine = None;

        let normalized = {
            let _span = tracing::debug_span!("normalize").entered();
            create_proper_layered_graph(&mut self.db, layering, n)
        };
        let mut proper = normalized.graph;
        let mut la = LayerArrays::new(normalized.layering);
        cancel.check()?;

        let horizontal = self
            .constraints
            .has_horizontal()
            .then(|| HorizontalConstraints::new(&self.constraints, layering));
        match order {
            NodeOrder::Minimize => {
                order_layers(
                    &proper,
                    &mut la,
                    &self.settings,
                    horizontal.as_ref(),
                    Some(cancel),
                )?;
            }
            NodeOrder::ByCoordinates(centers) => {
                recovery::order_by_coordinates(&self.db, &mut la, centers, n);
            }
        }
        cancel.check()?;

        let layers_are_doubled = {
            let _span = tracing::debug_span!("insert_layers").entered();
            // Skipped when horizontal constraints drive the ordering.
            if horizontal.is_none() {
                insert_virtual_edges_if_needed(&mut self.db, la.y());
            }
            let (doubling, multiedges) = analyze_multiedges(&self.db, la.y());
            if doubling {
                (proper, la) = insert_layers(&mut self.db, &la, n);
            } else if multiedges {
                (proper, la) = insert_paths(&mut self.db, &proper, &la, n);
            }
            doubling
        };
        cancel.check()?;

        {
            let _span = tracing::debug_span!("anchors").entered();
            position::calculate_anchor_sizes(
                &mut self.db,
                &self.node_sizes,
                proper.node_count(),
                &self.settings,
            );
            position::calc_initial_y_anchor_locations(
                &mut self.db,
                &la,
                n,
                &self.settings,
                layers_are_doubled,
                cancel,
            )?;
        }
        cancel.check()?;

        let vertical_pairs = self.vertical_pairs();
        let used_brandes =
            proper.node_count() >= self.settings.brandes_threshold && vertical_pairs.is_empty();
        let node_sep = self.settings.node_separation;
        let xlayout = if used_brandes {
            bk::calculate_x_coordinates(&la, &proper, &mut self.db.anchors, node_sep);
            None
        } else {
            Some(xlayout::calculate_x_coordinates(
                &proper,
                &la,
                &mut self.db.anchors,
                node_sep,
                &vertical_pairs,
                Some(cancel),
            )?)
        };
        cancel.check()?;

        self.post_process(&proper, &la, xlayout.as_ref());

        let dropped = self.vertical.dropped_constraint_count()
            + horizontal
                .as_ref()
                .map_or(0, HorizontalConstraints::dropped_constraint_count)
            + xlayout
                .as_ref()
                .map_or(0, XLayoutGraph::dropped_vertical_pairs);
        self.engine = Some(Engine {
            proper,
            la,
            xlayout,
            layers_are_doubled,
            used_brandes,
            dropped,
        });
        Ok(self.result())
    }

    fn post_process(
        &mut self,
        proper: &ProperLayeredGraph,
        la: &LayerArrays,
        xlayout: Option<&XLayoutGraph>,
    ) {
        let _span = tracing::debug_span!("post_process").entered();
        let s = &self.settings;
        let anchors = &mut self.db.anchors;
        if s.optimize_label_sides {
            post::optimize_label_sides(proper, anchors);
        }
        if s.straighten_short_edges {
            let paths: Vec<(usize, usize, usize)> = self
                .db
                .edges()
                .iter()
                .filter(|e| e.layer_span() == 2)
                .map(|e| {
                    let (a, b) = (e.layer_edges[0], e.layer_edges[1]);
                    (a.source, a.target, b.target)
                })
                .collect();
            post::straighten_short_edges(&paths, la, &mut self.db.anchors, s.node_separation);
        }

        let horizontal = s.direction.is_horizontal();
        let anchors = &mut self.db.anchors;
        if s.aspect_ratio > 0.0 {
            let target = if horizontal {
                1.0 / s.aspect_ratio
            } else {
                s.aspect_ratio
            };
            post::stretch_to_aspect_ratio(anchors, target);
        }
        let (min_w, min_h) = if horizontal {
            (s.minimal_height, s.minimal_width)
        } else {
            (s.minimal_width, s.minimal_height)
        };
        post::satisfy_minimal_width(anchors, &self.node_sizes, min_w);
        post::satisfy_minimal_height(anchors, &self.node_sizes, min_h);
        if s.grid_size_by_x > 0.0 {
            post::snap_left_sides_to_grid(anchors, &self.node_sizes, s.grid_size_by_x, |v| {
                xlayout.map_or(v, |xg| xg.variable_of(v))
            });
        }
    }

    /// Up-down-vertical pairs that survived gluing, as proper-graph node pairs.
    fn vertical_pairs(&self) -> Vec<IntPair> {
        let n = self.node_count();
        self.constraints
            .up_down_vertical
            .iter()
            .filter(|&&(a, b)| a < n && b < n && a != b)
            .map(|&(a, b)| IntPair::new(a, b))
            .collect()
    }

    /// Result of the last run, read from the anchors.
    pub(crate) fn result(&self) -> LayoutResult {
        let Some(engine) = &self.engine else {
            return LayoutResult::empty();
        };
        let n = self.node_count();
        let dir = self.settings.direction;
        let centers = self.db.anchors[..n]
            .iter()
            .map(|a| {
                let (x, y) = dir.apply(a.x, a.y);
                Point::new(x, y)
            })
            .collect();

        let mut internal = post::anchors_box(&self.db.anchors);
        internal.pad(self.settings.margins);
        let mut bounding_box = Rect::empty();
        if !internal.is_empty() {
            for (x, y) in [
                (internal.left, internal.bottom),
                (internal.right, internal.top),
            ] {
                let (x, y) = dir.apply(x, y);
                bounding_box.add_point(x, y);
            }
        }

        LayoutResult {
            centers,
            bounding_box,
            layer_arrays: engine.la.truncated(n),
            dropped_constraints: engine.dropped,
            layers_are_doubled: engine.layers_are_doubled,
            used_brandes: engine.used_brandes,
        }
    }

    /// Width and height of the drawing estimated from a ranking alone.
    pub fn approximate_dimensions(&self) -> Result<Size> {
        let n = self.node_count();
        if n == 0 {
            return Ok(Size::default());
        }
        let layers = rank_general_graph(n, self.skeleton.edges(), None)?;
        let layer_count = layers.iter().copied().max().map_or(0, |m| m + 1);
        let mut per_layer: Vec<Option<Size>> = vec![None; layer_count];
        for (v, &l) in layers.iter().enumerate() {
            let size = self.node_sizes[v];
            let acc = per_layer[l].get_or_insert(Size::default());
            acc.width += size.width + self.settings.node_separation;
            acc.height = acc.height.max(size.height);
        }
        let occupied: Vec<Size> = per_layer.into_iter().flatten().collect();
        let width = occupied.iter().map(|s| s.width).fold(0.0, f64::max);
        let height = self.settings.layer_separation * (occupied.len().saturating_sub(1)) as f64
            + occupied.iter().map(|s| s.height).sum::<f64>();
        let internal = Size::new(width, height);
        Ok(if self.settings.direction.is_horizontal() {
            internal.transposed()
        } else {
            internal
        })
    }

    /// Reconstructs an engine from the centers of a previous layered drawing of `graph` and
    /// lays it out again with the recovered layers and order. Returns `None` when the centers
    /// do not form clean layers.
    pub fn recover(
        graph: &Graph,
        centers: &[Point],
        settings: LayoutSettings,
        cancel: &CancelToken,
    ) -> Result<Option<(Self, LayoutResult)>> {
        let Some(recovered) = recovery::recover_layers(graph, centers) else {
            return Ok(None);
        };
        let mut settings = settings;
        settings.direction = recovered.direction;
        if recovered.layer_separation.is_finite() {
            settings.layer_separation = recovered.layer_separation;
        }

        let mut layout = Self::build(graph, settings, &Constraints::new())?;
        let n = layout.node_count();
        let layering = &recovered.layering;
        let against: Vec<IntPair> = layout
            .db
            .buckets()
            .map(|(p, _)| p)
            .filter(|p| layering[p.first] < layering[p.second])
            .collect();
        layout.db.add_feedback_set(against);
        layout.finish_model();

        let dir = layout.settings.direction;
        let internal: Vec<Point> = centers[..n]
            .iter()
            .map(|c| {
                let (x, y) = dir.unapply(c.x, c.y);
                Point::new(x, y)
            })
            .collect();
        let result =
            layout.run_with_layering(layering, NodeOrder::ByCoordinates(&internal), cancel)?;
        Ok(Some((layout, result)))
    }

    pub fn into_parts(self) -> LayoutParts {
        let (layer_arrays, proper_graph) = match self.engine {
            Some(e) => (Some(e.la), Some(e.proper)),
            None => (None, None),
        };
        LayoutParts {
            layer_arrays,
            proper_graph,
            database: self.db,
            glued_skeleton: self.skeleton,
        }
    }

    fn check_node(&self, node: usize) -> Result<()> {
        let node_count = self.node_count();
        if node >= node_count {
            return Err(Error::NodeOutOfRange { node, node_count });
        }
        Ok(())
    }
}

/// One rank edge per glued pair: the first edge of each bucket sets the separation, the
/// weights of every bucket member add up, and glued up-down pairs only constrain.
fn glued_skeleton(
    db: &Database,
    vertical: &VerticalConstraints,
    node_count: usize,
) -> BasicGraph<RankEdge> {
    let mut glued: IndexMap<IntPair, RankEdge, FxBuildHasher> = IndexMap::default();
    for (pair, ids) in db.buckets() {
        let gp = vertical.glued_pair(pair);
        let Some(&first) = ids.first() else {
            continue;
        };
        if gp.is_loop() {
            continue;
        }
        let sep = i64::from(db.edge(first).separation);
        glued
            .entry(gp)
            .and_modify(|e| e.separation = e.separation.max(sep))
            .or_insert(RankEdge::new(gp.first, gp.second, 0, sep));
    }
    for p in vertical.glued_up_down_pairs() {
        glued
            .entry(p)
            .or_insert(RankEdge::new(p.first, p.second, 0, 1));
    }
    for (pair, ids) in db.buckets() {
        let gp = vertical.glued_pair(pair);
        if let Some(e) = glued.get_mut(&gp) {
            e.weight += ids
                .iter()
                .map(|&id| i64::from(db.edge(id).weight))
                .sum::<i64>();
        }
    }
    BasicGraph::new(glued.into_values().collect(), node_count)
}

/// An even bucket spanning one layer gets an engine-made edge in its middle, so the fan of
/// parallel edges has a straight center line.
fn insert_virtual_edges_if_needed(db: &mut Database, y: &[usize]) {
    let even: Vec<(IntPair, usize)> = db
        .buckets()
        .filter(|(p, ids)| ids.len() % 2 == 0 && y[p.first] == y[p.second] + 1)
        .map(|(p, ids)| (p, ids.len()))
        .collect();
    for (pair, count) in even {
        let mut e = IntEdge::new(pair.first, pair.second);
        e.crossing_weight = 0;
        db.insert_edge_in_bucket(e, count / 2);
    }
}

/// `(needs layer doubling, has multiedges)`.
fn analyze_multiedges(db: &Database, y: &[usize]) -> (bool, bool) {
    if db
        .edges()
        .iter()
        .any(|e| e.has_label() && y[e.source()] != y[e.target()])
    {
        return (true, true);
    }
    let mut multiedges = false;
    for (pair, ids) in db.buckets() {
        if ids.len() > 1 && !pair.is_loop() {
            multiedges = true;
            if y[pair.first] == y[pair.second] + 1 {
                return (true, true);
            }
        }
    }
    (false, multiedges)
}
