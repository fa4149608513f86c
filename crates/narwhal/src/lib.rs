//! Sugiyama-style layered graph layout.
//!
//! A [`Graph`] of sized nodes and weighted edges is drawn in horizontal layers: cycles are
//! broken, nodes are ranked by network simplex, long edges are split into chains of virtual
//! nodes, layers are ordered to reduce crossings, and x coordinates come from either
//! Gansner–North or Brandes–Köpf.
//!
//! ```
//! use narwhal::{CancelToken, Graph, LayeredLayout, LayoutSettings};
//!
//! let mut g = Graph::new();
//! let a = g.add_node(40.0, 20.0);
//! let b = g.add_node(40.0, 20.0);
//! g.connect(a, b);
//!
//! let mut layout = LayeredLayout::new(&g, LayoutSettings::default()).unwrap();
//! let result = layout.run(&CancelToken::new()).unwrap();
//! assert!(result.centers[a].y > result.centers[b].y);
//! ```

pub use narwhal_graph as graph_core;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod acyclic;
pub mod anchor;
pub mod balance;
pub mod cancel;
pub mod constraints;
pub mod database;
pub mod edge_paths;
pub mod error;
pub mod glue;
pub mod graph;
pub mod greedy_fas;
pub mod layer_arrays;
pub mod layer_inserter;
pub mod model;
pub mod normalize;
pub mod order;
pub mod pipeline;
pub mod position;
pub mod proper_graph;
pub mod rank;
pub mod recovery;
pub mod settings;
mod util;

pub use cancel::CancelToken;
pub use constraints::Constraints;
pub use error::{Error, Result};
pub use graph::{Edge, Graph, Node, Point, Rect, Size};
pub use layer_arrays::LayerArrays;
pub use pipeline::{LayeredLayout, LayoutParts, LayoutResult};
pub use recovery::{RecoveredLayers, recover_layers};
pub use settings::{LayoutDirection, LayoutSettings, SnapToGrid};
