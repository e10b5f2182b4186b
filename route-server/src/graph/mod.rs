//! Campus walking graph: model, sources and loading.
//!
//! Graphs are read from a [`GraphSource`] keyed by college code, parsed from
//! JSON, validated, and backfilled so that every edge has a positive
//! distance and time wherever the node coordinates allow it.

mod error;
mod loader;
mod model;
mod source;

pub use error::GraphError;
pub use loader::{load_graph, parse_graph};
pub use model::{DEFAULT_WALK_SPEED_MPS, Edge, Graph, GraphMeta, Node, NodeKind};
pub use source::{DirectorySource, GraphSource, StaticSource};

/// The bundled example campus graph (`data/graphs/nitc.json`).
pub const SAMPLE_GRAPH_JSON: &str = include_str!("../../data/graphs/nitc.json");
