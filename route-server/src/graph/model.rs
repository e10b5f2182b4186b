//! In-memory campus graph.
//!
//! A [`Graph`] is validated and backfilled at construction time, so code
//! that receives one can trust that every edge endpoint exists and every
//! edge carries a usable distance and time. Graphs are never mutated after
//! construction; share them as `Arc<Graph>`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geo::{LatLng, haversine_m};

use super::error::GraphError;

/// Walking speed assumed when the graph metadata does not provide one.
pub const DEFAULT_WALK_SPEED_MPS: f64 = 1.4;

/// Prefix of node ids generated from coordinates by the GeoJSON importer.
const GENERIC_PREFIX: &str = "n_";

/// What a node represents on the campus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Gate,
    Intersection,
    Landmark,
    BusStop,
    Waypoint,
}

impl NodeKind {
    /// Parse the `type` tag used in graph files.
    ///
    /// Unknown tags are treated as plain waypoints.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "gate" => NodeKind::Gate,
            "intersection" | "junction" => NodeKind::Intersection,
            "landmark" => NodeKind::Landmark,
            "bus_stop" | "busstop" | "stop" => NodeKind::BusStop,
            _ => NodeKind::Waypoint,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Gate => "gate",
            NodeKind::Intersection => "intersection",
            NodeKind::Landmark => "landmark",
            NodeKind::BusStop => "bus_stop",
            NodeKind::Waypoint => "waypoint",
        }
    }
}

/// A point in the walkable campus graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    /// Missing in some hand-written graphs.
    pub position: Option<LatLng>,
    pub kind: NodeKind,
    /// External bus stop identifier, set by the GeoJSON importer when a stop
    /// was snapped onto this node.
    pub stop_id: Option<String>,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        position: Option<LatLng>,
        kind: NodeKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            kind,
            stop_id: None,
        }
    }

    pub fn with_stop_id(mut self, stop_id: impl Into<String>) -> Self {
        self.stop_id = Some(stop_id.into());
        self
    }

    /// Name to show to a user: the node name, or its id when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Returns true for auto-generated, coordinate-derived waypoints.
    pub fn is_generic(&self) -> bool {
        self.label().starts_with(GENERIC_PREFIX)
    }
}

/// A directed walkable connection between two nodes.
///
/// A `distance` or `time` that is not strictly positive means "unknown";
/// [`Graph::new`] replaces it with a derived value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    /// Metres.
    pub distance: f64,
    /// Seconds.
    pub time: f64,
    pub slope_penalty: f64,
    pub stairs_penalty: f64,
    pub accessibility_cost: f64,
    pub shaded_preference: f64,
    pub safety_weight: f64,
}

impl Edge {
    /// Create an edge with all penalty and preference factors at zero.
    pub fn new(from: impl Into<String>, to: impl Into<String>, distance: f64, time: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
            time,
            ..Self::default()
        }
    }
}

/// Descriptive graph metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphMeta {
    pub code: String,
    pub name: String,
    pub avg_walk_speed_mps: Option<f64>,
}

impl GraphMeta {
    /// Effective walking speed, falling back to [`DEFAULT_WALK_SPEED_MPS`].
    pub fn walk_speed_mps(&self) -> f64 {
        match self.avg_walk_speed_mps {
            Some(speed) if speed.is_finite() && speed > 0.0 => speed,
            _ => DEFAULT_WALK_SPEED_MPS,
        }
    }
}

/// A validated, immutable campus graph.
#[derive(Debug, Clone)]
pub struct Graph {
    meta: GraphMeta,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    /// Node id to position in `nodes`.
    index: HashMap<String, usize>,
    /// Outgoing edge indices per node, in source order.
    outgoing: Vec<Vec<usize>>,
    /// (from, to) node indices per edge.
    endpoints: Vec<(usize, usize)>,
}

impl Graph {
    /// Validate the parts and build a graph.
    ///
    /// Fails on duplicate node ids and on edges whose endpoints are not in
    /// `nodes`. Missing edge distances are derived from endpoint coordinates
    /// (0 when either endpoint has none) and missing times from the distance
    /// and the graph walking speed.
    pub fn new(meta: GraphMeta, nodes: Vec<Node>, mut edges: Vec<Edge>) -> Result<Self, GraphError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::invalid(format!(
                    "duplicate node id '{}'",
                    node.id
                )));
            }
        }

        let walk_speed = meta.walk_speed_mps();
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut endpoints = Vec::with_capacity(edges.len());

        for (i, edge) in edges.iter_mut().enumerate() {
            let (Some(&from), Some(&to)) = (index.get(&edge.from), index.get(&edge.to)) else {
                return Err(GraphError::DanglingEdge {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            };

            if !(edge.distance > 0.0) {
                edge.distance = match (nodes[from].position, nodes[to].position) {
                    (Some(a), Some(b)) => haversine_m(a, b),
                    _ => 0.0,
                };
            }
            if !(edge.time > 0.0) {
                edge.time = edge.distance / walk_speed;
            }

            outgoing[from].push(i);
            endpoints.push((from, to));
        }

        Ok(Self {
            meta,
            nodes,
            edges,
            index,
            outgoing,
            endpoints,
        })
    }

    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Position of the node with `id` in [`Graph::nodes`].
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Panics if `idx` is out of bounds.
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|i| &self.nodes[i])
    }

    /// Panics if `idx` is out of bounds.
    pub fn edge(&self, idx: usize) -> &Edge {
        &self.edges[idx]
    }

    /// (from, to) node indices of the edge at `idx`.
    pub fn edge_endpoints(&self, idx: usize) -> (usize, usize) {
        self.endpoints[idx]
    }

    /// Indices of the edges leaving node `idx`, in source order.
    pub fn outgoing(&self, idx: usize) -> &[usize] {
        &self.outgoing[idx]
    }

    /// First edge in source order from `from` to `to`.
    pub fn edge_between(&self, from: &str, to: &str) -> Option<&Edge> {
        let from_idx = self.node_index(from)?;
        let to_idx = self.node_index(to)?;
        self.outgoing[from_idx]
            .iter()
            .find(|&&e| self.endpoints[e].1 == to_idx)
            .map(|&e| &self.edges[e])
    }

    /// Walking speed for this graph in metres per second.
    pub fn walk_speed_mps(&self) -> f64 {
        self.meta.walk_speed_mps()
    }

    /// Returns true if every node has coordinates.
    pub fn fully_positioned(&self) -> bool {
        self.nodes.iter().all(|n| n.position.is_some())
    }

    /// All bus stop nodes, in source order.
    pub fn bus_stops(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind == NodeKind::BusStop)
    }
}
