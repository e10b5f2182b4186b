//! Graph document parsing.
//!
//! Graph files are JSON documents with `meta`, `nodes` and `edges` keys.
//! The wire types here are deliberately loose (most fields optional) so
//! that missing values can be backfilled by [`Graph::new`] instead of
//! failing deserialization.

use serde::Deserialize;
use tracing::debug;

use super::error::GraphError;
use super::model::{Edge, Graph, GraphMeta, Node, NodeKind};
use super::source::GraphSource;
use crate::geo::LatLng;

#[derive(Debug, Deserialize)]
struct GraphDocument {
    meta: Option<MetaDocument>,
    nodes: Option<Vec<NodeDocument>>,
    edges: Option<Vec<EdgeDocument>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaDocument {
    code: Option<String>,
    name: Option<String>,
    avg_walk_speed_mps: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDocument {
    id: String,
    name: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    stop_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EdgeDocument {
    from: String,
    to: String,
    distance: Option<f64>,
    time: Option<f64>,
    slope_penalty: Option<f64>,
    stairs_penalty: Option<f64>,
    accessibility_cost: Option<f64>,
    shaded_preference: Option<f64>,
    safety_weight: Option<f64>,
}

impl From<NodeDocument> for Node {
    fn from(doc: NodeDocument) -> Self {
        let position = match (doc.lat, doc.lng) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        };
        let kind = doc
            .kind
            .as_deref()
            .map(NodeKind::from_tag)
            .unwrap_or(NodeKind::Waypoint);

        Node {
            id: doc.id,
            name: doc.name.unwrap_or_default(),
            position,
            kind,
            stop_id: doc.stop_id,
        }
    }
}

impl From<EdgeDocument> for Edge {
    fn from(doc: EdgeDocument) -> Self {
        Edge {
            from: doc.from,
            to: doc.to,
            distance: doc.distance.unwrap_or(0.0),
            time: doc.time.unwrap_or(0.0),
            slope_penalty: doc.slope_penalty.unwrap_or(0.0),
            stairs_penalty: doc.stairs_penalty.unwrap_or(0.0),
            accessibility_cost: doc.accessibility_cost.unwrap_or(0.0),
            shaded_preference: doc.shaded_preference.unwrap_or(0.0),
            safety_weight: doc.safety_weight.unwrap_or(0.0),
        }
    }
}

/// Parse and validate a graph document.
pub fn parse_graph(json: &str) -> Result<Graph, GraphError> {
    let (meta, nodes, edges) = parse_parts(json)?;
    Graph::new(meta, nodes, edges)
}

fn parse_parts(json: &str) -> Result<(GraphMeta, Vec<Node>, Vec<Edge>), GraphError> {
    let doc: GraphDocument = serde_json::from_str(json)?;

    let (Some(nodes), Some(edges)) = (doc.nodes, doc.edges) else {
        return Err(GraphError::invalid("expected nodes[] and edges[]"));
    };

    let meta = doc
        .meta
        .map(|m| GraphMeta {
            code: m.code.unwrap_or_default(),
            name: m.name.unwrap_or_default(),
            avg_walk_speed_mps: m.avg_walk_speed_mps,
        })
        .unwrap_or_default();

    Ok((
        meta,
        nodes.into_iter().map(Node::from).collect(),
        edges.into_iter().map(Edge::from).collect(),
    ))
}

/// Load the graph for a college code from `source`.
///
/// When the document's metadata has no code, the requested code is used.
pub fn load_graph<S: GraphSource + ?Sized>(source: &S, code: &str) -> Result<Graph, GraphError> {
    let code = code.trim();
    let json = source.read(code)?;

    let (mut meta, nodes, edges) = parse_parts(&json)?;
    if meta.code.is_empty() {
        meta.code = code.to_string();
    }
    let graph = Graph::new(meta, nodes, edges)?;

    debug!(
        code,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Loaded campus graph"
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::StaticSource;

    const SAMPLE: &str = crate::graph::SAMPLE_GRAPH_JSON;

    #[test]
    fn parses_sample_graph() {
        let graph = parse_graph(SAMPLE).unwrap();

        assert_eq!(graph.meta().code, "nitc");
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.edge_count(), 12);
        assert_eq!(graph.bus_stops().count(), 2);

        let library_stairs = graph.edge_between("junction", "library").unwrap();
        assert_eq!(library_stairs.stairs_penalty, 2.0);
        assert_eq!(library_stairs.accessibility_cost, 2.0);
        assert_eq!(library_stairs.shaded_preference, 0.0);
    }

    #[test]
    fn missing_edges_is_invalid() {
        let err = parse_graph(r#"{"nodes": []}"#).unwrap_err();
        assert_eq!(err, GraphError::invalid("expected nodes[] and edges[]"));
    }

    #[test]
    fn missing_nodes_is_invalid() {
        let err = parse_graph(r#"{"edges": []}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidGraph { .. }));
    }

    #[test]
    fn malformed_json_is_invalid() {
        let err = parse_graph("{").unwrap_err();
        assert!(matches!(err, GraphError::InvalidGraph { .. }));
    }

    #[test]
    fn non_array_nodes_is_invalid() {
        let err = parse_graph(r#"{"nodes": {}, "edges": []}"#).unwrap_err();
        assert!(matches!(err, GraphError::InvalidGraph { .. }));
    }

    #[test]
    fn dangling_edge_is_reported() {
        let json = r#"{
            "nodes": [{"id": "a", "name": "A", "lat": 0, "lng": 0}],
            "edges": [{"from": "a", "to": "b"}]
        }"#;
        let err = parse_graph(json).unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingEdge {
                from: "a".into(),
                to: "b".into()
            }
        );
    }

    #[test]
    fn optional_fields_default() {
        let json = r#"{
            "nodes": [
                {"id": "a", "lat": 0, "lng": 0},
                {"id": "b", "name": "B", "lat": 0.001, "lng": 0, "type": "bus_stop", "stopId": "s7"}
            ],
            "edges": [{"from": "a", "to": "b", "stairsPenalty": null}]
        }"#;
        let graph = parse_graph(json).unwrap();

        let a = graph.node_by_id("a").unwrap();
        assert_eq!(a.name, "");
        assert_eq!(a.kind, NodeKind::Waypoint);

        let b = graph.node_by_id("b").unwrap();
        assert_eq!(b.kind, NodeKind::BusStop);
        assert_eq!(b.stop_id.as_deref(), Some("s7"));

        let edge = graph.edge(0);
        assert_eq!(edge.stairs_penalty, 0.0);
        assert!(edge.distance > 100.0);
        // No meta: default walking speed
        assert!((edge.time - edge.distance / 1.4).abs() < 1e-9);
    }

    #[test]
    fn node_without_coordinates_has_no_position() {
        let json = r#"{
            "nodes": [{"id": "a", "lat": 1.0}, {"id": "b", "lat": 0, "lng": 0}],
            "edges": [{"from": "a", "to": "b"}]
        }"#;
        let graph = parse_graph(json).unwrap();
        assert!(graph.node_by_id("a").unwrap().position.is_none());
        assert_eq!(graph.edge(0).distance, 0.0);
    }

    #[test]
    fn load_fills_missing_code() {
        let source = StaticSource::new().with_graph("demo", r#"{"nodes": [], "edges": []}"#);
        let graph = load_graph(&source, "demo").unwrap();
        assert_eq!(graph.meta().code, "demo");
    }

    #[test]
    fn load_unknown_code() {
        let source = StaticSource::new();
        let err = load_graph(&source, "nope").unwrap_err();
        assert_eq!(
            err,
            GraphError::NotFound {
                code: "nope".into()
            }
        );
    }
}
