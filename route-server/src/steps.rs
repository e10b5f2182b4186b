//! Turn-by-turn walking instructions.
//!
//! A path is split into legs that end at recognisable places. Runs of
//! auto-generated waypoints (ids like `n_11p321_75p934`) are folded into
//! the leg that passes through them, with their distances accumulated.

use crate::geo::haversine_m;
use crate::graph::{Graph, Node};

/// Origin label used when the walk starts at an anonymous waypoint.
pub const USER_LOCATION_LABEL: &str = "your location";

/// Build walking instructions for a path of node ids.
///
/// Returns one instruction per leg, naming the destination and the rounded
/// leg distance in metres. Paths with fewer than two nodes need no steps.
pub fn synthesize_steps(graph: &Graph, path: &[String]) -> Vec<String> {
    synthesize_steps_via(graph, path, &[])
}

/// Like [`synthesize_steps`], but hop `i` is measured on `edges[i]`, the
/// edge the search actually took. Hops beyond `edges` fall back to the
/// first edge between the two nodes.
pub fn synthesize_steps_via(graph: &Graph, path: &[String], edges: &[usize]) -> Vec<String> {
    if path.len() < 2 {
        return Vec::new();
    }

    let nodes: Vec<Option<&Node>> = path.iter().map(|id| graph.node_by_id(id)).collect();
    let labels: Vec<&str> = nodes
        .iter()
        .zip(path)
        .map(|(node, id)| node.map_or(id.as_str(), Node::label))
        .collect();
    let generic: Vec<bool> = nodes
        .iter()
        .map(|node| node.is_some_and(Node::is_generic))
        .collect();

    let last = path.len() - 1;
    let mut steps = Vec::new();
    let mut leg_start = 0;
    let mut leg_distance = 0.0;

    for i in 0..last {
        leg_distance += match edges.get(i) {
            Some(&edge) => graph.edge(edge).distance,
            None => segment_distance(graph, &path[i], &path[i + 1], nodes[i], nodes[i + 1]),
        };

        let next = i + 1;
        if next != last && generic[next] {
            continue;
        }

        let origin = if leg_start == 0 && generic[0] {
            USER_LOCATION_LABEL
        } else {
            labels[leg_start]
        };
        steps.push(format!(
            "Walk from {origin} to {} (~{} m)",
            labels[next],
            leg_distance.round() as i64
        ));

        leg_start = next;
        leg_distance = 0.0;
    }

    steps
}

/// Distance of one hop: the edge's distance if there is one, otherwise the
/// straight-line distance, otherwise zero.
fn segment_distance(
    graph: &Graph,
    from: &str,
    to: &str,
    from_node: Option<&Node>,
    to_node: Option<&Node>,
) -> f64 {
    if let Some(edge) = graph.edge_between(from, to) {
        return edge.distance;
    }
    match (
        from_node.and_then(|n| n.position),
        to_node.and_then(|n| n.position),
    ) {
        (Some(a), Some(b)) => haversine_m(a, b),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;
    use crate::graph::{Edge, GraphMeta, NodeKind, SAMPLE_GRAPH_JSON, parse_graph};

    fn ids(path: &[&str]) -> Vec<String> {
        path.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Graph {
        parse_graph(SAMPLE_GRAPH_JSON).unwrap()
    }

    /// user waypoint -> two generic waypoints -> gate -> generic -> stop
    fn waypoint_graph() -> Graph {
        let node = |id: &str, name: &str, lat: f64, kind| {
            Node::new(id, name, Some(LatLng::new(lat, 75.93)), kind)
        };
        let nodes = vec![
            node("n_0", "", 11.3200, NodeKind::Waypoint),
            node("n_1", "", 11.3201, NodeKind::Waypoint),
            node("n_2", "", 11.3202, NodeKind::Waypoint),
            node("gate", "Main Gate", 11.3203, NodeKind::Gate),
            node("n_3", "", 11.3204, NodeKind::Waypoint),
            node("stop", "Stop 1", 11.3205, NodeKind::BusStop),
        ];
        let edges = vec![
            Edge::new("n_0", "n_1", 10.0, 0.0),
            Edge::new("n_1", "n_2", 20.0, 0.0),
            Edge::new("n_2", "gate", 30.0, 0.0),
            Edge::new("gate", "n_3", 40.0, 0.0),
            Edge::new("n_3", "stop", 50.4, 0.0),
        ];
        Graph::new(GraphMeta::default(), nodes, edges).unwrap()
    }

    #[test]
    fn named_path_has_one_step_per_edge() {
        let graph = sample();
        let path = ids(&["gate", "junction", "library", "stopB"]);
        let steps = synthesize_steps(&graph, &path);

        assert_eq!(
            steps,
            vec![
                "Walk from Main Gate to Central Junction (~180 m)",
                "Walk from Central Junction to Library (~140 m)",
                "Walk from Library to Stop B (~350 m)",
            ]
        );
    }

    #[test]
    fn generic_waypoints_collapse() {
        let graph = waypoint_graph();
        let path = ids(&["n_0", "n_1", "n_2", "gate", "n_3", "stop"]);
        let steps = synthesize_steps(&graph, &path);

        assert_eq!(
            steps,
            vec![
                "Walk from your location to Main Gate (~60 m)",
                "Walk from Main Gate to Stop 1 (~90 m)",
            ]
        );
    }

    #[test]
    fn final_generic_node_is_still_a_destination() {
        let graph = waypoint_graph();
        let path = ids(&["gate", "n_3"]);
        let steps = synthesize_steps(&graph, &path);

        assert_eq!(steps, vec!["Walk from Main Gate to n_3 (~40 m)"]);
    }

    #[test]
    fn all_generic_path_is_a_single_leg() {
        let graph = waypoint_graph();
        let path = ids(&["n_0", "n_1", "n_2"]);
        let steps = synthesize_steps(&graph, &path);

        assert_eq!(steps, vec!["Walk from your location to n_2 (~30 m)"]);
    }

    #[test]
    fn short_paths_have_no_steps() {
        let graph = sample();
        assert!(synthesize_steps(&graph, &[]).is_empty());
        assert!(synthesize_steps(&graph, &ids(&["gate"])).is_empty());
    }

    #[test]
    fn missing_edge_uses_straight_line() {
        let graph = sample();
        // No direct edge from gate to library
        let steps = synthesize_steps(&graph, &ids(&["gate", "library"]));
        let gate = graph.node_by_id("gate").unwrap().position.unwrap();
        let library = graph.node_by_id("library").unwrap().position.unwrap();
        let expected = haversine_m(gate, library).round() as i64;

        assert_eq!(
            steps,
            vec![format!("Walk from Main Gate to Library (~{expected} m)")]
        );
    }

    #[test]
    fn parallel_edges_use_the_edge_taken() {
        let node = |id: &str, lat: f64| {
            Node::new(id, id.to_uppercase(), Some(LatLng::new(lat, 75.93)), NodeKind::Landmark)
        };
        let edges = vec![
            Edge {
                stairs_penalty: 3.0,
                ..Edge::new("a", "b", 500.0, 0.0)
            },
            Edge::new("a", "b", 100.0, 0.0),
        ];
        let graph = Graph::new(
            GraphMeta::default(),
            vec![node("a", 11.320), node("b", 11.321)],
            edges,
        )
        .unwrap();
        let path = ids(&["a", "b"]);

        assert_eq!(
            synthesize_steps_via(&graph, &path, &[1]),
            vec!["Walk from A to B (~100 m)"]
        );
        assert_eq!(
            synthesize_steps(&graph, &path),
            vec!["Walk from A to B (~500 m)"]
        );
    }

    #[test]
    fn idempotent() {
        let graph = waypoint_graph();
        let path = ids(&["n_0", "n_1", "n_2", "gate", "n_3", "stop"]);
        assert_eq!(
            synthesize_steps(&graph, &path),
            synthesize_steps(&graph, &path)
        );
    }
}
