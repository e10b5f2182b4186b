//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::cost::RouteMode;
use crate::geo::LatLng;
use crate::graph::Graph;
use crate::planner::{Algorithm, Comparison, EngineRun, Route, RouteQuery};

/// Query parameters for `/route` and `/route/compare`.
///
/// Everything is optional at the wire level so that missing values produce
/// a specific message from [`RouteParams::validate`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    /// College code selecting the graph
    pub code: Option<String>,
    pub user_lat: Option<f64>,
    pub user_lng: Option<f64>,
    pub stop_id: Option<String>,
    pub stop_lat: Option<f64>,
    pub stop_lng: Option<f64>,
    /// `shortest`, `fastest` or `accessible`
    pub mode: Option<String>,
    /// `dijkstra` or `astar`
    pub algo: Option<String>,
    pub bus_eta_seconds: Option<f64>,
}

/// A validated route request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub code: String,
    pub query: RouteQuery,
}

impl RouteParams {
    /// Check the parameters and build a [`RouteRequest`].
    ///
    /// The error is a message suitable for a 400 response.
    pub fn validate(&self) -> Result<RouteRequest, String> {
        let code = self
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or("code is required")?;

        let user = match (self.user_lat, self.user_lng) {
            (Some(lat), Some(lng)) => LatLng::new(lat, lng),
            _ => return Err("userLat and userLng are required".into()),
        };
        if !user.is_valid() {
            return Err(format!("invalid user coordinates {user}"));
        }

        let stop_position = match (self.stop_lat, self.stop_lng) {
            (Some(lat), Some(lng)) => {
                let position = LatLng::new(lat, lng);
                if !position.is_valid() {
                    return Err(format!("invalid stop coordinates {position}"));
                }
                Some(position)
            }
            (None, None) => None,
            _ => return Err("stopLat and stopLng must be given together".into()),
        };

        let stop_id = self.stop_id.as_deref().map(str::trim).unwrap_or_default();
        if stop_id.is_empty() && stop_position.is_none() {
            return Err("stopId or stopLat/stopLng is required".into());
        }

        let mode = match self.mode.as_deref() {
            Some(mode) => mode.parse::<RouteMode>().map_err(|e| e.to_string())?,
            None => RouteMode::default(),
        };
        let algo = match self.algo.as_deref() {
            Some(algo) => algo.parse::<Algorithm>().map_err(|e| e.to_string())?,
            None => Algorithm::default(),
        };

        if let Some(eta) = self.bus_eta_seconds {
            if !eta.is_finite() {
                return Err("busEtaSeconds must be a finite number".into());
            }
        }

        let mut query = RouteQuery::new(user, stop_id)
            .with_mode(mode)
            .with_algo(algo);
        query.stop_position = stop_position;
        query.bus_eta_secs = self.bus_eta_seconds;

        Ok(RouteRequest {
            code: code.to_string(),
            query,
        })
    }
}

/// A node on a returned route.
#[derive(Debug, Serialize)]
pub struct RouteNodeResult {
    pub id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub name: String,
}

/// Search statistics for a route.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResult {
    pub algo: Algorithm,
    pub nodes_visited: usize,
    pub time_ms: u64,
}

/// Response for `/route`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub nodes: Vec<RouteNodeResult>,
    pub total_distance_meters: u64,
    pub estimated_time_seconds: u64,
    /// Same as `totalDistanceMeters`, kept for older clients
    pub total_distance: u64,
    /// Same as `estimatedTimeSeconds`, kept for older clients
    pub estimated_time: u64,
    pub reason: String,
    pub steps: Vec<String>,
    pub performance: PerformanceResult,
}

/// One engine's result in a comparison.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    pub algo: Algorithm,
    pub path: Vec<String>,
    pub total_cost: f64,
    pub total_distance_meters: u64,
    pub nodes_visited: usize,
    pub time_ms: u64,
}

/// Response for `/route/compare`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareResponse {
    pub mode: RouteMode,
    pub dijkstra: EngineResult,
    pub astar: EngineResult,
    pub costs_agree: bool,
}

/// A bus stop in a graph summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub stop_id: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Response for `/graphs/:code` and its reload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSummary {
    pub code: String,
    pub name: String,
    pub walk_speed_mps: f64,
    pub node_count: usize,
    pub edge_count: usize,
    pub bus_stops: Vec<StopResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl RouteResponse {
    /// Convert a planned route to its wire form.
    pub fn from_route(route: &Route) -> Self {
        let total_distance = round_non_negative(route.total_distance_m);
        let estimated_time = round_non_negative(route.estimated_time_s);

        Self {
            nodes: route
                .nodes
                .iter()
                .map(|n| RouteNodeResult {
                    id: n.id.clone(),
                    lat: n.position.map(|p| p.lat),
                    lng: n.position.map(|p| p.lng),
                    name: n.name.clone(),
                })
                .collect(),
            total_distance_meters: total_distance,
            estimated_time_seconds: estimated_time,
            total_distance,
            estimated_time,
            reason: route.reason.to_string(),
            steps: route.steps.clone(),
            performance: PerformanceResult {
                algo: route.performance.algo,
                nodes_visited: route.performance.nodes_visited,
                time_ms: millis(route.performance.elapsed),
            },
        }
    }
}

impl EngineResult {
    fn from_run(run: &EngineRun) -> Self {
        Self {
            algo: run.algo,
            path: run.path.clone(),
            total_cost: run.total_cost,
            total_distance_meters: round_non_negative(run.total_distance_m),
            nodes_visited: run.nodes_visited,
            time_ms: millis(run.elapsed),
        }
    }
}

impl CompareResponse {
    pub fn from_comparison(comparison: &Comparison) -> Self {
        Self {
            mode: comparison.mode,
            dijkstra: EngineResult::from_run(&comparison.dijkstra),
            astar: EngineResult::from_run(&comparison.astar),
            costs_agree: comparison.costs_agree(),
        }
    }
}

impl GraphSummary {
    pub fn from_graph(graph: &Graph) -> Self {
        let meta = graph.meta();
        Self {
            code: meta.code.clone(),
            name: meta.name.clone(),
            walk_speed_mps: graph.walk_speed_mps(),
            node_count: graph.node_count(),
            edge_count: graph.edge_count(),
            bus_stops: graph
                .bus_stops()
                .map(|n| StopResult {
                    id: n.id.clone(),
                    name: n.name.clone(),
                    stop_id: n.stop_id.clone(),
                    lat: n.position.map(|p| p.lat),
                    lng: n.position.map(|p| p.lng),
                })
                .collect(),
        }
    }
}

fn round_non_negative(value: f64) -> u64 {
    // `as` saturates and maps NaN to zero
    value.round().max(0.0) as u64
}

fn millis(elapsed: std::time::Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{SAMPLE_GRAPH_JSON, parse_graph};
    use crate::planner::{Planner, SearchConfig};

    fn params() -> RouteParams {
        RouteParams {
            code: Some("nitc".into()),
            user_lat: Some(11.321),
            user_lng: Some(75.934),
            stop_id: Some("stopB".into()),
            ..RouteParams::default()
        }
    }

    #[test]
    fn minimal_params_use_defaults() {
        let request = params().validate().unwrap();

        assert_eq!(request.code, "nitc");
        assert_eq!(request.query.stop_id, "stopB");
        assert_eq!(request.query.mode, RouteMode::Shortest);
        assert_eq!(request.query.algo, Algorithm::Dijkstra);
        assert_eq!(request.query.stop_position, None);
        assert_eq!(request.query.bus_eta_secs, None);
    }

    #[test]
    fn full_params() {
        let request = RouteParams {
            mode: Some("Accessible".into()),
            algo: Some("astar".into()),
            stop_lat: Some(11.326),
            stop_lng: Some(75.938),
            bus_eta_seconds: Some(240.0),
            ..params()
        }
        .validate()
        .unwrap();

        assert_eq!(request.query.mode, RouteMode::Accessible);
        assert_eq!(request.query.algo, Algorithm::AStar);
        assert_eq!(request.query.stop_position, Some(LatLng::new(11.326, 75.938)));
        assert_eq!(request.query.bus_eta_secs, Some(240.0));
    }

    #[test]
    fn rejects_bad_params() {
        let cases = [
            RouteParams {
                code: Some("  ".into()),
                ..params()
            },
            RouteParams {
                user_lng: None,
                ..params()
            },
            RouteParams {
                user_lat: Some(f64::NAN),
                ..params()
            },
            RouteParams {
                user_lat: Some(91.0),
                ..params()
            },
            RouteParams {
                stop_id: None,
                ..params()
            },
            RouteParams {
                stop_lat: Some(11.0),
                ..params()
            },
            RouteParams {
                mode: Some("scenic".into()),
                ..params()
            },
            RouteParams {
                algo: Some("bfs".into()),
                ..params()
            },
            RouteParams {
                bus_eta_seconds: Some(f64::INFINITY),
                ..params()
            },
        ];

        for case in cases {
            assert!(case.validate().is_err(), "{case:?}");
        }
    }

    #[test]
    fn unknown_mode_message() {
        let err = RouteParams {
            mode: Some("scenic".into()),
            ..params()
        }
        .validate()
        .unwrap_err();
        assert!(err.contains("scenic"));
    }

    #[test]
    fn stop_coordinates_alone_are_enough() {
        let request = RouteParams {
            stop_id: None,
            stop_lat: Some(11.325),
            stop_lng: Some(75.937),
            ..params()
        }
        .validate()
        .unwrap();
        assert_eq!(request.query.stop_id, "");
    }

    #[test]
    fn params_deserialize_from_query_string() {
        let params: RouteParams = serde_json::from_value(serde_json::json!({
            "code": "nitc",
            "userLat": 11.321,
            "userLng": 75.934,
            "stopId": "stopB",
            "busEtaSeconds": 120.0
        }))
        .unwrap();

        assert_eq!(params.user_lat, Some(11.321));
        assert_eq!(params.bus_eta_seconds, Some(120.0));
    }

    #[test]
    fn route_response_shape() {
        let graph = parse_graph(SAMPLE_GRAPH_JSON).unwrap();
        let config = SearchConfig::default();
        let request = params().validate().unwrap();
        let route = Planner::new(&graph, &config).plan(&request.query).unwrap();

        let json = serde_json::to_value(RouteResponse::from_route(&route)).unwrap();

        assert_eq!(json["totalDistanceMeters"], 440);
        assert_eq!(json["totalDistance"], 440);
        // 440 m at 1.4 m/s
        assert_eq!(json["estimatedTimeSeconds"], 314);
        assert_eq!(json["reason"], "minimized walking distance");
        assert_eq!(json["performance"]["algo"], "dijkstra");
        assert_eq!(json["performance"]["nodesVisited"], 4);
        assert!(json["performance"]["timeMs"].is_u64());
        assert_eq!(json["nodes"][0]["id"], "gate");
        assert_eq!(json["nodes"][0]["name"], "Main Gate");
        assert_eq!(json["nodes"][0]["lat"], 11.321);
        assert_eq!(json["steps"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn graph_summary_lists_bus_stops() {
        let graph = parse_graph(SAMPLE_GRAPH_JSON).unwrap();
        let summary = GraphSummary::from_graph(&graph);

        assert_eq!(summary.code, "nitc");
        assert_eq!(summary.node_count, 6);
        assert_eq!(summary.edge_count, 12);
        assert_eq!(summary.walk_speed_mps, 1.4);
        let ids: Vec<&str> = summary.bus_stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["stopA", "stopB"]);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_non_negative(314.28), 314);
        assert_eq!(round_non_negative(0.5), 1);
        assert_eq!(round_non_negative(-3.0), 0);
        assert_eq!(round_non_negative(f64::NAN), 0);
    }
}
