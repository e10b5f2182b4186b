//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::graph::GraphError;
use crate::planner::{Planner, RouteError, RouteQuery};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/route", get(route))
        .route("/route/compare", get(compare_route))
        .route("/graphs/:code", get(graph_summary))
        .route("/graphs/:code/reload", post(reload_graph))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Plan a walking route from the user to a bus stop.
async fn route(
    State(state): State<AppState>,
    params: Result<Query<RouteParams>, QueryRejection>,
) -> Result<Json<RouteResponse>, AppError> {
    let request = validate(params)?;
    let route = plan_blocking(&state, request, |planner, query| planner.plan(query)).await?;
    Ok(Json(RouteResponse::from_route(&route)))
}

/// Run both search engines on the same request.
async fn compare_route(
    State(state): State<AppState>,
    params: Result<Query<RouteParams>, QueryRejection>,
) -> Result<Json<CompareResponse>, AppError> {
    let request = validate(params)?;
    let comparison =
        plan_blocking(&state, request, |planner, query| planner.compare(query)).await?;
    Ok(Json(CompareResponse::from_comparison(&comparison)))
}

/// Describe a campus graph, loading it if needed.
async fn graph_summary(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<GraphSummary>, AppError> {
    let graph = state.graphs.get_or_load(&code).await?;
    Ok(Json(GraphSummary::from_graph(&graph)))
}

/// Drop the cached graph and load it again from its source.
async fn reload_graph(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<GraphSummary>, AppError> {
    let graph = state.graphs.reload(&code).await?;
    info!(code = %code, "Reloaded campus graph");
    Ok(Json(GraphSummary::from_graph(&graph)))
}

fn validate(params: Result<Query<RouteParams>, QueryRejection>) -> Result<RouteRequest, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    params
        .validate()
        .map_err(|message| AppError::BadRequest { message })
}

/// Load the request's graph, then run `plan` on a blocking thread so long
/// searches do not stall the executor.
async fn plan_blocking<T, F>(state: &AppState, request: RouteRequest, plan: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&Planner<'_>, &RouteQuery) -> Result<T, RouteError> + Send + 'static,
{
    let graph = state.graphs.get_or_load(&request.code).await?;
    let config = Arc::clone(&state.config);

    let result = tokio::task::spawn_blocking(move || {
        let planner = Planner::new(&graph, &config);
        plan(&planner, &request.query)
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("route computation failed: {e}"),
    })?;

    Ok(result?)
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<GraphError> for AppError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::Graph(e) => e.into(),
            RouteError::EndpointUnresolved | RouteError::Unreachable => AppError::BadRequest {
                message: e.to_string(),
            },
            RouteError::Search(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, GraphCache};
    use crate::graph::{SAMPLE_GRAPH_JSON, StaticSource};
    use crate::planner::{SearchConfig, SearchError};

    fn state() -> AppState {
        let source = Arc::new(
            StaticSource::new()
                .with_graph("nitc", SAMPLE_GRAPH_JSON)
                .with_graph("broken", "{\"edges\": []}"),
        );
        AppState::new(
            GraphCache::new(source, &CacheConfig::default()),
            SearchConfig::default(),
        )
    }

    fn params() -> RouteParams {
        RouteParams {
            code: Some("nitc".into()),
            user_lat: Some(11.321),
            user_lng: Some(75.934),
            stop_id: Some("stopB".into()),
            ..RouteParams::default()
        }
    }

    async fn get_route(state: &AppState, params: RouteParams) -> Result<Json<RouteResponse>, AppError> {
        route(State(state.clone()), Ok(Query(params))).await
    }

    async fn error_body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn route_on_sample_graph() {
        let Json(response) = get_route(&state(), params()).await.unwrap();

        let ids: Vec<&str> = response.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["gate", "junction", "stopB"]);
        assert_eq!(response.total_distance_meters, 440);
        assert_eq!(response.estimated_time_seconds, 314);
        assert_eq!(response.reason, "minimized walking distance");
        assert_eq!(response.performance.nodes_visited, 4);
    }

    #[tokio::test]
    async fn route_with_astar() {
        let params = RouteParams {
            algo: Some("astar".into()),
            mode: Some("fastest".into()),
            bus_eta_seconds: Some(240.0),
            ..params()
        };
        let Json(response) = get_route(&state(), params).await.unwrap();

        assert_eq!(response.total_distance_meters, 440);
        assert_eq!(response.reason, "prioritized fastest arrival based on ETA");
        assert_eq!(response.performance.algo, crate::planner::Algorithm::AStar);
    }

    #[tokio::test]
    async fn route_errors_map_to_statuses() {
        let state = state();

        let err = get_route(
            &state,
            RouteParams {
                stop_id: Some("nowhere".into()),
                ..params()
            },
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "start or stop not found in graph");

        let err = get_route(
            &state,
            RouteParams {
                code: Some("nope".into()),
                ..params()
            },
        )
        .await
        .unwrap_err();
        let (status, _) = error_body(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let err = get_route(
            &state,
            RouteParams {
                code: Some("broken".into()),
                ..params()
            },
        )
        .await
        .unwrap_err();
        let (status, _) = error_body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let err = get_route(
            &state,
            RouteParams {
                mode: Some("scenic".into()),
                ..params()
            },
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("scenic"));
    }

    #[test]
    fn route_error_conversions() {
        let cases = [
            (RouteError::Unreachable, StatusCode::BAD_REQUEST),
            (RouteError::EndpointUnresolved, StatusCode::BAD_REQUEST),
            (
                RouteError::Search(SearchError::ExpansionLimit { limit: 1 }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RouteError::Graph(GraphError::NotFound {
                    code: "x".into(),
                }),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn compare_reports_both_engines() {
        let Json(response) = compare_route(State(state()), Ok(Query(params())))
            .await
            .unwrap();

        assert_eq!(response.dijkstra.path, response.astar.path);
        assert!(response.costs_agree);
        assert_eq!(response.dijkstra.nodes_visited, 4);
        assert_eq!(response.astar.nodes_visited, 3);
    }

    #[tokio::test]
    async fn graph_summary_and_reload() {
        let state = state();

        let Json(summary) = graph_summary(State(state.clone()), Path("NITC".into()))
            .await
            .unwrap();
        assert_eq!(summary.code, "nitc");
        assert_eq!(summary.bus_stops.len(), 2);

        let Json(reloaded) = reload_graph(State(state.clone()), Path("nitc".into()))
            .await
            .unwrap();
        assert_eq!(reloaded.node_count, summary.node_count);

        let err = graph_summary(State(state), Path("nope".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn reload_does_not_change_the_response() {
        let state = state();

        let mut first = serde_json::to_value(get_route(&state, params()).await.unwrap().0).unwrap();
        reload_graph(State(state.clone()), Path("nitc".into()))
            .await
            .unwrap();
        let mut second =
            serde_json::to_value(get_route(&state, params()).await.unwrap().0).unwrap();

        first["performance"]["timeMs"] = 0.into();
        second["performance"]["timeMs"] = 0.into();
        assert_eq!(first.to_string(), second.to_string());
    }
}
