use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use route_server::cache::GraphCache;
use route_server::config::ServerConfig;
use route_server::graph::DirectorySource;
use route_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("route_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    info!(dirs = ?config.graph_dirs, "Serving campus graphs");

    // Graphs are loaded lazily on first request
    let source = Arc::new(DirectorySource::new(config.graph_dirs.clone()));
    let graphs = GraphCache::new(source, &config.cache);

    let state = AppState::new(graphs, config.search.clone());
    let app = create_router(state);

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.addr, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!("Campus route server listening on http://{}", config.addr);
    info!("API Endpoints:");
    info!("  GET  /health                - Health check");
    info!("  GET  /route                 - Plan a walking route to a bus stop");
    info!("  GET  /route/compare         - Compare Dijkstra and A* on one request");
    info!("  GET  /graphs/:code          - Describe a campus graph");
    info!("  POST /graphs/:code/reload   - Reload a campus graph from disk");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
