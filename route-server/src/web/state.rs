//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::GraphCache;
use crate::planner::SearchConfig;

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Cached campus graphs
    pub graphs: Arc<GraphCache>,

    /// Route planner configuration
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(graphs: GraphCache, config: SearchConfig) -> Self {
        Self {
            graphs: Arc::new(graphs),
            config: Arc::new(config),
        }
    }
}
