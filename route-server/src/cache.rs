//! In-memory cache of loaded campus graphs.
//!
//! Graph files change rarely, so parsed graphs are kept as immutable
//! `Arc<Graph>` snapshots keyed by the trimmed college code as requested.
//! Keys keep their case because sources try the exact spelling first, so
//! `abc` and `ABC` may name different graphs. Entries expire after a TTL and
//! can be dropped explicitly to pick up an edited file. Concurrent misses
//! for the same code share a single load.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{debug, info};

use crate::graph::{Graph, GraphError, GraphSource, load_graph};

/// Configuration for the graph cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL for cached graphs.
    pub ttl: Duration,

    /// Maximum number of cached graphs.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 64,
        }
    }
}

/// Graph source with caching.
pub struct GraphCache {
    source: Arc<dyn GraphSource>,
    graphs: MokaCache<String, Arc<Graph>>,
}

impl GraphCache {
    /// Create a new cache in front of `source`.
    pub fn new(source: Arc<dyn GraphSource>, config: &CacheConfig) -> Self {
        let graphs = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { source, graphs }
    }

    /// Get the graph for `code`, loading it from the source on a miss.
    ///
    /// Load failures are returned to every waiter and are not cached.
    pub async fn get_or_load(&self, code: &str) -> Result<Arc<Graph>, GraphError> {
        let key = cache_key(code);
        self.graphs
            .try_get_with(key.clone(), async {
                let graph = load_graph(self.source.as_ref(), &key)?;
                info!(
                    code = %key,
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    "Loaded campus graph"
                );
                Ok(Arc::new(graph))
            })
            .await
            .map_err(|e: Arc<GraphError>| (*e).clone())
    }

    /// Drop the cached graph for `code`, if any.
    pub async fn invalidate(&self, code: &str) {
        let key = cache_key(code);
        debug!(code = %key, "Invalidating cached graph");
        self.graphs.invalidate(&key).await;
    }

    /// Drop the cached graph for `code` and load it again.
    pub async fn reload(&self, code: &str) -> Result<Arc<Graph>, GraphError> {
        self.invalidate(code).await;
        self.get_or_load(code).await
    }

    /// Number of cached graphs (for monitoring).
    ///
    /// Eventually consistent: pending inserts and evictions may not be
    /// reflected yet.
    pub fn entry_count(&self) -> u64 {
        self.graphs.entry_count()
    }

    /// Invalidate all cached graphs.
    pub fn invalidate_all(&self) {
        self.graphs.invalidate_all();
    }
}

fn cache_key(code: &str) -> String {
    code.trim().to_string()
}
