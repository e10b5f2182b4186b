//! Shared path-search types.
//!
//! Both engines settle nodes from a binary-heap frontier, relax outgoing
//! edges with the [`CostModel`], and reconstruct the path by walking
//! predecessor edges back from the goal.

use std::cmp::Ordering;

use crate::cost::CostModel;
use crate::graph::Graph;

use super::options::RouteOptions;

/// Error from path search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    /// Start or goal id is not a node of the graph
    #[error("node '{0}' is not in the graph")]
    UnknownNode(String),

    /// The search settled more nodes than allowed
    #[error("search aborted after {limit} node expansions")]
    ExpansionLimit { limit: usize },
}

/// Outcome of a single search.
///
/// An unreachable goal is a normal result: `path` is empty and
/// `total_cost` is infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Node ids from start to goal.
    pub path: Vec<String>,

    /// Indices of the edges taken between consecutive `path` nodes.
    pub edges: Vec<usize>,

    /// Number of nodes settled, the goal included.
    pub visited_count: usize,

    /// Sum of edge costs along `path`.
    pub total_cost: f64,

    /// Sum of raw edge distances along `path`, in metres.
    pub total_distance_m: f64,
}

impl SearchResult {
    /// Result for a goal that cannot be reached.
    pub fn unreachable(visited_count: usize) -> Self {
        Self {
            path: Vec::new(),
            edges: Vec::new(),
            visited_count,
            total_cost: f64::INFINITY,
            total_distance_m: 0.0,
        }
    }

    pub fn is_reachable(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Everything a search needs besides its endpoints.
pub struct SearchContext<'a> {
    pub graph: &'a Graph,
    pub cost_model: &'a CostModel,
    pub options: &'a RouteOptions,
    pub max_expansions: usize,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        graph: &'a Graph,
        cost_model: &'a CostModel,
        options: &'a RouteOptions,
        max_expansions: usize,
    ) -> Self {
        Self {
            graph,
            cost_model,
            options,
            max_expansions,
        }
    }

    /// Cost of the edge at `idx` under this context's options.
    pub(super) fn edge_cost(&self, idx: usize) -> f64 {
        self.cost_model
            .edge_cost(self.graph.edge(idx), self.options)
    }

    pub(super) fn resolve(&self, id: &str) -> Result<usize, SearchError> {
        self.graph
            .node_index(id)
            .ok_or_else(|| SearchError::UnknownNode(id.to_string()))
    }
}

/// A single-pair shortest-path engine.
///
/// Engines must agree on the optimal cost for any query; they may differ
/// in how many nodes they settle to find it.
pub trait PathSearch: Send + Sync {
    /// Short machine-readable name.
    fn name(&self) -> &'static str;

    /// Find the cheapest path from `start` to `goal`.
    fn search(
        &self,
        ctx: &SearchContext<'_>,
        start: &str,
        goal: &str,
    ) -> Result<SearchResult, SearchError>;
}

/// Heap entry ordered so that `BinaryHeap` pops the smallest priority first.
///
/// Ties on `priority` fall back to `tie` and then to the node index, so the
/// settle order is deterministic for a given graph.
#[derive(Debug, Clone, Copy)]
pub(super) struct FrontierEntry {
    pub priority: f64,
    pub tie: f64,
    pub node: usize,
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.tie.total_cmp(&self.tie))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

/// Per-node search state shared by both engines.
pub(super) struct Labels {
    pub cost: Vec<f64>,
    pub settled: Vec<bool>,
    /// Edge index through which each node was last improved.
    pub via: Vec<Option<usize>>,
}

impl Labels {
    pub fn new(node_count: usize, start: usize) -> Self {
        let mut cost = vec![f64::INFINITY; node_count];
        cost[start] = 0.0;
        Self {
            cost,
            settled: vec![false; node_count],
            via: vec![None; node_count],
        }
    }

    /// Walk predecessor edges from `goal` back to `start`.
    pub fn reconstruct(
        &self,
        graph: &Graph,
        start: usize,
        goal: usize,
        visited_count: usize,
    ) -> SearchResult {
        let mut nodes = vec![goal];
        let mut edges = Vec::new();
        let mut total_distance_m = 0.0;
        let mut cur = goal;

        while cur != start {
            let Some(edge) = self.via[cur] else {
                return SearchResult::unreachable(visited_count);
            };
            total_distance_m += graph.edge(edge).distance;
            cur = graph.edge_endpoints(edge).0;
            nodes.push(cur);
            edges.push(edge);
        }
        nodes.reverse();
        edges.reverse();

        SearchResult {
            path: nodes.into_iter().map(|i| graph.node(i).id.clone()).collect(),
            edges,
            visited_count,
            total_cost: self.cost[goal],
            total_distance_m,
        }
    }
}
