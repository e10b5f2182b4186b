//! Route computation: endpoint resolution, search and response assembly.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::cost::{CostModel, RouteMode};
use crate::geo::LatLng;
use crate::graph::{Graph, GraphError, GraphSource, load_graph};
use crate::steps::synthesize_steps_via;

use super::config::SearchConfig;
use super::options::{Algorithm, RouteOptions};
use super::search::{PathSearch, SearchContext, SearchError, SearchResult};
use super::stops::{StopMatcher, nearest_node};

/// Error from route computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The user or the stop could not be placed on the graph.
    #[error("start or stop not found in graph")]
    EndpointUnresolved,

    /// Both endpoints resolved but no path joins them.
    #[error("no path found between user and selected stop")]
    Unreachable,

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// A request for a walking route to a bus stop.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    /// Where the user is standing.
    pub user: LatLng,
    /// Identifier of the target stop.
    pub stop_id: String,
    /// Stop coordinates, used when the identifier matches no node.
    pub stop_position: Option<LatLng>,
    pub mode: RouteMode,
    pub algo: Algorithm,
    pub bus_eta_secs: Option<f64>,
}

impl RouteQuery {
    /// Query with the default mode and algorithm.
    pub fn new(user: LatLng, stop_id: impl Into<String>) -> Self {
        Self {
            user,
            stop_id: stop_id.into(),
            stop_position: None,
            mode: RouteMode::default(),
            algo: Algorithm::default(),
            bus_eta_secs: None,
        }
    }

    pub fn with_mode(mut self, mode: RouteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_algo(mut self, algo: Algorithm) -> Self {
        self.algo = algo;
        self
    }

    pub fn with_stop_position(mut self, position: LatLng) -> Self {
        self.stop_position = Some(position);
        self
    }

    pub fn with_bus_eta(mut self, secs: f64) -> Self {
        self.bus_eta_secs = Some(secs);
        self
    }
}

/// A node on the returned route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteNode {
    pub id: String,
    pub name: String,
    pub position: Option<LatLng>,
}

/// How the route was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Performance {
    pub algo: Algorithm,
    pub nodes_visited: usize,
    pub elapsed: Duration,
}

/// A computed walking route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub nodes: Vec<RouteNode>,
    pub total_distance_m: f64,
    pub estimated_time_s: f64,
    /// Total cost under `mode`, in that mode's units.
    pub total_cost: f64,
    pub mode: RouteMode,
    pub reason: &'static str,
    pub steps: Vec<String>,
    pub performance: Performance,
}

impl Route {
    /// Node ids along the route.
    pub fn node_ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }
}

/// Summary of one engine's run in a [`Comparison`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRun {
    pub algo: Algorithm,
    pub path: Vec<String>,
    pub total_cost: f64,
    pub total_distance_m: f64,
    pub nodes_visited: usize,
    pub elapsed: Duration,
}

/// Both engines run on the same query.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub mode: RouteMode,
    pub dijkstra: EngineRun,
    pub astar: EngineRun,
}

impl Comparison {
    /// Whether the engines found equally cheap routes.
    pub fn costs_agree(&self) -> bool {
        let (a, b) = (self.dijkstra.total_cost, self.astar.total_cost);
        a == b || (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }
}

/// Plans routes over one graph snapshot.
pub struct Planner<'a> {
    graph: &'a Graph,
    config: &'a SearchConfig,
    cost_model: CostModel,
}

impl<'a> Planner<'a> {
    pub fn new(graph: &'a Graph, config: &'a SearchConfig) -> Self {
        Self {
            graph,
            config,
            cost_model: CostModel::new(config.cost_weights.clone()),
        }
    }

    /// Compute the best route for `query`.
    pub fn plan(&self, query: &RouteQuery) -> Result<Route, RouteError> {
        let (start, goal) = self.endpoints(query)?;
        let options = self.options(query, query.algo);

        let (result, elapsed) = self.run(query.algo.engine(), &options, start, goal)?;
        if !result.is_reachable() {
            debug!(
                start,
                goal,
                visited = result.visited_count,
                "No path between endpoints"
            );
            return Err(RouteError::Unreachable);
        }

        let steps = synthesize_steps_via(self.graph, &result.path, &result.edges);
        let nodes = result.path.iter().map(|id| self.route_node(id)).collect();

        debug!(
            algo = %query.algo,
            mode = %query.mode,
            visited = result.visited_count,
            distance_m = result.total_distance_m,
            "Route planned"
        );

        Ok(Route {
            nodes,
            total_distance_m: result.total_distance_m,
            estimated_time_s: result.total_distance_m / options.walk_speed_mps,
            total_cost: result.total_cost,
            mode: query.mode,
            reason: query.mode.reason(),
            steps,
            performance: Performance {
                algo: query.algo,
                nodes_visited: result.visited_count,
                elapsed,
            },
        })
    }

    /// Run both engines on `query`, ignoring its `algo`.
    pub fn compare(&self, query: &RouteQuery) -> Result<Comparison, RouteError> {
        let (start, goal) = self.endpoints(query)?;

        let run = |algo: Algorithm| -> Result<EngineRun, RouteError> {
            let options = self.options(query, algo);
            let (result, elapsed) = self.run(algo.engine(), &options, start, goal)?;
            Ok(EngineRun {
                algo,
                path: result.path,
                total_cost: result.total_cost,
                total_distance_m: result.total_distance_m,
                nodes_visited: result.visited_count,
                elapsed,
            })
        };

        let dijkstra = run(Algorithm::Dijkstra)?;
        if dijkstra.path.is_empty() {
            return Err(RouteError::Unreachable);
        }
        let astar = run(Algorithm::AStar)?;

        Ok(Comparison {
            mode: query.mode,
            dijkstra,
            astar,
        })
    }

    /// Start and goal node indices for `query`.
    fn endpoints(&self, query: &RouteQuery) -> Result<(usize, usize), RouteError> {
        let start = nearest_node(self.graph, query.user);
        let goal = StopMatcher::new(query.stop_id.as_str())
            .find(self.graph, query.stop_position)
            .map(|(idx, how)| {
                debug!(
                    stop_id = %query.stop_id,
                    node = %self.graph.node(idx).id,
                    ?how,
                    "Stop resolved"
                );
                idx
            });

        match (start, goal) {
            (Some(start), Some(goal)) => Ok((start, goal)),
            _ => Err(RouteError::EndpointUnresolved),
        }
    }

    fn options(&self, query: &RouteQuery, algo: Algorithm) -> RouteOptions {
        RouteOptions::for_graph(self.graph, query.mode, algo, query.bus_eta_secs)
    }

    fn run(
        &self,
        engine: &dyn PathSearch,
        options: &RouteOptions,
        start: usize,
        goal: usize,
    ) -> Result<(SearchResult, Duration), RouteError> {
        let ctx = SearchContext::new(
            self.graph,
            &self.cost_model,
            options,
            self.config.max_expansions,
        );
        let started = Instant::now();
        let result = engine.search(
            &ctx,
            &self.graph.node(start).id,
            &self.graph.node(goal).id,
        )?;
        Ok((result, started.elapsed()))
    }

    fn route_node(&self, id: &str) -> RouteNode {
        match self.graph.node_by_id(id) {
            Some(node) => RouteNode {
                id: node.id.clone(),
                name: node.name.clone(),
                position: node.position,
            },
            None => RouteNode {
                id: id.to_string(),
                name: String::new(),
                position: None,
            },
        }
    }
}

/// Load the graph for `code` from `source` and plan `query` over it.
pub fn compute_route<S: GraphSource + ?Sized>(
    source: &S,
    code: &str,
    query: &RouteQuery,
    config: &SearchConfig,
) -> Result<Route, RouteError> {
    let graph = load_graph(source, code)?;
    Planner::new(&graph, config).plan(query)
}
