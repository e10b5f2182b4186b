//! A* search guided by straight-line distance to the goal.
//!
//! The heuristic is `haversine(node, goal) * rate`. The unit rate converts
//! metres into the mode's cost units (1 per metre for `shortest`, one over
//! the walking speed for the time-based modes). Because shade and safety
//! preferences can push an edge's cost below its straight-line length, the
//! rate is further capped at the cheapest cost per straight-line metre found
//! on any edge of the graph. With that cap the heuristic is admissible and
//! consistent for every weight configuration, so A* returns the same optimal
//! cost as Dijkstra.

use std::collections::BinaryHeap;

use tracing::trace;

use crate::geo::{LatLng, haversine_m};

use super::search::{FrontierEntry, Labels, PathSearch, SearchContext, SearchError, SearchResult};

/// Headroom so that floating-point rounding never makes the estimate
/// exceed the true edge cost.
const RATE_SLACK: f64 = 1.0 - 1e-9;

/// A* over the campus graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarSearch;

/// Straight-line lower bound on the remaining cost to a fixed goal.
#[derive(Debug, Clone, Copy)]
pub(super) struct Heuristic {
    goal: Option<LatLng>,
    rate: f64,
}

impl Heuristic {
    /// Build the heuristic for `goal` under the context's mode and options.
    ///
    /// Falls back to a zero estimate when any node lacks coordinates, since
    /// straight-line bounds cannot be established through such nodes.
    pub fn new(ctx: &SearchContext<'_>, goal: usize) -> Self {
        let graph = ctx.graph;
        let goal_position = graph.node(goal).position;
        if goal_position.is_none() || !graph.fully_positioned() {
            return Self {
                goal: None,
                rate: 0.0,
            };
        }

        let mut rate = if ctx.options.mode.is_time_based() {
            1.0 / ctx.options.walk_speed_mps
        } else {
            1.0
        };

        for idx in 0..graph.edge_count() {
            let (from, to) = graph.edge_endpoints(idx);
            let (Some(a), Some(b)) = (graph.node(from).position, graph.node(to).position) else {
                continue;
            };
            let straight = haversine_m(a, b);
            if straight > 0.0 {
                rate = rate.min(ctx.edge_cost(idx) / straight);
            }
        }

        let rate = if rate.is_finite() && rate > 0.0 {
            rate * RATE_SLACK
        } else {
            0.0
        };

        Self {
            goal: goal_position,
            rate,
        }
    }

    /// Cost-per-metre rate in use.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Estimated remaining cost from `position` to the goal.
    pub fn estimate(&self, position: Option<LatLng>) -> f64 {
        match (self.goal, position) {
            (Some(goal), Some(p)) if self.rate > 0.0 => {
                let h = haversine_m(p, goal) * self.rate;
                if h.is_finite() { h } else { 0.0 }
            }
            _ => 0.0,
        }
    }
}

impl PathSearch for AStarSearch {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn search(
        &self,
        ctx: &SearchContext<'_>,
        start: &str,
        goal: &str,
    ) -> Result<SearchResult, SearchError> {
        let graph = ctx.graph;
        let start = ctx.resolve(start)?;
        let goal = ctx.resolve(goal)?;

        let heuristic = Heuristic::new(ctx, goal);
        let h = |node: usize| heuristic.estimate(graph.node(node).position);

        let mut labels = Labels::new(graph.node_count(), start);
        let mut frontier = BinaryHeap::new();
        let h_start = h(start);
        frontier.push(FrontierEntry {
            priority: h_start,
            tie: h_start,
            node: start,
        });

        let mut visited_count = 0;

        while let Some(FrontierEntry { node: u, .. }) = frontier.pop() {
            if labels.settled[u] {
                continue;
            }
            if visited_count >= ctx.max_expansions {
                return Err(SearchError::ExpansionLimit {
                    limit: ctx.max_expansions,
                });
            }
            labels.settled[u] = true;
            visited_count += 1;

            if u == goal {
                return Ok(labels.reconstruct(graph, start, goal, visited_count));
            }

            for &edge in graph.outgoing(u) {
                let (_, v) = graph.edge_endpoints(edge);
                if labels.settled[v] {
                    continue;
                }

                let candidate = labels.cost[u] + ctx.edge_cost(edge);
                if candidate < labels.cost[v] {
                    labels.cost[v] = candidate;
                    labels.via[v] = Some(edge);
                    let h_v = h(v);
                    // Equal f: prefer the node closer to the goal
                    frontier.push(FrontierEntry {
                        priority: candidate + h_v,
                        tie: h_v,
                        node: v,
                    });
                }
            }
        }

        trace!(visited_count, rate = heuristic.rate(), "A* frontier exhausted");
        Ok(SearchResult::unreachable(visited_count))
    }
}
