//! Dijkstra's algorithm over the campus graph.

use std::collections::BinaryHeap;

use tracing::trace;

use super::search::{FrontierEntry, Labels, PathSearch, SearchContext, SearchError, SearchResult};

/// Plain Dijkstra: settles nodes in order of tentative cost and stops as
/// soon as the goal is settled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraSearch;

impl PathSearch for DijkstraSearch {
    fn name(&self) -> &'static str {
        "dijkstra"
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

        let mut labels = Labels::new(graph.node_count(), start);
        let mut frontier = BinaryHeap::new();
        frontier.push(FrontierEntry {
            priority: 0.0,
            tie: 0.0,
            node: start,
        });

        let mut visited_count = 0;

        while let Some(FrontierEntry { node: u, .. }) = frontier.pop() {
            // Stale entry for an already settled node
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
                    frontier.push(FrontierEntry {
                        priority: candidate,
                        tie: 0.0,
                        node: v,
                    });
                }
            }
        }

        trace!(visited_count, "Dijkstra frontier exhausted");
        Ok(SearchResult::unreachable(visited_count))
    }
}
