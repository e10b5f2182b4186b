//! Walking-route planner.
//!
//! This module answers: "I'm standing here and my bus leaves from that
//! stop - which way do I walk?"
//!
//! The user is snapped to the nearest graph node and the stop identifier is
//! resolved to a goal node. A single-pair search (Dijkstra or A*) then finds
//! the cheapest path under the selected [`RouteMode`](crate::cost::RouteMode),
//! and the path is turned into a [`Route`] with distance, time and
//! turn-by-turn steps.

mod astar;
mod config;
mod dijkstra;
mod options;
mod route;
mod search;
mod stops;


pub use astar::AStarSearch;
pub use config::SearchConfig;
pub use dijkstra::DijkstraSearch;
pub use options::{Algorithm, RouteOptions, UnknownAlgorithm};
pub use route::{
    Comparison, EngineRun, Performance, Planner, Route, RouteError, RouteNode, RouteQuery,
    compute_route,
};
pub use search::{PathSearch, SearchContext, SearchError, SearchResult};
pub use stops::{StopMatch, StopMatcher, nearest_node};
