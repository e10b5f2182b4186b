//! Per-request routing options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cost::RouteMode;
use crate::graph::Graph;

use super::astar::AStarSearch;
use super::dijkstra::DijkstraSearch;
use super::search::PathSearch;

/// Which path-search engine to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Algorithm {
    #[default]
    #[serde(rename = "dijkstra")]
    Dijkstra,
    #[serde(rename = "astar")]
    AStar,
}

/// Error returned when parsing an unknown algorithm name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown algorithm '{0}' (expected dijkstra or astar)")]
pub struct UnknownAlgorithm(String);

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::AStar => "astar",
        }
    }

    /// The engine implementing this algorithm.
    pub fn engine(&self) -> &'static dyn PathSearch {
        match self {
            Algorithm::Dijkstra => &DijkstraSearch,
            Algorithm::AStar => &AStarSearch,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(Algorithm::Dijkstra),
            "astar" | "a*" | "a-star" => Ok(Algorithm::AStar),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Options for one route computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteOptions {
    pub mode: RouteMode,
    pub algo: Algorithm,
    /// Metres per second, used for time estimates and the A* heuristic.
    pub walk_speed_mps: f64,
    /// Seconds until the bus reaches the stop, if known.
    pub bus_eta_secs: Option<f64>,
}

impl RouteOptions {
    /// Options for `graph`, taking the walking speed from its metadata.
    pub fn for_graph(
        graph: &Graph,
        mode: RouteMode,
        algo: Algorithm,
        bus_eta_secs: Option<f64>,
    ) -> Self {
        Self {
            mode,
            algo,
            walk_speed_mps: graph.walk_speed_mps(),
            bus_eta_secs,
        }
    }
}
