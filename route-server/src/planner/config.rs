//! Search configuration for the route planner.

use crate::cost::CostWeights;

/// Configuration parameters for route search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of nodes a single search may settle.
    /// Searches that exceed this are aborted.
    pub max_expansions: usize,

    /// Weights used to turn edges into costs.
    pub cost_weights: CostWeights,
}

impl SearchConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_expansions: usize, cost_weights: CostWeights) -> Self {
        Self {
            max_expansions,
            cost_weights,
        }
    }

    /// Replace the expansion limit.
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_expansions: 1_000_000,
            cost_weights: CostWeights::default(),
        }
    }
}
