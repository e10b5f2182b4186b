//! Edge cost model.
//!
//! This is the one place where a route's "personality" is defined. Each
//! [`RouteMode`] turns a directed edge into a non-negative scalar cost from
//! its distance or time plus weighted penalty and preference factors.
//! Search correctness depends on costs never being negative, so every
//! result is clamped at zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::Edge;
use crate::planner::RouteOptions;

/// The routing objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    /// Minimise walking distance.
    #[default]
    Shortest,
    /// Minimise walking time, biased by how soon the bus arrives.
    Fastest,
    /// Minimise stairs, slopes and other accessibility obstacles.
    Accessible,
}

/// Error returned when parsing an unknown routing mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown routing mode '{0}' (expected shortest, fastest or accessible)")]
pub struct UnknownMode(String);

impl RouteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMode::Shortest => "shortest",
            RouteMode::Fastest => "fastest",
            RouteMode::Accessible => "accessible",
        }
    }

    /// Human-readable explanation of why a route was chosen.
    pub fn reason(&self) -> &'static str {
        match self {
            RouteMode::Shortest => "minimized walking distance",
            RouteMode::Fastest => "prioritized fastest arrival based on ETA",
            RouteMode::Accessible => "minimized stairs and steep slopes",
        }
    }

    /// Whether costs in this mode are measured in (biased) seconds rather
    /// than metres.
    pub fn is_time_based(&self) -> bool {
        !matches!(self, RouteMode::Shortest)
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shortest" => Ok(RouteMode::Shortest),
            "fastest" => Ok(RouteMode::Fastest),
            "accessible" => Ok(RouteMode::Accessible),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Per-mode multipliers.
///
/// `base` scales distance in `shortest` mode and biased time in the
/// time-based modes. Penalties add to the cost; preferences subtract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeWeights {
    pub base: f64,
    pub stairs: f64,
    pub slope: f64,
    pub accessibility: f64,
    pub shade: f64,
    pub safety: f64,
}

/// Time multiplier applied when a bus is expected soon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtaBias {
    /// Bus arriving within this many seconds counts as urgent.
    pub urgent_within_secs: f64,
    pub urgent: f64,
    /// Bus arriving within this many seconds counts as soon.
    pub soon_within_secs: f64,
    pub soon: f64,
    /// Applied when the bus is further away.
    pub relaxed: f64,
}

impl EtaBias {
    /// Multiplier for an optional bus ETA. Without an ETA time is unbiased.
    pub fn factor(&self, bus_eta_secs: Option<f64>) -> f64 {
        match bus_eta_secs {
            Some(eta) if eta.is_nan() => 1.0,
            Some(eta) if eta <= self.urgent_within_secs => self.urgent,
            Some(eta) if eta <= self.soon_within_secs => self.soon,
            Some(_) => self.relaxed,
            None => 1.0,
        }
    }
}

impl Default for EtaBias {
    fn default() -> Self {
        Self {
            urgent_within_secs: 300.0, // 5 minutes
            urgent: 1.3,
            soon_within_secs: 900.0, // 15 minutes
            soon: 1.1,
            relaxed: 0.95,
        }
    }
}

/// How shade and safety preferences interact with penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferencePolicy {
    /// Preferences subtract from the whole edge cost, which is then clamped
    /// at zero. A strongly preferred edge can become free.
    #[default]
    Offset,
    /// Preferences can cancel penalty terms but never the base distance or
    /// time term.
    Bounded,
}

/// Tunable weights for every routing mode.
#[derive(Debug, Clone, PartialEq)]
pub struct CostWeights {
    pub shortest: ModeWeights,
    pub fastest: ModeWeights,
    pub accessible: ModeWeights,
    pub eta_bias: EtaBias,
    pub preference_policy: PreferencePolicy,
}

impl CostWeights {
    pub fn for_mode(&self, mode: RouteMode) -> &ModeWeights {
        match mode {
            RouteMode::Shortest => &self.shortest,
            RouteMode::Fastest => &self.fastest,
            RouteMode::Accessible => &self.accessible,
        }
    }

    pub fn with_preference_policy(mut self, policy: PreferencePolicy) -> Self {
        self.preference_policy = policy;
        self
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            // Distance dominates; other factors are tie-breakers
            shortest: ModeWeights {
                base: 1.0,
                stairs: 50.0,
                slope: 30.0,
                accessibility: 40.0,
                shade: 5.0,
                safety: 10.0,
            },
            fastest: ModeWeights {
                base: 1.0,
                stairs: 2.0,
                slope: 1.2,
                accessibility: 2.0,
                shade: 0.3,
                safety: 0.4,
            },
            // Accessibility penalties weighted above `fastest`
            accessible: ModeWeights {
                base: 1.05,
                stairs: 2.0,
                slope: 1.5,
                accessibility: 3.0,
                shade: 0.15,
                safety: 0.2,
            },
            eta_bias: EtaBias::default(),
            preference_policy: PreferencePolicy::default(),
        }
    }
}

/// Converts edges into scalar costs for a routing request.
#[derive(Debug, Clone, Default)]
pub struct CostModel {
    weights: CostWeights,
}

impl CostModel {
    pub fn new(weights: CostWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &CostWeights {
        &self.weights
    }

    /// Cost of traversing `edge` under the request's mode and live context.
    ///
    /// Always `>= 0`. NaN inputs yield zero.
    pub fn edge_cost(&self, edge: &Edge, options: &RouteOptions) -> f64 {
        let w = self.weights.for_mode(options.mode);

        let base = if options.mode.is_time_based() {
            edge.time * self.weights.eta_bias.factor(options.bus_eta_secs) * w.base
        } else {
            edge.distance * w.base
        };

        let penalties = edge.stairs_penalty * w.stairs
            + edge.slope_penalty * w.slope
            + edge.accessibility_cost * w.accessibility;
        let credits = edge.shaded_preference * w.shade + edge.safety_weight * w.safety;

        let cost = match self.weights.preference_policy {
            PreferencePolicy::Offset => base + penalties - credits,
            PreferencePolicy::Bounded => base + (penalties - credits).max(0.0),
        };

        cost.max(0.0)
    }
}
