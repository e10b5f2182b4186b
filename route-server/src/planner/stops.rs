//! Resolving route endpoints onto graph nodes.
//!
//! The start is always the node nearest the user. The goal is found by
//! trying a fixed sequence of stop-identifier rules, falling back to the
//! node nearest the stop's coordinates.

use crate::geo::{LatLng, haversine_m};
use crate::graph::{Graph, NodeKind};

/// Which rule resolved a stop identifier.
///
/// Variants are listed in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StopMatch {
    /// A node id equals the stop id.
    ExactId,
    /// A node's `stopId` equals the stop id or one of its prefixed forms.
    StopIdField,
    /// A node id equals `stop_<id>` or `bus_stop_<id>`.
    PrefixedId,
    /// The stop id is `s<N>` and a node is named `Stop <N>`.
    NumberedName,
    /// A bus-stop node is named exactly the stop id.
    BusStopName,
    /// No identifier rule matched; nearest node to the stop coordinates.
    NearestToCoordinates,
}

/// Stop-identifier matcher.
#[derive(Debug, Clone)]
pub struct StopMatcher {
    stop_id: String,
    /// `[id, stop_<id>, bus_stop_<id>]`
    candidates: [String; 3],
    numbered_name: Option<String>,
}

impl StopMatcher {
    pub fn new(stop_id: impl Into<String>) -> Self {
        let stop_id = stop_id.into();
        let candidates = [
            stop_id.clone(),
            format!("stop_{stop_id}"),
            format!("bus_stop_{stop_id}"),
        ];
        let numbered_name = numbered_stop_name(&stop_id);
        Self {
            stop_id,
            candidates,
            numbered_name,
        }
    }

    pub fn stop_id(&self) -> &str {
        &self.stop_id
    }

    /// Find the goal node for this stop.
    ///
    /// Each rule is tried in turn over the whole graph; within a rule the
    /// first node in graph order wins. `fallback` is only consulted when no
    /// identifier rule matches.
    pub fn find(&self, graph: &Graph, fallback: Option<LatLng>) -> Option<(usize, StopMatch)> {
        let nodes = graph.nodes();
        let first = |pred: &dyn Fn(usize) -> bool| (0..nodes.len()).find(|&i| pred(i));

        if !self.stop_id.is_empty() {
            if let Some(idx) = graph.node_index(&self.stop_id) {
                return Some((idx, StopMatch::ExactId));
            }

            let by_field = first(&|i| {
                nodes[i]
                    .stop_id
                    .as_deref()
                    .is_some_and(|s| self.candidates.iter().any(|c| c == s))
            });
            if let Some(idx) = by_field {
                return Some((idx, StopMatch::StopIdField));
            }

            if let Some(idx) = self.candidates[1..]
                .iter()
                .find_map(|c| graph.node_index(c))
            {
                return Some((idx, StopMatch::PrefixedId));
            }

            if let Some(name) = &self.numbered_name {
                if let Some(idx) = first(&|i| &nodes[i].name == name) {
                    return Some((idx, StopMatch::NumberedName));
                }
            }

            let by_name =
                first(&|i| nodes[i].kind == NodeKind::BusStop && nodes[i].name == self.stop_id);
            if let Some(idx) = by_name {
                return Some((idx, StopMatch::BusStopName));
            }
        }

        let point = fallback?;
        nearest_node(graph, point).map(|idx| (idx, StopMatch::NearestToCoordinates))
    }
}

/// `s12` -> `Stop 12`
fn numbered_stop_name(stop_id: &str) -> Option<String> {
    let digits = stop_id.strip_prefix('s')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("Stop {digits}"))
}

/// Index of the node closest to `point`.
///
/// Nodes without coordinates are skipped. On equal distance the earlier
/// node wins. Returns `None` for an empty graph or one with no positioned
/// nodes.
pub fn nearest_node(graph: &Graph, point: LatLng) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, node) in graph.nodes().iter().enumerate() {
        let Some(position) = node.position else {
            continue;
        };
        let d = haversine_m(point, position);
        // NaN never compares less, so unusable distances are skipped
        let closer = match best {
            Some((_, best_d)) => d < best_d,
            None => d < f64::INFINITY,
        };
        if closer {
            best = Some((idx, d));
        }
    }
    best.map(|(idx, _)| idx)
}
