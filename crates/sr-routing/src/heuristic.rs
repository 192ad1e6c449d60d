//! Remaining-cost estimates for the path search.
//!
//! The engine runs plain Dijkstra with [`ZeroHeuristic`] and A* with any
//! other estimate.  An estimate must never exceed the true remaining cost,
//! or the search may return a sub-optimal route.

use serde::{Deserialize, Serialize};

use sr_core::CostWeights;
use sr_core::risk::distance_term;
use sr_graph::Node;

/// Pluggable lower bound on the cost from `from` to `goal`.
///
/// Implementations must be `Send + Sync` so one engine can serve concurrent
/// requests.
pub trait Heuristic: Send + Sync {
    fn estimate(&self, from: &Node, goal: &Node, weights: CostWeights) -> f64;
}

impl<H: Heuristic + ?Sized> Heuristic for Box<H> {
    #[inline]
    fn estimate(&self, from: &Node, goal: &Node, weights: CostWeights) -> f64 {
        (**self).estimate(from, goal, weights)
    }
}

/// Always 0: turns the search into Dijkstra.
#[derive(Copy, Clone, Debug, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    #[inline]
    fn estimate(&self, _from: &Node, _goal: &Node, _weights: CostWeights) -> f64 {
        0.0
    }
}

/// `alpha * min(great_circle_m / 100, 10)`.
///
/// Admissible when every edge is at least as long as the great-circle
/// distance between its endpoints: the distance terms along any path then
/// sum to at least this value, and the risk term is never negative.
#[derive(Copy, Clone, Debug, Default)]
pub struct GreatCircleHeuristic;

impl Heuristic for GreatCircleHeuristic {
    #[inline]
    fn estimate(&self, from: &Node, goal: &Node, weights: CostWeights) -> f64 {
        weights.alpha * distance_term(from.pos().distance_m(goal.pos()))
    }
}

/// Heuristic selector for configuration files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    #[default]
    None,
    GreatCircle,
}

impl HeuristicKind {
    pub fn build(self) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::None => Box::new(ZeroHeuristic),
            HeuristicKind::GreatCircle => Box::new(GreatCircleHeuristic),
        }
    }
}
