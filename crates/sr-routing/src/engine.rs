//! Risk-weighted shortest-path search.
//!
//! # Cost model
//!
//! Each edge costs `alpha * min(distance_m / 100, 10) + beta * risk_score`
//! (see [`sr_core::composite_cost`]).  Both terms are non-negative, so a
//! label-setting search is exact.
//!
//! # Search
//!
//! [`RouteEngine`] runs one best-first search over the CSR adjacency of a
//! [`Graph`] snapshot.  With the default [`ZeroHeuristic`] it is Dijkstra;
//! with an admissible [`Heuristic`] it is A*.  Entries with equal priority
//! leave the heap in insertion order, so results are deterministic for a
//! given graph.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use sr_core::{CostWeights, EdgeId, NodeId, composite_cost};
use sr_graph::{Edge, Graph, Node};

use crate::heuristic::{Heuristic, ZeroHeuristic};
use crate::{RouteError, RouteResult};

/// Marks a node slot that has not been reached yet.
const NO_EDGE: u32 = u32::MAX;

// ── Route ─────────────────────────────────────────────────────────────────────

/// A least-cost path and its totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Visited nodes, start first and goal last.
    pub path: Vec<Node>,
    /// Edges to traverse in order; always one shorter than `path`.
    pub edges: Vec<EdgeId>,
    /// Sum of composite edge costs along the path.
    pub total_cost: f64,
    /// Sum of edge lengths along the path, in metres.
    pub total_distance_m: f64,
    /// Nodes the search settled before reaching the goal.
    pub expanded_nodes: usize,
}

impl Route {
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.path.iter().map(|n| n.id).collect()
    }

    /// `true` if start and goal are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Composite cost of traversing `edge` under `weights`.
#[inline]
pub fn edge_cost(edge: &Edge, weights: CostWeights) -> f64 {
    composite_cost(edge.distance_m, edge.risk_score, weights)
}

// ── Frontier ──────────────────────────────────────────────────────────────────

/// Heap entry.  Ordered so that `BinaryHeap` pops the lowest priority first
/// and, among equal priorities, the earliest pushed.
#[derive(Debug)]
struct Frontier {
    priority: f64,
    seq:      u64,
    cost:     f64,
    slot:     u32,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

// ── RouteEngine ───────────────────────────────────────────────────────────────

/// Stateless path-search engine.  One engine can serve any number of
/// concurrent requests; each call works on the snapshot it is given.
#[derive(Debug, Clone, Default)]
pub struct RouteEngine<H = ZeroHeuristic> {
    heuristic:      H,
    max_expansions: Option<usize>,
}

impl RouteEngine<ZeroHeuristic> {
    /// A plain Dijkstra engine with no expansion limit.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: Heuristic> RouteEngine<H> {
    /// An A* engine guided by `heuristic`.
    pub fn with_heuristic(heuristic: H) -> Self {
        Self { heuristic, max_expansions: None }
    }

    /// Give up with [`RouteError::ExpansionLimit`] after settling `limit`
    /// nodes.
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// Least-cost route from `start` to `goal` in `graph`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::Core`] if `weights` are negative or not finite.
    /// - [`RouteError::NodeNotFound`] if either endpoint is unknown.
    /// - [`RouteError::NoRouteFound`] if `goal` is unreachable.
    /// - [`RouteError::ExpansionLimit`] if the configured limit is hit.
    pub fn calculate_route(
        &self,
        graph:   &Graph,
        start:   NodeId,
        goal:    NodeId,
        weights: CostWeights,
    ) -> RouteResult<Route> {
        let weights = CostWeights::new(weights.alpha, weights.beta)?;
        let start_slot = graph.node_slot(start).ok_or(RouteError::NodeNotFound(start))?;
        let goal_slot  = graph.node_slot(goal).ok_or(RouteError::NodeNotFound(goal))?;

        if start_slot == goal_slot {
            return Ok(Route {
                path:             vec![graph.node_at(start_slot).clone()],
                edges:            Vec::new(),
                total_cost:       0.0,
                total_distance_m: 0.0,
                expanded_nodes:   0,
            });
        }

        let goal_node = graph.node_at(goal_slot);
        let n = graph.node_count();
        // best[v] = lowest known cost from start to v.
        let mut best      = vec![f64::INFINITY; n];
        // prev_edge[v] = edge slot that reached v with cost best[v].
        let mut prev_edge = vec![NO_EDGE; n];

        let mut heap = BinaryHeap::new();
        let mut seq: u64 = 0;
        let mut expanded = 0usize;

        best[start_slot] = 0.0;
        heap.push(Frontier {
            priority: self.heuristic.estimate(graph.node_at(start_slot), goal_node, weights),
            seq,
            cost: 0.0,
            slot: start_slot as u32,
        });

        while let Some(Frontier { cost, slot, .. }) = heap.pop() {
            let slot = slot as usize;

            // Skip stale heap entries.
            if cost > best[slot] {
                continue;
            }

            if slot == goal_slot {
                let route = reconstruct(graph, &prev_edge, start_slot, goal_slot, weights, expanded);
                tracing::debug!(
                    %start,
                    %goal,
                    cost = route.total_cost,
                    hops = route.edges.len(),
                    expanded,
                    "route found"
                );
                return Ok(route);
            }

            expanded += 1;
            if let Some(limit) = self.max_expansions {
                if expanded > limit {
                    tracing::warn!(%start, %goal, limit, "route search hit expansion limit");
                    return Err(RouteError::ExpansionLimit { limit });
                }
            }

            for &e in graph.out_edge_slots(slot) {
                let e = e as usize;
                let next = graph.edge_target(e);
                let candidate = cost + edge_cost(graph.edge_at(e), weights);

                if candidate < best[next] {
                    best[next] = candidate;
                    prev_edge[next] = e as u32;
                    seq += 1;
                    heap.push(Frontier {
                        priority: candidate
                            + self.heuristic.estimate(graph.node_at(next), goal_node, weights),
                        seq,
                        cost: candidate,
                        slot: next as u32,
                    });
                }
            }
        }

        tracing::debug!(%start, %goal, expanded, "no route");
        Err(RouteError::NoRouteFound { from: start, to: goal })
    }
}

/// Walk `prev_edge` back from the goal, then total the path front to back so
/// the reported cost is exactly the sum of the listed edges.
fn reconstruct(
    graph:     &Graph,
    prev_edge: &[u32],
    start:     usize,
    goal:      usize,
    weights:   CostWeights,
    expanded:  usize,
) -> Route {
    let mut slots = Vec::new();
    let mut cur = goal;
    while cur != start {
        let e = prev_edge[cur];
        if e == NO_EDGE {
            break;
        }
        slots.push(e as usize);
        cur = graph.edge_source(e as usize);
    }
    slots.reverse();

    let mut path = Vec::with_capacity(slots.len() + 1);
    path.push(graph.node_at(start).clone());
    let mut edges = Vec::with_capacity(slots.len());
    let mut total_cost = 0.0;
    let mut total_distance_m = 0.0;

    for e in slots {
        let edge = graph.edge_at(e);
        total_cost += edge_cost(edge, weights);
        total_distance_m += edge.distance_m;
        edges.push(edge.id);
        path.push(graph.node_at(graph.edge_target(e)).clone());
    }

    Route { path, edges, total_cost, total_distance_m, expanded_nodes: expanded }
}
