//! The immutable street graph that every snapshot points at.
//!
//! # Data layout
//!
//! Nodes and edges are kept in the order they were supplied; that order is
//! their dense *slot*.  Caller-facing ids map to slots through hash maps, and
//! the hot arrays used by path search (`edge_from`, `edge_to`, the CSR
//! [`AdjacencyIndex`]) are indexed by slot.
//!
//! # Sharing
//!
//! Everything derived from the node and edge layout lives in one
//! [`Topology`] behind an `Arc`.  Edges and the incident log sit in their
//! own `Arc`s, so cloning a `Graph` copies three pointers and a risk write
//! copies only the edge list.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest node, so a tapped
//! map coordinate can be turned into a route endpoint.

use std::sync::Arc;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;
use serde::Serialize;

use sr_core::{EdgeId, GeoPoint, IncidentReport, NodeId, ReportId, StreetId, clamp_risk};

use crate::adjacency::AdjacencyIndex;
use crate::model::{Edge, Node};
use crate::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[lat, lon]` point with
/// the slot of its node.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    slot: u32,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── GraphStatus ───────────────────────────────────────────────────────────────

/// Collection sizes, as reported to clients.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphStatus {
    pub node_count: usize,
    pub edge_count: usize,
    pub incident_count: usize,
}

// ── Graph ─────────────────────────────────────────────────────────────────────

/// Id maps, CSR adjacency and spatial index.  Fixed once a graph is built.
#[derive(Debug)]
struct Topology {
    nodes: Vec<Node>,

    node_slots:   FxHashMap<NodeId, u32>,
    edge_slots:   FxHashMap<EdgeId, u32>,
    /// First-inserted edge for each street id.
    street_slots: FxHashMap<StreetId, u32>,

    /// Source node slot of each edge slot.
    edge_from: Vec<u32>,
    /// Target node slot of each edge slot.
    edge_to:   Vec<u32>,

    adjacency:   AdjacencyIndex,
    spatial_idx: RTree<NodeEntry>,
}

/// Nodes, edges, the incident log, and every index derived from them.
///
/// A `Graph` is only mutated through [`GraphStore`](crate::GraphStore)
/// transactions; everyone else sees it behind an `Arc` as an immutable
/// snapshot.  Construct with [`Graph::build`].
#[derive(Clone, Debug)]
pub struct Graph {
    topology:  Arc<Topology>,
    edges:     Arc<Vec<Edge>>,
    incidents: Arc<Vec<IncidentReport>>,

    last_report_id: Option<ReportId>,
}

impl Graph {
    /// A graph with no nodes, edges or incidents.
    pub fn empty() -> Self {
        Self {
            topology: Arc::new(Topology {
                nodes:        Vec::new(),
                node_slots:   FxHashMap::default(),
                edge_slots:   FxHashMap::default(),
                street_slots: FxHashMap::default(),
                edge_from:    Vec::new(),
                edge_to:      Vec::new(),
                adjacency:    AdjacencyIndex::build(0, &[]),
                spatial_idx:  RTree::new(),
            }),
            edges:          Arc::new(Vec::new()),
            incidents:      Arc::new(Vec::new()),
            last_report_id: None,
        }
    }

    /// Validate `nodes` and `edges` and build every index over them.
    ///
    /// Edge risk scores are clamped into `[0, 10]`.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidGraph`] if a node or edge id is duplicated, an
    /// edge endpoint is not among `nodes`, or an edge distance is negative or
    /// not finite.
    pub fn build(
        nodes:     Vec<Node>,
        mut edges: Vec<Edge>,
        incidents: Vec<IncidentReport>,
    ) -> GraphResult<Self> {
        if nodes.len() > u32::MAX as usize || edges.len() > u32::MAX as usize {
            return Err(GraphError::InvalidGraph("graph exceeds u32 slot range".into()));
        }

        let mut node_slots =
            FxHashMap::with_capacity_and_hasher(nodes.len(), Default::default());
        for (slot, node) in nodes.iter().enumerate() {
            if node_slots.insert(node.id, slot as u32).is_some() {
                return Err(GraphError::InvalidGraph(format!("duplicate node id {}", node.id)));
            }
        }

        let mut edge_slots =
            FxHashMap::with_capacity_and_hasher(edges.len(), Default::default());
        let mut street_slots = FxHashMap::default();
        let mut edge_from = Vec::with_capacity(edges.len());
        let mut edge_to   = Vec::with_capacity(edges.len());

        for (slot, edge) in edges.iter_mut().enumerate() {
            let slot = slot as u32;
            if edge_slots.insert(edge.id, slot).is_some() {
                return Err(GraphError::InvalidGraph(format!("duplicate edge id {}", edge.id)));
            }
            let (Some(&from), Some(&to)) = (node_slots.get(&edge.from), node_slots.get(&edge.to))
            else {
                let missing = if node_slots.contains_key(&edge.from) { edge.to } else { edge.from };
                return Err(GraphError::InvalidGraph(format!(
                    "edge {} references unknown node {missing}",
                    edge.id
                )));
            };
            if !edge.distance_m.is_finite() || edge.distance_m < 0.0 {
                return Err(GraphError::InvalidGraph(format!(
                    "edge {} has invalid distance {}",
                    edge.id, edge.distance_m
                )));
            }
            edge.risk_score = clamp_risk(edge.risk_score);
            street_slots.entry(edge.street_id).or_insert(slot);
            edge_from.push(from);
            edge_to.push(to);
        }

        let adjacency = AdjacencyIndex::build(nodes.len(), &edge_from);
        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "adjacency index built"
        );

        // Bulk-load R-tree for O(N log N) construction (faster than N inserts).
        let entries: Vec<NodeEntry> = nodes
            .iter()
            .enumerate()
            .map(|(slot, n)| NodeEntry { point: [n.lat, n.lon], slot: slot as u32 })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let last_report_id = incidents.iter().map(|r| r.report_id).max();

        Ok(Self {
            topology: Arc::new(Topology {
                nodes,
                node_slots,
                edge_slots,
                street_slots,
                edge_from,
                edge_to,
                adjacency,
                spatial_idx,
            }),
            edges: Arc::new(edges),
            incidents: Arc::new(incidents),
            last_report_id,
        })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.topology.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topology.nodes.is_empty()
    }

    pub fn status(&self) -> GraphStatus {
        GraphStatus {
            node_count:     self.node_count(),
            edge_count:     self.edge_count(),
            incident_count: self.incident_count(),
        }
    }

    // ── Collections ───────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.topology.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn incidents(&self) -> &[IncidentReport] {
        &self.incidents
    }

    pub fn last_report_id(&self) -> Option<ReportId> {
        self.last_report_id
    }

    // ── Point lookups ─────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_slot(id).map(|s| &self.topology.nodes[s])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_slot(id).map(|s| &self.edges[s])
    }

    /// The first-inserted edge carrying `street`.
    pub fn edge_by_street(&self, street: StreetId) -> Option<&Edge> {
        self.topology.street_slots.get(&street).map(|&s| &self.edges[s as usize])
    }

    /// Outgoing edges of `node` in insertion order.  Empty for unknown or
    /// terminal nodes.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        let slots: &[u32] = match self.node_slot(node) {
            Some(s) => self.topology.adjacency.out_edges(s),
            None => &[],
        };
        slots.iter().map(move |&e| &self.edges[e as usize])
    }

    // ── Slot access (path search hot path) ────────────────────────────────

    #[inline]
    pub fn node_slot(&self, id: NodeId) -> Option<usize> {
        self.topology.node_slots.get(&id).map(|&s| s as usize)
    }

    #[inline]
    pub fn edge_slot(&self, id: EdgeId) -> Option<usize> {
        self.topology.edge_slots.get(&id).map(|&s| s as usize)
    }

    #[inline]
    pub fn node_at(&self, slot: usize) -> &Node {
        &self.topology.nodes[slot]
    }

    #[inline]
    pub fn edge_at(&self, slot: usize) -> &Edge {
        &self.edges[slot]
    }

    /// Outgoing edge slots of the node at `slot`, in insertion order.
    #[inline]
    pub fn out_edge_slots(&self, slot: usize) -> &[u32] {
        self.topology.adjacency.out_edges(slot)
    }

    #[inline]
    pub fn edge_source(&self, edge_slot: usize) -> usize {
        self.topology.edge_from[edge_slot] as usize
    }

    #[inline]
    pub fn edge_target(&self, edge_slot: usize) -> usize {
        self.topology.edge_to[edge_slot] as usize
    }

    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.topology.adjacency
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// The node nearest to `pos`.  `None` only if the graph has no nodes.
    pub fn nearest_node(&self, pos: GeoPoint) -> Option<&Node> {
        self.topology
            .spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| &self.topology.nodes[e.slot as usize])
    }

    /// Incident reports within `radius_m` metres of `pos`, oldest first.
    pub fn incidents_within(&self, pos: GeoPoint, radius_m: f64) -> Vec<&IncidentReport> {
        self.incidents
            .iter()
            .filter(|r| r.position().within_radius(pos, radius_m))
            .collect()
    }

    // ── Mutation (store transactions only) ────────────────────────────────

    /// Apply staged writes.  Slots were validated when staged.
    ///
    /// Only the parts that change are copied, and only if a snapshot still
    /// shares them.
    pub(crate) fn apply(&mut self, risk_writes: Vec<(usize, f64)>, appended: Vec<IncidentReport>) {
        if !risk_writes.is_empty() {
            let edges = Arc::make_mut(&mut self.edges);
            for (slot, risk) in risk_writes {
                edges[slot].risk_score = risk;
            }
        }
        if !appended.is_empty() {
            let incidents = Arc::make_mut(&mut self.incidents);
            for report in appended {
                self.last_report_id = Some(match self.last_report_id {
                    Some(last) => last.max(report.report_id),
                    None => report.report_id,
                });
                incidents.push(report);
            }
        }
    }

    /// `true` if both graphs use the same id maps, adjacency and R-tree
    /// allocation.
    pub fn shares_topology(&self, other: &Graph) -> bool {
        Arc::ptr_eq(&self.topology, &other.topology)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::empty()
    }
}
