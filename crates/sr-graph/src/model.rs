//! Node and edge records.
//!
//! These are the caller-facing values: what graph sources produce, what
//! `get_node`/`get_edge` return, and what persistence writes.  Nodes are
//! immutable once a graph is built; an edge's `risk_score` is the only field
//! that changes afterwards, and only through the store.

use serde::{Deserialize, Serialize};

use sr_core::{EdgeId, GeoPoint, NodeId, StreetId};

/// Speed limit assumed when a source has no better information.
pub const DEFAULT_SPEED_LIMIT_KMH: u32 = 50;

/// A street-graph vertex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl Node {
    pub fn new(id: NodeId, pos: GeoPoint) -> Self {
        Self { id, lat: pos.lat, lon: pos.lon }
    }

    #[inline]
    pub fn pos(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// A directed street segment.  A two-way street is two edges with swapped
/// endpoints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub street_id: StreetId,
    pub from: NodeId,
    pub to: NodeId,
    pub distance_m: f64,
    /// Always in `[0, 10]` once the edge is inside a graph.
    pub risk_score: f64,
    pub speed_limit_kmh: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Edge {
    /// A zero-risk edge whose street id equals its edge id.
    pub fn new(id: EdgeId, from: NodeId, to: NodeId, distance_m: f64) -> Self {
        Self {
            id,
            street_id: StreetId(id.0),
            from,
            to,
            distance_m,
            risk_score: 0.0,
            speed_limit_kmh: DEFAULT_SPEED_LIMIT_KMH,
            name: None,
        }
    }

    pub fn with_risk(mut self, risk_score: f64) -> Self {
        self.risk_score = risk_score;
        self
    }

    pub fn with_street(mut self, street_id: StreetId) -> Self {
        self.street_id = street_id;
        self
    }

    pub fn with_speed_limit(mut self, kmh: u32) -> Self {
        self.speed_limit_kmh = kmh;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
