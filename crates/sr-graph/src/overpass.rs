//! Overpass API response converter.
//!
//! # Usage
//!
//! ```ignore
//! use sr_core::GeoPoint;
//! use sr_graph::overpass::{OverpassSource, bbox_query};
//!
//! let query = bbox_query(GeoPoint::new(10.39, -75.49), 0.01);
//! let body: String = http_post("https://overpass-api.de/api/interpreter", query)?;
//! store.generate(&OverpassSource::new(body), true)?;
//! ```
//!
//! Fetching is the caller's job; this module only turns the JSON into nodes
//! and edges.
//!
//! # What is built
//!
//! Every way with at least two nodes contributes, for each consecutive node
//! pair, two directed edges (forward then return).  Edge ids are sequential
//! from 1 and each edge's street id equals its edge id.  Risk starts at 1.0.
//! Nodes not referenced by any edge are dropped; the rest keep first-use
//! order.

use std::collections::HashMap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;

use sr_core::{EdgeId, GeoPoint, NodeId};

use crate::model::{DEFAULT_SPEED_LIMIT_KMH, Edge, Node};
use crate::source::GraphSource;
use crate::{GraphError, GraphResult};

/// Risk assigned to every freshly imported edge.
pub const IMPORTED_RISK: f64 = 1.0;

const UNNAMED_STREET: &str = "Unnamed street";

/// Render the Overpass QL query for all `highway` ways within
/// `±delta_deg` of `center`.
pub fn bbox_query(center: GeoPoint, delta_deg: f64) -> String {
    let (s, w) = (center.lat - delta_deg, center.lon - delta_deg);
    let (n, e) = (center.lat + delta_deg, center.lon + delta_deg);
    format!(
        "[out:json][timeout:25];\n\
         (\n  way[\"highway\"]({s},{w},{n},{e});\n);\n\
         out body;\n>;\nout skel qt;\n"
    )
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Response {
    elements: Vec<Element>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Element {
    Node {
        id:  i64,
        lat: f64,
        lon: f64,
    },
    Way {
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        tags:  HashMap<String, String>,
    },
    #[serde(other)]
    Other,
}

// ── OverpassSource ────────────────────────────────────────────────────────────

/// A [`GraphSource`] over a raw Overpass JSON response body.
#[derive(Clone, Debug)]
pub struct OverpassSource {
    body: String,
}

impl OverpassSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }
}

impl GraphSource for OverpassSource {
    fn generate(&self) -> GraphResult<(Vec<Node>, Vec<Edge>)> {
        convert(&self.body)
    }

    fn describe(&self) -> String {
        format!("overpass response ({} bytes)", self.body.len())
    }
}

/// Convert an Overpass JSON body into nodes and edges.
///
/// # Errors
///
/// [`GraphError::Source`] if the body is not a valid Overpass JSON response.
pub fn convert(body: &str) -> GraphResult<(Vec<Node>, Vec<Edge>)> {
    let response: Response = serde_json::from_str(body)
        .map_err(|e| GraphError::Source(format!("malformed Overpass response: {e}")))?;

    let mut positions: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    for el in &response.elements {
        if let Element::Node { id, lat, lon } = *el {
            positions.insert(id, GeoPoint::new(lat, lon));
        }
    }

    let mut edges = Vec::new();
    let mut used: Vec<i64> = Vec::new();
    let mut seen: FxHashSet<i64> = FxHashSet::default();
    let mut next_id = 1i64;

    for el in &response.elements {
        let Element::Way { nodes, tags } = el else { continue };
        if nodes.len() < 2 {
            continue;
        }
        let name = tags.get("name").map_or(UNNAMED_STREET, String::as_str);
        let speed = tags
            .get("maxspeed")
            .and_then(|v| parse_maxspeed(v))
            .unwrap_or(DEFAULT_SPEED_LIMIT_KMH);

        for pair in nodes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (Some(&pa), Some(&pb)) = (positions.get(&a), positions.get(&b)) else {
                continue;
            };
            let len = pa.distance_m(pb);
            for (from, to) in [(a, b), (b, a)] {
                edges.push(
                    Edge::new(EdgeId(next_id), NodeId(from), NodeId(to), len)
                        .with_risk(IMPORTED_RISK)
                        .with_speed_limit(speed)
                        .with_name(name),
                );
                next_id += 1;
            }
            for id in [a, b] {
                if seen.insert(id) {
                    used.push(id);
                }
            }
        }
    }

    let nodes = used
        .into_iter()
        .map(|id| Node::new(NodeId(id), positions[&id]))
        .collect::<Vec<_>>();

    tracing::debug!(nodes = nodes.len(), edges = edges.len(), "overpass response converted");
    Ok((nodes, edges))
}

/// Parse an OSM `maxspeed` value into km/h.
///
/// Accepts plain numbers (`"50"`), explicit units (`"50 km/h"`) and miles
/// (`"30 mph"`).  Symbolic values such as `"walk"` or `"none"` yield `None`.
fn parse_maxspeed(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    let value: u32 = digits.parse().ok()?;
    if value == 0 {
        return None;
    }
    if raw.ends_with("mph") {
        Some((f64::from(value) * 1.609_344).round() as u32)
    } else {
        Some(value)
    }
}
