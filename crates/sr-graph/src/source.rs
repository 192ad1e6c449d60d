//! Graph sources: where a store's nodes and edges come from.
//!
//! The store does not care how a graph was obtained; it only needs node and
//! edge lists whose endpoints line up.  Two sources ship with the crate:
//! [`GridSource`] (a synthetic street grid around a coordinate) and
//! [`OverpassSource`](crate::overpass::OverpassSource) (an already fetched
//! OpenStreetMap Overpass response).

use sr_core::{EdgeId, GeoPoint, NodeId};

use crate::model::{DEFAULT_SPEED_LIMIT_KMH, Edge, Node};
use crate::{GraphError, GraphResult};

/// Anything that can produce a node list and an edge list.
pub trait GraphSource {
    fn generate(&self) -> GraphResult<(Vec<Node>, Vec<Edge>)>;

    /// Short human-readable label for logs.
    fn describe(&self) -> String;
}

// ── GridSource ────────────────────────────────────────────────────────────────

/// A regular `rows × cols` street grid centred on a coordinate.
///
/// Node ids run `1..=rows*cols` in row-major order, starting at the
/// south-west corner.  Every horizontally or vertically adjacent pair is
/// joined by two directed edges (east/north first, then the return edge),
/// whose length is the great-circle distance between the endpoints.
#[derive(Clone, Debug)]
pub struct GridSource {
    pub center:          GeoPoint,
    pub rows:            usize,
    pub cols:            usize,
    pub spacing_m:       f64,
    pub initial_risk:    f64,
    pub speed_limit_kmh: u32,
}

impl GridSource {
    /// A grid with risk 1.0 and the default urban speed limit.
    pub fn new(center: GeoPoint, rows: usize, cols: usize, spacing_m: f64) -> Self {
        Self {
            center,
            rows,
            cols,
            spacing_m,
            initial_risk: 1.0,
            speed_limit_kmh: DEFAULT_SPEED_LIMIT_KMH,
        }
    }

    pub fn with_initial_risk(mut self, risk: f64) -> Self {
        self.initial_risk = risk;
        self
    }

    pub fn with_speed_limit(mut self, kmh: u32) -> Self {
        self.speed_limit_kmh = kmh;
        self
    }

    fn node_id(&self, row: usize, col: usize) -> NodeId {
        NodeId((row * self.cols + col) as i64 + 1)
    }
}

impl GraphSource for GridSource {
    fn generate(&self) -> GraphResult<(Vec<Node>, Vec<Edge>)> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GraphError::Source(format!(
                "grid must have at least one row and column (got {}x{})",
                self.rows, self.cols
            )));
        }
        if !self.spacing_m.is_finite() || self.spacing_m <= 0.0 {
            return Err(GraphError::Source(format!(
                "grid spacing must be positive (got {})",
                self.spacing_m
            )));
        }
        if !self.center.is_valid() {
            return Err(GraphError::Source(format!("invalid grid center {}", self.center)));
        }

        let half_rows = (self.rows - 1) as f64 * 0.5;
        let half_cols = (self.cols - 1) as f64 * 0.5;

        let mut nodes = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows {
            for col in 0..self.cols {
                let pos = self.center.offset_m(
                    (row as f64 - half_rows) * self.spacing_m,
                    (col as f64 - half_cols) * self.spacing_m,
                );
                nodes.push(Node::new(self.node_id(row, col), pos));
            }
        }

        let segments = self.rows * (self.cols - 1) + self.cols * (self.rows - 1);
        let mut edges = Vec::with_capacity(segments * 2);
        let mut next_id = 1i64;
        let mut link = |a: &Node, b: &Node| {
            let len = a.pos().distance_m(b.pos());
            for (from, to) in [(a.id, b.id), (b.id, a.id)] {
                edges.push(
                    Edge::new(EdgeId(next_id), from, to, len)
                        .with_risk(self.initial_risk)
                        .with_speed_limit(self.speed_limit_kmh),
                );
                next_id += 1;
            }
        };

        for row in 0..self.rows {
            for col in 0..self.cols {
                let here = &nodes[row * self.cols + col];
                if col + 1 < self.cols {
                    link(here, &nodes[row * self.cols + col + 1]);
                }
                if row + 1 < self.rows {
                    link(here, &nodes[(row + 1) * self.cols + col]);
                }
            }
        }

        Ok((nodes, edges))
    }

    fn describe(&self) -> String {
        format!("{}x{} grid at {} ({} m)", self.rows, self.cols, self.center, self.spacing_m)
    }
}
