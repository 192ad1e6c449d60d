//! Outgoing-edge index in Compressed Sparse Row (CSR) form.
//!
//! Given a node slot `n`, its outgoing edge slots occupy:
//!
//! ```text
//! out_edges[ out_start[n] .. out_start[n+1] ]
//! ```
//!
//! The index is built with a counting sort, which is stable: within one
//! node, edge slots appear in the order the edges were supplied.  Route
//! tie-breaking depends on that order.
//!
//! The index is derived data.  It is only ever built together with the edge
//! list it describes (inside `Graph::build`), never patched separately.

/// CSR adjacency over dense node and edge slots.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
    /// Row pointer.  Length = `node_count + 1`.
    out_start: Vec<u32>,
    /// Edge slots grouped by source node.
    out_edges: Vec<u32>,
}

impl AdjacencyIndex {
    /// Build the index for `node_count` nodes, where `edge_sources[e]` is the
    /// source node slot of edge slot `e`.
    ///
    /// Time complexity: O(N + E).
    pub fn build(node_count: usize, edge_sources: &[u32]) -> Self {
        let mut out_start = vec![0u32; node_count + 1];
        for &src in edge_sources {
            out_start[src as usize + 1] += 1;
        }
        for i in 1..=node_count {
            out_start[i] += out_start[i - 1];
        }
        debug_assert_eq!(out_start[node_count] as usize, edge_sources.len());

        let mut cursor = out_start.clone();
        let mut out_edges = vec![0u32; edge_sources.len()];
        for (edge, &src) in edge_sources.iter().enumerate() {
            let at = &mut cursor[src as usize];
            out_edges[*at as usize] = edge as u32;
            *at += 1;
        }

        Self { out_start, out_edges }
    }

    /// Outgoing edge slots of `node`, in insertion order.
    #[inline]
    pub fn out_edges(&self, node: usize) -> &[u32] {
        let start = self.out_start[node] as usize;
        let end   = self.out_start[node + 1] as usize;
        &self.out_edges[start..end]
    }

    #[inline]
    pub fn out_degree(&self, node: usize) -> usize {
        (self.out_start[node + 1] - self.out_start[node]) as usize
    }

    pub fn node_count(&self) -> usize {
        self.out_start.len().saturating_sub(1)
    }

    pub fn edge_count(&self) -> usize {
        self.out_edges.len()
    }
}
