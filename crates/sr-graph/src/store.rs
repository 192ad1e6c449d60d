//! The `GraphStore`, single owner of graph state.
//!
//! # Concurrency
//!
//! The store holds an `Arc<Graph>` behind a `RwLock`.  Readers clone the
//! `Arc` ([`snapshot`](GraphStore::snapshot)) and release the lock at once,
//! so a route computation never holds it.  Writers take the write lock and
//! either swap in a freshly built graph (`initialize`) or mutate through
//! `Arc::make_mut`, which copies the graph first if any snapshot is still
//! alive.  That copy is shallow: only the edge list or the incident log a
//! transaction touches is duplicated.  A snapshot therefore never changes
//! under its holder, and a single risk write is never observed half-applied.
//!
//! Saves are serialized by a separate mutex, and each takes its snapshot
//! while holding it, so the last save to finish always writes the newest
//! graph.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sr_core::{EdgeId, IncidentReport, NodeId, ReportId, StreetId, clamp_risk};

use crate::graph::{Graph, GraphStatus};
use crate::model::{Edge, Node};
use crate::persist;
use crate::source::GraphSource;
use crate::{GraphError, GraphResult};

// ── GenerateOutcome ───────────────────────────────────────────────────────────

/// Result of [`GraphStore::generate`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The store now holds the generated graph.
    Generated(GraphStatus),
    /// A graph was already loaded and regeneration was not forced; the
    /// existing graph is untouched.
    Skipped(GraphStatus),
}

impl GenerateOutcome {
    pub fn status(&self) -> GraphStatus {
        match *self {
            GenerateOutcome::Generated(s) | GenerateOutcome::Skipped(s) => s,
        }
    }

    pub fn was_generated(&self) -> bool {
        matches!(self, GenerateOutcome::Generated(_))
    }
}

// ── GraphTxn ──────────────────────────────────────────────────────────────────

/// A write transaction against the current graph.
///
/// Reads see the graph as it was when the transaction began.  Writes are
/// staged and only applied if the transaction closure returns `Ok`, so a
/// failing closure leaves the store untouched.
pub struct GraphTxn<'g> {
    graph:       &'g Graph,
    risk_writes: Vec<(usize, f64)>,
    appended:    Vec<IncidentReport>,
}

impl<'g> GraphTxn<'g> {
    fn new(graph: &'g Graph) -> Self {
        Self { graph, risk_writes: Vec::new(), appended: Vec::new() }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Stage a risk write.  Returns the clamped value that will be stored.
    ///
    /// # Errors
    ///
    /// [`GraphError::EdgeNotFound`] if `edge` is not in the graph.
    pub fn set_risk(&mut self, edge: EdgeId, risk: f64) -> GraphResult<f64> {
        let slot = self.graph.edge_slot(edge).ok_or(GraphError::EdgeNotFound(edge))?;
        let risk = clamp_risk(risk);
        self.risk_writes.push((slot, risk));
        Ok(risk)
    }

    /// Stage an incident report for the append-only log.
    pub fn append_incident(&mut self, report: IncidentReport) {
        self.appended.push(report);
    }

    /// A report id strictly greater than every stored or staged one, and no
    /// smaller than `now_millis`.
    ///
    /// # Errors
    ///
    /// [`GraphError::ReportIdsExhausted`] if the log already holds
    /// `ReportId(u64::MAX)`.
    pub fn next_report_id(&self, now_millis: u64) -> GraphResult<ReportId> {
        let last = self
            .appended
            .iter()
            .map(|r| r.report_id)
            .chain(self.graph.last_report_id())
            .max();
        match last {
            Some(last) => {
                let after = last.0.checked_add(1).ok_or(GraphError::ReportIdsExhausted)?;
                Ok(ReportId(now_millis.max(after)))
            }
            None => Ok(ReportId(now_millis)),
        }
    }
}

// ── GraphStore ────────────────────────────────────────────────────────────────

/// Authoritative, thread-safe owner of one street graph.
///
/// Share it between request handlers as `Arc<GraphStore>`.
pub struct GraphStore {
    current: RwLock<Arc<Graph>>,
    saving:  Mutex<()>,
}

impl GraphStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::from_graph(Graph::empty())
    }

    pub fn from_graph(graph: Graph) -> Self {
        Self { current: RwLock::new(Arc::new(graph)), saving: Mutex::new(()) }
    }

    /// Load the graph last saved at `path`, or start empty if there is none.
    pub fn open(path: &Path) -> GraphResult<Self> {
        Ok(Self::from_graph(persist::load(path)?))
    }

    /// Write the current graph to `path`.
    ///
    /// Concurrent saves run one at a time, each writing the graph as it is
    /// when its turn comes.
    pub fn save(&self, path: &Path) -> GraphResult<()> {
        let _turn = self.saving.lock().unwrap_or_else(PoisonError::into_inner);
        persist::save(path, &self.snapshot())
    }

    // ── Lock helpers ──────────────────────────────────────────────────────

    // Every write is staged and applied without panicking, so a poisoned
    // lock still guards a consistent graph.
    fn read(&self) -> RwLockReadGuard<'_, Arc<Graph>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arc<Graph>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Writers ───────────────────────────────────────────────────────────

    /// Replace the graph wholesale with `nodes` and `edges`, clearing the
    /// incident log.
    ///
    /// The new graph and its indexes are built before the lock is taken; on
    /// error the previous graph is left untouched.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidGraph`], see [`Graph::build`].
    pub fn initialize(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<GraphStatus> {
        let graph = Graph::build(nodes, edges, Vec::new()).inspect_err(|e| {
            tracing::warn!(error = %e, "rejected graph initialization");
        })?;
        let status = graph.status();
        *self.write() = Arc::new(graph);
        tracing::info!(
            nodes = status.node_count,
            edges = status.edge_count,
            "graph initialized"
        );
        Ok(status)
    }

    /// Populate the store from `source`.
    ///
    /// With `force_regenerate == false` this is a no-op when a graph is
    /// already loaded.  The emptiness check is repeated under the write lock,
    /// so two concurrent non-forced calls never both install a graph.
    pub fn generate<S: GraphSource + ?Sized>(
        &self,
        source: &S,
        force_regenerate: bool,
    ) -> GraphResult<GenerateOutcome> {
        if !force_regenerate {
            let current = self.snapshot();
            if !current.is_empty() {
                tracing::info!("graph already loaded, skipping generation");
                return Ok(GenerateOutcome::Skipped(current.status()));
            }
        }

        let (nodes, edges) = source.generate()?;
        let graph = Graph::build(nodes, edges, Vec::new())?;
        let status = graph.status();

        let mut guard = self.write();
        if !force_regenerate && !guard.is_empty() {
            return Ok(GenerateOutcome::Skipped(guard.status()));
        }
        *guard = Arc::new(graph);
        drop(guard);

        tracing::info!(
            source = %source.describe(),
            nodes = status.node_count,
            edges = status.edge_count,
            "graph generated"
        );
        Ok(GenerateOutcome::Generated(status))
    }

    /// Run `f` as one write transaction.  Staged writes are applied only if
    /// `f` returns `Ok`.
    pub fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut GraphTxn<'_>) -> Result<T, E>,
    {
        let mut guard = self.write();
        let (value, risk_writes, appended) = {
            let mut txn = GraphTxn::new(&guard);
            let value = f(&mut txn)?;
            (value, txn.risk_writes, txn.appended)
        };
        if !risk_writes.is_empty() || !appended.is_empty() {
            Arc::make_mut(&mut guard).apply(risk_writes, appended);
        }
        Ok(value)
    }

    /// Clamp `risk` into `[0, 10]` and store it on `edge`.  Returns the stored
    /// value.
    ///
    /// # Errors
    ///
    /// [`GraphError::EdgeNotFound`] if `edge` does not exist.
    pub fn update_risk(&self, edge: EdgeId, risk: f64) -> GraphResult<f64> {
        self.transaction(|txn| txn.set_risk(edge, risk))
    }

    // ── Readers ───────────────────────────────────────────────────────────

    /// The current graph.  Later writes never affect the returned value.
    pub fn snapshot(&self) -> Arc<Graph> {
        Arc::clone(&self.read())
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn status(&self) -> GraphStatus {
        self.read().status()
    }

    pub fn get_node(&self, id: NodeId) -> Option<Node> {
        self.read().node(id).cloned()
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<Edge> {
        self.read().edge(id).cloned()
    }

    pub fn get_edge_by_street(&self, street: StreetId) -> Option<Edge> {
        self.read().edge_by_street(street).cloned()
    }

    /// Outgoing edges of `node` in insertion order; empty for unknown nodes.
    pub fn neighbors(&self, node: NodeId) -> Vec<Edge> {
        self.read().neighbors(node).cloned().collect()
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.read().nodes().to_vec()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.read().edges().to_vec()
    }

    pub fn incidents(&self) -> Vec<IncidentReport> {
        self.read().incidents().to_vec()
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
