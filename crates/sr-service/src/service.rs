//! The query surface the transport layer calls.

use std::sync::Arc;

use serde::Serialize;

use sr_core::{CostWeights, GeoPoint, IncidentReport, NodeId};
use sr_graph::{Edge, GenerateOutcome, GraphStatus, GraphStore, Node, OverpassSource};
use sr_incident::{IncidentIngestor, IncidentOutcome, IncidentRequest};
use sr_routing::{Heuristic, Route, RouteEngine, SafetyProfile};

use crate::config::ServiceConfig;
use crate::{ServiceError, ServiceResult};

/// A computed route and the profile it was planned under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    pub profile: SafetyProfile,
    pub weights: CostWeights,
    pub route: Route,
}

/// Owns one [`GraphStore`] and the engines that read and write it.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct SafeRouteService {
    config:   ServiceConfig,
    store:    Arc<GraphStore>,
    engine:   RouteEngine<Box<dyn Heuristic>>,
    ingestor: IncidentIngestor,
}

impl SafeRouteService {
    /// Start from the persisted graph when persistence is enabled, otherwise
    /// from an empty graph.
    pub fn open(config: ServiceConfig) -> ServiceResult<Self> {
        let store = if config.persistence.enabled {
            let store = GraphStore::open(&config.persistence.data_path)?;
            let status = store.status();
            tracing::info!(
                path = %config.persistence.data_path.display(),
                nodes = status.node_count,
                edges = status.edge_count,
                incidents = status.incident_count,
                "graph loaded"
            );
            store
        } else {
            GraphStore::new()
        };
        Ok(Self::with_store(config, Arc::new(store)))
    }

    pub fn with_store(config: ServiceConfig, store: Arc<GraphStore>) -> Self {
        let mut engine = RouteEngine::with_heuristic(config.routing.heuristic.build());
        if let Some(limit) = config.routing.max_expansions {
            engine = engine.with_max_expansions(limit);
        }
        let ingestor = IncidentIngestor::new(Arc::clone(&store));
        Self { config, store, engine, ingestor }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    // ── Routing ───────────────────────────────────────────────────────────

    pub fn calculate_route(
        &self,
        start: NodeId,
        goal: NodeId,
        profile: SafetyProfile,
    ) -> ServiceResult<PlannedRoute> {
        let weights = profile.weights();
        let route = self.route(start, goal, weights)?;
        Ok(PlannedRoute { profile, weights, route })
    }

    /// Route with the configured default profile.
    pub fn calculate_default_route(&self, start: NodeId, goal: NodeId) -> ServiceResult<PlannedRoute> {
        self.calculate_route(start, goal, self.config.routing.default_profile)
    }

    /// Route with arbitrary weights; the reported profile is the nearest
    /// preset.
    pub fn calculate_route_weighted(
        &self,
        start: NodeId,
        goal: NodeId,
        alpha: f64,
        beta: f64,
    ) -> ServiceResult<PlannedRoute> {
        let weights = CostWeights::new(alpha, beta).map_err(sr_routing::RouteError::from)?;
        if !weights.is_normalized(0.01) {
            tracing::debug!(alpha, beta, "weights do not sum to 1");
        }
        let route = self.route(start, goal, weights)?;
        Ok(PlannedRoute { profile: SafetyProfile::classify(weights), weights, route })
    }

    /// Route between the nodes nearest to two coordinates.
    pub fn route_between_points(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        profile: SafetyProfile,
    ) -> ServiceResult<PlannedRoute> {
        let graph = self.store.snapshot();
        let (Some(start), Some(goal)) = (graph.nearest_node(from), graph.nearest_node(to)) else {
            return Err(ServiceError::EmptyGraph);
        };
        let weights = profile.weights();
        let route = self.engine.calculate_route(&graph, start.id, goal.id, weights)?;
        Ok(PlannedRoute { profile, weights, route })
    }

    fn route(&self, start: NodeId, goal: NodeId, weights: CostWeights) -> ServiceResult<Route> {
        let graph = self.store.snapshot();
        Ok(self.engine.calculate_route(&graph, start, goal, weights)?)
    }

    // ── Incidents ─────────────────────────────────────────────────────────

    pub fn report_incident(&self, request: IncidentRequest) -> ServiceResult<IncidentOutcome> {
        let outcome = self.ingestor.report(request)?;
        self.persist();
        Ok(outcome)
    }

    pub fn nearby_incidents(&self, point: GeoPoint, radius_m: f64) -> Vec<IncidentReport> {
        self.ingestor.nearby(point, radius_m)
    }

    pub fn incidents(&self) -> Vec<IncidentReport> {
        self.ingestor.history()
    }

    // ── Graph ─────────────────────────────────────────────────────────────

    pub fn graph_status(&self) -> GraphStatus {
        self.store.status()
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.store.nodes()
    }

    pub fn edges(&self) -> Vec<Edge> {
        self.store.edges()
    }

    pub fn nearest_node(&self, point: GeoPoint) -> Option<Node> {
        self.store.snapshot().nearest_node(point).cloned()
    }

    pub fn initialize(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> ServiceResult<GraphStatus> {
        let status = self.store.initialize(nodes, edges)?;
        self.persist();
        Ok(status)
    }

    /// Build the configured synthetic grid around `center`.
    pub fn generate_grid(
        &self,
        center: GeoPoint,
        force_regenerate: bool,
    ) -> ServiceResult<GenerateOutcome> {
        let source = self.config.grid.source(center);
        let outcome = self.store.generate(&source, force_regenerate)?;
        if outcome.was_generated() {
            self.persist();
        }
        Ok(outcome)
    }

    /// Build the graph from an Overpass API JSON response.
    pub fn import_overpass(
        &self,
        body: impl Into<String>,
        force_regenerate: bool,
    ) -> ServiceResult<GenerateOutcome> {
        let source = OverpassSource::new(body);
        let outcome = self.store.generate(&source, force_regenerate)?;
        if outcome.was_generated() {
            self.persist();
        }
        Ok(outcome)
    }

    /// Write the graph to the configured path now.
    pub fn save(&self) -> ServiceResult<()> {
        self.store.save(&self.config.persistence.data_path)?;
        Ok(())
    }

    /// Save after a committed mutation.  The mutation stands even if the
    /// save fails.
    fn persist(&self) {
        if !self.config.persistence.enabled {
            return;
        }
        if let Err(e) = self.save() {
            tracing::error!(
                path = %self.config.persistence.data_path.display(),
                error = %e,
                "failed to save graph"
            );
        }
    }
}
