//! Unit tests for sr-service.

#[cfg(test)]
mod helpers {
    use std::path::Path;

    use sr_core::{EdgeId, GeoPoint, NodeId};
    use sr_graph::{Edge, Node};

    use crate::{SafeRouteService, ServiceConfig};

    pub fn memory_config() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.persistence.enabled = false;
        config
    }

    pub fn persistent_config(path: &Path) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.persistence.enabled = true;
        config.persistence.data_path = path.to_path_buf();
        config
    }

    /// Short risky road 1→2→4 and long quiet road 1→3→4.  Each edge's
    /// street id equals its edge id.
    pub fn diamond() -> (Vec<Node>, Vec<Edge>) {
        let nodes = vec![
            Node::new(NodeId(1), GeoPoint::new(10.3932, -75.4898)),
            Node::new(NodeId(2), GeoPoint::new(10.3941, -75.4898)),
            Node::new(NodeId(3), GeoPoint::new(10.3932, -75.4830)),
            Node::new(NodeId(4), GeoPoint::new(10.3950, -75.4898)),
        ];
        let edges = vec![
            Edge::new(EdgeId(1), NodeId(1), NodeId(2), 100.0).with_risk(6.0),
            Edge::new(EdgeId(2), NodeId(2), NodeId(4), 100.0).with_risk(6.0),
            Edge::new(EdgeId(3), NodeId(1), NodeId(3), 800.0),
            Edge::new(EdgeId(4), NodeId(3), NodeId(4), 800.0),
        ];
        (nodes, edges)
    }

    pub fn diamond_service(config: ServiceConfig) -> SafeRouteService {
        let service = SafeRouteService::open(config).unwrap();
        let (nodes, edges) = diamond();
        service.initialize(nodes, edges).unwrap();
        service
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::path::PathBuf;

    use sr_routing::{HeuristicKind, SafetyProfile};

    use crate::{ServiceConfig, ServiceError};

    #[test]
    fn defaults() {
        let c = ServiceConfig::default();
        assert!(c.persistence.enabled);
        assert_eq!(c.persistence.data_path, PathBuf::from("data/graph-data.json"));
        assert_eq!(c.routing.heuristic, HeuristicKind::None);
        assert_eq!(c.routing.default_profile, SafetyProfile::Balanced);
        assert_eq!(c.routing.max_expansions, None);
        assert_eq!(c.grid.rows, 10);
        c.validate().unwrap();
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(ServiceConfig::from_toml("").unwrap(), ServiceConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let c = ServiceConfig::from_toml(
            r#"
            log_filter = "sr_graph=debug"

            [persistence]
            enabled = false

            [routing]
            heuristic = "great_circle"
            max_expansions = 5000
            default_profile = "safest"

            [grid]
            rows = 4
            center = { lat = 4.711, lon = -74.0721 }
            "#,
        )
        .unwrap();

        assert!(!c.persistence.enabled);
        assert_eq!(c.persistence.data_path, PathBuf::from("data/graph-data.json"));
        assert_eq!(c.routing.heuristic, HeuristicKind::GreatCircle);
        assert_eq!(c.routing.max_expansions, Some(5000));
        assert_eq!(c.routing.default_profile, SafetyProfile::Safest);
        assert_eq!(c.grid.rows, 4);
        assert_eq!(c.grid.cols, 10);
        assert_eq!(c.grid.center.lat, 4.711);
        assert_eq!(c.log_filter, "sr_graph=debug");
    }

    #[test]
    fn rejects_bad_values() {
        let err = ServiceConfig::from_toml("[grid]\nrows = 0").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigInvalid { .. }), "{err}");

        let err = ServiceConfig::from_toml("[grid]\ninitial_risk = 11.0").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigInvalid { field: "grid.initial_risk", .. }));

        let err = ServiceConfig::from_toml("[routing]\nmax_expansions = 0").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigInvalid { field: "routing.max_expansions", .. }));

        let err = ServiceConfig::from_toml("[routing]\ndefault_profile = \"scenic\"").unwrap_err();
        assert!(matches!(err, ServiceError::ConfigParse { .. }));
    }

    #[test]
    fn persist_override() {
        let mut c = ServiceConfig::default();
        c.apply_persist_override(Some("false"));
        assert!(!c.persistence.enabled);
        c.apply_persist_override(Some(" TRUE "));
        assert!(c.persistence.enabled);
        c.apply_persist_override(Some("0"));
        assert!(!c.persistence.enabled);
        c.apply_persist_override(Some("maybe"));
        assert!(!c.persistence.enabled);
        c.apply_persist_override(None);
        assert!(!c.persistence.enabled);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saferoute.toml");
        std::fs::write(&path, "[grid]\ncols = 3\n").unwrap();
        assert_eq!(ServiceConfig::load(&path).unwrap().grid.cols, 3);

        let missing = ServiceConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, ServiceError::ConfigIo { .. }));
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use sr_core::{GeoPoint, NodeId};
    use sr_routing::{HeuristicKind, RouteError, SafetyProfile};

    use super::helpers::{diamond_service, memory_config};
    use crate::{SafeRouteService, ServiceError};

    #[test]
    fn profiles_pick_different_roads() {
        let service = diamond_service(memory_config());

        // fastest: 0.8 * 2 + 0.2 * 12 = 4.0 vs 0.8 * 16 = 12.8
        let fast = service.calculate_route(NodeId(1), NodeId(4), SafetyProfile::Fastest).unwrap();
        assert_eq!(fast.route.node_ids(), vec![NodeId(1), NodeId(2), NodeId(4)]);
        assert!((fast.route.total_cost - 4.0).abs() < 1e-9);

        // safest: 0.2 * 2 + 0.8 * 12 = 10.0 vs 0.2 * 16 = 3.2
        let safe = service.calculate_route(NodeId(1), NodeId(4), SafetyProfile::Safest).unwrap();
        assert_eq!(safe.route.node_ids(), vec![NodeId(1), NodeId(3), NodeId(4)]);
        assert_eq!(safe.profile, SafetyProfile::Safest);
    }

    #[test]
    fn default_profile_from_config() {
        let mut config = memory_config();
        config.routing.default_profile = SafetyProfile::Safest;
        let service = diamond_service(config);
        let planned = service.calculate_default_route(NodeId(1), NodeId(4)).unwrap();
        assert_eq!(planned.profile, SafetyProfile::Safest);
        assert_eq!(planned.route.node_ids(), vec![NodeId(1), NodeId(3), NodeId(4)]);
    }

    #[test]
    fn weighted_route_classifies_profile() {
        let service = diamond_service(memory_config());
        let planned = service.calculate_route_weighted(NodeId(1), NodeId(4), 0.9, 0.1).unwrap();
        assert_eq!(planned.profile, SafetyProfile::Fastest);

        let err = service.calculate_route_weighted(NodeId(1), NodeId(4), f64::NAN, 0.5).unwrap_err();
        assert!(matches!(err, ServiceError::Route(RouteError::Core(_))));
    }

    #[test]
    fn route_between_points_snaps_to_nodes() {
        let service = diamond_service(memory_config());
        let planned = service
            .route_between_points(
                GeoPoint::new(10.39321, -75.48981),
                GeoPoint::new(10.39499, -75.48979),
                SafetyProfile::Balanced,
            )
            .unwrap();
        assert_eq!(planned.route.path.first().unwrap().id, NodeId(1));
        assert_eq!(planned.route.path.last().unwrap().id, NodeId(4));
    }

    #[test]
    fn empty_graph() {
        let service = SafeRouteService::open(memory_config()).unwrap();
        let err = service
            .route_between_points(GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.0), SafetyProfile::Balanced)
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmptyGraph));

        let err = service.calculate_route(NodeId(1), NodeId(2), SafetyProfile::Balanced).unwrap_err();
        assert!(matches!(err, ServiceError::Route(RouteError::NodeNotFound(NodeId(1)))));
    }

    #[test]
    fn great_circle_heuristic_from_config() {
        let mut config = memory_config();
        config.routing.heuristic = HeuristicKind::GreatCircle;
        config.grid.rows = 5;
        config.grid.cols = 5;
        let service = SafeRouteService::open(config).unwrap();
        service.generate_grid(GeoPoint::new(10.3932, -75.4898), false).unwrap();

        let planned = service.calculate_route(NodeId(1), NodeId(25), SafetyProfile::Balanced).unwrap();
        // 8 hops of 100 m at risk 1.0: 8 * (0.5 * 1 + 0.5 * 1)
        assert_eq!(planned.route.edges.len(), 8);
        assert!((planned.route.total_cost - 8.0).abs() < 1e-2, "{}", planned.route.total_cost);
    }

    #[test]
    fn expansion_limit_from_config() {
        let mut config = memory_config();
        config.routing.max_expansions = Some(1);
        let service = diamond_service(config);
        let err = service.calculate_route(NodeId(1), NodeId(4), SafetyProfile::Balanced).unwrap_err();
        assert!(matches!(err, ServiceError::Route(RouteError::ExpansionLimit { limit: 1 })));
    }
}

// ── Incidents ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod incidents {
    use sr_core::{EdgeId, GeoPoint, IncidentType, NodeId, StreetId};
    use sr_incident::{IncidentError, IncidentRequest};
    use sr_routing::SafetyProfile;

    use super::helpers::{diamond_service, memory_config};
    use crate::ServiceError;

    #[test]
    fn report_reroutes_later_queries() {
        let service = diamond_service(memory_config());
        let before = service.calculate_route(NodeId(1), NodeId(4), SafetyProfile::Fastest).unwrap();
        assert_eq!(before.route.node_ids(), vec![NodeId(1), NodeId(2), NodeId(4)]);

        let pos = GeoPoint::new(10.3941, -75.4898);
        let req = IncidentRequest::new(StreetId(2), IncidentType::Robbery, 10, pos);
        let out = service.report_incident(req).unwrap();
        assert_eq!(out.edge_id, EdgeId(2));
        assert_eq!(out.new_risk, 10.0);

        service
            .report_incident(IncidentRequest::new(StreetId(1), IncidentType::Accident, 10, pos))
            .unwrap();
        let after = service.calculate_route(NodeId(1), NodeId(4), SafetyProfile::Balanced).unwrap();
        // balanced: 0.5 * 2 + 0.5 * 20 = 11.0 vs 0.5 * 16 = 8.0
        assert_eq!(after.route.node_ids(), vec![NodeId(1), NodeId(3), NodeId(4)]);

        assert_eq!(service.graph_status().incident_count, 2);
        assert_eq!(service.nearby_incidents(pos, 50.0).len(), 2);
        assert_eq!(service.incidents().len(), 2);
    }

    #[test]
    fn failures_surface_typed() {
        let service = diamond_service(memory_config());
        let pos = GeoPoint::new(10.3941, -75.4898);
        let err = service
            .report_incident(IncidentRequest::new(StreetId(99), IncidentType::Hazard, 5, pos))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Incident(IncidentError::EdgeNotFound(StreetId(99)))));
        assert_eq!(service.graph_status().incident_count, 0);
    }
}

// ── Graph generation and persistence ──────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use std::sync::Arc;

    use sr_core::{GeoPoint, IncidentType, NodeId, StreetId};
    use sr_graph::GraphStore;
    use sr_incident::IncidentRequest;

    use super::helpers::{diamond, diamond_service, memory_config, persistent_config};
    use crate::SafeRouteService;

    const CENTER: GeoPoint = GeoPoint { lat: 10.3932, lon: -75.4898 };

    #[test]
    fn grid_generation_is_idempotent_unless_forced() {
        let mut config = memory_config();
        config.grid.rows = 3;
        config.grid.cols = 4;
        let service = SafeRouteService::open(config).unwrap();

        let first = service.generate_grid(CENTER, false).unwrap();
        assert!(first.was_generated());
        assert_eq!(first.status().node_count, 12);
        // 3 * 3 horizontal + 2 * 4 vertical segments, two edges each
        assert_eq!(first.status().edge_count, 34);

        service
            .report_incident(IncidentRequest::new(StreetId(1), IncidentType::Hazard, 2, CENTER))
            .unwrap();

        let again = service.generate_grid(CENTER, false).unwrap();
        assert!(!again.was_generated());
        assert_eq!(service.graph_status().incident_count, 1);

        let forced = service.generate_grid(CENTER, true).unwrap();
        assert!(forced.was_generated());
        assert_eq!(service.graph_status().incident_count, 0);
    }

    #[test]
    fn overpass_import() {
        let service = SafeRouteService::open(memory_config()).unwrap();
        let body = r#"{"elements": [
            {"type": "node", "id": 10, "lat": 10.3932, "lon": -75.4898},
            {"type": "node", "id": 11, "lat": 10.3943, "lon": -75.4895},
            {"type": "node", "id": 12, "lat": 10.3950, "lon": -75.4900},
            {"type": "way", "id": 500, "nodes": [10, 11, 12],
             "tags": {"highway": "residential", "name": "Calle 30", "maxspeed": "30"}}
        ]}"#;
        let outcome = service.import_overpass(body, false).unwrap();
        assert!(outcome.was_generated());
        assert_eq!(outcome.status().node_count, 3);
        assert_eq!(outcome.status().edge_count, 4);

        let planned = service
            .calculate_route(NodeId(10), NodeId(12), sr_routing::SafetyProfile::Balanced)
            .unwrap();
        assert_eq!(planned.route.node_ids(), vec![NodeId(10), NodeId(11), NodeId(12)]);
        assert!(service.edges().iter().all(|e| e.speed_limit_kmh == 30));
    }

    #[test]
    fn mutations_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("graph.json");

        {
            let service = diamond_service(persistent_config(&path));
            service
                .report_incident(IncidentRequest::new(
                    StreetId(1),
                    IncidentType::Accident,
                    8,
                    CENTER,
                ))
                .unwrap();
        }
        assert!(path.exists());

        let reopened = SafeRouteService::open(persistent_config(&path)).unwrap();
        let status = reopened.graph_status();
        assert_eq!(status.node_count, 4);
        assert_eq!(status.edge_count, 4);
        assert_eq!(status.incident_count, 1);
        // 6.0 + 4.0
        let edge = reopened.edges().into_iter().find(|e| e.street_id == StreetId(1)).unwrap();
        assert_eq!(edge.risk_score, 10.0);
        let ids: Vec<_> = reopened.nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, diamond().0.iter().map(|n| n.id).collect::<Vec<_>>());
    }

    #[test]
    fn failed_save_keeps_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("graph.json");

        let service =
            SafeRouteService::with_store(persistent_config(&path), Arc::new(GraphStore::new()));

        let (nodes, edges) = diamond();
        let status = service.initialize(nodes, edges).unwrap();
        assert_eq!(status.node_count, 4);
        assert_eq!(service.graph_status().node_count, 4);
        assert!(service.save().is_err());
    }

    #[test]
    fn concurrent_reports_all_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let service = diamond_service(persistent_config(&path));

        std::thread::scope(|s| {
            for t in 0..8 {
                let service = &service;
                s.spawn(move || {
                    for _ in 0..5 {
                        let street = StreetId(1 + t % 4);
                        service
                            .report_incident(IncidentRequest::new(street, IncidentType::Hazard, 1, CENTER))
                            .unwrap();
                        service.save().unwrap();
                    }
                });
            }
        });

        let reopened = SafeRouteService::open(persistent_config(&path)).unwrap();
        assert_eq!(reopened.graph_status().incident_count, 40);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn nearest_node_lookup() {
        let service = diamond_service(memory_config());
        assert_eq!(service.nearest_node(CENTER).unwrap().id, NodeId(1));
    }
}
