//! city — end-to-end walkthrough of the saferoute engine.
//!
//! Builds a synthetic street grid around central Cartagena, plans the same
//! trip under each safety profile, reports a robbery on the fastest route
//! and plans again.
//!
//! Usage: `city [config.toml]`.  Without a config file persistence is off
//! unless `SAFEROUTE_PERSIST_DATA=true` is set.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use sr_service::{
    IncidentRequest, IncidentType, NodeId, PlannedRoute, SafeRouteService, SafetyProfile,
    ServiceConfig, logging,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const INCIDENT_SEVERITY: i32 = 9;
const NEARBY_RADIUS_M:   f64 = 250.0;

fn main() -> Result<()> {
    let config = match std::env::args_os().nth(1) {
        Some(path) => {
            let path = Path::new(&path);
            ServiceConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display()))?
        }
        None => {
            let mut config = ServiceConfig::default();
            config.persistence.enabled = false;
            config.apply_env_overrides();
            config
        }
    };
    logging::init(&config.log_filter);

    let center = config.grid.center;
    let goal = NodeId((config.grid.rows * config.grid.cols) as i64);
    let start = NodeId(1);

    let service = SafeRouteService::open(config).context("opening graph store")?;
    let outcome = service.generate_grid(center, false)?;
    println!("graph: {}", serde_json::to_string(&outcome.status())?);

    // ── Plan under every profile ──────────────────────────────────────────
    let mut fastest = None;
    for profile in SafetyProfile::ALL {
        let planned = service.calculate_route(start, goal, profile)?;
        println!("{}", summary(&planned));
        if profile == SafetyProfile::Fastest {
            fastest = Some(planned);
        }
    }
    let fastest = fastest.context("fastest profile was not planned")?;

    // ── Report a robbery halfway along the fastest route ──────────────────
    let Some(&edge_id) = fastest.route.edges.get(fastest.route.edges.len() / 2) else {
        println!("start and goal coincide; nothing to report");
        return Ok(());
    };
    let edge = service
        .store()
        .get_edge(edge_id)
        .with_context(|| format!("edge {edge_id} vanished from the graph"))?;
    let at = service
        .store()
        .get_node(edge.from)
        .with_context(|| format!("node {} vanished from the graph", edge.from))?
        .pos();

    let request = IncidentRequest::new(edge.street_id, IncidentType::Robbery, INCIDENT_SEVERITY, at)
        .with_description("armed robbery reported by a pedestrian");
    let report = service.report_incident(request)?;
    println!("incident: {}", serde_json::to_string(&report)?);

    // ── Re-plan ───────────────────────────────────────────────────────────
    let replanned = service.calculate_route(start, goal, SafetyProfile::Fastest)?;
    println!("{}", summary(&replanned));
    println!(
        "fastest route {} after the report",
        if replanned.route.edges == fastest.route.edges { "unchanged" } else { "rerouted" }
    );

    let nearby = service.nearby_incidents(at, NEARBY_RADIUS_M);
    println!("incidents within {NEARBY_RADIUS_M} m: {}", nearby.len());
    println!("graph: {}", serde_json::to_string(&service.graph_status())?);

    Ok(())
}

fn summary(planned: &PlannedRoute) -> serde_json::Value {
    json!({
        "profile":        planned.profile,
        "alpha":          planned.weights.alpha,
        "beta":           planned.weights.beta,
        "nodes":          planned.route.node_ids(),
        "total_cost":     planned.route.total_cost,
        "distance_m":     planned.route.total_distance_m,
        "expanded_nodes": planned.route.expanded_nodes,
    })
}
