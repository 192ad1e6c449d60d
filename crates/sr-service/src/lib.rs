//! `sr-service` — the `saferoute` query surface.
//!
//! [`SafeRouteService`] wires one [`sr_graph::GraphStore`] to the route
//! engine and the incident ingestor, and saves the graph after every
//! mutation when persistence is enabled.  [`ServiceConfig`] is read from
//! TOML; [`logging::init`] installs the tracing subscriber.

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

#[cfg(test)]
mod tests;

pub use config::{GridConfig, PersistenceConfig, RoutingConfig, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use service::{PlannedRoute, SafeRouteService};

pub use sr_core::{CostWeights, GeoPoint, IncidentType, NodeId, StreetId};
pub use sr_incident::{IncidentOutcome, IncidentRequest};
pub use sr_routing::SafetyProfile;
