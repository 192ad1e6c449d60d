use thiserror::Error;

use sr_graph::GraphError;
use sr_incident::IncidentError;
use sr_routing::RouteError;

/// Errors surfaced by [`SafeRouteService`](crate::SafeRouteService).
///
/// Each is scoped to one request; none leaves the service unusable.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Incident(#[from] IncidentError),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    ConfigParse { path: String, message: String },

    #[error("invalid config value for {field}: {message}")]
    ConfigInvalid { field: &'static str, message: String },

    #[error("graph has no nodes to route between")]
    EmptyGraph,
}

pub type ServiceResult<T> = Result<T, ServiceError>;
