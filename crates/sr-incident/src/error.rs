use thiserror::Error;

use sr_core::{CoreError, GeoPoint, StreetId};
use sr_graph::GraphError;

/// Errors produced by `sr-incident`.
///
/// Every variant is raised before the graph is touched, so a failed report
/// leaves both the edge risk and the incident log unchanged.
#[derive(Debug, Error)]
pub enum IncidentError {
    /// Severity outside `[1, 10]`.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("incident position {0} is not a valid coordinate")]
    InvalidPosition(GeoPoint),

    #[error("no edge carries street {0}")]
    EdgeNotFound(StreetId),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type IncidentResult<T> = Result<T, IncidentError>;
