//! Graph-subsystem error type.

use thiserror::Error;

use sr_core::{EdgeId, NodeId};

/// Errors produced by `sr-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeId),

    #[error("incident report ids exhausted")]
    ReportIdsExhausted,

    #[error("graph source error: {0}")]
    Source(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
