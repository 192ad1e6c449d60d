//! Routing error type.

use thiserror::Error;

use sr_core::{CoreError, NodeId};

/// Errors produced by `sr-routing`.
///
/// [`RouteError::NoRouteFound`] is an expected outcome (disconnected
/// endpoints), not a fault; callers should report it as a normal negative
/// answer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RouteError {
    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("no route from {from} to {to}")]
    NoRouteFound { from: NodeId, to: NodeId },

    #[error("search gave up after expanding {limit} nodes")]
    ExpansionLimit { limit: usize },

    #[error("unknown safety profile {0:?} (expected fastest, balanced or safest)")]
    UnknownProfile(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type RouteResult<T> = Result<T, RouteError>;
