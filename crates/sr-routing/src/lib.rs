//! `sr-routing` — safety-aware path search for `saferoute`.
//!
//! Routes are computed against an immutable [`sr_graph::Graph`] snapshot, so
//! a search never blocks writers and never sees a half-applied update.
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`engine`]    | `RouteEngine`, `Route`, edge cost                   |
//! | [`heuristic`] | `Heuristic` trait, zero and great-circle estimates  |
//! | [`profile`]   | `SafetyProfile` presets                             |
//! | [`error`]     | `RouteError`, `RouteResult`                         |

pub mod engine;
pub mod error;
pub mod heuristic;
pub mod profile;


pub use engine::{Route, RouteEngine, edge_cost};
pub use error::{RouteError, RouteResult};
pub use heuristic::{GreatCircleHeuristic, Heuristic, HeuristicKind, ZeroHeuristic};
pub use profile::SafetyProfile;
