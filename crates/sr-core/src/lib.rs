//! `sr-core` — foundational types for the `saferoute` engine.
//!
//! This crate is a dependency of every other `sr-*` crate.  It has no `sr-*`
//! dependencies and only pure functions: nothing here touches shared state.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `StreetId`, `ReportId`            |
//! | [`geo`]         | `GeoPoint`, haversine and planar distances            |
//! | [`risk`]        | severity → risk increment, clamping, `CostWeights`    |
//! | [`incident`]    | `IncidentType`, `IncidentReport`                      |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required by `sr-graph` persistence.                        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod incident;
pub mod risk;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId, ReportId, StreetId};
pub use incident::{IncidentReport, IncidentType};
pub use risk::{CostWeights, clamp_risk, composite_cost, risk_increment};
