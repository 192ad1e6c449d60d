//! `sr-incident` — incident ingestion for `saferoute`.
//!
//! An [`IncidentIngestor`] validates a report, raises the risk of the edge
//! carrying the reported street by `severity / 10 * 5` (clamped to
//! `[0, 10]`), and appends the report to the graph's incident log.

pub mod error;
pub mod ingestor;

#[cfg(test)]
mod tests;

pub use error::{IncidentError, IncidentResult};
pub use ingestor::{IncidentIngestor, IncidentOutcome, IncidentRequest};
