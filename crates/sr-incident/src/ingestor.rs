//! Turns incident reports into risk updates plus an audit record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sr_core::{
    EdgeId, GeoPoint, IncidentReport, IncidentType, ReportId, StreetId, clamp_risk,
    risk_increment,
};
use sr_graph::GraphStore;

use crate::{IncidentError, IncidentResult};

/// A user-submitted incident, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncidentRequest {
    pub street_id: StreetId,
    pub incident_type: IncidentType,
    pub severity: i32,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl IncidentRequest {
    pub fn new(street_id: StreetId, incident_type: IncidentType, severity: i32, pos: GeoPoint) -> Self {
        Self { street_id, incident_type, severity, lat: pos.lat, lon: pos.lon, description: None }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// What a successful report changed.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct IncidentOutcome {
    pub report_id: ReportId,
    pub street_id: StreetId,
    pub edge_id: EdgeId,
    pub previous_risk: f64,
    pub new_risk: f64,
    pub risk_increment: f64,
}

/// Validates incident reports and applies them to a shared [`GraphStore`].
#[derive(Clone)]
pub struct IncidentIngestor {
    store: Arc<GraphStore>,
}

impl IncidentIngestor {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<GraphStore> {
        &self.store
    }

    /// Record `request` at the current wall-clock time.
    pub fn report(&self, request: IncidentRequest) -> IncidentResult<IncidentOutcome> {
        self.report_at(request, Utc::now())
    }

    /// Record `request` as reported at `now`.
    ///
    /// The risk write and the log append happen in one store transaction:
    /// concurrent reports on the same street never lose an increment, and a
    /// route snapshot sees either both or neither.
    ///
    /// # Errors
    ///
    /// - [`IncidentError::Core`] if the severity is outside `[1, 10]`.
    /// - [`IncidentError::InvalidPosition`] for out-of-range coordinates.
    /// - [`IncidentError::EdgeNotFound`] if no edge carries the street id.
    pub fn report_at(
        &self,
        request: IncidentRequest,
        now: DateTime<Utc>,
    ) -> IncidentResult<IncidentOutcome> {
        let increment = risk_increment(request.severity).inspect_err(|e| {
            tracing::warn!(street = %request.street_id, error = %e, "rejected incident report");
        })?;
        let position = request.position();
        if !position.is_valid() {
            return Err(IncidentError::InvalidPosition(position));
        }

        let now_millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);

        let outcome = self.store.transaction(|txn| {
            let edge = txn
                .graph()
                .edge_by_street(request.street_id)
                .ok_or(IncidentError::EdgeNotFound(request.street_id))?;
            let previous_risk = edge.risk_score;
            let edge_id = edge.id;

            let new_risk = txn.set_risk(edge_id, clamp_risk(previous_risk + increment))?;
            let report_id = txn.next_report_id(now_millis)?;

            txn.append_incident(IncidentReport {
                report_id,
                street_id: request.street_id,
                incident_type: request.incident_type,
                severity: request.severity,
                lat: request.lat,
                lon: request.lon,
                description: request.description.clone(),
                risk_increment: increment,
                reported_at: now,
            });

            Ok::<_, IncidentError>(IncidentOutcome {
                report_id,
                street_id: request.street_id,
                edge_id,
                previous_risk,
                new_risk,
                risk_increment: increment,
            })
        });

        match &outcome {
            Ok(o) => tracing::info!(
                report = %o.report_id,
                street = %o.street_id,
                kind = %request.incident_type,
                severity = request.severity,
                previous_risk = o.previous_risk,
                new_risk = o.new_risk,
                "incident recorded"
            ),
            Err(e) => tracing::warn!(street = %request.street_id, error = %e, "incident not recorded"),
        }
        outcome
    }

    /// Incidents reported within `radius_m` metres of `point`, oldest first.
    pub fn nearby(&self, point: GeoPoint, radius_m: f64) -> Vec<IncidentReport> {
        self.store
            .snapshot()
            .incidents_within(point, radius_m)
            .into_iter()
            .cloned()
            .collect()
    }

    /// The whole incident log, oldest first.
    pub fn history(&self) -> Vec<IncidentReport> {
        self.store.incidents()
    }
}
