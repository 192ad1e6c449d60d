//! Incident report model.
//!
//! The report log is append-only: a report is created once by the incident
//! ingestor and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::{CoreError, GeoPoint, ReportId, StreetId};

/// What kind of event a user reported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IncidentType {
    Accident,
    Congestion,
    RoadWork,
    Hazard,
    Robbery,
    DisabledVehicle,
    Flooding,
    Protest,
    Other,
}

impl IncidentType {
    pub const ALL: [IncidentType; 9] = [
        IncidentType::Accident,
        IncidentType::Congestion,
        IncidentType::RoadWork,
        IncidentType::Hazard,
        IncidentType::Robbery,
        IncidentType::DisabledVehicle,
        IncidentType::Flooding,
        IncidentType::Protest,
        IncidentType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IncidentType::Accident        => "accident",
            IncidentType::Congestion      => "congestion",
            IncidentType::RoadWork        => "road_work",
            IncidentType::Hazard          => "hazard",
            IncidentType::Robbery         => "robbery",
            IncidentType::DisabledVehicle => "disabled_vehicle",
            IncidentType::Flooding        => "flooding",
            IncidentType::Protest         => "protest",
            IncidentType::Other           => "other",
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentType {
    type Err = CoreError;

    /// Case-insensitive; accepts `-` or ` ` in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        IncidentType::ALL
            .into_iter()
            .find(|t| t.as_str() == norm)
            .ok_or_else(|| CoreError::UnknownIncidentType(s.to_owned()))
    }
}

/// One user-submitted incident, as recorded in the graph's incident log.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IncidentReport {
    pub report_id: ReportId,
    pub street_id: StreetId,
    pub incident_type: IncidentType,
    /// In `[1, 10]`.
    pub severity: i32,
    pub lat: f64,
    pub lon: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: Option<String>,
    /// Risk added to the street's edge by this report.
    pub risk_increment: f64,
    pub reported_at: DateTime<Utc>,
}

impl IncidentReport {
    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}
