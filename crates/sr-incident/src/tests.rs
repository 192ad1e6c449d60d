//! Unit tests for sr-incident.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use chrono::{DateTime, Utc};
    use sr_core::{EdgeId, GeoPoint, IncidentType, NodeId, StreetId};
    use sr_graph::{Edge, GraphStore, Node};

    use crate::{IncidentIngestor, IncidentRequest};

    pub const HERE: GeoPoint = GeoPoint { lat: 10.3932, lon: -75.4898 };

    /// Chain 1→2→3 with edge 1 at risk 2.5 and edge 2 at risk 9.0.  Street
    /// 7 is carried by edge 2 and by the later edge 3 (2→1).
    pub fn ingestor() -> IncidentIngestor {
        let store = GraphStore::new();
        store
            .initialize(
                vec![
                    Node::new(NodeId(1), HERE),
                    Node::new(NodeId(2), GeoPoint::new(10.3943, -75.4895)),
                    Node::new(NodeId(3), GeoPoint::new(10.3950, -75.4900)),
                ],
                vec![
                    Edge::new(EdgeId(1), NodeId(1), NodeId(2), 123.0).with_risk(2.5),
                    Edge::new(EdgeId(2), NodeId(2), NodeId(3), 145.0)
                        .with_risk(9.0)
                        .with_street(StreetId(7)),
                    Edge::new(EdgeId(3), NodeId(2), NodeId(1), 123.0).with_street(StreetId(7)),
                ],
            )
            .unwrap();
        IncidentIngestor::new(Arc::new(store))
    }

    pub fn request(street: i64, severity: i32) -> IncidentRequest {
        IncidentRequest::new(StreetId(street), IncidentType::Accident, severity, HERE)
    }

    pub fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }
}

// ── Reporting ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod report {
    use sr_core::{CoreError, EdgeId, GeoPoint, IncidentType, ReportId, StreetId};

    use super::helpers::{HERE, at, ingestor, request};
    use crate::{IncidentError, IncidentRequest};

    #[test]
    fn severity_eight_on_risk_two_and_a_half() {
        let ing = ingestor();
        let out = ing.report_at(request(1, 8), at(1_700_000_000)).unwrap();

        assert_eq!(out.edge_id, EdgeId(1));
        assert_eq!(out.street_id, StreetId(1));
        assert_eq!(out.previous_risk, 2.5);
        assert_eq!(out.risk_increment, 4.0);
        assert_eq!(out.new_risk, 6.5);
        assert_eq!(ing.store().get_edge(EdgeId(1)).unwrap().risk_score, 6.5);

        let log = ing.history();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].report_id, out.report_id);
        assert_eq!(log[0].severity, 8);
        assert_eq!(log[0].incident_type, IncidentType::Accident);
        assert_eq!(log[0].risk_increment, 4.0);
    }

    #[test]
    fn risk_saturates_at_ten() {
        let ing = ingestor();
        let out = ing.report_at(request(7, 10), at(1_700_000_000)).unwrap();
        assert_eq!(out.previous_risk, 9.0);
        assert_eq!(out.new_risk, 10.0);

        let again = ing.report_at(request(7, 10), at(1_700_000_001)).unwrap();
        assert_eq!(again.previous_risk, 10.0);
        assert_eq!(again.new_risk, 10.0);
        assert_eq!(ing.history().len(), 2);
    }

    #[test]
    fn shared_street_updates_first_edge_only() {
        let ing = ingestor();
        let out = ing.report_at(request(7, 2), at(1_700_000_000)).unwrap();
        assert_eq!(out.edge_id, EdgeId(2));
        assert_eq!(ing.store().get_edge(EdgeId(3)).unwrap().risk_score, 0.0);
    }

    #[test]
    fn invalid_severity_changes_nothing() {
        let ing = ingestor();
        for severity in [0, 11, -3] {
            let err = ing.report_at(request(1, severity), at(1_700_000_000)).unwrap_err();
            assert!(
                matches!(err, IncidentError::Core(CoreError::InvalidSeverity(s)) if s == severity),
                "{err}"
            );
        }
        assert!(ing.history().is_empty());
        assert_eq!(ing.store().get_edge(EdgeId(1)).unwrap().risk_score, 2.5);
    }

    #[test]
    fn unknown_street_is_not_created() {
        let ing = ingestor();
        let err = ing.report_at(request(404, 5), at(1_700_000_000)).unwrap_err();
        assert!(matches!(err, IncidentError::EdgeNotFound(StreetId(404))));
        assert!(ing.history().is_empty());
        assert_eq!(ing.store().status().edge_count, 3);
    }

    #[test]
    fn invalid_position_rejected() {
        let ing = ingestor();
        let req = IncidentRequest::new(StreetId(1), IncidentType::Hazard, 3, GeoPoint::new(95.0, 0.0));
        let err = ing.report_at(req, at(1_700_000_000)).unwrap_err();
        assert!(matches!(err, IncidentError::InvalidPosition(_)));
        assert!(ing.history().is_empty());
    }

    #[test]
    fn report_ids_strictly_increase() {
        let ing = ingestor();
        let now = at(1_700_000_000);
        let a = ing.report_at(request(1, 1), now).unwrap().report_id;
        let b = ing.report_at(request(1, 1), now).unwrap().report_id;
        // Clock moved backwards.
        let c = ing.report_at(request(1, 1), at(1_600_000_000)).unwrap().report_id;

        assert_eq!(a, ReportId(1_700_000_000_000));
        assert!(b > a);
        assert!(c > b);
    }

    #[test]
    fn description_is_kept() {
        let ing = ingestor();
        let req = request(1, 4).with_description("bache en la vía");
        ing.report_at(req, at(1_700_000_000)).unwrap();
        assert_eq!(ing.history()[0].description.as_deref(), Some("bache en la vía"));
        assert_eq!(ing.history()[0].position(), HERE);
    }

    #[test]
    fn concurrent_reports_lose_no_increment() {
        let ing = ingestor();
        std::thread::scope(|s| {
            for _ in 0..4 {
                let ing = ing.clone();
                s.spawn(move || {
                    for _ in 0..3 {
                        ing.report(request(1, 1)).unwrap();
                    }
                });
            }
        });
        // 2.5 + 12 * 0.5
        assert_eq!(ing.store().get_edge(EdgeId(1)).unwrap().risk_score, 8.5);

        let mut ids: Vec<_> = ing.history().iter().map(|r| r.report_id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 12);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}

// ── Queries ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod nearby {
    use sr_core::{GeoPoint, IncidentType, StreetId};

    use super::helpers::{HERE, at, ingestor};
    use crate::IncidentRequest;

    #[test]
    fn radius_is_honoured() {
        let ing = ingestor();
        let far = HERE.offset_m(5_000.0, 0.0);
        ing.report_at(IncidentRequest::new(StreetId(1), IncidentType::Robbery, 6, HERE), at(1))
            .unwrap();
        ing.report_at(IncidentRequest::new(StreetId(1), IncidentType::Flooding, 3, far), at(2))
            .unwrap();

        let close = ing.nearby(HERE, 500.0);
        assert_eq!(close.len(), 1);
        assert_eq!(close[0].incident_type, IncidentType::Robbery);

        assert_eq!(ing.nearby(HERE, 10_000.0).len(), 2);
        assert!(ing.nearby(GeoPoint::new(0.0, 0.0), 500.0).is_empty());
    }
}

// ── Property tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;

    use sr_core::EdgeId;

    use super::helpers::{at, ingestor, request};

    proptest! {
        #[test]
        fn risk_stays_in_range(severities in prop::collection::vec(-2i32..=12, 1..40)) {
            let ing = ingestor();
            let mut accepted = 0;
            for (i, s) in severities.iter().enumerate() {
                if ing.report_at(request(1, *s), at(i as i64)).is_ok() {
                    accepted += 1;
                }
                let risk = ing.store().get_edge(EdgeId(1)).unwrap().risk_score;
                prop_assert!((0.0..=10.0).contains(&risk));
            }
            prop_assert_eq!(ing.history().len(), accepted);
        }
    }
}
