//! Alert Lifecycle Integration Tests
//!
//! Drives insights through the real reasoning pipeline into the alert
//! manager and exercises dedup idempotence, the full state machine, the
//! reopen path, and report aggregation over the resulting store.

use std::sync::Arc;

use enerlens::alerts::AlertFilter;
use enerlens::reasoning::{context, signal, ContextFields};
use enerlens::types::{AlertStatus, Location, OccupancyStatus, ThresholdConfig, WasteCategory};
use enerlens::{AlertManager, EvaluationInput, ThresholdStore, WasteAnalyzer};

fn analyzer() -> WasteAnalyzer {
    WasteAnalyzer::new(Arc::new(ThresholdStore::new(ThresholdConfig::default())))
}

fn insight(magnitude: f64, status: OccupancyStatus, hour: i64, duration: f64) -> enerlens::WasteInsight {
    let signal = signal::normalize(magnitude, 0.93, Some(500.0), None).expect("signal");
    let context = context::build(
        &ContextFields {
            hour,
            day_of_week: 3,
            is_weekend: false,
            month: 2,
            season: None,
            occupancy_status: Some(status),
            occupancy_confidence: Some(0.95),
        },
        0.8,
    )
    .expect("context");
    analyzer().analyze(&EvaluationInput {
        signal,
        context,
        device_category: "server".to_string(),
        duration_hours: duration,
        cost_per_kwh: Some(8.0),
    })
}

fn phantom() -> enerlens::WasteInsight {
    let i = insight(2800.0, OccupancyStatus::Unoccupied, 2, 8.0);
    assert_eq!(i.category, WasteCategory::PhantomLoad);
    i
}

fn normal() -> enerlens::WasteInsight {
    let i = insight(40.0, OccupancyStatus::Occupied, 14, 1.0);
    assert_eq!(i.category, WasteCategory::Normal);
    i
}

fn server_room() -> Location {
    Location {
        floor: Some("4".to_string()),
        zone: Some("Server Room".to_string()),
    }
}

/// Alert idempotence: the same qualifying insight twice within the window
/// yields exactly one Open alert.
#[test]
fn test_repeat_insight_is_idempotent() {
    let mgr = AlertManager::new(24.0, 3);
    mgr.ingest("SERVER_1", "server", server_room(), &phantom());
    mgr.ingest("SERVER_1", "server", server_room(), &phantom());

    let open = mgr.query(&AlertFilter {
        status: Some(AlertStatus::Open),
        ..Default::default()
    });
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].detection_count, 2);
}

/// Normal insights never open alerts.
#[test]
fn test_normal_insight_opens_nothing() {
    let mgr = AlertManager::new(24.0, 3);
    let outcome = mgr.ingest("LIGHT_1", "lighting", server_room(), &normal());
    assert!(outcome.alert().is_none());
    assert!(mgr.is_empty());
}

/// Open → Acknowledged → Approved → Resolved, then reopen on re-trigger.
#[test]
fn test_state_machine_end_to_end() {
    let mgr = AlertManager::new(24.0, 2);
    let outcome = mgr.ingest("SERVER_1", "server", server_room(), &phantom());
    let alert = outcome.alert().expect("alert created").clone();
    assert_eq!(alert.status, AlertStatus::Open);

    let acked = mgr.acknowledge(&alert.alert_id, "facilities").expect("ack");
    assert_eq!(acked.status, AlertStatus::Acknowledged);

    let rec_id = alert.recommendation_ids.first().expect("recs generated");
    mgr.approve_recommendation(rec_id, "manager").expect("approve");
    assert_eq!(
        mgr.get(&alert.alert_id).expect("alert").status,
        AlertStatus::Approved
    );

    // Two consecutive clean evaluations resolve the approved alert.
    mgr.ingest("SERVER_1", "server", server_room(), &normal());
    mgr.ingest("SERVER_1", "server", server_room(), &normal());
    assert_eq!(
        mgr.get(&alert.alert_id).expect("alert").status,
        AlertStatus::Resolved
    );

    // Re-triggering reopens the same alert rather than duplicating it.
    mgr.ingest("SERVER_1", "server", server_room(), &phantom());
    assert_eq!(
        mgr.get(&alert.alert_id).expect("alert").status,
        AlertStatus::Open
    );
    assert_eq!(mgr.len(), 1);
}

/// Transitions outside the graph are rejected with state intact.
#[test]
fn test_backward_transitions_rejected() {
    let mgr = AlertManager::new(24.0, 3);
    let outcome = mgr.ingest("SERVER_1", "server", server_room(), &phantom());
    let alert = outcome.alert().expect("alert").clone();
    let rec_id = alert.recommendation_ids.first().expect("recs").clone();

    // Approve before acknowledge: not in the graph.
    assert!(mgr.approve_recommendation(&rec_id, "manager").is_err());
    assert_eq!(
        mgr.get(&alert.alert_id).expect("alert").status,
        AlertStatus::Open
    );

    mgr.acknowledge(&alert.alert_id, "facilities").expect("ack");
    // Acknowledging twice: not in the graph.
    assert!(mgr.acknowledge(&alert.alert_id, "facilities").is_err());
    assert_eq!(
        mgr.get(&alert.alert_id).expect("alert").status,
        AlertStatus::Acknowledged
    );
}

/// Per-device keys are independent: batch fan-out across devices cannot
/// cross-contaminate alerts.
#[test]
fn test_concurrent_distinct_devices() {
    let mgr = Arc::new(AlertManager::new(24.0, 3));
    let mut handles = Vec::new();
    for worker in 0..6 {
        let mgr = Arc::clone(&mgr);
        handles.push(std::thread::spawn(move || {
            let device = format!("DEV_{worker}");
            for _ in 0..10 {
                mgr.ingest(&device, "server", server_room(), &phantom());
            }
        }));
    }
    for handle in handles {
        handle.join().expect("worker");
    }
    assert_eq!(mgr.len(), 6);
    for alert in mgr.query(&AlertFilter::default()) {
        assert_eq!(alert.detection_count, 10);
    }
}

/// Report aggregation over a mixed store.
#[test]
fn test_report_over_alert_store() {
    let mgr = AlertManager::new(24.0, 3);
    mgr.ingest("SERVER_1", "server", server_room(), &phantom());
    mgr.ingest(
        "HVAC_2",
        "hvac",
        Location {
            floor: Some("2".to_string()),
            zone: Some("Zone A".to_string()),
        },
        &insight(450.0, OccupancyStatus::Occupied, 14, 6.0),
    );

    let alerts = mgr.query(&AlertFilter::default());
    let recs = mgr.recommendations();
    let report = enerlens::report::build_report("BLDG01", &alerts, &recs, 3);

    assert_eq!(report.summary.total_alerts, 2);
    assert_eq!(report.summary.open_alerts, 2);
    assert!(report.by_floor.contains_key("4"));
    assert!(report.by_floor.contains_key("2"));
    assert!(report.by_category.contains_key("phantom_load"));
    assert!(report.by_category.contains_key("inefficient_usage"));
    // Nothing completed yet: everything is still recoverable.
    assert!(
        (report.cost.potential_savings_annual - report.cost.annual).abs() < 1e-9
    );
    // Top leak is the phantom server (much higher annual cost).
    assert_eq!(report.top_leaks[0].device_id, "SERVER_1");
}
