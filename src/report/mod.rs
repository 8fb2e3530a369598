//! Building report builder — pure read-side projection over the current
//! alert and recommendation stores. No mutation; safe at any frequency.

use chrono::Utc;
use std::collections::HashMap;

use crate::types::{
    Alert, AlertStatus, AlertSummary, BuildingReport, RecommendationStatus, RecommendationSummary,
    Recommendation, ReportCost,
};

/// Build a snapshot report over the supplied alerts and recommendations.
///
/// Callers apply floor/category filters before passing alerts in; this
/// function only aggregates.
pub fn build_report(
    building_id: &str,
    alerts: &[Alert],
    recommendations: &[Recommendation],
    top_n: usize,
) -> BuildingReport {
    let mut by_severity: HashMap<String, usize> = HashMap::new();
    for alert in alerts {
        *by_severity.entry(alert.severity.to_string()).or_insert(0) += 1;
    }

    let summary = AlertSummary {
        total_alerts: alerts.len(),
        open_alerts: alerts
            .iter()
            .filter(|a| a.status == AlertStatus::Open)
            .count(),
        by_severity,
    };

    // Completed recommendations per alert decide what still counts as
    // recoverable savings.
    let mut completed_by_alert: HashMap<&str, bool> = HashMap::new();
    for rec in recommendations {
        let done = completed_by_alert.entry(rec.alert_id.as_str()).or_insert(false);
        *done |= rec.status == RecommendationStatus::Completed;
    }

    let mut cost = ReportCost::default();
    for alert in alerts {
        cost.daily += alert.cost.daily;
        cost.monthly += alert.cost.monthly;
        cost.annual += alert.cost.annual;
        let fixed = completed_by_alert
            .get(alert.alert_id.as_str())
            .copied()
            .unwrap_or(false);
        if !fixed {
            cost.potential_savings_annual += alert.cost.annual;
        }
    }

    let mut top_leaks: Vec<Alert> = alerts.to_vec();
    top_leaks.sort_by(|a, b| {
        b.cost
            .annual
            .partial_cmp(&a.cost.annual)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.severity.cmp(&a.severity))
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
    top_leaks.truncate(top_n);

    let mut by_category: HashMap<String, f64> = HashMap::new();
    let mut by_floor: HashMap<String, f64> = HashMap::new();
    let mut by_type: HashMap<String, f64> = HashMap::new();
    for alert in alerts {
        *by_category.entry(alert.category.to_string()).or_insert(0.0) += alert.cost.annual;
        let floor = alert
            .location
            .floor
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        *by_floor.entry(floor).or_insert(0.0) += alert.cost.annual;
        *by_type.entry(alert.device_category.clone()).or_insert(0.0) += alert.cost.annual;
    }

    let pending: Vec<&Recommendation> = recommendations
        .iter()
        .filter(|r| {
            matches!(
                r.status,
                RecommendationStatus::Proposed | RecommendationStatus::Approved
            )
        })
        .collect();
    let avg_payback_months = if pending.is_empty() {
        0.0
    } else {
        pending.iter().map(|r| r.payback_months()).sum::<f64>() / pending.len() as f64
    };

    BuildingReport {
        building_id: building_id.to_string(),
        report_date: Utc::now(),
        summary,
        cost,
        top_leaks,
        by_category,
        by_floor,
        by_type,
        recommendations: RecommendationSummary {
            total: recommendations.len(),
            approved: recommendations
                .iter()
                .filter(|r| r.status == RecommendationStatus::Approved)
                .count(),
            avg_payback_months,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActionPriority, CostImpact, Location, Severity, WasteCategory};

    fn alert(id: &str, device: &str, floor: &str, annual: f64, severity: Severity) -> Alert {
        Alert {
            alert_id: id.to_string(),
            device_id: device.to_string(),
            device_category: "server".to_string(),
            location: Location {
                floor: Some(floor.to_string()),
                zone: None,
            },
            category: WasteCategory::PhantomLoad,
            severity,
            cost: CostImpact::from_daily(annual / 365.0),
            status: AlertStatus::Open,
            occupancy_mismatch: true,
            evidence: Vec::new(),
            detection_count: 1,
            first_detected: Utc::now(),
            last_detected: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assigned_to: None,
            recommendation_ids: Vec::new(),
        }
    }

    fn rec(id: &str, alert_id: &str, status: RecommendationStatus, payback_days: f64) -> Recommendation {
        Recommendation {
            recommendation_id: id.to_string(),
            alert_id: alert_id.to_string(),
            priority: ActionPriority::High,
            description: "fix".to_string(),
            estimated_cost: 1000.0,
            payback_days,
            confidence: 0.9,
            status,
            approved_by: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_top_leaks_cost_sorted_and_truncated() {
        let alerts = vec![
            alert("A1", "D1", "1", 10_000.0, Severity::Medium),
            alert("A2", "D2", "2", 90_000.0, Severity::High),
            alert("A3", "D3", "3", 50_000.0, Severity::Low),
        ];
        let report = build_report("BLDG01", &alerts, &[], 2);
        assert_eq!(report.top_leaks.len(), 2);
        assert_eq!(report.top_leaks[0].alert_id, "A2");
        assert_eq!(report.top_leaks[1].alert_id, "A3");
    }

    #[test]
    fn test_cost_ties_broken_by_severity() {
        let alerts = vec![
            alert("A1", "D1", "1", 50_000.0, Severity::Low),
            alert("A2", "D2", "2", 50_000.0, Severity::Critical),
        ];
        let report = build_report("BLDG01", &alerts, &[], 2);
        assert_eq!(report.top_leaks[0].alert_id, "A2");
    }

    #[test]
    fn test_breakdowns_sum_annual_cost() {
        let alerts = vec![
            alert("A1", "D1", "1", 10_000.0, Severity::Medium),
            alert("A2", "D2", "1", 20_000.0, Severity::Medium),
            alert("A3", "D3", "2", 5_000.0, Severity::Low),
        ];
        let report = build_report("BLDG01", &alerts, &[], 3);
        assert!((report.by_floor["1"] - 30_000.0).abs() < 0.01);
        assert!((report.by_floor["2"] - 5_000.0).abs() < 0.01);
        assert!((report.by_category["phantom_load"] - 35_000.0).abs() < 0.01);
        assert!((report.cost.annual - 35_000.0).abs() < 0.01);
    }

    #[test]
    fn test_potential_savings_excludes_completed() {
        let alerts = vec![
            alert("A1", "D1", "1", 10_000.0, Severity::Medium),
            alert("A2", "D2", "2", 20_000.0, Severity::High),
        ];
        let recs = vec![
            rec("R1", "A1", RecommendationStatus::Completed, 30.0),
            rec("R2", "A2", RecommendationStatus::Proposed, 60.0),
        ];
        let report = build_report("BLDG01", &alerts, &recs, 3);
        // A1 is fixed; only A2's annual cost remains recoverable.
        assert!((report.cost.potential_savings_annual - 20_000.0).abs() < 0.01);
    }

    #[test]
    fn test_avg_payback_over_pending_only() {
        let recs = vec![
            rec("R1", "A1", RecommendationStatus::Proposed, 30.0),
            rec("R2", "A1", RecommendationStatus::Approved, 90.0),
            rec("R3", "A1", RecommendationStatus::Completed, 600.0),
        ];
        let report = build_report("BLDG01", &[], &recs, 3);
        // (1 + 3 months) / 2
        assert!((report.recommendations.avg_payback_months - 2.0).abs() < 1e-9);
        assert_eq!(report.recommendations.total, 3);
        assert_eq!(report.recommendations.approved, 1);
    }

    #[test]
    fn test_empty_store_produces_zeroed_report() {
        let report = build_report("BLDG01", &[], &[], 3);
        assert_eq!(report.summary.total_alerts, 0);
        assert_eq!(report.cost.annual, 0.0);
        assert_eq!(report.recommendations.avg_payback_months, 0.0);
        assert!(report.top_leaks.is_empty());
    }
}
