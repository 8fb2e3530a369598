//! Alert lifecycle manager.
//!
//! Turns recurring waste insights into deduplicated alerts with a forward-only
//! state machine:
//!
//! ```text
//! (qualifying insight) ─► Open ─► Acknowledged ─► Approved ─► Resolved
//!                          ▲                                     │
//!                          └──────────── re-trigger ─────────────┘
//! ```
//!
//! One active alert per `(device_id, location)`: repeat insights inside the
//! dedup window fold into the existing alert instead of duplicating it, and
//! a Resolved alert reopens when the device re-triggers. Any other backward
//! transition is rejected with state unchanged.
//!
//! Concurrency: the alert map is a sharded concurrent map keyed by device and
//! location; an entry guard gives each lifecycle transition exclusive access
//! to its key, so two concurrent insights for one device cannot race into
//! duplicate alerts. Cross-device operations need no coordination.

use chrono::{Duration, Utc};
use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::types::{
    Alert, AlertStatus, Location, Recommendation, RecommendationStatus, Severity, WasteCategory,
    WasteInsight,
};

/// Identity of the one active alert slot per device placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub device_id: String,
    pub location: Location,
}

/// Query filters for the alert list endpoint.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
    pub floor: Option<String>,
    pub category: Option<WasteCategory>,
    pub min_severity: Option<Severity>,
    pub min_annual_cost: Option<f64>,
}

/// What an ingest did to the alert store.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// Normal insight, no alert touched.
    NoAlert,
    /// Normal insight counted toward resolving an Approved alert.
    CleanCycle { alert: Alert, resolved: bool },
    Created(Alert),
    Updated(Alert),
    Reopened(Alert),
}

impl IngestOutcome {
    pub fn alert(&self) -> Option<&Alert> {
        match self {
            IngestOutcome::NoAlert => None,
            IngestOutcome::CleanCycle { alert, .. }
            | IngestOutcome::Created(alert)
            | IngestOutcome::Updated(alert)
            | IngestOutcome::Reopened(alert) => Some(alert),
        }
    }
}

/// Deduplicating alert store with per-key exclusive transitions.
pub struct AlertManager {
    alerts: DashMap<AlertKey, Alert>,
    /// alert_id → key, for id-based operator actions.
    index: DashMap<String, AlertKey>,
    recommendations: DashMap<String, Recommendation>,
    /// Consecutive Normal evaluations per key, toward auto-resolution.
    clean_cycles: DashMap<AlertKey, u32>,
    dedup_window: Duration,
    resolve_after_clean_cycles: u32,
}

impl AlertManager {
    pub fn new(dedup_window_hours: f64, resolve_after_clean_cycles: u32) -> Self {
        Self {
            alerts: DashMap::new(),
            index: DashMap::new(),
            recommendations: DashMap::new(),
            clean_cycles: DashMap::new(),
            dedup_window: Duration::seconds((dedup_window_hours * 3600.0) as i64),
            resolve_after_clean_cycles,
        }
    }

    /// Build from the global building config.
    pub fn from_config() -> Self {
        let (window, cycles) = if crate::config::is_initialized() {
            let cfg = &crate::config::get().alerts;
            (cfg.dedup_window_hours, cfg.resolve_after_clean_cycles)
        } else {
            (24.0, 3)
        };
        Self::new(window, cycles)
    }

    /// Feed one evaluated insight into the lifecycle.
    ///
    /// Waste insights create/update/reopen the device's alert; Normal
    /// insights count clean cycles toward resolving an Approved alert.
    pub fn ingest(
        &self,
        device_id: &str,
        device_category: &str,
        location: Location,
        insight: &WasteInsight,
    ) -> IngestOutcome {
        let key = AlertKey {
            device_id: device_id.to_string(),
            location,
        };

        if !insight.category.is_waste() {
            return self.record_clean_cycle(&key);
        }

        let now = Utc::now();
        let mut created_recs: Vec<Recommendation> = Vec::new();

        // Entry guard = per-key lock: concurrent insights for the same device
        // serialize here.
        let outcome = {
            match self.alerts.entry(key.clone()) {
                dashmap::mapref::entry::Entry::Vacant(vacant) => {
                    let (alert, recs) =
                        self.build_alert(&key, device_category, insight);
                    created_recs = recs;
                    let stored = vacant.insert(alert);
                    IngestOutcome::Created(stored.value().clone())
                }
                dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                    let alert = occupied.get_mut();
                    if alert.status == AlertStatus::Resolved {
                        alert.status = AlertStatus::Open;
                        alert.assigned_to = None;
                        alert.category = insight.category;
                        alert.severity = insight.severity;
                        alert.cost = insight.cost;
                        alert.evidence = insight.explanation.reasoning.clone();
                        alert.occupancy_mismatch = insight.explanation.occupancy_mismatch;
                        alert.detection_count += 1;
                        alert.last_detected = now;
                        alert.updated_at = now;
                        info!(alert_id = %alert.alert_id, device = %key.device_id, "resolved alert re-triggered — reopening");
                        IngestOutcome::Reopened(alert.clone())
                    } else {
                        if now - alert.last_detected > self.dedup_window {
                            // New episode on a still-unresolved alert: keep the
                            // alert, restart the episode window.
                            alert.first_detected = now;
                        }
                        alert.severity = alert.severity.max(insight.severity);
                        alert.cost = insight.cost;
                        alert.evidence = insight.explanation.reasoning.clone();
                        alert.occupancy_mismatch = insight.explanation.occupancy_mismatch;
                        alert.detection_count += 1;
                        alert.last_detected = now;
                        alert.updated_at = now;
                        IngestOutcome::Updated(alert.clone())
                    }
                }
            }
        };

        // Waste recurred: any resolution streak restarts.
        self.clean_cycles.insert(key.clone(), 0);

        if let Some(alert) = outcome.alert() {
            self.index.insert(alert.alert_id.clone(), key);
            persist_alert(alert);
        }
        for rec in created_recs {
            persist_recommendation(&rec);
            self.recommendations.insert(rec.recommendation_id.clone(), rec);
        }

        outcome
    }

    fn build_alert(
        &self,
        key: &AlertKey,
        device_category: &str,
        insight: &WasteInsight,
    ) -> (Alert, Vec<Recommendation>) {
        let now = Utc::now();
        let alert_id = format!("AL-{}", Uuid::new_v4());

        let recs: Vec<Recommendation> = insight
            .actions
            .iter()
            .map(|action| Recommendation {
                recommendation_id: format!("RC-{}", Uuid::new_v4()),
                alert_id: alert_id.clone(),
                priority: action.priority,
                description: action.description.clone(),
                estimated_cost: action.estimated_cost,
                payback_days: action.payback_days,
                confidence: action.confidence,
                status: RecommendationStatus::Proposed,
                approved_by: None,
                approved_at: None,
                created_at: now,
            })
            .collect();

        let alert = Alert {
            alert_id,
            device_id: key.device_id.clone(),
            device_category: device_category.to_string(),
            location: key.location.clone(),
            category: insight.category,
            severity: insight.severity,
            cost: insight.cost,
            status: AlertStatus::Open,
            occupancy_mismatch: insight.explanation.occupancy_mismatch,
            evidence: insight.explanation.reasoning.clone(),
            detection_count: 1,
            first_detected: now,
            last_detected: now,
            created_at: now,
            updated_at: now,
            assigned_to: None,
            recommendation_ids: recs.iter().map(|r| r.recommendation_id.clone()).collect(),
        };
        info!(alert_id = %alert.alert_id, device = %key.device_id, category = %alert.category, severity = %alert.severity, "alert opened");
        (alert, recs)
    }

    fn record_clean_cycle(&self, key: &AlertKey) -> IngestOutcome {
        let Some(mut alert) = self.alerts.get_mut(key) else {
            return IngestOutcome::NoAlert;
        };
        if alert.status != AlertStatus::Approved {
            // Operator hasn't actioned the alert; quiet cycles don't close it.
            return IngestOutcome::CleanCycle {
                alert: alert.clone(),
                resolved: false,
            };
        }

        let mut streak = self.clean_cycles.entry(key.clone()).or_insert(0);
        *streak += 1;
        if *streak >= self.resolve_after_clean_cycles {
            alert.status = AlertStatus::Resolved;
            alert.updated_at = Utc::now();
            *streak = 0;
            info!(alert_id = %alert.alert_id, device = %key.device_id, "alert resolved after clean cycles");
            let resolved = alert.clone();
            drop(streak);
            drop(alert);
            persist_alert(&resolved);
            return IngestOutcome::CleanCycle {
                alert: resolved,
                resolved: true,
            };
        }
        IngestOutcome::CleanCycle {
            alert: alert.clone(),
            resolved: false,
        }
    }

    /// Operator acknowledges an Open alert.
    pub fn acknowledge(&self, alert_id: &str, actor: &str) -> Result<Alert, AnalysisError> {
        let key = self
            .index
            .get(alert_id)
            .map(|k| k.clone())
            .ok_or_else(|| AnalysisError::UnknownEntity(format!("alert {alert_id}")))?;
        let mut alert = self
            .alerts
            .get_mut(&key)
            .ok_or_else(|| AnalysisError::UnknownEntity(format!("alert {alert_id}")))?;

        if alert.status != AlertStatus::Open {
            return Err(AnalysisError::InvalidTransition {
                entity: "alert",
                action: "acknowledge",
                state: alert.status.to_string(),
            });
        }
        alert.status = AlertStatus::Acknowledged;
        alert.assigned_to = Some(actor.to_string());
        alert.updated_at = Utc::now();
        let updated = alert.clone();
        drop(alert);
        persist_alert(&updated);
        Ok(updated)
    }

    /// Approve a proposed recommendation; moves its Acknowledged alert to
    /// Approved.
    ///
    /// The state graph has no Open→Approved edge: approving against an
    /// unacknowledged or resolved alert is rejected and nothing changes.
    pub fn approve_recommendation(
        &self,
        recommendation_id: &str,
        actor: &str,
    ) -> Result<Recommendation, AnalysisError> {
        let alert_id = {
            let rec = self.recommendations.get(recommendation_id).ok_or_else(|| {
                AnalysisError::UnknownEntity(format!("recommendation {recommendation_id}"))
            })?;
            if rec.status != RecommendationStatus::Proposed {
                return Err(AnalysisError::InvalidTransition {
                    entity: "recommendation",
                    action: "approve",
                    state: rec.status.to_string(),
                });
            }
            rec.alert_id.clone()
        };

        // Validate and advance the owning alert first; only then flip the
        // recommendation, so a rejected transition leaves both unchanged.
        let key = self
            .index
            .get(&alert_id)
            .map(|k| k.clone())
            .ok_or_else(|| AnalysisError::UnknownEntity(format!("alert {alert_id}")))?;
        {
            let mut alert = self
                .alerts
                .get_mut(&key)
                .ok_or_else(|| AnalysisError::UnknownEntity(format!("alert {alert_id}")))?;
            match alert.status {
                AlertStatus::Acknowledged => {
                    alert.status = AlertStatus::Approved;
                    alert.updated_at = Utc::now();
                    persist_alert(&alert.clone());
                }
                AlertStatus::Approved => {} // further approvals keep the state
                AlertStatus::Open | AlertStatus::Resolved => {
                    return Err(AnalysisError::InvalidTransition {
                        entity: "alert",
                        action: "approve recommendation",
                        state: alert.status.to_string(),
                    });
                }
            }
        }

        let mut rec = self.recommendations.get_mut(recommendation_id).ok_or_else(|| {
            AnalysisError::UnknownEntity(format!("recommendation {recommendation_id}"))
        })?;
        rec.status = RecommendationStatus::Approved;
        rec.approved_by = Some(actor.to_string());
        rec.approved_at = Some(Utc::now());
        let updated = rec.clone();
        drop(rec);
        persist_recommendation(&updated);
        info!(recommendation_id = %recommendation_id, alert_id = %alert_id, by = %actor, "recommendation approved");
        Ok(updated)
    }

    /// Filtered snapshot of current alerts.
    pub fn query(&self, filter: &AlertFilter) -> Vec<Alert> {
        let mut alerts: Vec<Alert> = self
            .alerts
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|alert| {
                filter.status.map_or(true, |s| alert.status == s)
                    && filter
                        .floor
                        .as_ref()
                        .map_or(true, |f| alert.location.floor.as_deref() == Some(f.as_str()))
                    && filter.category.map_or(true, |c| alert.category == c)
                    && filter.min_severity.map_or(true, |s| alert.severity >= s)
                    && filter
                        .min_annual_cost
                        .map_or(true, |c| alert.cost.annual >= c)
            })
            .collect();
        alerts.sort_by(|a, b| {
            b.cost
                .annual
                .partial_cmp(&a.cost.annual)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        alerts
    }

    pub fn get(&self, alert_id: &str) -> Option<Alert> {
        let key = self.index.get(alert_id)?.clone();
        self.alerts.get(&key).map(|a| a.clone())
    }

    /// All recommendations across all alerts.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.recommendations
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn recommendations_for(&self, alert_id: &str) -> Vec<Recommendation> {
        self.recommendations
            .iter()
            .filter(|entry| entry.value().alert_id == alert_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Re-seat a persisted alert at startup. Last write wins per key.
    pub fn restore(&self, alert: Alert) {
        let key = AlertKey {
            device_id: alert.device_id.clone(),
            location: alert.location.clone(),
        };
        self.index.insert(alert.alert_id.clone(), key.clone());
        self.alerts.insert(key, alert);
    }

    /// Re-seat a persisted recommendation at startup.
    pub fn restore_recommendation(&self, rec: Recommendation) {
        self.recommendations.insert(rec.recommendation_id.clone(), rec);
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// Best-effort persistence: the in-memory store is authoritative, so a
/// storage failure is logged, not propagated.
fn persist_alert(alert: &Alert) {
    if let Err(e) = crate::storage::alerts::persist_alert(alert) {
        warn!(alert_id = %alert.alert_id, error = %e, "failed to persist alert");
    }
}

fn persist_recommendation(rec: &Recommendation) {
    if let Err(e) = crate::storage::alerts::persist_recommendation(rec) {
        warn!(recommendation_id = %rec.recommendation_id, error = %e, "failed to persist recommendation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        CostImpact, Explanation, SignalStrength, TimePattern, WasteInsight,
    };

    fn insight(category: WasteCategory, severity: Severity, daily: f64) -> WasteInsight {
        WasteInsight {
            category,
            severity,
            power_disparity_w: 2800.0,
            estimated_waste_power_w: 2800.0,
            duration_hours: 8.0,
            total_wasted_kwh: 22.4,
            cost: CostImpact::from_daily(daily),
            cost_per_kwh: 8.0,
            explanation: Explanation {
                occupancy_mismatch: category.is_waste(),
                time_pattern: TimePattern::NightHours,
                signal_strength: SignalStrength::Strong,
                reasoning: vec!["test evidence".to_string()],
            },
            actions: vec![crate::types::RecommendedAction {
                priority: crate::types::ActionPriority::High,
                description: "Install smart power strip".to_string(),
                estimated_cost: 3000.0,
                payback_days: 5.6,
                confidence: 0.95,
            }],
            confidence: 0.9,
            detected_at: Utc::now(),
        }
    }

    fn loc() -> Location {
        Location {
            floor: Some("4".to_string()),
            zone: Some("SERVER_ROOM".to_string()),
        }
    }

    fn waste() -> WasteInsight {
        insight(WasteCategory::PhantomLoad, Severity::Critical, 537.6)
    }

    fn normal() -> WasteInsight {
        insight(WasteCategory::Normal, Severity::Low, 0.0)
    }

    #[test]
    fn test_first_insight_opens_alert() {
        let mgr = AlertManager::new(24.0, 3);
        let outcome = mgr.ingest("SERVER_1", "server", loc(), &waste());
        let alert = outcome.alert().unwrap();
        assert_eq!(alert.status, AlertStatus::Open);
        assert_eq!(alert.detection_count, 1);
        assert!(!alert.recommendation_ids.is_empty());
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_dedup_same_device_updates_not_duplicates() {
        let mgr = AlertManager::new(24.0, 3);
        let first = mgr.ingest("SERVER_1", "server", loc(), &waste());
        let second = mgr.ingest("SERVER_1", "server", loc(), &waste());
        assert!(matches!(second, IngestOutcome::Updated(_)));
        assert_eq!(mgr.len(), 1);
        let alert = second.alert().unwrap();
        assert_eq!(alert.detection_count, 2);
        assert_eq!(
            alert.alert_id,
            first.alert().unwrap().alert_id
        );
    }

    #[test]
    fn test_severity_never_downgrades_on_update() {
        let mgr = AlertManager::new(24.0, 3);
        mgr.ingest("SERVER_1", "server", loc(), &waste());
        let outcome = mgr.ingest(
            "SERVER_1",
            "server",
            loc(),
            &insight(WasteCategory::PhantomLoad, Severity::High, 100.0),
        );
        assert_eq!(outcome.alert().unwrap().severity, Severity::Critical);
    }

    #[test]
    fn test_distinct_devices_get_distinct_alerts() {
        let mgr = AlertManager::new(24.0, 3);
        mgr.ingest("SERVER_1", "server", loc(), &waste());
        mgr.ingest("HVAC_2", "hvac", loc(), &waste());
        assert_eq!(mgr.len(), 2);
    }

    #[test]
    fn test_full_lifecycle() {
        let mgr = AlertManager::new(24.0, 2);
        let outcome = mgr.ingest("SERVER_1", "server", loc(), &waste());
        let alert_id = outcome.alert().unwrap().alert_id.clone();
        let rec_id = outcome.alert().unwrap().recommendation_ids[0].clone();

        let acked = mgr.acknowledge(&alert_id, "facilities").unwrap();
        assert_eq!(acked.status, AlertStatus::Acknowledged);
        assert_eq!(acked.assigned_to.as_deref(), Some("facilities"));

        let approved = mgr.approve_recommendation(&rec_id, "manager").unwrap();
        assert_eq!(approved.status, RecommendationStatus::Approved);
        assert_eq!(mgr.get(&alert_id).unwrap().status, AlertStatus::Approved);

        // Two clean cycles resolve the approved alert.
        mgr.ingest("SERVER_1", "server", loc(), &normal());
        mgr.ingest("SERVER_1", "server", loc(), &normal());
        assert_eq!(mgr.get(&alert_id).unwrap().status, AlertStatus::Resolved);
    }

    #[test]
    fn test_waste_resets_clean_streak() {
        let mgr = AlertManager::new(24.0, 2);
        let outcome = mgr.ingest("SERVER_1", "server", loc(), &waste());
        let alert_id = outcome.alert().unwrap().alert_id.clone();
        let rec_id = outcome.alert().unwrap().recommendation_ids[0].clone();
        mgr.acknowledge(&alert_id, "ops").unwrap();
        mgr.approve_recommendation(&rec_id, "mgr").unwrap();

        mgr.ingest("SERVER_1", "server", loc(), &normal());
        mgr.ingest("SERVER_1", "server", loc(), &waste()); // streak restarts
        mgr.ingest("SERVER_1", "server", loc(), &normal());
        assert_eq!(mgr.get(&alert_id).unwrap().status, AlertStatus::Approved);
        mgr.ingest("SERVER_1", "server", loc(), &normal());
        assert_eq!(mgr.get(&alert_id).unwrap().status, AlertStatus::Resolved);
    }

    #[test]
    fn test_resolved_alert_reopens_on_retrigger() {
        let mgr = AlertManager::new(24.0, 1);
        let outcome = mgr.ingest("SERVER_1", "server", loc(), &waste());
        let alert_id = outcome.alert().unwrap().alert_id.clone();
        let rec_id = outcome.alert().unwrap().recommendation_ids[0].clone();
        mgr.acknowledge(&alert_id, "ops").unwrap();
        mgr.approve_recommendation(&rec_id, "mgr").unwrap();
        mgr.ingest("SERVER_1", "server", loc(), &normal());
        assert_eq!(mgr.get(&alert_id).unwrap().status, AlertStatus::Resolved);

        let outcome = mgr.ingest("SERVER_1", "server", loc(), &waste());
        assert!(matches!(outcome, IngestOutcome::Reopened(_)));
        assert_eq!(mgr.get(&alert_id).unwrap().status, AlertStatus::Open);
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_invalid_transitions_rejected() {
        let mgr = AlertManager::new(24.0, 3);
        let outcome = mgr.ingest("SERVER_1", "server", loc(), &waste());
        let alert_id = outcome.alert().unwrap().alert_id.clone();
        let rec_id = outcome.alert().unwrap().recommendation_ids[0].clone();

        // Approving against an Open (unacknowledged) alert is not in the graph.
        let err = mgr.approve_recommendation(&rec_id, "mgr").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidTransition { .. }));
        // State unchanged on rejection.
        assert_eq!(mgr.get(&alert_id).unwrap().status, AlertStatus::Open);

        mgr.acknowledge(&alert_id, "ops").unwrap();
        // Double-acknowledge is not in the graph either.
        let err = mgr.acknowledge(&alert_id, "ops").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidTransition { .. }));
    }

    #[test]
    fn test_unknown_ids() {
        let mgr = AlertManager::new(24.0, 3);
        assert!(matches!(
            mgr.acknowledge("AL-missing", "ops").unwrap_err(),
            AnalysisError::UnknownEntity(_)
        ));
        assert!(matches!(
            mgr.approve_recommendation("RC-missing", "mgr").unwrap_err(),
            AnalysisError::UnknownEntity(_)
        ));
    }

    #[test]
    fn test_query_filters() {
        let mgr = AlertManager::new(24.0, 3);
        mgr.ingest("SERVER_1", "server", loc(), &waste());
        mgr.ingest(
            "HVAC_2",
            "hvac",
            Location {
                floor: Some("2".to_string()),
                zone: None,
            },
            &insight(WasteCategory::InefficientUsage, Severity::Low, 50.0),
        );

        let all = mgr.query(&AlertFilter::default());
        assert_eq!(all.len(), 2);
        // Cost-descending ordering
        assert!(all[0].cost.annual >= all[1].cost.annual);

        let floor4 = mgr.query(&AlertFilter {
            floor: Some("4".to_string()),
            ..Default::default()
        });
        assert_eq!(floor4.len(), 1);
        assert_eq!(floor4[0].device_id, "SERVER_1");

        let high = mgr.query(&AlertFilter {
            min_severity: Some(Severity::High),
            ..Default::default()
        });
        assert_eq!(high.len(), 1);

        let expensive = mgr.query(&AlertFilter {
            min_annual_cost: Some(100_000.0),
            ..Default::default()
        });
        assert_eq!(expensive.len(), 1);
    }

    #[test]
    fn test_concurrent_ingest_single_alert() {
        use std::sync::Arc;
        let mgr = Arc::new(AlertManager::new(24.0, 3));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let mgr = Arc::clone(&mgr);
            handles.push(std::thread::spawn(move || {
                for _ in 0..20 {
                    mgr.ingest("SERVER_1", "server", loc(), &waste());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        // Alert idempotence under concurrency: one device, one alert.
        assert_eq!(mgr.len(), 1);
        let alert = mgr.query(&AlertFilter::default()).remove(0);
        assert_eq!(alert.detection_count, 160);
    }
}
