//! Alert and recommendation persistence
//!
//! Stores entities in named sled trees ("alerts", "recommendations") within
//! the global DB, keyed by their string ids and serialized as JSON. Last
//! write wins per id — every lifecycle mutation re-persists the full entity.
//!
//! Call `init()` after `storage::init()`; `load_all_*` restores the
//! in-memory `AlertManager` at startup, silently skipping unparseable
//! entries.

use super::{get_db, StorageError};
use crate::types::{Alert, Recommendation};
use sled::Tree;
use std::sync::OnceLock;

static ALERTS_TREE: OnceLock<Tree> = OnceLock::new();
static RECOMMENDATIONS_TREE: OnceLock<Tree> = OnceLock::new();

/// Initialise the alert and recommendation trees.
///
/// Must be called after `storage::init()`. A second call is a no-op.
pub fn init() -> Result<(), StorageError> {
    let db = get_db()?;
    if ALERTS_TREE.get().is_none() {
        let tree = db
            .open_tree("alerts")
            .map_err(|e: sled::Error| StorageError::DatabaseError(e.to_string()))?;
        let _ = ALERTS_TREE.set(tree);
    }
    if RECOMMENDATIONS_TREE.get().is_none() {
        let tree = db
            .open_tree("recommendations")
            .map_err(|e: sled::Error| StorageError::DatabaseError(e.to_string()))?;
        let _ = RECOMMENDATIONS_TREE.set(tree);
    }
    Ok(())
}

fn alerts_tree() -> Result<&'static Tree, StorageError> {
    ALERTS_TREE.get().ok_or(StorageError::NotInitialized)
}

fn recommendations_tree() -> Result<&'static Tree, StorageError> {
    RECOMMENDATIONS_TREE.get().ok_or(StorageError::NotInitialized)
}

/// Persist an alert keyed by its id.
pub fn persist_alert(alert: &Alert) -> Result<(), StorageError> {
    let tree = alerts_tree()?;
    let bytes = serde_json::to_vec(alert)?;
    tree.insert(alert.alert_id.as_bytes(), bytes)?;
    Ok(())
}

/// Persist a recommendation keyed by its id.
pub fn persist_recommendation(rec: &Recommendation) -> Result<(), StorageError> {
    let tree = recommendations_tree()?;
    let bytes = serde_json::to_vec(rec)?;
    tree.insert(rec.recommendation_id.as_bytes(), bytes)?;
    Ok(())
}

/// Load all persisted alerts. Unparseable entries are skipped.
pub fn load_all_alerts() -> Vec<Alert> {
    let tree = match alerts_tree() {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };
    tree.iter()
        .filter_map(|item| item.ok().and_then(|(_, v)| serde_json::from_slice(&v).ok()))
        .collect()
}

/// Load all persisted recommendations. Unparseable entries are skipped.
pub fn load_all_recommendations() -> Vec<Recommendation> {
    let tree = match recommendations_tree() {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };
    tree.iter()
        .filter_map(|item| item.ok().and_then(|(_, v)| serde_json::from_slice(&v).ok()))
        .collect()
}
