//! Operator feedback persistence
//!
//! Append-only feedback records in a named sled tree ("feedback") within the
//! global DB, keyed by submission timestamp (big-endian u64 nanoseconds, so
//! entries sort chronologically). Category is denormalized onto each record
//! so threshold adaptation can replay the log without alert lookups.
//!
//! Call `init()` after `storage::init()`.

use super::{get_db, StorageError};
use crate::types::FeedbackRecord;
use sled::Tree;
use std::sync::OnceLock;

static FEEDBACK_TREE: OnceLock<Tree> = OnceLock::new();

/// Initialise the feedback sled tree.
///
/// Must be called after `storage::init()`. A second call is a no-op.
pub fn init() -> Result<(), StorageError> {
    if FEEDBACK_TREE.get().is_some() {
        return Ok(());
    }
    let db = get_db()?;
    let tree = db
        .open_tree("feedback")
        .map_err(|e: sled::Error| StorageError::DatabaseError(e.to_string()))?;
    let _ = FEEDBACK_TREE.set(tree);
    Ok(())
}

fn get_tree() -> Result<&'static Tree, StorageError> {
    FEEDBACK_TREE.get().ok_or(StorageError::NotInitialized)
}

/// Append a feedback record.
///
/// Two records in the same nanosecond would collide; the later write wins,
/// acceptable for an audit trail.
pub fn persist(record: &FeedbackRecord) -> Result<(), StorageError> {
    let tree = get_tree()?;
    let key = record
        .submitted_at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| record.submitted_at.timestamp() * 1_000_000_000)
        .to_be_bytes();
    let bytes = serde_json::to_vec(record)?;
    tree.insert(key, bytes)?;
    Ok(())
}

/// Load all feedback records (oldest first).
pub fn load_all() -> Vec<FeedbackRecord> {
    let tree = match get_tree() {
        Ok(t) => t,
        Err(_) => return Vec::new(),
    };
    tree.iter()
        .filter_map(|item| item.ok().and_then(|(_, v)| serde_json::from_slice(&v).ok()))
        .collect()
}
