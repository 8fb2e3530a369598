//! Persistence layer
//!
//! Sled-backed storage behind the keyed-store boundary the core requires.
//! One global database holds named trees for alerts, recommendations, and
//! feedback; the in-memory managers remain authoritative and this layer
//! restores them at startup.
//!
//! Call `storage::init(path)` once before the tree modules' `init()`.

pub mod alerts;
pub mod feedback;

use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Global database instance shared by the named trees.
static DB: OnceLock<Arc<sled::Db>> = OnceLock::new();

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("storage not initialized")]
    NotInitialized,
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

/// Open (or create) the global database and the named trees.
///
/// Calling a second time is a no-op.
pub fn init<P: AsRef<Path>>(path: P) -> Result<(), StorageError> {
    if DB.get().is_none() {
        let db = sled::open(path)?;
        // A racing second open gets the same handle via the named trees,
        // so a lost set is benign.
        let _ = DB.set(Arc::new(db));
    }
    alerts::init()?;
    feedback::init()?;
    Ok(())
}

pub(crate) fn get_db() -> Result<Arc<sled::Db>, StorageError> {
    DB.get().cloned().ok_or(StorageError::NotInitialized)
}

/// Whether the global database has been opened.
pub fn is_initialized() -> bool {
    DB.get().is_some()
}
