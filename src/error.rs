//! Error taxonomy for the waste-analysis core.
//!
//! Validation failures are rejected before any computation; lifecycle misuse
//! leaves state unchanged; upstream outages are surfaced rather than
//! classified around. Unknown devices are NOT an error on the analysis path —
//! classification proceeds with degraded confidence — the variant exists for
//! entity lookups (alert/recommendation ids).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid signal: {0}")]
    InvalidSignal(String),

    #[error("{field} out of range: {value} (expected {expected})")]
    InvalidRange {
        field: &'static str,
        value: i64,
        expected: &'static str,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("invalid transition: cannot {action} while {entity} is {state}")]
    InvalidTransition {
        entity: &'static str,
        action: &'static str,
        state: String,
    },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl AnalysisError {
    /// Whether this error is a malformed-input rejection (maps to HTTP 400).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignal(_) | Self::InvalidRange { .. } | Self::Validation(_)
        )
    }
}
