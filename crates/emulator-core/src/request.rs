use crate::id::EmulationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A request to start one emulation run.
///
/// Field values are checked by the orchestrator, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Name of the broker binding to publish through (e.g. "kafka")
    pub sync_binding: String,
    /// Record domain (e.g. "transaction")
    pub domain: String,
    pub timeout_seconds: u64,
}

impl RunRequest {
    pub fn new(sync_binding: impl Into<String>, domain: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            sync_binding: sync_binding.into(),
            domain: domain.into(),
            timeout_seconds,
        }
    }
}

/// Acknowledgment returned by `schedule`.
///
/// A snapshot taken at scheduling time, not a handle: the run's progress and
/// outcome are only visible in the logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRun {
    pub id: EmulationId,
    pub sync_binding: String,
    pub domain: String,
    pub timeout_seconds: u64,
    pub scheduled_at: DateTime<Utc>,
}
