use thiserror::Error;

/// Reasons a run request is rejected by [`schedule`](crate::EmulationOrchestrator::schedule).
///
/// All of them are raised before any topic is provisioned or worker started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Producer not found for sync type: {0}")]
    UnknownBinding(String),

    #[error("Domain not supported: {0}")]
    UnknownDomain(String),

    #[error("Timeout must be greater than zero seconds")]
    InvalidTimeout,
}
