//! Run deadline and the stop signal it drives.

use crate::id::EmulationId;
use crate::orchestrator::RunPhase;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Read-only view of a run's stop flag.
///
/// Cloned into every worker at spawn time. Workers can observe the flag but
/// have no way to set it.
#[derive(Debug, Clone)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the flag is set.
    pub async fn wait(&self) {
        self.token.cancelled().await
    }
}

/// Wall-clock timer that sets the stop flag once when it expires.
///
/// The timer is the only writer of the flag while the run is live. A deadline
/// dropped before it fires (the run future was abandoned, or its runtime shut
/// down) sets the flag so the worker threads exit. [`disarm`](Self::disarm) is
/// the orderly path: it stops the timer and leaves the flag as it is.
#[derive(Debug)]
pub struct Deadline {
    emulation_id: EmulationId,
    token: CancellationToken,
    timer: JoinHandle<()>,
    disarmed: bool,
}

impl Deadline {
    /// Start the timer. Must be called inside a tokio runtime.
    pub fn start(emulation_id: EmulationId, timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let timer_token = token.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            timer_token.cancel();
            info!(
                emulation_id = %emulation_id,
                phase = %RunPhase::Draining,
                "Deadline reached after {:?}, stopping workers", timeout
            );
        });

        Self {
            emulation_id,
            token,
            timer,
            disarmed: false,
        }
    }

    pub fn signal(&self) -> StopSignal {
        StopSignal {
            token: self.token.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Abort the timer without touching the flag.
    pub fn disarm(mut self) {
        self.timer.abort();
        self.disarmed = true;
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.timer.abort();
        if !self.disarmed && !self.token.is_cancelled() {
            warn!(
                emulation_id = %self.emulation_id,
                phase = %RunPhase::Draining,
                "Run abandoned before its deadline, stopping workers"
            );
            self.token.cancel();
        }
    }
}
