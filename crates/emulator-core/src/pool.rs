//! Worker pool for one run.

use crate::id::EmulationId;
use crate::orchestrator::RunPhase;
use crate::signal::StopSignal;
use crate::worker::{PublisherWorker, WorkerStats};
use emulator_broker::BrokerClient;
use emulator_generator::RecordGenerator;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info};

/// Default upper bound on the final flush.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of [`ProducerPool::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub published: u64,
    pub failed: u64,
    /// Workers that terminated by panicking
    pub panicked_workers: usize,
    /// Workers whose thread could not be spawned
    pub unstarted_workers: usize,
    pub flushed: bool,
}

/// Runs `worker_count` publishers in parallel, joins them and flushes.
#[derive(Debug, Clone)]
pub struct ProducerPool {
    worker_count: usize,
    flush_timeout: Duration,
}

impl ProducerPool {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Start every worker on its own OS thread and wait for all of them.
    ///
    /// The threads belong to this run alone; the runtime's blocking pool only
    /// hosts the final flush.
    /// A panicking worker is logged and removed; the others keep running. The
    /// broker is flushed exactly once, after the last worker has exited.
    pub async fn run(
        &self,
        emulation_id: EmulationId,
        topic: &str,
        generator: Arc<dyn RecordGenerator>,
        broker: Arc<dyn BrokerClient>,
        stop: StopSignal,
    ) -> PoolReport {
        let topic: Arc<str> = Arc::from(topic);
        let stats = Arc::new(WorkerStats::default());

        let mut exits = Vec::with_capacity(self.worker_count);
        let mut unstarted_workers = 0;
        for index in 0..self.worker_count {
            let worker = PublisherWorker {
                index,
                emulation_id,
                topic: Arc::clone(&topic),
                generator: Arc::clone(&generator),
                broker: Arc::clone(&broker),
                stop: stop.clone(),
                stats: Arc::clone(&stats),
            };
            // The sender is dropped without a value if the worker unwinds.
            let (done, exited) = oneshot::channel::<()>();
            let spawned = thread::Builder::new()
                .name(format!("emulator-worker-{index}"))
                .spawn(move || {
                    worker.run();
                    let _ = done.send(());
                });
            match spawned {
                Ok(_) => exits.push((index, exited)),
                Err(e) => {
                    unstarted_workers += 1;
                    error!(worker = index, emulation_id = %emulation_id, "Failed to spawn worker thread: {}", e);
                }
            }
        }

        let mut panicked_workers = 0;
        for (index, exited) in exits {
            if exited.await.is_err() {
                panicked_workers += 1;
                error!(worker = index, emulation_id = %emulation_id, "Worker terminated abnormally");
            }
        }

        let flush_timeout = self.flush_timeout;
        let flushed = match tokio::task::spawn_blocking(move || broker.flush(flush_timeout)).await {
            Ok(Ok(())) => {
                info!(emulation_id = %emulation_id, phase = %RunPhase::Flushed, "Flushed outbound messages");
                true
            }
            Ok(Err(e)) => {
                error!(emulation_id = %emulation_id, "Failed to flush producer: {}", e);
                false
            }
            Err(e) => {
                error!(emulation_id = %emulation_id, "Flush task failed: {}", e);
                false
            }
        };

        PoolReport {
            published: stats.published(),
            failed: stats.failed(),
            panicked_workers,
            unstarted_workers,
            flushed,
        }
    }
}
