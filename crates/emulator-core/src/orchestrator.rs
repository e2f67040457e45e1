//! Emulation orchestration: validation, provisioning and background dispatch.

use crate::error::ScheduleError;
use crate::id::EmulationId;
use crate::pool::{ProducerPool, DEFAULT_FLUSH_TIMEOUT};
use crate::registry::{BindingRegistry, TopicRegistry};
use crate::request::{RunRequest, ScheduledRun};
use crate::signal::Deadline;
use chrono::Utc;
use emulator_broker::{
    BrokerClient, TopicAdmin, TopicProvisioner, DEFAULT_PARTITIONS, DEFAULT_REPLICATION_FACTOR,
};
use emulator_generator::{GeneratorRegistry, RecordGenerator};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default number of parallel publishers per run.
pub const DEFAULT_WORKER_COUNT: usize = 5;

/// Lifecycle of a run. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Scheduled,
    Provisioning,
    Running,
    /// Stop signal set, workers finishing their current iteration
    Draining,
    Flushed,
    Finished,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::Scheduled => "scheduled",
            RunPhase::Provisioning => "provisioning",
            RunPhase::Running => "running",
            RunPhase::Draining => "draining",
            RunPhase::Flushed => "flushed",
            RunPhase::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Per-run tuning applied by the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub worker_count: usize,
    pub partitions: i32,
    pub replication_factor: i32,
    pub flush_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            partitions: DEFAULT_PARTITIONS,
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub emulation_id: EmulationId,
    pub topic: String,
    pub worker_count: usize,
    pub published: u64,
    pub failed: u64,
    pub panicked_workers: usize,
    pub unstarted_workers: usize,
    pub flushed: bool,
    /// Whether the run ended by its deadline (as opposed to every worker dying first)
    pub deadline_reached: bool,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn messages_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.published as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Everything a background run needs, owned by the run itself.
struct EmulationRun {
    id: EmulationId,
    broker: Arc<dyn BrokerClient>,
    topic: String,
    generator: Arc<dyn RecordGenerator>,
    timeout: Duration,
    pool: ProducerPool,
}

impl EmulationRun {
    async fn execute(self) -> RunReport {
        let start = Instant::now();
        info!(
            emulation_id = %self.id,
            topic = %self.topic,
            workers = self.pool.worker_count(),
            timeout = ?self.timeout,
            phase = %RunPhase::Running,
            "Emulation started"
        );

        let deadline = Deadline::start(self.id, self.timeout);
        let pool_report = self
            .pool
            .run(
                self.id,
                &self.topic,
                self.generator,
                self.broker,
                deadline.signal(),
            )
            .await;
        let deadline_reached = deadline.is_expired();
        deadline.disarm();

        if !deadline_reached {
            warn!(emulation_id = %self.id, "All workers exited before the deadline");
        }

        let report = RunReport {
            emulation_id: self.id,
            topic: self.topic,
            worker_count: self.pool.worker_count(),
            published: pool_report.published,
            failed: pool_report.failed,
            panicked_workers: pool_report.panicked_workers,
            unstarted_workers: pool_report.unstarted_workers,
            flushed: pool_report.flushed,
            deadline_reached,
            elapsed: start.elapsed(),
        };

        info!(
            emulation_id = %report.emulation_id,
            published = report.published,
            failed = report.failed,
            panicked_workers = report.panicked_workers,
            phase = %RunPhase::Finished,
            "Emulation finished in {:.2}s ({:.2} msg/sec)",
            report.elapsed.as_secs_f64(),
            report.messages_per_second()
        );

        report
    }
}

/// Entry point for starting emulation runs.
///
/// Holds the binding, generator and topic registries and the topic provisioner.
/// Concurrent calls each get an independent run; nothing is shared between runs.
pub struct EmulationOrchestrator {
    bindings: BindingRegistry,
    generators: GeneratorRegistry,
    topics: TopicRegistry,
    provisioner: TopicProvisioner,
    config: OrchestratorConfig,
}

impl EmulationOrchestrator {
    pub fn new(
        bindings: BindingRegistry,
        generators: GeneratorRegistry,
        topics: TopicRegistry,
        admin: Arc<dyn TopicAdmin>,
        config: OrchestratorConfig,
    ) -> Self {
        let config = OrchestratorConfig {
            worker_count: config.worker_count.max(1),
            ..config
        };
        Self {
            bindings,
            generators,
            topics,
            provisioner: TopicProvisioner::new(admin),
            config,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Validate, provision and dispatch a run in the background.
    ///
    /// Returns as soon as the run is dispatched. The run's outcome is logged and
    /// never reported back through this call.
    pub async fn schedule(&self, request: RunRequest) -> Result<ScheduledRun, ScheduleError> {
        let (scheduled, run) = self.prepare(request).await?;

        // Detached: the handle is dropped and the task owns all run resources.
        tokio::spawn(run.execute());

        Ok(scheduled)
    }

    /// Same as [`schedule`](Self::schedule), but waits for the run to finish.
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, ScheduleError> {
        let (_, run) = self.prepare(request).await?;
        Ok(run.execute().await)
    }

    async fn prepare(
        &self,
        request: RunRequest,
    ) -> Result<(ScheduledRun, EmulationRun), ScheduleError> {
        if request.timeout_seconds == 0 {
            return Err(ScheduleError::InvalidTimeout);
        }

        let broker = self
            .bindings
            .get(&request.sync_binding)
            .ok_or_else(|| ScheduleError::UnknownBinding(request.sync_binding.to_lowercase()))?;

        // Generator lookup is independent of topic lookup: unmapped domains still
        // get the default topic, but a domain without a generator is rejected.
        let generator = self
            .generators
            .create(&request.domain)
            .ok_or_else(|| ScheduleError::UnknownDomain(request.domain.clone()))?;

        let topic = self.topics.resolve(&request.domain).to_string();

        debug!(
            binding = %request.sync_binding,
            domain = %request.domain,
            topic = %topic,
            phase = %RunPhase::Provisioning,
            "Provisioning topic"
        );
        self.provisioner
            .ensure(&topic, self.config.partitions, self.config.replication_factor)
            .await;

        let id = EmulationId::generate();
        let scheduled = ScheduledRun {
            id,
            sync_binding: request.sync_binding,
            domain: request.domain,
            timeout_seconds: request.timeout_seconds,
            scheduled_at: Utc::now(),
        };

        info!(
            emulation_id = %id,
            binding = %scheduled.sync_binding,
            domain = %scheduled.domain,
            topic = %topic,
            phase = %RunPhase::Scheduled,
            "Emulation scheduled"
        );

        let run = EmulationRun {
            id,
            broker,
            topic,
            generator,
            timeout: Duration::from_secs(request.timeout_seconds),
            pool: ProducerPool::new(self.config.worker_count)
                .with_flush_timeout(self.config.flush_timeout),
        };

        Ok((scheduled, run))
    }
}
