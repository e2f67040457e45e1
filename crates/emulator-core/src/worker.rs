//! A single publishing loop.

use crate::envelope::MessageEnvelope;
use crate::id::EmulationId;
use crate::signal::StopSignal;
use emulator_broker::BrokerClient;
use emulator_generator::RecordGenerator;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Publish counters shared by the workers of one run.
///
/// Observed for reporting only; they never influence the loop.
#[derive(Debug, Default)]
pub struct WorkerStats {
    published: AtomicU64,
    failed: AtomicU64,
}

impl WorkerStats {
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Generates, wraps and publishes records until the stop signal is set.
pub struct PublisherWorker {
    pub index: usize,
    pub emulation_id: EmulationId,
    pub topic: Arc<str>,
    pub generator: Arc<dyn RecordGenerator>,
    pub broker: Arc<dyn BrokerClient>,
    pub stop: StopSignal,
    pub stats: Arc<WorkerStats>,
}

impl PublisherWorker {
    /// Run the loop on the current thread.
    ///
    /// The flag is checked once per iteration, so after it is set the worker
    /// finishes at most the iteration already in progress. Publish failures are
    /// logged and the message is dropped.
    pub fn run(self) {
        debug!(worker = self.index, emulation_id = %self.emulation_id, "Worker started");

        while !self.stop.is_set() {
            let record = self.generator.generate();
            let key = record
                .key(self.generator.key_field())
                .unwrap_or_default();
            let envelope = MessageEnvelope::new(self.emulation_id, record);

            let payload = match envelope.to_bytes() {
                Ok(payload) => payload,
                Err(e) => {
                    self.stats.record_failed();
                    warn!(worker = self.index, "Failed to encode message: {}", e);
                    continue;
                }
            };

            match self.broker.publish(&self.topic, key.as_bytes(), &payload) {
                Ok(()) => {
                    self.stats.record_published();
                    trace!(worker = self.index, key = %key, "Produced message");
                }
                Err(e) => {
                    self.stats.record_failed();
                    warn!(worker = self.index, "Failed to produce message: {}", e);
                }
            }
        }

        debug!(worker = self.index, emulation_id = %self.emulation_id, "Worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Deadline;
    use emulator_broker::MemoryBroker;
    use emulator_generator::TransactionGenerator;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_worker_exits_once_signal_is_set() {
        let broker = Arc::new(MemoryBroker::new().with_publish_latency(Duration::from_millis(1)));
        let id = EmulationId::generate();
        let deadline = Deadline::start(id, Duration::from_millis(200));
        let stats = Arc::new(WorkerStats::default());

        let worker = PublisherWorker {
            index: 0,
            emulation_id: id,
            topic: Arc::from("transactions"),
            generator: Arc::new(TransactionGenerator::with_seed(11)),
            broker: broker.clone(),
            stop: deadline.signal(),
            stats: stats.clone(),
        };
        let handle = std::thread::spawn(move || worker.run());

        deadline.signal().wait().await;
        tokio::task::spawn_blocking(move || handle.join())
            .await
            .unwrap()
            .unwrap();

        let published = broker.message_count();
        assert!(published > 0);
        assert_eq!(stats.published(), published as u64);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(broker.message_count(), published);
    }
}
