//! End-to-end emulation runs against the in-memory broker.

use emulator_broker::MemoryBroker;
use emulator_core::{
    BindingRegistry, EmulationOrchestrator, OrchestratorConfig, RunRequest, ScheduleError,
    TopicRegistry, DEFAULT_TOPIC,
};
use emulator_generator::{GeneratorRegistry, RecordGenerator, SyntheticRecord};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

const TRANSACTION_FIELDS: [&str; 8] = [
    "transaction_id",
    "user_id",
    "amount",
    "currency",
    "merchant",
    "timestamp",
    "location",
    "is_fraud",
];

fn memory_broker() -> Arc<MemoryBroker> {
    Arc::new(MemoryBroker::new().with_publish_latency(Duration::from_millis(1)))
}

fn orchestrator(broker: Arc<MemoryBroker>, workers: usize) -> EmulationOrchestrator {
    EmulationOrchestrator::new(
        BindingRegistry::new().with("kafkaA", broker.clone()),
        GeneratorRegistry::with_defaults(),
        TopicRegistry::with_defaults(),
        broker,
        OrchestratorConfig::default().with_worker_count(workers),
    )
}

async fn wait_for_flush(broker: &MemoryBroker, limit: Duration) {
    let start = Instant::now();
    while broker.flushes().is_empty() {
        assert!(start.elapsed() < limit, "run did not flush within {limit:?}");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduled_transaction_run() {
    let broker = memory_broker();
    let orchestrator = orchestrator(broker.clone(), 3);

    let start = Instant::now();
    let scheduled = orchestrator
        .schedule(RunRequest::new("kafkaA", "transaction", 2))
        .await
        .unwrap();
    assert!(
        start.elapsed() < Duration::from_secs(1),
        "schedule blocked for {:?}",
        start.elapsed()
    );
    assert_eq!(scheduled.sync_binding, "kafkaA");
    assert_eq!(scheduled.domain, "transaction");
    assert_eq!(scheduled.timeout_seconds, 2);

    wait_for_flush(&broker, Duration::from_secs(10)).await;
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(2), "run ended early: {elapsed:?}");

    assert!(broker.has_topic("transactions"));
    let messages = broker.messages();
    assert!(!messages.is_empty());

    let threads: HashSet<_> = messages.iter().map(|m| m.thread).collect();
    assert_eq!(threads.len(), 3, "expected one publishing thread per worker");

    for message in &messages {
        assert_eq!(message.topic, "transactions");
        let envelope: Value = serde_json::from_slice(&message.payload).unwrap();
        assert_eq!(envelope["emulation_id"], json!(scheduled.id.to_string()));
        assert!(envelope["timestamp"].is_f64());
        for field in TRANSACTION_FIELDS {
            assert!(
                envelope["data"].get(field).is_some(),
                "payload missing {field}"
            );
        }
        assert_eq!(
            message.key,
            envelope["data"]["transaction_id"]
                .as_str()
                .unwrap()
                .as_bytes()
        );
    }

    // Single flush, after the last accepted publish.
    let last_sequence = messages.iter().map(|m| m.sequence).max().unwrap();
    assert_eq!(broker.flushes(), vec![last_sequence]);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(broker.message_count(), messages.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_binding_starts_nothing() {
    let broker = memory_broker();
    let orchestrator = orchestrator(broker.clone(), 3);

    let err = orchestrator
        .schedule(RunRequest::new("kafkaB", "transaction", 1))
        .await
        .unwrap_err();
    assert_eq!(err, ScheduleError::UnknownBinding("kafkab".to_string()));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(broker.created_topics().is_empty());
    assert_eq!(broker.publish_attempts(), 0);
    assert!(broker.flushes().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_domain_starts_nothing() {
    let broker = memory_broker();
    let orchestrator = orchestrator(broker.clone(), 3);

    let err = orchestrator
        .schedule(RunRequest::new("kafkaA", "weather", 1))
        .await
        .unwrap_err();
    assert_eq!(err, ScheduleError::UnknownDomain("weather".to_string()));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(broker.created_topics().is_empty());
    assert_eq!(broker.publish_attempts(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_binding_and_domain_are_case_insensitive() {
    let broker = memory_broker();
    let orchestrator = orchestrator(broker.clone(), 1);

    let report = orchestrator
        .run(RunRequest::new("KAFKAA", "Transaction", 1))
        .await
        .unwrap();

    assert_eq!(report.topic, "transactions");
    assert!(report.published > 0);
}

struct CounterGenerator;

impl RecordGenerator for CounterGenerator {
    fn domain(&self) -> &str {
        "counter"
    }

    fn key_field(&self) -> &str {
        "id"
    }

    fn generate(&self) -> SyntheticRecord {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(1));
        SyntheticRecord::new(fields)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unmapped_domain_uses_default_topic() {
    let broker = memory_broker();
    let orchestrator = EmulationOrchestrator::new(
        BindingRegistry::new().with("kafkaA", broker.clone()),
        GeneratorRegistry::with_defaults().with("counter", || Arc::new(CounterGenerator)),
        TopicRegistry::with_defaults(),
        broker.clone(),
        OrchestratorConfig::default().with_worker_count(2),
    );

    let report = orchestrator
        .run(RunRequest::new("kafkaA", "counter", 1))
        .await
        .unwrap();

    assert_eq!(report.topic, DEFAULT_TOPIC);
    assert!(broker.has_topic(DEFAULT_TOPIC));
    assert!(broker.messages().iter().all(|m| m.key == b"1"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_duration_independent_of_worker_count() {
    for workers in [1, 8] {
        let broker = memory_broker();
        let orchestrator = orchestrator(broker.clone(), workers);

        let report = orchestrator
            .run(RunRequest::new("kafkaA", "transaction", 1))
            .await
            .unwrap();

        assert!(report.deadline_reached);
        assert!(report.flushed);
        assert_eq!(report.worker_count, workers);
        assert!(report.elapsed >= Duration::from_secs(1));
        assert!(
            report.elapsed < Duration::from_secs(3),
            "{workers} workers took {:?}",
            report.elapsed
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_publish_failures_do_not_stop_the_run() {
    let broker = Arc::new(
        MemoryBroker::new()
            .with_publish_latency(Duration::from_millis(1))
            .with_failing_publishes(),
    );
    let orchestrator = orchestrator(broker.clone(), 2);

    let report = orchestrator
        .run(RunRequest::new("kafkaA", "transaction", 1))
        .await
        .unwrap();

    assert_eq!(report.published, 0);
    assert!(report.failed > 0);
    assert_eq!(report.failed, broker.publish_attempts());
    assert!(report.deadline_reached);
    assert_eq!(broker.flushes().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_topic_creation_failure_does_not_block_run() {
    let broker = Arc::new(
        MemoryBroker::new()
            .with_publish_latency(Duration::from_millis(1))
            .with_failing_topic_creation(),
    );
    let orchestrator = orchestrator(broker.clone(), 1);

    let report = orchestrator
        .run(RunRequest::new("kafkaA", "transaction", 1))
        .await
        .unwrap();

    assert_eq!(broker.created_topics().len(), 1);
    assert!(!broker.has_topic("transactions"));
    assert!(report.published > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_runs_are_independent() {
    let broker = memory_broker();
    let orchestrator = orchestrator(broker.clone(), 2);

    let first = orchestrator
        .schedule(RunRequest::new("kafkaA", "transaction", 1))
        .await
        .unwrap();
    let second = orchestrator
        .schedule(RunRequest::new("kafkaA", "transaction", 1))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let start = Instant::now();
    while broker.flushes().len() < 2 {
        assert!(start.elapsed() < Duration::from_secs(10));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let ids: HashSet<String> = broker
        .messages()
        .iter()
        .map(|m| {
            let envelope: Value = serde_json::from_slice(&m.payload).unwrap();
            envelope["emulation_id"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(
        ids,
        HashSet::from([first.id.to_string(), second.id.to_string()])
    );
    // Second run found the topic created by the first.
    assert_eq!(broker.created_topics().len(), 1);
}

#[test]
fn test_runtime_shutdown_stops_scheduled_run() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    let broker = memory_broker();
    let orchestrator = orchestrator(broker.clone(), 3);

    runtime.block_on(async {
        orchestrator
            .schedule(RunRequest::new("kafkaA", "transaction", 3600))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
    });
    assert!(broker.message_count() > 0);

    let (dropped, on_drop) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        drop(runtime);
        let _ = dropped.send(());
    });
    on_drop
        .recv_timeout(Duration::from_secs(5))
        .expect("runtime shutdown hung on a scheduled run");

    // Workers may finish the iteration they were in when the run was abandoned.
    std::thread::sleep(Duration::from_millis(100));
    let settled = broker.message_count();
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(broker.message_count(), settled);
}
