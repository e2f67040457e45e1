//! Traffic emulator
//!
//! Publishes synthetic domain records (e.g. financial transactions with embedded
//! fraud patterns) to a Kafka topic from parallel workers for a fixed duration.
//!
//! # CLI Usage
//!
//! ```bash
//! # Publish transactions to the `transactions` topic for 30 seconds with 5 workers
//! traffic-emulator run --sync kafka --domain transaction --timeout 30 --workers 5
//!
//! # Authenticated cluster
//! KAFKA_USERNAME=alice KAFKA_PASSWORD=secret \
//!   traffic-emulator --kafka-bootstrap-servers broker:9093 run --timeout 60
//! ```

pub mod config;
pub mod logging;

use anyhow::Context;
use emulator_broker::{BrokerConfig, KafkaAdmin, KafkaProducerClient};
use emulator_core::{BindingRegistry, EmulationOrchestrator, OrchestratorConfig, TopicRegistry};
use emulator_generator::GeneratorRegistry;
use std::sync::Arc;

pub use config::{LogLevel, Settings};

/// Binding name under which the Kafka producer is registered.
pub const KAFKA_BINDING: &str = "kafka";

/// Build an orchestrator with the Kafka binding and the built-in domains.
pub fn kafka_orchestrator(
    settings: &Settings,
    config: OrchestratorConfig,
) -> anyhow::Result<EmulationOrchestrator> {
    let broker_config = BrokerConfig::from(settings);

    let producer =
        KafkaProducerClient::new(&broker_config).context("Failed to create Kafka producer")?;
    let admin = KafkaAdmin::new(&broker_config).context("Failed to create Kafka admin client")?;

    let bindings = BindingRegistry::new().with(KAFKA_BINDING, Arc::new(producer));

    Ok(EmulationOrchestrator::new(
        bindings,
        GeneratorRegistry::with_defaults(),
        TopicRegistry::with_defaults(),
        Arc::new(admin),
        config,
    ))
}
