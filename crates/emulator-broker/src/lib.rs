//! Broker bindings for the traffic emulator.
//!
//! The emulator talks to a message broker through two capabilities:
//!
//! - [`BrokerClient`]: enqueue a keyed message on a topic and flush buffered messages.
//!   Called from worker threads, so the methods are synchronous.
//! - [`TopicAdmin`]: list existing topics and create new ones.
//!
//! [`KafkaProducerClient`] and [`KafkaAdmin`] implement them on top of `rdkafka`.
//! [`MemoryBroker`] implements both in memory for dry runs and tests.
//! [`TopicProvisioner`] uses a [`TopicAdmin`] to make sure a topic exists before a run.

pub mod client;
pub mod error;
pub mod kafka;
pub mod memory;
pub mod provisioner;

// Re-export main types for easy access
pub use client::{BrokerClient, TopicAdmin, TopicSpec};
pub use error::{BrokerError, Result};
pub use kafka::{BrokerConfig, KafkaAdmin, KafkaProducerClient};
pub use memory::{MemoryBroker, PublishedMessage};
pub use provisioner::{
    ProvisionOutcome, TopicProvisioner, DEFAULT_PARTITIONS, DEFAULT_REPLICATION_FACTOR,
};
