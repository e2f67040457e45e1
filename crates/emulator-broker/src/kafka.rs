//! `rdkafka` binding.

use crate::client::{BrokerClient, TopicAdmin, TopicSpec};
use crate::error::{BrokerError, Result};
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const ADMIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a Kafka binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Comma-separated bootstrap servers, e.g. "localhost:9092"
    pub bootstrap_servers: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// How long librdkafka keeps retrying a message before reporting failure
    pub message_timeout_ms: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            username: None,
            password: None,
            message_timeout_ms: 30_000,
        }
    }
}

impl BrokerConfig {
    pub fn new(bootstrap_servers: impl Into<String>) -> Self {
        Self {
            bootstrap_servers: bootstrap_servers.into(),
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Base client configuration shared by producer and admin clients.
    ///
    /// SASL is enabled only when both username and password are present.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config.set("bootstrap.servers", &self.bootstrap_servers);

        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            config
                .set("security.protocol", "SASL_SSL")
                .set("sasl.mechanisms", "PLAIN")
                .set("sasl.username", username)
                .set("sasl.password", password);
        }

        config
    }

    fn producer_config(&self) -> ClientConfig {
        let mut config = self.client_config();
        config
            .set("message.timeout.ms", self.message_timeout_ms.to_string())
            .set("queue.buffering.max.messages", "100000")
            .set("queue.buffering.max.kbytes", "1048576")
            .set("batch.size", "65536")
            .set("linger.ms", "5");
        config
    }
}

/// Producer side of a Kafka binding.
pub struct KafkaProducerClient {
    producer: FutureProducer,
}

impl KafkaProducerClient {
    pub fn new(config: &BrokerConfig) -> Result<Self> {
        let producer: FutureProducer = config.producer_config().create()?;
        info!(brokers = %config.bootstrap_servers, "Created Kafka producer");
        Ok(Self { producer })
    }
}

impl BrokerClient for KafkaProducerClient {
    fn publish(&self, topic: &str, key: &[u8], payload: &[u8]) -> Result<()> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        // The delivery future is dropped: enqueueing is the only outcome we track,
        // and flush() waits for the outbound queue to drain.
        self.producer
            .send_result(record)
            .map(|_delivery| ())
            .map_err(|(err, _)| BrokerError::Kafka(err))
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        debug!(in_flight = self.producer.in_flight_count(), "Flushing Kafka producer");
        self.producer.flush(timeout)?;
        Ok(())
    }
}

/// Admin side of a Kafka binding.
pub struct KafkaAdmin {
    admin: Arc<AdminClient<DefaultClientContext>>,
}

impl KafkaAdmin {
    pub fn new(config: &BrokerConfig) -> Result<Self> {
        let admin: AdminClient<DefaultClientContext> = config.client_config().create()?;
        Ok(Self {
            admin: Arc::new(admin),
        })
    }
}

#[async_trait]
impl TopicAdmin for KafkaAdmin {
    async fn list_topics(&self) -> Result<HashSet<String>> {
        let admin = Arc::clone(&self.admin);

        // fetch_metadata blocks the calling thread.
        let metadata = tokio::task::spawn_blocking(move || {
            admin.inner().fetch_metadata(None, ADMIN_TIMEOUT)
        })
        .await
        .map_err(|e| BrokerError::Metadata(e.to_string()))??;

        Ok(metadata
            .topics()
            .iter()
            .map(|topic| topic.name().to_string())
            .collect())
    }

    async fn create_topic(&self, spec: &TopicSpec) -> Result<()> {
        let new_topic = NewTopic::new(
            &spec.name,
            spec.partitions,
            TopicReplication::Fixed(spec.replication_factor),
        );
        let opts = AdminOptions::new().operation_timeout(Some(ADMIN_TIMEOUT));

        let results = self.admin.create_topics(&[new_topic], &opts).await?;
        for result in results {
            match result {
                Ok(_) => {}
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    return Err(BrokerError::TopicExists(topic));
                }
                Err((topic, code)) => {
                    return Err(BrokerError::TopicCreation {
                        topic,
                        reason: code.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_without_credentials() {
        let config = BrokerConfig::new("broker-1:9092,broker-2:9092");
        let client_config = config.client_config();

        assert_eq!(
            client_config.get("bootstrap.servers"),
            Some("broker-1:9092,broker-2:9092")
        );
        assert!(client_config.get("security.protocol").is_none());
        assert!(client_config.get("sasl.username").is_none());
    }

    #[test]
    fn test_client_config_with_credentials() {
        let config = BrokerConfig::new("localhost:9092").with_credentials("alice", "secret");
        let client_config = config.client_config();

        assert_eq!(client_config.get("security.protocol"), Some("SASL_SSL"));
        assert_eq!(client_config.get("sasl.mechanisms"), Some("PLAIN"));
        assert_eq!(client_config.get("sasl.username"), Some("alice"));
        assert_eq!(client_config.get("sasl.password"), Some("secret"));
    }

    #[test]
    fn test_username_without_password_is_ignored() {
        let config = BrokerConfig {
            username: Some("alice".to_string()),
            ..BrokerConfig::default()
        };
        assert!(config.client_config().get("sasl.username").is_none());
    }

    #[test]
    fn test_producer_config() {
        let config = BrokerConfig::default();
        let producer_config = config.producer_config();

        assert_eq!(producer_config.get("message.timeout.ms"), Some("30000"));
        assert_eq!(producer_config.get("linger.ms"), Some("5"));
        assert_eq!(producer_config.get("bootstrap.servers"), Some("localhost:9092"));
    }
}
