use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// Outbound message channel of a broker binding.
///
/// One handle is shared by all workers of a run and must accept concurrent
/// `publish` calls.
pub trait BrokerClient: Send + Sync {
    /// Enqueue one message. Returning `Ok` means the message was accepted
    /// into the client's outbound buffer, not that it was delivered.
    fn publish(&self, topic: &str, key: &[u8], payload: &[u8]) -> Result<()>;

    /// Block until every enqueued message is sent or `timeout` elapses.
    fn flush(&self, timeout: Duration) -> Result<()>;
}

/// Topic creation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i32,
}

impl TopicSpec {
    pub fn new(name: impl Into<String>, partitions: i32, replication_factor: i32) -> Self {
        Self {
            name: name.into(),
            partitions,
            replication_factor,
        }
    }
}

/// Administrative surface of a broker.
#[async_trait]
pub trait TopicAdmin: Send + Sync {
    /// Names of the topics the broker currently reports.
    async fn list_topics(&self) -> Result<HashSet<String>>;

    /// Create a topic and wait for the broker to acknowledge it.
    ///
    /// Fails with [`BrokerError::TopicExists`](crate::BrokerError::TopicExists)
    /// if the topic is already present.
    async fn create_topic(&self, spec: &TopicSpec) -> Result<()>;
}
