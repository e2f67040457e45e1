//! Best-effort topic provisioning.

use crate::client::{TopicAdmin, TopicSpec};
use crate::error::BrokerError;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const DEFAULT_PARTITIONS: i32 = 5;
pub const DEFAULT_REPLICATION_FACTOR: i32 = 2;

/// What [`TopicProvisioner::ensure`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The broker already reported the topic; nothing was created.
    AlreadyExists,
    Created,
    /// Creation failed. The failure was logged and the caller carries on.
    Failed,
}

/// Makes sure a topic exists before publishing starts.
///
/// Failures are logged, never returned: publishing against a topic that could
/// not be created is left to the broker client.
#[derive(Clone)]
pub struct TopicProvisioner {
    admin: Arc<dyn TopicAdmin>,
}

impl TopicProvisioner {
    pub fn new(admin: Arc<dyn TopicAdmin>) -> Self {
        Self { admin }
    }

    /// Ensure `topic` exists with the default partition and replication settings.
    pub async fn ensure_default(&self, topic: &str) -> ProvisionOutcome {
        self.ensure(topic, DEFAULT_PARTITIONS, DEFAULT_REPLICATION_FACTOR)
            .await
    }

    /// Ensure `topic` exists, creating it if the broker does not report it.
    pub async fn ensure(
        &self,
        topic: &str,
        partitions: i32,
        replication_factor: i32,
    ) -> ProvisionOutcome {
        match self.admin.list_topics().await {
            Ok(existing) if existing.contains(topic) => {
                info!("Topic '{}' already exists", topic);
                return ProvisionOutcome::AlreadyExists;
            }
            Ok(_) => {}
            Err(e) => {
                // Fall through to create; the broker rejects duplicates.
                warn!("Failed to list topics, attempting to create '{}': {}", topic, e);
            }
        }

        let spec = TopicSpec::new(topic, partitions, replication_factor);
        match self.admin.create_topic(&spec).await {
            Ok(()) => {
                info!(
                    partitions,
                    replication_factor, "Topic '{}' created successfully", topic
                );
                ProvisionOutcome::Created
            }
            Err(BrokerError::TopicExists(name)) => {
                info!("Topic '{}' already exists", name);
                ProvisionOutcome::AlreadyExists
            }
            Err(e) => {
                error!("Failed to create topic {}: {}", topic, e);
                ProvisionOutcome::Failed
            }
        }
    }
}
