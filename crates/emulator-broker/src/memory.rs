//! In-memory broker used for dry runs and tests.

use crate::client::{BrokerClient, TopicAdmin, TopicSpec};
use crate::error::{BrokerError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread::ThreadId;
use std::time::Duration;

/// A message accepted by [`MemoryBroker::publish`].
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    /// Position in the global publish order, starting at 1
    pub sequence: u64,
    pub topic: String,
    pub key: Vec<u8>,
    pub payload: Vec<u8>,
    /// Thread the publish call ran on
    pub thread: ThreadId,
}

#[derive(Debug, Default)]
struct State {
    topics: HashSet<String>,
    created: Vec<TopicSpec>,
    messages: Vec<PublishedMessage>,
    /// Publish sequence observed by each flush call
    flushes: Vec<u64>,
}

/// Broker that keeps topics and messages in process memory.
#[derive(Debug, Default)]
pub struct MemoryBroker {
    state: Mutex<State>,
    sequence: AtomicU64,
    attempts: AtomicU64,
    fail_publish: AtomicBool,
    fail_create: AtomicBool,
    fail_list: AtomicBool,
    publish_latency: Option<Duration>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an existing topic.
    pub fn with_topic(self, name: &str) -> Self {
        self.lock().topics.insert(name.to_string());
        self
    }

    /// Sleep on the calling thread for `latency` inside every publish call.
    pub fn with_publish_latency(mut self, latency: Duration) -> Self {
        self.publish_latency = Some(latency);
        self
    }

    /// Reject every publish call.
    pub fn with_failing_publishes(self) -> Self {
        self.fail_publish.store(true, Ordering::SeqCst);
        self
    }

    /// Reject every topic creation.
    pub fn with_failing_topic_creation(self) -> Self {
        self.fail_create.store(true, Ordering::SeqCst);
        self
    }

    /// Reject metadata requests.
    pub fn with_failing_metadata(self) -> Self {
        self.fail_list.store(true, Ordering::SeqCst);
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.lock().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    /// Total publish calls, including rejected ones.
    pub fn publish_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// The last accepted publish sequence seen by each flush call.
    pub fn flushes(&self) -> Vec<u64> {
        self.lock().flushes.clone()
    }

    /// Topics created through [`TopicAdmin::create_topic`].
    pub fn created_topics(&self) -> Vec<TopicSpec> {
        self.lock().created.clone()
    }

    pub fn has_topic(&self, name: &str) -> bool {
        self.lock().topics.contains(name)
    }
}

impl BrokerClient for MemoryBroker {
    fn publish(&self, topic: &str, key: &[u8], payload: &[u8]) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.publish_latency {
            std::thread::sleep(latency);
        }
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(BrokerError::Publish("Queue full".to_string()));
        }

        let mut state = self.lock();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        state.messages.push(PublishedMessage {
            sequence,
            topic: topic.to_string(),
            key: key.to_vec(),
            payload: payload.to_vec(),
            thread: std::thread::current().id(),
        });
        Ok(())
    }

    fn flush(&self, _timeout: Duration) -> Result<()> {
        let mut state = self.lock();
        let sequence = self.sequence.load(Ordering::SeqCst);
        state.flushes.push(sequence);
        Ok(())
    }
}

#[async_trait]
impl TopicAdmin for MemoryBroker {
    async fn list_topics(&self) -> Result<HashSet<String>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BrokerError::Metadata("Broker transport failure".to_string()));
        }
        Ok(self.lock().topics.clone())
    }

    async fn create_topic(&self, spec: &TopicSpec) -> Result<()> {
        let mut state = self.lock();
        state.created.push(spec.clone());

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BrokerError::TopicCreation {
                topic: spec.name.clone(),
                reason: "Invalid replication factor".to_string(),
            });
        }
        if !state.topics.insert(spec.name.clone()) {
            return Err(BrokerError::TopicExists(spec.name.clone()));
        }
        Ok(())
    }
}
