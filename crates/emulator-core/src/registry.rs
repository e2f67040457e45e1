//! Name-keyed registries for broker bindings and topics.

use emulator_broker::BrokerClient;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Topic used for domains without an explicit mapping.
pub const DEFAULT_TOPIC: &str = "default_topic";

/// Case-insensitive mapping from domain to topic name, with a default.
#[derive(Debug, Clone)]
pub struct TopicRegistry {
    topics: HashMap<String, String>,
    default_topic: String,
}

impl Default for TopicRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC)
    }
}

impl TopicRegistry {
    pub fn new(default_topic: impl Into<String>) -> Self {
        Self {
            topics: HashMap::new(),
            default_topic: default_topic.into(),
        }
    }

    /// `transaction` -> `transactions`, everything else -> [`DEFAULT_TOPIC`].
    pub fn with_defaults() -> Self {
        Self::default().with("transaction", "transactions")
    }

    pub fn register(&mut self, domain: &str, topic: impl Into<String>) {
        self.topics.insert(domain.to_lowercase(), topic.into());
    }

    pub fn with(mut self, domain: &str, topic: impl Into<String>) -> Self {
        self.register(domain, topic);
        self
    }

    /// Topic for `domain`. Never fails: unmapped domains get the default topic.
    pub fn resolve(&self, domain: &str) -> &str {
        self.topics
            .get(&domain.to_lowercase())
            .map(String::as_str)
            .unwrap_or(&self.default_topic)
    }

    pub fn default_topic(&self) -> &str {
        &self.default_topic
    }
}

/// Case-insensitive mapping from binding name to a broker client.
#[derive(Clone, Default)]
pub struct BindingRegistry {
    bindings: HashMap<String, Arc<dyn BrokerClient>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, client: Arc<dyn BrokerClient>) {
        self.bindings.insert(name.to_lowercase(), client);
    }

    pub fn with(mut self, name: &str, client: Arc<dyn BrokerClient>) -> Self {
        self.register(name, client);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn BrokerClient>> {
        self.bindings.get(&name.to_lowercase()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("bindings", &self.names())
            .finish()
    }
}
