//! Generator capability and the domain registry.

use crate::generators::transaction::TransactionGenerator;
use crate::record::SyntheticRecord;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Produces synthetic records for one domain.
///
/// A single instance is shared by every worker of a run, so implementations
/// must tolerate concurrent calls. `generate` never fails.
pub trait RecordGenerator: Send + Sync {
    /// Domain this generator produces records for (e.g. "transaction").
    fn domain(&self) -> &str;

    /// Name of the field holding the record's natural identifier.
    fn key_field(&self) -> &str;

    /// Generate one fresh record.
    fn generate(&self) -> SyntheticRecord;
}

/// Zero-argument constructor for a generator instance.
pub type GeneratorFactory = Arc<dyn Fn() -> Arc<dyn RecordGenerator> + Send + Sync>;

/// Case-insensitive mapping from domain name to generator factory.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    factories: HashMap<String, GeneratorFactory>,
}

impl GeneratorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in domains registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TransactionGenerator::DOMAIN, || {
            Arc::new(TransactionGenerator::new())
        });
        registry
    }

    /// Register a factory for a domain, replacing any previous one.
    pub fn register<F>(&mut self, domain: &str, factory: F)
    where
        F: Fn() -> Arc<dyn RecordGenerator> + Send + Sync + 'static,
    {
        self.factories
            .insert(domain.to_lowercase(), Arc::new(factory));
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with<F>(mut self, domain: &str, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn RecordGenerator> + Send + Sync + 'static,
    {
        self.register(domain, factory);
        self
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.factories.contains_key(&domain.to_lowercase())
    }

    /// Construct a fresh generator for `domain`, or `None` if unregistered.
    pub fn create(&self, domain: &str) -> Option<Arc<dyn RecordGenerator>> {
        self.factories
            .get(&domain.to_lowercase())
            .map(|factory| factory())
    }

    /// Registered domain names, sorted.
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.factories.keys().cloned().collect();
        domains.sort();
        domains
    }
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("domains", &self.domains())
            .finish()
    }
}
