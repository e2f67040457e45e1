//! Synthetic record generators for the traffic emulator.
//!
//! A [`RecordGenerator`] produces one [`SyntheticRecord`] per call. Generators are
//! looked up by domain name through a [`GeneratorRegistry`], which maps a
//! case-insensitive domain to a zero-argument factory.
//!
//! # Architecture
//!
//! ```text
//! domain ("transaction")
//!        │
//!        ▼
//! ┌───────────────────┐
//! │ GeneratorRegistry │  domain -> factory
//! └─────────┬─────────┘
//!           │ create()
//!           ▼
//! ┌───────────────────┐
//! │  RecordGenerator  │  shared by every worker of a run
//! └─────────┬─────────┘
//!           │ generate()
//!           ▼
//!    SyntheticRecord { field -> value }
//! ```
//!
//! # Example
//!
//! ```rust
//! use emulator_generator::GeneratorRegistry;
//!
//! let registry = GeneratorRegistry::with_defaults();
//! let generator = registry.create("Transaction").unwrap();
//! let record = generator.generate();
//! assert!(record.key(generator.key_field()).is_some());
//! ```

pub mod generator;
pub mod generators;
pub mod record;

// Re-exports for convenience
pub use generator::{GeneratorFactory, GeneratorRegistry, RecordGenerator};
pub use generators::transaction::{FraudRule, Transaction, TransactionGenerator};
pub use record::SyntheticRecord;
