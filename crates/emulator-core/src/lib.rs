//! Emulation orchestration and concurrent producer engine.
//!
//! An emulation run publishes synthetic records to a broker topic from several
//! parallel workers until a wall-clock deadline expires.
//!
//! # Architecture
//!
//! ```text
//! RunRequest
//!     │ schedule()
//!     ▼
//! ┌──────────────────────┐   validate binding + domain
//! │ EmulationOrchestrator│── resolve topic, provision it
//! └──────────┬───────────┘   returns ScheduledRun immediately
//!            │ tokio::spawn (detached)
//!            ▼
//! ┌──────────────────────┐   Deadline ──(timer)──► StopSignal
//! │     ProducerPool     │
//! │  worker 0..N (threads)│  generate ─► envelope ─► publish
//! └──────────┬───────────┘
//!            │ join all, then flush
//!            ▼
//!        RunReport (logged)
//! ```
//!
//! Runs share nothing with each other; every run owns its generator instance,
//! stop signal and timer.

pub mod envelope;
pub mod error;
pub mod id;
pub mod orchestrator;
pub mod pool;
pub mod registry;
pub mod request;
pub mod signal;
pub mod worker;

// Re-export main types for easy access
pub use envelope::MessageEnvelope;
pub use error::ScheduleError;
pub use id::EmulationId;
pub use orchestrator::{EmulationOrchestrator, OrchestratorConfig, RunPhase, RunReport};
pub use pool::{PoolReport, ProducerPool};
pub use registry::{BindingRegistry, TopicRegistry, DEFAULT_TOPIC};
pub use request::{RunRequest, ScheduledRun};
pub use signal::{Deadline, StopSignal};
pub use worker::{PublisherWorker, WorkerStats};
