use crate::config::Settings;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.effective_log_level().directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(settings.verbose)
        .with_thread_ids(settings.verbose)
        .init();
}
