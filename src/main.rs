//! Command-line interface for traffic-emulator
//!
//! # Usage Examples
//!
//! ```bash
//! # Emulate transaction traffic for two minutes
//! traffic-emulator run --domain transaction --timeout 120 --workers 8
//!
//! # Against a remote cluster with debug logging
//! traffic-emulator --kafka-bootstrap-servers kafka:9092 --debug run --timeout 10
//! ```

use clap::{Parser, Subcommand};
use emulator_core::orchestrator::DEFAULT_WORKER_COUNT;
use emulator_core::{OrchestratorConfig, RunRequest};
use traffic_emulator::config::parse_duration_secs;
use traffic_emulator::logging::init_logging;
use traffic_emulator::{kafka_orchestrator, Settings, KAFKA_BINDING};

#[derive(Parser)]
#[command(name = "traffic-emulator")]
#[command(about = "Emulate synthetic traffic against a Kafka-backed event pipeline")]
#[command(long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one emulation in the foreground and print a summary
    Run {
        /// Broker binding to publish through
        #[arg(long = "sync", default_value = KAFKA_BINDING)]
        sync_binding: String,

        /// Record domain to generate
        #[arg(long, default_value = "transaction")]
        domain: String,

        /// Run duration: seconds, or with an s/m/h suffix (e.g. "90", "2m")
        #[arg(long, default_value = "60", value_parser = parse_duration_secs)]
        timeout: u64,

        /// Number of parallel publishers
        #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
        workers: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.settings);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run {
            sync_binding,
            domain,
            timeout,
            workers,
        } => {
            tracing::info!(
                "Starting {} emulation via {} for {}s with {} workers",
                domain,
                sync_binding,
                timeout,
                workers
            );
            tracing::info!("Brokers: {}", cli.settings.kafka_bootstrap_servers);
            let config = OrchestratorConfig::default().with_worker_count(workers);
            let orchestrator = kafka_orchestrator(&cli.settings, config)?;

            let report = orchestrator
                .run(RunRequest::new(sync_binding, domain, timeout))
                .await?;
            tracing::info!("Emulation {} completed", report.emulation_id);

            println!("Emulation {} finished", report.emulation_id);
            println!("  Topic:     {}", report.topic);
            println!("  Workers:   {}", report.worker_count);
            println!("  Published: {}", report.published);
            println!("  Failed:    {}", report.failed);
            println!(
                "  Duration:  {:.2}s ({:.2} msg/sec)",
                report.elapsed.as_secs_f64(),
                report.messages_per_second()
            );
            if report.panicked_workers > 0 {
                println!("  Workers lost to panics: {}", report.panicked_workers);
            }
            if report.unstarted_workers > 0 {
                println!("  Workers that failed to start: {}", report.unstarted_workers);
            }
        }
    }

    Ok(())
}
