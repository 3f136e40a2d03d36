//! Main entry point for the promotion scheduler binary
//!
//! Loads the catalog and user directory, then sweeps every configured user on
//! a fixed interval until Ctrl+C.

use clap::Parser;
use std::path::PathBuf;
use tokio::signal;

use orchestrator::{OrchestratorResult, RealScheduler, SchedulerConfig};
use shared::{logging, process_info, ProcessId};

/// Scheduler for deduplicated multi-channel product promotions
#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Runs scheduled promotion cycles for every configured user")]
pub struct Args {
    /// Product catalog JSON file (array of catalog entries)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// User directory JSON file ({"users": [...], "campaigns": [...]})
    #[arg(long)]
    pub users: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Run a single sweep and exit
    #[arg(long)]
    pub once: bool,
}

#[tokio::main]
async fn main() -> OrchestratorResult<()> {
    let args = Args::parse();

    ProcessId::init_scheduler();
    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(ProcessId::current(), "promotion scheduler");

    let config = SchedulerConfig::from_env()?;
    let scheduler = RealScheduler::from_files(args.catalog.as_deref(), args.users.as_deref(), config).await?;

    if args.once {
        let results = scheduler.sweep().await?;
        for (user_id, result) in results {
            match result {
                Ok(report) => process_info!(ProcessId::current(), "{}: {}", user_id, report.message),
                Err(e) => logging::log_error(ProcessId::current(), &format!("Cycle for {}", user_id), &e),
            }
        }
        return Ok(());
    }

    process_info!(
        ProcessId::current(),
        "⏱️ Sweeping every {}s",
        scheduler.config().sweep_interval.as_secs()
    );

    // Set up graceful shutdown
    let shutdown_sender = scheduler.shutdown_sender();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal");
                let _ = shutdown_sender.send(()).await;
            }
            Err(err) => {
                logging::log_error(ProcessId::current(), "Signal handling", &err);
            }
        }
    });

    scheduler.run().await?;

    logging::log_success(ProcessId::current(), "Scheduler stopped gracefully");
    Ok(())
}
