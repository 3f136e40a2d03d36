//! WebServer entry point
//!
//! Hosts the trigger API over an in-process scheduler. With `--sweep` the
//! periodic scheduler loop runs alongside the HTTP server.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

use orchestrator::{RealScheduler, SchedulerConfig};
use shared::{logging, process_info, ProcessId};
use webserver::{WebServer, WebServerError, WebServerResult};

#[derive(Parser, Debug)]
#[command(name = "webserver")]
#[command(about = "HTTP trigger surface for the promotion scheduler")]
struct Args {
    /// Address for the HTTP server
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Product catalog JSON file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// User directory JSON file
    #[arg(long)]
    users: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Also run the periodic sweep in this process
    #[arg(long)]
    sweep: bool,
}

#[tokio::main]
async fn main() -> WebServerResult<()> {
    let args = Args::parse();

    ProcessId::init_webserver();
    logging::init_tracing_with_level(Some(&args.log_level));
    logging::log_startup(ProcessId::current(), "promotion trigger API");

    let config = SchedulerConfig::from_env()?;
    let scheduler = Arc::new(RealScheduler::from_files(args.catalog.as_deref(), args.users.as_deref(), config).await?);

    let sweeper = args.sweep.then(|| {
        let scheduler = scheduler.clone();
        process_info!(ProcessId::current(), "⏱️ Periodic sweep enabled");
        tokio::spawn(async move {
            if let Err(e) = scheduler.run().await {
                logging::log_error(ProcessId::current(), "Scheduler loop", &e);
            }
        })
    });

    let shutdown_sender = scheduler.shutdown_sender();
    let shutdown = async move {
        match signal::ctrl_c().await {
            Ok(()) => logging::log_shutdown(ProcessId::current(), "Received Ctrl+C signal"),
            Err(err) => logging::log_error(ProcessId::current(), "Signal handling", &err),
        }
        let _ = shutdown_sender.send(()).await;
    };

    let server = WebServer::new(args.bind, scheduler);
    server.run(shutdown).await?;

    if let Some(handle) = sweeper {
        handle
            .await
            .map_err(|e| WebServerError::InternalError(format!("Scheduler task failed: {}", e)))?;
    }

    logging::log_success(ProcessId::current(), "WebServer stopped gracefully");
    Ok(())
}
