//! reservd Server Binary
//!
//! Starts the FIFO server for reservd.

use std::time::Duration;

use clap::Parser;
use reservd::{Config, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// reservd Server
#[derive(Parser, Debug)]
#[command(name = "reservd-server")]
#[command(about = "Concurrent seat reservation server over named pipes")]
#[command(version)]
struct Args {
    /// Registration FIFO path
    #[arg(short, long, default_value = "/tmp/reservd.fifo")]
    pipe: String,

    /// Simulated state-access delay in microseconds
    #[arg(short, long, default_value = "500000")]
    delay_us: u64,

    /// Number of worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Pending-session queue capacity
    #[arg(short, long, default_value = "8")]
    max_sessions: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reservd=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("reservd Server v{}", reservd::VERSION);
    tracing::info!("Registration FIFO: {}", args.pipe);
    tracing::info!("Workers: {}", args.workers);

    let config = Config::builder()
        .registration_path(&args.pipe)
        .state_access_delay(Duration::from_micros(args.delay_us))
        .worker_count(args.workers)
        .max_sessions(args.max_sessions)
        .build();

    // SIGUSR1 dumps the event list to stdout
    reservd::server::install_dump_signal_handler();

    let server = Server::with_config(config);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
