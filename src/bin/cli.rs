//! reservd CLI Client
//!
//! Command-line interface for issuing single requests to a reservd server.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reservd::Client;

/// reservd CLI
#[derive(Parser, Debug)]
#[command(name = "reservd-cli")]
#[command(about = "CLI for the reservd seat reservation server")]
struct Args {
    /// Server registration FIFO
    #[arg(short, long, default_value = "/tmp/reservd.fifo")]
    server: PathBuf,

    /// Path for this session's request FIFO
    #[arg(long, default_value = "/tmp/reservd-cli.req")]
    request_pipe: PathBuf,

    /// Path for this session's response FIFO
    #[arg(long, default_value = "/tmp/reservd-cli.resp")]
    response_pipe: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create an event with a rows x cols seat grid
    Create {
        event_id: u32,
        rows: u64,
        cols: u64,
    },

    /// Reserve seats, given as alternating row and column numbers
    Reserve {
        event_id: u32,

        /// row col [row col ...]
        #[arg(required = true, num_args = 2..)]
        seats: Vec<u64>,
    },

    /// Print an event's seat grid
    Show { event_id: u32 },

    /// List all event ids
    List,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("operation failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> reservd::Result<bool> {
    let mut client = Client::connect(&args.server, &args.request_pipe, &args.response_pipe)?;

    let ok = match args.command {
        Commands::Create {
            event_id,
            rows,
            cols,
        } => client.create(event_id, rows, cols)?.is_ok(),

        Commands::Reserve { event_id, seats } => {
            if seats.len() % 2 != 0 {
                return Err(reservd::ReservdError::Config(
                    "seats must be row/col pairs".to_string(),
                ));
            }
            let pairs: Vec<(u64, u64)> =
                seats.chunks_exact(2).map(|c| (c[0], c[1])).collect();
            client.reserve(event_id, &pairs)?.is_ok()
        }

        Commands::Show { event_id } => {
            let (status, seating) = client.show(event_id)?;
            if let Some(seating) = seating {
                print!("{}", seating);
            }
            status.is_ok()
        }

        Commands::List => {
            let (status, ids) = client.list()?;
            if ids.is_empty() {
                println!("No events");
            } else {
                for id in ids {
                    println!("Event: {}", id);
                }
            }
            status.is_ok()
        }
    };

    client.quit()?;
    Ok(ok)
}
