//! Piecewise CLI - compress CSV time series with a hard error bound

mod cmd;
mod csv;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "piecewise", version, about = "Error-bounded time-series compression")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a `timestamp,value` CSV file
    Compress(cmd::compress::CompressArgs),
    /// Restore a compressed file to CSV, one row per tick
    Decompress(cmd::decompress::DecompressArgs),
    /// Report segment counts, size and error for a CSV file
    Stats(cmd::stats::StatsArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so decompressed CSV can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compress(args) => cmd::compress::run(args),
        Command::Decompress(args) => cmd::decompress::run(args),
        Command::Stats(args) => cmd::stats::run(args),
    }
}
