//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod lookup;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Address picker backend
#[derive(Parser)]
#[command(name = "geopin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Look up the address at a coordinate
    Reverse(lookup::ReverseArgs),

    /// Search for places matching a query
    Search(lookup::SearchArgs),

    /// Resolve an address to a coordinate and its canonical address
    Geocode(lookup::GeocodeArgs),

    /// Detect the current device position
    Locate(lookup::LocateArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            init_logging("info");
            serve::run(args).await
        }
        Commands::Config(args) => config::run(args),
        Commands::Reverse(args) => {
            init_logging("warn");
            lookup::reverse(args).await
        }
        Commands::Search(args) => {
            init_logging("warn");
            lookup::search(args).await
        }
        Commands::Geocode(args) => {
            init_logging("warn");
            lookup::geocode(args).await
        }
        Commands::Locate(args) => {
            init_logging("warn");
            lookup::locate(args).await
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides `default_level`
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
