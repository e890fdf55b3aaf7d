//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod geocode;
pub mod geometry;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Point geometry codec and click-to-locate picker for facility maps
#[derive(Parser)]
#[command(name = "facility-geo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a stored geometry value (text or hex EWKB)
    Decode(geometry::DecodeArgs),

    /// Encode a coordinate for storage
    Encode(geometry::EncodeArgs),

    /// Reverse geocode a coordinate
    Geocode(geocode::GeocodeArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Initialize logging to stderr, honouring `RUST_LOG`
fn init_logging(default_level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode(args) => {
            init_logging("warn");
            geometry::run_decode(args)
        }
        Commands::Encode(args) => {
            init_logging("warn");
            geometry::run_encode(args)
        }
        Commands::Geocode(args) => {
            init_logging("warn");
            geocode::run(args).await
        }
        Commands::Serve(args) => {
            init_logging("info");
            serve::run(args).await
        }
        Commands::Config(args) => config::run(args),
    }
}
