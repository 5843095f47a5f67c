// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use photobooth::Config;
use std::path::PathBuf;
use tracing::{debug, warn};

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Single-shot camera bridge for GUI hosts")]
#[command(version = env!("PHOTOBOOTH_BUILD_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Configuration file (default: ~/.config/photobooth/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Capture device, e.g. /dev/video2
    #[arg(long, global = true)]
    device: Option<String>,

    /// Settling delay before the photo request, in milliseconds
    #[arg(long, global = true)]
    settle_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the camera method channel on stdin/stdout (default)
    Serve,

    /// List available cameras
    List,

    /// List available filters
    Filters,

    /// Check camera permission
    Permission {
        /// Ask for access if it has not been decided yet
        #[arg(short, long)]
        request: bool,
    },

    /// Take a photo
    Photo {
        /// Filter to apply (see 'photobooth filters')
        #[arg(short, long)]
        filter: Option<String>,

        /// Output file path (default: ~/Pictures/photobooth/photo_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Logs go to stderr; stdout carries the channel when serving.
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::List) => cli::list_cameras(&config),
        Some(Commands::Filters) => {
            cli::list_filters(&config);
            Ok(())
        }
        Some(Commands::Permission { request }) => cli::permission(&config, request),
        Some(Commands::Photo { filter, output }) => cli::take_photo(&config, filter, output),
        Some(Commands::Serve) | None => cli::serve(&config),
    }
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => match Config::default_path() {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Using default configuration");
                None
            }
        },
    };

    let mut config = match path {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };

    if let Some(device) = &cli.device {
        config.device = Some(device.clone());
    }
    if let Some(settle_ms) = cli.settle_ms {
        config.settle_delay_ms = settle_ms;
    }

    debug!(?config, "Configuration loaded");
    Ok(config)
}
