// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use pocket_camera::Lens;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "pocket-camera")]
#[command(about = "Photo and video capture with a media gallery")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Capture directory (overrides the configuration)
    #[arg(long, global = true)]
    media_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo
    Photo {
        /// Lens to use: front or back (default from configuration)
        #[arg(short, long, value_parser = parse_lens)]
        lens: Option<Lens>,
    },

    /// Record a video
    Video {
        /// Lens to use: front or back (default from configuration)
        #[arg(short, long, value_parser = parse_lens)]
        lens: Option<Lens>,

        /// Recording duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },

    /// List captured media, newest first
    Gallery,

    /// Delete captured files as one batch
    Delete {
        /// Files to delete
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Show details of one captured file
    View {
        path: PathBuf,

        /// Delete the file after showing it
        #[arg(long)]
        delete: bool,
    },
}

fn parse_lens(value: &str) -> Result<Lens, String> {
    Lens::from_location(value).ok_or_else(|| format!("unknown lens '{}'", value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=pocket_camera=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = pocket_camera::Config::load();
    if let Some(dir) = cli.media_dir {
        config.media_dir = Some(dir);
    }

    match cli.command {
        Commands::Photo { lens } => cli::take_photo(&config, lens),
        Commands::Video { lens, duration } => cli::record_video(&config, lens, duration),
        Commands::Gallery => cli::list_gallery(&config),
        Commands::Delete { paths } => cli::delete_media(&config, &paths),
        Commands::View { path, delete } => cli::view_media(&config, &path, delete),
    }
}
