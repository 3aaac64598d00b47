//! Scrubcut CLI
//!
//! Drives an editing session from the command line through an external ffmpeg.
//!
//! # Usage
//!
//! ```bash
//! scrubcut frames --input clip.mp4
//! scrubcut edit --input clip.mp4 --scrub 120 --step cut --step speed --step watermark=logo.png
//! scrubcut slideshow --photo a.jpg --photo b.jpg --audio track.mp3
//! scrubcut timeline --offset 40 --current-time 5
//! scrubcut config --write scrubcut.toml
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use scrubcut::cli::{commands, Cli, Commands};
use scrubcut::config_initialization::initialize_configuration_hierarchy;
use scrubcut::utils::logging::init_logging;

/// Main entry point for the Scrubcut CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli).await?;
    init_logging(&config.logging.level, config.logging.json)?;
    debug!(scope = %config.storage.scope_dir.display(), "Configuration ready");

    // Execute the requested command
    match cli.command {
        Commands::Frames(args) => {
            info!("Executing frames command");
            commands::frames(config, args).await?;
        }
        Commands::Edit(args) => {
            info!("Executing edit command");
            commands::edit(config, args).await?;
        }
        Commands::Slideshow(args) => {
            info!("Executing slideshow command");
            commands::slideshow(config, args).await?;
        }
        Commands::Timeline(args) => commands::timeline(&config, args)?,
        Commands::Config(args) => commands::config(config, args).await?,
    }

    Ok(())
}
