//! towebm video encoder
//!
//! A command-line front end that drives ffmpeg to convert videos to MP4 or
//! WebM with size and bitrate presets and live progress.
//!
//! # Usage
//!
//! ```bash
//! towebm encode clip.mov --format 2 --size 3
//! towebm probe clip.mov
//! towebm presets
//! towebm dry-run clip.mov --format 2 --bitrate 4
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use towebm_cli::cli::{commands, Cli, Commands};
use towebm_cli::config_initialization::{config_file_path, initialize_configuration_hierarchy};
use towebm_cli::utils::logging::{init_logging, LoggingConfig};
use towebm_cli::DefaultAppContainer;

/// Main entry point for the towebm CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // init-config must work even when the existing file is unreadable
    let config_path = config_file_path(&cli);
    if let Commands::InitConfig(args) = cli.command {
        init_logging(&LoggingConfig::default());
        return commands::init_config(&config_path, args);
    }

    let config = initialize_configuration_hierarchy(&cli)?;
    init_logging(&config.logging_config());
    debug!(?config, "Configuration resolved");

    let container = DefaultAppContainer::new(config)?;

    let succeeded = match cli.command {
        Commands::Encode(args) => {
            info!("Executing encode command");
            commands::encode(&container, args).await?
        }
        Commands::Probe(args) => {
            info!("Executing probe command");
            commands::probe(&container, args).await?;
            true
        }
        Commands::Presets(args) => {
            commands::presets(&container, args)?;
            true
        }
        Commands::DryRun(args) => {
            commands::dry_run(&container, args)?;
            true
        }
        Commands::InitConfig(_) => true,
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
