//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Preset selections shared by encode and dry-run
#[derive(Args, Debug, Clone, Default)]
pub struct PresetArgs {
    /// Output format preset key (1 = MP4, 2 = WebM)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Size preset key (1 = original ... 5 = 360p)
    #[arg(short, long)]
    pub size: Option<String>,

    /// Bitrate preset key (1 = quality-based ... 4 = 500kbps)
    #[arg(short, long)]
    pub bitrate: Option<String>,
}

/// Arguments for the encode command
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Input video files, encoded one after another
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[command(flatten)]
    pub presets: PresetArgs,

    /// Emit progress and results as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    pub input: PathBuf,

    /// Report format (text, json, yaml)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Arguments for the presets command
#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the dry-run command
#[derive(Args, Debug)]
pub struct DryRunArgs {
    /// Input video file path
    pub input: PathBuf,

    #[command(flatten)]
    pub presets: PresetArgs,
}

/// Arguments for the init-config command
#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}
