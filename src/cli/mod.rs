//! CLI module for towebm
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

pub use args::{DryRunArgs, EncodeArgs, InitConfigArgs, PresetsArgs, ProbeArgs};

/// towebm video encoder
///
/// Converts videos to MP4 (H.264) or WebM (VP9) by driving ffmpeg, with
/// size, bitrate and format presets and live progress.
#[derive(Parser, Debug)]
#[command(name = "towebm")]
#[command(about = "towebm - Convert videos to MP4 or WebM with ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the per-user config location)
    #[arg(long, global = true, env = "TOWEBM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the ffmpeg binary, or a program name to look up on PATH
    #[arg(long, global = true)]
    pub encoder: Option<PathBuf>,

    /// Directory where encoded files are written
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode one or more video files
    Encode(EncodeArgs),
    /// Show duration and dimensions of a video file
    Probe(ProbeArgs),
    /// List the available presets
    Presets(PresetsArgs),
    /// Print the ffmpeg command that would be run, without running it
    DryRun(DryRunArgs),
    /// Write a configuration file with default values
    InitConfig(InitConfigArgs),
}
