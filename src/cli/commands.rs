//! Command implementations

use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::{AppContainer, DefaultAppContainer, ReportFormat};
use crate::cli::args::{DryRunArgs, EncodeArgs, InitConfigArgs, PresetArgs, PresetsArgs, ProbeArgs};
use crate::domain::model::{EncodeOutcome, EncodeRequest};
use crate::engine::{build_job_args, render_command_line, ConsoleProgressSink, JsonProgressSink, NoOpProgressSink};
use crate::ports::ProgressSink;

fn request_for(input: &Path, presets: &PresetArgs) -> EncodeRequest {
    EncodeRequest {
        input: input.to_path_buf(),
        size_key: presets.size.clone(),
        bitrate_key: presets.bitrate.clone(),
        format_key: presets.format.clone(),
    }
}

/// Execute the encode command. Returns `false` if any job did not succeed.
pub async fn encode(container: &DefaultAppContainer, args: EncodeArgs) -> Result<bool> {
    let interactor = container.encode_interactor();

    let sink: Box<dyn ProgressSink> = if args.json {
        Box::new(JsonProgressSink::new())
    } else if args.quiet {
        Box::new(NoOpProgressSink)
    } else {
        Box::new(ConsoleProgressSink::new())
    };

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling encode");
            signal_token.cancel();
        }
    });

    let total = args.inputs.len();
    let mut all_succeeded = true;

    for (index, input) in args.inputs.iter().enumerate() {
        if cancel.is_cancelled() {
            all_succeeded = false;
            break;
        }

        let job = interactor
            .prepare(&request_for(input, &args.presets))
            .with_context(|| format!("Cannot prepare job for {}", input.display()))?;

        info!(
            "Job {}/{}: {} -> {} ({}, {}, {})",
            index + 1,
            total,
            job.input().display(),
            job.output().display(),
            job.format().name,
            job.size().name,
            job.bitrate().name
        );

        let outcome = interactor.encode(job, sink.as_ref(), &cancel).await;
        report_outcome(&outcome, &args)?;

        if !outcome.is_success() {
            all_succeeded = false;
        }
    }

    signal_task.abort();
    Ok(all_succeeded)
}

fn report_outcome(outcome: &EncodeOutcome, args: &EncodeArgs) -> Result<()> {
    if args.json {
        let json = serde_json::to_string(outcome).context("Failed to serialize outcome")?;
        println!("{}", json);
        return Ok(());
    }

    if !args.quiet {
        // Finish the in-place progress line
        println!();
    }

    if outcome.is_success() {
        println!("{}", outcome.message());
    } else {
        eprintln!("{}", outcome.message());
    }
    Ok(())
}

/// Execute the probe command
pub async fn probe(container: &DefaultAppContainer, args: ProbeArgs) -> Result<()> {
    let format: ReportFormat = args.format.parse()?;
    let report = container
        .inspect_interactor()
        .inspect(&args.input, format)
        .await
        .with_context(|| format!("Failed to inspect {}", args.input.display()))?;

    println!("{}", report.summary);
    Ok(())
}

/// Execute the presets command
pub fn presets(container: &DefaultAppContainer, args: PresetsArgs) -> Result<()> {
    let catalog = container.catalog();

    if args.json {
        let json = serde_json::to_string_pretty(catalog)
            .context("Failed to serialize presets to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    let defaults = container.preset_provider().default_keys();
    let marker = |key: &str, default: &str| if key == default { " (default)" } else { "" };

    println!("Format presets:");
    for preset in catalog.formats() {
        println!(
            "  {}. {}{}",
            preset.key,
            preset.name,
            marker(&preset.key, &defaults.format)
        );
    }

    println!("Size presets:");
    for preset in catalog.sizes() {
        println!(
            "  {}. {}{}",
            preset.key,
            preset.name,
            marker(&preset.key, &defaults.size)
        );
    }

    println!("Bitrate presets:");
    for preset in catalog.bitrates() {
        println!(
            "  {}. {}{}",
            preset.key,
            preset.name,
            marker(&preset.key, &defaults.bitrate)
        );
    }

    Ok(())
}

/// Execute the dry-run command
pub fn dry_run(container: &DefaultAppContainer, args: DryRunArgs) -> Result<()> {
    let interactor = container.encode_interactor();
    let job = interactor
        .preview(&request_for(&args.input, &args.presets))
        .with_context(|| format!("Cannot prepare job for {}", args.input.display()))?;

    let engine = interactor.engine();
    let encoder = engine
        .resolve_encoder()
        .unwrap_or_else(|| engine.encoder_path.clone());

    println!("{}", render_command_line(&encoder, &build_job_args(&job)));
    Ok(())
}

/// Execute the init-config command
pub fn init_config(path: &Path, args: InitConfigArgs) -> Result<()> {
    if path.exists() && !args.force {
        bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    AppConfig::default()
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
