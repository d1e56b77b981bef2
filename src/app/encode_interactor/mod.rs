// Encode interactor - Supervises a single encode job from probe to exit status

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::{build_job_args, render_command_line, EncoderProcess, EngineConfig, ProgressTracker};
use crate::ports::*;

/// Encoder output lines kept for failure diagnostics
const DIAGNOSTIC_TAIL_LINES: usize = 10;

/// Interactor for the encode use case
pub struct EncodeInteractor {
    engine: EngineConfig,
    probe_port: Arc<dyn ProbePort>,
    preset_provider: Arc<dyn PresetProvider>,
    parser: Arc<dyn DiagnosticParser>,
}

/// Job lifecycle bookkeeping
struct JobRun {
    state: JobState,
}

impl JobRun {
    fn new() -> Self {
        Self {
            state: JobState::NotStarted,
        }
    }

    fn enter(&mut self, next: JobState) -> Result<(), DomainError> {
        self.state = self.state.advance(next)?;
        debug!(state = ?self.state, "Job state changed");
        Ok(())
    }
}

impl EncodeInteractor {
    /// Create new encode interactor with injected ports
    pub fn new(
        engine: EngineConfig,
        probe_port: Arc<dyn ProbePort>,
        preset_provider: Arc<dyn PresetProvider>,
        parser: Arc<dyn DiagnosticParser>,
    ) -> Self {
        Self {
            engine,
            probe_port,
            preset_provider,
            parser,
        }
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Resolve caller selections into an immutable job. Absent keys take the
    /// configured defaults; unknown keys are a caller error.
    pub fn prepare(&self, request: &EncodeRequest) -> Result<EncodeJob, DomainError> {
        let (size, bitrate, format) = self.resolve_presets(request)?;
        let output = self.preset_provider.next_output_path(&format.extension)?;

        Ok(EncodeJob::new(
            request.input.clone(),
            size,
            bitrate,
            format,
            output,
        ))
    }

    /// Same resolution as [`prepare`](Self::prepare) without creating the
    /// output directory or reserving the output path
    pub fn preview(&self, request: &EncodeRequest) -> Result<EncodeJob, DomainError> {
        let (size, bitrate, format) = self.resolve_presets(request)?;
        let output = self.preset_provider.preview_output_path(&format.extension);

        Ok(EncodeJob::new(
            request.input.clone(),
            size,
            bitrate,
            format,
            output,
        ))
    }

    fn resolve_presets(
        &self,
        request: &EncodeRequest,
    ) -> Result<(SizePreset, BitratePreset, FormatPreset), DomainError> {
        let defaults = self.preset_provider.default_keys();

        let size_key = request.size_key.as_deref().unwrap_or(&defaults.size);
        let bitrate_key = request.bitrate_key.as_deref().unwrap_or(&defaults.bitrate);
        let format_key = request.format_key.as_deref().unwrap_or(&defaults.format);

        let size = self
            .preset_provider
            .size(size_key)
            .ok_or_else(|| DomainError::BadArgs(format!("Unknown size preset '{}'", size_key)))?;
        let bitrate = self.preset_provider.bitrate(bitrate_key).ok_or_else(|| {
            DomainError::BadArgs(format!("Unknown bitrate preset '{}'", bitrate_key))
        })?;
        let format = self.preset_provider.format(format_key).ok_or_else(|| {
            DomainError::BadArgs(format!("Unknown format preset '{}'", format_key))
        })?;

        Ok((size, bitrate, format))
    }

    /// Run a job to completion. Never fails: every fault is folded into the
    /// returned outcome.
    pub async fn encode(
        &self,
        job: EncodeJob,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> EncodeOutcome {
        let span = info_span!(
            "encode",
            input = %job.input().display(),
            output = %job.output().display()
        );

        async move {
            let mut run = JobRun::new();
            let outcome = match self.run(&job, sink, cancel, &mut run).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Encode supervisor fault: {}", e);
                    EncodeOutcome::io_error(e)
                }
            };

            if let Err(e) = run.enter(outcome.state()) {
                warn!("Unexpected terminal transition: {}", e);
            }

            match &outcome {
                EncodeOutcome::Succeeded { .. } => info!("{}", outcome.message()),
                EncodeOutcome::Failed { .. } => warn!("{}", outcome.message()),
                EncodeOutcome::Cancelled { .. } => info!("{}", outcome.message()),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        job: &EncodeJob,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
        run: &mut JobRun,
    ) -> Result<EncodeOutcome, DomainError> {
        if !job.input().is_file() {
            return Ok(EncodeOutcome::missing_input(job.input()));
        }

        let encoder = match self.engine.resolve_encoder() {
            Some(path) => path,
            None => return Ok(EncodeOutcome::missing_encoder(&self.engine.encoder_path)),
        };

        if let Some(parent) = job.output().parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    return Ok(EncodeOutcome::io_error(e));
                }
            }
        }

        if cancel.is_cancelled() {
            return Ok(EncodeOutcome::cancelled());
        }

        run.enter(JobState::Probing)?;
        let probe = tokio::select! {
            _ = cancel.cancelled() => return Ok(EncodeOutcome::cancelled()),
            probe = self.probe_best_effort(job.input(), sink) => probe,
        };
        if probe.has_duration() {
            sink.notify(&ProgressEvent::Duration {
                seconds: probe.duration_secs,
            });
        }

        run.enter(JobState::Building)?;
        let args = build_job_args(job);
        info!(command = %render_command_line(&encoder, &args), "Starting encoder");

        run.enter(JobState::Running)?;
        let mut process = match EncoderProcess::spawn(&encoder, &args) {
            Ok(process) => process,
            Err(e) => return Ok(EncodeOutcome::io_error(e)),
        };
        sink.notify(&ProgressEvent::Started);

        let tracker = ProgressTracker::new(
            Arc::clone(&self.parser),
            probe.duration_secs,
            &job.format().name,
        );
        let mut tail: VecDeque<String> = VecDeque::with_capacity(DIAGNOSTIC_TAIL_LINES);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(Self::cancel_process(&mut process).await);
                }
                line = process.next_line() => match line {
                    Some(line) => {
                        if let Some(event) = tracker.observe(&line) {
                            sink.notify(&event);
                        }
                        if tail.len() == DIAGNOSTIC_TAIL_LINES {
                            tail.pop_front();
                        }
                        tail.push_back(line);
                    }
                    None => break,
                }
            }
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Ok(Self::cancel_process(&mut process).await);
            }
            status = process.wait() => status,
        };

        let outcome = match status {
            Ok(status) if status.success() => {
                sink.notify(&ProgressEvent::Completed);
                EncodeOutcome::succeeded(job)
            }
            Ok(status) => match status.code() {
                Some(code) => EncodeOutcome::exit_code(code),
                None => EncodeOutcome::terminated(),
            },
            Err(e) => EncodeOutcome::io_error(e),
        };

        if !outcome.is_success() && !tail.is_empty() {
            let diagnostics: Vec<&str> = tail.iter().map(String::as_str).collect();
            warn!(tail = ?diagnostics, "Encoder output before failure");
        }

        Ok(outcome)
    }

    /// Probe, degrading to an undetermined result with a warning
    async fn probe_best_effort(&self, input: &Path, sink: &dyn ProgressSink) -> ProbeResult {
        match self.probe_port.probe(input).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Probe failed, continuing without duration: {}", e);
                sink.notify(&ProgressEvent::Warning {
                    message: format!("Could not determine video duration: {}", e),
                });
                ProbeResult::undetermined()
            }
        }
    }

    async fn cancel_process(process: &mut EncoderProcess) -> EncodeOutcome {
        info!(pid = ?process.id(), "Cancelling encoder");
        if let Err(e) = process.kill().await {
            warn!("Failed to terminate encoder: {}", e);
        }
        EncodeOutcome::cancelled()
    }
}
