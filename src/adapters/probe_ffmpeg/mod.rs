//! FFmpeg probe adapter
//!
//! Runs the encoder in inspection mode (`ffmpeg -i <input>` with no output)
//! and reads duration and frame size from its diagnostic text.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::{EncoderProcess, EngineConfig};
use crate::ports::*;

/// ffmpeg-based probe adapter
pub struct FfmpegProbeAdapter {
    engine: EngineConfig,
    parser: Arc<dyn DiagnosticParser>,
}

impl FfmpegProbeAdapter {
    /// Create new ffmpeg probe adapter
    pub fn new(engine: EngineConfig, parser: Arc<dyn DiagnosticParser>) -> Self {
        Self { engine, parser }
    }

    async fn capture_output(&self, encoder: &Path, input: &Path) -> Result<String, DomainError> {
        let args = vec!["-i".to_string(), input.to_string_lossy().into_owned()];
        let mut process = EncoderProcess::spawn(encoder, &args)
            .map_err(|e| DomainError::ProbeFailed(e.to_string()))?;

        let collect = async {
            let mut text = String::new();
            while let Some(line) = process.next_line().await {
                text.push_str(&line);
                text.push('\n');
            }
            text
        };

        let captured = tokio::time::timeout(self.engine.probe_timeout, collect).await;
        let text = match captured {
            Ok(text) => text,
            Err(_) => {
                let _ = process.kill().await;
                return Err(DomainError::ProbeFailed(format!(
                    "inspection timed out after {}s",
                    self.engine.probe_timeout.as_secs()
                )));
            }
        };

        // Inspection mode always exits nonzero (no output file), so the status is ignored
        if let Err(e) = process.wait().await {
            debug!("Probe process wait failed: {}", e);
        }

        Ok(text)
    }
}

#[async_trait]
impl ProbePort for FfmpegProbeAdapter {
    async fn probe(&self, input: &Path) -> Result<ProbeResult, DomainError> {
        let encoder = self.engine.resolve_encoder().ok_or_else(|| {
            DomainError::EncoderMissing(self.engine.encoder_path.display().to_string())
        })?;

        let text = self.capture_output(&encoder, input).await?;
        let result = ProbeResult {
            duration_secs: self.parser.duration(&text),
            dimensions: self.parser.dimensions(&text),
        };

        if !result.has_duration() {
            warn!(input = %input.display(), "Could not determine video duration");
        }
        debug!(
            input = %input.display(),
            duration = result.duration_secs,
            dimensions = ?result.dimensions,
            "Probe finished"
        );

        Ok(result)
    }
}
