// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for the metadata-only inspection pass
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a media file for duration and frame dimensions.
    ///
    /// Missing information is not an error: it comes back as a zero duration
    /// or absent dimensions. `Err` is reserved for the inspection itself
    /// failing to run (spawn error, timeout).
    async fn probe(&self, input: &Path) -> Result<ProbeResult, DomainError>;
}

/// Default preset key per axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultKeys {
    pub size: String,
    pub bitrate: String,
    pub format: String,
}

/// Port supplying presets and output locations
pub trait PresetProvider: Send + Sync {
    fn size(&self, key: &str) -> Option<SizePreset>;

    fn bitrate(&self, key: &str) -> Option<BitratePreset>;

    fn format(&self, key: &str) -> Option<FormatPreset>;

    fn default_keys(&self) -> DefaultKeys;

    /// Reserve a fresh output path for the given extension, creating the
    /// output directory if needed
    fn next_output_path(&self, extension: &str) -> Result<PathBuf, DomainError>;

    /// Output path a job would get right now, with no filesystem changes
    fn preview_output_path(&self, extension: &str) -> PathBuf;
}

/// Receiver of progress notifications. Fire-and-forget: implementations must
/// not block the caller.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn notify(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Narrow interface over the encoder's unstructured diagnostic text
pub trait DiagnosticParser: Send + Sync {
    /// Source duration in seconds from a `Duration:` line, 0 when absent
    fn duration(&self, text: &str) -> f64;

    /// Elapsed media time from a `time=` progress marker
    fn elapsed(&self, line: &str) -> Option<f64>;

    /// Frame dimensions from the first video stream line
    fn dimensions(&self, text: &str) -> Option<Dimensions>;
}
