// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::utils::time::format_minutes_seconds;


/// How the output frame size relates to the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeTransform {
    /// Keep the source resolution
    Original,
    /// Constrain width to N pixels, height follows the aspect ratio
    ConstrainWidth { pixels: u32 },
    /// Constrain height to N pixels, width follows the aspect ratio
    ConstrainHeight { pixels: u32 },
    /// Legacy fixed `WxH` resolution, kept for old configurations only
    Fixed { width: u32, height: u32 },
}

impl SizeTransform {
    /// Parse the catalog value form: `original`, `W:-1`, `-1:H` or legacy `WxH`
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();

        if trimmed.eq_ignore_ascii_case("original") {
            return Ok(SizeTransform::Original);
        }

        if let Some((left, right)) = trimmed.split_once(':') {
            return match (left.trim(), right.trim()) {
                ("-1", "-1") => Err(DomainError::BadArgs(format!(
                    "Size value '{}' leaves both axes unconstrained",
                    value
                ))),
                (w, "-1") => Ok(SizeTransform::ConstrainWidth {
                    pixels: parse_pixels(w, value)?,
                }),
                ("-1", h) => Ok(SizeTransform::ConstrainHeight {
                    pixels: parse_pixels(h, value)?,
                }),
                _ => Err(DomainError::BadArgs(format!(
                    "Size value '{}' must leave one axis free (-1)",
                    value
                ))),
            };
        }

        if let Some((w, h)) = trimmed.split_once(['x', 'X']) {
            return Ok(SizeTransform::Fixed {
                width: parse_pixels(w.trim(), value)?,
                height: parse_pixels(h.trim(), value)?,
            });
        }

        Err(DomainError::BadArgs(format!("Unrecognised size value '{}'", value)))
    }

    /// Scale filter expression for aspect-preserving transforms
    pub fn scale_filter(&self) -> Option<String> {
        match self {
            SizeTransform::ConstrainWidth { pixels } => Some(format!(
                "scale={}:-1:force_original_aspect_ratio=decrease",
                pixels
            )),
            SizeTransform::ConstrainHeight { pixels } => Some(format!(
                "scale=-1:{}:force_original_aspect_ratio=decrease",
                pixels
            )),
            SizeTransform::Original | SizeTransform::Fixed { .. } => None,
        }
    }
}

fn parse_pixels(part: &str, value: &str) -> Result<u32, DomainError> {
    match part.parse::<u32>() {
        Ok(pixels) if pixels > 0 => Ok(pixels),
        _ => Err(DomainError::BadArgs(format!(
            "Invalid pixel count '{}' in size value '{}'",
            part, value
        ))),
    }
}

impl fmt::Display for SizeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeTransform::Original => write!(f, "original"),
            SizeTransform::ConstrainWidth { pixels } => write!(f, "{}:-1", pixels),
            SizeTransform::ConstrainHeight { pixels } => write!(f, "-1:{}", pixels),
            SizeTransform::Fixed { width, height } => write!(f, "{}x{}", width, height),
        }
    }
}

/// Bitrate policy for the video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BitratePolicy {
    /// Encoder picks the bitrate for a fixed quality factor
    Quality,
    /// Explicit ceiling in bits per second, still paired with the quality factor
    Target { bits_per_second: u64 },
}

impl BitratePolicy {
    /// Parse `auto`, `2M`, `500k` or a plain number of bits per second
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("auto") {
            return Ok(BitratePolicy::Quality);
        }

        let (digits, multiplier) = match trimmed.chars().last() {
            Some('M') | Some('m') => (&trimmed[..trimmed.len() - 1], 1_000_000),
            Some('K') | Some('k') => (&trimmed[..trimmed.len() - 1], 1_000),
            _ => (trimmed, 1),
        };

        match digits.parse::<u64>().ok().filter(|n| *n > 0) {
            Some(n) => n
                .checked_mul(multiplier)
                .map(|bits_per_second| BitratePolicy::Target { bits_per_second })
                .ok_or_else(|| {
                    DomainError::BadArgs(format!("Bitrate value '{}' is out of range", value))
                }),
            None => Err(DomainError::BadArgs(format!("Invalid bitrate value '{}'", value))),
        }
    }

    /// Token passed to `-b:v`, absent for quality-driven encoding
    pub fn encoder_token(&self) -> Option<String> {
        match self {
            BitratePolicy::Quality => None,
            BitratePolicy::Target { bits_per_second } => Some(format_bitrate(*bits_per_second)),
        }
    }
}

fn format_bitrate(bits_per_second: u64) -> String {
    if bits_per_second % 1_000_000 == 0 {
        format!("{}M", bits_per_second / 1_000_000)
    } else if bits_per_second % 1_000 == 0 {
        format!("{}k", bits_per_second / 1_000)
    } else {
        bits_per_second.to_string()
    }
}

impl fmt::Display for BitratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoder_token() {
            Some(token) => write!(f, "{}", token),
            None => write!(f, "auto"),
        }
    }
}

/// Container family, which fixes audio codec, quality factor and muxer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFamily {
    Mp4,
    WebM,
}

impl ContainerFamily {
    /// CRF value used for every job in this family
    pub fn quality_factor(&self) -> u8 {
        match self {
            ContainerFamily::Mp4 => 23,
            ContainerFamily::WebM => 30,
        }
    }

    pub fn audio_codec(&self) -> &'static str {
        match self {
            ContainerFamily::Mp4 => "aac",
            ContainerFamily::WebM => "libvorbis",
        }
    }

    /// Muxer name given to `-f`
    pub fn muxer(&self) -> &'static str {
        match self {
            ContainerFamily::Mp4 => "mp4",
            ContainerFamily::WebM => "webm",
        }
    }
}

/// Size preset: one entry of the size axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizePreset {
    pub key: String,
    pub name: String,
    pub transform: SizeTransform,
}

impl SizePreset {
    pub fn new(key: &str, name: &str, transform: SizeTransform) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            transform,
        }
    }
}

/// Bitrate preset: one entry of the bitrate axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BitratePreset {
    pub key: String,
    pub name: String,
    pub policy: BitratePolicy,
}

impl BitratePreset {
    pub fn new(key: &str, name: &str, policy: BitratePolicy) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            policy,
        }
    }
}

/// Format preset: container, extension and video codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatPreset {
    pub key: String,
    pub name: String,
    pub extension: String,
    pub video_codec: String,
    pub family: ContainerFamily,
}

impl FormatPreset {
    pub fn new(
        key: &str,
        name: &str,
        extension: &str,
        video_codec: &str,
        family: ContainerFamily,
    ) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            extension: extension.to_string(),
            video_codec: video_codec.to_string(),
            family,
        }
    }
}

/// Caller selections before presets are resolved
#[derive(Debug, Clone, Default)]
pub struct EncodeRequest {
    pub input: PathBuf,
    pub size_key: Option<String>,
    pub bitrate_key: Option<String>,
    pub format_key: Option<String>,
}

impl EncodeRequest {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, key: impl Into<String>) -> Self {
        self.size_key = Some(key.into());
        self
    }

    pub fn with_bitrate(mut self, key: impl Into<String>) -> Self {
        self.bitrate_key = Some(key.into());
        self
    }

    pub fn with_format(mut self, key: impl Into<String>) -> Self {
        self.format_key = Some(key.into());
        self
    }
}

/// A fully resolved encode job. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    input: PathBuf,
    size: SizePreset,
    bitrate: BitratePreset,
    format: FormatPreset,
    output: PathBuf,
}

impl EncodeJob {
    pub fn new(
        input: PathBuf,
        size: SizePreset,
        bitrate: BitratePreset,
        format: FormatPreset,
        output: PathBuf,
    ) -> Self {
        Self {
            input,
            size,
            bitrate,
            format,
            output,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn size(&self) -> &SizePreset {
        &self.size
    }

    pub fn bitrate(&self) -> &BitratePreset {
        &self.bitrate
    }

    pub fn format(&self) -> &FormatPreset {
        &self.format
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Output file name without directories
    pub fn output_file_name(&self) -> String {
        self.output
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.output.to_string_lossy().to_string())
    }
}

/// Source frame dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of the metadata-only inspection pass
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Duration in seconds, 0 when undeterminable
    pub duration_secs: f64,
    pub dimensions: Option<Dimensions>,
}

impl ProbeResult {
    /// Nothing could be determined
    pub fn undetermined() -> Self {
        Self::default()
    }

    pub fn has_duration(&self) -> bool {
        self.duration_secs > 0.0
    }
}

/// Point-in-time status notification delivered to a progress sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Probed source duration
    Duration { seconds: f64 },
    /// Encoder process launched
    Started,
    /// Percentage complete, derived from a progress marker
    Percent { percent: u8, format: String },
    /// Progress marker seen but the duration is unknown
    Running { format: String },
    /// Encoder exited successfully
    Completed,
    /// Non-fatal problem, e.g. probe degradation
    Warning { message: String },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Duration { seconds } => {
                write!(f, "Video duration: {}", format_minutes_seconds(*seconds))
            }
            ProgressEvent::Started => write!(f, "Encoding started..."),
            ProgressEvent::Percent { percent, format } => {
                write!(f, "Progress: {}% - {} encoding", percent, format)
            }
            ProgressEvent::Running { format } => write!(f, "Encoding in progress... {}", format),
            ProgressEvent::Completed => write!(f, "Encoding complete"),
            ProgressEvent::Warning { message } => write!(f, "Warning: {}", message),
        }
    }
}

/// Lifecycle of a single encode job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    NotStarted,
    Probing,
    Building,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }

    /// Move to `next`, rejecting anything outside the job lifecycle
    pub fn advance(self, next: JobState) -> Result<JobState, DomainError> {
        use JobState::*;

        let allowed = match (self, next) {
            (NotStarted, Probing) => true,
            (Probing, Building) => true,
            (Building, Running) => true,
            (Running, Succeeded) => true,
            // Pre-flight checks and spawn errors fail before Running
            (from, Failed) => !from.is_terminal(),
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition(format!(
                "{:?} -> {:?}",
                self, next
            )))
        }
    }
}

/// Why a job failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureCause {
    MissingInput,
    MissingEncoder,
    /// Encoder exited with a nonzero code
    ExitCode(i32),
    /// Encoder was terminated without an exit code
    Terminated,
    /// Spawn or I/O fault
    Io,
}

/// Terminal result of an encode job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EncodeOutcome {
    Succeeded { output: PathBuf, message: String },
    Failed { cause: FailureCause, message: String },
    Cancelled { message: String },
}

impl EncodeOutcome {
    pub fn succeeded(job: &EncodeJob) -> Self {
        EncodeOutcome::Succeeded {
            output: job.output().to_path_buf(),
            message: format!("Encoding complete. Output file: {}", job.output_file_name()),
        }
    }

    pub fn missing_input(input: &Path) -> Self {
        EncodeOutcome::Failed {
            cause: FailureCause::MissingInput,
            message: format!("Input file not found: {}", input.display()),
        }
    }

    pub fn missing_encoder(encoder: &Path) -> Self {
        EncodeOutcome::Failed {
            cause: FailureCause::MissingEncoder,
            message: format!(
                "FFmpeg not found at: {}\nPlease run setup script ({})",
                encoder.display(),
                setup_script_name()
            ),
        }
    }

    pub fn exit_code(code: i32) -> Self {
        EncodeOutcome::Failed {
            cause: FailureCause::ExitCode(code),
            message: format!("Encoding failed with return code {}", code),
        }
    }

    pub fn terminated() -> Self {
        EncodeOutcome::Failed {
            cause: FailureCause::Terminated,
            message: "Encoding failed: encoder was terminated by a signal".to_string(),
        }
    }

    pub fn io_error(err: impl fmt::Display) -> Self {
        EncodeOutcome::Failed {
            cause: FailureCause::Io,
            message: format!("Error during encoding: {}", err),
        }
    }

    pub fn cancelled() -> Self {
        EncodeOutcome::Cancelled {
            message: "Encoding cancelled".to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, EncodeOutcome::Succeeded { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            EncodeOutcome::Succeeded { message, .. }
            | EncodeOutcome::Failed { message, .. }
            | EncodeOutcome::Cancelled { message } => message,
        }
    }

    /// Terminal job state matching this outcome
    pub fn state(&self) -> JobState {
        match self {
            EncodeOutcome::Succeeded { .. } => JobState::Succeeded,
            EncodeOutcome::Failed { .. } => JobState::Failed,
            EncodeOutcome::Cancelled { .. } => JobState::Cancelled,
        }
    }
}

impl fmt::Display for EncodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

fn setup_script_name() -> &'static str {
    if cfg!(windows) {
        "setup.bat"
    } else {
        "./setup.sh"
    }
}
