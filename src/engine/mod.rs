//! Encoder engine: command construction, process plumbing and progress parsing

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod command;
pub mod diagnostics;
pub mod process;
pub mod progress;

pub use command::{build_args, build_job_args, render_command_line};
pub use diagnostics::FfmpegTextParser;
pub use process::EncoderProcess;
pub use progress::{
    percent_complete, ChannelProgressSink, ConsoleProgressSink, JsonProgressSink,
    NoOpProgressSink, ProgressTracker,
};

/// Default probe timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;

/// Immutable engine settings shared by every job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Encoder binary: an explicit path, or a bare program name looked up on PATH
    pub encoder_path: PathBuf,
    /// Upper bound for the inspection pass
    pub probe_timeout: Duration,
}

impl EngineConfig {
    pub fn new<P: Into<PathBuf>>(encoder_path: P) -> Self {
        Self {
            encoder_path: encoder_path.into(),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Locate the encoder binary, `None` when it is not installed
    pub fn resolve_encoder(&self) -> Option<PathBuf> {
        if is_bare_program_name(&self.encoder_path) {
            return which::which(&self.encoder_path).ok();
        }

        if self.encoder_path.is_file() {
            Some(self.encoder_path.clone())
        } else {
            None
        }
    }
}

fn is_bare_program_name(path: &Path) -> bool {
    !path.is_absolute() && path.components().count() == 1
}

/// File name of the bundled encoder for this platform
pub fn encoder_file_name() -> &'static str {
    if cfg!(windows) {
        "ffmpeg.exe"
    } else {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::new(dir.path().join("ffmpeg").join("bin").join("ffmpeg"));
        assert_eq!(config.resolve_encoder(), None);
    }

    #[test]
    fn test_resolve_existing_explicit_path() {
        let dir = TempDir::new().unwrap();
        let encoder = dir.path().join(encoder_file_name());
        std::fs::write(&encoder, b"").unwrap();
        let config = EngineConfig::new(&encoder);
        assert_eq!(config.resolve_encoder(), Some(encoder));
    }

    #[test]
    fn test_directory_is_not_an_encoder() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::new(dir.path());
        assert_eq!(config.resolve_encoder(), None);
    }

    #[test]
    fn test_bare_program_name_detection() {
        assert!(is_bare_program_name(Path::new("ffmpeg")));
        assert!(!is_bare_program_name(Path::new("bin/ffmpeg")));
        assert!(!is_bare_program_name(Path::new("/usr/bin/ffmpeg")));
    }

    #[test]
    fn test_unknown_bare_name_is_not_resolved() {
        let config = EngineConfig::new("towebm-definitely-not-installed-encoder");
        assert_eq!(config.resolve_encoder(), None);
    }
}
