//! towebm CLI Library
//!
//! Drives an external ffmpeg binary to convert a video to MP4 (H.264) or
//! WebM (VP9) with size, bitrate and format presets, streaming progress to a
//! caller-supplied sink.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer, EncodeInteractor};
pub use domain::errors::DomainError;
pub use domain::model::{EncodeJob, EncodeOutcome, EncodeRequest, ProbeResult, ProgressEvent};
pub use error::{EncodeError, EncodeResult};
pub use ports::ProgressSink;
