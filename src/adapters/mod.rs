// Adapters - External system implementations

pub mod probe_ffmpeg;
pub mod toml_config;

// Re-export adapters
pub use probe_ffmpeg::FfmpegProbeAdapter;
pub use toml_config::{AppConfig, TomlConfigAdapter};
