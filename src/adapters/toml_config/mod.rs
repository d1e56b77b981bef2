// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::catalog::{PresetCatalog, DEFAULT_KEY};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::engine::{encoder_file_name, EngineConfig, DEFAULT_PROBE_TIMEOUT_SECS};
use crate::error::{EncodeError, EncodeResult};
use crate::ports::*;
use crate::utils::logging::{LogFormat, LogLevel, LoggingConfig};
use crate::utils::path::OutputNamer;

/// Application settings, stored under the `[towebm]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub encoder_path: PathBuf,
    pub output_directory: PathBuf,
    pub output_filename_template: String,
    pub default_format: String,
    pub default_size: String,
    pub default_bitrate: String,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub probe_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            encoder_path: Path::new("ffmpeg").join("bin").join(encoder_file_name()),
            output_directory: PathBuf::from("output"),
            output_filename_template: "output-{timestamp}".to_string(),
            default_format: DEFAULT_KEY.to_string(),
            default_size: DEFAULT_KEY.to_string(),
            default_bitrate: DEFAULT_KEY.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Compact,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    towebm: AppConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> EncodeResult<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.towebm)
    }

    pub fn to_toml_string(&self) -> EncodeResult<String> {
        let file = ConfigFile {
            towebm: self.clone(),
        };
        toml::to_string_pretty(&file).map_err(|e| EncodeError::Config {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> EncodeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EncodeError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write configuration to a TOML file, creating parent directories
    pub fn save(&self, path: &Path) -> EncodeResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_toml_string()?)?;
        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Get default config file path
    pub fn default_config_path() -> PathBuf {
        // On Windows, use %APPDATA%/towebm/config.toml
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("towebm").join("config.toml");
        }
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("towebm").join("config.toml");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("towebm")
                .join("config.toml");
        }
        // Fallback to current directory
        PathBuf::from("towebm.toml")
    }

    /// Anchor relative paths at `base`. Bare encoder names are left alone so
    /// they can be looked up on PATH.
    pub fn resolve_relative_paths(mut self, base: &Path) -> Self {
        self.encoder_path = anchor_encoder_path(&self.encoder_path, base);
        self.output_directory = anchor_path(&self.output_directory, base);
        self
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(&self.encoder_path)
            .with_probe_timeout(Duration::from_secs(self.probe_timeout_secs.max(1)))
    }

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level,
            format: self.log_format,
            ..LoggingConfig::default()
        }
    }
}

/// `path` joined onto `base` when relative
pub fn anchor_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Like [`anchor_path`], except a bare program name stays as-is for PATH lookup
pub fn anchor_encoder_path(path: &Path, base: &Path) -> PathBuf {
    if path.components().count() > 1 {
        anchor_path(path, base)
    } else {
        path.to_path_buf()
    }
}

/// Directory holding the running executable, where the bundled encoder and
/// default output folder live
pub fn install_root() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// TOML-backed preset and output-path provider
pub struct TomlConfigAdapter {
    config: AppConfig,
    catalog: PresetCatalog,
    namer: OutputNamer,
}

impl TomlConfigAdapter {
    /// Create new TOML config adapter, validating the configured defaults
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        let catalog = PresetCatalog::builtin()?;

        if catalog.size(&config.default_size).is_none() {
            return Err(DomainError::ConfigError(format!(
                "default_size '{}' is not a known size preset",
                config.default_size
            )));
        }
        if catalog.bitrate(&config.default_bitrate).is_none() {
            return Err(DomainError::ConfigError(format!(
                "default_bitrate '{}' is not a known bitrate preset",
                config.default_bitrate
            )));
        }
        if catalog.format(&config.default_format).is_none() {
            return Err(DomainError::ConfigError(format!(
                "default_format '{}' is not a known format preset",
                config.default_format
            )));
        }

        let namer = OutputNamer::new(&config.output_directory, &config.output_filename_template)?;

        Ok(Self {
            config,
            catalog,
            namer,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }
}

impl PresetProvider for TomlConfigAdapter {
    fn size(&self, key: &str) -> Option<SizePreset> {
        self.catalog.size(key).cloned()
    }

    fn bitrate(&self, key: &str) -> Option<BitratePreset> {
        self.catalog.bitrate(key).cloned()
    }

    fn format(&self, key: &str) -> Option<FormatPreset> {
        self.catalog.format(key).cloned()
    }

    fn default_keys(&self) -> DefaultKeys {
        DefaultKeys {
            size: self.config.default_size.clone(),
            bitrate: self.config.default_bitrate.clone(),
            format: self.config.default_format.clone(),
        }
    }

    fn next_output_path(&self, extension: &str) -> Result<PathBuf, DomainError> {
        Ok(self.namer.next_path(extension)?)
    }

    fn preview_output_path(&self, extension: &str) -> PathBuf {
        self.namer.preview_path(extension)
    }
}
