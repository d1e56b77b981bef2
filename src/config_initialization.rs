//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::adapters::toml_config::{anchor_encoder_path, anchor_path, install_root, AppConfig};
use crate::cli::Cli;
use crate::utils::logging::{LogFormat, LogLevel};

/// Configuration file to read: `--config` / `TOWEBM_CONFIG`, else the
/// per-user default location
pub fn config_file_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(AppConfig::default_config_path)
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    // Step 1: Defaults, replaced by the file when one is present
    let path = config_file_path(cli);
    let config = if path.exists() {
        AppConfig::load(&path)?
    } else if cli.config.is_some() {
        return Err(anyhow!("Configuration file not found: {}", path.display()));
    } else {
        AppConfig::default()
    };

    // Relative paths from the file are anchored at the install directory
    let config = config.resolve_relative_paths(&install_root());

    // Overrides are typed by the user, so they are relative to the working directory
    let working_dir = std::env::current_dir().context("Cannot determine working directory")?;

    // Step 2: Override with environment variables
    let config = apply_environment_overrides(config, |key| std::env::var(key).ok(), &working_dir)?;

    // Step 3: Override with CLI arguments
    apply_cli_overrides(config, cli, &working_dir)
}

/// Apply `TOWEBM_*` overrides using the given variable lookup. Relative
/// paths are resolved against `base`.
pub fn apply_environment_overrides<F>(
    mut config: AppConfig,
    lookup: F,
    base: &Path,
) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_overrides = 0;

    if let Some(value) = lookup("TOWEBM_ENCODER_PATH") {
        config.encoder_path = anchor_encoder_path(Path::new(&value), base);
        env_overrides += 1;
    }
    if let Some(value) = lookup("TOWEBM_OUTPUT_DIR") {
        config.output_directory = anchor_path(Path::new(&value), base);
        env_overrides += 1;
    }
    if let Some(value) = lookup("TOWEBM_LOG_LEVEL") {
        config.log_level = parse_level(&value).context("TOWEBM_LOG_LEVEL")?;
        env_overrides += 1;
    }

    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }
    Ok(config)
}

/// Apply CLI argument overrides to configuration. Relative paths are
/// resolved against `base`.
pub fn apply_cli_overrides(mut config: AppConfig, cli: &Cli, base: &Path) -> Result<AppConfig> {
    if let Some(encoder) = &cli.encoder {
        config.encoder_path = anchor_encoder_path(encoder, base);
    }
    if let Some(dir) = &cli.output_dir {
        config.output_directory = anchor_path(dir, base);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = parse_level(level).context("--log-level")?;
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format
            .parse::<LogFormat>()
            .map_err(|e| anyhow!(e))
            .context("--log-format")?;
    }
    Ok(config)
}

fn parse_level(value: &str) -> Result<LogLevel> {
    value.parse::<LogLevel>().map_err(|e| anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::ffi::OsStr;
    use tempfile::TempDir;

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TOWEBM_ENCODER_PATH", "/usr/local/bin/ffmpeg"),
            ("TOWEBM_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let config = apply_environment_overrides(
            AppConfig::default(),
            |key| vars.get(key).map(|v| v.to_string()),
            Path::new("/work"),
        )
        .unwrap();

        assert_eq!(config.encoder_path, PathBuf::from("/usr/local/bin/ffmpeg"));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.output_directory, PathBuf::from("output"));
    }

    #[test]
    fn test_invalid_environment_level() {
        let result = apply_environment_overrides(
            AppConfig::default(),
            |key| (key == "TOWEBM_LOG_LEVEL").then(|| "loud".to_string()),
            Path::new("/work"),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_win_over_environment() {
        let cli = Cli::parse_from([
            "towebm",
            "--encoder",
            "ffmpeg",
            "--log-level",
            "warn",
            "presets",
        ]);
        let config = apply_environment_overrides(
            AppConfig::default(),
            |key| (key == "TOWEBM_ENCODER_PATH").then(|| "/env/ffmpeg".to_string()),
            Path::new("/work"),
        )
        .unwrap();
        let config = apply_cli_overrides(config, &cli, Path::new("/work")).unwrap();

        assert_eq!(config.encoder_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_relative_overrides_resolve_against_base() {
        let cli = Cli::parse_from([
            "towebm",
            "--output-dir",
            "out",
            "--encoder",
            "./tools/ffmpeg",
            "presets",
        ]);
        let base = Path::new("/work");
        let config = apply_cli_overrides(AppConfig::default(), &cli, base).unwrap();

        assert_eq!(config.output_directory, base.join("out"));
        assert_eq!(config.encoder_path, base.join("./tools/ffmpeg"));

        let config = apply_environment_overrides(
            AppConfig::default(),
            |key| (key == "TOWEBM_OUTPUT_DIR").then(|| "clips".to_string()),
            base,
        )
        .unwrap();
        assert_eq!(config.output_directory, base.join("clips"));
    }

    #[test]
    fn test_relative_output_dir_flag_uses_working_directory() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[towebm]\noutput_directory = \"from-file\"\n").unwrap();

        let cli = Cli::parse_from([
            OsStr::new("towebm"),
            OsStr::new("--config"),
            config_path.as_os_str(),
            OsStr::new("--output-dir"),
            OsStr::new("out"),
            OsStr::new("presets"),
        ]);
        let config = initialize_configuration_hierarchy(&cli).unwrap();

        let working_dir = std::env::current_dir().unwrap();
        assert_eq!(config.output_directory, working_dir.join("out"));
    }

    #[test]
    fn test_relative_file_paths_use_install_root() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[towebm]\noutput_directory = \"from-file\"\n").unwrap();

        let cli = Cli::parse_from([
            OsStr::new("towebm"),
            OsStr::new("--config"),
            config_path.as_os_str(),
            OsStr::new("presets"),
        ]);
        let config = initialize_configuration_hierarchy(&cli).unwrap();

        if std::env::var_os("TOWEBM_OUTPUT_DIR").is_none() {
            assert_eq!(config.output_directory, install_root().join("from-file"));
        }
    }

    #[test]
    fn test_explicit_missing_config_file_is_an_error() {
        let cli = Cli::parse_from([
            "towebm",
            "--config",
            "/nonexistent/towebm/config.toml",
            "presets",
        ]);
        assert!(initialize_configuration_hierarchy(&cli).is_err());
    }
}
