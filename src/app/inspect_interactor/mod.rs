// Inspect interactor - Reports probed duration and dimensions of a media file

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::time::{format_clock, format_minutes_seconds};

/// Report layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
    Yaml,
}

impl FromStr for ReportFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "yaml" => Ok(ReportFormat::Yaml),
            other => Err(DomainError::BadArgs(format!(
                "Unknown report format '{}'. Supported: text, json, yaml",
                other
            ))),
        }
    }
}

/// Inspection result
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub input: PathBuf,
    pub probe: ProbeResult,
    /// Rendered in the requested format
    #[serde(skip)]
    pub summary: String,
}

/// Interactor for media file inspection use case
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl InspectInteractor {
    /// Create new inspect interactor with injected ports
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Execute media file inspection
    pub async fn inspect(
        &self,
        input: &Path,
        format: ReportFormat,
    ) -> Result<InspectReport, DomainError> {
        if !input.is_file() {
            return Err(DomainError::FileNotFound(input.display().to_string()));
        }

        info!("Inspecting {}", input.display());
        let probe = self.probe_port.probe(input).await?;

        let mut report = InspectReport {
            input: input.to_path_buf(),
            probe,
            summary: String::new(),
        };
        report.summary = match format {
            ReportFormat::Text => format_as_text(&report),
            ReportFormat::Json => serde_json::to_string_pretty(&report).map_err(|e| {
                DomainError::ProcessingError(format!("JSON serialization failed: {}", e))
            })?,
            ReportFormat::Yaml => serde_yaml::to_string(&report).map_err(|e| {
                DomainError::ProcessingError(format!("YAML serialization failed: {}", e))
            })?,
        };

        Ok(report)
    }
}

fn format_as_text(report: &InspectReport) -> String {
    let mut lines = vec![format!("File: {}", report.input.display())];

    if report.probe.has_duration() {
        lines.push(format!(
            "Video duration: {} ({})",
            format_minutes_seconds(report.probe.duration_secs),
            format_clock(report.probe.duration_secs)
        ));
    } else {
        lines.push("Video duration: unknown".to_string());
    }

    match report.probe.dimensions {
        Some(dims) => lines.push(format!("Video dimensions: {}", dims)),
        None => lines.push("Video dimensions: unknown".to_string()),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedProbe(ProbeResult);

    #[async_trait]
    impl ProbePort for FixedProbe {
        async fn probe(&self, _input: &Path) -> Result<ProbeResult, DomainError> {
            Ok(self.0)
        }
    }

    fn interactor(result: ProbeResult) -> InspectInteractor {
        InspectInteractor::new(Arc::new(FixedProbe(result)))
    }

    #[tokio::test]
    async fn test_text_report() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"data").unwrap();

        let report = interactor(ProbeResult {
            duration_secs: 90.5,
            dimensions: Some(Dimensions {
                width: 1280,
                height: 720,
            }),
        })
        .inspect(&input, ReportFormat::Text)
        .await
        .unwrap();

        assert!(report.summary.contains("Video duration: 1m 30s (00:01:30.50)"));
        assert!(report.summary.contains("Video dimensions: 1280x720"));
    }

    #[tokio::test]
    async fn test_json_report() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"data").unwrap();

        let report = interactor(ProbeResult::undetermined())
            .inspect(&input, ReportFormat::Json)
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&report.summary).unwrap();
        assert_eq!(value["probe"]["duration_secs"], 0.0);
        assert!(value["probe"]["dimensions"].is_null());
    }

    #[tokio::test]
    async fn test_yaml_report() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("clip.mp4");
        std::fs::write(&input, b"data").unwrap();

        let report = interactor(ProbeResult {
            duration_secs: 12.0,
            dimensions: None,
        })
        .inspect(&input, ReportFormat::Yaml)
        .await
        .unwrap();

        assert!(report.summary.contains("duration_secs: 12.0"));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let result = interactor(ProbeResult::undetermined())
            .inspect(Path::new("/nonexistent/clip.mp4"), ReportFormat::Text)
            .await;
        assert!(matches!(result, Err(DomainError::FileNotFound(_))));
    }

    #[test]
    fn test_report_format_parse() {
        assert_eq!("JSON".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
