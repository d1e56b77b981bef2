//! Output path naming

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::{EncodeError, EncodeResult};
use crate::utils::time::timestamp_token;

/// Placeholder replaced by the job timestamp
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Issues unique output paths from a file name template.
///
/// The template is rendered with the local time and the format extension is
/// appended. A path is never issued twice by the same namer, and a path that
/// already exists on disk is skipped by appending `-1`, `-2`, ...
#[derive(Debug)]
pub struct OutputNamer {
    directory: PathBuf,
    template: String,
    issued: Mutex<HashSet<PathBuf>>,
}

impl OutputNamer {
    pub fn new<P: Into<PathBuf>>(directory: P, template: &str) -> EncodeResult<Self> {
        let template = template.trim();
        if template.is_empty() {
            return Err(EncodeError::Config {
                message: "Output filename template is empty".to_string(),
            });
        }
        if template.contains(['/', '\\']) {
            return Err(EncodeError::Config {
                message: format!(
                    "Output filename template must not contain path separators: {}",
                    template
                ),
            });
        }

        Ok(Self {
            directory: directory.into(),
            template: template.to_string(),
            issued: Mutex::new(HashSet::new()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Create the output directory. Idempotent.
    pub fn ensure_directory(&self) -> EncodeResult<()> {
        std::fs::create_dir_all(&self.directory).map_err(|e| EncodeError::OutputError {
            message: format!(
                "Cannot create output directory {}: {}",
                self.directory.display(),
                e
            ),
        })
    }

    /// File stem for a given timestamp
    pub fn render_stem(&self, timestamp: &str) -> String {
        self.template.replace(TIMESTAMP_PLACEHOLDER, timestamp)
    }

    /// Next output path for the current local time
    pub fn next_path(&self, extension: &str) -> EncodeResult<PathBuf> {
        self.next_path_at(&Local::now(), extension)
    }

    pub fn next_path_at(&self, at: &DateTime<Local>, extension: &str) -> EncodeResult<PathBuf> {
        self.ensure_directory()?;

        let mut issued = self.issued.lock().map_err(|_| EncodeError::OutputError {
            message: "Output path registry is poisoned".to_string(),
        })?;

        let candidate = self.first_free(&issued, at, extension);
        debug!(path = %candidate.display(), "Issued output path");
        issued.insert(candidate.clone());
        Ok(candidate)
    }

    /// Path `next_path` would issue now. Touches nothing on disk and
    /// reserves nothing.
    pub fn preview_path(&self, extension: &str) -> PathBuf {
        self.preview_path_at(&Local::now(), extension)
    }

    pub fn preview_path_at(&self, at: &DateTime<Local>, extension: &str) -> PathBuf {
        let issued = self.issued.lock().unwrap_or_else(PoisonError::into_inner);
        self.first_free(&issued, at, extension)
    }

    fn first_free(
        &self,
        issued: &HashSet<PathBuf>,
        at: &DateTime<Local>,
        extension: &str,
    ) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        let stem = self.render_stem(&timestamp_token(at));

        let mut candidate = self.directory.join(format!("{}.{}", stem, extension));
        let mut suffix = 1u32;
        while candidate.exists() || issued.contains(&candidate) {
            candidate = self
                .directory
                .join(format!("{}-{}.{}", stem, suffix, extension));
            suffix += 1;
        }
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(secs: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 10, 20, secs).unwrap()
    }

    #[test]
    fn test_renders_default_template() {
        let dir = TempDir::new().unwrap();
        let namer = OutputNamer::new(dir.path(), "output-{timestamp}").unwrap();
        let path = namer.next_path_at(&at(30), "webm").unwrap();
        assert_eq!(path, dir.path().join("output-240501-102030.webm"));
    }

    #[test]
    fn test_different_timestamps_never_collide() {
        let dir = TempDir::new().unwrap();
        let namer = OutputNamer::new(dir.path(), "output-{timestamp}").unwrap();
        let first = namer.next_path_at(&at(1), "mp4").unwrap();
        let second = namer.next_path_at(&at(2), "mp4").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_same_second_gets_suffix() {
        let dir = TempDir::new().unwrap();
        let namer = OutputNamer::new(dir.path(), "output-{timestamp}").unwrap();
        let first = namer.next_path_at(&at(5), "mp4").unwrap();
        let second = namer.next_path_at(&at(5), "mp4").unwrap();
        assert_eq!(first, dir.path().join("output-240501-102005.mp4"));
        assert_eq!(second, dir.path().join("output-240501-102005-1.mp4"));
    }

    #[test]
    fn test_existing_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("clip.webm"), b"old").unwrap();
        let namer = OutputNamer::new(dir.path(), "clip").unwrap();
        let path = namer.next_path_at(&at(0), ".webm").unwrap();
        assert_eq!(path, dir.path().join("clip-1.webm"));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let namer = OutputNamer::new(&nested, "output-{timestamp}").unwrap();
        namer.next_path_at(&at(0), "mp4").unwrap();
        assert!(nested.is_dir());
        namer.ensure_directory().unwrap();
    }

    #[test]
    fn test_preview_has_no_side_effects() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out");
        let namer = OutputNamer::new(&nested, "output-{timestamp}").unwrap();

        let preview = namer.preview_path_at(&at(9), "webm");
        assert_eq!(preview, nested.join("output-240501-102009.webm"));
        assert!(!nested.exists());

        // Nothing was reserved, so the real call gets the same path
        assert_eq!(namer.next_path_at(&at(9), "webm").unwrap(), preview);
        assert_eq!(
            namer.preview_path_at(&at(9), "webm"),
            nested.join("output-240501-102009-1.webm")
        );
    }

    #[test]
    fn test_rejects_bad_templates() {
        assert!(OutputNamer::new("out", "  ").is_err());
        assert!(OutputNamer::new("out", "../escape-{timestamp}").is_err());
    }
}
