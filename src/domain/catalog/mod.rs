// Preset catalog - Static tables for the size, bitrate and format axes

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// Default key used on every axis when nothing else is configured
pub const DEFAULT_KEY: &str = "1";

/// Lookup tables for the three preset axes
#[derive(Debug, Clone, Serialize)]
pub struct PresetCatalog {
    sizes: Vec<SizePreset>,
    bitrates: Vec<BitratePreset>,
    formats: Vec<FormatPreset>,
}

/// Size presets as (key, name, value)
const SIZE_TABLE: &[(&str, &str, &str)] = &[
    ("1", "Original", "original"),
    ("2", "HD (1280p max)", "1280:-1"),
    ("3", "SD (720p max)", "720:-1"),
    ("4", "Small (480p max)", "480:-1"),
    ("5", "Tiny (360p max)", "360:-1"),
];

/// Bitrate presets as (key, name, value)
const BITRATE_TABLE: &[(&str, &str, &str)] = &[
    ("1", "Auto (Quality-based)", "auto"),
    ("2", "High Quality (2Mbps)", "2M"),
    ("3", "Standard (1Mbps)", "1M"),
    ("4", "Low Quality (500kbps)", "500k"),
];

impl PresetCatalog {
    /// Built-in tables
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_tables(
            SIZE_TABLE,
            BITRATE_TABLE,
            vec![
                FormatPreset::new("1", "MP4 (H.264)", "mp4", "libx264", ContainerFamily::Mp4),
                FormatPreset::new(
                    "2",
                    "WebM (VP9)",
                    "webm",
                    "libvpx-vp9",
                    ContainerFamily::WebM,
                ),
            ],
        )
    }

    /// Build a catalog from textual size and bitrate values, rejecting any
    /// value the parsers do not accept
    pub fn from_tables(
        sizes: &[(&str, &str, &str)],
        bitrates: &[(&str, &str, &str)],
        formats: Vec<FormatPreset>,
    ) -> Result<Self, DomainError> {
        let sizes = sizes
            .iter()
            .map(|(key, name, value)| {
                Ok(SizePreset::new(key, name, SizeTransform::parse(value)?))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        let bitrates = bitrates
            .iter()
            .map(|(key, name, value)| {
                Ok(BitratePreset::new(key, name, BitratePolicy::parse(value)?))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Self {
            sizes,
            bitrates,
            formats,
        })
    }

    pub fn size(&self, key: &str) -> Option<&SizePreset> {
        self.sizes.iter().find(|p| p.key == key.trim())
    }

    pub fn bitrate(&self, key: &str) -> Option<&BitratePreset> {
        self.bitrates.iter().find(|p| p.key == key.trim())
    }

    pub fn format(&self, key: &str) -> Option<&FormatPreset> {
        self.formats.iter().find(|p| p.key == key.trim())
    }

    pub fn sizes(&self) -> &[SizePreset] {
        &self.sizes
    }

    pub fn bitrates(&self) -> &[BitratePreset] {
        &self.bitrates
    }

    pub fn formats(&self) -> &[FormatPreset] {
        &self.formats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys_resolve_on_every_axis() {
        let catalog = PresetCatalog::builtin().unwrap();
        assert_eq!(catalog.size(DEFAULT_KEY).unwrap().transform, SizeTransform::Original);
        assert_eq!(catalog.bitrate(DEFAULT_KEY).unwrap().policy, BitratePolicy::Quality);
        assert_eq!(catalog.format(DEFAULT_KEY).unwrap().extension, "mp4");
    }

    #[test]
    fn test_unknown_key_is_absent() {
        let catalog = PresetCatalog::builtin().unwrap();
        assert!(catalog.size("9").is_none());
        assert!(catalog.bitrate("").is_none());
        assert!(catalog.format("webm").is_none());
    }

    #[test]
    fn test_builtin_table_sizes() {
        let catalog = PresetCatalog::builtin().unwrap();
        assert_eq!(catalog.sizes().len(), 5);
        assert_eq!(catalog.bitrates().len(), 4);
        assert_eq!(catalog.formats().len(), 2);
    }

    #[test]
    fn test_webm_preset() {
        let catalog = PresetCatalog::builtin().unwrap();
        let webm = catalog.format("2").unwrap();
        assert_eq!(webm.name, "WebM (VP9)");
        assert_eq!(webm.video_codec, "libvpx-vp9");
        assert_eq!(webm.family, ContainerFamily::WebM);
    }

    #[test]
    fn test_keys_are_trimmed() {
        let catalog = PresetCatalog::builtin().unwrap();
        assert_eq!(catalog.size(" 2 ").unwrap().name, "HD (1280p max)");
    }

    #[test]
    fn test_builtin_values_go_through_parsers() {
        let catalog = PresetCatalog::builtin().unwrap();
        assert_eq!(
            catalog.size("2").unwrap().transform,
            SizeTransform::ConstrainWidth { pixels: 1280 }
        );
        assert_eq!(
            catalog.bitrate("4").unwrap().policy,
            BitratePolicy::Target {
                bits_per_second: 500_000
            }
        );
    }

    #[test]
    fn test_ambiguous_size_value_rejects_table() {
        let result = PresetCatalog::from_tables(
            &[("1", "Stretched", "1280:720")],
            BITRATE_TABLE,
            Vec::new(),
        );
        assert!(matches!(result, Err(DomainError::BadArgs(_))));
    }

    #[test]
    fn test_overflowing_bitrate_rejects_table() {
        let result = PresetCatalog::from_tables(
            SIZE_TABLE,
            &[("1", "Absurd", "99999999999999M")],
            Vec::new(),
        );
        assert!(matches!(result, Err(DomainError::BadArgs(_))));
    }
}
