// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Processing configuration, fixed for the duration of a run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PagebindError, Result};

/// File extensions accepted as input pages (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "bmp", "tiff", "tif", "gif"];

/// Immutable parameters for one run of the converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// JPEG quality for encoded pages (1-100).
    pub quality: u8,
    /// Scale factor applied after padding to the canvas.
    pub resize_ratio: f64,
    /// Fraction of each dimension trimmed from every edge.
    pub crop_ratio: f64,
    /// Contrast enhancement factor (1.0 is a no-op).
    pub contrast_factor: f32,
    /// Median filter radius; 1 means a 3x3 neighbourhood.
    pub median_radius: u32,
    /// Unsharp mask blur radius (gaussian sigma).
    pub unsharp_radius: f32,
    /// Unsharp mask strength in percent.
    pub unsharp_amount: u32,
    /// Minimum per-channel difference before sharpening applies.
    pub unsharp_threshold: u8,
    /// Canvas-to-image ratio above which an image is considered anomalous.
    pub anomaly_ratio: f64,
    /// Resolution recorded in each page and used for PDF page sizing.
    pub dpi: u16,
    /// Worker count for the per-image pool. `None` means one per logical core.
    pub workers: Option<usize>,
    /// Accepted input extensions, lowercase, without the leading dot.
    pub extensions: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            quality: 85,
            resize_ratio: 0.5,
            crop_ratio: 0.015,
            contrast_factor: 1.1,
            median_radius: 1,
            unsharp_radius: 2.0,
            unsharp_amount: 150,
            unsharp_threshold: 3,
            anomaly_ratio: 1.1,
            dpi: 300,
            workers: None,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

impl ProcessingConfig {
    /// Load a configuration from a JSON file. Absent fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter is within its usable range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.quality) {
            return Err(PagebindError::InvalidConfig(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        if !self.resize_ratio.is_finite() || self.resize_ratio <= 0.0 {
            return Err(PagebindError::InvalidConfig(format!(
                "resize ratio must be a positive number, got {}",
                self.resize_ratio
            )));
        }
        if !(0.0..0.5).contains(&self.crop_ratio) {
            return Err(PagebindError::InvalidConfig(format!(
                "crop ratio must be in [0, 0.5), got {}",
                self.crop_ratio
            )));
        }
        if !self.contrast_factor.is_finite() || self.contrast_factor <= 0.0 {
            return Err(PagebindError::InvalidConfig(format!(
                "contrast factor must be positive, got {}",
                self.contrast_factor
            )));
        }
        if !self.anomaly_ratio.is_finite() || self.anomaly_ratio < 1.0 {
            return Err(PagebindError::InvalidConfig(format!(
                "anomaly ratio must be at least 1.0, got {}",
                self.anomaly_ratio
            )));
        }
        if self.dpi == 0 {
            return Err(PagebindError::InvalidConfig("dpi must be non-zero".into()));
        }
        if self.workers == Some(0) {
            return Err(PagebindError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        if self.extensions.is_empty() {
            return Err(PagebindError::InvalidConfig(
                "at least one input extension is required".into(),
            ));
        }
        Ok(())
    }

    /// Whether `path` carries one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ProcessingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quality, 85);
        assert!((config.resize_ratio - 0.5).abs() < f64::EPSILON);
        assert!((config.crop_ratio - 0.015).abs() < f64::EPSILON);
        assert_eq!(config.extensions.len(), 7);
    }

    #[test]
    fn rejects_out_of_range_quality() {
        let config = ProcessingConfig {
            quality: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PagebindError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_half_crop() {
        let config = ProcessingConfig {
            crop_ratio: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_workers() {
        let config = ProcessingConfig {
            workers: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn extension_match_ignores_case() {
        let config = ProcessingConfig::default();
        assert!(config.accepts(Path::new("scan/PAGE_01.JPG")));
        assert!(config.accepts(Path::new("page.Tif")));
        assert!(!config.accepts(Path::new("notes.txt")));
        assert!(!config.accepts(Path::new("README")));
        assert!(!config.accepts(Path::new("archive.pdf")));
    }

    #[test]
    fn load_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "quality": 70, "dpi": 200 }}"#).expect("write config");

        let config = ProcessingConfig::load(file.path()).expect("load config");
        assert_eq!(config.quality, 70);
        assert_eq!(config.dpi, 200);
        assert!((config.contrast_factor - 1.1).abs() < f32::EPSILON);
    }

    #[test]
    fn load_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "resize_ratio": -1.0 }}"#).expect("write config");

        assert!(ProcessingConfig::load(file.path()).is_err());
    }
}
