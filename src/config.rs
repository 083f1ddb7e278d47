//! Extraction settings.
//!
//! Loaded from a JSON file when one is given, otherwise the defaults below
//! reproduce the behaviour the training sets were generated with. Missing
//! fields fall back to their defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::warp::DistortionKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Distortions the pipeline picks from, uniformly, once per image
    pub distortions: Vec<DistortionKind>,
    /// Inclusive range for the concave amplitude
    pub concave_amplitude_range: (u32, u32),
    /// Inclusive range for the concave frequency
    pub concave_frequency_range: (u32, u32),
    /// Pixels of edge replication added on every side before edge detection
    pub border_padding: u32,
    /// Canny thresholds, kept in the order they were tuned with
    pub canny_low: f32,
    pub canny_high: f32,
    /// Edge pixels strictly above this become foreground
    pub binary_threshold: u8,
    /// Number of leading regions used to size the crops
    pub letters_per_label: usize,
    /// Augmented runs per image in a batch
    pub passes_per_image: u32,
    /// Batch progress is logged every this many runs
    pub progress_interval: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            distortions: vec![
                DistortionKind::Concave,
                DistortionKind::LeftShift,
                DistortionKind::RightShift,
                DistortionKind::None,
            ],
            concave_amplitude_range: (11, 20),
            concave_frequency_range: (6, 11),
            border_padding: 8,
            canny_low: 30.0,
            canny_high: 20.0,
            binary_threshold: 127,
            letters_per_label: 4,
            passes_per_image: 4,
            progress_interval: 4032,
        }
    }
}

impl ExtractionConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.distortions.is_empty() {
            bail!("At least one distortion must be enabled (use \"none\" to disable warping)");
        }
        let (amp_lo, amp_hi) = self.concave_amplitude_range;
        if amp_lo > amp_hi {
            bail!("Concave amplitude range is inverted: {amp_lo} > {amp_hi}");
        }
        let (freq_lo, freq_hi) = self.concave_frequency_range;
        if freq_lo > freq_hi {
            bail!("Concave frequency range is inverted: {freq_lo} > {freq_hi}");
        }
        if self.letters_per_label == 0 {
            bail!("letters_per_label must be at least 1");
        }
        if self.passes_per_image == 0 {
            bail!("passes_per_image must be at least 1");
        }
        Ok(())
    }

    /// Canny thresholds ordered as (low, high). The tuned pair is stored
    /// inverted and the edge detector requires low <= high.
    pub fn canny_thresholds(&self) -> (f32, f32) {
        if self.canny_low <= self.canny_high {
            (self.canny_low, self.canny_high)
        } else {
            (self.canny_high, self.canny_low)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExtractionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canny_thresholds(), (20.0, 30.0));
    }

    #[test]
    fn test_partial_json_uses_defaults() -> Result<()> {
        let config: ExtractionConfig = serde_json::from_str(
            r#"{ "distortions": ["left_shift", "none"], "concave_amplitude_range": [12, 14] }"#,
        )?;
        assert_eq!(config.distortions, vec![DistortionKind::LeftShift, DistortionKind::None]);
        assert_eq!(config.concave_amplitude_range, (12, 14));
        assert_eq!(config.concave_frequency_range, (6, 11));
        assert_eq!(config.border_padding, 8);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_settings() {
        let empty = ExtractionConfig { distortions: vec![], ..ExtractionConfig::default() };
        assert!(empty.validate().is_err());

        let inverted = ExtractionConfig {
            concave_frequency_range: (11, 6),
            ..ExtractionConfig::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "passes_per_image": 2, "letters_per_label": 5 }"#)?;
        let config = ExtractionConfig::load(&path)?;
        assert_eq!(config.passes_per_image, 2);
        assert_eq!(config.letters_per_label, 5);

        fs::write(&path, r#"{ "distortions": [] }"#)?;
        assert!(ExtractionConfig::load(&path).is_err());
        Ok(())
    }
}
