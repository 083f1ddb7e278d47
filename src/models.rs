use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::warp::Distortion;

/// Axis-aligned box around one detected letter, in padded image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Box covering the inclusive pixel extents `min..=max`.
    pub fn from_extents(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }
}

/// Ground-truth text of an image: its file name without the extension.
pub fn label_from_path(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|label| !label.is_empty())
        .ok_or_else(|| anyhow!("Cannot derive a label from {}", path.display()))
}

/// Outcome of running the extraction pipeline on one image.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub label: String,
    pub distortion: Distortion,
    pub regions_found: usize,
    /// Crop files written, in label order
    pub saved: Vec<PathBuf>,
    /// Crops that could not be written
    pub failed: usize,
    /// Regions left over after every label character was paired
    pub dropped_regions: usize,
    /// Label characters with no region to pair with
    pub dropped_chars: usize,
}

impl ExtractionReport {
    pub fn new(label: impl Into<String>, distortion: Distortion) -> Self {
        Self {
            label: label.into(),
            distortion,
            regions_found: 0,
            saved: Vec::new(),
            failed: 0,
            dropped_regions: 0,
            dropped_chars: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.dropped_chars == 0 && self.dropped_regions == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_is_file_stem() {
        assert_eq!(label_from_path(Path::new("/data/set1/aB3x.png")).unwrap(), "aB3x");
        assert_eq!(label_from_path(Path::new("7QK2.captcha.jpg")).unwrap(), "7QK2.captcha");
        assert!(label_from_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_bounding_box_from_extents_is_inclusive() {
        let b = BoundingBox::from_extents(3, 4, 3, 10);
        assert_eq!(b, BoundingBox { x: 3, y: 4, width: 1, height: 7 });
    }
}
