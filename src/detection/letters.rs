//! Turning detected regions into equally sized, labelled letter crops.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use image::GrayImage;
use tracing::{debug, warn};

use crate::counter::LabelCounter;
use crate::models::{BoundingBox, ExtractionReport};

/// Crop rectangle after clamping the top-left corner to the image origin.
/// The far edges are left as computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl CropBox {
    /// Box centred on the region's top-left corner, spanning the target size
    /// plus a 2 pixel margin on the far sides.
    pub fn around(region: &BoundingBox, target_width: u32, target_height: u32) -> Self {
        let (x, y) = (region.x as i64, region.y as i64);
        let (half_w, half_h) = ((target_width / 2) as i64, (target_height / 2) as i64);
        Self {
            x1: (x - half_w).max(0),
            y1: (y - half_h).max(0),
            x2: x + half_w + 2,
            y2: y + half_h + 2,
        }
    }

    /// Cut the box out of `img`, clipping it to the image the way a slice
    /// would. Returns `None` when nothing is left.
    pub fn crop(&self, img: &GrayImage) -> Option<GrayImage> {
        let (width, height) = (img.width() as i64, img.height() as i64);
        let x1 = self.x1.clamp(0, width);
        let y1 = self.y1.clamp(0, height);
        let x2 = self.x2.clamp(0, width);
        let y2 = self.y2.clamp(0, height);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(
            image::imageops::crop_imm(img, x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32)
                .to_image(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct LetterNormalizer {
    /// How many leading regions decide the crop size
    pub sizing_regions: usize,
}

impl LetterNormalizer {
    pub fn new(sizing_regions: usize) -> Self {
        Self { sizing_regions }
    }

    /// Largest width and height among the first `sizing_regions` regions.
    pub fn target_size(&self, regions: &[BoundingBox]) -> (u32, u32) {
        let sizing = &regions[..regions.len().min(self.sizing_regions)];
        let width = sizing.iter().map(|r| r.width).max().unwrap_or(0);
        let height = sizing.iter().map(|r| r.height).max().unwrap_or(0);
        (width, height)
    }

    /// Pair regions with label characters by position. Extra regions or
    /// characters on either side are dropped.
    pub fn crop_boxes(&self, regions: &[BoundingBox], label: &str) -> Vec<(CropBox, char)> {
        let (target_width, target_height) = self.target_size(regions);
        regions
            .iter()
            .zip(label.chars())
            .map(|(region, ch)| (CropBox::around(region, target_width, target_height), ch))
            .collect()
    }

    /// Crop every paired letter out of `img` and save it as
    /// `output_dir/<char>/<n>.png`. Crops that cannot be written are logged
    /// and skipped.
    pub fn normalize_and_save(
        &self,
        img: &GrayImage,
        regions: &[BoundingBox],
        label: &str,
        counter: &LabelCounter,
        output_dir: &Path,
        report: &mut ExtractionReport,
    ) {
        let label_len = label.chars().count();
        report.regions_found = regions.len();
        report.dropped_regions = regions.len().saturating_sub(label_len);
        report.dropped_chars = label_len.saturating_sub(regions.len());
        if report.dropped_regions > 0 || report.dropped_chars > 0 {
            warn!(
                "'{}': {} regions for {} characters ({} regions, {} characters dropped)",
                label,
                regions.len(),
                label_len,
                report.dropped_regions,
                report.dropped_chars
            );
        }

        for (crop_box, ch) in self.crop_boxes(regions, label) {
            match save_letter(img, &crop_box, ch, counter, output_dir) {
                Ok(path) => {
                    debug!("Saved '{}' to {}", ch, path.display());
                    report.saved.push(path);
                }
                Err(e) => {
                    warn!("Skipping '{}' of '{}': {:#}", ch, label, e);
                    report.failed += 1;
                }
            }
        }
    }
}

fn save_letter(
    img: &GrayImage,
    crop_box: &CropBox,
    ch: char,
    counter: &LabelCounter,
    output_dir: &Path,
) -> Result<PathBuf> {
    let key = ch.to_string();
    let letter_dir = output_dir.join(&key);
    fs::create_dir_all(&letter_dir)
        .with_context(|| format!("Failed to create {}", letter_dir.display()))?;

    let Some(letter) = crop_box.crop(img) else {
        bail!("Empty crop at {:?}", crop_box);
    };

    let mut saved = PathBuf::new();
    counter.record_with(&key, |n| {
        saved = letter_dir.join(format!("{}.png", n));
        letter
            .save(&saved)
            .with_context(|| format!("Failed to save {}", saved.display()))
    })?;
    Ok(saved)
}
