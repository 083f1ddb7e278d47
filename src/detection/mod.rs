pub mod contours;
pub mod letters;
pub mod preprocessing;
pub mod steps;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, ImageReader};
use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::counter::LabelCounter;
use crate::models::{BoundingBox, ExtractionReport, label_from_path};
use crate::pipeline::{DebugConfig, Pipeline, PipelineContext};
use crate::warp::{Distortion, DistortionSource};

use letters::LetterNormalizer;
use steps::{DistortionStep, EdgeDetectionStep, PaddingStep, ThresholdStep};

/// Per-image extraction: distort, find letter regions, crop and save them.
pub struct LetterExtractor {
    config: ExtractionConfig,
    normalizer: LetterNormalizer,
    debug: Option<DebugConfig>,
}

impl LetterExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let normalizer = LetterNormalizer::new(config.letters_per_label);
        Self { config, normalizer, debug: None }
    }

    /// Save every stage image of every run under `output_dir`, which must be
    /// empty or missing.
    pub fn with_debug(mut self, output_dir: std::path::PathBuf) -> Result<Self> {
        self.debug = Some(DebugConfig::new(output_dir)?);
        Ok(self)
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Stages turning a grayscale image into the binary edge map contours are
    /// traced on.
    fn build_pipeline(&self, distortion: Distortion) -> Pipeline {
        let (low_threshold, high_threshold) = self.config.canny_thresholds();
        Pipeline::new()
            .add_step(Arc::new(DistortionStep { distortion }))
            .add_step(Arc::new(PaddingStep { border: self.config.border_padding }))
            .add_step(Arc::new(EdgeDetectionStep { low_threshold, high_threshold }))
            .add_step(Arc::new(ThresholdStep { level: self.config.binary_threshold }))
    }

    /// Letter regions of an already distorted grayscale image, left to right,
    /// in padded coordinates.
    pub fn detect_regions(&self, gray: &GrayImage) -> Result<Vec<BoundingBox>> {
        let binary = self
            .build_pipeline(Distortion::None)
            .run(gray.clone(), &PipelineContext::new("regions"))?;
        Ok(contours::find_letter_regions(&binary))
    }

    /// Run the whole pipeline on a decoded image with a known label.
    pub fn extract(
        &self,
        image: &DynamicImage,
        label: &str,
        distortion: Distortion,
        counter: &LabelCounter,
        output_dir: &Path,
        run_id: &str,
    ) -> Result<ExtractionReport> {
        let context = PipelineContext::new(run_id).with_debug(self.debug.clone());
        let gray = preprocessing::to_grayscale(image);

        let pipeline = self.build_pipeline(distortion);
        let mut stages = pipeline.run_stages(gray, pipeline.len(), &context)?;
        let binary = stages
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Pipeline produced no output"))?;
        // crops come from the distorted image, before padding
        let distorted = &stages[1];

        let regions = contours::find_letter_regions(&binary);
        debug!("[{}] {} with {}: {} regions", run_id, label, distortion, regions.len());

        let mut report = ExtractionReport::new(label, distortion);
        self.normalizer
            .normalize_and_save(distorted, &regions, label, counter, output_dir, &mut report);
        Ok(report)
    }

    /// Load `path`, take its label from the file name, pick a distortion from
    /// `source` and extract.
    pub fn extract_file(
        &self,
        path: &Path,
        source: &mut dyn DistortionSource,
        counter: &LabelCounter,
        output_dir: &Path,
        run_id: &str,
    ) -> Result<ExtractionReport> {
        let label = label_from_path(path)?;
        let image = ImageReader::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .decode()
            .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))?;

        let distortion = source.next_distortion(&self.config);
        let report = self.extract(&image, &label, distortion, counter, output_dir, run_id)?;

        info!(
            "{}: {} with {} -> {} letters saved, {} failed",
            path.display(),
            label,
            distortion,
            report.saved.len(),
            report.failed
        );
        Ok(report)
    }
}

impl Default for LetterExtractor {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}
