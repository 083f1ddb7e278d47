use anyhow::Result;
use image::GrayImage;

use crate::detection::preprocessing;
use crate::pipeline::{PipelineContext, PipelineStep};
use crate::warp::Distortion;

/// Apply a warp chosen for this run
pub struct DistortionStep {
    pub distortion: Distortion,
}

impl PipelineStep for DistortionStep {
    fn process(&self, image: GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(self.distortion.apply(&image))
    }

    fn name(&self) -> &str {
        "Distortion"
    }
}

/// Replicate border pixels so letters touching the edge keep a closed outline
pub struct PaddingStep {
    pub border: u32,
}

impl PipelineStep for PaddingStep {
    fn process(&self, image: GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(preprocessing::pad_replicate(&image, self.border))
    }

    fn name(&self) -> &str {
        "Padding"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, image: GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(preprocessing::detect_edges(&image, self.low_threshold, self.high_threshold))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Binary threshold of the edge map
pub struct ThresholdStep {
    pub level: u8,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, image: GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(preprocessing::binarize(&image, self.level))
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}
