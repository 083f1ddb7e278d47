//! Corpus-wide extraction.
//!
//! A captcha directory holds images directly, or one level of
//! sub-directories holding images. Every image is extracted
//! `passes_per_image` times with a fresh distortion each time, and all runs
//! share one [`LabelCounter`] so numbering continues across the corpus.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::counter::LabelCounter;
use crate::detection::LetterExtractor;
use crate::warp::DistortionSource;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();
    Ok(entries)
}

/// Every image in `captcha_dir` and its immediate sub-directories, sorted.
pub fn collect_images(captcha_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in sorted_entries(captcha_dir)? {
        if entry.is_dir() {
            images.extend(sorted_entries(&entry)?.into_iter().filter(|p| p.is_file() && is_image(p)));
        } else if is_image(&entry) {
            images.push(entry);
        }
    }
    Ok(images)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub images: usize,
    pub runs: u64,
    pub failed_runs: u64,
    /// Runs that dropped or failed at least one letter
    pub incomplete_runs: u64,
    pub letters_saved: u64,
    pub letters_failed: u64,
}

pub struct BatchExtractor<'a> {
    extractor: &'a LetterExtractor,
    counter: &'a LabelCounter,
    output_dir: PathBuf,
}

impl<'a> BatchExtractor<'a> {
    pub fn new(extractor: &'a LetterExtractor, counter: &'a LabelCounter, output_dir: impl Into<PathBuf>) -> Self {
        Self { extractor, counter, output_dir: output_dir.into() }
    }

    /// Extract every image of `captcha_dir`. A failing run is logged and
    /// skipped; only an unreadable captcha directory aborts the batch.
    pub fn run(&self, captcha_dir: &Path, source: &mut dyn DistortionSource) -> Result<BatchSummary> {
        let images = collect_images(captcha_dir)?;
        let config = self.extractor.config();
        let passes = config.passes_per_image as u64;
        let total_runs = images.len() as u64 * passes;
        let interval = config.progress_interval.max(1);

        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir.display()))?;
        info!(
            "Extracting {} images x {} passes from {}",
            images.len(),
            passes,
            captcha_dir.display()
        );

        let mut summary = BatchSummary { images: images.len(), ..BatchSummary::default() };
        for image in &images {
            for pass in 1..=passes {
                let run_id = format!(
                    "{}-{}",
                    image.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default(),
                    pass
                );
                match self
                    .extractor
                    .extract_file(image, source, self.counter, &self.output_dir, &run_id)
                {
                    Ok(report) => {
                        summary.letters_saved += report.saved.len() as u64;
                        summary.letters_failed += report.failed as u64;
                        if !report.is_complete() {
                            summary.incomplete_runs += 1;
                        }
                    }
                    Err(e) => {
                        warn!("Skipping {} (pass {}): {:#}", image.display(), pass, e);
                        summary.failed_runs += 1;
                    }
                }

                summary.runs += 1;
                if summary.runs % interval == 0 {
                    info!(
                        "{:.2}% remaining ({}/{} runs)",
                        100.0 * (1.0 - summary.runs as f64 / total_runs as f64),
                        summary.runs,
                        total_runs
                    );
                }
            }
        }

        info!(
            "Batch done: {} runs, {} failed, {} incomplete, {} letters saved",
            summary.runs, summary.failed_runs, summary.incomplete_runs, summary.letters_saved
        );
        Ok(summary)
    }
}
