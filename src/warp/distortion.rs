use std::collections::VecDeque;
use std::fmt;

use image::GrayImage;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;

/// Parameterless name of a distortion, as it appears in configuration and on
/// the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DistortionKind {
    VerticalWave,
    HorizontalWave,
    HorizontalVerticalWave,
    Concave,
    LeftShift,
    RightShift,
    None,
}

/// A fully parameterised distortion ready to be applied to one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Distortion {
    VerticalWave,
    HorizontalWave,
    HorizontalVerticalWave,
    Concave { amplitude: f64, frequency: u32 },
    LeftShift,
    RightShift,
    None,
}

impl Distortion {
    pub fn apply(&self, img: &GrayImage) -> GrayImage {
        match *self {
            Distortion::VerticalWave => super::vertical_wave(img),
            Distortion::HorizontalWave => super::horizontal_wave(img),
            Distortion::HorizontalVerticalWave => super::horizontal_vertical_wave(img),
            Distortion::Concave { amplitude, frequency } => super::concave(img, amplitude, frequency),
            Distortion::LeftShift => super::left_shift(img),
            Distortion::RightShift => super::right_shift(img),
            Distortion::None => img.clone(),
        }
    }

    pub fn kind(&self) -> DistortionKind {
        match self {
            Distortion::VerticalWave => DistortionKind::VerticalWave,
            Distortion::HorizontalWave => DistortionKind::HorizontalWave,
            Distortion::HorizontalVerticalWave => DistortionKind::HorizontalVerticalWave,
            Distortion::Concave { .. } => DistortionKind::Concave,
            Distortion::LeftShift => DistortionKind::LeftShift,
            Distortion::RightShift => DistortionKind::RightShift,
            Distortion::None => DistortionKind::None,
        }
    }
}

impl fmt::Display for Distortion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distortion::Concave { amplitude, frequency } => {
                write!(f, "concave(amplitude={amplitude}, frequency={frequency})")
            }
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// Picks the distortion applied to the next image.
pub trait DistortionSource {
    fn next_distortion(&mut self, config: &ExtractionConfig) -> Distortion;
}

/// Uniform choice among the configured kinds, with concave parameters drawn
/// from the configured inclusive ranges.
pub struct RandomDistortions<R: Rng = StdRng> {
    rng: R,
}

impl RandomDistortions<StdRng> {
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> RandomDistortions<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DistortionSource for RandomDistortions<R> {
    fn next_distortion(&mut self, config: &ExtractionConfig) -> Distortion {
        let kind = config
            .distortions
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(DistortionKind::None);

        match kind {
            DistortionKind::VerticalWave => Distortion::VerticalWave,
            DistortionKind::HorizontalWave => Distortion::HorizontalWave,
            DistortionKind::HorizontalVerticalWave => Distortion::HorizontalVerticalWave,
            DistortionKind::Concave => {
                let (amp_lo, amp_hi) = config.concave_amplitude_range;
                let (freq_lo, freq_hi) = config.concave_frequency_range;
                Distortion::Concave {
                    amplitude: self.rng.gen_range(amp_lo..=amp_hi) as f64,
                    frequency: self.rng.gen_range(freq_lo..=freq_hi),
                }
            }
            DistortionKind::LeftShift => Distortion::LeftShift,
            DistortionKind::RightShift => Distortion::RightShift,
            DistortionKind::None => Distortion::None,
        }
    }
}

/// Replays a fixed sequence, cycling when it runs out. An empty script always
/// yields [`Distortion::None`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedDistortions {
    script: VecDeque<Distortion>,
}

impl ScriptedDistortions {
    pub fn new(script: impl IntoIterator<Item = Distortion>) -> Self {
        Self { script: script.into_iter().collect() }
    }
}

impl DistortionSource for ScriptedDistortions {
    fn next_distortion(&mut self, _config: &ExtractionConfig) -> Distortion {
        match self.script.pop_front() {
            Some(next) => {
                self.script.push_back(next);
                next
            }
            None => Distortion::None,
        }
    }
}
