pub mod batch;
pub mod config;
pub mod counter;
pub mod detection;
pub mod models;
pub mod pipeline;
pub mod warp;

pub use batch::{BatchExtractor, BatchSummary};
pub use config::ExtractionConfig;
pub use counter::LabelCounter;
pub use detection::LetterExtractor;
pub use models::{BoundingBox, ExtractionReport, label_from_path};
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, PipelineStep};
pub use warp::{Distortion, DistortionKind, DistortionSource, RandomDistortions, ScriptedDistortions};
