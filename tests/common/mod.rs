mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from captcha_letters for tests
pub use captcha_letters::{
    BoundingBox, Distortion, ExtractionConfig, ExtractionReport, LabelCounter, LetterExtractor,
    ScriptedDistortions,
};
