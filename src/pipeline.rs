use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use image::GrayImage;
use tracing::debug;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

impl DebugConfig {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        Ok(Self { output_dir })
    }

    /// Save one stage image as `<run_id>/<NN>_<stage>.png`
    pub fn save_stage(&self, run_id: &str, index: usize, name: &str, image: &GrayImage) -> Result<()> {
        let run_dir = self.output_dir.join(run_id);
        std::fs::create_dir_all(&run_dir)?;

        let filename = format!("{:02}_{}.png", index, name.to_lowercase().replace(' ', "_"));
        let output_path = run_dir.join(&filename);
        image
            .save(&output_path)
            .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;

        debug!("Debug: saved {}/{}", run_id, filename);
        Ok(())
    }
}

/// Context available to all pipeline steps
#[derive(Clone, Debug)]
pub struct PipelineContext {
    /// Identifies the current run in logs and debug output
    pub run_id: String,
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self { run_id: run_id.into(), debug: None }
    }

    pub fn with_debug(mut self, debug: Option<DebugConfig>) -> Self {
        self.debug = debug;
        self
    }

    fn save_stage(&self, index: usize, name: &str, image: &GrayImage) -> Result<()> {
        match &self.debug {
            Some(debug) => debug.save_stage(&self.run_id, index, name, image),
            None => Ok(()),
        }
    }
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Transform one image into the next stage's image
    fn process(&self, image: GrayImage, context: &PipelineContext) -> Result<GrayImage>;

    /// Human-readable name for this step (used in logs and debug file names)
    fn name(&self) -> &str;
}

/// Composable pipeline of image-to-image stages
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order. With debug enabled, the input is saved as
    /// stage 00 and each step's output under its 1-based index.
    pub fn run(&self, input: GrayImage, context: &PipelineContext) -> Result<GrayImage> {
        self.run_partial(input, self.steps.len(), context)
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: GrayImage, num_steps: usize, context: &PipelineContext) -> Result<GrayImage> {
        let mut stages = self.run_stages(input, num_steps, context)?;
        stages
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Pipeline produced no output"))
    }

    /// Run the first `num_steps` steps and keep every intermediate image:
    /// index 0 is the input, index `n` the output of step `n`.
    pub fn run_stages(
        &self,
        input: GrayImage,
        num_steps: usize,
        context: &PipelineContext,
    ) -> Result<Vec<GrayImage>> {
        context.save_stage(0, "input", &input)?;

        let mut stages = vec![input];
        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            let current = &stages[step_idx];
            debug!(
                "[{}] Running step: {} ({}x{})",
                context.run_id,
                step.name(),
                current.width(),
                current.height()
            );
            let next = step.process(current.clone(), context)?;
            context.save_stage(step_idx + 1, step.name(), &next)?;
            stages.push(next);
        }

        Ok(stages)
    }
}
