use clap::{Parser, Subcommand};
use image::ImageReader;
use std::path::PathBuf;
use tracing::info;

use captcha_letters::warp::{CONCAVE_AMPLITUDE, CONCAVE_FREQUENCY};
use captcha_letters::{
    BatchExtractor, Distortion, DistortionKind, DistortionSource, ExtractionConfig, LabelCounter,
    LetterExtractor, RandomDistortions,
};

#[derive(Parser)]
#[command(name = "captcha-letters")]
#[command(about = "Cut labelled CAPTCHA images into per-character training samples")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file overriding the default extraction settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the distortion choice (random when omitted)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Save every intermediate stage image to directory (must be empty)
    #[arg(long, global = true, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Extract letters from the given images; each file name is its label
    Extract {
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<PathBuf>,

        /// Directory receiving one sub-directory per character
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,
    },
    /// Extract letters from every image under a captcha directory
    Batch {
        #[arg(value_name = "CAPTCHA_DIR")]
        captcha_dir: PathBuf,

        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Augmented runs per image (overrides the config)
        #[arg(long)]
        passes: Option<u32>,
    },
    /// Apply a single warp to an image and save the result
    Warp {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        #[arg(long, value_enum)]
        variant: DistortionKind,

        /// Concave amplitude
        #[arg(long, default_value_t = CONCAVE_AMPLITUDE)]
        amplitude: f64,

        /// Concave frequency
        #[arg(long, default_value_t = CONCAVE_FREQUENCY)]
        frequency: u32,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn distortion_for(kind: DistortionKind, amplitude: f64, frequency: u32) -> Distortion {
    match kind {
        DistortionKind::VerticalWave => Distortion::VerticalWave,
        DistortionKind::HorizontalWave => Distortion::HorizontalWave,
        DistortionKind::HorizontalVerticalWave => Distortion::HorizontalVerticalWave,
        DistortionKind::Concave => Distortion::Concave { amplitude, frequency },
        DistortionKind::LeftShift => Distortion::LeftShift,
        DistortionKind::RightShift => Distortion::RightShift,
        DistortionKind::None => Distortion::None,
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => ExtractionConfig::load(path)?,
        None => ExtractionConfig::default(),
    };

    let mut source: Box<dyn DistortionSource> = match args.seed {
        Some(seed) => Box::new(RandomDistortions::seeded(seed)),
        None => Box::new(RandomDistortions::from_entropy()),
    };

    match args.command {
        Command::Extract { images, output } => {
            let mut extractor = LetterExtractor::new(config);
            if let Some(debug_dir) = args.debug_out {
                extractor = extractor.with_debug(debug_dir)?;
            }
            let counter = LabelCounter::new();

            let mut failed = 0;
            for path in &images {
                let run_id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "image".to_string());
                if let Err(e) = extractor.extract_file(path, source.as_mut(), &counter, &output, &run_id) {
                    tracing::warn!("Skipping {}: {:#}", path.display(), e);
                    failed += 1;
                }
            }

            println!("\n=== Letter Extraction Results ===");
            println!("Images processed: {} ({} failed)", images.len(), failed);
            println!("Letters saved: {}", counter.total());
        }
        Command::Batch { captcha_dir, output, passes } => {
            if let Some(passes) = passes {
                config.passes_per_image = passes;
                config.validate()?;
            }
            let mut extractor = LetterExtractor::new(config);
            if let Some(debug_dir) = args.debug_out {
                extractor = extractor.with_debug(debug_dir)?;
            }
            let counter = LabelCounter::new();

            let summary = BatchExtractor::new(&extractor, &counter, &output)
                .run(&captcha_dir, source.as_mut())?;

            println!("\n=== Batch Extraction Results ===");
            println!("Images: {}", summary.images);
            println!("Runs: {} ({} failed)", summary.runs, summary.failed_runs);
            println!("Letters saved: {} ({} failed)", summary.letters_saved, summary.letters_failed);
            if args.verbose {
                println!("\nPer-label counts:");
                for (label, count) in counter.snapshot() {
                    println!("  {}: {}", label, count);
                }
            }
        }
        Command::Warp { image, variant, amplitude, frequency, output } => {
            let img = ImageReader::open(&image)?
                .decode()
                .map_err(|e| anyhow::anyhow!("Failed to decode image: {}", e))?;
            let distortion = distortion_for(variant, amplitude, frequency);
            info!("Applying {} to {}x{} image", distortion, img.width(), img.height());

            distortion
                .apply(&img.to_luma8())
                .save(&output)
                .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", output.display(), e))?;
            println!("Saved {}", output.display());
        }
    }

    Ok(())
}
