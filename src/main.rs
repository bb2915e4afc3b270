mod capture;
mod output;

use anyhow::{Context, Result};
use capture::{ImageSequence, MaskSource};
use clap::Parser;
use mattefx::{MaskPipeline, MaskSettings, PipelineConfig, QualityPreset};
use output::{OutputSink, PngSequenceOutput};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Probability mask images (grayscale), or directories of them, in frame order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for refined matte PNGs
    #[arg(short, long, default_value = "mattes")]
    output_dir: PathBuf,

    /// Quality preset: performance, balanced or quality
    #[arg(long, default_value = "balanced")]
    preset: QualityPreset,

    /// JSON settings file, applied on top of the preset
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Confidence threshold override (0-1)
    #[arg(long)]
    threshold: Option<f32>,

    /// Morphology kernel size override (odd, >= 3)
    #[arg(long)]
    kernel_size: Option<i32>,

    /// Skip morphological opening
    #[arg(long)]
    no_morphology: bool,

    /// Keep every connected component instead of only the largest
    #[arg(long)]
    no_components: bool,

    /// Minimum foreground area ratio override (0-1)
    #[arg(long)]
    min_area: Option<f32>,

    /// Temporal smoothing factor override (0-1)
    #[arg(long)]
    smoothing: Option<f32>,

    /// Disable temporal smoothing
    #[arg(long)]
    no_smoothing: bool,

    /// Write 3-channel silhouettes instead of single-channel mattes
    #[arg(long)]
    rgb: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    /// Layer preset, settings file, then command-line overrides
    fn mask_settings(&self) -> Result<MaskSettings> {
        let mut settings = match &self.settings {
            Some(path) => MaskSettings::from_json_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => self.preset.settings(),
        };

        if let Some(threshold) = self.threshold {
            settings.confidence_threshold = threshold;
        }
        if let Some(kernel_size) = self.kernel_size {
            settings.morphology_kernel_size = kernel_size;
        }
        if self.no_morphology {
            settings.morphology_enabled = false;
        }
        if self.no_components {
            settings.keep_largest_component_only = false;
        }
        if let Some(min_area) = self.min_area {
            settings.min_mask_area_ratio = min_area;
        }
        if let Some(smoothing) = self.smoothing {
            settings.temporal_smoothing_factor = smoothing;
        }
        if self.no_smoothing {
            settings.temporal_smoothing_enabled = false;
        }

        Ok(settings)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("mattefx starting");

    let config = PipelineConfig::new(args.mask_settings()?);
    tracing::info!("Pipeline config: {:?}", config);

    let mut source =
        ImageSequence::from_inputs(&args.inputs).context("Failed to open mask inputs")?;
    let mut output = PngSequenceOutput::new(&args.output_dir, args.rgb)
        .context("Failed to initialize matte output")?;

    run_pipeline(&mut source, &mut output, &config)?;

    tracing::info!("Wrote {} mattes", output.frames_written());
    Ok(())
}

fn run_pipeline<S, O>(source: &mut S, output: &mut O, config: &PipelineConfig) -> Result<()>
where
    S: MaskSource,
    O: OutputSink,
{
    let mut pipeline = MaskPipeline::new();
    let mut frame_count = 0u64;
    let mut gated_frames = 0u64;
    let mut total_capture_time = Duration::ZERO;
    let mut total_refine_time = Duration::ZERO;
    let mut total_output_time = Duration::ZERO;

    if let Some(frames) = source.remaining() {
        tracing::info!("Refining {} frames", frames);
    }

    loop {
        // Read frame
        let capture_start = Instant::now();
        let Some(mask) = source.capture_frame().context("Failed to read mask frame")? else {
            break;
        };
        total_capture_time += capture_start.elapsed();

        // Refine
        let refine_start = Instant::now();
        let refined = pipeline.process_frame(&mask, config);
        total_refine_time += refine_start.elapsed();

        if refined.report.gated {
            gated_frames += 1;
        }
        tracing::debug!("Frame {}: {:?}", frame_count, refined.report);

        // Write matte
        let output_start = Instant::now();
        output
            .write_frame(&refined.matte)
            .context("Failed to write matte")?;
        total_output_time += output_start.elapsed();

        frame_count += 1;

        // Log stats every 30 frames
        if frame_count % 30 == 0 {
            log_stats(
                frame_count,
                gated_frames,
                total_capture_time,
                total_refine_time,
                total_output_time,
            );
        }
    }

    if frame_count % 30 != 0 {
        log_stats(
            frame_count,
            gated_frames,
            total_capture_time,
            total_refine_time,
            total_output_time,
        );
    }

    Ok(())
}

fn log_stats(frames: u64, gated: u64, capture: Duration, refine: Duration, output: Duration) {
    let per_frame_ms = |total: Duration| total.as_secs_f64() * 1000.0 / frames as f64;
    let avg_capture_ms = per_frame_ms(capture);
    let avg_refine_ms = per_frame_ms(refine);
    let avg_output_ms = per_frame_ms(output);

    tracing::info!(
        "Frame {}: read={:.1}ms, refine={:.2}ms, write={:.1}ms, empty_frames={}",
        frames,
        avg_capture_ms,
        avg_refine_ms,
        avg_output_ms,
        gated
    );
}
