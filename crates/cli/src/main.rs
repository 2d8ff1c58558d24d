use std::path::PathBuf;
use std::process;

use clap::Parser;

use colortrail_core::detection::infrastructure::contour_blob_selector::ContourBlobSelector;
use colortrail_core::pipeline::artifact_sink::{ArtifactSink, OutputPaths};
use colortrail_core::pipeline::pipeline_logger::ConsolePipelineLogger;
use colortrail_core::pipeline::track_color_use_case::TrackColorUseCase;
use colortrail_core::segmentation::infrastructure::hsv_segmenter::HsvSegmenter;
use colortrail_core::shared::config::TrackerConfig;
use colortrail_core::shared::constants::DEFAULT_INPUT;
use colortrail_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use colortrail_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use colortrail_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Track one colored object through a video and draw its trajectory.
#[derive(Parser, Debug)]
#[command(name = "colortrail")]
struct Cli {
    /// Input video file.
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the output video, stills and debug masks.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Target hue (0-179).
    #[arg(long)]
    hue: Option<u8>,

    #[arg(long)]
    hue_tolerance: Option<u8>,

    /// Minimum saturation (0-255).
    #[arg(long)]
    sat_min: Option<u8>,

    /// Minimum value/brightness (0-255).
    #[arg(long)]
    val_min: Option<u8>,

    /// Minimum blob area in pixels.
    #[arg(long)]
    min_area: Option<f64>,

    #[arg(long)]
    line_thickness: Option<u32>,

    /// Weight of the trail when blended over each frame.
    #[arg(long)]
    trail_opacity: Option<f64>,

    /// Fade the trail a little every processed frame (`--fade false` to turn off).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    fade: Option<bool>,

    #[arg(long)]
    fade_factor: Option<f64>,

    /// Frames without a detection before the trail is broken.
    #[arg(long)]
    max_gap: Option<usize>,

    /// Process every Nth frame (1 = every frame).
    #[arg(long)]
    frame_skip: Option<usize>,

    /// Do not write debug masks.
    #[arg(long)]
    no_debug_masks: bool,

    /// Write a debug mask every N processed frames.
    #[arg(long)]
    debug_every: Option<usize>,

    /// Log progress every N processed frames.
    #[arg(long)]
    log_every: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    log::debug!("Config: {config:?}");

    let paths = OutputPaths::in_dir(&cli.output_dir);

    let sink = ArtifactSink::new(
        Box::new(FfmpegWriter::new()),
        Box::new(ImageFileWriter::new()),
        paths,
        &config,
    );
    let mut use_case = TrackColorUseCase::new(
        Box::new(FfmpegReader::new()),
        Box::new(HsvSegmenter::new(&config)),
        Box::new(ContourBlobSelector::new(config.min_area)),
        sink,
        Box::new(ConsolePipelineLogger::new(config.log_cadence)),
        config,
    );
    use_case.execute(&cli.input)?;
    Ok(())
}

/// Config file (or defaults) with command-line overrides applied, validated.
fn build_config(cli: &Cli) -> Result<TrackerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => TrackerConfig::from_json_file(path)?,
        None => TrackerConfig::default(),
    };

    if let Some(v) = cli.hue {
        config.hue_target = v;
    }
    if let Some(v) = cli.hue_tolerance {
        config.hue_tolerance = v;
    }
    if let Some(v) = cli.sat_min {
        config.sat_min = v;
    }
    if let Some(v) = cli.val_min {
        config.val_min = v;
    }
    if let Some(v) = cli.min_area {
        config.min_area = v;
    }
    if let Some(v) = cli.line_thickness {
        config.line_thickness = v;
    }
    if let Some(v) = cli.trail_opacity {
        config.trail_opacity = v;
    }
    if let Some(v) = cli.fade {
        config.fade_enabled = v;
    }
    if let Some(v) = cli.fade_factor {
        config.fade_factor = v;
    }
    if let Some(v) = cli.max_gap {
        config.max_gap_frames = v;
    }
    if let Some(v) = cli.frame_skip {
        config.frame_skip_stride = v;
    }
    if cli.no_debug_masks {
        config.debug_enabled = false;
    }
    if let Some(v) = cli.debug_every {
        config.debug_cadence = v;
    }
    if let Some(v) = cli.log_every {
        config.log_cadence = v;
    }

    config.validate()?;
    Ok(config)
}
