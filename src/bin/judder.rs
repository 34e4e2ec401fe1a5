use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use judder::{
    AnalysisOptions, AnalysisReport, DuplicateDetectionOptions, ImageSequence, MotionOptions,
    ProgressCallback, ProgressInfo, ScoringOptions,
};
use serde_json::json;

#[cfg(feature = "decode")]
use judder::{FfmpegLogLevel, VideoSource};

const CLI_AFTER_HELP: &str = "Examples:\n  judder analyze gameplay.mp4\n  judder analyze gameplay.mp4 --json --out report.json\n  judder analyze-frames captures/ --fps 60 --progress\n  judder completions zsh > _judder";

#[derive(Debug, Parser)]
#[command(
    name = "judder",
    version,
    about = "Measure playback smoothness of gameplay recordings",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow overwriting an existing --out file.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Parser, Clone)]
struct OutputOptions {
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
struct TuningOptions {
    /// EMA smoothing factor of the duplicate threshold, in (0, 1).
    #[arg(long, default_value_t = 0.1)]
    alpha: f64,

    /// Threshold multiplier applied to the noise floor.
    #[arg(long, default_value_t = 1.5)]
    sensitivity: f64,

    /// Upper bound of the duplicate threshold.
    #[arg(long, default_value_t = 3.0)]
    ceiling: f64,

    /// Noise floor the threshold starts from, and returns to after a cut.
    #[arg(long, default_value_t = 0.5)]
    initial_noise_floor: f64,

    /// Difference score treated as a scene cut.
    #[arg(long, default_value_t = 40.0)]
    scene_cut: f64,

    /// Median difference score above which content counts as moving.
    #[arg(long, default_value_t = 2.0)]
    activity_floor: f64,

    /// Multiple of the duplicate threshold the motion median must reach.
    #[arg(long, default_value_t = 2.0)]
    noise_margin: f64,

    /// Number of recent content changes the motion median looks at.
    #[arg(long, default_value_t = 5)]
    motion_window: usize,

    /// Longest freeze (in frames) still counted as a stutter.
    #[arg(long, default_value_t = 30)]
    max_hold: u64,

    /// Frame-time gap (ms) treated as a capture discontinuity.
    #[arg(long, default_value_t = 500)]
    gap_ms: u64,

    /// Per-pixel luma delta ignored as compression noise.
    #[arg(long, default_value_t = 0)]
    pixel_tolerance: u8,

    /// Analysis resolution as WIDTHxHEIGHT.
    #[arg(long, default_value = "320x180")]
    resolution: String,

    /// Frame rate at which pacing stops costing points.
    #[arg(long, default_value_t = 30.0)]
    target_fps: f64,

    /// Points deducted per unit of stutter share (stutter / moving frames).
    #[arg(long, default_value_t = 200.0)]
    stutter_weight: f64,

    /// Largest deduction for each of average and 1%-low fps under target.
    #[arg(long, default_value_t = 25.0)]
    pacing_weight: f64,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[cfg(feature = "decode")]
    /// Decode a video file and analyze it.
    #[command(
        about = "Analyze a video file",
        after_help = "Examples:\n  judder analyze gameplay.mp4\n  judder analyze gameplay.mp4 --json --out report.json --progress"
    )]
    Analyze {
        /// Input video path.
        input: PathBuf,

        #[command(flatten)]
        output: OutputOptions,

        #[command(flatten)]
        tuning: TuningOptions,
    },

    /// Analyze a directory of numbered frame images.
    #[command(
        about = "Analyze an image sequence",
        after_help = "Examples:\n  judder analyze-frames captures/ --fps 60\n  judder analyze-frames captures/ --fps 144 --json"
    )]
    AnalyzeFrames {
        /// Directory containing the frames, ordered by file name.
        directory: PathBuf,

        /// Capture rate used to timestamp the frames.
        #[arg(long, default_value_t = 60.0)]
        fps: f64,

        #[command(flatten)]
        output: OutputOptions,

        #[command(flatten)]
        tuning: TuningOptions,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_resolution(value: &str) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    let (width, height) = value
        .trim()
        .to_ascii_lowercase()
        .split_once('x')
        .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
        .ok_or_else(|| format!("invalid resolution (expected WIDTHxHEIGHT): {value}"))?;
    Ok((width.parse()?, height.parse()?))
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn analysis_options(
    tuning: &TuningOptions,
) -> Result<AnalysisOptions, Box<dyn std::error::Error>> {
    let (width, height) = parse_resolution(&tuning.resolution)?;
    let options = AnalysisOptions::new()
        .with_duplicate_detection(
            DuplicateDetectionOptions::new()
                .smoothing_factor(tuning.alpha)
                .sensitivity(tuning.sensitivity)
                .ceiling(tuning.ceiling)
                .scene_cut_threshold(tuning.scene_cut)
                .initial_noise_floor(tuning.initial_noise_floor),
        )
        .with_motion(
            MotionOptions::new()
                .activity_floor(tuning.activity_floor)
                .noise_margin(tuning.noise_margin)
                .window(tuning.motion_window)
                .max_hold_frames(tuning.max_hold),
        )
        .with_scoring(
            ScoringOptions::new()
                .stutter_weight(tuning.stutter_weight)
                .pacing_weight(tuning.pacing_weight)
                .target_fps(tuning.target_fps),
        )
        .with_gap_threshold(Duration::from_millis(tuning.gap_ms))
        .with_pixel_tolerance(tuning.pixel_tolerance)
        .with_analysis_resolution(width, height);
    options.validate()?;
    Ok(options)
}

fn init_logging(global: &GlobalOptions) {
    let level = if global.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(global);

    #[cfg(feature = "decode")]
    if let Some(level) = &global.log_level {
        judder::set_ffmpeg_log_level(level.parse::<FfmpegLogLevel>()?);
    }

    #[cfg(not(feature = "decode"))]
    if global.log_level.is_some() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "--log-level requires building with the `decode` feature".yellow()
        );
    }

    Ok(())
}

/// Drives an `indicatif` bar from analysis progress callbacks.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(expected: Option<u64>) -> Result<Self, Box<dyn std::error::Error>> {
        let bar = match expected {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        if let Some(timestamp) = info.current_timestamp {
            self.bar.set_message(format!(
                "@ {:.1}s, {} duplicate / {} stutter",
                timestamp.as_secs_f64(),
                info.duplicate_frames,
                info.stutter_frames
            ));
        }
    }
}

fn with_progress(
    options: AnalysisOptions,
    global: &GlobalOptions,
    expected: Option<u64>,
) -> Result<(AnalysisOptions, Option<ProgressBar>), Box<dyn std::error::Error>> {
    if !global.progress {
        return Ok((options, None));
    }
    let progress = TerminalProgress::new(expected)?;
    let bar = progress.bar.clone();
    let mut options = options.with_progress(Arc::new(progress)).with_batch_size(30);
    if let Some(total) = expected {
        options = options.with_expected_frames(total);
    }
    Ok((options, Some(bar)))
}

fn score_label(score: f64) -> colored::ColoredString {
    let text = format!("{score:.1}/100");
    if score >= 90.0 {
        text.green().bold()
    } else if score >= 70.0 {
        text.yellow().bold()
    } else {
        text.red().bold()
    }
}

fn emit_report(
    report: &AnalysisReport,
    source: &Path,
    output: &OutputOptions,
    global: &GlobalOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut payload = report.to_json();
    if let Some(object) = payload.as_object_mut() {
        object.insert("source".to_string(), json!(source.display().to_string()));
    }
    let rendered = serde_json::to_string_pretty(&payload)?;

    if let Some(out) = &output.out {
        ensure_writable_path(out, global.overwrite)?;
        fs::write(out, &rendered)?;
        eprintln!("{} {}", "saved".green().bold(), out.display());
    }

    if output.json {
        println!("{rendered}");
        return Ok(());
    }

    println!("\nFile: {}", source.display());
    print!("{report}");
    match report.smoothness_score {
        Some(score) => println!("{} {}", "smoothness:".bold(), score_label(score)),
        None => println!(
            "{} {}",
            "smoothness:".bold(),
            "not enough frame-time data".yellow()
        ),
    }
    if report.cancelled {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "analysis was cancelled; results are partial".yellow()
        );
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        #[cfg(feature = "decode")]
        Commands::Analyze {
            input,
            output,
            tuning,
        } => {
            let options = analysis_options(&tuning)?;
            let source = VideoSource::open(&input, &options)?;
            let (options, bar) = with_progress(options, &cli.global, source.estimated_frames())?;
            let report = judder::analyze_with_options(source, &options)?;
            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }
            emit_report(&report, &input, &output, &cli.global)?;
        }
        Commands::AnalyzeFrames {
            directory,
            fps,
            output,
            tuning,
        } => {
            let options = analysis_options(&tuning)?;
            let frames = ImageSequence::open(&directory, fps, &options)?;
            if cli.global.verbose {
                eprintln!("found {} frame image(s)", frames.len());
            }
            let (options, bar) = with_progress(options, &cli.global, Some(frames.len() as u64))?;
            let report = judder::analyze_with_options(frames, &options)?;
            if let Some(bar) = bar {
                bar.finish_with_message("done");
            }
            emit_report(&report, &directory, &output, &cli.global)?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "judder", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
