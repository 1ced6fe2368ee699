#[cfg(feature = "opencv-video")]
use std::{path::PathBuf, process::ExitCode};

#[cfg(feature = "opencv-video")]
use anyhow::{Context, Result};
#[cfg(feature = "opencv-video")]
use clap::Parser;
#[cfg(feature = "opencv-video")]
use opencv::core::Mat;
#[cfg(feature = "opencv-video")]
use redetect_tracker::{
    Config, Error, Pipeline,
    config::TrackerKind,
    cv_tracker::OpenCvTrackerFactory,
    dnn::SsdDetector,
    render::draw_report,
    video::{Display, VideoSink, VideoSource},
};
#[cfg(feature = "opencv-video")]
use tracing::{error, info};

#[cfg(feature = "opencv-video")]
#[derive(Parser, Debug)]
#[command(
    name = "redetect_tracker",
    about = "Detect objects with MobileNet-SSD and track them between redetections"
)]
struct Args {
    /// JSON configuration file; command line values override it
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    prototxt: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    weights: Option<PathBuf>,
    /// Run detection every N frames (N <= 0 detects on every frame)
    #[arg(long, allow_negative_numbers = true)]
    interval: Option<i64>,
    /// Minimum detector confidence, exclusive
    #[arg(long)]
    threshold: Option<f32>,
    /// Class label to track; repeat for several labels
    #[arg(long = "track", value_name = "LABEL")]
    track: Vec<String>,
    #[arg(long, value_enum)]
    tracker: Option<TrackerKind>,
    /// No window, no key polling
    #[arg(long)]
    headless: bool,
    /// Drop lost objects instead of keeping them until the next redetection
    #[arg(long)]
    prune_lost: bool,
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "opencv-video")]
impl Args {
    fn into_config(self) -> redetect_tracker::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(input) = self.input {
            config.video.input = input;
        }
        if let Some(output) = self.output {
            config.video.output = output;
        }
        if let Some(prototxt) = self.prototxt {
            config.model.prototxt = prototxt;
        }
        if let Some(weights) = self.weights {
            config.model.weights = weights;
        }
        if let Some(interval) = self.interval {
            config.tracking.redetection_interval = interval;
        }
        if let Some(threshold) = self.threshold {
            config.tracking.confidence_threshold = threshold;
        }
        if !self.track.is_empty() {
            config.tracking.track_classes = self.track;
        }
        if let Some(tracker) = self.tracker {
            config.tracking.tracker = tracker;
        }
        if self.headless {
            config.video.display = false;
        }
        if self.prune_lost {
            config.tracking.prune_lost = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(feature = "opencv-video")]
fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<Error>().is_some_and(Error::is_startup) {
                error!("startup failed: {:#}", e);
            } else {
                error!("{:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "opencv-video")]
fn run(args: Args) -> Result<()> {
    let config = args.into_config().context("Invalid configuration")?;
    let filter = config.tracking.class_filter()?;

    let detector = SsdDetector::load(
        &config.model.prototxt,
        &config.model.weights,
        config.model.blob_params(),
        config.model.num_classes,
    )
    .context("Failed to load detector")?;
    let factory = OpenCvTrackerFactory::new(config.tracking.tracker);
    let mut pipeline = Pipeline::new(
        detector,
        factory,
        filter,
        config.tracking.pipeline_config(),
    )?;

    let mut source = VideoSource::open(&config.video.input)?;
    let mut sink = VideoSink::open(
        &config.video.output,
        config.video.fourcc()?,
        config.video.fps,
        source.width(),
        source.height(),
    )?;
    let display = if config.video.display {
        Display::open(&config.video.window_title)
    } else {
        None
    };

    info!(
        interval = config.tracking.redetection_interval,
        threshold = config.tracking.confidence_threshold,
        tracker = ?config.tracking.tracker,
        classes = ?config.tracking.track_classes,
        "tracking started"
    );

    let mut frame = Mat::default();
    while source.read(&mut frame)? {
        let report = pipeline.process(&frame);

        draw_report(&mut frame, &report)?;
        sink.write(&frame)?;

        if let Some(display) = &display {
            if display.show(&frame)? {
                info!(frame = report.frame_index, "escape pressed, stopping");
                break;
            }
        }
    }

    let stats = pipeline.stats();
    info!(
        frames = stats.frames,
        redetections = stats.redetections,
        objects_seeded = stats.objects_seeded,
        objects_lost = stats.objects_lost,
        frames_written = sink.frames_written(),
        "tracking finished"
    );

    drop(display);
    source.release()?;
    sink.release()?;

    Ok(())
}

#[cfg(not(feature = "opencv-video"))]
fn main() {
    println!("OpenCV video support not enabled.");
    println!("Build with: cargo build --features opencv-video");
}
