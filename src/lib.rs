pub mod classes;
pub mod config;
pub mod detector;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod postprocess;
pub mod preprocess;
pub mod scheduler;
pub mod tracker;

#[cfg(feature = "opencv-video")]
pub mod cv_tracker;
#[cfg(feature = "opencv-video")]
pub mod dnn;
#[cfg(feature = "opencv-video")]
pub mod render;
#[cfg(feature = "opencv-video")]
pub mod video;

pub use classes::ClassFilter;
pub use config::Config;
pub use detector::{Detection, Detector};
pub use error::{Error, Result};
pub use frame::Frame;
pub use pipeline::{FrameReport, Overlay, Phase, Pipeline, PipelineConfig};
pub use postprocess::Candidate;
pub use preprocess::BBox;
pub use tracker::{TrackState, TrackerFactory, TrackerPool, TrackingResult, VisualTracker};
