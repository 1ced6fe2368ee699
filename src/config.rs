//! Startup configuration, loaded from an optional JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classes::{ClassFilter, DEFAULT_TRACK_CLASSES, VOC_CLASSES};
use crate::detector::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::error::{Error, Result};
use crate::pipeline::PipelineConfig;
use crate::preprocess::{BlobParams, SSD_INPUT_SIZE, SSD_MEAN, SSD_SCALE};
use crate::scheduler::DEFAULT_REDETECTION_INTERVAL;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub video: VideoConfig,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub prototxt: PathBuf,
    pub weights: PathBuf,
    pub num_classes: usize,
    pub input_size: usize,
    pub scale: f32,
    pub mean: [f32; 3],
    pub swap_rb: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            prototxt: PathBuf::from("MobileNetSSD_deploy.prototxt"),
            weights: PathBuf::from("MobileNetSSD_deploy.caffemodel"),
            num_classes: VOC_CLASSES.len(),
            input_size: SSD_INPUT_SIZE,
            scale: SSD_SCALE,
            mean: SSD_MEAN,
            swap_rb: false,
        }
    }
}

impl ModelConfig {
    pub fn blob_params(&self) -> BlobParams {
        BlobParams {
            size: self.input_size,
            scale: self.scale,
            mean: self.mean,
            swap_rb: self.swap_rb,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub fps: f64,
    pub codec: String,
    pub display: bool,
    pub window_title: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("cars.mp4"),
            output: PathBuf::from("output1.avi"),
            fps: 30.0,
            codec: "MJPG".to_string(),
            display: true,
            window_title: "Multi Object Tracking".to_string(),
        }
    }
}

impl VideoConfig {
    /// Codec as four characters, for building a FOURCC code.
    pub fn fourcc(&self) -> Result<[char; 4]> {
        let chars: Vec<char> = self.codec.chars().collect();
        match chars.as_slice() {
            [a, b, c, d] if chars.iter().all(char::is_ascii) => Ok([*a, *b, *c, *d]),
            _ => Err(Error::Config(format!(
                "codec '{}' must be exactly four ASCII characters",
                self.codec
            ))),
        }
    }
}

/// Visual tracker algorithm used for every tracked object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    #[default]
    Csrt,
    Kcf,
    Mil,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub classes: Vec<String>,
    pub track_classes: Vec<String>,
    pub redetection_interval: i64,
    pub confidence_threshold: f32,
    pub tracker: TrackerKind,
    pub prune_lost: bool,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            classes: VOC_CLASSES.iter().map(|s| s.to_string()).collect(),
            track_classes: DEFAULT_TRACK_CLASSES.iter().map(|s| s.to_string()).collect(),
            redetection_interval: DEFAULT_REDETECTION_INTERVAL,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            tracker: TrackerKind::default(),
            prune_lost: false,
        }
    }
}

impl TrackingConfig {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            redetection_interval: self.redetection_interval,
            confidence_threshold: self.confidence_threshold,
            prune_lost: self.prune_lost,
        }
    }

    pub fn class_filter(&self) -> Result<ClassFilter> {
        ClassFilter::new(self.classes.clone(), self.track_classes.clone())
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.tracking.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config(format!(
                "confidence threshold {threshold} is outside [0, 1]"
            )));
        }
        if self.model.input_size == 0 {
            return Err(Error::Config("model input size must be positive".into()));
        }
        if !(self.video.fps > 0.0) {
            return Err(Error::Config(format!(
                "output fps {} must be positive",
                self.video.fps
            )));
        }
        self.video.fourcc()?;
        self.tracking.class_filter()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tracking.redetection_interval, 30);
        assert_eq!(config.tracking.confidence_threshold, 0.5);
        assert_eq!(config.tracking.track_classes, vec!["person", "car"]);
        assert_eq!(config.model.num_classes, 21);
        assert_eq!(config.video.fourcc().unwrap(), ['M', 'J', 'P', 'G']);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(
            r#"{
                "tracking": { "track_classes": ["person"], "redetection_interval": 10, "tracker": "kcf" },
                "video": { "display": false }
            }"#,
        )
        .unwrap();

        assert_eq!(config.tracking.track_classes, vec!["person"]);
        assert_eq!(config.tracking.redetection_interval, 10);
        assert_eq!(config.tracking.tracker, TrackerKind::Kcf);
        assert_eq!(config.tracking.classes.len(), 21);
        assert!(!config.video.display);
        assert_eq!(config.video.fps, 30.0);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Config::from_json("{ nope"), Err(Error::Json(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.tracking.confidence_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.video.codec = "MJPEG".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tracking.track_classes.push("truck".into());
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.video.fps = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.video.fps = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_positive_interval_is_valid() {
        let mut config = Config::default();
        config.tracking.redetection_interval = 0;
        assert!(config.validate().is_ok());
        assert_eq!(config.tracking.pipeline_config().redetection_interval, 0);
    }
}
