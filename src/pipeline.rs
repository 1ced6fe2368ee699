//! Detect-then-track frame pipeline.

use std::marker::PhantomData;

use tracing::{debug, info, warn};

use crate::classes::ClassFilter;
use crate::detector::{DEFAULT_CONFIDENCE_THRESHOLD, Detector, select_candidates};
use crate::error::Result;
use crate::preprocess::BBox;
use crate::scheduler::{DEFAULT_REDETECTION_INTERVAL, RedetectionScheduler};
use crate::tracker::{TrackState, TrackerFactory, TrackerPool};

/// Pipeline tuning
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub redetection_interval: i64,
    pub confidence_threshold: f32,
    /// Drop lost objects right away instead of keeping them until redetection.
    pub prune_lost: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            redetection_interval: DEFAULT_REDETECTION_INTERVAL,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            prune_lost: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Detection,
    Tracking,
}

/// Something to draw on a processed frame
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Fresh detection that seeded a tracker
    Detected {
        label: String,
        confidence: f32,
        bbox: BBox,
    },
    /// Tracker position for an active object
    Tracked {
        label: String,
        confidence: f32,
        bbox: BBox,
    },
    /// Lost object, drawn at a fixed position keyed by its slot
    Lost { slot: usize },
}

impl Overlay {
    pub fn caption(&self) -> String {
        match self {
            Overlay::Detected {
                label, confidence, ..
            }
            | Overlay::Tracked {
                label, confidence, ..
            } => format!("{}: {:.2}%", label, confidence * 100.0),
            Overlay::Lost { .. } => "Lost".to_string(),
        }
    }

    pub fn bbox(&self) -> Option<BBox> {
        match self {
            Overlay::Detected { bbox, .. } | Overlay::Tracked { bbox, .. } => Some(*bbox),
            Overlay::Lost { .. } => None,
        }
    }
}

/// Result of processing one frame
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// 1-based position of the frame in the stream
    pub frame_index: u64,
    pub phase: Phase,
    pub overlays: Vec<Overlay>,
}

impl FrameReport {
    pub fn lost_slots(&self) -> Vec<usize> {
        self.overlays
            .iter()
            .filter_map(|o| match o {
                Overlay::Lost { slot } => Some(*slot),
                _ => None,
            })
            .collect()
    }

    pub fn boxes(&self) -> Vec<BBox> {
        self.overlays.iter().filter_map(Overlay::bbox).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames: u64,
    pub redetections: u64,
    pub objects_seeded: u64,
    pub objects_lost: u64,
}

/// Owns the detector, the tracker pool and the redetection schedule.
pub struct Pipeline<F: ?Sized, D, K>
where
    D: Detector<F>,
    K: TrackerFactory<F>,
{
    detector: D,
    factory: K,
    filter: ClassFilter,
    scheduler: RedetectionScheduler,
    pool: TrackerPool<K::Tracker>,
    config: PipelineConfig,
    frame_counter: u64,
    stats: PipelineStats,
    _frame: PhantomData<fn(&F)>,
}

impl<F: ?Sized, D, K> Pipeline<F, D, K>
where
    D: Detector<F>,
    K: TrackerFactory<F>,
{
    /// Fails when the class vocabulary does not match the detector's class count.
    pub fn new(
        detector: D,
        factory: K,
        filter: ClassFilter,
        config: PipelineConfig,
    ) -> Result<Self> {
        filter.validate_class_count(detector.num_classes())?;

        if config.redetection_interval <= 0 {
            info!(
                interval = config.redetection_interval,
                "non-positive redetection interval, detecting on every frame"
            );
        }

        Ok(Self {
            detector,
            factory,
            filter,
            scheduler: RedetectionScheduler::new(config.redetection_interval),
            pool: TrackerPool::new(),
            config,
            frame_counter: 0,
            stats: PipelineStats::default(),
            _frame: PhantomData,
        })
    }

    /// Process the next frame of the stream.
    ///
    /// Per-frame anomalies (detector errors, trackers failing) are logged and
    /// absorbed; they only reduce the number of tracked objects.
    pub fn process(&mut self, frame: &F) -> FrameReport {
        self.frame_counter += 1;
        self.stats.frames += 1;

        let (phase, overlays) = if self
            .scheduler
            .should_detect(self.frame_counter, self.pool.is_empty())
        {
            (Phase::Detection, self.redetect(frame))
        } else {
            (Phase::Tracking, self.track(frame))
        };

        FrameReport {
            frame_index: self.frame_counter,
            phase,
            overlays,
        }
    }

    fn redetect(&mut self, frame: &F) -> Vec<Overlay> {
        self.pool.clear();
        self.stats.redetections += 1;

        let candidates = match self.detector.detect(frame) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(frame = self.frame_counter, "detection failed: {}", e);
                Vec::new()
            }
        };
        let detections =
            select_candidates(&candidates, &self.filter, self.config.confidence_threshold);

        let mut overlays = Vec::with_capacity(detections.len());
        for detection in detections {
            let seeded = match self.factory.create() {
                Ok(tracker) => self.pool.seed(
                    tracker,
                    frame,
                    &detection.label,
                    detection.confidence,
                    detection.bbox,
                ),
                Err(e) => Err(e),
            };

            match seeded {
                Ok(()) => overlays.push(Overlay::Detected {
                    label: detection.label,
                    confidence: detection.confidence,
                    bbox: detection.bbox,
                }),
                Err(e) => warn!(
                    frame = self.frame_counter,
                    label = %detection.label,
                    "failed to start tracker: {}",
                    e
                ),
            }
        }

        self.stats.objects_seeded += self.pool.len() as u64;
        debug!(
            frame = self.frame_counter,
            candidates = candidates.len(),
            tracked = self.pool.len(),
            "redetection"
        );

        overlays
    }

    fn track(&mut self, frame: &F) -> Vec<Overlay> {
        let newly_lost = self.pool.advance(frame);
        self.stats.objects_lost += newly_lost as u64;

        if self.config.prune_lost {
            self.pool.prune_lost();
        }

        self.pool
            .objects()
            .iter()
            .enumerate()
            .map(|(slot, object)| match object.state() {
                TrackState::Active => Overlay::Tracked {
                    label: object.label().to_string(),
                    confidence: object.confidence(),
                    bbox: object.bbox(),
                },
                TrackState::Lost => Overlay::Lost { slot },
            })
            .collect()
    }

    pub fn pool(&self) -> &TrackerPool<K::Tracker> {
        &self.pool
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn filter(&self) -> &ClassFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captions() {
        let detected = Overlay::Detected {
            label: "person".into(),
            confidence: 0.9,
            bbox: BBox::new(1, 2, 3, 4),
        };
        assert_eq!(detected.caption(), "person: 90.00%");
        assert_eq!(detected.bbox(), Some(BBox::new(1, 2, 3, 4)));

        let lost = Overlay::Lost { slot: 2 };
        assert_eq!(lost.caption(), "Lost");
        assert_eq!(lost.bbox(), None);
    }

    #[test]
    fn test_report_helpers() {
        let report = FrameReport {
            frame_index: 5,
            phase: Phase::Tracking,
            overlays: vec![
                Overlay::Tracked {
                    label: "car".into(),
                    confidence: 0.7,
                    bbox: BBox::new(0, 0, 10, 10),
                },
                Overlay::Lost { slot: 1 },
            ],
        };
        assert_eq!(report.lost_slots(), vec![1]);
        assert_eq!(report.boxes(), vec![BBox::new(0, 0, 10, 10)]);
    }
}
