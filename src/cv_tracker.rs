use opencv::{
    core::{Mat, Ptr, Rect},
    prelude::*,
    tracking::{TrackerCSRT, TrackerKCF, TrackerKCF_Params},
    video::TrackerMIL,
};

use crate::config::TrackerKind;
use crate::error::Result;
use crate::preprocess::BBox;
use crate::tracker::{TrackerFactory, TrackingResult, VisualTracker};

enum Handle {
    Csrt(Ptr<TrackerCSRT>),
    Kcf(Ptr<TrackerKCF>),
    Mil(Ptr<TrackerMIL>),
}

/// One of OpenCV's single-object trackers
pub struct OpenCvTracker {
    handle: Handle,
    rect: Rect,
}

impl OpenCvTracker {
    pub fn new(kind: TrackerKind) -> Result<Self> {
        let handle = match kind {
            TrackerKind::Csrt => Handle::Csrt(TrackerCSRT::create_def()?),
            TrackerKind::Kcf => Handle::Kcf(TrackerKCF::create(TrackerKCF_Params::default()?)?),
            TrackerKind::Mil => Handle::Mil(TrackerMIL::create_def()?),
        };

        Ok(Self {
            handle,
            rect: Rect::default(),
        })
    }
}

impl VisualTracker<Mat> for OpenCvTracker {
    fn init(&mut self, frame: &Mat, bbox: BBox) -> Result<()> {
        let rect = Rect::new(bbox.x, bbox.y, bbox.width, bbox.height);
        match &mut self.handle {
            Handle::Csrt(t) => t.init(frame, rect)?,
            Handle::Kcf(t) => t.init(frame, rect)?,
            Handle::Mil(t) => t.init(frame, rect)?,
        }
        self.rect = rect;
        Ok(())
    }

    fn update(&mut self, frame: &Mat) -> Result<TrackingResult> {
        let mut rect = self.rect;
        let found = match &mut self.handle {
            Handle::Csrt(t) => t.update(frame, &mut rect)?,
            Handle::Kcf(t) => t.update(frame, &mut rect)?,
            Handle::Mil(t) => t.update(frame, &mut rect)?,
        };

        if found {
            self.rect = rect;
        }

        let bbox = BBox::new(self.rect.x, self.rect.y, self.rect.width, self.rect.height);
        Ok(if found {
            TrackingResult::found(bbox)
        } else {
            TrackingResult::lost(bbox)
        })
    }
}

/// Builds a tracker of the configured kind for each new object
#[derive(Debug, Clone, Copy)]
pub struct OpenCvTrackerFactory {
    kind: TrackerKind,
}

impl OpenCvTrackerFactory {
    pub fn new(kind: TrackerKind) -> Self {
        Self { kind }
    }
}

impl TrackerFactory<Mat> for OpenCvTrackerFactory {
    type Tracker = OpenCvTracker;

    fn create(&mut self) -> Result<OpenCvTracker> {
        OpenCvTracker::new(self.kind)
    }
}
