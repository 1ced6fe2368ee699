use tracing::warn;

use crate::error::Result;
use crate::preprocess::BBox;

/// Outcome of advancing a tracker by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackingResult {
    pub success: bool,
    pub bbox: BBox,
}

impl TrackingResult {
    pub fn found(bbox: BBox) -> Self {
        Self {
            success: true,
            bbox,
        }
    }

    pub fn lost(bbox: BBox) -> Self {
        Self {
            success: false,
            bbox,
        }
    }
}

/// Single-object visual tracker.
///
/// Any algorithm that can be seeded with a box on one frame and then follow
/// that box through subsequent frames fits here.
pub trait VisualTracker<F: ?Sized> {
    /// Seed the tracker with the object's box on `frame`.
    fn init(&mut self, frame: &F, bbox: BBox) -> Result<()>;

    /// Estimate the object's box on the next frame.
    fn update(&mut self, frame: &F) -> Result<TrackingResult>;
}

/// Creates a fresh tracker for every newly detected object.
pub trait TrackerFactory<F: ?Sized> {
    type Tracker: VisualTracker<F>;

    fn create(&mut self) -> Result<Self::Tracker>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Active,
    /// Terminal until the object is discarded at the next redetection.
    Lost,
}

/// An object being followed between redetections. Its slot in the pool is its identity.
#[derive(Debug)]
pub struct TrackedObject<T> {
    label: String,
    confidence: f32,
    bbox: BBox,
    state: TrackState,
    tracker: T,
}

impl<T> TrackedObject<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Detector confidence at the redetection that created this object.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Last known good box.
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn state(&self) -> TrackState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TrackState::Active
    }
}

/// Owns one tracker per tracked object.
#[derive(Debug)]
pub struct TrackerPool<T> {
    objects: Vec<TrackedObject<T>>,
}

impl<T> Default for TrackerPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TrackerPool<T> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[TrackedObject<T>] {
        &self.objects
    }

    pub fn active_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_active()).count()
    }

    pub fn lost_count(&self) -> usize {
        self.len() - self.active_count()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Initialize `tracker` on `frame` and add it as a new active object.
    ///
    /// The object is only added when initialization succeeds.
    pub fn seed<F: ?Sized>(
        &mut self,
        mut tracker: T,
        frame: &F,
        label: &str,
        confidence: f32,
        bbox: BBox,
    ) -> Result<()>
    where
        T: VisualTracker<F>,
    {
        tracker.init(frame, bbox)?;
        self.objects.push(TrackedObject {
            label: label.to_string(),
            confidence,
            bbox,
            state: TrackState::Active,
            tracker,
        });
        Ok(())
    }

    /// Advance every tracker by one frame.
    ///
    /// Lost objects are still advanced but never become active again.
    /// Returns how many objects were lost on this frame.
    pub fn advance<F: ?Sized>(&mut self, frame: &F) -> usize
    where
        T: VisualTracker<F>,
    {
        let mut newly_lost = 0;

        for (slot, object) in self.objects.iter_mut().enumerate() {
            let outcome = object.tracker.update(frame);
            if object.state == TrackState::Lost {
                continue;
            }

            match outcome {
                Ok(result) if result.success => object.bbox = result.bbox,
                Ok(_) => {
                    warn!(slot, label = %object.label, "tracker lost its target");
                    object.state = TrackState::Lost;
                    newly_lost += 1;
                }
                Err(e) => {
                    warn!(slot, label = %object.label, "tracker update failed: {}", e);
                    object.state = TrackState::Lost;
                    newly_lost += 1;
                }
            }
        }

        newly_lost
    }

    /// Drop lost objects. Returns how many were removed.
    pub fn prune_lost(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| o.is_active());
        before - self.objects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Replays a fixed list of update outcomes, then keeps repeating the last one.
    struct ScriptedTracker {
        script: Vec<Option<BBox>>,
        calls: usize,
        fail_init: bool,
    }

    impl ScriptedTracker {
        fn new(script: Vec<Option<BBox>>) -> Self {
            Self {
                script,
                calls: 0,
                fail_init: false,
            }
        }
    }

    impl VisualTracker<()> for ScriptedTracker {
        fn init(&mut self, _frame: &(), bbox: BBox) -> Result<()> {
            if self.fail_init || bbox.is_empty() {
                return Err(Error::Tracker("cannot initialize".into()));
            }
            Ok(())
        }

        fn update(&mut self, _frame: &()) -> Result<TrackingResult> {
            let step = self.script[self.calls.min(self.script.len() - 1)];
            self.calls += 1;
            Ok(match step {
                Some(bbox) => TrackingResult::found(bbox),
                None => TrackingResult::lost(BBox::default()),
            })
        }
    }

    #[test]
    fn test_seed_and_advance() {
        let mut pool = TrackerPool::new();
        let start = BBox::new(10, 10, 20, 20);
        let moved = BBox::new(12, 11, 20, 20);

        pool.seed(ScriptedTracker::new(vec![Some(moved)]), &(), "person", 0.9, start)
            .unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.objects()[0].bbox(), start);

        assert_eq!(pool.advance(&()), 0);
        assert_eq!(pool.objects()[0].bbox(), moved);
        assert!(pool.objects()[0].is_active());
    }

    #[test]
    fn test_failed_init_is_not_added() {
        let mut pool = TrackerPool::new();
        let mut tracker = ScriptedTracker::new(vec![None]);
        tracker.fail_init = true;

        assert!(pool.seed(tracker, &(), "car", 0.8, BBox::new(0, 0, 5, 5)).is_err());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_lost_is_terminal() {
        let mut pool = TrackerPool::new();
        let start = BBox::new(10, 10, 20, 20);
        let later = BBox::new(40, 40, 20, 20);
        let script = vec![Some(start), None, Some(later)];

        pool.seed(ScriptedTracker::new(script), &(), "car", 0.8, start)
            .unwrap();

        assert_eq!(pool.advance(&()), 0);
        assert_eq!(pool.advance(&()), 1);
        assert_eq!(pool.objects()[0].state(), TrackState::Lost);

        // the underlying tracker reports success again, the object stays lost
        assert_eq!(pool.advance(&()), 0);
        assert_eq!(pool.objects()[0].state(), TrackState::Lost);
        assert_eq!(pool.objects()[0].bbox(), start);
        assert_eq!(pool.objects()[0].tracker.calls, 3);
    }

    #[test]
    fn test_prune_lost() {
        let mut pool = TrackerPool::new();
        let bbox = BBox::new(0, 0, 10, 10);
        pool.seed(ScriptedTracker::new(vec![Some(bbox)]), &(), "person", 0.9, bbox)
            .unwrap();
        pool.seed(ScriptedTracker::new(vec![None]), &(), "car", 0.7, bbox)
            .unwrap();

        pool.advance(&());
        assert_eq!(pool.active_count(), 1);
        assert_eq!(pool.lost_count(), 1);

        assert_eq!(pool.prune_lost(), 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.objects()[0].label(), "person");
    }
}
