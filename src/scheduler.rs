pub const DEFAULT_REDETECTION_INTERVAL: i64 = 30;

/// Decides per frame whether to run the detector or advance the trackers.
#[derive(Debug, Clone, Copy)]
pub struct RedetectionScheduler {
    interval: i64,
}

impl Default for RedetectionScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_REDETECTION_INTERVAL)
    }
}

impl RedetectionScheduler {
    /// A non-positive interval makes every frame a detection frame.
    pub fn new(interval: i64) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> i64 {
        self.interval
    }

    /// `frame_counter` starts at 1 for the first frame of the stream.
    pub fn should_detect(&self, frame_counter: u64, pool_empty: bool) -> bool {
        if self.interval <= 0 {
            return true;
        }
        frame_counter % self.interval as u64 == 1 || pool_empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_detection() {
        let scheduler = RedetectionScheduler::default();
        let fired: Vec<u64> = (1..=100)
            .filter(|&f| scheduler.should_detect(f, false))
            .collect();
        assert_eq!(fired, vec![1, 31, 61, 91]);
    }

    #[test]
    fn test_empty_pool_forces_detection() {
        let scheduler = RedetectionScheduler::new(30);
        for f in 1..=90 {
            assert!(scheduler.should_detect(f, true));
        }
    }

    #[test]
    fn test_decision_matches_modulo_rule() {
        for interval in 1..=12i64 {
            let scheduler = RedetectionScheduler::new(interval);
            for f in 1..=200u64 {
                for pool_empty in [false, true] {
                    let expected = f % interval as u64 == 1 || pool_empty;
                    assert_eq!(scheduler.should_detect(f, pool_empty), expected);
                }
            }
        }
    }

    #[test]
    fn test_non_positive_interval_always_detects() {
        for interval in [0, -1, -30] {
            let scheduler = RedetectionScheduler::new(interval);
            for f in 1..=50 {
                assert!(scheduler.should_detect(f, false));
            }
        }
    }
}
