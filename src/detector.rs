//! Detector seam and candidate selection.

use tracing::warn;

use crate::classes::ClassFilter;
use crate::error::Result;
use crate::postprocess::Candidate;
use crate::preprocess::BBox;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Object detection backend.
///
/// Implement this trait to connect any detection model to the pipeline.
pub trait Detector<F: ?Sized> {
    /// Number of classes the model was trained on, background included.
    fn num_classes(&self) -> usize;

    /// Run inference on one frame and return every candidate in pixel space.
    ///
    /// Implementations should not filter by confidence; the pipeline does.
    fn detect(&mut self, frame: &F) -> Result<Vec<Candidate>>;
}

/// A candidate that passed the confidence threshold and the class filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    pub bbox: BBox,
}

/// Keep candidates strictly above `threshold` whose label is tracked.
pub fn select_candidates(
    candidates: &[Candidate],
    filter: &ClassFilter,
    threshold: f32,
) -> Vec<Detection> {
    let mut selected = Vec::new();

    for candidate in candidates {
        if candidate.confidence <= threshold {
            continue;
        }

        let Some(label) = filter.label(candidate.class_id) else {
            warn!(
                class_id = candidate.class_id,
                "detector class id outside the class vocabulary, dropping candidate"
            );
            continue;
        };

        if !filter.is_tracked(label) {
            continue;
        }

        selected.push(Detection {
            label: label.to_string(),
            confidence: candidate.confidence,
            bbox: candidate.bbox,
        });
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(class_id: usize, confidence: f32) -> Candidate {
        Candidate::new(class_id, confidence, BBox::new(10, 10, 30, 60))
    }

    #[test]
    fn test_threshold_is_strict() {
        let filter = ClassFilter::default();
        let selected = select_candidates(
            &[candidate(15, 0.5), candidate(15, 0.51), candidate(7, 0.4)],
            &filter,
            DEFAULT_CONFIDENCE_THRESHOLD,
        );

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "person");
        assert!((selected[0].confidence - 0.51).abs() < 1e-6);
    }

    #[test]
    fn test_class_outside_allow_list_dropped() {
        let filter = ClassFilter::default();
        let selected = select_candidates(
            &[candidate(12, 0.99), candidate(7, 0.95), candidate(400, 0.99)],
            &filter,
            DEFAULT_CONFIDENCE_THRESHOLD,
        );

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "car");
    }

    #[test]
    fn test_order_preserved() {
        let filter = ClassFilter::default();
        let selected = select_candidates(
            &[candidate(7, 0.6), candidate(15, 0.9), candidate(7, 0.7)],
            &filter,
            DEFAULT_CONFIDENCE_THRESHOLD,
        );

        let labels: Vec<&str> = selected.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["car", "person", "car"]);
    }
}
