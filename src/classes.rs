use crate::error::{Error, Result};

/// Pascal VOC labels, in MobileNet-SSD output order
pub const VOC_CLASSES: [&str; 21] = [
    "background",
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "pottedplant",
    "sheep",
    "sofa",
    "train",
    "tvmonitor",
];

pub const DEFAULT_TRACK_CLASSES: [&str; 2] = ["person", "car"];

/// Maps detector class indices to labels and decides which labels are tracked.
#[derive(Debug, Clone)]
pub struct ClassFilter {
    vocabulary: Vec<String>,
    allowed: Vec<String>,
}

impl Default for ClassFilter {
    fn default() -> Self {
        Self {
            vocabulary: VOC_CLASSES.iter().map(|s| s.to_string()).collect(),
            allowed: DEFAULT_TRACK_CLASSES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClassFilter {
    /// Fails if an allowed label is missing from the vocabulary.
    pub fn new(vocabulary: Vec<String>, allowed: Vec<String>) -> Result<Self> {
        if vocabulary.is_empty() {
            return Err(Error::Config("class vocabulary is empty".into()));
        }
        if let Some(unknown) = allowed.iter().find(|label| !vocabulary.contains(label)) {
            return Err(Error::Config(format!(
                "tracked class '{unknown}' is not in the class vocabulary"
            )));
        }

        Ok(Self {
            vocabulary,
            allowed,
        })
    }

    /// The vocabulary and the detector must agree on indexing.
    pub fn validate_class_count(&self, detector_classes: usize) -> Result<()> {
        if self.vocabulary.len() != detector_classes {
            return Err(Error::Config(format!(
                "class vocabulary has {} labels but the detector emits {} classes",
                self.vocabulary.len(),
                detector_classes
            )));
        }
        Ok(())
    }

    pub fn label(&self, class_id: usize) -> Option<&str> {
        self.vocabulary.get(class_id).map(String::as_str)
    }

    pub fn is_tracked(&self, label: &str) -> bool {
        self.allowed.iter().any(|allowed| allowed == label)
    }

    /// Label of `class_id` if that class should be tracked.
    pub fn accept(&self, class_id: usize) -> Option<&str> {
        self.label(class_id).filter(|label| self.is_tracked(label))
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_vocabulary_indices() {
        let filter = ClassFilter::default();
        assert_eq!(filter.vocabulary().len(), 21);
        assert_eq!(filter.label(0), Some("background"));
        assert_eq!(filter.label(7), Some("car"));
        assert_eq!(filter.label(15), Some("person"));
        assert_eq!(filter.label(21), None);
    }

    #[test]
    fn test_accept_allow_list() {
        let filter = ClassFilter::default();
        assert_eq!(filter.accept(15), Some("person"));
        assert_eq!(filter.accept(7), Some("car"));
        assert_eq!(filter.accept(12), None);
        assert_eq!(filter.accept(99), None);
    }

    #[test]
    fn test_unknown_allowed_label_rejected() {
        let err = ClassFilter::new(labels(&VOC_CLASSES), labels(&["person", "truck"]));
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        assert!(ClassFilter::new(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_class_count_mismatch() {
        let filter = ClassFilter::default();
        assert!(filter.validate_class_count(21).is_ok());
        assert!(filter.validate_class_count(80).is_err());
    }
}
