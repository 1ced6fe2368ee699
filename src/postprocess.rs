use ndarray::ArrayView2;

use crate::preprocess::BBox;

/// Values per SSD detection row: [image_id, class_id, confidence, x1, y1, x2, y2]
pub const SSD_ROW_LEN: usize = 7;

/// Single detector output, already in pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BBox,
}

impl Candidate {
    pub fn new(class_id: usize, confidence: f32, bbox: BBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }
}

/// Decode a flat DetectionOutput buffer (1x1xNx7).
///
/// A buffer whose length is not a multiple of the row length is treated as
/// malformed and yields no candidates.
pub fn decode_ssd_flat(data: &[f32], frame_width: i32, frame_height: i32) -> Vec<Candidate> {
    if data.len() % SSD_ROW_LEN != 0 {
        return Vec::new();
    }

    match ArrayView2::from_shape((data.len() / SSD_ROW_LEN, SSD_ROW_LEN), data) {
        Ok(rows) => decode_ssd(&rows, frame_width, frame_height),
        Err(_) => Vec::new(),
    }
}

/// Decode SSD detection rows into candidates
///
/// # Arguments
/// * `rows` - Detection matrix (N x 7), corner coordinates normalized to [0, 1]
/// * `frame_width` - Frame width used to scale x coordinates
/// * `frame_height` - Frame height used to scale y coordinates
///
/// # Returns
/// * Every well-formed row as a candidate; confidence is not filtered here
pub fn decode_ssd(rows: &ArrayView2<f32>, frame_width: i32, frame_height: i32) -> Vec<Candidate> {
    if rows.ncols() != SSD_ROW_LEN {
        return Vec::new();
    }

    let mut candidates = Vec::with_capacity(rows.nrows());

    for row in rows.rows() {
        if row.iter().any(|v| !v.is_finite()) {
            continue;
        }

        let class_id = row[1];
        let confidence = row[2];

        // padding rows carry a negative class id
        if class_id < 0.0 || !(0.0..=1.0).contains(&confidence) {
            continue;
        }

        let x1 = (row[3] * frame_width as f32) as i32;
        let y1 = (row[4] * frame_height as f32) as i32;
        let x2 = (row[5] * frame_width as f32) as i32;
        let y2 = (row[6] * frame_height as f32) as i32;

        let bbox = BBox::from_corners(x1, y1, x2, y2);
        if bbox.is_empty() {
            continue;
        }

        candidates.push(Candidate::new(class_id as usize, confidence, bbox));
    }

    candidates
}
