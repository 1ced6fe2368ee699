use opencv::{core, imgproc, prelude::*};

use crate::error::Result;
use crate::pipeline::{FrameReport, Overlay};
use crate::preprocess::BBox;

const FONT: i32 = imgproc::FONT_HERSHEY_SIMPLEX;
const FONT_SCALE: f64 = 0.5;

fn green() -> core::Scalar {
    core::Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn blue() -> core::Scalar {
    core::Scalar::new(255.0, 0.0, 0.0, 0.0)
}

fn red() -> core::Scalar {
    core::Scalar::new(0.0, 0.0, 255.0, 0.0)
}

/// Draw every overlay of `report` onto the frame in place.
pub fn draw_report(frame: &mut core::Mat, report: &FrameReport) -> Result<()> {
    for overlay in &report.overlays {
        match overlay {
            Overlay::Detected { bbox, .. } => {
                draw_labeled_box(frame, bbox, &overlay.caption(), green())?
            }
            Overlay::Tracked { bbox, .. } => {
                draw_labeled_box(frame, bbox, &overlay.caption(), blue())?
            }
            Overlay::Lost { slot } => draw_lost(frame, *slot)?,
        }
    }
    Ok(())
}

fn draw_labeled_box(
    frame: &mut core::Mat,
    bbox: &BBox,
    caption: &str,
    color: core::Scalar,
) -> Result<()> {
    imgproc::rectangle(
        frame,
        core::Rect::new(bbox.x, bbox.y, bbox.width, bbox.height),
        color,
        2,
        imgproc::LINE_8,
        0,
    )?;

    let mut baseline = 0;
    let label_size = imgproc::get_text_size(caption, FONT, FONT_SCALE, 1, &mut baseline)?;
    let top = bbox.y.max(label_size.height);

    // filled background behind the caption
    imgproc::rectangle_points(
        frame,
        core::Point::new(bbox.x, top - label_size.height),
        core::Point::new(bbox.x + label_size.width, top + baseline),
        color,
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;

    imgproc::put_text(
        frame,
        caption,
        core::Point::new(bbox.x, top),
        FONT,
        FONT_SCALE,
        core::Scalar::new(0.0, 0.0, 0.0, 0.0),
        1,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}

fn draw_lost(frame: &mut core::Mat, slot: usize) -> Result<()> {
    imgproc::put_text(
        frame,
        "Lost",
        core::Point::new(50, 50 + slot as i32 * 20),
        FONT,
        FONT_SCALE,
        red(),
        1,
        imgproc::LINE_8,
        false,
    )?;
    Ok(())
}
