use crate::error::{Error, Result};

/// MobileNet-SSD input side length
pub const SSD_INPUT_SIZE: usize = 300;
/// MobileNet-SSD scale factor (1 / 127.5)
pub const SSD_SCALE: f32 = 0.007843;
/// MobileNet-SSD per-channel mean
pub const SSD_MEAN: [f32; 3] = [127.5, 127.5, 127.5];
/// The network takes 3-channel BGR frames
pub const SSD_INPUT_CHANNELS: i32 = 3;

/// Bounding box [x, y, width, height] in pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Box spanning two corners, width and height taken as plain differences.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// Parameters for turning a frame into a detector input blob
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobParams {
    pub size: usize,
    pub scale: f32,
    pub mean: [f32; 3],
    pub swap_rb: bool,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            size: SSD_INPUT_SIZE,
            scale: SSD_SCALE,
            mean: SSD_MEAN,
            swap_rb: false,
        }
    }
}

/// Reject frames whose channel count the network cannot take.
pub fn check_input_channels(channels: i32) -> Result<()> {
    if channels != SSD_INPUT_CHANNELS {
        return Err(Error::Inference(format!(
            "expected a {SSD_INPUT_CHANNELS}-channel frame, got {channels} channel(s)"
        )));
    }
    Ok(())
}
