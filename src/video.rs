//! Video input, output and display on top of OpenCV's videoio and highgui.

use std::path::Path;

use opencv::{
    core::{Mat, Size},
    highgui,
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};
use tracing::{info, warn};

use crate::error::{Error, Result};

const ESCAPE_KEY: i32 = 27;

/// Decoded frames of an input video, in capture order
pub struct VideoSource {
    capture: VideoCapture,
    width: i32,
    height: i32,
}

impl VideoSource {
    pub fn open(path: &Path) -> Result<Self> {
        let name = path.display().to_string();
        let open_error = |reason: String| Error::VideoOpen {
            path: name.clone(),
            reason,
        };

        let capture = VideoCapture::from_file(&name, videoio::CAP_ANY)
            .map_err(|e| open_error(e.to_string()))?;
        if !capture.is_opened()? {
            return Err(open_error("no backend could open the file".into()));
        }

        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32;
        info!(input = %name, width, height, "input video opened");

        Ok(Self {
            capture,
            width,
            height,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Read the next frame. Returns false at end of stream.
    pub fn read(&mut self, frame: &mut Mat) -> Result<bool> {
        if !self.capture.read(frame)? {
            return Ok(false);
        }
        Ok(!frame.empty())
    }

    pub fn release(mut self) -> Result<()> {
        self.capture.release()?;
        Ok(())
    }
}

/// Encoded output video
pub struct VideoSink {
    writer: VideoWriter,
    frames_written: u64,
}

impl VideoSink {
    pub fn open(path: &Path, fourcc: [char; 4], fps: f64, width: i32, height: i32) -> Result<Self> {
        let name = path.display().to_string();
        let [a, b, c, d] = fourcc;
        let code = VideoWriter::fourcc(a, b, c, d)?;

        let writer = VideoWriter::new(&name, code, fps, Size::new(width, height), true).map_err(
            |e| Error::WriterOpen {
                path: name.clone(),
                reason: e.to_string(),
            },
        )?;
        if !writer.is_opened()? {
            return Err(Error::WriterOpen {
                path: name,
                reason: format!("codec {a}{b}{c}{d} is not available"),
            });
        }

        info!(output = %name, fps, "output video opened");

        Ok(Self {
            writer,
            frames_written: 0,
        })
    }

    pub fn write(&mut self, frame: &Mat) -> Result<()> {
        self.writer.write(frame)?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn release(mut self) -> Result<()> {
        self.writer.release()?;
        Ok(())
    }
}

/// On-screen preview window
pub struct Display {
    title: String,
}

impl Display {
    /// Returns None (headless) when no window can be created.
    pub fn open(title: &str) -> Option<Self> {
        match highgui::named_window(title, highgui::WINDOW_AUTOSIZE) {
            Ok(()) => Some(Self {
                title: title.to_string(),
            }),
            Err(e) => {
                warn!("Failed to open display window: {}. Running headless.", e);
                None
            }
        }
    }

    /// Show the frame and poll the keyboard once. Returns true when escape was pressed.
    pub fn show(&self, frame: &Mat) -> Result<bool> {
        highgui::imshow(&self.title, frame)?;
        Ok(highgui::wait_key(1)? == ESCAPE_KEY)
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        let _ = highgui::destroy_all_windows();
    }
}
