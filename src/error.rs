use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    #[error("Failed to open input video {path}: {reason}")]
    VideoOpen { path: String, reason: String },
    #[error("Failed to open output video {path}: {reason}")]
    WriterOpen { path: String, reason: String },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Failed to run inference: {0}")]
    Inference(String),
    #[error("Tracker failure: {0}")]
    Tracker(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("OpenCV error: {0}")]
    Backend(String),
}

#[cfg(feature = "opencv-video")]
impl From<opencv::Error> for Error {
    fn from(e: opencv::Error) -> Self {
        Error::Backend(e.to_string())
    }
}

impl Error {
    /// Errors that can only happen before the first frame is processed.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Error::ModelLoad(_)
                | Error::VideoOpen { .. }
                | Error::WriterOpen { .. }
                | Error::Config(_)
                | Error::Io(_)
                | Error::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
