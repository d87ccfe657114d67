use thiserror::Error;

use crate::workflow::Step;

#[derive(Debug, Error)]
pub enum StyleError {
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    /// The analysis call failed or returned unusable data.
    #[error("{0}")]
    Analysis(String),
    /// The generation call failed or returned no usable image.
    #[error("{0}")]
    Generation(String),
    #[error("Nothing to export: {0}")]
    NothingToExport(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures turning user media into an `EncodedImage`.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No file selected")]
    NoFileSelected,
    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),
    #[error("Could not access camera. Please check permissions.")]
    CameraUnavailable(String),
    #[error("Camera stream is closed")]
    StreamClosed,
    #[error("Failed to encode frame: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("'{event}' is not allowed while in step {step}")]
    InvalidTransition { step: Step, event: &'static str },
    #[error("A request is already in flight")]
    CallInFlight,
}

pub type Result<T> = std::result::Result<T, StyleError>;
