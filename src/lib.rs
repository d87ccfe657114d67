pub mod capture;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod view;
pub mod workflow;

pub use capture::{capture_file, CameraConstraints, CameraDevice, CameraSession};
pub use config::{Config, GeminiConfig};
pub use error::{CaptureError, Result, StyleError, WorkflowError};
pub use gemini::GeminiClient;
pub use models::{EncodedImage, StyleDescription};
pub use view::{render, Body, Exporter, View};
pub use workflow::{Event, Session, Step, StyleService, WorkflowState};
