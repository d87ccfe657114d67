//! Turns user media into an `EncodedImage`: a picked file or a camera frame.

pub mod camera;
pub mod file;

pub use camera::{CameraConstraints, CameraDevice, CameraSession, Facing, NoCamera};
pub use file::capture_file;
