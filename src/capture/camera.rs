use std::io::Cursor;

use image::{
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
    RgbImage,
};

use crate::{error::CaptureError, models::EncodedImage};

pub const MAX_FRAME_WIDTH: u32 = 1280;
pub const MAX_FRAME_HEIGHT: u32 = 720;
const JPEG_QUALITY: u8 = 92;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    User,
    Environment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing: Facing,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub audio: bool,
}

impl Default for CameraConstraints {
    fn default() -> Self {
        Self {
            facing: Facing::User,
            ideal_width: MAX_FRAME_WIDTH,
            ideal_height: MAX_FRAME_HEIGHT,
            audio: false,
        }
    }
}

/// A platform camera. Implementations only move frames; encoding and stream
/// lifetime are handled by `CameraSession`.
pub trait CameraDevice: Send {
    /// Starts streaming. Permission or hardware problems map to
    /// `CaptureError::CameraUnavailable`.
    fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CaptureError>;

    /// The most recent frame as an RGB raster.
    fn frame(&mut self) -> Result<RgbImage, CaptureError>;

    /// Stops streaming and releases the device.
    fn close(&mut self);
}

impl<D: CameraDevice + ?Sized> CameraDevice for &mut D {
    fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CaptureError> {
        (**self).open(constraints)
    }

    fn frame(&mut self) -> Result<RgbImage, CaptureError> {
        (**self).frame()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// An open camera stream. The device is released when the session is
/// captured, cancelled or dropped.
pub struct CameraSession<D: CameraDevice> {
    device: D,
}

impl<D: CameraDevice> CameraSession<D> {
    pub fn start(mut device: D, constraints: &CameraConstraints) -> Result<Self, CaptureError> {
        device.open(constraints).map_err(|e| {
            log::error!("Camera access error: {}", e);
            match e {
                CaptureError::CameraUnavailable(_) => e,
                other => CaptureError::CameraUnavailable(other.to_string()),
            }
        })?;
        log::info!("Camera stream opened");
        Ok(Self { device })
    }

    /// Mirrored frame for the self-view preview.
    pub fn preview(&mut self) -> Result<RgbImage, CaptureError> {
        let frame = self.device.frame()?;
        Ok(imageops::flip_horizontal(&frame))
    }

    /// Grabs the current frame as a JPEG and closes the stream.
    pub fn capture(mut self) -> Result<EncodedImage, CaptureError> {
        let frame = self.device.frame()?;
        encode_frame(&frame)
    }

    pub fn cancel(self) {
        log::info!("Camera capture cancelled");
    }
}

impl<D: CameraDevice> Drop for CameraSession<D> {
    fn drop(&mut self) {
        self.device.close();
        log::debug!("Camera stream released");
    }
}

/// JPEG data URL of `frame`, downscaled to fit within 1280x720.
pub fn encode_frame(frame: &RgbImage) -> Result<EncodedImage, CaptureError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(CaptureError::Encode("empty frame".into()));
    }

    let scaled;
    let frame = if width > MAX_FRAME_WIDTH || height > MAX_FRAME_HEIGHT {
        let (w, h) = fit_within(width, height, MAX_FRAME_WIDTH, MAX_FRAME_HEIGHT);
        scaled = imageops::resize(frame, w, h, FilterType::Triangle);
        &scaled
    } else {
        frame
    };

    let mut bytes = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(frame)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

    Ok(EncodedImage::from_bytes(bytes.get_ref(), "image/jpeg"))
}

fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

/// A device for hosts with no camera; every open fails.
#[derive(Debug, Default)]
pub struct NoCamera;

impl CameraDevice for NoCamera {
    fn open(&mut self, _constraints: &CameraConstraints) -> Result<(), CaptureError> {
        Err(CaptureError::CameraUnavailable("no camera device".into()))
    }

    fn frame(&mut self) -> Result<RgbImage, CaptureError> {
        Err(CaptureError::StreamClosed)
    }

    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[derive(Default)]
    struct FakeCamera {
        width: u32,
        height: u32,
        deny: bool,
        open: bool,
        opens: usize,
        closes: usize,
    }

    impl CameraDevice for FakeCamera {
        fn open(&mut self, constraints: &CameraConstraints) -> Result<(), CaptureError> {
            assert_eq!(constraints.facing, Facing::User);
            assert!(!constraints.audio);
            if self.deny {
                return Err(CaptureError::CameraUnavailable("permission denied".into()));
            }
            self.open = true;
            self.opens += 1;
            Ok(())
        }

        fn frame(&mut self) -> Result<RgbImage, CaptureError> {
            if !self.open {
                return Err(CaptureError::StreamClosed);
            }
            // Left half red, right half blue.
            Ok(RgbImage::from_fn(self.width, self.height, |x, _| {
                if x < self.width / 2 {
                    Rgb([255, 0, 0])
                } else {
                    Rgb([0, 0, 255])
                }
            }))
        }

        fn close(&mut self) {
            if self.open {
                self.open = false;
                self.closes += 1;
            }
        }
    }

    fn camera(width: u32, height: u32) -> FakeCamera {
        FakeCamera {
            width,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn test_capture_encodes_jpeg_and_releases_stream() {
        let mut device = camera(64, 36);
        let session = CameraSession::start(&mut device, &CameraConstraints::default()).unwrap();
        let image = session.capture().unwrap();

        assert_eq!(image.media_type(), "image/jpeg");
        assert!(image.payload().starts_with("data:image/jpeg;base64,"));
        let decoded = image::load_from_memory(&image.decode().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 36));
        assert!(!device.open);
        assert_eq!(device.closes, 1);
    }

    #[test]
    fn test_cancel_and_drop_release_stream() {
        let mut device = camera(16, 9);
        CameraSession::start(&mut device, &CameraConstraints::default())
            .unwrap()
            .cancel();
        assert_eq!(device.closes, 1);

        {
            let _session = CameraSession::start(&mut device, &CameraConstraints::default()).unwrap();
        }
        assert_eq!(device.opens, 2);
        assert_eq!(device.closes, 2);
    }

    #[test]
    fn test_stream_stays_open_until_capture() {
        let mut device = camera(8, 8);
        let mut live = Some(CameraSession::start(&mut device, &CameraConstraints::default()).unwrap());

        for _ in 0..3 {
            live.as_mut().unwrap().preview().unwrap();
        }
        let image = live.take().unwrap().capture().unwrap();
        drop(live);

        assert_eq!(image.media_type(), "image/jpeg");
        assert_eq!(device.opens, 1);
        assert_eq!(device.closes, 1);
    }

    #[test]
    fn test_preview_is_mirrored() {
        let mut device = camera(4, 2);
        let mut session = CameraSession::start(&mut device, &CameraConstraints::default()).unwrap();
        let preview = session.preview().unwrap();
        assert_eq!(preview.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(preview.get_pixel(3, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_large_frames_are_downscaled() {
        let image = encode_frame(&RgbImage::new(2560, 1440)).unwrap();
        let decoded = image::load_from_memory(&image.decode().unwrap()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1280, 720));
    }

    #[test]
    fn test_denied_camera_is_unavailable() {
        let mut device = FakeCamera {
            deny: true,
            ..Default::default()
        };
        let err = CameraSession::start(&mut device, &CameraConstraints::default())
            .err()
            .unwrap();
        assert!(matches!(err, CaptureError::CameraUnavailable(_)));
        assert_eq!(
            err.to_string(),
            "Could not access camera. Please check permissions."
        );
        assert_eq!(device.closes, 0);
    }

    #[test]
    fn test_no_camera() {
        let mut device = NoCamera;
        assert!(CameraSession::start(&mut device, &CameraConstraints::default()).is_err());
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(1920, 1080, 1280, 720), (1280, 720));
        assert_eq!(fit_within(1000, 2000, 1280, 720), (360, 720));
    }
}
