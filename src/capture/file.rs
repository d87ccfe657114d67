use std::fs;
use std::path::Path;

use image::ImageFormat;

use crate::{
    error::{CaptureError, Result},
    models::EncodedImage,
};

/// Reads the selected file in full and encodes it as a data URL.
///
/// `None` means the picker was dismissed; the caller gets
/// `CaptureError::NoFileSelected` and should emit no capture event.
pub fn capture_file(selection: Option<&Path>) -> Result<EncodedImage> {
    let path = selection.ok_or(CaptureError::NoFileSelected)?;
    let bytes = fs::read(path)?;
    let media_type = detect_media_type(path, &bytes)?;

    log::info!(
        "Read {} ({}, {} bytes)",
        path.display(),
        media_type,
        bytes.len()
    );

    Ok(EncodedImage::from_bytes(&bytes, media_type))
}

/// Media type from the file's magic bytes, falling back to its extension.
pub fn detect_media_type(path: &Path, bytes: &[u8]) -> std::result::Result<&'static str, CaptureError> {
    image::guess_format(bytes)
        .or_else(|_| ImageFormat::from_path(path))
        .map(|format| format.to_mime_type())
        .map_err(|_| CaptureError::UnsupportedMedia(path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StyleError;
    use std::io::Write;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_round_trip_recovers_file_bytes() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&[1, 2, 3, 250, 251, 252]);
        file.write_all(&bytes).unwrap();

        let image = capture_file(Some(file.path())).unwrap();
        assert_eq!(image.media_type(), "image/png");
        assert!(image.payload().starts_with("data:image/png;base64,"));
        assert_eq!(image.decode().unwrap(), bytes);
    }

    #[test]
    fn test_extension_fallback() {
        let mut file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        file.write_all(b"not really a jpeg").unwrap();

        let image = capture_file(Some(file.path())).unwrap();
        assert_eq!(image.media_type(), "image/jpeg");
    }

    #[test]
    fn test_no_selection() {
        assert!(matches!(
            capture_file(None),
            Err(StyleError::Capture(CaptureError::NoFileSelected))
        ));
    }

    #[test]
    fn test_non_image_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all(b"hello").unwrap();

        assert!(matches!(
            capture_file(Some(file.path())),
            Err(StyleError::Capture(CaptureError::UnsupportedMedia(_)))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.png");
        assert!(matches!(
            capture_file(Some(&missing)),
            Err(StyleError::Io(_))
        ));
    }
}
