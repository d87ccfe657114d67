use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Result, StyleError};

/// A transport-ready image: base64 bytes (usually as a data URL) plus the
/// media type they were encoded with. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    payload: String,
    media_type: String,
}

impl EncodedImage {
    pub fn from_bytes(bytes: &[u8], media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        let payload = format!("data:{};base64,{}", media_type, STANDARD.encode(bytes));
        Self {
            payload,
            media_type,
        }
    }

    /// Wraps bare base64 data, as returned inline by the backend.
    pub fn from_base64(data: impl Into<String>, media_type: impl Into<String>) -> Self {
        let media_type = media_type.into();
        let payload = format!("data:{};base64,{}", media_type, data.into());
        Self {
            payload,
            media_type,
        }
    }

    /// Parses `data:<media type>;base64,<data>`.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| StyleError::SerializationError("Not a data URL".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| StyleError::SerializationError("Data URL has no payload".into()))?;
        let media_type = header.strip_suffix(";base64").ok_or_else(|| {
            StyleError::SerializationError("Only base64 data URLs are supported".into())
        })?;
        if media_type.is_empty() {
            return Err(StyleError::SerializationError(
                "Data URL has no media type".into(),
            ));
        }

        Ok(Self::from_base64(data, media_type))
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The payload with any `data:...,` prefix stripped.
    pub fn base64_data(&self) -> &str {
        if self.payload.starts_with("data:") {
            self.payload
                .split_once(',')
                .map(|(_, data)| data)
                .unwrap_or("")
        } else {
            &self.payload
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.base64_data())
            .map_err(|e| StyleError::SerializationError(format!("Invalid base64 payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_builds_data_url() {
        let image = EncodedImage::from_bytes(&[0, 0, 0], "image/png");
        assert_eq!(image.payload(), "data:image/png;base64,AAAA");
        assert_eq!(image.base64_data(), "AAAA");
        assert_eq!(image.media_type(), "image/png");
    }

    #[test]
    fn test_decode_recovers_original_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let image = EncodedImage::from_bytes(&bytes, "image/jpeg");
        assert_eq!(image.decode().unwrap(), bytes);
    }

    #[test]
    fn test_from_data_url() {
        let image = EncodedImage::from_data_url("data:image/webp;base64,UklGRg==").unwrap();
        assert_eq!(image.media_type(), "image/webp");
        assert_eq!(image.base64_data(), "UklGRg==");
        assert_eq!(image.payload(), "data:image/webp;base64,UklGRg==");
    }

    #[test]
    fn test_rejects_malformed_data_urls() {
        assert!(EncodedImage::from_data_url("image/png;base64,AAAA").is_err());
        assert!(EncodedImage::from_data_url("data:image/png;base64").is_err());
        assert!(EncodedImage::from_data_url("data:image/png,AAAA").is_err());
        assert!(EncodedImage::from_data_url("data:;base64,AAAA").is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let image = EncodedImage::from_base64("not base64!", "image/png");
        assert!(matches!(
            image.decode(),
            Err(StyleError::SerializationError(_))
        ));
    }
}
