//! Core image types.

use crate::error::{PhotoStyleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Recognized image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format. Also the fallback for unrecognized mime types.
    #[default]
    Png,
    /// JPEG format (camera captures).
    Jpeg,
    /// WebP format.
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Parses one of the three recognized MIME types.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Like [`from_mime`](Self::from_mime) but falls back to PNG.
    pub fn from_mime_or_default(mime: &str) -> Self {
        Self::from_mime(mime).unwrap_or_default()
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Image bytes tagged with their MIME type.
///
/// Used both for the photo sent to the model and for the image it returns.
/// The MIME type is kept as given: input payloads pass it through to the
/// remote call verbatim, output payloads carry whatever the response said.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "image payload should be saved or processed"]
pub struct ImagePayload {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// Declared MIME type, e.g. `image/jpeg`.
    pub mime_type: String,
}

impl ImagePayload {
    /// Creates a payload from raw bytes and a declared MIME type.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Creates a payload for a captured camera frame, which is always JPEG.
    pub fn from_camera_frame(jpeg: Vec<u8>) -> Self {
        Self::new(jpeg, ImageFormat::Jpeg.mime_type())
    }

    /// Reads a photo from disk.
    ///
    /// The MIME type comes from the file extension, or from the magic bytes
    /// when the extension is missing or unknown. Only JPEG, PNG and WebP are
    /// accepted.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic_bytes(&data))
            .ok_or_else(|| {
                PhotoStyleError::InvalidInput(format!(
                    "{} is not a JPEG, PNG or WebP image",
                    path.display()
                ))
            })?;

        Ok(Self::new(data, format.mime_type()))
    }

    /// Returns the recognized format, falling back to PNG.
    pub fn format(&self) -> ImageFormat {
        ImageFormat::from_mime_or_default(&self.mime_type)
    }

    /// Returns the file extension to use when downloading this image.
    pub fn extension(&self) -> &'static str {
        self.format().extension()
    }

    /// Returns the download file name, `styled_image_<millis>.<ext>`.
    pub fn download_file_name(&self, timestamp_ms: u128) -> String {
        format!("styled_image_{}.{}", timestamp_ms, self.extension())
    }

    /// Returns the size of the image data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the image data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a data URL, using the declared MIME type.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            ImageFormat::from_magic_bytes(&PNG_MAGIC),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
    }

    #[test]
    fn test_download_extension_mapping() {
        assert_eq!(ImageFormat::from_mime_or_default("image/jpeg").extension(), "jpg");
        assert_eq!(ImageFormat::from_mime_or_default("image/png").extension(), "png");
        assert_eq!(ImageFormat::from_mime_or_default("image/webp").extension(), "webp");
        assert_eq!(ImageFormat::from_mime_or_default("image/gif").extension(), "png");
        assert_eq!(ImageFormat::from_mime_or_default("").extension(), "png");
    }

    #[test]
    fn test_download_file_name() {
        let image = ImagePayload::new(vec![1, 2, 3], "image/webp");
        assert_eq!(
            image.download_file_name(1_700_000_000_000),
            "styled_image_1700000000000.webp"
        );

        let odd = ImagePayload::new(vec![1], "image/heic");
        assert_eq!(odd.download_file_name(5), "styled_image_5.png");
    }

    #[test]
    fn test_data_url_keeps_declared_mime() {
        let image = ImagePayload::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        assert_eq!(image.to_data_url(), "data:image/jpeg;base64,/9j/");
    }

    #[test]
    fn test_camera_frame_is_jpeg() {
        let frame = ImagePayload::from_camera_frame(JPEG_MAGIC.to_vec());
        assert_eq!(frame.mime_type, "image/jpeg");
        assert_eq!(frame.format(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_from_file_uses_extension_then_magic() {
        let dir = tempfile::tempdir().unwrap();

        let named = dir.path().join("photo.webp");
        std::fs::write(&named, PNG_MAGIC).unwrap();
        assert_eq!(ImagePayload::from_file(&named).unwrap().mime_type, "image/webp");

        let unnamed = dir.path().join("capture");
        std::fs::write(&unnamed, JPEG_MAGIC).unwrap();
        assert_eq!(ImagePayload::from_file(&unnamed).unwrap().mime_type, "image/jpeg");
    }

    #[test]
    fn test_from_file_rejects_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anim.gif");
        std::fs::write(&path, b"GIF89a......").unwrap();

        let err = ImagePayload::from_file(&path).unwrap_err();
        assert!(matches!(err, PhotoStyleError::InvalidInput(_)));
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let image = ImagePayload::new(PNG_MAGIC.to_vec(), "image/png");
        image.save(&path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC.to_vec());
    }
}
