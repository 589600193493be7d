//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two codec operations every backend
//! must support: decode an upload and encode an edited image. Pixel edits in
//! between are plain functions over [`DynamicImage`] and are not part of the
//! backend.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend): the `image` crate for
//! PNG/JPEG/WebP, plus libheif for HEIC when the `heic` feature is enabled.

use super::orientation::Orientation;
use super::params::{OutputFormat, Quality};
use crate::metadata::ExifData;
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Container format of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    WebP,
    Heic,
}

/// Extensions the upload widget accepts.
pub const UPLOAD_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "heic", "heif"];

/// HEIF brands found at offset 8 of the `ftyp` box.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "heic" | "heif" => Some(Self::Heic),
            _ => None,
        }
    }

    /// Guess the format from the file's magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.len() >= 12
            && &data[4..8] == b"ftyp"
            && HEIF_BRANDS.iter().any(|b| &data[8..12] == *b)
        {
            return Some(Self::Heic);
        }
        match image::guess_format(data).ok()? {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    /// Resolve from the upload name, falling back to the file contents.
    pub fn detect(file_name: &str, data: &[u8]) -> Option<Self> {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .or_else(|| Self::sniff(data))
    }

    pub fn is_heic(self) -> bool {
        self == Self::Heic
    }

    /// Matching `image` crate format, `None` for HEIC.
    pub fn image_format(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::WebP => Some(image::ImageFormat::WebP),
            Self::Heic => None,
        }
    }
}

/// A decoded upload: pixels plus the metadata read alongside them.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub exif: ExifData,
    /// Orientation still to be applied to `image`.
    pub orientation: Orientation,
    pub source_format: SourceFormat,
    /// Size of the upload in bytes.
    pub byte_len: usize,
}

/// Trait for image codec backends.
///
/// Every backend implements decode and encode so the editing pipeline and
/// the HTTP layer stay backend-agnostic.
pub trait ImageBackend: Send + Sync {
    /// Decode an uploaded file. `file_name` is used for format detection.
    fn decode(&self, data: &[u8], file_name: &str) -> Result<DecodedImage, BackendError>;

    /// Encode an image in the requested download format.
    fn encode(
        &self,
        img: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;
}
