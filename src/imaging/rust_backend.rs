//! Production codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP) | `image::ImageReader` with content sniffing |
//! | Decode (HEIC) | `libheif-rs` (`heic` feature) |
//! | EXIF + orientation | `kamadak-exif` |
//! | Encode → PNG | `image::ImageFormat::Png` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with quality, alpha dropped, gray kept |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only, quality ignored) |

use super::adjust::{to_eight_bit, to_jpeg_layout};
use super::backend::{BackendError, DecodedImage, ImageBackend, SourceFormat};
use super::heic::decode_heic;
use super::orientation::{Orientation, read_orientation};
use super::params::{OutputFormat, Quality};
use crate::metadata::read_exif;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode PNG/JPEG/WebP, trusting the file's magic bytes over its name.
fn decode_raster(data: &[u8], hint: Option<ImageFormat>) -> Result<DynamicImage, BackendError> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(BackendError::Io)?;
    if let (None, Some(format)) = (reader.format(), hint) {
        reader.set_format(format);
    }
    reader
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

impl ImageBackend for RustBackend {
    fn decode(&self, data: &[u8], file_name: &str) -> Result<DecodedImage, BackendError> {
        let source_format = SourceFormat::detect(file_name, data).ok_or_else(|| {
            BackendError::UnsupportedFormat(format!(
                "{file_name} (expected png, jpg, jpeg, webp, heic or heif)"
            ))
        })?;

        let (image, orientation) = if source_format.is_heic() {
            // libheif has already applied the container transforms
            (decode_heic(data)?, Orientation::Normal)
        } else {
            let image = decode_raster(data, source_format.image_format())?;
            (image, read_orientation(data).unwrap_or_default())
        };

        tracing::debug!(
            file = %file_name,
            format = ?source_format,
            width = image.width(),
            height = image.height(),
            ?orientation,
            "decoded upload"
        );

        Ok(DecodedImage {
            image,
            exif: read_exif(data),
            orientation,
            source_format,
            byte_len: data.len(),
        })
    }

    fn encode(
        &self,
        img: &DynamicImage,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError> {
        let mut buf = Cursor::new(Vec::new());
        match format {
            OutputFormat::Png => img
                .write_to(&mut buf, ImageFormat::Png)
                .map_err(|e| BackendError::Encode(format!("PNG: {e}")))?,
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value());
                to_jpeg_layout(img.clone())
                    .write_with_encoder(encoder)
                    .map_err(|e| BackendError::Encode(format!("JPEG: {e}")))?;
            }
            OutputFormat::Webp => {
                let encoder = WebPEncoder::new_lossless(&mut buf);
                to_eight_bit(img.clone())
                    .write_with_encoder(encoder)
                    .map_err(|e| BackendError::Encode(format!("WebP: {e}")))?;
            }
        }
        Ok(buf.into_inner())
    }
}
