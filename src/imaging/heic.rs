//! HEIC/HEIF decoding.
//!
//! Phone cameras store HEVC-coded stills in a HEIF container. There is no
//! pure-Rust HEVC decoder, so decoding goes through `libheif-rs` and is only
//! compiled with the `heic` feature. libheif applies the container's
//! rotation/mirror properties while decoding, so the returned pixels are
//! already upright.

use super::backend::BackendError;
use image::DynamicImage;

#[cfg(feature = "heic")]
pub fn decode_heic(data: &[u8]) -> Result<DynamicImage, BackendError> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib = LibHeif::new();
    let ctx = HeifContext::read_from_bytes(data)
        .map_err(|e| BackendError::Decode(format!("Could not read HEIC file: {e}")))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| BackendError::Decode(format!("HEIC has no primary image: {e}")))?;

    let has_alpha = handle.has_alpha_channel();
    let (chroma, channels) = if has_alpha {
        (RgbChroma::Rgba, 4)
    } else {
        (RgbChroma::Rgb, 3)
    };
    let decoded = lib
        .decode(&handle, ColorSpace::Rgb(chroma), None)
        .map_err(|e| BackendError::Decode(format!("HEIC decode failed: {e}")))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| BackendError::Decode("HEIC decoder returned no interleaved plane".into()))?;
    let (width, height) = (plane.width, plane.height);

    // Rows are padded to `stride`; copy the visible part of each row
    let row_len = width as usize * channels;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }

    let image = if has_alpha {
        image::RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };
    image.ok_or_else(|| BackendError::Decode("HEIC plane has unexpected size".into()))
}

#[cfg(not(feature = "heic"))]
pub fn decode_heic(_data: &[u8]) -> Result<DynamicImage, BackendError> {
    Err(BackendError::UnsupportedFormat(
        "heic (this build has no HEIC decoder; enable the `heic` feature)".into(),
    ))
}
