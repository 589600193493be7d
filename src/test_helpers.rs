//! Shared test utilities for the simple-edit test suite.
//!
//! Every fixture is synthesized in memory with the `image` crate, so tests
//! never depend on files checked into the repository.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let upload = jpeg_with_exif(40, 20, 6);
//! let decoded = RustBackend::new().decode(&upload, "photo.jpg").unwrap();
//! assert_eq!(decoded.orientation, Orientation::Rotate90);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Pixel buffers
// =========================================================================

/// RGB gradient: red follows x, green follows y, blue is constant.
pub fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width) as u8, (y % 256) as u8, 128])
    }))
}

/// Uniformly colored RGB image.
pub fn solid_rgb(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

/// Uniformly colored RGBA image.
pub fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
}

// =========================================================================
// Encoded uploads
// =========================================================================

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// PNG bytes of an RGB gradient.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient_rgb(width, height), ImageFormat::Png)
}

/// JPEG bytes of an RGB gradient, without any APP1 segment.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient_rgb(width, height), ImageFormat::Jpeg)
}

/// Minimal little-endian TIFF block with Orientation, X/YResolution (300 dpi)
/// and ResolutionUnit (inches) in IFD0.
pub fn exif_tiff_block(orientation: u16) -> Vec<u8> {
    fn entry(out: &mut Vec<u8>, tag: u16, kind: u16, value: u32) {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    }
    const SHORT: u16 = 3;
    const RATIONAL: u16 = 5;
    // header (8) + count (2) + 4 entries (48) + next-IFD offset (4)
    const DATA_OFFSET: u32 = 62;

    let mut tiff = vec![b'I', b'I', 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00];
    tiff.extend_from_slice(&4u16.to_le_bytes());
    entry(&mut tiff, 0x0112, SHORT, u32::from(orientation));
    entry(&mut tiff, 0x011A, RATIONAL, DATA_OFFSET);
    entry(&mut tiff, 0x011B, RATIONAL, DATA_OFFSET + 8);
    entry(&mut tiff, 0x0128, SHORT, 2);
    tiff.extend_from_slice(&0u32.to_le_bytes());
    for _ in 0..2 {
        tiff.extend_from_slice(&300u32.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
    }
    tiff
}

/// JPEG bytes with an EXIF APP1 segment carrying the given orientation.
pub fn jpeg_with_exif(width: u32, height: u32, orientation: u16) -> Vec<u8> {
    let jpeg = jpeg_bytes(width, height);
    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&exif_tiff_block(orientation));
    let segment_len = u16::try_from(payload.len() + 2).unwrap();

    let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(&payload);
    // Skip the encoder's own SOI marker
    out.extend_from_slice(&jpeg[2..]);
    out
}
