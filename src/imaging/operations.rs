//! High-level image operations.
//!
//! These functions combine the codec backend with the pixel adjustments:
//! decode an upload, run the edit pipeline, encode the download.
//!
//! ## Edit order
//!
//! ```text
//! EXIF transpose → rotate → scale → brightness → contrast → sharpness → color
//!   → blur → edges → invert → grayscale → posterize → solarize
//! ```
//!
//! Each step runs only when its control differs from the neutral value, so
//! the identity edit is a plain decode/encode.
//!
//! EXIF transpose comes first, so rotation acts on the upright photo.
//! Transposing after the filters instead gives different pixels only for the
//! mirrored orientations (2, 4, 5, 7) combined with a rotation.

use super::adjust;
use super::backend::{BackendError, DecodedImage, ImageBackend};
use super::calculations::{rotated_bounds, scaled_dimensions};
use super::orientation::apply_orientation;
use super::params::{EditParams, OutputFormat, OutputOptions, ParamError};
use crate::metadata::{ExifData, ImageSummary};
use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    InvalidParams(#[from] ParamError),
    #[error("image resolution {width}x{height} exceeds the {max_pixels} pixel limit")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, EditError>;

fn check_pixels(width: u32, height: u32, max_pixels: u64) -> Result<()> {
    if u64::from(width) * u64::from(height) > max_pixels {
        return Err(EditError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }
    Ok(())
}

/// Rotate counter-clockwise by `degrees`, expanding the canvas to fit.
///
/// Right angles are exact pixel moves. Other angles sample the nearest
/// source pixel and leave uncovered corners transparent.
pub fn rotate(img: DynamicImage, degrees: u32) -> DynamicImage {
    match degrees % 360 {
        0 => img,
        90 => img.rotate270(),
        180 => img.rotate180(),
        270 => img.rotate90(),
        d => rotate_expanded(&img, d),
    }
}

fn rotate_expanded(img: &DynamicImage, degrees: u32) -> DynamicImage {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let (out_w, out_h) = rotated_bounds((w, h), degrees);

    // Move the source center to the origin, turn, then center on the new canvas.
    // Projection::rotate is clockwise in image coordinates.
    let projection = Projection::translate(out_w as f32 / 2.0, out_h as f32 / 2.0)
        * Projection::rotate(-(degrees as f32).to_radians())
        * Projection::translate(-(w as f32) / 2.0, -(h as f32) / 2.0);

    let mut out = RgbaImage::new(out_w, out_h);
    warp_into(
        &rgba,
        &projection,
        Interpolation::Nearest,
        Rgba([0, 0, 0, 0]),
        &mut out,
    );
    DynamicImage::ImageRgba8(out)
}

/// Resize by a percentage with bicubic (Catmull-Rom) resampling.
pub fn scale(img: DynamicImage, percent: u32) -> DynamicImage {
    if percent == 100 {
        return img;
    }
    let (w, h) = scaled_dimensions((img.width(), img.height()), percent);
    img.resize_exact(w, h, FilterType::CatmullRom)
}

/// Run the full edit pipeline on a decoded upload.
///
/// Params are validated first. `max_pixels` bounds the size after scaling so
/// a 1000% scale of a large photo cannot exhaust memory.
pub fn apply_edits(
    decoded: DecodedImage,
    params: &EditParams,
    max_pixels: u64,
) -> Result<DynamicImage> {
    params.validate()?;
    let mut img = decoded.image;

    if params.exif_transpose {
        img = apply_orientation(img, decoded.orientation);
    }
    img = rotate(img, params.rotation);

    let (w, h) = scaled_dimensions((img.width(), img.height()), params.scale_percent);
    check_pixels(w, h, max_pixels)?;
    img = scale(img, params.scale_percent);

    img = adjust::brightness(img, params.brightness);
    img = adjust::contrast(img, params.contrast);
    img = adjust::sharpness(img, params.sharpness);
    img = adjust::color(img, params.color);

    if let Some(radius) = params.blur_radius {
        img = adjust::gaussian_blur(img, radius);
    }
    if params.find_edges {
        img = adjust::find_edges(img);
    }
    if params.invert {
        img = adjust::invert(img);
    }
    if params.grayscale {
        img = adjust::grayscale(img);
    }
    if let Some(bits) = params.posterize_bits {
        img = adjust::posterize(img, bits);
    }
    if let Some(threshold) = params.solarize_threshold {
        img = adjust::solarize(img, threshold);
    }
    Ok(img)
}

/// An upload as received from the browser or read from disk.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Encoded result of an edit, ready for download.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    /// Metrics of the edited image; `file_size` is the encoded size.
    pub summary: ImageSummary,
}

impl RenderedImage {
    pub fn download_name(&self) -> String {
        self.format.download_name()
    }
}

/// Summary and EXIF of an upload, before any edit.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub summary: ImageSummary,
    pub exif: ExifData,
}

/// Decode an upload and describe it.
pub fn inspect(
    backend: &(impl ImageBackend + ?Sized),
    upload: &Upload,
    max_pixels: u64,
) -> Result<Inspection> {
    let decoded = backend.decode(&upload.data, &upload.file_name)?;
    check_pixels(decoded.image.width(), decoded.image.height(), max_pixels)?;
    let summary = ImageSummary::describe(&decoded.image, decoded.byte_len, decoded.exif.dpi());
    Ok(Inspection {
        summary,
        exif: decoded.exif,
    })
}

/// Convert to the pixel layout `format` stores, so the summary describes
/// the downloaded file rather than the in-memory buffer.
fn encoded_layout(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    match format {
        OutputFormat::Png => img,
        OutputFormat::Jpeg => adjust::to_jpeg_layout(img),
        OutputFormat::Webp => adjust::to_eight_bit(img),
    }
}

/// Decode, edit and encode an upload.
pub fn render(
    backend: &(impl ImageBackend + ?Sized),
    upload: &Upload,
    params: &EditParams,
    output: OutputOptions,
    max_pixels: u64,
) -> Result<RenderedImage> {
    let decoded = backend.decode(&upload.data, &upload.file_name)?;
    check_pixels(decoded.image.width(), decoded.image.height(), max_pixels)?;
    let dpi = decoded.exif.dpi();

    let edited = encoded_layout(apply_edits(decoded, params, max_pixels)?, output.format);
    let bytes = backend.encode(&edited, output.format, output.quality)?;
    let summary = ImageSummary::describe(&edited, bytes.len(), dpi);

    Ok(RenderedImage {
        bytes,
        format: output.format,
        summary,
    })
}
