//! Image processing for the editor.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader`, `libheif-rs` for HEIC (`heic` feature) |
//! | **Orientation** | `kamadak-exif` Orientation tag |
//! | **Rotate** | `image` for right angles, `imageproc::warp_into` otherwise |
//! | **Scale** | `resize_exact` with Catmull-Rom |
//! | **Enhance / filters** | 8-bit sample passes in [`adjust`] |
//! | **Encode** | PNG, JPEG (with quality), lossless WebP |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension and sample math (unit testable)
//! - **Parameters**: Data structures describing an edit and a download
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining the backend with the edit pipeline

pub mod adjust;
pub mod backend;
pub mod calculations;
mod heic;
pub mod operations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, DecodedImage, ImageBackend, SourceFormat, UPLOAD_EXTENSIONS};
pub use operations::{EditError, Inspection, RenderedImage, Upload, apply_edits, inspect, render};
pub use orientation::Orientation;
pub use params::{
    BLUR_RANGE, DEFAULT_BLUR_RADIUS, DEFAULT_POSTERIZE_BITS, DEFAULT_SOLARIZE_THRESHOLD,
    EditParams, FACTOR_RANGE, MAX_ROTATION, OutputFormat, OutputOptions, POSTERIZE_RANGE,
    ParamError, Quality, SCALE_RANGE,
};
pub use rust_backend::RustBackend;
