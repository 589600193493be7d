//! Parameter types for image edits.
//!
//! These structs describe *what* to do to an uploaded image, not *how*. The
//! [`operations`](super::operations) module turns an [`EditParams`] into a
//! sequence of pixel operations, and the [`backend`](super::backend) encodes
//! the result in the requested [`OutputFormat`].
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`]: Download format: PNG (default), JPEG or WebP.
//! - [`OutputOptions`]: Format + quality pair chosen for a download.
//! - [`EditParams`]: Every control of the editor; the default is the identity edit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MAX_ROTATION: u32 = 359;
pub const SCALE_RANGE: (u32, u32) = (1, 1000);
pub const FACTOR_RANGE: (f32, f32) = (0.0, 2.0);
pub const BLUR_RANGE: (f32, f32) = (0.0, 10.0);
pub const POSTERIZE_RANGE: (u8, u8) = (1, 8);

pub const DEFAULT_BLUR_RADIUS: f32 = 2.0;
pub const DEFAULT_POSTERIZE_BITS: u8 = 4;
pub const DEFAULT_SOLARIZE_THRESHOLD: u8 = 128;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {name}: {reason}")]
pub struct ParamError {
    pub name: &'static str,
    pub reason: String,
}

impl ParamError {
    pub fn new(name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            name,
            reason: reason.into(),
        }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Format offered for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Webp];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    /// Label shown in the format picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WEBP",
        }
    }

    /// File name offered to the browser: `processed_image.<ext>`.
    pub fn download_name(self) -> String {
        format!("processed_image.{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "webp" => Ok(Self::Webp),
            other => Err(format!("unsupported output format `{other}` (png, jpeg, webp)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format and quality for one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub quality: Quality,
}

/// Every editor control in one place.
///
/// Enhancement factors follow the usual convention: `0.0` is the fully
/// degenerate image (black, flat gray, blurred, grayscale), `1.0` leaves the
/// image untouched and `2.0` doubles the effect. Optional filters are `None`
/// when their toggle is off.
#[derive(Debug, Clone, PartialEq)]
pub struct EditParams {
    /// Counter-clockwise rotation in degrees, `0..=359`.
    pub rotation: u32,
    /// Scale in percent, `1..=1000`.
    pub scale_percent: u32,
    pub brightness: f32,
    pub contrast: f32,
    pub sharpness: f32,
    /// Color / saturation.
    pub color: f32,
    /// Gaussian blur radius.
    pub blur_radius: Option<f32>,
    pub find_edges: bool,
    pub invert: bool,
    pub grayscale: bool,
    pub posterize_bits: Option<u8>,
    pub solarize_threshold: Option<u8>,
    /// Rotate/flip according to the EXIF orientation tag before editing.
    pub exif_transpose: bool,
}

impl Default for EditParams {
    fn default() -> Self {
        Self {
            rotation: 0,
            scale_percent: 100,
            brightness: 1.0,
            contrast: 1.0,
            sharpness: 1.0,
            color: 1.0,
            blur_radius: None,
            find_edges: false,
            invert: false,
            grayscale: false,
            posterize_bits: None,
            solarize_threshold: None,
            exif_transpose: true,
        }
    }
}

fn check_factor(name: &'static str, value: f32) -> Result<(), ParamError> {
    let (min, max) = FACTOR_RANGE;
    if !(min..=max).contains(&value) {
        return Err(ParamError::new(name, format!("{value} is outside {min}..={max}")));
    }
    Ok(())
}

impl EditParams {
    /// Reject values outside the ranges the editor controls allow.
    pub fn validate(&self) -> Result<(), ParamError> {
        if self.rotation > MAX_ROTATION {
            return Err(ParamError::new(
                "rotation",
                format!("{} is outside 0..={MAX_ROTATION}", self.rotation),
            ));
        }
        let (min, max) = SCALE_RANGE;
        if !(min..=max).contains(&self.scale_percent) {
            return Err(ParamError::new(
                "scale",
                format!("{}% is outside {min}..={max}", self.scale_percent),
            ));
        }
        check_factor("brightness", self.brightness)?;
        check_factor("contrast", self.contrast)?;
        check_factor("sharpness", self.sharpness)?;
        check_factor("color", self.color)?;
        if let Some(radius) = self.blur_radius {
            let (min, max) = BLUR_RANGE;
            if !(min..=max).contains(&radius) {
                return Err(ParamError::new(
                    "blur",
                    format!("radius {radius} is outside {min}..={max}"),
                ));
            }
        }
        if let Some(bits) = self.posterize_bits {
            let (min, max) = POSTERIZE_RANGE;
            if !(min..=max).contains(&bits) {
                return Err(ParamError::new(
                    "posterize",
                    format!("{bits} bits is outside {min}..={max}"),
                ));
            }
        }
        Ok(())
    }

    /// True when applying these params would only re-encode the image.
    pub fn is_identity(&self) -> bool {
        let neutral = Self {
            exif_transpose: self.exif_transpose,
            ..Self::default()
        };
        *self == neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("PNG".parse::<OutputFormat>(), Ok(OutputFormat::Png));
        assert_eq!("jpg".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("JPEG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
        assert_eq!("WebP".parse::<OutputFormat>(), Ok(OutputFormat::Webp));
        assert!("heic".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn output_format_download_metadata() {
        assert_eq!(OutputFormat::default(), OutputFormat::Png);
        assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
        assert_eq!(OutputFormat::Webp.download_name(), "processed_image.webp");
        assert_eq!(OutputFormat::Png.to_string(), "PNG");
    }

    #[test]
    fn default_params_are_identity() {
        let params = EditParams::default();
        assert!(params.exif_transpose);
        assert!(params.is_identity());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn identity_ignores_exif_transpose() {
        let params = EditParams {
            exif_transpose: false,
            ..EditParams::default()
        };
        assert!(params.is_identity());
    }

    #[test]
    fn any_control_breaks_identity() {
        let params = EditParams {
            grayscale: true,
            ..EditParams::default()
        };
        assert!(!params.is_identity());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        fn with(change: impl FnOnce(&mut EditParams)) -> EditParams {
            let mut params = EditParams::default();
            change(&mut params);
            params
        }
        let cases = [
            (with(|p| p.rotation = 360), "rotation"),
            (with(|p| p.scale_percent = 0), "scale"),
            (with(|p| p.scale_percent = 1001), "scale"),
            (with(|p| p.brightness = 2.5), "brightness"),
            (with(|p| p.color = -0.1), "color"),
            (with(|p| p.blur_radius = Some(10.5)), "blur"),
            (with(|p| p.posterize_bits = Some(0)), "posterize"),
            (with(|p| p.posterize_bits = Some(9)), "posterize"),
        ];
        for (params, name) in cases {
            let err = params.validate().unwrap_err();
            assert_eq!(err.name, name, "{params:?}");
        }
    }

    #[test]
    fn validate_accepts_range_bounds() {
        let params = EditParams {
            rotation: 359,
            scale_percent: 1000,
            brightness: 0.0,
            contrast: 2.0,
            blur_radius: Some(0.0),
            posterize_bits: Some(8),
            solarize_threshold: Some(0),
            ..EditParams::default()
        };
        assert!(params.validate().is_ok());
    }
}
