//! Image metadata: EXIF tags and the summary metrics shown beside the preview.
//!
//! ## EXIF
//!
//! Tags are read with `kamadak-exif` straight from the uploaded container
//! (JPEG APP1, PNG `eXIf`, WebP `EXIF`, HEIF `Exif` item). Only the primary
//! image is listed; thumbnail IFD entries are skipped. Each tag is kept as a
//! `(name, display value)` pair in file order so the panel reads like the
//! camera wrote it.
//!
//! Files without EXIF, or with EXIF the parser rejects, yield an empty
//! [`ExifData`]. A broken metadata block never fails an upload.
//!
//! ## Summary
//!
//! [`ImageSummary`] carries resolution, color mode, encoded size and DPI.
//! Color modes use the short names photo tools conventionally print
//! (`L`, `RGB`, `RGBA`, `I;16`, ...).

use crate::imaging::calculations::format_megabytes;
use image::{ColorType, DynamicImage};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Cursor;

const CENTIMETRES_PER_INCH: f64 = 2.54;

/// One EXIF tag rendered for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExifEntry {
    pub tag: String,
    pub value: String,
}

/// Horizontal and vertical resolution in dots per inch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dpi {
    pub x: f64,
    pub y: f64,
}

impl fmt::Display for Dpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x.round(), self.y.round())
    }
}

/// EXIF tags of the primary image, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifData {
    entries: Vec<ExifEntry>,
    dpi: Option<Dpi>,
}

impl ExifData {
    pub fn entries(&self) -> &[ExifEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.tag == tag)
            .map(|e| e.value.as_str())
    }

    /// Resolution from XResolution/YResolution, normalized to inches.
    pub fn dpi(&self) -> Option<Dpi> {
        self.dpi
    }
}

/// Serialized as a JSON object keyed by tag name, preserving file order.
impl Serialize for ExifData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.tag, &entry.value)?;
        }
        map.end()
    }
}

/// Read EXIF from an encoded image container.
pub fn read_exif(data: &[u8]) -> ExifData {
    match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(exif) => collect(&exif),
        Err(e) => {
            tracing::debug!(error = %e, "no readable EXIF in upload");
            ExifData::default()
        }
    }
}

fn collect(exif: &exif::Exif) -> ExifData {
    let entries = exif
        .fields()
        .filter(|f| f.ifd_num == exif::In::PRIMARY)
        .map(|f| ExifEntry {
            tag: f.tag.to_string(),
            value: f.display_value().with_unit(exif).to_string(),
        })
        .collect();
    ExifData {
        entries,
        dpi: read_dpi(exif),
    }
}

fn rational(exif: &exif::Exif, tag: exif::Tag) -> Option<f64> {
    match exif.get_field(tag, exif::In::PRIMARY)?.value {
        exif::Value::Rational(ref v) => v.first().map(|r| r.to_f64()),
        _ => None,
    }
}

fn read_dpi(exif: &exif::Exif) -> Option<Dpi> {
    let x = rational(exif, exif::Tag::XResolution)?;
    let y = rational(exif, exif::Tag::YResolution).unwrap_or(x);
    let unit = exif
        .get_field(exif::Tag::ResolutionUnit, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(2);
    // ResolutionUnit 3 = centimetres, anything else is treated as inches
    let per_inch = if unit == 3 { CENTIMETRES_PER_INCH } else { 1.0 };
    Some(Dpi {
        x: x * per_inch,
        y: y * per_inch,
    })
}

/// Short color mode name for a decoded buffer.
pub fn color_mode(color: ColorType) -> &'static str {
    match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        _ => "unknown",
    }
}

/// Metrics shown next to the preview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSummary {
    pub width: u32,
    pub height: u32,
    pub color_mode: &'static str,
    /// Encoded size in bytes.
    pub file_size: usize,
    pub dpi: Option<Dpi>,
}

impl ImageSummary {
    pub fn describe(img: &DynamicImage, file_size: usize, dpi: Option<Dpi>) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            color_mode: color_mode(img.color()),
            file_size,
            dpi,
        }
    }

    /// `"W x H"`.
    pub fn resolution(&self) -> String {
        format!("{} x {}", self.width, self.height)
    }

    pub fn file_size_label(&self) -> String {
        format_megabytes(self.file_size)
    }

    /// DPI label, `"N/A"` when the file carries none.
    pub fn dpi_label(&self) -> String {
        self.dpi.map_or_else(|| "N/A".to_string(), |d| d.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, jpeg_with_exif, solid_rgba};

    #[test]
    fn jpeg_exif_lists_primary_tags() {
        let exif = read_exif(&jpeg_with_exif(16, 8, 6));
        assert!(!exif.is_empty());
        let tags: Vec<&str> = exif.entries().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(
            tags,
            ["Orientation", "XResolution", "YResolution", "ResolutionUnit"]
        );
    }

    #[test]
    fn jpeg_exif_reports_dpi() {
        let exif = read_exif(&jpeg_with_exif(16, 8, 1));
        let dpi = exif.dpi().unwrap();
        assert_eq!((dpi.x, dpi.y), (300.0, 300.0));
        assert_eq!(dpi.to_string(), "(300, 300)");
    }

    #[test]
    fn missing_exif_is_empty() {
        let exif = read_exif(&jpeg_bytes(8, 8));
        assert!(exif.is_empty());
        assert_eq!(exif.dpi(), None);
    }

    #[test]
    fn corrupt_input_is_empty() {
        assert!(read_exif(b"\xFF\xD8garbage").is_empty());
        assert!(read_exif(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn exif_serializes_as_ordered_object() {
        let exif = read_exif(&jpeg_with_exif(16, 8, 1));
        let json = serde_json::to_string(&exif).unwrap();
        assert!(json.starts_with("{\"Orientation\":"), "{json}");
        let resolution = json.find("XResolution").unwrap();
        let unit = json.find("ResolutionUnit").unwrap();
        assert!(resolution < unit);
    }

    #[test]
    fn color_mode_names() {
        assert_eq!(color_mode(ColorType::L8), "L");
        assert_eq!(color_mode(ColorType::Rgb8), "RGB");
        assert_eq!(color_mode(ColorType::Rgba8), "RGBA");
        assert_eq!(color_mode(ColorType::L16), "I;16");
    }

    #[test]
    fn summary_labels() {
        let summary = ImageSummary::describe(&solid_rgba(640, 480, [0; 4]), 2 * 1024 * 1024, None);
        assert_eq!(summary.resolution(), "640 x 480");
        assert_eq!(summary.color_mode, "RGBA");
        assert_eq!(summary.file_size_label(), "2.00 MB");
        assert_eq!(summary.dpi_label(), "N/A");
    }

    #[test]
    fn summary_dpi_label() {
        let summary = ImageSummary::describe(
            &solid_rgba(1, 1, [0; 4]),
            0,
            Some(Dpi { x: 72.0, y: 72.0 }),
        );
        assert_eq!(summary.dpi_label(), "(72, 72)");
    }
}
