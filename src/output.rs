//! CLI output formatting for the `info` and `edit` commands.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! IMG_0001.jpg
//!     Resolution: 4032 x 3024
//!     Color mode: RGB
//!     File size: 2.31 MB
//!     DPI: (72, 72)
//!
//! EXIF
//!     Make: Apple
//!     Orientation: row 0 at right and column 0 at top
//! ```
//!
//! ## Edit
//!
//! ```text
//! IMG_0001.jpg → processed_image.jpeg
//!     Edits: rotate 90°, scale 50%, grayscale
//!     Resolution: 1512 x 2016
//!     Color mode: L
//!     File size: 0.41 MB
//!     DPI: (72, 72)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{EditParams, Inspection, RenderedImage};
use crate::metadata::{ExifData, ImageSummary};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// The four metric lines shown for any image.
fn summary_lines(summary: &ImageSummary) -> Vec<String> {
    vec![
        format!("{}Resolution: {}", indent(1), summary.resolution()),
        format!("{}Color mode: {}", indent(1), summary.color_mode),
        format!("{}File size: {}", indent(1), summary.file_size_label()),
        format!("{}DPI: {}", indent(1), summary.dpi_label()),
    ]
}

/// Short description of the non-neutral controls, in pipeline order.
fn describe_edits(params: &EditParams) -> Vec<String> {
    let mut edits = Vec::new();
    if params.rotation != 0 {
        edits.push(format!("rotate {}°", params.rotation));
    }
    if params.scale_percent != 100 {
        edits.push(format!("scale {}%", params.scale_percent));
    }
    for (name, factor) in [
        ("brightness", params.brightness),
        ("contrast", params.contrast),
        ("sharpness", params.sharpness),
        ("color", params.color),
    ] {
        if factor != 1.0 {
            edits.push(format!("{name} {factor:.1}"));
        }
    }
    if let Some(radius) = params.blur_radius {
        edits.push(format!("blur {radius:.1}"));
    }
    if params.find_edges {
        edits.push("edges".to_string());
    }
    if params.invert {
        edits.push("invert".to_string());
    }
    if params.grayscale {
        edits.push("grayscale".to_string());
    }
    if let Some(bits) = params.posterize_bits {
        edits.push(format!("posterize {bits} bits"));
    }
    if let Some(threshold) = params.solarize_threshold {
        edits.push(format!("solarize {threshold}"));
    }
    edits
}

// ============================================================================
// EXIF
// ============================================================================

/// Format the EXIF table, one indented `Tag: value` line per entry.
pub fn format_exif(exif: &ExifData) -> Vec<String> {
    let mut lines = vec!["EXIF".to_string()];
    if exif.is_empty() {
        lines.push(format!("{}No EXIF data found.", indent(1)));
        return lines;
    }
    for entry in exif.entries() {
        lines.push(format!("{}{}: {}", indent(1), entry.tag, entry.value));
    }
    lines
}

// ============================================================================
// Info
// ============================================================================

/// Format `info` output: the file name, its metrics, then the EXIF table.
pub fn format_info_output(source: &Path, inspection: &Inspection) -> Vec<String> {
    let mut lines = vec![source.display().to_string()];
    lines.extend(summary_lines(&inspection.summary));
    lines.push(String::new());
    lines.extend(format_exif(&inspection.exif));
    lines
}

pub fn print_info_output(source: &Path, inspection: &Inspection) {
    for line in format_info_output(source, inspection) {
        println!("{}", line);
    }
}

// ============================================================================
// Edit
// ============================================================================

/// Format `edit` output: source → destination, applied edits, result metrics.
pub fn format_edit_output(
    source: &Path,
    destination: &Path,
    params: &EditParams,
    rendered: &RenderedImage,
) -> Vec<String> {
    let mut lines = vec![format!("{} → {}", source.display(), destination.display())];
    let edits = describe_edits(params);
    if edits.is_empty() {
        lines.push(format!("{}Edits: none", indent(1)));
    } else {
        lines.push(format!("{}Edits: {}", indent(1), edits.join(", ")));
    }
    lines.extend(summary_lines(&rendered.summary));
    lines
}

pub fn print_edit_output(
    source: &Path,
    destination: &Path,
    params: &EditParams,
    rendered: &RenderedImage,
) {
    for line in format_edit_output(source, destination, params, rendered) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::OutputFormat;
    use crate::metadata::{Dpi, read_exif};
    use crate::test_helpers::jpeg_with_exif;

    fn summary() -> ImageSummary {
        ImageSummary {
            width: 640,
            height: 480,
            color_mode: "RGB",
            file_size: 1024 * 1024,
            dpi: Some(Dpi { x: 72.0, y: 72.0 }),
        }
    }

    // =========================================================================
    // Edit description
    // =========================================================================

    #[test]
    fn describe_identity_is_empty() {
        assert!(describe_edits(&EditParams::default()).is_empty());
    }

    #[test]
    fn describe_edits_in_pipeline_order() {
        let params = EditParams {
            rotation: 90,
            scale_percent: 50,
            contrast: 1.5,
            grayscale: true,
            posterize_bits: Some(3),
            ..EditParams::default()
        };
        assert_eq!(
            describe_edits(&params),
            vec!["rotate 90°", "scale 50%", "contrast 1.5", "grayscale", "posterize 3 bits"]
        );
    }

    // =========================================================================
    // EXIF
    // =========================================================================

    #[test]
    fn format_exif_empty() {
        let lines = format_exif(&ExifData::default());
        assert_eq!(lines, vec!["EXIF", "    No EXIF data found."]);
    }

    #[test]
    fn format_exif_lists_tags() {
        let exif = read_exif(&jpeg_with_exif(4, 4, 1));
        let lines = format_exif(&exif);
        assert_eq!(lines[0], "EXIF");
        assert!(lines.iter().any(|l| l.starts_with("    Orientation: ")));
        assert!(lines.iter().any(|l| l.starts_with("    XResolution: ")));
    }

    // =========================================================================
    // Info / Edit
    // =========================================================================

    #[test]
    fn format_info_output_shows_metrics_then_exif() {
        let inspection = Inspection {
            summary: summary(),
            exif: ExifData::default(),
        };
        let lines = format_info_output(Path::new("photo.jpg"), &inspection);
        assert_eq!(
            lines,
            vec![
                "photo.jpg",
                "    Resolution: 640 x 480",
                "    Color mode: RGB",
                "    File size: 1.00 MB",
                "    DPI: (72, 72)",
                "",
                "EXIF",
                "    No EXIF data found.",
            ]
        );
    }

    #[test]
    fn format_edit_output_lists_edits() {
        let rendered = RenderedImage {
            bytes: vec![],
            format: OutputFormat::Jpeg,
            summary: ImageSummary { dpi: None, ..summary() },
        };
        let params = EditParams {
            invert: true,
            ..EditParams::default()
        };
        let lines = format_edit_output(
            Path::new("in.png"),
            Path::new("processed_image.jpeg"),
            &params,
            &rendered,
        );
        assert_eq!(lines[0], "in.png → processed_image.jpeg");
        assert_eq!(lines[1], "    Edits: invert");
        assert_eq!(lines[5], "    DPI: N/A");
    }

    #[test]
    fn format_edit_output_without_edits() {
        let rendered = RenderedImage {
            bytes: vec![],
            format: OutputFormat::Png,
            summary: summary(),
        };
        let lines = format_edit_output(
            Path::new("a.png"),
            Path::new("b.png"),
            &EditParams::default(),
            &rendered,
        );
        assert_eq!(lines[1], "    Edits: none");
    }
}
