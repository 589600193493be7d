//! The editor page.
//!
//! One server-rendered page built with `maud`: an upload box, a sidebar of
//! edit controls, the metrics and EXIF panels, the preview and the download
//! button. `static/editor.js` posts the upload and the control values to the
//! API whenever something changes; `static/editor.css` is inlined.
//!
//! Controls carry ids rather than form names. The script reads them and
//! builds the multipart body itself, so disabled filters are simply left out.

use crate::config::EditorConfig;
use crate::imaging::{
    BLUR_RANGE, DEFAULT_BLUR_RADIUS, DEFAULT_POSTERIZE_BITS, DEFAULT_SOLARIZE_THRESHOLD,
    FACTOR_RANGE, MAX_ROTATION, OutputFormat, POSTERIZE_RANGE, SCALE_RANGE, UPLOAD_EXTENSIONS,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/editor.css");
const JS: &str = include_str!("../static/editor.js");

const ROTATION_PRESETS: &[u32] = &[0, 90, 180, 270];
const SCALE_PRESETS: &[u32] = &[25, 50, 75, 100, 150, 200];

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// `accept` attribute for the upload input: `.png,.jpg,...`.
fn accept_list() -> String {
    UPLOAD_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Row of preset buttons plus an "Other" button revealing a slider.
fn pills(
    id: &str,
    label: &str,
    presets: &[u32],
    suffix: &str,
    neutral: u32,
    range: (u32, u32),
) -> Markup {
    html! {
        fieldset.control id=(id) data-value=(neutral) {
            legend { (label) }
            div.pills {
                @for preset in presets {
                    button.pill.active[*preset == neutral] type="button" data-preset=(preset) {
                        (preset) (suffix)
                    }
                }
                button.pill type="button" data-preset="other" { "Other" }
            }
            input.custom hidden type="range" id={ (id) "-custom" }
                min=(range.0) max=(range.1) step="1" value=(neutral);
        }
    }
}

fn slider(id: &str, label: &str, range: (f32, f32), step: f32, value: f32) -> Markup {
    html! {
        label.control for=(id) {
            span.label { (label) }
            input type="range" id=(id) min=(range.0) max=(range.1) step=(step) value=(value);
            output for=(id) { (format!("{value:.1}")) }
        }
    }
}

/// Checkbox, optionally paired with a slider that is only live while checked.
fn toggle(id: &str, label: &str, checked: bool, slider: Option<Markup>) -> Markup {
    html! {
        div.toggle {
            label {
                input type="checkbox" id=(id) checked[checked];
                " " (label)
            }
            @if let Some(slider) = slider {
                div.toggle-slider data-toggle=(id) { (slider) }
            }
        }
    }
}

fn controls() -> Markup {
    let posterize = (
        f32::from(POSTERIZE_RANGE.0),
        f32::from(POSTERIZE_RANGE.1),
    );
    let blur_radius = slider("blur-radius", "Radius", BLUR_RANGE, 0.5, DEFAULT_BLUR_RADIUS);
    let posterize_bits = slider(
        "posterize-bits",
        "Bits",
        posterize,
        1.0,
        f32::from(DEFAULT_POSTERIZE_BITS),
    );
    let solarize_threshold = slider(
        "solarize-threshold",
        "Threshold",
        (0.0, 255.0),
        1.0,
        f32::from(DEFAULT_SOLARIZE_THRESHOLD),
    );
    html! {
        h2 { "Transform" }
        (pills("rotate", "Rotation", ROTATION_PRESETS, "°", 0, (0, MAX_ROTATION)))
        (pills("scale", "Scale", SCALE_PRESETS, "%", 100, SCALE_RANGE))

        h2 { "Adjust" }
        (slider("brightness", "Brightness", FACTOR_RANGE, 0.1, 1.0))
        (slider("contrast", "Contrast", FACTOR_RANGE, 0.1, 1.0))
        (slider("sharpness", "Sharpness", FACTOR_RANGE, 0.1, 1.0))
        (slider("color", "Color", FACTOR_RANGE, 0.1, 1.0))

        h2 { "Filters" }
        (toggle("blur", "Blur", false, Some(blur_radius)))
        (toggle("edges", "Edge detection", false, None))
        (toggle("invert", "Invert colors", false, None))
        (toggle("grayscale", "Grayscale", false, None))
        (toggle("posterize", "Posterize", false, Some(posterize_bits)))
        (toggle("solarize", "Solarize", false, Some(solarize_threshold)))

        h2 { "Metadata" }
        (toggle("exif_transpose", "Apply EXIF orientation", true, None))
    }
}

fn download_box(config: &EditorConfig) -> Markup {
    html! {
        div.download {
            label for="format" { "Output format" }
            select id="format" {
                @for format in OutputFormat::ALL {
                    option value=(format.extension()) selected[format == config.output.format] {
                        (format.label())
                    }
                }
            }
            label.control for="quality" {
                span.label { "JPEG quality" }
                input type="range" id="quality" min="1" max="100" step="1" value=(config.output.quality);
                output for="quality" { (config.output.quality) }
            }
            a.button id="download" aria-disabled="true" { "Download" }
        }
    }
}

fn panels() -> Markup {
    html! {
        section.panel id="metrics" {
            h2 { "Image info" }
            dl {
                dt { "Resolution" } dd id="metric-resolution" { "–" }
                dt { "Color mode" } dd id="metric-mode" { "–" }
                dt { "File size" } dd id="metric-size" { "–" }
                dt { "DPI" } dd id="metric-dpi" { "–" }
            }
        }
        section.panel id="exif" {
            h2 { "EXIF data" }
            p id="exif-empty" { "No EXIF data found." }
            table id="exif-table" hidden {
                tbody {}
            }
        }
    }
}

/// Render the whole editor page.
pub fn editor_page(config: &EditorConfig) -> Markup {
    let content = html! {
        header.site-header {
            h1 { "Simple Image Editor" }
            p.tagline { "Upload an image, adjust it, download the result." }
        }
        form id="editor" method="post" action="/api/render" enctype="multipart/form-data" {
            aside.sidebar {
                (controls())
            }
            main.workspace {
                label.upload for="file" {
                    "Choose an image (PNG, JPEG, WEBP, HEIC)"
                    input type="file" id="file" name="file" accept=(accept_list());
                }
                div.error id="error" role="alert" hidden {}
                figure.preview {
                    img id="preview" alt="Processed image preview";
                }
                (download_box(config))
                (panels())
            }
        }
    };
    base_document("Simple Image Editor", content)
}
