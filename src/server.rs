//! HTTP surface of the editor.
//!
//! | Route | Request | Response |
//! |---|---|---|
//! | `GET /` | | editor page |
//! | `GET /health` | | `ok` |
//! | `POST /api/info` | multipart `file` | JSON summary + EXIF of the upload |
//! | `POST /api/render` | multipart `file` + edit fields | encoded image |
//!
//! Every request is self-contained: the browser keeps the upload and sends
//! it with each edit, so the server holds no per-user state. Decode, edit and
//! encode are CPU-bound and run on the blocking pool.
//!
//! Errors are JSON bodies of the form `{"error": "..."}`.

use crate::config::EditorConfig;
use crate::imaging::{
    BackendError, EditError, EditParams, ImageBackend, OutputFormat, OutputOptions, ParamError,
    Quality, RustBackend, Upload, inspect, render,
};
use crate::metadata::{ExifData, ImageSummary};
use crate::ui;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

pub const PROCESSED_SIZE_HEADER: &str = "x-processed-size";
pub const RESOLUTION_HEADER: &str = "x-image-resolution";
pub const COLOR_MODE_HEADER: &str = "x-image-mode";
pub const DPI_HEADER: &str = "x-image-dpi";

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ImageBackend>,
    pub config: Arc<EditorConfig>,
}

impl AppState {
    pub fn new(backend: Arc<dyn ImageBackend>, config: EditorConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/info", post(info))
        .route("/api/render", post(render_image))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind `server.bind` and serve the editor until the process is stopped.
pub async fn serve(config: EditorConfig) -> Result<(), ServerError> {
    let addr = config.server.bind.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(
        addr = %addr,
        max_upload_bytes = config.server.max_upload_bytes,
        "editor listening on http://{addr}/"
    );
    let state = AppState::new(Arc::new(RustBackend::new()), config);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(ui::editor_page(&state.config).into_string())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Upload metrics as shown in the metrics panel.
#[derive(Debug, Serialize)]
struct SummaryJson {
    width: u32,
    height: u32,
    resolution: String,
    color_mode: &'static str,
    file_size: usize,
    file_size_label: String,
    dpi: String,
}

impl From<&ImageSummary> for SummaryJson {
    fn from(summary: &ImageSummary) -> Self {
        Self {
            width: summary.width,
            height: summary.height,
            resolution: summary.resolution(),
            color_mode: summary.color_mode,
            file_size: summary.file_size,
            file_size_label: summary.file_size_label(),
            dpi: summary.dpi_label(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InfoResponse {
    file_name: String,
    summary: SummaryJson,
    exif: ExifData,
}

async fn info(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let form = EditForm::read(multipart).await?;
    let upload = form.into_upload()?;
    let file_name = upload.file_name.clone();
    let max_pixels = state.config.limits.max_pixels;

    let started = Instant::now();
    let backend = Arc::clone(&state.backend);
    let inspection =
        tokio::task::spawn_blocking(move || inspect(backend.as_ref(), &upload, max_pixels))
            .await??;

    tracing::info!(
        file = %file_name,
        resolution = %inspection.summary.resolution(),
        mode = inspection.summary.color_mode,
        exif_tags = inspection.exif.entries().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "inspected upload"
    );

    Ok(Json(InfoResponse {
        file_name,
        summary: SummaryJson::from(&inspection.summary),
        exif: inspection.exif,
    })
    .into_response())
}

async fn render_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = EditForm::read(multipart).await?;
    let params = form.edit_params()?;
    let output = form.output_options(&state.config)?;
    let upload = form.into_upload()?;
    let file_name = upload.file_name.clone();
    let max_pixels = state.config.limits.max_pixels;
    let re_encode_only = params.is_identity();

    let started = Instant::now();
    let backend = Arc::clone(&state.backend);
    let rendered = tokio::task::spawn_blocking(move || {
        render(backend.as_ref(), &upload, &params, output, max_pixels)
    })
    .await??;

    tracing::info!(
        file = %file_name,
        format = %rendered.format,
        resolution = %rendered.summary.resolution(),
        bytes = rendered.bytes.len(),
        re_encode_only,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rendered image"
    );

    let summary = &rendered.summary;
    let headers = [
        (header::CONTENT_TYPE, rendered.format.mime_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", rendered.download_name()),
        ),
        (header::CACHE_CONTROL, "no-store".to_string()),
    ];
    let mut response = (StatusCode::OK, headers, rendered.bytes).into_response();
    let extra = response.headers_mut();
    for (name, value) in [
        (PROCESSED_SIZE_HEADER, summary.file_size_label()),
        (RESOLUTION_HEADER, summary.resolution()),
        (COLOR_MODE_HEADER, summary.color_mode.to_string()),
        (DPI_HEADER, summary.dpi_label()),
    ] {
        if let Ok(value) = HeaderValue::from_str(&value) {
            extra.insert(name, value);
        }
    }
    Ok(response)
}

// ============================================================================
// Multipart form
// ============================================================================

/// Text fields accepted next to the upload.
pub(crate) const EDIT_FIELDS: &[&str] = &[
    "rotate",
    "scale",
    "brightness",
    "contrast",
    "sharpness",
    "color",
    "blur",
    "edges",
    "invert",
    "grayscale",
    "posterize",
    "solarize",
    "exif_transpose",
    "format",
    "quality",
];

/// A parsed multipart request: the optional upload and the raw text fields.
#[derive(Debug, Default)]
struct EditForm {
    upload: Option<Upload>,
    fields: HashMap<String, String>,
}

impl EditForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await?.to_vec();
                form.upload = Some(Upload { file_name, data });
            } else if EDIT_FIELDS.contains(&name.as_str()) {
                let value = field.text().await?;
                form.fields.insert(name, value.trim().to_string());
            } else {
                return Err(AppError::BadRequest(format!("unknown form field `{name}`")));
            }
        }
        Ok(form)
    }

    /// Non-empty value of a text field.
    fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    fn parse<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, AppError> {
        self.value(name)
            .map(|raw| {
                raw.parse::<T>().map_err(|_| {
                    AppError::from(ParamError::new(name, format!("`{raw}` is not a valid value")))
                })
            })
            .transpose()
    }

    fn flag(&self, name: &'static str, default: bool) -> Result<bool, AppError> {
        match self.value(name) {
            None => Ok(default),
            Some(raw) => parse_bool(raw)
                .ok_or_else(|| ParamError::new(name, format!("`{raw}` is not a boolean")).into()),
        }
    }

    fn edit_params(&self) -> Result<EditParams, AppError> {
        let neutral = EditParams::default();
        let params = EditParams {
            rotation: self.parse("rotate")?.unwrap_or(neutral.rotation),
            scale_percent: self.parse("scale")?.unwrap_or(neutral.scale_percent),
            brightness: self.parse("brightness")?.unwrap_or(neutral.brightness),
            contrast: self.parse("contrast")?.unwrap_or(neutral.contrast),
            sharpness: self.parse("sharpness")?.unwrap_or(neutral.sharpness),
            color: self.parse("color")?.unwrap_or(neutral.color),
            blur_radius: self.parse("blur")?,
            find_edges: self.flag("edges", false)?,
            invert: self.flag("invert", false)?,
            grayscale: self.flag("grayscale", false)?,
            posterize_bits: self.parse("posterize")?,
            solarize_threshold: self.parse("solarize")?,
            exif_transpose: self.flag("exif_transpose", neutral.exif_transpose)?,
        };
        params.validate()?;
        Ok(params)
    }

    fn output_options(&self, config: &EditorConfig) -> Result<OutputOptions, AppError> {
        let defaults = config.output.options();
        let format = match self.value("format") {
            Some(raw) => raw
                .parse::<OutputFormat>()
                .map_err(|e| AppError::from(ParamError::new("format", e)))?,
            None => defaults.format,
        };
        let quality = self
            .parse::<u8>("quality")?
            .map_or(defaults.quality, Quality::new);
        Ok(OutputOptions { format, quality })
    }

    fn into_upload(self) -> Result<Upload, AppError> {
        match self.upload {
            Some(upload) if !upload.data.is_empty() => Ok(upload),
            _ => Err(AppError::BadRequest("missing `file` upload".to_string())),
        }
    }
}

/// HTML checkbox and query-string booleans.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Some(true),
        "false" | "off" | "0" | "no" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    PayloadTooLarge(String),
    UnsupportedMedia(String),
    Unprocessable(String),
    Internal(String),
}

impl From<ParamError> for AppError {
    fn from(err: ParamError) -> Self {
        tracing::warn!(param = err.name, error = %err.reason, "invalid edit parameter");
        AppError::BadRequest(err.to_string())
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::UnsupportedFormat(msg) => {
                tracing::warn!(error = %msg, "unsupported upload format");
                AppError::UnsupportedMedia(format!("Unsupported format: {msg}"))
            }
            BackendError::Decode(msg) => {
                tracing::warn!(error = %msg, "could not decode upload");
                AppError::Unprocessable(format!("Decode failed: {msg}"))
            }
            BackendError::Encode(msg) => {
                tracing::error!(error = %msg, "could not encode result");
                AppError::Unprocessable(format!("Encode failed: {msg}"))
            }
            BackendError::Io(e) => {
                tracing::error!(error = %e, "I/O error while reading upload");
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::Backend(e) => e.into(),
            EditError::InvalidParams(e) => e.into(),
            EditError::TooLarge {
                width,
                height,
                max_pixels,
            } => {
                tracing::warn!(width, height, max_pixels, "image resolution too large");
                AppError::PayloadTooLarge(format!(
                    "image resolution {width}x{height} exceeds the {max_pixels} pixel limit"
                ))
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        let message = err.body_text();
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            tracing::warn!(error = %message, "upload exceeds body limit");
            AppError::PayloadTooLarge(message)
        } else {
            tracing::warn!(error = %message, "malformed multipart request");
            AppError::BadRequest(message)
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("image task failed: {err}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::UnsupportedMedia(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
