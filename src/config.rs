//! Editor configuration module.
//!
//! Handles loading, validating, and merging `simple-edit.toml`. Stock defaults
//! are overridden by the user file, which only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! bind = "127.0.0.1:8501"        # Address the editor listens on
//! max_upload_bytes = 209715200   # Largest accepted upload (200 MB)
//!
//! [output]
//! format = "png"                 # Preselected download format: png, jpeg, webp
//! quality = 90                   # JPEG quality (1-100)
//!
//! [limits]
//! max_pixels = 178956970         # Largest decoded or scaled image, in pixels
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, OutputOptions, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Editor configuration loaded from `simple-edit.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Default download format and quality.
    pub output: OutputConfig,
    /// Resource limits for decoding and scaling.
    pub limits: LimitsConfig,
}

impl EditorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "server.bind must be an address like 127.0.0.1:8501, got {:?}",
                self.server.bind
            )));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Validation(
                "server.max_upload_bytes must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.limits.max_pixels == 0 {
            return Err(ConfigError::Validation(
                "limits.max_pixels must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Largest request body accepted by the upload endpoints.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8501".to_string(),
            max_upload_bytes: 200 * 1024 * 1024,
        }
    }
}

/// Download defaults. The page preselects these, the API falls back to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: Quality::default().value(),
        }
    }
}

impl OutputConfig {
    pub fn options(&self) -> OutputOptions {
        OutputOptions {
            format: self.format,
            quality: Quality::new(self.quality),
        }
    }
}

/// Resource limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum `width * height` of a decoded or scaled image.
    pub max_pixels: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        // 0x7FFF * 0x7FFF / 6, a decompression-bomb guard that still fits large phone photos
        Self {
            max_pixels: 178_956_970,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(EditorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<EditorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: EditorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, falling back to stock defaults when it is
/// missing.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let overlay = load_raw_config(path)?;
    if overlay.is_some() {
        tracing::debug!(path = %path.display(), "loaded config file");
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `simple-edit.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# simple-edit Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# The file is read from ./simple-edit.toml unless --config points elsewhere.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# HTTP server
# ---------------------------------------------------------------------------
[server]
# Address the editor listens on. Use 0.0.0.0:8501 to expose it on the network.
bind = "127.0.0.1:8501"

# Largest accepted upload in bytes (200 MB).
max_upload_bytes = 209715200

# ---------------------------------------------------------------------------
# Download defaults
# ---------------------------------------------------------------------------
[output]
# Format preselected in the download box: "png", "jpeg" or "webp".
format = "png"

# JPEG encoding quality (1 = worst, 100 = best). WebP output is lossless.
quality = 90

# ---------------------------------------------------------------------------
# Resource limits
# ---------------------------------------------------------------------------
[limits]
# Largest image, in pixels, that is decoded or produced by scaling.
max_pixels = 178956970
"##
}
