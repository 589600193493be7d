//! # simple-edit
//!
//! A small image editor served to the browser from a single binary. Upload a
//! PNG, JPEG, WebP or HEIC image, rotate and scale it, adjust brightness,
//! contrast, sharpness and color, apply blur, edge detection, grayscale and a
//! few other filters, read its EXIF metadata and download the result as PNG,
//! JPEG or WebP.
//!
//! # Architecture: One Request, One Pipeline
//!
//! Every edit is a complete round trip. The browser keeps the original upload
//! and sends it with the current control values; the server decodes, edits,
//! encodes and forgets:
//!
//! ```text
//! upload bytes → decode → EXIF orientation → edits → encode → download bytes
//! ```
//!
//! There is no session store and no cache. Two tabs editing two photos share
//! nothing but the read-only config, and a crash loses at most one request.
//! The same pipeline backs the `edit` and `info` CLI commands.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decode/encode backend, edit parameters, pixel adjustments, the edit pipeline |
//! | [`metadata`] | EXIF tags, DPI and the resolution / color mode / size summary |
//! | [`server`] | axum router: editor page, `/api/info`, `/api/render` |
//! | [`ui`] | The editor page rendered with Maud |
//! | [`config`] | `simple-edit.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting for `info` and `edit` |
//!
//! # Design Decisions
//!
//! ## Stateless Server
//!
//! Keeping the upload in the browser means the server needs no upload
//! directory, no expiry and no locking. Re-sending the original on every
//! change also means edits never accumulate generation loss: each render
//! starts from the pristine upload.
//!
//! ## Maud Over Template Engines
//!
//! The single page is generated with [Maud](https://maud.lambda.xyz/): the
//! markup is checked at compile time, interpolation is escaped by default and
//! the binary ships no template files. CSS and JS are compiled in with
//! `include_str!`.
//!
//! ## Pure-Rust Imaging, Optional libheif
//!
//! PNG, JPEG and WebP go through the `image` crate, so the default build has no
//! system dependencies. HEIC needs an HEVC decoder that only exists in C, so it
//! is behind the `heic` cargo feature, which links libheif.

pub mod config;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod server;
pub mod ui;

#[cfg(test)]
pub(crate) mod test_helpers;
