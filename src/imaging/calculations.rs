//! Pure calculation functions for image edits.
//!
//! All functions here are pure and testable without any I/O or images.

/// Output dimensions for a percentage scale.
///
/// Each edge is truncated (`floor(edge * percent / 100)`) and never drops
/// below one pixel.
///
/// ```
/// # use simple_edit::imaging::calculations::scaled_dimensions;
/// assert_eq!(scaled_dimensions((800, 600), 50), (400, 300));
/// assert_eq!(scaled_dimensions((3, 3), 25), (1, 1));
/// ```
pub fn scaled_dimensions(dims: (u32, u32), percent: u32) -> (u32, u32) {
    let scale = |edge: u32| {
        let scaled = u64::from(edge) * u64::from(percent) / 100;
        scaled.clamp(1, u64::from(u32::MAX)) as u32
    };
    (scale(dims.0), scale(dims.1))
}

/// Canvas size that fully contains an image rotated by `degrees`.
///
/// Multiples of 90 swap or keep the edges exactly; other angles use the
/// bounding box of the rotated rectangle, rounded up.
pub fn rotated_bounds(dims: (u32, u32), degrees: u32) -> (u32, u32) {
    let (w, h) = dims;
    match degrees % 360 {
        0 | 180 => (w, h),
        90 | 270 => (h, w),
        d => {
            let theta = f64::from(d).to_radians();
            let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
            let (w, h) = (f64::from(w), f64::from(h));
            (snap_ceil(w * cos + h * sin), snap_ceil(w * sin + h * cos))
        }
    }
}

/// Round up, ignoring floating-point noise just above an integer.
fn snap_ceil(value: f64) -> u32 {
    (value - 1e-6).ceil().max(1.0) as u32
}

/// Interpolate between a degenerate sample and the original one.
///
/// `factor` 0.0 yields the degenerate value, 1.0 the original, and values
/// above 1.0 extrapolate away from the degenerate value.
pub fn blend(degenerate: u8, original: u8, factor: f32) -> u8 {
    let value = f32::from(degenerate) * (1.0 - factor) + f32::from(original) * factor;
    value.round().clamp(0.0, 255.0) as u8
}

/// Luma of an 8-bit RGB triple (ITU-R 601-2).
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let l = u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114;
    ((l + 500) / 1000) as u8
}

/// Bit mask keeping the top `bits` bits of a channel.
///
/// ```
/// # use simple_edit::imaging::calculations::posterize_mask;
/// assert_eq!(posterize_mask(1), 0b1000_0000);
/// assert_eq!(posterize_mask(4), 0b1111_0000);
/// assert_eq!(posterize_mask(8), 0b1111_1111);
/// ```
pub fn posterize_mask(bits: u8) -> u8 {
    let bits = bits.clamp(1, 8);
    (0xFF00u16 >> bits) as u8
}

/// Invert samples at or above `threshold`.
pub fn solarize_sample(value: u8, threshold: u8) -> u8 {
    if value >= threshold { 255 - value } else { value }
}

/// Human-readable size in mebibytes with two decimals.
///
/// ```
/// # use simple_edit::imaging::calculations::format_megabytes;
/// assert_eq!(format_megabytes(1024 * 1024), "1.00 MB");
/// assert_eq!(format_megabytes(0), "0.00 MB");
/// ```
pub fn format_megabytes(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
