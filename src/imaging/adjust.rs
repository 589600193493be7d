//! Pixel adjustments and filters.
//!
//! The four enhancements (brightness, contrast, sharpness, color) share one
//! formula: build a *degenerate* version of the image and interpolate between
//! it and the original with [`blend`]. A factor of 1.0 returns the input
//! unchanged; 0.0 returns the degenerate image.
//!
//! | Enhancement | Degenerate image |
//! |---|---|
//! | brightness | black |
//! | contrast | flat gray at the mean luma |
//! | sharpness | 3x3 smoothed image |
//! | color | grayscale |
//!
//! Per-sample operations work on 8-bit buffers. Higher bit depths are
//! converted first, and alpha is never modified by them.

use super::calculations::{blend, luma, posterize_mask, solarize_sample};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::filter::filter3x3;

/// Smoothing kernel used as the sharpness degenerate, normalized by its sum (13).
const SMOOTH_KERNEL: [f32; 9] = {
    let w = 1.0 / 13.0;
    [w, w, w, w, 5.0 / 13.0, w, w, w, w]
};

/// Laplacian edge kernel (sums to zero).
const EDGE_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

/// Convert to the closest 8-bit layout, keeping 8-bit images as they are.
pub(crate) fn to_eight_bit(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => img,
        other => {
            let color = other.color();
            match (color.has_color(), color.has_alpha()) {
                (true, true) => DynamicImage::ImageRgba8(other.to_rgba8()),
                (true, false) => DynamicImage::ImageRgb8(other.to_rgb8()),
                (false, true) => DynamicImage::ImageLumaA8(other.to_luma_alpha8()),
                (false, false) => DynamicImage::ImageLuma8(other.to_luma8()),
            }
        }
    }
}

/// Drop alpha and reduce to 8-bit gray or RGB, the layouts JPEG stores.
pub(crate) fn to_jpeg_layout(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other if other.color().has_color() => DynamicImage::ImageRgb8(other.to_rgb8()),
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    }
}

fn samples_mut(img: &mut DynamicImage) -> Option<&mut [u8]> {
    match img {
        DynamicImage::ImageLuma8(buf) => Some(&mut **buf),
        DynamicImage::ImageLumaA8(buf) => Some(&mut **buf),
        DynamicImage::ImageRgb8(buf) => Some(&mut **buf),
        DynamicImage::ImageRgba8(buf) => Some(&mut **buf),
        _ => None,
    }
}

/// Rewrite every color sample; `f` receives the sample index and value.
fn map_samples(img: DynamicImage, mut f: impl FnMut(usize, u8) -> u8) -> DynamicImage {
    let mut img = to_eight_bit(img);
    let channels = usize::from(img.color().channel_count());
    let alpha_slot = img.color().has_alpha().then(|| channels - 1);
    if let Some(samples) = samples_mut(&mut img) {
        for (i, sample) in samples.iter_mut().enumerate() {
            if alpha_slot == Some(i % channels) {
                continue;
            }
            *sample = f(i, *sample);
        }
    }
    img
}

/// 3x3 correlation through `imageproc`, edges padded by continuity.
///
/// Samples come back unrounded in the layout of `img` (alpha included).
fn filter_samples(img: &DynamicImage, kernel: &[f32]) -> Vec<f32> {
    match img {
        DynamicImage::ImageLuma8(buf) => filter3x3::<_, f32, f32>(buf, kernel).into_raw(),
        DynamicImage::ImageLumaA8(buf) => filter3x3::<_, f32, f32>(buf, kernel).into_raw(),
        DynamicImage::ImageRgb8(buf) => filter3x3::<_, f32, f32>(buf, kernel).into_raw(),
        DynamicImage::ImageRgba8(buf) => filter3x3::<_, f32, f32>(buf, kernel).into_raw(),
        other => filter_samples(&to_eight_bit(other.clone()), kernel),
    }
}

fn to_sample(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Grayscale plane using ITU-R 601-2 luma.
fn luma_image(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y);
        Luma([luma(p[0], p[1], p[2])])
    })
}

/// Blend every color sample toward the same-layout `degenerate` buffer.
fn blend_with(img: DynamicImage, degenerate: &[f32], factor: f32) -> DynamicImage {
    map_samples(img, |i, v| blend(to_sample(degenerate[i]), v, factor))
}

pub fn brightness(img: DynamicImage, factor: f32) -> DynamicImage {
    if factor == 1.0 {
        return img;
    }
    map_samples(img, |_, v| blend(0, v, factor))
}

/// Mean luma of the image, rounded.
fn mean_luma(img: &DynamicImage) -> u8 {
    let gray = luma_image(img);
    let count = gray.as_raw().len() as u64;
    if count == 0 {
        return 0;
    }
    let total: u64 = gray.as_raw().iter().map(|&v| u64::from(v)).sum();
    ((total + count / 2) / count) as u8
}

pub fn contrast(img: DynamicImage, factor: f32) -> DynamicImage {
    if factor == 1.0 {
        return img;
    }
    let img = to_eight_bit(img);
    let mean = mean_luma(&img);
    map_samples(img, |_, v| blend(mean, v, factor))
}

pub fn sharpness(img: DynamicImage, factor: f32) -> DynamicImage {
    if factor == 1.0 {
        return img;
    }
    let img = to_eight_bit(img);
    let smoothed = filter_samples(&img, &SMOOTH_KERNEL);
    blend_with(img, &smoothed, factor)
}

/// Color / saturation: 0.0 is grayscale, 2.0 doubles saturation.
pub fn color(img: DynamicImage, factor: f32) -> DynamicImage {
    if factor == 1.0 {
        return img;
    }
    let img = to_eight_bit(img);
    let channels = usize::from(img.color().channel_count());
    let gray = luma_image(&img);
    let gray = gray.as_raw();
    map_samples(img, |i, v| blend(gray[i / channels], v, factor))
}

/// Gaussian blur with `radius` as the standard deviation. Radius 0 is a no-op.
pub fn gaussian_blur(img: DynamicImage, radius: f32) -> DynamicImage {
    if radius <= 0.0 {
        return img;
    }
    img.blur(radius)
}

/// Laplacian edge detection. Alpha is kept from the input.
pub fn find_edges(img: DynamicImage) -> DynamicImage {
    let img = to_eight_bit(img);
    let edges = filter_samples(&img, &EDGE_KERNEL);
    map_samples(img, |i, _| to_sample(edges[i]))
}

/// Invert colors. The image is converted to RGB first, dropping alpha.
pub fn invert(img: DynamicImage) -> DynamicImage {
    let mut rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    rgb.invert();
    rgb
}

/// Convert to 8-bit grayscale ("L").
pub fn grayscale(img: DynamicImage) -> DynamicImage {
    DynamicImage::ImageLuma8(luma_image(&img))
}

/// Keep only the top `bits` bits of each color channel.
pub fn posterize(img: DynamicImage, bits: u8) -> DynamicImage {
    let mask = posterize_mask(bits);
    map_samples(img, |_, v| v & mask)
}

/// Invert every color sample at or above `threshold`.
pub fn solarize(img: DynamicImage, threshold: u8) -> DynamicImage {
    map_samples(img, |_, v| solarize_sample(v, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{gradient_rgb, solid_rgb, solid_rgba};
    use image::{ColorType, GenericImageView, Rgb, RgbImage};

    fn pixel(img: &DynamicImage, x: u32, y: u32) -> [u8; 4] {
        img.get_pixel(x, y).0
    }

    // =========================================================================
    // Enhancements
    // =========================================================================

    #[test]
    fn factor_one_is_identity() {
        let img = gradient_rgb(8, 8);
        assert_eq!(brightness(img.clone(), 1.0), img);
        assert_eq!(contrast(img.clone(), 1.0), img);
        assert_eq!(sharpness(img.clone(), 1.0), img);
        assert_eq!(color(img.clone(), 1.0), img);
    }

    #[test]
    fn brightness_zero_is_black_and_keeps_alpha() {
        let out = brightness(solid_rgba(2, 2, [200, 100, 50, 77]), 0.0);
        assert_eq!(pixel(&out, 0, 0), [0, 0, 0, 77]);
    }

    #[test]
    fn brightness_half_and_double() {
        let img = solid_rgb(1, 1, [100, 200, 40]);
        assert_eq!(pixel(&brightness(img.clone(), 0.5), 0, 0), [50, 100, 20, 255]);
        assert_eq!(pixel(&brightness(img, 2.0), 0, 0), [200, 255, 80, 255]);
    }

    #[test]
    fn contrast_zero_is_flat_mean_gray() {
        let mut buf = RgbImage::new(2, 1);
        buf.put_pixel(0, 0, Rgb([0, 0, 0]));
        buf.put_pixel(1, 0, Rgb([255, 255, 255]));
        let out = contrast(DynamicImage::ImageRgb8(buf), 0.0);
        // mean luma of 0 and 255 rounds to 128
        assert_eq!(pixel(&out, 0, 0), [128, 128, 128, 255]);
        assert_eq!(pixel(&out, 1, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn contrast_increase_spreads_values() {
        let mut buf = RgbImage::new(2, 1);
        buf.put_pixel(0, 0, Rgb([100, 100, 100]));
        buf.put_pixel(1, 0, Rgb([156, 156, 156]));
        let out = contrast(DynamicImage::ImageRgb8(buf), 2.0);
        assert_eq!(pixel(&out, 0, 0)[0], 72);
        assert_eq!(pixel(&out, 1, 0)[0], 184);
    }

    #[test]
    fn color_zero_is_grayscale_in_rgb() {
        let out = color(solid_rgb(1, 1, [255, 0, 0]), 0.0);
        assert_eq!(out.color(), ColorType::Rgb8);
        assert_eq!(pixel(&out, 0, 0), [76, 76, 76, 255]);
    }

    #[test]
    fn sharpness_on_flat_image_is_unchanged() {
        let img = solid_rgb(5, 5, [90, 90, 90]);
        assert_eq!(pixel(&sharpness(img.clone(), 2.0), 2, 2), [90, 90, 90, 255]);
        assert_eq!(pixel(&sharpness(img, 0.0), 2, 2), [90, 90, 90, 255]);
    }

    #[test]
    fn sharpness_zero_softens_a_spike() {
        let mut buf = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        buf.put_pixel(1, 1, Rgb([255, 255, 255]));
        let out = sharpness(DynamicImage::ImageRgb8(buf), 0.0);
        let center = pixel(&out, 1, 1)[0];
        assert!(center < 255 && center > 0, "center {center}");
    }

    #[test]
    fn enhancements_convert_sixteen_bit_to_eight() {
        let img = DynamicImage::ImageRgb16(gradient_rgb(4, 4).to_rgb16());
        assert_eq!(brightness(img, 0.5).color(), ColorType::Rgb8);
    }

    // =========================================================================
    // Filters
    // =========================================================================

    #[test]
    fn blur_zero_radius_is_identity() {
        let img = gradient_rgb(6, 6);
        assert_eq!(gaussian_blur(img.clone(), 0.0), img);
    }

    #[test]
    fn blur_smooths_a_spike() {
        let mut buf = RgbImage::from_pixel(9, 9, Rgb([0, 0, 0]));
        buf.put_pixel(4, 4, Rgb([255, 255, 255]));
        let out = gaussian_blur(DynamicImage::ImageRgb8(buf), 2.0);
        assert_eq!((out.width(), out.height()), (9, 9));
        assert!(pixel(&out, 4, 4)[0] < 255);
        assert!(pixel(&out, 5, 4)[0] > 0);
    }

    #[test]
    fn edges_of_flat_image_are_black() {
        let out = find_edges(solid_rgb(5, 5, [120, 60, 30]));
        assert_eq!(pixel(&out, 2, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn edges_keep_alpha() {
        let out = find_edges(solid_rgba(4, 4, [120, 60, 30, 200]));
        assert_eq!(pixel(&out, 1, 1)[3], 200);
    }

    #[test]
    fn edges_highlight_a_boundary() {
        let buf = RgbImage::from_fn(6, 6, |x, _| {
            if x < 3 { Rgb([0, 0, 0]) } else { Rgb([200, 200, 200]) }
        });
        let out = find_edges(DynamicImage::ImageRgb8(buf));
        assert!(pixel(&out, 3, 3)[0] > 0);
        assert_eq!(pixel(&out, 0, 3)[0], 0);
    }

    #[test]
    fn invert_drops_alpha() {
        let out = invert(solid_rgba(1, 1, [10, 20, 30, 40]));
        assert_eq!(out.color(), ColorType::Rgb8);
        assert_eq!(pixel(&out, 0, 0), [245, 235, 225, 255]);
    }

    #[test]
    fn grayscale_is_luma() {
        let out = grayscale(solid_rgb(1, 1, [0, 255, 0]));
        assert_eq!(out.color(), ColorType::L8);
        assert_eq!(out.as_bytes(), &[150u8]);
    }

    #[test]
    fn posterize_masks_low_bits() {
        let out = posterize(solid_rgb(1, 1, [0b1011_0111, 0xFF, 0x0F]), 2);
        assert_eq!(pixel(&out, 0, 0), [0b1000_0000, 0b1100_0000, 0, 255]);
    }

    #[test]
    fn posterize_eight_bits_is_identity() {
        let img = gradient_rgb(5, 5);
        assert_eq!(posterize(img.clone(), 8), img);
    }

    #[test]
    fn solarize_inverts_bright_samples() {
        let out = solarize(solid_rgba(1, 1, [200, 100, 128, 255]), 128);
        assert_eq!(pixel(&out, 0, 0), [55, 100, 127, 255]);
    }

    #[test]
    fn edges_and_smoothing_clamp_at_borders() {
        let img = solid_rgb(3, 2, [40, 80, 120]);
        let smoothed: Vec<u8> = filter_samples(&img, &SMOOTH_KERNEL)
            .into_iter()
            .map(to_sample)
            .collect();
        assert_eq!(smoothed, img.as_bytes());
        assert!(
            filter_samples(&img, &EDGE_KERNEL)
                .into_iter()
                .all(|v| to_sample(v) == 0)
        );
    }

    #[test]
    fn grayscale_then_posterize_stays_luma() {
        let out = posterize(grayscale(gradient_rgb(4, 4)), 3);
        assert_eq!(out.color(), ColorType::L8);
    }
}
