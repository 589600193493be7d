//! EXIF orientation handling ("EXIF transpose").
//!
//! Cameras store pixels in sensor order and record how the picture should be
//! displayed in the `Orientation` tag. Transposing bakes that into the pixels
//! so every later edit sees the image the way the photographer framed it.

use image::DynamicImage;
use std::io::Cursor;

/// Value of the EXIF `Orientation` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u16)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    Transpose = 5,
    Rotate90 = 6,
    Transverse = 7,
    Rotate270 = 8,
}

impl Orientation {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Self::Normal),
            2 => Some(Self::FlipHorizontal),
            3 => Some(Self::Rotate180),
            4 => Some(Self::FlipVertical),
            5 => Some(Self::Transpose),
            6 => Some(Self::Rotate90),
            7 => Some(Self::Transverse),
            8 => Some(Self::Rotate270),
            _ => None,
        }
    }
}

/// Rotate/flip pixels so the image displays upright.
pub fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90 => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270 => img.rotate270(),
    }
}

/// Read the orientation tag from an encoded file (JPEG, PNG, WebP, HEIF).
///
/// Missing or malformed EXIF yields `None`.
pub fn read_orientation(data: &[u8]) -> Option<Orientation> {
    let exif = exif::Reader::new()
        .read_from_container(&mut Cursor::new(data))
        .ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    Orientation::from_u16(u16::try_from(value).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, jpeg_with_exif};

    #[test]
    fn orientation_from_u16() {
        assert_eq!(Orientation::from_u16(1), Some(Orientation::Normal));
        assert_eq!(Orientation::from_u16(6), Some(Orientation::Rotate90));
        assert_eq!(Orientation::from_u16(8), Some(Orientation::Rotate270));
        assert_eq!(Orientation::from_u16(0), None);
        assert_eq!(Orientation::from_u16(9), None);
    }

    #[test]
    fn normal_keeps_dimensions() {
        let img = DynamicImage::new_rgb8(10, 20);
        let result = apply_orientation(img, Orientation::Normal);
        assert_eq!((result.width(), result.height()), (10, 20));
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        for orientation in [
            Orientation::Transpose,
            Orientation::Rotate90,
            Orientation::Transverse,
            Orientation::Rotate270,
        ] {
            let result = apply_orientation(DynamicImage::new_rgb8(10, 20), orientation);
            assert_eq!((result.width(), result.height()), (20, 10), "{orientation:?}");
        }
    }

    #[test]
    fn flip_horizontal_mirrors_pixels() {
        let mut buf = image::RgbImage::new(2, 1);
        buf.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        let result = apply_orientation(DynamicImage::ImageRgb8(buf), Orientation::FlipHorizontal);
        assert_eq!(result.to_rgb8().get_pixel(1, 0), &image::Rgb([255, 0, 0]));
    }

    #[test]
    fn reads_orientation_from_jpeg_exif() {
        let data = jpeg_with_exif(20, 10, 6);
        assert_eq!(read_orientation(&data), Some(Orientation::Rotate90));
    }

    #[test]
    fn jpeg_without_exif_has_no_orientation() {
        assert_eq!(read_orientation(&jpeg_bytes(8, 8)), None);
    }

    #[test]
    fn garbage_has_no_orientation() {
        assert_eq!(read_orientation(b"not an image"), None);
    }
}
