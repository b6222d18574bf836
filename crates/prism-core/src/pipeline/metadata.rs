//! EXIF orientation handling.
//!
//! Cameras often store pixels in sensor order and record the intended
//! orientation in EXIF. Decoded images are normalized with this tag before
//! any geometry is applied, so a requested rotation is relative to what a
//! viewer would show.

use exif::{In, Reader, Tag, Value};
use image::DynamicImage;
use std::io::Cursor;

/// Reads EXIF metadata relevant to the transform.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract the EXIF orientation (1-8) from encoded image bytes.
    ///
    /// Returns `None` if the container has no EXIF data or no orientation.
    pub fn orientation(bytes: &[u8]) -> Option<u32> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new().read_from_container(&mut cursor).ok()?;
        exif.get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| match &f.value {
                Value::Short(v) => v.first().map(|&x| x as u32),
                Value::Long(v) => v.first().copied(),
                _ => None,
            })
            .filter(|o| (1..=8).contains(o))
    }
}

/// Apply an EXIF orientation value so the image is upright.
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(MetadataExtractor::orientation(b"not an image"), None);
        assert_eq!(MetadataExtractor::orientation(&[]), None);
    }

    #[test]
    fn test_apply_orientation_swaps_axes() {
        let img = DynamicImage::new_rgb8(40, 20);
        for orientation in [5, 6, 7, 8] {
            assert_eq!(apply_orientation(img.clone(), orientation).dimensions(), (20, 40));
        }
        for orientation in [1, 2, 3, 4, 0, 9] {
            assert_eq!(apply_orientation(img.clone(), orientation).dimensions(), (40, 20));
        }
    }
}
