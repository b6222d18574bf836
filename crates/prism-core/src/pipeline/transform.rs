//! Geometric transforms: aspect-preserving resize and right-angle rotation.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

use crate::error::PipelineError;
use crate::types::Rotation;

/// Resampling filter used for every resize.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Compute the output size for a requested `(width, height)`.
///
/// Returns `None` when no resize is requested (both zero). A single zero
/// axis is derived from the source aspect ratio, rounded, at least 1px.
pub fn target_dimensions(
    source_width: u32,
    source_height: u32,
    width: u32,
    height: u32,
) -> Option<(u32, u32)> {
    let scale = |value: u32, num: u32, den: u32| -> u32 {
        let scaled = (value as f64 * num as f64 / den as f64).round();
        (scaled.min(u32::MAX as f64) as u32).max(1)
    };

    match (width, height) {
        (0, 0) => None,
        (w, 0) => Some((w, scale(source_height, w, source_width))),
        (0, h) => Some((scale(source_width, h, source_height), h)),
        (w, h) => Some((w, h)),
    }
}

/// Resize `image` to the requested dimensions (see [`target_dimensions`]).
pub fn resize(
    image: DynamicImage,
    width: u32,
    height: u32,
    path: &Path,
) -> Result<DynamicImage, PipelineError> {
    let (source_width, source_height) = image.dimensions();
    if width == 0 && height == 0 {
        return Ok(image);
    }
    if source_width == 0 || source_height == 0 {
        return Err(PipelineError::Resize {
            path: path.to_path_buf(),
            message: format!("source image has no area ({source_width}x{source_height})"),
        });
    }

    match target_dimensions(source_width, source_height, width, height) {
        Some((w, h)) if (w, h) != (source_width, source_height) => {
            Ok(image.resize_exact(w, h, RESIZE_FILTER))
        }
        _ => Ok(image),
    }
}

/// Rotate counter-clockwise by the requested multiple of 90 degrees.
///
/// `image`'s `rotate90`/`rotate270` turn clockwise, so the two are swapped.
pub fn rotate(image: DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::Deg0 => image,
        Rotation::Deg90 => image.rotate270(),
        Rotation::Deg180 => image.rotate180(),
        Rotation::Deg270 => image.rotate90(),
    }
}
