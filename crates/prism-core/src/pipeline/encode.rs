//! Encoding to the output format and writing into the destination tree.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageResult};
use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use crate::error::PipelineError;
use crate::types::OutputFormat;

/// JPEG quality used for every encode.
pub const JPEG_QUALITY: u8 = 90;

/// PNG compression used for every encode.
pub const PNG_COMPRESSION: CompressionType = CompressionType::Default;

/// Encodes images with fixed per-format settings.
pub struct Encoder;

impl Encoder {
    /// Encode `image` as `format` and return the file bytes.
    pub fn encode(
        image: &DynamicImage,
        format: OutputFormat,
        path: &Path,
    ) -> Result<Vec<u8>, PipelineError> {
        let pixels = Self::compatible_pixels(image, format);
        Self::encode_pixels(&pixels, format).map_err(|e| PipelineError::Encode {
            path: path.to_path_buf(),
            format: format.to_string(),
            message: e.to_string(),
        })
    }

    fn encode_pixels(image: &DynamicImage, format: OutputFormat) -> ImageResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            OutputFormat::Jpeg => {
                image.write_with_encoder(JpegEncoder::new_with_quality(
                    &mut buffer,
                    JPEG_QUALITY,
                ))?;
            }
            OutputFormat::Png => {
                image.write_with_encoder(PngEncoder::new_with_quality(
                    &mut buffer,
                    PNG_COMPRESSION,
                    PngFilter::Adaptive,
                ))?;
            }
            OutputFormat::Webp => {
                image.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
            }
            OutputFormat::Tiff | OutputFormat::Gif => {
                image.write_to(&mut buffer, format.image_format())?;
            }
        }
        Ok(buffer.into_inner())
    }

    /// Convert to a pixel layout the target codec accepts.
    ///
    /// JPEG has no alpha channel; WebP and GIF only take 8-bit RGB(A); PNG
    /// and TIFF accept anything up to 16 bits per channel.
    fn compatible_pixels(image: &DynamicImage, format: OutputFormat) -> Cow<'_, DynamicImage> {
        use DynamicImage::*;

        match (format, image) {
            (OutputFormat::Jpeg, ImageLuma8(_) | ImageRgb8(_)) => Cow::Borrowed(image),
            (OutputFormat::Jpeg, _) => Cow::Owned(ImageRgb8(image.to_rgb8())),
            (OutputFormat::Webp | OutputFormat::Gif, ImageRgb8(_) | ImageRgba8(_)) => {
                Cow::Borrowed(image)
            }
            (OutputFormat::Webp | OutputFormat::Gif, _) => {
                Cow::Owned(ImageRgba8(image.to_rgba8()))
            }
            (OutputFormat::Png | OutputFormat::Tiff, ImageRgb32F(_) | ImageRgba32F(_)) => {
                Cow::Owned(ImageRgba16(image.to_rgba16()))
            }
            _ => Cow::Borrowed(image),
        }
    }
}

/// Create every missing directory above `path`.
///
/// Pre-existing directories are not an error, so calling this repeatedly
/// is a no-op after the first success.
pub fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
