//! Image decoding with content-based format detection.

use image::{DynamicImage, GenericImageView, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use crate::error::PipelineError;

use super::metadata::{apply_orientation, MetadataExtractor};

/// Result of decoding an image.
#[derive(Debug)]
pub struct DecodedImage {
    /// The decoded image data, upright according to EXIF
    pub image: DynamicImage,
    /// Detected input format
    pub format: ImageFormat,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

/// Decodes source images.
pub struct ImageDecoder;

impl ImageDecoder {
    /// Decode an image from an in-memory byte buffer.
    ///
    /// The format is sniffed from content first and from the file extension
    /// second, so a PNG named `.jpg` still decodes. `path` is only used for
    /// the extension fallback and error messages.
    pub fn decode_bytes(bytes: &[u8], path: &Path) -> Result<DecodedImage, PipelineError> {
        if bytes.is_empty() {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "file is empty".to_string(),
            });
        }

        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        let format = match reader.format() {
            Some(f) => f,
            None => ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
                format: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            })?,
        };

        let mut reader = reader;
        reader.set_format(format);
        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let image = match MetadataExtractor::orientation(bytes) {
            Some(orientation) if orientation != 1 => {
                tracing::trace!("  EXIF orientation {} for {:?}", orientation, path);
                apply_orientation(image, orientation)
            }
            _ => image,
        };

        let (width, height) = image.dimensions();
        Ok(DecodedImage {
            image,
            format,
            width,
            height,
        })
    }
}
