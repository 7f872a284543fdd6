//! Decoding uploads into rasters.

use image::DynamicImage;
use tracing::debug;

use crate::error::CodecError;

use super::detect::detect_format;

/// Decode an uploaded image and normalize it to 8-bit RGB.
///
/// # Errors
///
/// - [`CodecError::DecodeError`] for empty input or a corrupt stream
/// - [`CodecError::UnsupportedFormat`] if the format is not JPEG or PNG
pub fn decode_raster(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::DecodeError {
            message: "empty input".to_string(),
        });
    }

    let format = detect_format(bytes)?;

    let image = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        CodecError::DecodeError {
            message: e.to_string(),
        }
    })?;

    debug!(
        format = ?format,
        color = ?image.color(),
        width = image.width(),
        height = image.height(),
        "Decoded upload"
    );

    Ok(normalize(image))
}

/// Convert any raster to 8-bit RGB.
///
/// RGB input is returned unchanged. Alpha channels are dropped, not composited.
pub fn normalize(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) => image,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
