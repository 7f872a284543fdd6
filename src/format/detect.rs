//! Format detection for uploaded images.
//!
//! Examines magic bytes only. Formats that the `image` crate recognizes but
//! this build does not decode are rejected with an error that maps to HTTP 415
//! Unsupported Media Type.

use image::ImageFormat;

use crate::error::CodecError;

/// Minimum bytes needed to recognize any supported signature.
const MIN_HEADER_BYTES: usize = 4;

/// Whether uploads in `format` can be decoded by this build.
pub fn is_supported_format(format: ImageFormat) -> bool {
    matches!(format, ImageFormat::Jpeg | ImageFormat::Png)
}

/// Detect the container format of an uploaded image.
///
/// # Returns
/// * `Ok(ImageFormat)` - JPEG or PNG
/// * `Err(CodecError::UnsupportedFormat)` - anything else, including input too
///   short to carry a signature
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, CodecError> {
    if bytes.len() < MIN_HEADER_BYTES {
        return Err(CodecError::UnsupportedFormat {
            reason: format!("input too small ({} bytes) to identify", bytes.len()),
        });
    }

    let format = image::guess_format(bytes).map_err(|_| CodecError::UnsupportedFormat {
        reason: "unrecognized image signature".to_string(),
    })?;

    if !is_supported_format(format) {
        return Err(CodecError::UnsupportedFormat {
            reason: format!("{:?} images are not supported (expected JPEG or PNG)", format),
        });
    }

    Ok(format)
}
