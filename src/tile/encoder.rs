//! Tile encoder.
//!
//! Serializes composed tiles for delivery.
//!
//! # Design Decisions
//!
//! - **PNG by default**: Tiles are delivered losslessly unless JPEG is asked
//!   for explicitly.
//!
//! - **No resizing**: Tiles are encoded at their cropped size.
//!
//! - **RGB for JPEG**: Non-RGB tiles are converted to 8-bit RGB before JPEG
//!   encoding, dropping any alpha channel. PNG keeps the source format.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::error::CodecError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// =============================================================================
// Output Format
// =============================================================================

/// Container format for encoded tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Png,
    #[value(alias = "jpg")]
    Jpeg,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub const fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// MIME type for HTTP responses.
    pub const fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Png => f.write_str("png"),
            OutputFormat::Jpeg => f.write_str("jpeg"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpeg),
            other => Err(CodecError::UnsupportedFormat {
                reason: format!("unknown output format '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Tile Encoder
// =============================================================================

/// Encodes tiles as PNG or JPEG.
///
/// # Example
///
/// ```
/// use gridcut::tile::{OutputFormat, TileEncoder};
/// use image::{DynamicImage, RgbImage};
///
/// let encoder = TileEncoder::new(OutputFormat::Jpeg, 85);
/// let tile = DynamicImage::ImageRgb8(RgbImage::new(16, 16));
///
/// let bytes = encoder.encode(&tile).unwrap();
/// assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileEncoder {
    format: OutputFormat,
    quality: u8,
}

impl TileEncoder {
    /// Create an encoder. `quality` is clamped to 1-100 and only affects JPEG.
    pub fn new(format: OutputFormat, quality: u8) -> Self {
        Self {
            format,
            quality: clamp_quality(quality),
        }
    }

    pub fn png() -> Self {
        Self::new(OutputFormat::Png, DEFAULT_JPEG_QUALITY)
    }

    pub fn jpeg(quality: u8) -> Self {
        Self::new(OutputFormat::Jpeg, quality)
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a tile.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::EncodeError`] if the underlying codec fails.
    pub fn encode(&self, tile: &DynamicImage) -> Result<Bytes, CodecError> {
        let mut output = Vec::new();

        match self.format {
            OutputFormat::Png => {
                tile.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
                    .map_err(|e| CodecError::EncodeError {
                        message: e.to_string(),
                    })?;
            }
            OutputFormat::Jpeg => {
                let converted;
                let rgb = match tile.as_rgb8() {
                    Some(buf) => buf,
                    None => {
                        converted = tile.to_rgb8();
                        &converted
                    }
                };

                let mut encoder = JpegEncoder::new_with_quality(&mut output, self.quality);
                encoder
                    .encode_image(rgb)
                    .map_err(|e| CodecError::EncodeError {
                        message: e.to_string(),
                    })?;
            }
        }

        Ok(Bytes::from(output))
    }
}

impl Default for TileEncoder {
    fn default() -> Self {
        Self::png()
    }
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Validate JPEG quality parameter.
///
/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}

// =============================================================================
// Tests
// =============================================================================
