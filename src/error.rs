use thiserror::Error;

/// Structural errors that reject a whole grid-cut operation.
///
/// These are raised before any tile work begins, so a caller that receives
/// one has no partial output to clean up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Row or column count is zero, or the grid is finer than the raster
    #[error("Invalid grid {rows}x{cols}: {reason}")]
    InvalidGridSpec { rows: u32, cols: u32, reason: String },

    /// Source raster has a zero dimension
    #[error("Invalid raster: {reason}")]
    InvalidRaster { reason: String },

    /// Region does not lie inside the source raster.
    ///
    /// Indicates a contract violation between partitioning and composition.
    #[error(
        "Invalid region ({left}, {top})-({right}, {bottom}) for {width}x{height} raster"
    )]
    InvalidRegion {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        width: u32,
        height: u32,
    },

    /// Requested tile index is past the end of the grid
    #[error("Tile index {index} out of range (grid has {count} tiles)")]
    TileIndexOutOfRange { index: usize, count: usize },
}

/// Watermark rendering failures.
///
/// Never fatal: the pipeline keeps the unstamped tile and reports the error
/// through [`crate::tile::WatermarkStatus::Skipped`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Drawing surface uses a pixel format the renderer cannot blend into
    #[error("Unsupported pixel format for text rendering: {0}")]
    UnsupportedPixelFormat(String),

    /// Any other renderer failure
    #[error("Watermark rendering failed: {message}")]
    Failed { message: String },
}

/// Errors from the decode and encode collaborators.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    /// Byte stream is not an image format this build can read (maps to HTTP 415)
    #[error("Unsupported format: {reason}")]
    UnsupportedFormat { reason: String },

    /// Failed to decode the uploaded image
    #[error("Failed to decode image: {message}")]
    DecodeError { message: String },

    /// Failed to encode a tile
    #[error("Failed to encode tile: {message}")]
    EncodeError { message: String },
}

/// Errors surfaced by the delivery layers (CLI and HTTP service).
#[derive(Debug, Clone, Error)]
pub enum CutError {
    /// Grid partitioning or composition rejected the request
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Upload could not be decoded or a tile could not be encoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Requested output quality outside 1-100
    #[error("Invalid quality: {quality} (must be 1-100)")]
    InvalidQuality { quality: u8 },

    /// Watermark text or label template that cannot be stamped or echoed back
    #[error("Invalid {field}: {reason}")]
    InvalidWatermark { field: &'static str, reason: String },

    /// Tile index in a request path is not a number
    #[error("Invalid tile index: {0}")]
    InvalidTileIndex(String),

    /// Background worker panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),
}
