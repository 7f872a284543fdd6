//! # gridcut
//!
//! Cuts a raster image into a fixed `rows × cols` grid of tiles and stamps
//! each tile with a watermark and its grid position.
//!
//! ## Features
//!
//! - **Pixel-exact geometry**: Floor-division grid with an explicit remainder policy
//! - **Deterministic stamping**: Embedded bitmap font and integer alpha blending
//! - **Soft-fail watermarks**: A tile that cannot be stamped is still delivered
//! - **Parallel composition**: Tiles are composed on rayon, returned in row-major order
//! - **Delivery surfaces**: A CLI that writes tiles to disk and an HTTP service
//!
//! ## Architecture
//!
//! - [`grid`] - Partitioning of image dimensions into regions
//! - [`tile`] - Cropping, watermarking, the cut pipeline and tile encoding
//! - [`mod@format`] - Decoding uploads into normalized rasters
//! - [`server`] - Axum-based HTTP service
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust
//! use gridcut::{cut_and_stamp, GridSpec, WatermarkSpec};
//! use image::{DynamicImage, RgbImage};
//!
//! let raster = DynamicImage::ImageRgb8(RgbImage::new(1200, 900));
//! let tiles = cut_and_stamp(&raster, GridSpec::new(3, 4), &WatermarkSpec::default()).unwrap();
//!
//! assert_eq!(tiles.len(), 12);
//! assert_eq!(tiles[0].region.right, 300);
//! assert_eq!(tiles[11].label, "3-4");
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod grid;
pub mod server;
pub mod tile;

// Re-export commonly used types
pub use config::{Cli, Command, CutConfig, EncodeArgs, GridArgs, ServeConfig};
pub use error::{CodecError, CutError, GridError, RenderError};
pub use format::{decode_raster, detect_format, normalize};
pub use grid::{partition, partition_with, GridSpec, Region, RemainderPolicy};
pub use server::{create_default_router, create_router, AppState, RouterConfig};
pub use tile::{
    compose, cut_and_stamp, BitmapRenderer, GridCutter, OutputFormat, Tile, TileEncoder,
    TileMarks, WatermarkRenderer, WatermarkSpec, WatermarkStatus, WatermarkStyle,
};
