//! Tile composition and encoding.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        CLI / HTTP delivery layer        │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               GridCutter                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  partition   │  │  compose        │  │
//! │  │  (geometry)  │  │  (crop → stamp) │  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │  Vec<Tile>
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              TileEncoder                │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`GridCutter`]: Entry point, partitions a raster and composes every tile
//! - [`compose`]: Crops one region and stamps its watermark
//! - [`WatermarkSpec`]: Primary text and position label template
//! - [`WatermarkRenderer`]: Drawing seam; [`BitmapRenderer`] is the built-in one
//! - [`TileEncoder`]: PNG/JPEG serialization for delivery

mod compose;
mod encoder;
mod font;
mod pipeline;
mod watermark;

pub use compose::{compose, crop, Tile, WatermarkStatus};
pub use encoder::{
    clamp_quality, is_valid_quality, OutputFormat, TileEncoder, DEFAULT_JPEG_QUALITY,
    MAX_JPEG_QUALITY, MIN_JPEG_QUALITY,
};
pub use pipeline::{cut_and_stamp, GridCutter};
pub use watermark::{
    BitmapRenderer, TileMarks, WatermarkRenderer, WatermarkSpec, WatermarkStyle,
    DEFAULT_LABEL_FORMAT, DEFAULT_PRIMARY_TEXT,
};
