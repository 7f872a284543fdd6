//! Input decoding.
//!
//! Turns an uploaded byte stream into the raster the grid cutter works on.
//!
//! # Format Detection
//!
//! Use [`detect::detect_format`] to identify an upload from its magic bytes.
//! Currently supported formats:
//!
//! - **JPEG**
//! - **PNG**
//!
//! Decoded images are normalized to 8-bit RGB by [`decode::normalize`] before
//! they reach the cutter.

pub mod decode;
pub mod detect;

pub use decode::{decode_raster, normalize};
pub use detect::{detect_format, is_supported_format};
