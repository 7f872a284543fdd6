//! Watermark text and rendering.
//!
//! Each tile carries two pieces of text:
//!
//! - the **primary text**, drawn at a fixed margin from the top-left corner
//! - the **position label**, derived from the tile's `(row, col)` and drawn at
//!   a fixed offset from the bottom-right corner
//!
//! Rendering goes through the [`WatermarkRenderer`] trait. The built-in
//! [`BitmapRenderer`] uses an embedded bitmap font and integer alpha blending,
//! so identical inputs always produce identical pixels.

use image::{DynamicImage, ImageBuffer, Pixel, Rgba};
use tracing::debug;

use crate::error::RenderError;
use crate::grid::{GridSpec, Region};

use super::font;

/// Default primary watermark text.
pub const DEFAULT_PRIMARY_TEXT: &str = "gridcut";

/// Default position label template (1-indexed `row-col`).
pub const DEFAULT_LABEL_FORMAT: &str = "{row}-{col}";

/// Default overlay color: semi-transparent white.
pub const DEFAULT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 128]);

/// Default distance of the primary text from the top-left corner.
pub const DEFAULT_MARGIN: u32 = 10;

/// Default anchor of the position label, measured back from the bottom-right corner.
pub const DEFAULT_LABEL_OFFSET: (u32, u32) = (40, 25);

/// Default glyph scale factor.
pub const DEFAULT_SCALE: u32 = 2;

// =============================================================================
// Watermark Spec
// =============================================================================

/// The text stamped onto every tile.
///
/// `position_label_format` is a template; see [`WatermarkSpec::label_for`]
/// for the supported placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkSpec {
    pub primary_text: String,
    pub position_label_format: String,
}

impl WatermarkSpec {
    pub fn new(primary_text: impl Into<String>, position_label_format: impl Into<String>) -> Self {
        Self {
            primary_text: primary_text.into(),
            position_label_format: position_label_format.into(),
        }
    }

    /// Use the default label template with custom primary text.
    pub fn with_text(primary_text: impl Into<String>) -> Self {
        Self::new(primary_text, DEFAULT_LABEL_FORMAT)
    }

    /// Expand the label template for one tile.
    ///
    /// Placeholders:
    /// - `{row}`, `{col}`: 1-indexed position
    /// - `{index}`: 1-indexed row-major position
    /// - `{rows}`, `{cols}`, `{total}`: grid shape
    ///
    /// Unknown placeholders are kept verbatim.
    pub fn label_for(&self, region: &Region, grid: GridSpec) -> String {
        let template = self.position_label_format.as_str();
        let mut out = String::with_capacity(template.len() + 4);
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];

            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };

            let name = &after[..end];
            match name {
                "row" => out.push_str(&(region.row + 1).to_string()),
                "col" => out.push_str(&(region.col + 1).to_string()),
                "index" => out.push_str(&(region.index(grid.cols) + 1).to_string()),
                "rows" => out.push_str(&grid.rows.to_string()),
                "cols" => out.push_str(&grid.cols.to_string()),
                "total" => out.push_str(&grid.tile_count().to_string()),
                _ => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY_TEXT, DEFAULT_LABEL_FORMAT)
    }
}

// =============================================================================
// Renderer Trait
// =============================================================================

/// Text to draw on a single tile.
#[derive(Debug, Clone, Copy)]
pub struct TileMarks<'a> {
    pub row: u32,
    pub col: u32,
    pub primary: &'a str,
    pub label: &'a str,
}

/// Draws watermark text onto a cropped tile.
///
/// Implementations must be deterministic and must only touch the pixels
/// covered by text. A renderer may leave the canvas partially drawn when it
/// returns an error; the compositor discards the canvas in that case.
pub trait WatermarkRenderer: Send + Sync {
    fn render(&self, canvas: &mut DynamicImage, marks: &TileMarks<'_>) -> Result<(), RenderError>;
}

impl<R: WatermarkRenderer + ?Sized> WatermarkRenderer for &R {
    fn render(&self, canvas: &mut DynamicImage, marks: &TileMarks<'_>) -> Result<(), RenderError> {
        (**self).render(canvas, marks)
    }
}

// =============================================================================
// Bitmap Renderer
// =============================================================================

/// Layout and color of the built-in renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkStyle {
    pub color: Rgba<u8>,
    pub margin: u32,
    pub label_offset: (u32, u32),
    pub scale: u32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            margin: DEFAULT_MARGIN,
            label_offset: DEFAULT_LABEL_OFFSET,
            scale: DEFAULT_SCALE,
        }
    }
}

/// Bitmap-font text renderer for 8-bit RGB and RGBA tiles.
///
/// Glyph pixels are alpha-blended with the style color. The alpha channel of
/// RGBA tiles is left as is. Text that runs past the tile edge is clipped.
///
/// The font covers printable ASCII only. Any other character (CJK text,
/// emoji, accented letters) is drawn as a hollow box, and the tile still
/// reports [`WatermarkStatus::Applied`](crate::tile::WatermarkStatus::Applied).
/// Use [`BitmapRenderer::has_glyphs`] to check text up front.
#[derive(Debug, Clone, Default)]
pub struct BitmapRenderer {
    style: WatermarkStyle,
}

impl BitmapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: WatermarkStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    /// Top-left corners of the primary text and the label on a `width × height` tile.
    pub fn anchors(&self, width: u32, height: u32) -> ((i64, i64), (i64, i64)) {
        let margin = self.style.margin as i64;
        let (dx, dy) = self.style.label_offset;
        (
            (margin, margin),
            (width as i64 - dx as i64, height as i64 - dy as i64),
        )
    }

    /// Pixel box `(left, top, right, bottom)` that `text` drawn at `anchor` can
    /// touch. Right and bottom are exclusive; the box may extend past the tile.
    pub fn text_bounds(&self, text: &str, anchor: (i64, i64)) -> (i64, i64, i64, i64) {
        let scale = self.style.scale.max(1) as i64;
        let (w, h) = font::measure(text);
        let (x, y) = anchor;
        (x, y, x + w as i64 * scale, y + h as i64 * scale)
    }

    /// Whether every character of `text` (line breaks aside) has a real glyph.
    pub fn has_glyphs(&self, text: &str) -> bool {
        text.chars().all(|c| c == '\n' || font::is_supported(c))
    }

    fn draw<P>(&self, buf: &mut ImageBuffer<P, Vec<u8>>, marks: &TileMarks<'_>)
    where
        P: Pixel<Subpixel = u8>,
    {
        let (primary_at, label_at) = self.anchors(buf.width(), buf.height());
        self.draw_text(buf, marks.primary, primary_at);
        self.draw_text(buf, marks.label, label_at);
    }

    fn draw_text<P>(&self, buf: &mut ImageBuffer<P, Vec<u8>>, text: &str, (x, y): (i64, i64))
    where
        P: Pixel<Subpixel = u8>,
    {
        let scale = self.style.scale.max(1) as i64;
        let (width, height) = (buf.width() as i64, buf.height() as i64);

        let (left, top, right, bottom) = self.text_bounds(text, (x, y));
        if right <= 0 || bottom <= 0 || left >= width || top >= height {
            return;
        }

        let color = self.style.color.0;
        let alpha = color[3] as u32;

        for (line_no, line) in text.split('\n').enumerate() {
            let line_top = y + (line_no as i64) * (font::LINE_HEIGHT as i64) * scale;
            for (char_no, c) in line.chars().enumerate() {
                let char_left = x + (char_no as i64) * (font::ADVANCE as i64) * scale;
                for gx in 0..font::GLYPH_WIDTH {
                    for gy in 0..font::GLYPH_HEIGHT {
                        if !font::is_set(c, gx, gy) {
                            continue;
                        }
                        for sy in 0..scale {
                            let py = line_top + gy as i64 * scale + sy;
                            if py < 0 || py >= height {
                                continue;
                            }
                            for sx in 0..scale {
                                let px = char_left + gx as i64 * scale + sx;
                                if px < 0 || px >= width {
                                    continue;
                                }
                                let channels =
                                    buf.get_pixel_mut(px as u32, py as u32).channels_mut();
                                for (dst, src) in channels.iter_mut().zip(color.iter()).take(3) {
                                    *dst = blend_channel(*dst, *src, alpha);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

impl WatermarkRenderer for BitmapRenderer {
    fn render(&self, canvas: &mut DynamicImage, marks: &TileMarks<'_>) -> Result<(), RenderError> {
        if !self.has_glyphs(marks.primary) || !self.has_glyphs(marks.label) {
            debug!(
                row = marks.row,
                col = marks.col,
                "Watermark text has characters outside the bitmap font"
            );
        }

        match canvas {
            DynamicImage::ImageRgb8(buf) => self.draw(buf, marks),
            DynamicImage::ImageRgba8(buf) => self.draw(buf, marks),
            other => {
                return Err(RenderError::UnsupportedPixelFormat(format!(
                    "{:?}",
                    other.color()
                )))
            }
        }
        Ok(())
    }
}

/// Integer source-over blend of one color channel.
#[inline]
fn blend_channel(dst: u8, src: u8, alpha: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * (255 - alpha) + 127) / 255) as u8
}

// =============================================================================
// Tests
// =============================================================================
