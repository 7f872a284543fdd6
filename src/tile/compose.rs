//! Tile composition: crop a region out of the source and stamp it.

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::{GridError, RenderError};
use crate::grid::{GridSpec, Region};

use super::watermark::{TileMarks, WatermarkRenderer, WatermarkSpec};

// =============================================================================
// Tile
// =============================================================================

/// Outcome of stamping a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkStatus {
    /// Primary text and position label were drawn
    Applied,

    /// Rendering failed; the tile holds the plain crop
    Skipped(RenderError),
}

impl WatermarkStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, WatermarkStatus::Applied)
    }
}

/// One cropped, optionally watermarked sub-image.
///
/// `pixels` is a fresh buffer with the same pixel format as the source.
#[derive(Debug, Clone)]
pub struct Tile {
    pub region: Region,
    pub pixels: DynamicImage,
    pub label: String,
    pub watermark: WatermarkStatus,
}

impl Tile {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

// =============================================================================
// Composition
// =============================================================================

/// Copy `region` out of `source` into a new raster.
///
/// # Errors
///
/// [`GridError::InvalidRegion`] if the region is empty or not inside `source`.
pub fn crop(source: &DynamicImage, region: &Region) -> Result<DynamicImage, GridError> {
    let (width, height) = (source.width(), source.height());
    if !region.fits_within(width, height) {
        return Err(GridError::InvalidRegion {
            left: region.left,
            top: region.top,
            right: region.right,
            bottom: region.bottom,
            width,
            height,
        });
    }

    Ok(source.crop_imm(region.left, region.top, region.width(), region.height()))
}

/// Crop `region` from `source` and stamp the watermark onto it.
///
/// Rendering happens on a copy of the crop. If the renderer fails, the plain
/// crop is returned with [`WatermarkStatus::Skipped`] and the failure is
/// logged; it is never propagated.
pub fn compose<R>(
    source: &DynamicImage,
    region: &Region,
    grid: GridSpec,
    watermark: &WatermarkSpec,
    renderer: &R,
) -> Result<Tile, GridError>
where
    R: WatermarkRenderer + ?Sized,
{
    let cropped = crop(source, region)?;
    let label = watermark.label_for(region, grid);

    let marks = TileMarks {
        row: region.row,
        col: region.col,
        primary: &watermark.primary_text,
        label: &label,
    };

    let mut canvas = cropped.clone();
    let (pixels, status) = match renderer.render(&mut canvas, &marks) {
        Ok(()) => (canvas, WatermarkStatus::Applied),
        Err(e) => {
            warn!(
                row = region.row,
                col = region.col,
                "Watermark skipped for tile {}: {}",
                label,
                e
            );
            (cropped, WatermarkStatus::Skipped(e))
        }
    };

    debug!(
        row = region.row,
        col = region.col,
        width = region.width(),
        height = region.height(),
        "Composed tile {}",
        label
    );

    Ok(Tile {
        region: *region,
        pixels,
        label,
        watermark: status,
    })
}

// =============================================================================
// Tests
// =============================================================================
